//! Terminal front-end for the redemption dispatch engine: loads a
//! code list and session cookies, runs the engine, prints progress
//! and a final summary.

mod logging;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;

use redeem_core::{parse_code_list, parse_cookie_text, CredentialSet};
use redeem_engine::{
    Dispatcher, ReqwestTransport, RunMode, RunSnapshot, SubmitSettings, DEFAULT_WORKER_COUNT,
};

#[derive(Debug, Parser)]
#[command(
    name = "redeem_app",
    about = "Submit single-use redemption codes until one succeeds"
)]
struct Args {
    /// Redemption endpoint URL.
    #[arg(long)]
    endpoint: String,

    /// File with one code per line; `#` comments are skipped.
    #[arg(long, default_value = "codes.txt")]
    codes: PathBuf,

    /// Cookie file with `name=value; other=value` lines.
    #[arg(long, default_value = "cookies.txt")]
    cookies: PathBuf,

    /// Submit through a worker pool instead of one paced attempt at a
    /// time.
    #[arg(long)]
    parallel: bool,

    /// Worker count for --parallel.
    #[arg(long, default_value_t = DEFAULT_WORKER_COUNT)]
    workers: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::initialize();
    let args = Args::parse();

    let code_text = fs::read_to_string(&args.codes)
        .with_context(|| format!("reading {}", args.codes.display()))?;
    let codes = parse_code_list(&code_text);
    if codes.is_empty() {
        bail!("no codes found in {}", args.codes.display());
    }

    let credentials = load_credentials(&args.cookies);
    if credentials.is_empty() {
        redeem_logging::redeem_warn!("running without session cookies; expect 401 responses");
    }
    redeem_logging::redeem_info!(
        "loaded {} codes and {} cookies",
        codes.len(),
        credentials.len()
    );

    let settings = SubmitSettings::new(&args.endpoint);
    let transport = Arc::new(ReqwestTransport::new(&settings, &credentials)?);
    let mode = if args.parallel {
        RunMode::pool(args.workers)
    } else {
        RunMode::Sequential
    };

    let dispatcher = Dispatcher::new();
    let on_progress = Arc::new(|snapshot: RunSnapshot| {
        println!(
            "[PROGRESS] {}/{} | ok {} | failed {} | last: {}",
            snapshot.processed,
            snapshot.total,
            snapshot.success_count,
            snapshot.error_count,
            snapshot.current_code
        );
    });

    let handle = dispatcher.start(codes, mode, transport, on_progress)?;
    let final_state = handle.wait().await;

    print_summary(&final_state);
    Ok(())
}

fn load_credentials(path: &PathBuf) -> CredentialSet {
    match fs::read_to_string(path) {
        Ok(text) => parse_cookie_text(&text),
        Err(err) => {
            log::warn!("no cookies loaded from {}: {err}", path.display());
            CredentialSet::new()
        }
    }
}

fn print_summary(snapshot: &RunSnapshot) {
    println!("{}", "=".repeat(70));
    println!(
        "[SUMMARY] successful: {}/{}",
        snapshot.success_count, snapshot.total
    );
    println!(
        "[SUMMARY] failed: {}/{}",
        snapshot.error_count, snapshot.total
    );
    println!("[SUMMARY] processed: {}", snapshot.processed);
    println!(
        "[SUMMARY] success rate: {:.1}%",
        success_rate(snapshot.success_count, snapshot.total)
    );
}

fn success_rate(success_count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    success_count as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::success_rate;

    #[test]
    fn success_rate_handles_empty_runs() {
        assert_eq!(success_rate(0, 0), 0.0);
        assert_eq!(success_rate(1, 4), 25.0);
    }
}
