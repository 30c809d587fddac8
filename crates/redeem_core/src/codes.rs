/// Parse a code list from raw text: one code per line, trimmed, with
/// blank lines and `#` comments skipped.
pub fn parse_code_list(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToOwned::to_owned)
        .collect()
}
