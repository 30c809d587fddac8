//! Redemption dispatch engine: transport, attempt execution, and run
//! orchestration with stop-on-first-success.
mod attempt;
mod dispatcher;
mod state;
mod transport;
mod types;

pub use attempt::run_attempt;
pub use dispatcher::{
    ChannelProgressSink, Dispatcher, ProgressSink, RunHandle, RunMode, StartError,
    DEFAULT_WORKER_COUNT,
};
pub use state::{RunPhase, RunSnapshot, RunState};
pub use transport::{
    HttpReply, ReqwestTransport, SubmitSettings, Transport, TransportError, REQUEST_TIMEOUT,
};
pub use types::AttemptResult;

pub use redeem_core::{
    classify_response, parse_code_list, parse_cookie_text, Classification, ClassifiedResponse,
    CredentialSet,
};
