//! Redeem core: pure response classification and input parsing.
mod classify;
mod codes;
mod cookies;

pub use classify::{classify_response, Classification, ClassifiedResponse};
pub use codes::parse_code_list;
pub use cookies::{parse_cookie_text, CredentialSet};
