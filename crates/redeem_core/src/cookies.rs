use std::collections::BTreeMap;

/// Session cookies attached to every outbound attempt. Keys are
/// unique; the set is immutable for the duration of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialSet {
    cookies: BTreeMap<String, String>,
}

impl CredentialSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.cookies.insert(name.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Render as a `Cookie` header value, or `None` when empty.
    pub fn to_cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let header = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        Some(header)
    }
}

/// Parse cookies from raw text: `#` comments and blank lines are
/// skipped, each remaining line splits on `;` into `name=value` parts.
/// A repeated name keeps the last value seen.
pub fn parse_cookie_text(raw: &str) -> CredentialSet {
    let mut credentials = CredentialSet::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        for part in line.split(';') {
            if let Some((name, value)) = part.trim().split_once('=') {
                credentials.insert(name.trim(), value.trim());
            }
        }
    }
    credentials
}
