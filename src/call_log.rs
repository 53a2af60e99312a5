/// Append-only record of every request URL a [`Client`](crate::Client) has built.
///
/// URLs are recorded before their first attempt, so failed requests stay
/// visible here. The log is kept for inspection only; the client never reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallLog {
    urls: Vec<String>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, url: &str) {
        self.urls.push(url.to_string());
    }

    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn last(&self) -> Option<&str> {
        self.urls.last().map(String::as_str)
    }
}

/// Replace the value of the `key` query parameter so URLs can be logged.
pub fn redact_key(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let query = query
        .split('&')
        .map(|kv| if kv.starts_with("key=") { "key=***" } else { kv })
        .collect::<Vec<_>>()
        .join("&");
    format!("{base}?{query}")
}
