use thiserror::Error;

/// Why a schedule fetch failed
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Can't reach the schedule server")]
    Offline(#[source] reqwest::Error),

    #[error("Schedule request failed ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected schedule response: {0}")]
    Decode(String),

    #[error("Schedule source not configured: {0}")]
    Config(String),
}

impl FetchError {
    pub fn is_offline(&self) -> bool {
        matches!(self, FetchError::Offline(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if is_network_error(&err) {
            FetchError::Offline(err)
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else {
            FetchError::Status {
                status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                message: err.to_string(),
            }
        }
    }
}

/// Connection level failures, as opposed to the server answering badly
fn is_network_error(err: &reqwest::Error) -> bool {
    if err.is_connect() || err.is_timeout() {
        return true;
    }
    let text = err.to_string().to_lowercase();
    ["dns", "resolve", "unreachable", "error sending request", "no route", "failed to lookup"]
        .iter()
        .any(|needle| text.contains(needle))
}
