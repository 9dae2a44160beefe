//! Connectivity error taxonomy for provider gateway calls.

/// Failure to reach or authenticate against a provider endpoint.
///
/// Returned directly from every gateway call -- callers must never infer
/// connectivity failure from side-channel state.
#[derive(Debug, thiserror::Error)]
pub enum ConnectivityError {
    /// The endpoint could not be reached at the transport level.
    #[error("Unable to reach {endpoint}: {detail}")]
    Unreachable { endpoint: String, detail: String },

    /// The endpoint rejected the stored credentials.
    #[error("Credentials rejected by {endpoint}")]
    AuthRejected { endpoint: String },

    /// The request did not complete within the bounded timeout.
    #[error("Request to {endpoint} timed out after {secs}s")]
    Timeout { endpoint: String, secs: u64 },

    /// The endpoint answered, but not with anything we could use.
    #[error("Unexpected response from {endpoint}: {detail}")]
    Protocol { endpoint: String, detail: String },

    /// The stored endpoint URL is unusable.
    #[error("Invalid provider URL '{url}': {detail}")]
    InvalidUrl { url: String, detail: String },
}

impl ConnectivityError {
    /// Classify a reqwest transport error against the endpoint it hit.
    pub fn from_request(endpoint: &str, timeout_secs: u64, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                endpoint: endpoint.to_string(),
                secs: timeout_secs,
            }
        } else if err.is_connect() {
            Self::Unreachable {
                endpoint: endpoint.to_string(),
                detail: err.to_string(),
            }
        } else {
            Self::Protocol {
                endpoint: endpoint.to_string(),
                detail: err.to_string(),
            }
        }
    }
}
