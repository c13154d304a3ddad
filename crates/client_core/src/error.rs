use thiserror::Error;

/// Why a read or command against the simulation backend failed.
///
/// Only two kinds exist: the request never produced a usable response, or the
/// body was not the JSON we expected. Field values are never validated.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("malformed response from {endpoint}: {source}")]
    Parse {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::Transport { endpoint, .. } | Self::Parse { endpoint, .. } => endpoint,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
