use thiserror::Error;

/// Failure of a single backend call.
///
/// The engine treats every variant the same way (log, report, skip the state
/// mutation); the split exists so callers and logs can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("request to {path} failed: {message}")]
    Transport { path: String, message: String },

    #[error("{path} returned HTTP {status}")]
    Status { path: String, status: u16 },

    #[error("malformed response from {path}: {message}")]
    Decode { path: String, message: String },
}

impl ApiError {
    pub(crate) fn transport(path: &str, err: &reqwest::Error) -> Self {
        Self::Transport {
            path: path.to_owned(),
            message: err.to_string(),
        }
    }

    pub(crate) fn decode(path: &str, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.to_owned(),
            message: message.into(),
        }
    }

    /// HTTP status code, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_only_for_http_errors() {
        let e = ApiError::Status {
            path: "/notifications/".into(),
            status: 500,
        };
        assert_eq!(e.status(), Some(500));
        assert_eq!(e.to_string(), "/notifications/ returned HTTP 500");

        let e = ApiError::decode("/notifications/unread-count/", "missing field");
        assert_eq!(e.status(), None);
    }
}
