use thiserror::Error;

/// Feil fra punch-analysis-endepunktet. `Display` er meldingen brukeren ser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Punch analysis data not found")]
    NotFound,
    #[error("Please log in to view punch analysis data")]
    Unauthorized,
    #[error("You do not have permission to view this data")]
    Forbidden,
    #[error("Failed to fetch punch data")]
    Failed(u16),
    #[error("Unable to connect to the server. Please check if the backend is running.")]
    Unreachable,
    #[error("{0}")]
    Decode(String),
    #[error("An unexpected error occurred")]
    Unexpected(String),
}

impl FetchError {
    /// HTTP-status -> feiltype (kun ikke-2xx).
    pub fn from_status(code: u16) -> Self {
        match code {
            404 => FetchError::NotFound,
            401 => FetchError::Unauthorized,
            403 => FetchError::Forbidden,
            other => FetchError::Failed(other),
        }
    }

    /// Stabil etikett for telemetri.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::NotFound => "not_found",
            FetchError::Unauthorized => "unauthorized",
            FetchError::Forbidden => "forbidden",
            FetchError::Failed(_) => "failed",
            FetchError::Unreachable => "unreachable",
            FetchError::Decode(_) => "decode",
            FetchError::Unexpected(_) => "unexpected",
        }
    }
}

impl From<ureq::Error> for FetchError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, _) => FetchError::from_status(code),
            ureq::Error::Transport(t) => match t.kind() {
                // Nettverksnivå: nektet, brutt, tidsavbrutt eller DNS.
                ureq::ErrorKind::ConnectionFailed
                | ureq::ErrorKind::Dns
                | ureq::ErrorKind::Io
                | ureq::ErrorKind::ProxyConnect => FetchError::Unreachable,
                _ => FetchError::Unexpected(t.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_messages_match_ui_text() {
        assert_eq!(
            FetchError::from_status(401).to_string(),
            "Please log in to view punch analysis data"
        );
        assert_eq!(FetchError::from_status(404).to_string(), "Punch analysis data not found");
        assert_eq!(
            FetchError::from_status(403).to_string(),
            "You do not have permission to view this data"
        );
        assert_eq!(FetchError::from_status(500), FetchError::Failed(500));
        assert_eq!(FetchError::from_status(418).to_string(), "Failed to fetch punch data");
    }

    #[test]
    fn decode_shows_its_own_message() {
        let e = FetchError::Decode("expected an array".into());
        assert_eq!(e.to_string(), "expected an array");
        assert_eq!(e.kind(), "decode");
    }

    #[test]
    fn io_failures_are_unreachable() {
        let reset = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert_eq!(FetchError::from(ureq::Error::from(reset)), FetchError::Unreachable);
        let stalled = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        assert_eq!(FetchError::from(ureq::Error::from(stalled)), FetchError::Unreachable);
    }

    #[test]
    fn malformed_url_stays_unexpected() {
        let err = ureq::get("not a url").call().unwrap_err();
        assert_eq!(FetchError::from(err).kind(), "unexpected");
    }
}
