use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};
use std::result;

/// Error produced by an [`HttpClient`](trait.HttpClient.html) implementation
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Directives extracted from a challenge, keyed by directive name
pub type Directives = BTreeMap<String, String>;

#[derive(Debug)]
pub enum Error {
    /// The transport failed on the probe or on the real request
    TransportFailure(TransportError),
    /// The server answered 401 without a WWW-Authenticate header
    MissingChallengeHeader,
    /// The challenge did not yield all required directives; holds what was parsed
    InvalidChallengeHeader(Directives),
    UnknownAlgorithm(String),
    InvalidAuthorization(String),
}

pub type Result<T> = result::Result<T, Error>;

use Error::*;

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TransportFailure(e) => write!(f, "Transport failure: {}", e),
            MissingChallengeHeader => write!(f, "headers do not have WWW-Authenticate"),
            InvalidChallengeHeader(parts) => write!(f, "header is invalid: {:?}", parts),
            UnknownAlgorithm(ctx) => write!(f, "Unknown algorithm: {}", ctx),
            InvalidAuthorization(ctx) => write!(f, "Cannot use as Authorization header: {}", ctx),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportFailure(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        TransportFailure(e)
    }
}

#[cfg(test)]
mod tests {
    use super::{Directives, Error};
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_display() {
        assert_eq!(
            Error::MissingChallengeHeader.to_string(),
            "headers do not have WWW-Authenticate"
        );

        let mut parts = Directives::new();
        parts.insert("realm".to_string(), "x".to_string());
        assert_eq!(
            Error::InvalidChallengeHeader(parts).to_string(),
            r#"header is invalid: {"realm": "x"}"#
        );
    }

    #[test]
    fn test_transport_source() {
        let err: Error = Error::from(
            Box::new(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"))
                as super::TransportError,
        );
        assert!(matches!(err, Error::TransportFailure(_)));
        assert_eq!(err.source().unwrap().to_string(), "refused");
        assert_eq!(err.to_string(), "Transport failure: refused");
    }
}
