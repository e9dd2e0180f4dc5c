//! Unified error type for the F2L Logic runtime.

use f2l_category::CategoryError;
use f2l_protocol::ProtocolError;
use f2l_transport::TransportError;

/// Top-level error that wraps every crate-specific error.
///
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum F2lError {
    /// Connection-level failure (connect, send, receive, timeout).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame or body could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A category refused or failed an operation.
    #[error(transparent)]
    Category(#[from] CategoryError),

    /// [`LogicClientBuilder::build`](crate::LogicClientBuilder::build) was
    /// called without callbacks for a required category.
    #[error("missing {0} callbacks")]
    MissingCallbacks(&'static str),
}

impl F2lError {
    /// The Foundation's status code, if this error is a rejected reply.
    pub fn foundation_code(&self) -> Option<i32> {
        match self {
            Self::Category(CategoryError::FoundationReply { code, .. }) => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let f2l_err: F2lError = err.into();
        assert!(matches!(f2l_err, F2lError::Transport(_)));
        assert!(f2l_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let f2l_err: F2lError = err.into();
        assert!(matches!(f2l_err, F2lError::Protocol(_)));
    }

    #[test]
    fn test_foundation_code_from_category_error() {
        let f2l_err: F2lError = CategoryError::FoundationReply {
            code: 7,
            description: "denied".into(),
        }
        .into();
        assert_eq!(f2l_err.foundation_code(), Some(7));
        assert_eq!(f2l_err.to_string(), "foundation replied with error 7: denied");
    }

    #[test]
    fn test_foundation_code_none_for_other_errors() {
        let f2l_err = F2lError::MissingCallbacks("connect");
        assert_eq!(f2l_err.foundation_code(), None);
        assert_eq!(f2l_err.to_string(), "missing connect callbacks");
    }
}
