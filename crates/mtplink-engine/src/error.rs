use mtplink_transport::TransportError;
use mtplink_wire::{ResponseCode, WireError};

pub type Result<T> = std::result::Result<T, EngineError>;

/// Everything a transaction can fail with.
///
/// The split that matters to callers is [`EngineError::is_fatal`]: fatal
/// errors mean the bulk pipe can no longer be trusted and the engine has
/// already torn the connection down; everything else leaves the session
/// usable for the next transaction.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The device completed the transaction with a non-OK return code.
    #[error("device returned {0}")]
    Rc(ResponseCode),

    /// The device and host disagree about where we are in the protocol.
    /// The bulk pipe is out of sync and the connection has been dropped.
    #[error("protocol desync: {0}")]
    Sync(String),

    /// The USB transport failed underneath us.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A payload failed to encode or decode.
    #[error(transparent)]
    Codec(#[from] WireError),

    /// The caller's payload source or destination failed mid-transfer.
    #[error("payload I/O: {0}")]
    Payload(#[source] std::io::Error),
}

impl EngineError {
    /// Whether this error invalidated the connection.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EngineError::Sync(_) | EngineError::Transport(_))
    }

    /// The device return code, when the failure was a plain non-OK response.
    pub fn response_code(&self) -> Option<ResponseCode> {
        match self {
            EngineError::Rc(rc) => Some(*rc),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mtplink_wire::consts::RC_DEVICE_BUSY;

    #[test]
    fn fatality_split() {
        assert!(EngineError::Sync("wrong container".into()).is_fatal());
        assert!(EngineError::Transport(TransportError::Disconnected).is_fatal());
        assert!(!EngineError::Rc(ResponseCode(RC_DEVICE_BUSY)).is_fatal());
        assert!(!EngineError::Codec(WireError::StringTooLong(300)).is_fatal());
        assert!(
            !EngineError::Payload(std::io::Error::new(std::io::ErrorKind::Other, "sink"))
                .is_fatal()
        );
    }

    #[test]
    fn rc_extraction() {
        let err = EngineError::Rc(ResponseCode(RC_DEVICE_BUSY));
        assert_eq!(err.response_code(), Some(ResponseCode(RC_DEVICE_BUSY)));
        assert_eq!(err.to_string(), "device returned DeviceBusy");
    }
}
