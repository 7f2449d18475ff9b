//! The logical request/response container exchanged per transaction.

/// A request or response container.
///
/// For requests, `code` holds the operation code; for responses it holds
/// the device's return code. The engine stamps `session_id` and
/// `transaction_id` on requests; callers fill only `code` and `params`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    pub code: u16,
    pub session_id: u32,
    pub transaction_id: u32,
    /// Up to five 32-bit parameters; only as many as supplied go on the wire.
    pub params: Vec<u32>,
}

impl Container {
    pub fn new(code: u16) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    pub fn with_params(code: u16, params: &[u32]) -> Self {
        Self {
            code,
            params: params.to_vec(),
            ..Self::default()
        }
    }
}
