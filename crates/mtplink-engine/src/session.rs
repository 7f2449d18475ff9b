//! Host-side session state.

/// An open MTP session: the id the host picked plus the transaction
/// counter for that session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    id: u32,
    next_tid: u32,
}

impl Session {
    pub fn new(id: u32) -> Self {
        // Transaction ids start at 1; 0 belongs to the session-less
        // OpenSession command itself.
        Self { id, next_tid: 1 }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Take the next transaction id. The counter advances on every call,
    /// including for transactions that later fail, and skips 0 on wrap.
    pub fn next_transaction_id(&mut self) -> u32 {
        let tid = self.next_tid;
        self.next_tid = match self.next_tid.wrapping_add(1) {
            0 => 1,
            n => n,
        };
        tid
    }

    /// Pick a fresh random session id.
    ///
    /// Devices reject 0, and 0xFFFFFFFF is reserved, so the id is clamped
    /// to a positive 31-bit value with the low bit forced on.
    pub fn random_id() -> u32 {
        (fastrand::u32(..) & 0x7fff_ffff) | 1
    }
}
