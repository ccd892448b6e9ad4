//! Latest-request-wins bookkeeping for asynchronous acquisitions.

use std::fmt;

/// Token identifying one issued request. Tokens from the same [`LatestWins`]
/// are strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestToken(u64);

impl RequestToken {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues request tokens and decides whether a response is still wanted.
///
/// Only the most recently issued token is current. A response carrying any
/// other token is stale and must be dropped without touching state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LatestWins {
    last_issued: u64,
    current: Option<RequestToken>,
}

impl LatestWins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token, superseding whatever was current.
    pub fn issue(&mut self) -> RequestToken {
        self.last_issued += 1;
        let token = RequestToken(self.last_issued);
        self.current = Some(token);
        token
    }

    pub fn current(&self) -> Option<RequestToken> {
        self.current
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.current == Some(token)
    }

    /// Accept a response for `token`. Returns `true` and retires the token
    /// when it is current, so a duplicate delivery is rejected as well.
    pub fn settle(&mut self, token: RequestToken) -> bool {
        if self.is_current(token) {
            self.current = None;
            true
        } else {
            false
        }
    }

    /// Forget the current token without issuing a new one.
    pub fn invalidate(&mut self) {
        self.current = None;
    }
}
