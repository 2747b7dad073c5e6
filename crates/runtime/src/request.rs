/// Cancellation tokens for the single primary request of a widget.
///
/// Tokens are monotonically increasing. Beginning a new request supersedes
/// whatever was in flight; a response is applied only if its token is still
/// the current one. This replaces "flag the old request object as canceled"
/// with an explicit check at the point where the response lands.

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The token was current; the response should be applied.
    Current,
    /// A newer request was started (or the widget was cleared) since this token was issued.
    Superseded,
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    next_id: u64,
    current: Option<RequestToken>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new primary request, superseding any in-flight one.
    ///
    /// Returns the new token and the token it replaced, if any.
    pub fn begin(&mut self) -> (RequestToken, Option<RequestToken>) {
        let token = RequestToken(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let previous = self.current.replace(token);
        (token, previous)
    }

    /// Marks `token` as answered.
    pub fn complete(&mut self, token: RequestToken) -> Completion {
        if self.current == Some(token) {
            self.current = None;
            Completion::Current
        } else {
            Completion::Superseded
        }
    }

    /// Drops the in-flight request without starting a new one.
    pub fn cancel(&mut self) -> Option<RequestToken> {
        self.current.take()
    }

    pub fn in_flight(&self) -> Option<RequestToken> {
        self.current
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.current == Some(token)
    }
}
