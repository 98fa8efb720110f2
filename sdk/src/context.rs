use crate::error::DialError;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// Cancellation and deadline scope for a dial.
///
/// Clones share the same cancellation state.
#[derive(Debug, Clone)]
pub struct DialContext {
    token: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl Default for DialContext {
    fn default() -> Self {
        Self::background()
    }
}

impl DialContext {
    /// A context that is never canceled and has no deadline.
    pub fn background() -> Self {
        Self {
            token: None,
            deadline: None,
        }
    }

    /// A context that can be canceled with [`DialContext::cancel`].
    pub fn new() -> Self {
        Self {
            token: Some(CancellationToken::new()),
            deadline: None,
        }
    }

    /// Wraps an existing token, e.g. one shared with a shutdown signal.
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token: Some(token),
            deadline: None,
        }
    }

    /// Keeps the earlier of the current deadline and `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// A context canceled together with this one, which can also be canceled
    /// on its own.
    pub fn child(&self) -> Self {
        let token = match &self.token {
            Some(token) => token.child_token(),
            None => CancellationToken::new(),
        };
        Self {
            token: Some(token),
            deadline: self.deadline,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// No-op for a background context.
    pub fn cancel(&self) {
        if let Some(token) = &self.token {
            token.cancel();
        }
    }

    pub fn is_canceled(&self) -> bool {
        self.token
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }

    /// The error the context would fail a dial with right now, if any.
    pub fn err(&self) -> Option<DialError> {
        if self.is_canceled() {
            return Some(DialError::Canceled);
        }
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Some(DialError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Drives `future` until it completes or the context fires, whichever is
    /// first. Cancellation wins over a future that is ready at the same time.
    pub async fn run<T, F>(&self, future: F) -> Result<T, DialError>
    where
        F: Future<Output = Result<T, DialError>>,
    {
        if let Some(error) = self.err() {
            return Err(error);
        }

        let canceled = async {
            match &self.token {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            _ = canceled => Err(DialError::Canceled),
            _ = expired => Err(DialError::DeadlineExceeded),
            result = future => result,
        }
    }
}
