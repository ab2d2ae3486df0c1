//
//  cloud-databases
//  api/context.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Cancellation and deadline scope for operation calls.
//!
//! A [`RequestContext`] is passed to every `*_with_context` operation. It
//! combines an optional deadline with a [`CancellationToken`]; whichever
//! fires first ends the call. In-flight exchanges are dropped (which aborts
//! the underlying connection) and pending retry sleeps wake up immediately.
//!
//! ```rust
//! use std::time::Duration;
//! use cloud_databases::api::RequestContext;
//!
//! let ctx = RequestContext::with_timeout(Duration::from_secs(5));
//! assert!(ctx.err().is_none());
//!
//! ctx.cancel();
//! assert!(ctx.err().is_some());
//! ```

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a [`RequestContext`] is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The deadline passed.
    DeadlineExceeded,
    /// The scope was cancelled explicitly.
    Canceled,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeadlineExceeded => f.write_str("context deadline exceeded"),
            Self::Canceled => f.write_str("context canceled"),
        }
    }
}

/// Caller-supplied cancellation scope.
///
/// Cloning a context yields a handle onto the same scope: cancelling one
/// clone cancels all of them.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    deadline: Option<Instant>,
    token: CancellationToken,
}

impl RequestContext {
    /// A scope that never expires and is only done when cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
            token: CancellationToken::new(),
        }
    }

    /// Wraps an existing token, e.g. one shared with other tasks.
    pub fn with_token(token: CancellationToken) -> Self {
        Self {
            deadline: None,
            token,
        }
    }

    /// Derives a scope that ends no later than `timeout` from now and is
    /// cancelled whenever `self` is.
    pub fn child_with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(parent) if parent < candidate => parent,
            _ => candidate,
        };
        Self {
            deadline: Some(deadline),
            token: self.token.child_token(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Time left before the deadline; `None` if there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns the reason the scope is done, or `None` while it is live.
    pub fn err(&self) -> Option<CancelReason> {
        if self.token.is_cancelled() {
            return Some(CancelReason::Canceled);
        }
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    /// Completes when the scope is done.
    pub async fn done(&self) -> CancelReason {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => CancelReason::Canceled,
                    _ = tokio::time::sleep_until(deadline) => CancelReason::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                CancelReason::Canceled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_is_live() {
        let ctx = RequestContext::background();
        assert!(ctx.err().is_none());
        assert!(ctx.remaining().is_none());
    }

    #[tokio::test]
    async fn test_deadline_fires() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(10));
        assert_eq!(ctx.done().await, CancelReason::DeadlineExceeded);
        assert_eq!(ctx.err(), Some(CancelReason::DeadlineExceeded));
    }

    #[tokio::test]
    async fn test_cancel_wakes_waiter() {
        let ctx = RequestContext::background();
        let waiter = ctx.clone();
        let handle = tokio::spawn(async move { waiter.done().await });
        ctx.cancel();
        assert_eq!(handle.await.unwrap(), CancelReason::Canceled);
    }

    #[test]
    fn test_child_keeps_earlier_parent_deadline() {
        let parent = RequestContext::with_timeout(Duration::from_millis(50));
        let child = parent.child_with_timeout(Duration::from_secs(60));
        assert_eq!(child.deadline(), parent.deadline());

        parent.cancel();
        assert_eq!(child.err(), Some(CancelReason::Canceled));
    }

    #[test]
    fn test_reason_messages() {
        assert!(CancelReason::DeadlineExceeded.to_string().contains("deadline exceeded"));
        assert_eq!(CancelReason::Canceled.to_string(), "context canceled");
    }
}
