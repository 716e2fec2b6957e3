//! Request cancellation context
//!
//! Store operations take a `&Context` as their first argument and bail out
//! with [`StoreError::Cancelled`] before acquiring any lock when the caller has
//! already given up. The check is best-effort: an operation that got past it
//! runs to completion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{StoreError, StoreResult};

/// Cloneable cancellation handle shared between a caller and the operations it issues
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
}

impl Context {
    /// A context that is live until someone calls [`Context::cancel`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Root context for startup, shutdown and background work
    pub fn background() -> Self {
        Self::default()
    }

    /// Mark this context (and every clone of it) as cancelled
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail fast if the caller has gone away
    pub fn check(&self) -> StoreResult<()> {
        if self.is_cancelled() {
            Err(StoreError::Cancelled)
        } else {
            Ok(())
        }
    }
}
