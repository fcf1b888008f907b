use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A cooperative cancellation flag shared between a long running operation and its caller.
///
/// Cloning the token shares the flag:
/// ```
/// use oxel::CancellationToken;
///
/// let token = CancellationToken::new();
/// let observed = token.clone();
/// token.cancel();
/// assert!(observed.is_cancelled());
/// ```
#[derive(Clone, Default, Debug)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
