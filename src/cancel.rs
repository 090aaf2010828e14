use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Shared shutdown flag.
///
/// Clones observe the same flag. The frame loop exits on the next redraw after
/// [`cancel`](Self::cancel), pending asset results are dropped and the intro
/// timeline stops advancing.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
