//! Loading progress bookkeeping.
//!
//! Every asset request is registered with [`LoadingManager::item_start`] and
//! settled with [`LoadingManager::item_end`], successful or not. Each settled
//! item reports `(loaded, total)` to the progress callback; once nothing is
//! outstanding the completion callback runs with the list of failed paths.

/// Percentage readout of a `(loaded, total)` pair, rounded to the nearest
/// integer.
pub fn progress_percent(loaded: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((loaded as f64 / total as f64) * 100.0).round() as u32
}

type ProgressFn = Box<dyn FnMut(usize, usize)>;
type CompleteFn = Box<dyn FnMut(&[String])>;

pub struct LoadingManager {
    loaded: usize,
    total: usize,
    failed: Vec<String>,
    /// Total at which completion last fired.
    completed_at: Option<usize>,
    on_progress: ProgressFn,
    on_complete: CompleteFn,
}

impl std::fmt::Debug for LoadingManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingManager")
            .field("loaded", &self.loaded)
            .field("total", &self.total)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl LoadingManager {
    pub fn new(
        on_complete: impl FnMut(&[String]) + 'static,
        on_progress: impl FnMut(usize, usize) + 'static,
    ) -> Self {
        Self {
            loaded: 0,
            total: 0,
            failed: Vec::new(),
            completed_at: None,
            on_progress: Box::new(on_progress),
            on_complete: Box::new(on_complete),
        }
    }

    pub fn item_start(&mut self, path: &str) {
        self.total += 1;
        log::debug!("loading {} ({} requested)", path, self.total);
    }

    /// Settles one item. Failed items still count as loaded so the bar
    /// always reaches the end.
    pub fn item_end(&mut self, path: &str, ok: bool) {
        if !ok {
            self.failed.push(path.to_string());
        }
        self.step(self.loaded + 1, self.total);
    }

    /// Reports a progress step. Completion fires once per total, on the
    /// first step that reaches it.
    pub fn step(&mut self, loaded: usize, total: usize) {
        self.loaded = loaded;
        self.total = total;
        log::debug!(
            "progress {}/{} ({}%)",
            loaded,
            total,
            progress_percent(loaded, total)
        );
        (self.on_progress)(loaded, total);
        if total > 0 && loaded >= total && self.completed_at != Some(total) {
            self.completed_at = Some(total);
            (self.on_complete)(&self.failed);
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.loaded >= self.total
    }

    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    /// Hands out the failed paths so they can be requested again.
    pub fn take_failed(&mut self) -> Vec<String> {
        std::mem::take(&mut self.failed)
    }

    pub fn percent(&self) -> u32 {
        progress_percent(self.loaded, self.total)
    }
}
