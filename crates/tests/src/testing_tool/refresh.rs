use std::sync::atomic::{AtomicUsize, Ordering};

use dcl_supervisor::RefreshHook;

#[derive(Default)]
pub struct CountingRefresh {
    count: AtomicUsize,
}

impl CountingRefresh {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Current count, resetting it to zero.
    pub fn take(&self) -> usize {
        self.count.swap(0, Ordering::SeqCst)
    }
}

impl RefreshHook for CountingRefresh {
    fn refresh(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}
