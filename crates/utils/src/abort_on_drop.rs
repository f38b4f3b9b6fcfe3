use std::mem::ManuallyDrop;

use tokio::task::JoinHandle;

/// Background task handle that aborts the task when dropped.
pub struct AbortOnDropHandle<T> {
    inner: JoinHandle<T>,
}

impl<T> AbortOnDropHandle<T> {
    /// Give up ownership without aborting. The task keeps running detached
    /// once the returned handle is dropped.
    pub fn into_inner(self) -> JoinHandle<T> {
        let this = ManuallyDrop::new(self);
        // Safety: `this` is never dropped, so `inner` is read exactly once.
        unsafe { std::ptr::read(&this.inner) }
    }
}

impl<T> From<JoinHandle<T>> for AbortOnDropHandle<T> {
    fn from(inner: JoinHandle<T>) -> Self {
        Self { inner }
    }
}

impl<T> Drop for AbortOnDropHandle<T> {
    fn drop(&mut self) {
        self.inner.abort();
    }
}
