/// Presentation hook. Receivers re-read the supervisor's state snapshot.
pub trait RefreshHook: Send + Sync {
    fn refresh(&self);
}

pub struct NoopRefresh;

impl RefreshHook for NoopRefresh {
    fn refresh(&self) {}
}
