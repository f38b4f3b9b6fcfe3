pub mod abort_on_drop;
pub mod fs;

pub use abort_on_drop::AbortOnDropHandle;
