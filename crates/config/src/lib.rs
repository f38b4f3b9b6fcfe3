mod bootstrap;
mod chain_conf;
mod constants;
mod descriptor;
mod launcher;
mod runtime;

pub use bootstrap::*;
pub use chain_conf::*;
pub use constants::*;
pub use descriptor::*;
pub use launcher::*;
pub use runtime::*;
