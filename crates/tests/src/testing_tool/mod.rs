pub mod refresh;
pub mod rpc;
