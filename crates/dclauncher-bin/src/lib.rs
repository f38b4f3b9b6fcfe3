pub mod runner;
pub mod status;
