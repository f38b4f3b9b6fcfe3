use std::io;

#[derive(thiserror::Error, Debug)]
pub enum LaunchError {
    #[error("unknown chain {0}")]
    UnknownChain(String),
    #[error("failed to launch {chain}: {reason}")]
    LaunchFailed { chain: String, reason: String },
    #[error("activation of {chain} failed")]
    ActivationFailed { chain: String },
}

#[derive(thiserror::Error, Debug)]
pub enum StopError {
    #[error("unknown chain {0}")]
    UnknownChain(String),
    #[error("failed to terminate {chain}: {source}")]
    Terminate {
        chain: String,
        #[source]
        source: io::Error,
    },
}
