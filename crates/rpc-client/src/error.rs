use thiserror::Error;

// NOTE: transport failures only, i.e. the request never got an HTTP response.
#[derive(Error, Debug)]
#[error("{client} error, method: {method} error: {source}")]
pub struct RPCRequestError {
    pub client: &'static str,
    pub method: String,
    pub source: anyhow::Error,
}

impl RPCRequestError {
    pub fn new<E: Into<anyhow::Error>>(client: &'static str, method: String, source: E) -> Self {
        RPCRequestError {
            client,
            method,
            source: source.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum RpcError {
    #[error(transparent)]
    Transport(#[from] RPCRequestError),
    #[error("method {method} returned http status {status}")]
    Status { method: String, status: u16 },
    #[error("method {method} returned an undecodable body: {source}")]
    Decode {
        method: String,
        source: anyhow::Error,
    },
    #[error("method {method} failed with code {code}: {message}")]
    Remote {
        method: String,
        code: i64,
        message: String,
    },
}

impl RpcError {
    pub fn method(&self) -> &str {
        match self {
            RpcError::Transport(err) => &err.method,
            RpcError::Status { method, .. }
            | RpcError::Decode { method, .. }
            | RpcError::Remote { method, .. } => method,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, RpcError::Transport(_))
    }
}
