pub mod error;
pub mod http_client;
pub mod methods;
pub mod traits;
pub mod types;

pub use error::{RPCRequestError, RpcError};
pub use http_client::HttpRpcClient;
pub use methods::ChainRpcExt;
pub use traits::ChainRpc;
pub use types::{RpcTarget, SidechainInfo};
