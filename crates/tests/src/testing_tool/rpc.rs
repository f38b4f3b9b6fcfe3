use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use dcl_rpc_client::{ChainRpc, RpcError, RpcTarget};
use serde_json::Value;

/// Status code returned for unscripted or failing calls.
pub const MOCK_FAILURE_STATUS: u16 = 503;

#[derive(Clone, Debug, PartialEq)]
pub struct RpcCall {
    pub port: u16,
    pub method: String,
    pub params: Vec<Value>,
}

#[derive(Clone, Debug)]
enum Reply {
    Ok(Value),
    Fail,
}

/// Scripted JSON-RPC endpoint keyed by `(port, method)`.
///
/// Queued replies are consumed first, then the sticky default. A call with
/// neither fails like an unreachable node.
#[derive(Default)]
pub struct MockRpc {
    queued: Mutex<HashMap<(u16, String), VecDeque<Reply>>>,
    defaults: Mutex<HashMap<(u16, String), Reply>>,
    calls: Mutex<Vec<RpcCall>>,
}

impl MockRpc {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, port: u16, method: &str, reply: Reply) {
        self.queued
            .lock()
            .unwrap()
            .entry((port, method.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Answer the next `method` call on `port` with `value`.
    pub fn reply(&self, port: u16, method: &str, value: Value) {
        self.push(port, method, Reply::Ok(value));
    }

    /// Fail the next `method` call on `port`.
    pub fn fail(&self, port: u16, method: &str) {
        self.push(port, method, Reply::Fail);
    }

    pub fn always(&self, port: u16, method: &str, value: Value) {
        self.defaults
            .lock()
            .unwrap()
            .insert((port, method.to_string()), Reply::Ok(value));
    }

    pub fn calls(&self) -> Vec<RpcCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<RpcCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == method)
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl ChainRpc for MockRpc {
    async fn call(
        &self,
        target: &RpcTarget,
        method: &str,
        params: Vec<Value>,
    ) -> Result<Value, RpcError> {
        self.calls.lock().unwrap().push(RpcCall {
            port: target.port,
            method: method.to_string(),
            params,
        });

        let key = (target.port, method.to_string());
        let queued = self
            .queued
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(|replies| replies.pop_front());
        let reply = queued.or_else(|| self.defaults.lock().unwrap().get(&key).cloned());
        match reply {
            Some(Reply::Ok(value)) => Ok(value),
            Some(Reply::Fail) | None => Err(RpcError::Status {
                method: method.to_string(),
                status: MOCK_FAILURE_STATUS,
            }),
        }
    }
}
