use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    Unknown,
    Waiting,
    Running,
}

impl Default for LifecycleState {
    fn default() -> Self {
        LifecycleState::Unknown
    }
}

/// Mutable status of one chain.
///
/// `Running` implies the most recent liveness check succeeded; every failed
/// check forces `Unknown`. The `apply_*` methods return whether anything a
/// viewer could observe changed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainState {
    pub id: String,
    pub state: LifecycleState,
    pub available_balance: f64,
    pub pending_balance: f64,
    pub height: u64,
    pub slot: Option<u32>,
    pub automine: bool,
}

impl ChainState {
    pub fn new(id: String, slot: Option<u32>) -> Self {
        ChainState {
            id,
            slot,
            ..Default::default()
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == LifecycleState::Running
    }

    /// Result of a block height query, `None` on any RPC failure.
    pub fn apply_height(&mut self, height: Option<u64>) -> bool {
        match height {
            Some(height) => {
                let changed = self.height != height || self.state != LifecycleState::Running;
                self.height = height;
                self.state = LifecycleState::Running;
                changed
            }
            None => self.demote(),
        }
    }

    /// Liveness of a chain without an RPC endpoint.
    pub fn apply_liveness(&mut self, alive: bool) -> bool {
        if alive {
            let changed = self.state != LifecycleState::Running;
            self.state = LifecycleState::Running;
            changed
        } else {
            self.demote()
        }
    }

    /// Failed balance queries leave the last known balance in place.
    pub fn apply_balance(&mut self, balance: Option<f64>) -> bool {
        match balance {
            Some(balance) => {
                let changed = self.available_balance != balance;
                self.available_balance = balance;
                changed
            }
            None => false,
        }
    }

    /// Freshly spawned; returns whether the state moved.
    pub fn mark_waiting(&mut self) -> bool {
        let changed = self.state != LifecycleState::Waiting;
        self.state = LifecycleState::Waiting;
        changed
    }

    pub fn mark_stopped(&mut self) -> bool {
        let changed = self.state != LifecycleState::Unknown || self.automine;
        self.state = LifecycleState::Unknown;
        self.automine = false;
        changed
    }

    fn demote(&mut self) -> bool {
        let changed = self.state != LifecycleState::Unknown;
        self.state = LifecycleState::Unknown;
        changed
    }
}
