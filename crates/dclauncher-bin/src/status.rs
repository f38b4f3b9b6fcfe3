use std::sync::Arc;

use dcl_supervisor::{ChainState, LifecycleState, RefreshHook};
use tokio::sync::Notify;

/// Wakes the status loop. Bursts of refreshes collapse into one wake-up.
pub struct NotifyRefresh {
    notify: Arc<Notify>,
}

impl NotifyRefresh {
    pub fn new(notify: Arc<Notify>) -> Self {
        NotifyRefresh { notify }
    }
}

impl RefreshHook for NotifyRefresh {
    fn refresh(&self) {
        self.notify.notify_one();
    }
}

fn state_label(state: LifecycleState) -> &'static str {
    match state {
        LifecycleState::Unknown => "stopped",
        LifecycleState::Waiting => "waiting",
        LifecycleState::Running => "running",
    }
}

/// Plain-text status table, one row per chain.
pub fn render_table(states: &[ChainState]) -> String {
    let header = format!(
        "{:<12} {:<8} {:>8} {:>14} {:>4} {:>8}",
        "CHAIN", "STATE", "HEIGHT", "BALANCE", "SLOT", "AUTOMINE"
    );
    let rows = states.iter().map(|state| {
        let slot = state
            .slot
            .map(|slot| slot.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{:<12} {:<8} {:>8} {:>14.8} {:>4} {:>8}",
            state.id,
            state_label(state.state),
            state.height,
            state.available_balance,
            slot,
            if state.automine { "on" } else { "off" }
        )
    });
    std::iter::once(header)
        .chain(rows)
        .map(|line| line + "\n")
        .collect()
}
