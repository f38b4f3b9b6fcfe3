use dcl_supervisor::{LifecycleState, ProcessControl};
use dclauncher_bin::runner;
use serde_json::json;

use crate::testing_tool::launcher::{catalog, TestLauncher, ROOT_ID};

async fn launch_all(t: &TestLauncher) {
    for id in [ROOT_ID, "x"] {
        t.supervisor.launch(id).await.unwrap();
        t.rpc.reply(t.port(id), "getblockcount", json!(3));
        t.supervisor.poll_once(id).await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn test_exit_leaves_chains_running() {
    let t = TestLauncher::new(catalog(&[("x", 1)]));
    launch_all(&t).await;

    runner::shutdown(&t.supervisor, false).await.unwrap();

    assert!(t.process.terminated().is_empty());
    assert!(t.rpc.calls_to("stop").is_empty());
    for id in [ROOT_ID, "x"] {
        assert!(t.process.is_running(id));
        assert!(!t.supervisor.chain(id).unwrap().has_poller());
        assert_eq!(t.supervisor.state(id).unwrap().state, LifecycleState::Running);
    }
}

#[tokio::test(start_paused = true)]
async fn test_exit_with_stop_cascades() {
    let t = TestLauncher::new(catalog(&[("x", 1)]));
    launch_all(&t).await;

    runner::shutdown(&t.supervisor, true).await.unwrap();

    assert_eq!(t.process.terminated(), vec!["x", ROOT_ID]);
    for id in [ROOT_ID, "x"] {
        assert!(!t.process.is_running(id));
        assert_eq!(t.supervisor.state(id).unwrap().state, LifecycleState::Unknown);
    }
}
