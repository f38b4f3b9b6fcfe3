use std::{collections::BTreeMap, time::Duration};

use dcl_config::{Catalog, ChainDescriptor, LaunchKind};
use dcl_supervisor::{poller::POLL_INTERVAL, LifecycleState};
use serde_json::json;

use crate::testing_tool::launcher::{catalog, descriptor, TestLauncher, ROOT_ID};

#[tokio::test(start_paused = true)]
async fn test_any_failure_demotes_to_unknown() {
    let t = TestLauncher::new(catalog(&[("x", 1)]));
    let port = t.port("x");

    // Waiting -> Unknown
    t.supervisor.launch("x").await.unwrap();
    t.rpc.fail(port, "getblockcount");
    assert!(t.supervisor.poll_once("x").await.unwrap());
    assert_eq!(t.supervisor.state("x").unwrap().state, LifecycleState::Unknown);

    // Running -> Unknown, height kept
    t.rpc.reply(port, "getblockcount", json!(42));
    t.supervisor.poll_once("x").await.unwrap();
    t.rpc.fail(port, "getblockcount");
    assert!(t.supervisor.poll_once("x").await.unwrap());
    let state = t.supervisor.state("x").unwrap();
    assert_eq!(state.state, LifecycleState::Unknown);
    assert_eq!(state.height, 42);

    // Unknown -> Unknown is no change.
    t.refresh.take();
    t.rpc.fail(port, "getblockcount");
    assert!(!t.supervisor.poll_once("x").await.unwrap());
    assert_eq!(t.refresh.take(), 0);
}

#[tokio::test]
async fn test_undecodable_height_is_failure() {
    let t = TestLauncher::new(catalog(&[("x", 1)]));
    let port = t.port("x");
    t.rpc.reply(port, "getblockcount", json!(7));
    t.supervisor.poll_once("x").await.unwrap();

    t.rpc.reply(port, "getblockcount", json!("seven"));
    assert!(t.supervisor.poll_once("x").await.unwrap());
    assert_eq!(t.supervisor.state("x").unwrap().state, LifecycleState::Unknown);
}

#[tokio::test]
async fn test_automine_generates_before_height_query() {
    let t = TestLauncher::new(catalog(&[("x", 1)]));
    let port = t.root_port();
    t.supervisor.set_automine(true);
    assert!(t.supervisor.state(ROOT_ID).unwrap().automine);
    assert_eq!(t.refresh.take(), 1);

    t.rpc.reply(port, "generate", json!(["00"]));
    t.rpc.reply(port, "getblockcount", json!(11));
    t.supervisor.poll_once(ROOT_ID).await.unwrap();

    let methods: Vec<_> = t.rpc.calls().into_iter().map(|c| c.method).collect();
    assert_eq!(methods, vec!["generate", "getblockcount"]);
    assert_eq!(t.rpc.calls_to("generate")[0].params, vec![json!(1)]);
}

#[tokio::test]
async fn test_automine_failure_is_not_a_state_change() {
    let t = TestLauncher::new(catalog(&[]));
    let port = t.root_port();
    t.rpc.reply(port, "getblockcount", json!(3));
    t.supervisor.poll_once(ROOT_ID).await.unwrap();

    t.supervisor.set_automine(true);
    t.refresh.take();
    t.rpc.fail(port, "generate");
    t.rpc.reply(port, "getblockcount", json!(3));
    assert!(!t.supervisor.poll_once(ROOT_ID).await.unwrap());
    assert_eq!(t.supervisor.state(ROOT_ID).unwrap().state, LifecycleState::Running);
    assert_eq!(t.refresh.take(), 0);
}

#[tokio::test]
async fn test_automine_only_on_root() {
    let t = TestLauncher::new(catalog(&[("x", 1)]));
    t.supervisor.set_automine(true);
    t.rpc.reply(t.port("x"), "getblockcount", json!(1));
    t.supervisor.poll_once("x").await.unwrap();
    assert!(t.rpc.calls_to("generate").is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_peer_chain_polls_process_liveness() {
    let mut descriptors = BTreeMap::new();
    descriptors.insert(ROOT_ID.to_string(), descriptor(ROOT_ID, 0, None));
    descriptors.insert(
        "thunder".to_string(),
        ChainDescriptor {
            launch: LaunchKind::Peer,
            ..descriptor("thunder", 1, Some(9))
        },
    );
    let t = TestLauncher::new(Catalog::new(descriptors).unwrap());

    t.supervisor.launch("thunder").await.unwrap();
    assert!(t.supervisor.poll_once("thunder").await.unwrap());
    assert_eq!(t.supervisor.state("thunder").unwrap().state, LifecycleState::Running);

    t.process.set_running("thunder", false);
    assert!(t.supervisor.poll_once("thunder").await.unwrap());
    assert_eq!(t.supervisor.state("thunder").unwrap().state, LifecycleState::Unknown);
    assert!(t.rpc.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_poller_ticks_until_cancelled() {
    let t = TestLauncher::new(catalog(&[("x", 1)]));
    t.rpc.always(t.port("x"), "getblockcount", json!(9));

    t.supervisor.launch("x").await.unwrap();
    // No poll before the first interval elapses.
    assert!(t.rpc.calls_to("getblockcount").is_empty());

    tokio::time::sleep(POLL_INTERVAL + Duration::from_millis(500)).await;
    let state = t.supervisor.state("x").unwrap();
    assert_eq!(state.state, LifecycleState::Running);
    assert_eq!(state.height, 9);

    tokio::time::sleep(POLL_INTERVAL * 2).await;
    let polls = t.rpc.calls_to("getblockcount").len();
    assert_eq!(polls, 3);

    t.supervisor.shutdown_pollers();
    assert!(!t.supervisor.chain("x").unwrap().has_poller());
    tokio::time::sleep(POLL_INTERVAL * 5).await;
    assert_eq!(t.rpc.calls_to("getblockcount").len(), polls);
}

#[tokio::test]
async fn test_balance_on_demand() {
    let t = TestLauncher::new(catalog(&[("x", 1)]));
    let port = t.port("x");

    t.rpc.reply(port, "getbalance", json!(1.5));
    assert!(t.supervisor.refresh_balance("x").await.unwrap());
    assert_eq!(t.refresh.take(), 1);

    t.rpc.reply(port, "getbalance", json!(1.5));
    assert!(!t.supervisor.refresh_balance("x").await.unwrap());

    t.rpc.fail(port, "getbalance");
    assert!(!t.supervisor.refresh_balance("x").await.unwrap());
    assert_eq!(t.supervisor.state("x").unwrap().available_balance, 1.5);
    assert_eq!(t.refresh.take(), 0);

    assert!(t.supervisor.refresh_balance("nope").await.is_err());
}
