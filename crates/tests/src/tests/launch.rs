use std::time::Duration;

use dcl_config::ChainDescriptor;
use dcl_supervisor::{LaunchError, LifecycleState};
use serde_json::json;

use crate::testing_tool::{
    launcher::{catalog, descriptor, TestLauncher, ROOT_ID},
    process::ProcessEvent,
};

#[tokio::test(start_paused = true)]
async fn test_launch_poll_and_refresh() {
    let t = TestLauncher::new(catalog(&[("x", 1)]));
    let port = t.port("x");
    assert_eq!(t.supervisor.state("x").unwrap().state, LifecycleState::Unknown);

    t.supervisor.launch("x").await.unwrap();
    assert_eq!(t.supervisor.state("x").unwrap().state, LifecycleState::Waiting);
    assert!(t.supervisor.chain("x").unwrap().has_poller());
    t.refresh.take();

    t.rpc.reply(port, "getblockcount", json!(100));
    assert!(t.supervisor.poll_once("x").await.unwrap());
    let state = t.supervisor.state("x").unwrap();
    assert_eq!(state.state, LifecycleState::Running);
    assert_eq!(state.height, 100);
    assert_eq!(t.refresh.take(), 1);

    t.rpc.reply(port, "getblockcount", json!(100));
    assert!(!t.supervisor.poll_once("x").await.unwrap());
    assert_eq!(t.refresh.take(), 0);

    t.rpc.reply(port, "getblockcount", json!(101));
    assert!(t.supervisor.poll_once("x").await.unwrap());
    assert_eq!(t.supervisor.state("x").unwrap().height, 101);
    assert_eq!(t.refresh.take(), 1);
}

#[tokio::test]
async fn test_launch_builds_conf_command() {
    let t = TestLauncher::new(catalog(&[("x", 1)]));
    t.supervisor.launch("x").await.unwrap();

    let conf_dir = t.home.path().join(".x");
    match &t.process.events()[0] {
        ProcessEvent::Spawn { chain, command } => {
            assert_eq!(chain, "x");
            assert_eq!(command.program, conf_dir.join("x-qt"));
            assert_eq!(
                command.args,
                vec![format!("-conf={}", conf_dir.join("x.conf").display())]
            );
            assert!(command.detach);
        }
        other => panic!("unexpected event {:?}", other),
    }
    t.supervisor.shutdown_pollers();
}

#[tokio::test(start_paused = true)]
async fn test_relaunch_while_polling_keeps_state() {
    let t = TestLauncher::new(catalog(&[("x", 1)]));
    t.supervisor.launch("x").await.unwrap();
    t.rpc.reply(t.port("x"), "getblockcount", json!(5));
    t.supervisor.poll_once("x").await.unwrap();
    t.refresh.take();

    t.supervisor.launch("x").await.unwrap();
    assert_eq!(t.process.spawn_count("x"), 1);
    assert_eq!(t.supervisor.state("x").unwrap().state, LifecycleState::Running);
    assert_eq!(t.refresh.take(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_relaunch_respawns_dead_process() {
    let t = TestLauncher::new(catalog(&[("x", 1)]));
    t.supervisor.launch("x").await.unwrap();
    t.rpc.reply(t.port("x"), "getblockcount", json!(5));
    t.supervisor.poll_once("x").await.unwrap();

    t.process.set_running("x", false);
    t.supervisor.launch("x").await.unwrap();
    assert_eq!(t.process.spawn_count("x"), 2);
    // Monitoring resumes as it was; the next poll decides the state.
    assert_eq!(t.supervisor.state("x").unwrap().state, LifecycleState::Running);
}

#[tokio::test]
async fn test_spawn_failure_is_reported() {
    let t = TestLauncher::new(catalog(&[("x", 1)]));
    t.process.fail_spawn("x");

    let err = t.supervisor.launch("x").await.unwrap_err();
    assert!(matches!(err, LaunchError::LaunchFailed { ref chain, .. } if chain == "x"));
    assert_eq!(t.supervisor.state("x").unwrap().state, LifecycleState::Unknown);
    assert!(!t.supervisor.chain("x").unwrap().has_poller());
    assert_eq!(t.refresh.count(), 0);
}

#[tokio::test]
async fn test_launch_unknown_chain() {
    let t = TestLauncher::new(catalog(&[]));
    let err = t.supervisor.launch("nope").await.unwrap_err();
    assert!(matches!(err, LaunchError::UnknownChain(_)));
    assert!(t.process.events().is_empty());
}

fn wallet_catalog() -> dcl_config::Catalog {
    let mut descriptors = std::collections::BTreeMap::new();
    descriptors.insert(ROOT_ID.to_string(), descriptor(ROOT_ID, 0, None));
    descriptors.insert(
        "core".to_string(),
        ChainDescriptor {
            create_wallet: true,
            ..descriptor("core", 1, Some(10))
        },
    );
    dcl_config::Catalog::new(descriptors).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_wallet_created_when_wallets_dir_empty() {
    let t = TestLauncher::new(wallet_catalog());
    let port = t.port("core");
    t.rpc.always(port, "createwallet", json!({"name": "wallet"}));

    t.supervisor.launch("core").await.unwrap();
    assert!(t.rpc.calls_to("createwallet").is_empty());

    tokio::time::sleep(t.config.wallet_bootstrap_delay() + Duration::from_millis(10)).await;
    let calls = t.rpc.calls_to("createwallet");
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].port, port);
    assert_eq!(
        calls[0].params,
        vec![
            json!("wallet"),
            json!(false),
            json!(false),
            json!(""),
            json!(true),
            json!(false),
            json!(true),
            json!(false)
        ]
    );
    t.supervisor.shutdown_pollers();
}

#[tokio::test(start_paused = true)]
async fn test_existing_wallet_skips_creation() {
    let t = TestLauncher::new(wallet_catalog());
    let wallets = t.supervisor.config("core").unwrap().wallets_dir();
    std::fs::create_dir_all(wallets.join("wallet")).unwrap();

    t.supervisor.launch("core").await.unwrap();
    tokio::time::sleep(t.config.wallet_bootstrap_delay() * 2).await;
    assert!(t.rpc.calls_to("createwallet").is_empty());
    t.supervisor.shutdown_pollers();
}
