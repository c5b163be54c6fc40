//! Concurrency tests for SessionRegistry
//!
//! These tests validate that the registry stays consistent under load:
//! - Concurrent creates never lose or duplicate rooms
//! - Concurrent joins to one room never drop a member or connection
//! - Joins to different rooms do not interfere

use std::collections::HashSet;
use std::sync::Arc;

use meetcode_core::{ConnectionHandle, ConnectionId, SessionRegistry};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_yield_distinct_sessions() {
    let registry = Arc::new(SessionRegistry::new());
    registry.create("existing").await.unwrap();
    let before = registry.len().await;

    let tasks: Vec<_> = (0..64)
        .map(|i| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move { registry.create(&format!("host-{}", i)).await })
        })
        .collect();

    let mut ids = HashSet::new();
    for task in tasks {
        let id = task.await.unwrap().unwrap();
        assert!(ids.insert(id), "Session id issued twice");
    }

    assert_eq!(registry.len().await, before + 64);
    for id in &ids {
        assert!(registry.lookup(id).await.is_ok());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_joins_to_same_session_are_not_lost() {
    let registry = Arc::new(SessionRegistry::new());
    let id = registry.create("host").await.unwrap();

    let mut handles = Vec::new();
    let mut receivers = Vec::new();
    for _ in 0..50 {
        let (handle, rx) = ConnectionHandle::channel(4);
        handles.push(handle);
        receivers.push(rx);
    }

    let tasks: Vec<_> = handles
        .iter()
        .cloned()
        .enumerate()
        .map(|(i, handle)| {
            let registry = Arc::clone(&registry);
            let id = id.clone();
            tokio::spawn(async move {
                registry
                    .add_member(&id, &format!("member-{}", i), handle)
                    .await
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let session = registry.lookup(&id).await.unwrap();
    let members: HashSet<String> = session.members().await.into_iter().collect();
    let connections: HashSet<_> = session
        .peers_except(ConnectionId::new())
        .await
        .iter()
        .map(ConnectionHandle::id)
        .collect();

    assert_eq!(members.len(), 50);
    assert_eq!(connections.len(), 50);
    for handle in &handles {
        assert!(connections.contains(&handle.id()));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn joins_to_other_sessions_do_not_affect_a_session() {
    let registry = Arc::new(SessionRegistry::new());
    let target = registry.create("target").await.unwrap();
    let mut others = Vec::new();
    for i in 0..8 {
        others.push(registry.create(&format!("other-{}", i)).await.unwrap());
    }

    let (mine, _rx) = ConnectionHandle::channel(1);
    let noise: Vec<_> = others
        .iter()
        .cloned()
        .map(|id| {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                for n in 0..20 {
                    let (handle, _rx) = ConnectionHandle::channel(1);
                    registry
                        .add_member(&id, &format!("noise-{}", n), handle)
                        .await
                        .unwrap();
                }
            })
        })
        .collect();

    registry
        .add_member(&target, "me", mine.clone())
        .await
        .unwrap();
    for task in noise {
        task.await.unwrap();
    }

    let snapshot = registry.snapshot(&target).await.unwrap();
    assert_eq!(snapshot.members, vec!["me"]);
    assert_eq!(snapshot.connections, 1);
    for id in &others {
        assert_eq!(registry.snapshot(id).await.unwrap().members.len(), 20);
    }
}
