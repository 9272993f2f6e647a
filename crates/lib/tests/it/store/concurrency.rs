//! Concurrent registration must never hand out one identifier twice.

use std::collections::HashSet;

use crate::helpers::{TestStore, all_stores, creds};

const PLAYERS: usize = 64;

async fn register_concurrently(t: &TestStore) {
    let before = t.store.count().await.unwrap();

    let mut handles = Vec::with_capacity(PLAYERS);
    for i in 0..PLAYERS {
        let store = t.store.clone();
        handles.push(tokio::spawn(async move {
            store.register(&creds(&format!("player{i}"), "pw")).await
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        let id = handle.await.unwrap().unwrap();
        assert!(id.is_valid(), "{}", t.label);
        assert!(ids.insert(id), "{}: id {id} handed out twice", t.label);
    }
    assert_eq!(t.store.count().await.unwrap(), before + PLAYERS, "{}", t.label);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations_get_distinct_ids() {
    for t in all_stores().await {
        register_concurrently(&t).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_of_one_login_succeeds_once() {
    for t in all_stores().await {
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = t.store.clone();
            handles.push(tokio::spawn(async move {
                store.register(&creds("contested", &format!("pw{i}"))).await
            }));
        }

        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => winners += 1,
                Err(e) => assert!(e.is_login_occupied(), "{}: {e}", t.label),
            }
        }
        assert_eq!(winners, 1, "{}", t.label);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reads_run_alongside_writes() {
    for t in all_stores().await {
        t.store.register(&creds("reader", "pw")).await.unwrap();
        let reader_id = t.store.authorize(&creds("reader", "pw")).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..32 {
            let store = t.store.clone();
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    store.register(&creds(&format!("writer{i}"), "pw")).await.map(|_| ())
                } else {
                    let id = store.authorize(&creds("reader", "pw")).await?;
                    assert_eq!(id, reader_id);
                    Ok(())
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
    }
}
