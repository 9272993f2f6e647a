//! Behavior every identity store must share.
//!
//! Each test runs against all locally available backends. The file-backed
//! store starts with the default accounts, so tests use their own logins and
//! compare counts relative to the starting point.

use yagogame::UserId;

use crate::helpers::{all_stores, creds};

#[tokio::test]
async fn test_register_then_authorize_returns_assigned_id() {
    for t in all_stores().await {
        let id = t.store.register(&creds("ann", "pw")).await.unwrap();
        assert!(id.is_valid(), "{}", t.label);
        assert_eq!(
            t.store.authorize(&creds("ann", "pw")).await.unwrap(),
            id,
            "{}",
            t.label
        );
    }
}

#[tokio::test]
async fn test_unknown_login_is_never_wrong_password() {
    for t in all_stores().await {
        let err = t.store.authorize(&creds("ghost", "pw")).await.unwrap_err();
        assert!(err.is_unknown_login(), "{}: {err}", t.label);
        assert!(!err.is_wrong_password(), "{}", t.label);
        assert_eq!(err.to_string(), "wrong login");
    }
}

#[tokio::test]
async fn test_empty_credentials_are_a_normal_lookup() {
    for t in all_stores().await {
        let err = t.store.authorize(&creds("", "")).await.unwrap_err();
        assert!(err.is_unknown_login(), "{}: {err}", t.label);
    }
}

#[tokio::test]
async fn test_wrong_password_leaves_store_unchanged() {
    for t in all_stores().await {
        t.store.register(&creds("ann", "pw")).await.unwrap();
        let before = t.store.count().await.unwrap();

        let err = t.store.authorize(&creds("ann", "nope")).await.unwrap_err();
        assert!(err.is_wrong_password(), "{}: {err}", t.label);
        assert_eq!(err.to_string(), "wrong password");
        assert_eq!(t.store.count().await.unwrap(), before, "{}", t.label);
    }
}

#[tokio::test]
async fn test_register_occupied_login_keeps_existing_user() {
    for t in all_stores().await {
        let id = t.store.register(&creds("ann", "first")).await.unwrap();
        let before = t.store.count().await.unwrap();

        let err = t.store.register(&creds("ann", "second")).await.unwrap_err();
        assert!(err.is_login_occupied(), "{}: {err}", t.label);
        assert_eq!(t.store.count().await.unwrap(), before, "{}", t.label);
        assert_eq!(t.store.authorize(&creds("ann", "first")).await.unwrap(), id);
        assert!(
            t.store
                .authorize(&creds("ann", "second"))
                .await
                .unwrap_err()
                .is_wrong_password()
        );
    }
}

#[tokio::test]
async fn test_remove_deletes_user() {
    for t in all_stores().await {
        t.store.register(&creds("ann", "pw")).await.unwrap();
        let before = t.store.count().await.unwrap();

        t.store.remove(&creds("ann", "pw")).await.unwrap();
        assert_eq!(t.store.count().await.unwrap(), before - 1, "{}", t.label);
        let err = t.store.authorize(&creds("ann", "pw")).await.unwrap_err();
        assert!(err.is_unknown_login(), "{}: {err}", t.label);
    }
}

#[tokio::test]
async fn test_remove_validates_credentials() {
    for t in all_stores().await {
        t.store.register(&creds("ann", "pw")).await.unwrap();
        let before = t.store.count().await.unwrap();

        let err = t.store.remove(&creds("ghost", "pw")).await.unwrap_err();
        assert!(err.is_unknown_login(), "{}: {err}", t.label);
        let err = t.store.remove(&creds("ann", "nope")).await.unwrap_err();
        assert!(err.is_wrong_password(), "{}: {err}", t.label);

        assert_eq!(t.store.count().await.unwrap(), before, "{}", t.label);
        assert!(t.store.authorize(&creds("ann", "pw")).await.is_ok());
    }
}

#[tokio::test]
async fn test_change_to_occupied_login_changes_nothing() {
    for t in all_stores().await {
        let ann = t.store.register(&creds("ann", "a")).await.unwrap();
        let bob = t.store.register(&creds("bob", "b")).await.unwrap();

        let err = t
            .store
            .change_requisites(&creds("ann", "a"), &creds("bob", "z"))
            .await
            .unwrap_err();
        assert!(err.is_login_occupied(), "{}: {err}", t.label);

        assert_eq!(t.store.authorize(&creds("ann", "a")).await.unwrap(), ann);
        assert_eq!(t.store.authorize(&creds("bob", "b")).await.unwrap(), bob);
    }
}

#[tokio::test]
async fn test_password_change_keeps_id() {
    for t in all_stores().await {
        let id = t.store.register(&creds("ann", "old")).await.unwrap();

        t.store
            .change_requisites(&creds("ann", "old"), &creds("ann", "new"))
            .await
            .unwrap();

        assert!(
            t.store
                .authorize(&creds("ann", "old"))
                .await
                .unwrap_err()
                .is_wrong_password(),
            "{}",
            t.label
        );
        assert_eq!(t.store.authorize(&creds("ann", "new")).await.unwrap(), id);
    }
}

#[tokio::test]
async fn test_login_change_moves_user() {
    for t in all_stores().await {
        let id = t.store.register(&creds("ann", "pw")).await.unwrap();
        let before = t.store.count().await.unwrap();

        t.store
            .change_requisites(&creds("ann", "pw"), &creds("anna", "pw2"))
            .await
            .unwrap();

        assert_eq!(t.store.count().await.unwrap(), before, "{}", t.label);
        assert_eq!(t.store.authorize(&creds("anna", "pw2")).await.unwrap(), id);
        assert!(
            t.store
                .authorize(&creds("ann", "pw"))
                .await
                .unwrap_err()
                .is_unknown_login()
        );
        // The old login is free again
        let other = t.store.register(&creds("ann", "pw")).await.unwrap();
        assert_ne!(other, id, "{}", t.label);
    }
}

#[tokio::test]
async fn test_change_validates_old_requisites_first() {
    for t in all_stores().await {
        t.store.register(&creds("ann", "a")).await.unwrap();
        t.store.register(&creds("bob", "b")).await.unwrap();

        // Wrong password is reported even though the new login is also taken
        let err = t
            .store
            .change_requisites(&creds("ann", "nope"), &creds("bob", "z"))
            .await
            .unwrap_err();
        assert!(err.is_wrong_password(), "{}: {err}", t.label);

        let err = t
            .store
            .change_requisites(&creds("ghost", "a"), &creds("casper", "z"))
            .await
            .unwrap_err();
        assert!(err.is_unknown_login(), "{}: {err}", t.label);
    }
}

#[tokio::test]
async fn test_ids_are_distinct_and_valid() {
    for t in all_stores().await {
        let mut ids: Vec<UserId> = Vec::new();
        for login in ["p1", "p2", "p3", "p4"] {
            ids.push(t.store.register(&creds(login, "pw")).await.unwrap());
        }
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), ids.len(), "{}", t.label);
        assert!(ids.iter().all(|id| id.is_valid()), "{}", t.label);
    }
}
