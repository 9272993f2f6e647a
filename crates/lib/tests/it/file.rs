//! File-backed store: seeding, on-disk content and failure behavior.

use std::path::Path;

use yagogame::{
    UserId,
    backend::{
        IdentityStore,
        database::{Codec, FileBacked, JsonCodec},
    },
    constants::DEFAULT_USERS,
};

use crate::helpers::creds;

fn read(path: &Path) -> Vec<u8> {
    std::fs::read(path).expect("users file should exist")
}

#[tokio::test]
async fn test_absent_file_is_seeded_and_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");

    let store = FileBacked::open(&path).await.unwrap();

    assert_eq!(store.count().await.unwrap(), DEFAULT_USERS.len());
    assert_eq!(
        store.authorize(&creds("Joe", "aaa")).await.unwrap(),
        UserId::new(1)
    );
    assert_eq!(
        store.authorize(&creds("Nick", "bbb")).await.unwrap(),
        UserId::new(2)
    );

    let on_disk = JsonCodec.decode(&mut read(&path).as_slice()).unwrap();
    assert_eq!(on_disk.len(), DEFAULT_USERS.len());
}

#[tokio::test]
async fn test_existing_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(&path, r#"[{"login":"Ann","password":"ccc","id":5}]"#).unwrap();

    let store = FileBacked::open(&path).await.unwrap();

    assert_eq!(store.count().await.unwrap(), 1);
    assert_eq!(
        store.authorize(&creds("Ann", "ccc")).await.unwrap(),
        UserId::new(5)
    );
    assert!(
        store
            .authorize(&creds("Joe", "aaa"))
            .await
            .unwrap_err()
            .is_unknown_login()
    );
}

#[tokio::test]
async fn test_unsupported_extension_fails_construction() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["tmp.json.tar", "users", "users.yaml"] {
        let err = FileBacked::open(dir.path().join(name)).await.err().unwrap();
        assert!(err.is_config_error(), "{name}: {err}");
    }
    let err = FileBacked::open("").await.err().unwrap();
    assert!(err.is_config_error(), "{err}");
    // Nothing was created
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_corrupted_file_fails_and_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    let corrupted = r#"[{"log":"Joe","pass":"aaa","i":1}]"#;
    std::fs::write(&path, corrupted).unwrap();

    let err = FileBacked::open(&path).await.err().unwrap();
    assert!(err.is_integrity_error(), "{err}");
    assert_eq!(read(&path), corrupted.as_bytes());
}

#[tokio::test]
async fn test_undecodable_file_fails_construction() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(&path, r#"[{"login":"Joe","password":"aaa","id":"ERR"}]"#).unwrap();

    let err = FileBacked::open(&path).await.err().unwrap();
    assert!(err.is_integrity_error(), "{err}");
}

#[tokio::test]
async fn test_unwritable_location_fails_construction() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("users.json");

    let err = FileBacked::open(&path).await.err().unwrap();
    assert!(err.is_io_error(), "{err}");
}

#[tokio::test]
async fn test_authorize_does_not_touch_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    let store = FileBacked::open(&path).await.unwrap();
    let before = read(&path);

    store.authorize(&creds("Joe", "aaa")).await.unwrap();
    store.authorize(&creds("Joe", "wrong")).await.unwrap_err();
    store.authorize(&creds("ghost", "aaa")).await.unwrap_err();
    store.count().await.unwrap();

    assert_eq!(read(&path), before);
}

#[tokio::test]
async fn test_each_mutation_rewrites_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    let store = FileBacked::open(&path).await.unwrap();

    let seeded = read(&path);
    store.register(&creds("Ann", "ccc")).await.unwrap();
    let registered = read(&path);
    assert_ne!(registered, seeded);

    store
        .change_requisites(&creds("Ann", "ccc"), &creds("Anna", "ddd"))
        .await
        .unwrap();
    let changed = read(&path);
    assert_ne!(changed, registered);

    store.remove(&creds("Anna", "ddd")).await.unwrap();
    let removed = read(&path);
    assert_ne!(removed, changed);
    assert_eq!(removed, seeded);

    // Only the users file is left behind
    let names: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("users.json")]);
}

#[tokio::test]
async fn test_failed_mutation_leaves_nothing_behind() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");
    let store = FileBacked::open(&path).await.unwrap();

    let err = store.register(&creds("Joe", "zzz")).await.unwrap_err();
    assert!(err.is_login_occupied());

    let before = read(&path);
    store
        .change_requisites(&creds("Joe", "aaa"), &creds("Nick", "zzz"))
        .await
        .unwrap_err();
    assert_eq!(read(&path), before);
}

#[tokio::test]
async fn test_failed_write_keeps_previous_state() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    std::fs::create_dir(&data_dir).unwrap();
    let store = FileBacked::open(data_dir.join("users.json")).await.unwrap();
    let count = store.count().await.unwrap();

    std::fs::remove_dir_all(&data_dir).unwrap();

    let err = store.register(&creds("Ann", "ccc")).await.unwrap_err();
    assert!(err.is_io_error(), "{err}");
    assert_eq!(store.count().await.unwrap(), count);
    assert!(
        store
            .authorize(&creds("Ann", "ccc"))
            .await
            .unwrap_err()
            .is_unknown_login()
    );

    let err = store.remove(&creds("Joe", "aaa")).await.unwrap_err();
    assert!(err.is_io_error(), "{err}");
    assert_eq!(
        store.authorize(&creds("Joe", "aaa")).await.unwrap(),
        UserId::new(1)
    );
}

#[tokio::test]
async fn test_changes_survive_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.json");

    let id = {
        let store = FileBacked::open(&path).await.unwrap();
        store.remove(&creds("Joe", "aaa")).await.unwrap();
        store.register(&creds("Ann", "ccc")).await.unwrap()
    };
    // The freed id is reused
    assert_eq!(id, UserId::new(1));

    let reopened = FileBacked::open(&path).await.unwrap();
    assert_eq!(reopened.count().await.unwrap(), 2);
    assert_eq!(reopened.authorize(&creds("Ann", "ccc")).await.unwrap(), id);
    assert!(
        reopened
            .authorize(&creds("Joe", "aaa"))
            .await
            .unwrap_err()
            .is_unknown_login()
    );
}
