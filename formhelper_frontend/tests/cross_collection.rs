mod support;

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use formhelper_frontend::models::{FileDraft, PersonId, RecordScope};
use formhelper_frontend::port::{commands, CommandError, RemoteCommandPort};
use formhelper_frontend::settings::SettingsStore;
use formhelper_frontend::{AppStores, FileStore, PersonStore, RecordStore};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use support::FakeRemote;
use tempfile::tempdir;
use tokio::sync::{oneshot, Notify};

#[tokio::test]
async fn deleting_a_person_leaves_referencing_files_alone() {
    let remote = FakeRemote::new();
    let persons = PersonStore::new(remote.clone());
    let files = FileStore::new(remote.clone());

    let alice = persons.create("Alice").await.unwrap();
    let file = files
        .create(&FileDraft::new("intake.pdf", "/forms/intake.pdf", "pdf").for_person(alice))
        .await
        .unwrap();
    let before = files.files();

    persons.delete(alice).await.unwrap();
    assert!(persons.get(alice).is_none());

    // Neither the mirror nor a fresh listing changes the file.
    assert_eq!(files.files(), before);
    files.fetch_all().await;
    assert_eq!(files.files(), before);
    assert_eq!(files.get(file).unwrap().person_id, Some(alice));
    assert_eq!(files.files_for_person(alice).len(), 1);
}

#[tokio::test]
async fn files_can_reference_unknown_or_no_person() {
    let remote = FakeRemote::new();
    let files = FileStore::new(remote.clone());

    files
        .create(&FileDraft::new("loose.xlsx", "/forms/loose.xlsx", "xlsx"))
        .await
        .unwrap();
    files
        .create(&FileDraft::new("orphan.xlsx", "/forms/orphan.xlsx", "xlsx").for_person(PersonId(404)))
        .await
        .unwrap();

    assert_eq!(files.count(), 2);
    assert_eq!(files.files_for_person(PersonId(404))[0].file_name, "orphan.xlsx");
    assert!(files.files().iter().any(|f| f.person_id.is_none()));
}

#[tokio::test]
async fn stores_pick_up_remote_changes_only_on_refetch() {
    let remote = FakeRemote::new();
    let persons = PersonStore::new(remote.clone());
    persons.fetch_all().await;

    remote.seed_person("Added elsewhere");
    assert_eq!(persons.count(), 0);

    persons.fetch_all().await;
    assert_eq!(persons.persons()[0].name, "Added elsewhere");
}

#[tokio::test]
async fn file_update_moves_reference_and_refetches() {
    let remote = FakeRemote::new();
    let files = FileStore::new(remote.clone());
    let id = files
        .create(&FileDraft::new("a.pdf", "/a.pdf", "pdf").for_person(PersonId(1)))
        .await
        .unwrap();

    let mut draft = FileDraft::from(&files.get(id).unwrap());
    draft.person_id = Some(PersonId(2));
    draft.file_name = "b.pdf".into();
    remote.clear_calls();
    files.update(id, &draft).await.unwrap();

    let stored = files.get(id).unwrap();
    assert_eq!(stored.person_id, Some(PersonId(2)));
    assert_eq!(stored.file_name, "b.pdf");
    assert_eq!(
        remote.calls(),
        vec![commands::UPDATE_FILE.to_string(), commands::GET_FILES.to_string()]
    );
}

/// Holds every listing until released.
struct Gated {
    release: Notify,
}

#[async_trait]
impl RemoteCommandPort for Gated {
    async fn invoke(&self, _command: &str, _args: Value) -> Result<Value, CommandError> {
        self.release.notified().await;
        Ok(json!([]))
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn loading_is_visible_while_a_listing_is_in_flight() {
    let port = Arc::new(Gated {
        release: Notify::new(),
    });
    let persons = Arc::new(PersonStore::new(port.clone()));
    let mut rx = persons.subscribe();

    let task = tokio::spawn({
        let persons = persons.clone();
        async move { persons.fetch_all().await }
    });

    rx.wait_for(|state| state.loading).await.unwrap();
    assert!(persons.is_loading());

    port.release.notify_one();
    let outcome = task.await.unwrap();
    assert!(outcome.is_refreshed());
    assert!(!persons.is_loading());
}

/// Answers listings in call order, each one held until its sender fires.
struct Sequenced {
    pending: Mutex<VecDeque<oneshot::Receiver<Value>>>,
    entered: Notify,
}

#[async_trait]
impl RemoteCommandPort for Sequenced {
    async fn invoke(&self, _command: &str, _args: Value) -> Result<Value, CommandError> {
        let answer = self
            .pending
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CommandError::Transport("no answer queued".into()))?;
        self.entered.notify_one();
        answer
            .await
            .map_err(|_| CommandError::Transport("answer dropped".into()))
    }
}

fn one_person(name: &str) -> Value {
    json!([{
        "id": 1,
        "name": name,
        "created_at": "2024-01-01T00:00:00.000000Z",
        "updated_at": "2024-01-01T00:00:00.000000Z",
    }])
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn overlapping_listings_keep_the_last_answer() {
    let (first_tx, first_rx) = oneshot::channel();
    let (second_tx, second_rx) = oneshot::channel();
    let port = Arc::new(Sequenced {
        pending: Mutex::new(VecDeque::from([first_rx, second_rx])),
        entered: Notify::new(),
    });
    let persons = Arc::new(PersonStore::new(port.clone()));

    let first = tokio::spawn({
        let persons = persons.clone();
        async move { persons.fetch_all().await }
    });
    port.entered.notified().await;
    let second = tokio::spawn({
        let persons = persons.clone();
        async move { persons.fetch_all().await }
    });
    port.entered.notified().await;

    second_tx.send(one_person("new")).unwrap();
    assert!(second.await.unwrap().is_refreshed());
    assert_eq!(persons.persons()[0].name, "new");

    // The earlier request answers last, so its listing wins.
    first_tx.send(one_person("old")).unwrap();
    assert!(first.await.unwrap().is_refreshed());
    assert_eq!(persons.persons()[0].name, "old");
    assert_eq!(persons.count(), 1);
    assert!(!persons.is_loading());
}

#[tokio::test]
async fn record_scope_follows_file_and_person_filters() {
    let remote = FakeRemote::new();
    let alice = remote.seed_person("Alice");
    let intake = remote.seed_file("intake.pdf", Some(alice));
    let loose = remote.seed_file("loose.pdf", None);
    let records = RecordStore::new(remote.clone());

    let inherited = records.create(intake, None, r#"{"rows":[["1"]]}"#).await.unwrap();
    let tagged = records
        .create(loose, Some(alice), r#"{"rows":[["2"]]}"#)
        .await
        .unwrap();
    let untagged = records.create(loose, None, r#"{"rows":[["3"]]}"#).await.unwrap();
    assert_eq!(records.count(), 3);
    assert_eq!(records.get(inherited).unwrap().person_id, Some(alice));

    assert!(records.set_scope(RecordScope::Person(alice)).await.is_refreshed());
    let ids: Vec<_> = records.records().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![tagged, inherited]);

    assert!(records.set_scope(RecordScope::File(loose)).await.is_refreshed());
    let ids: Vec<_> = records.records().iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![untagged, tagged]);

    // The refetch after an update stays inside the scope.
    remote.clear_calls();
    records.update(untagged, r#"{"rows":[]}"#).await.unwrap();
    assert_eq!(records.count(), 2);
    assert_eq!(records.scope(), RecordScope::File(loose));
    assert_eq!(
        remote.calls(),
        vec![commands::UPDATE_RECORD.to_string(), commands::GET_RECORDS.to_string()]
    );
}

#[tokio::test]
async fn records_survive_deleting_their_file_and_person() {
    let remote = FakeRemote::new();
    let persons = PersonStore::new(remote.clone());
    let files = FileStore::new(remote.clone());
    let records = RecordStore::new(remote.clone());

    let bob = persons.create("Bob").await.unwrap();
    let file = files
        .create(&FileDraft::new("w2.pdf", "/forms/w2.pdf", "pdf").for_person(bob))
        .await
        .unwrap();
    let record = records.create(file, None, r#"{"rows":[]}"#).await.unwrap();

    files.delete(file).await.unwrap();
    persons.delete(bob).await.unwrap();
    records.fetch_all().await;

    let stored = records.get(record).unwrap();
    assert_eq!(stored.file_id, file);
    assert_eq!(stored.person_id, Some(bob));
}

#[tokio::test]
async fn export_leaves_the_record_mirror_alone() {
    let remote = FakeRemote::new();
    let carol = remote.seed_person("Carol");
    let file = remote.seed_file("scan.pdf", Some(carol));
    let records = RecordStore::new(remote.clone());
    records.create(file, None, r#"{"rows":[["x"]]}"#).await.unwrap();
    let before = records.snapshot();
    remote.clear_calls();

    let exported = records
        .export_csv(carol, Path::new("/tmp/carol.csv"))
        .await
        .unwrap();
    assert_eq!(exported, 1);
    assert_eq!(records.snapshot(), before);
    assert_eq!(remote.calls(), vec![commands::EXPORT_TO_CSV.to_string()]);

    remote.fail_next(commands::EXPORT_TO_CSV, 1);
    assert!(records.export_csv(carol, Path::new("/tmp/carol.csv")).await.is_err());
    assert_eq!(records.snapshot(), before);
}

#[tokio::test]
async fn app_stores_preload_every_collection() {
    let remote = FakeRemote::new();
    remote.seed_person("Seeded");
    let dir = tempdir().unwrap();
    let stores = AppStores::new(
        remote.clone(),
        SettingsStore::open(dir.path().join("settings.json")),
    );

    remote.fail_next(commands::GET_FILES, 1);
    let loaded = stores.preload().await;
    assert!(loaded.persons.is_refreshed());
    assert!(loaded.files.error().is_some());
    assert!(loaded.records.is_refreshed());
    assert_eq!(stores.persons.count(), 1);
    assert_eq!(stores.files.count(), 0);
    assert!(!stores.files.is_loading());
}
