use std::sync::Arc;

use serde_json::json;
use tokio::sync::watch;

use super::collection::{CollectionState, CollectionStore, Entity, FetchOutcome};
use super::reconcile::Mutation;
use crate::models::{FileDraft, FileId, FileRecord, PersonId};
use crate::port::{commands, CommandError, RemoteCommandPort};

impl Entity for FileRecord {
    type Id = FileId;
    const LIST_COMMAND: &'static str = commands::GET_FILES;
    const KIND: &'static str = "file";

    fn id(&self) -> FileId {
        self.id
    }
}

/// Mirror of the backend's file list. Independent of [`super::PersonStore`];
/// files point at persons by id only.
pub struct FileStore {
    collection: CollectionStore<FileRecord>,
}

impl FileStore {
    pub fn new(port: Arc<dyn RemoteCommandPort>) -> Self {
        Self {
            collection: CollectionStore::new(port),
        }
    }

    pub async fn fetch_all(&self) -> FetchOutcome {
        self.collection.fetch_all().await
    }

    /// Registers a file and returns the id the backend assigned.
    pub async fn create(&self, draft: &FileDraft) -> Result<FileId, CommandError> {
        let args = json!({
            "personId": draft.person_id,
            "fileName": draft.file_name,
            "filePath": draft.file_path,
            "fileType": draft.file_type,
        });
        self.collection
            .mutate(Mutation::Create, commands::ADD_FILE, args)
            .await
    }

    /// Rewrites name, path, type and person reference of an existing file.
    pub async fn update(&self, id: FileId, draft: &FileDraft) -> Result<(), CommandError> {
        let args = json!({
            "id": id,
            "personId": draft.person_id,
            "fileName": draft.file_name,
            "filePath": draft.file_path,
            "fileType": draft.file_type,
        });
        self.collection
            .mutate(Mutation::Update(id), commands::UPDATE_FILE, args)
            .await
    }

    pub async fn delete(&self, id: FileId) -> Result<(), CommandError> {
        self.collection
            .mutate(Mutation::Delete(id), commands::DELETE_FILE, json!({ "id": id }))
            .await
    }

    pub fn files(&self) -> Vec<FileRecord> {
        self.collection.items()
    }

    pub fn get(&self, id: FileId) -> Option<FileRecord> {
        self.collection.get(id)
    }

    /// Mirrored files whose stored reference equals `person_id`, whether or
    /// not that person still exists.
    pub fn files_for_person(&self, person_id: PersonId) -> Vec<FileRecord> {
        self.collection.with_items(|items| {
            items
                .iter()
                .filter(|file| file.person_id == Some(person_id))
                .cloned()
                .collect()
        })
    }

    pub fn count(&self) -> usize {
        self.collection.count()
    }

    pub fn is_loading(&self) -> bool {
        self.collection.is_loading()
    }

    pub fn subscribe(&self) -> watch::Receiver<CollectionState<FileRecord>> {
        self.collection.subscribe()
    }

    pub fn snapshot(&self) -> CollectionState<FileRecord> {
        self.collection.snapshot()
    }
}
