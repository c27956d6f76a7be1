use std::path::Path;
use std::sync::Arc;

use log::info;
use serde_json::json;
use tokio::sync::watch;

use super::collection::{CollectionState, CollectionStore, Entity, FetchOutcome};
use super::reconcile::Mutation;
use crate::models::{FileId, PersonId, RecordId, RecordScope, TableRecord};
use crate::port::{call, commands, CommandError, RemoteCommandPort};

impl Entity for TableRecord {
    type Id = RecordId;
    const LIST_COMMAND: &'static str = commands::GET_RECORDS;
    const KIND: &'static str = "record";

    fn id(&self) -> RecordId {
        self.id
    }
}

/// Mirror of the table records in one [`RecordScope`]. Records point at files
/// and persons by id only.
pub struct RecordStore {
    collection: CollectionStore<TableRecord>,
    scope: watch::Sender<RecordScope>,
    port: Arc<dyn RemoteCommandPort>,
}

impl RecordStore {
    pub fn new(port: Arc<dyn RemoteCommandPort>) -> Self {
        let (scope, _) = watch::channel(RecordScope::All);
        Self {
            collection: CollectionStore::new(port.clone()),
            scope,
            port,
        }
    }

    pub fn scope(&self) -> RecordScope {
        *self.scope.borrow()
    }

    /// Switches the mirrored slice and lists it. Until the listing answers the
    /// mirror still shows the previous slice.
    pub async fn set_scope(&self, scope: RecordScope) -> FetchOutcome {
        self.scope.send_replace(scope);
        self.collection.set_list_args(scope.to_args());
        self.collection.fetch_all().await
    }

    pub async fn fetch_all(&self) -> FetchOutcome {
        self.collection.fetch_all().await
    }

    /// Stores a table for `file_id`. Without `person_id` the backend copies
    /// the file's person reference.
    pub async fn create(
        &self,
        file_id: FileId,
        person_id: Option<PersonId>,
        content: &str,
    ) -> Result<RecordId, CommandError> {
        let args = json!({
            "fileId": file_id,
            "personId": person_id,
            "content": content,
        });
        self.collection
            .mutate(Mutation::Create, commands::ADD_RECORD, args)
            .await
    }

    /// Replaces the table content of a record.
    pub async fn update(&self, id: RecordId, content: &str) -> Result<(), CommandError> {
        self.collection
            .mutate(
                Mutation::Update(id),
                commands::UPDATE_RECORD,
                json!({ "id": id, "content": content }),
            )
            .await
    }

    pub async fn delete(&self, id: RecordId) -> Result<(), CommandError> {
        self.collection
            .mutate(Mutation::Delete(id), commands::DELETE_RECORD, json!({ "id": id }))
            .await
    }

    /// Asks the backend to write every record of `person_id` to `path` as CSV.
    /// Returns the number of records written. The mirror is not touched.
    pub async fn export_csv(&self, person_id: PersonId, path: &Path) -> Result<usize, CommandError> {
        let exported = call::<usize>(
            self.port.as_ref(),
            commands::EXPORT_TO_CSV,
            json!({ "personId": person_id, "filePath": path.to_string_lossy() }),
        )
        .await?;
        info!("exported {exported} record(s) of person {person_id} to {}", path.display());
        Ok(exported)
    }

    pub fn records(&self) -> Vec<TableRecord> {
        self.collection.items()
    }

    pub fn get(&self, id: RecordId) -> Option<TableRecord> {
        self.collection.get(id)
    }

    pub fn count(&self) -> usize {
        self.collection.count()
    }

    pub fn is_loading(&self) -> bool {
        self.collection.is_loading()
    }

    pub fn subscribe(&self) -> watch::Receiver<CollectionState<TableRecord>> {
        self.collection.subscribe()
    }

    pub fn snapshot(&self) -> CollectionState<TableRecord> {
        self.collection.snapshot()
    }
}
