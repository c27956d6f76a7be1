use std::sync::Arc;

use serde_json::json;
use tokio::sync::watch;

use super::collection::{CollectionState, CollectionStore, Entity, FetchOutcome};
use super::reconcile::Mutation;
use crate::models::{Person, PersonId};
use crate::port::{commands, CommandError, RemoteCommandPort};

impl Entity for Person {
    type Id = PersonId;
    const LIST_COMMAND: &'static str = commands::GET_PERSONS;
    const KIND: &'static str = "person";

    fn id(&self) -> PersonId {
        self.id
    }
}

/// Mirror of the backend's person list.
pub struct PersonStore {
    collection: CollectionStore<Person>,
}

impl PersonStore {
    pub fn new(port: Arc<dyn RemoteCommandPort>) -> Self {
        Self {
            collection: CollectionStore::new(port),
        }
    }

    pub async fn fetch_all(&self) -> FetchOutcome {
        self.collection.fetch_all().await
    }

    /// Creates a person and returns the id the backend assigned.
    pub async fn create(&self, name: &str) -> Result<PersonId, CommandError> {
        self.collection
            .mutate(Mutation::Create, commands::CREATE_PERSON, json!({ "name": name }))
            .await
    }

    pub async fn update(&self, id: PersonId, name: &str) -> Result<(), CommandError> {
        self.collection
            .mutate(
                Mutation::Update(id),
                commands::UPDATE_PERSON,
                json!({ "id": id, "name": name }),
            )
            .await
    }

    /// Deletes a person. Files that reference it are left alone.
    pub async fn delete(&self, id: PersonId) -> Result<(), CommandError> {
        self.collection
            .mutate(Mutation::Delete(id), commands::DELETE_PERSON, json!({ "id": id }))
            .await
    }

    pub fn persons(&self) -> Vec<Person> {
        self.collection.items()
    }

    pub fn get(&self, id: PersonId) -> Option<Person> {
        self.collection.get(id)
    }

    pub fn count(&self) -> usize {
        self.collection.count()
    }

    pub fn is_loading(&self) -> bool {
        self.collection.is_loading()
    }

    pub fn subscribe(&self) -> watch::Receiver<CollectionState<Person>> {
        self.collection.subscribe()
    }

    pub fn snapshot(&self) -> CollectionState<Person> {
        self.collection.snapshot()
    }
}
