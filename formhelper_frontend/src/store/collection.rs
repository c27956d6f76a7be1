use std::fmt;
use std::sync::Arc;

use log::{debug, error, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;

use super::reconcile::{Mutation, Reconciliation};
use crate::port::{call, CommandError, RemoteCommandPort};

/// A row of a remote collection.
pub trait Entity: Clone + DeserializeOwned + Send + Sync + 'static {
    type Id: Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static;

    /// Command returning the collection, in display order.
    const LIST_COMMAND: &'static str;
    /// Short noun used in log lines.
    const KIND: &'static str;

    fn id(&self) -> Self::Id;
}

/// What a UI renders for one collection. Errors are not kept here; they go
/// back to whoever triggered the operation.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState<E> {
    /// Backend order, never re-sorted locally.
    pub items: Vec<E>,
    pub loading: bool,
}

impl<E> Default for CollectionState<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
        }
    }
}

impl<E> CollectionState<E> {
    pub fn count(&self) -> usize {
        self.items.len()
    }
}

/// Result of a listing. A failed listing leaves the previous items in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Refreshed { count: usize },
    Stale { error: CommandError },
}

impl FetchOutcome {
    pub fn is_refreshed(&self) -> bool {
        matches!(self, FetchOutcome::Refreshed { .. })
    }

    pub fn error(&self) -> Option<&CommandError> {
        match self {
            FetchOutcome::Refreshed { .. } => None,
            FetchOutcome::Stale { error } => Some(error),
        }
    }
}

/// Clears the loading flag when dropped, including when the fetch future is
/// dropped mid-request.
struct LoadingGuard<'a, E> {
    state: &'a watch::Sender<CollectionState<E>>,
}

impl<'a, E> LoadingGuard<'a, E> {
    fn begin(state: &'a watch::Sender<CollectionState<E>>) -> Self {
        state.send_modify(|s| s.loading = true);
        Self { state }
    }
}

impl<E> Drop for LoadingGuard<'_, E> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.loading = false);
    }
}

/// Local mirror of one remote collection.
///
/// The mirror only changes in response to a backend answer: either a full
/// listing replaces it, or a successful mutation patches it as described by
/// [`Mutation::reconciliation`]. Nothing here holds a lock across an await.
/// Overlapping fetches are not serialized; the last one to finish wins.
pub struct CollectionStore<E: Entity> {
    port: Arc<dyn RemoteCommandPort>,
    state: watch::Sender<CollectionState<E>>,
    list_args: watch::Sender<Value>,
}

impl<E: Entity> CollectionStore<E> {
    pub fn new(port: Arc<dyn RemoteCommandPort>) -> Self {
        let (state, _) = watch::channel(CollectionState::default());
        let (list_args, _) = watch::channel(Value::Null);
        Self {
            port,
            state,
            list_args,
        }
    }

    /// Arguments sent with every listing from now on, including the refetch
    /// after a mutation. The mirror keeps its items until the next listing.
    pub fn set_list_args(&self, args: Value) {
        self.list_args.send_replace(args);
    }

    /// Receiver that observes every state change.
    pub fn subscribe(&self) -> watch::Receiver<CollectionState<E>> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> CollectionState<E> {
        self.state.borrow().clone()
    }

    pub fn items(&self) -> Vec<E> {
        self.state.borrow().items.clone()
    }

    pub fn with_items<R>(&self, f: impl FnOnce(&[E]) -> R) -> R {
        f(&self.state.borrow().items)
    }

    pub fn get(&self, id: E::Id) -> Option<E> {
        self.with_items(|items| items.iter().find(|item| item.id() == id).cloned())
    }

    pub fn count(&self) -> usize {
        self.state.borrow().count()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Replaces the mirror with the backend listing.
    pub async fn fetch_all(&self) -> FetchOutcome {
        let _loading = LoadingGuard::begin(&self.state);
        let args = self.list_args.borrow().clone();
        match call::<Vec<E>>(self.port.as_ref(), E::LIST_COMMAND, args).await {
            Ok(items) => {
                let count = items.len();
                self.state.send_modify(|s| s.items = items);
                debug!("{} list refreshed ({count} entries)", E::KIND);
                FetchOutcome::Refreshed { count }
            }
            Err(error) => {
                warn!("failed to list {}s, keeping previous entries: {error}", E::KIND);
                FetchOutcome::Stale { error }
            }
        }
    }

    /// Sends `command` and, on success, reconciles the mirror for
    /// `mutation`. On failure the mirror is untouched and the error is
    /// returned.
    ///
    /// A refetch that fails after a successful mutation is logged but does not
    /// fail the mutation; the backend already applied it.
    pub async fn mutate<R: DeserializeOwned>(
        &self,
        mutation: Mutation<E::Id>,
        command: &str,
        args: Value,
    ) -> Result<R, CommandError> {
        let result = match call::<R>(self.port.as_ref(), command, args).await {
            Ok(result) => result,
            Err(err) => {
                error!("{} {} failed: {err}", E::KIND, mutation.label());
                return Err(err);
            }
        };

        match mutation.reconciliation::<E>() {
            Reconciliation::Refetch => {
                self.fetch_all().await;
            }
            patch @ Reconciliation::LocalPatch(_) => {
                self.state.send_modify(|s| {
                    patch.apply(&mut s.items);
                });
                debug!("{} {} applied locally", E::KIND, mutation.label());
            }
        }
        Ok(result)
    }
}
