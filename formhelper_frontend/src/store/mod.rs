//! Observable mirrors of the remote collections.

mod collection;
mod files;
mod persons;
mod reconcile;
mod records;

pub use collection::{CollectionState, CollectionStore, Entity, FetchOutcome};
pub use files::FileStore;
pub use persons::PersonStore;
pub use reconcile::{Mutation, Patch, Reconciliation};
pub use records::RecordStore;
