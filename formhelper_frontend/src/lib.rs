//! Client-side mirror of the person, file and table record collections.
//!
//! Stores talk to the backend only through a [`RemoteCommandPort`] and keep a
//! local copy of each collection that a UI can observe. Create and update
//! resynchronize with a full listing, delete patches the local copy.

pub mod api;
pub mod app;
pub mod config;
pub mod models;
pub mod port;
pub mod settings;
pub mod store;

pub use app::{AppStores, PreloadOutcome};
pub use port::{CommandError, RemoteCommandPort};
pub use store::{FetchOutcome, FileStore, PersonStore, RecordStore};
