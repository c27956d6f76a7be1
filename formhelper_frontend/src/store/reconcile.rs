use std::fmt;

use super::collection::Entity;

/// In-place edit applied to a collection mirror.
pub type Patch<E> = Box<dyn FnOnce(&mut Vec<E>) + Send>;

/// How a mirror catches up with a successful mutation.
///
/// `LocalPatch` is only valid when the edit leaves the mirror exactly as a
/// fresh listing would.
pub enum Reconciliation<E> {
    /// Replace the mirror with a full listing from the backend.
    Refetch,
    /// Edit the mirror without a round trip.
    LocalPatch(Patch<E>),
}

impl<E: Entity> Reconciliation<E> {
    pub fn remove_by_id(id: E::Id) -> Self {
        Reconciliation::LocalPatch(Box::new(move |items: &mut Vec<E>| {
            items.retain(|item| item.id() != id)
        }))
    }

    pub fn is_refetch(&self) -> bool {
        matches!(self, Reconciliation::Refetch)
    }

    /// Runs a local patch. Returns `false` for `Refetch`, which the caller
    /// must handle by fetching.
    pub fn apply(self, items: &mut Vec<E>) -> bool {
        match self {
            Reconciliation::Refetch => false,
            Reconciliation::LocalPatch(edit) => {
                edit(items);
                true
            }
        }
    }
}

impl<E> fmt::Debug for Reconciliation<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reconciliation::Refetch => f.write_str("Refetch"),
            Reconciliation::LocalPatch(_) => f.write_str("LocalPatch(..)"),
        }
    }
}

/// Every mutation a store can issue. Adding a variant forces a decision in
/// [`Mutation::reconciliation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation<Id> {
    Create,
    Update(Id),
    Delete(Id),
}

impl<Id: Copy> Mutation<Id> {
    /// Create and update pick up backend-assigned ids and timestamps, so they
    /// refetch. Delete already knows the only thing that changes.
    pub fn reconciliation<E: Entity<Id = Id>>(&self) -> Reconciliation<E> {
        match *self {
            Mutation::Create | Mutation::Update(_) => Reconciliation::Refetch,
            Mutation::Delete(id) => Reconciliation::remove_by_id(id),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mutation::Create => "create",
            Mutation::Update(_) => "update",
            Mutation::Delete(_) => "delete",
        }
    }
}
