// ✏️ Entry Service - save / delete over the whole collection
// Read snapshot → mutate in memory → compare-and-swap, retrying from a fresh
// read when another writer slipped in between.

use tracing::{info, warn};

use crate::auth::AccessContext;
use crate::entry::Entry;
use crate::error::ServiceError;
use crate::store::EntryStore;

pub type Result<T> = std::result::Result<T, ServiceError>;

/// Attempts before a write gives up with `ServiceError::Conflict`
pub const MAX_WRITE_ATTEMPTS: usize = 8;

pub struct EntryService<S> {
    store: S,
}

impl<S: EntryStore> EntryService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current collection (public, no access check)
    pub fn list(&self) -> Result<Vec<Entry>> {
        Ok(self.store.read()?)
    }

    /// Insert-or-update by id. Existing entries are replaced in place,
    /// new ids are appended. Fields are stored as given.
    pub fn save(&self, ctx: &AccessContext, entry: Entry) -> Result<Vec<Entry>> {
        require_admin(ctx)?;
        let id = entry.id.clone();
        let entries = self.update(|entries| upsert(entries, entry.clone()))?;
        info!(id = %id, total = entries.len(), "saved entry");
        Ok(entries)
    }

    /// Remove every entry with a matching id
    pub fn delete(&self, ctx: &AccessContext, id: &str) -> Result<Vec<Entry>> {
        require_admin(ctx)?;
        let entries = self.update(|entries| {
            remove(entries, id);
        })?;
        info!(id = %id, total = entries.len(), "deleted entry");
        Ok(entries)
    }

    fn update<F>(&self, mutate: F) -> Result<Vec<Entry>>
    where
        F: Fn(&mut Vec<Entry>),
    {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let mut snapshot = self.store.snapshot()?;
            mutate(&mut snapshot.entries);

            if self
                .store
                .compare_and_swap(snapshot.revision, &snapshot.entries)?
            {
                return Ok(snapshot.entries);
            }

            warn!(
                attempt,
                revision = snapshot.revision,
                "entry collection changed during update, retrying"
            );
        }

        Err(ServiceError::Conflict {
            attempts: MAX_WRITE_ATTEMPTS,
        })
    }
}

fn require_admin(ctx: &AccessContext) -> Result<()> {
    if ctx.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

/// Replace at the position of the first matching id, or append
pub fn upsert(entries: &mut Vec<Entry>, entry: Entry) {
    match entries.iter().position(|e| e.id == entry.id) {
        Some(index) => entries[index] = entry,
        None => entries.push(entry),
    }
}

/// Drop every entry whose id matches; returns how many were removed
pub fn remove(entries: &mut Vec<Entry>, id: &str) -> usize {
    let before = entries.len();
    entries.retain(|e| e.id != id);
    before - entries.len()
}
