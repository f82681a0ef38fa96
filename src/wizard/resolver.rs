use std::sync::Arc;
use tracing::debug;

use crate::error::StorageResult;
use crate::storage::{Person, PersonStore};

/// Outcome of resolving an entered name and birth year.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    /// Nobody on record matches.
    NoMatch,
    /// An existing person matches.
    Match {
        person: Person,
        /// Display-only descriptions of what is already on record.
        existing_relationships: Vec<String>,
    },
}

/// Decides whether an entry refers to someone already in the store.
///
/// Matching policy belongs to the store; the resolver never writes.
#[derive(Clone)]
pub struct PersonResolver {
    store: Arc<dyn PersonStore>,
}

impl PersonResolver {
    /// Create a resolver over `store`
    pub fn new(store: Arc<dyn PersonStore>) -> Self {
        Self { store }
    }

    /// Resolve `full_name` born in `birth_year`.
    pub async fn resolve(&self, full_name: &str, birth_year: i32) -> StorageResult<MatchResult> {
        let result = match self.store.check_existing_person(full_name, birth_year).await? {
            Some(existing) => MatchResult::Match {
                person: existing.person,
                existing_relationships: existing.relationships,
            },
            None => MatchResult::NoMatch,
        };

        debug!(
            full_name = %full_name,
            birth_year,
            matched = matches!(result, MatchResult::Match { .. }),
            "Resolved person entry"
        );

        Ok(result)
    }
}
