//! Person store for the family graph.
//!
//! This module defines the [`PersonStore`] contract consumed by the wizard,
//! the person and relationship records it deals in, and two implementations:
//! [`SqliteStore`] for persistence and [`MemoryStore`] for tests and demos.

mod memory;
mod sqlite;


pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::config::{DataSource, DatabaseConfig};
use crate::error::StorageResult;

/// A person in the family graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Unique person identifier.
    pub id: String,
    /// Full name as entered.
    pub full_name: String,
    /// Year of birth.
    pub birth_year: i32,
}

impl Person {
    /// Create a new person with a fresh identifier
    pub fn new(full_name: impl Into<String>, birth_year: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            full_name: full_name.into(),
            birth_year,
        }
    }

    /// Human-readable label, e.g. `Lakshmi Rao (1950)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.full_name, self.birth_year)
    }
}

/// Kind of a stored relationship row.
///
/// A row `(person_id, related_person_id, type)` reads "the related person is
/// the `type` of the person".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    /// Related person is a parent of the person.
    Parent,
    /// Related person is a child of the person.
    Child,
    /// Related person is a sibling of the person.
    Sibling,
    /// Related person is a spouse of the person.
    Spouse,
}

impl RelationshipType {
    /// Stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Parent => "PARENT",
            RelationshipType::Child => "CHILD",
            RelationshipType::Sibling => "SIBLING",
            RelationshipType::Spouse => "SPOUSE",
        }
    }

    /// Lowercase noun used in chat messages.
    pub fn noun(&self) -> &'static str {
        match self {
            RelationshipType::Parent => "parent",
            RelationshipType::Child => "child",
            RelationshipType::Sibling => "sibling",
            RelationshipType::Spouse => "spouse",
        }
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RelationshipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PARENT" => Ok(RelationshipType::Parent),
            "CHILD" => Ok(RelationshipType::Child),
            "SIBLING" => Ok(RelationshipType::Sibling),
            "SPOUSE" => Ok(RelationshipType::Spouse),
            _ => Err(format!("Unknown relationship type: {}", s)),
        }
    }
}

/// A directed relationship row between two people.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    /// Unique relationship identifier.
    pub id: String,
    /// The person the row belongs to.
    pub person_id: String,
    /// The person who stands in `relationship_type` to `person_id`.
    pub related_person_id: String,
    /// Kind of relationship.
    pub relationship_type: RelationshipType,
    /// When the row was written.
    pub created_at: DateTime<Utc>,
}

impl Relationship {
    /// Create a new relationship row
    pub fn new(
        person_id: impl Into<String>,
        related_person_id: impl Into<String>,
        relationship_type: RelationshipType,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            person_id: person_id.into(),
            related_person_id: related_person_id.into(),
            relationship_type,
            created_at: Utc::now(),
        }
    }

    /// Whether two rows describe the same edge (ignores id and timestamp).
    pub fn same_edge(&self, other: &Relationship) -> bool {
        self.person_id == other.person_id
            && self.related_person_id == other.related_person_id
            && self.relationship_type == other.relationship_type
    }
}

/// An already-recorded person together with the relationships on file for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistingPerson {
    /// The matching person.
    pub person: Person,
    /// Descriptions such as `parent of Ravi Rao`, oldest first.
    pub relationships: Vec<String>,
}

/// Describe how `candidate` relates to `other` for display.
pub(crate) fn describe_relationship(kind: RelationshipType, other: &Person) -> String {
    format!("{} of {}", kind.noun(), other.full_name)
}

/// Storage contract over the person and relationship graph.
///
/// Implementations must ignore an exact duplicate relationship row so that
/// every link operation is idempotent, and must be safe to share between
/// concurrently running wizard sessions.
#[async_trait]
pub trait PersonStore: Send + Sync {
    /// Look up a person by exact name and birth year.
    async fn check_existing_person(
        &self,
        full_name: &str,
        birth_year: i32,
    ) -> StorageResult<Option<ExistingPerson>>;

    /// Return the matching person, creating one if none exists.
    async fn find_or_create_person(&self, full_name: &str, birth_year: i32)
        -> StorageResult<Person>;

    /// Get a person by ID.
    async fn get_person(&self, id: &str) -> StorageResult<Option<Person>>;

    /// Record `parent_id` as a parent of `child_id`.
    async fn link_parent(&self, child_id: &str, parent_id: &str) -> StorageResult<()>;

    /// Record `child_id` as a child of `parent_id`.
    async fn link_child(&self, parent_id: &str, child_id: &str) -> StorageResult<()>;

    /// Record a symmetric spouse edge.
    async fn link_spouse(&self, person_id: &str, spouse_id: &str) -> StorageResult<()>;

    /// Record a symmetric sibling edge.
    async fn link_sibling(&self, person_id: &str, sibling_id: &str) -> StorageResult<()>;

    /// People standing in `relationship_type` to `person_id`.
    async fn related_people(
        &self,
        person_id: &str,
        relationship_type: RelationshipType,
    ) -> StorageResult<Vec<Person>>;

    /// Write both halves of a parent/child edge.
    ///
    /// The default issues [`link_parent`](Self::link_parent) then
    /// [`link_child`](Self::link_child); stores with transactions should
    /// override it so the pair commits as a unit.
    async fn link_parent_child(&self, parent_id: &str, child_id: &str) -> StorageResult<()> {
        self.link_parent(child_id, parent_id).await?;
        self.link_child(parent_id, child_id).await
    }
}

/// Open the person store selected by `source`.
///
/// The in-memory store starts from [`MemoryStore::sample_family`].
pub async fn open_store(
    source: DataSource,
    database: &DatabaseConfig,
) -> StorageResult<Arc<dyn PersonStore>> {
    match source {
        DataSource::Sqlite => {
            let store = SqliteStore::new(database).await?;
            info!(path = %database.path.display(), "Using SQLite person store");
            Ok(Arc::new(store))
        }
        DataSource::Memory => {
            info!("Using in-memory person store with sample family");
            Ok(Arc::new(MemoryStore::sample_family()))
        }
    }
}
