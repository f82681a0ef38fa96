use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use super::{describe_relationship, ExistingPerson, Person, PersonStore, Relationship, RelationshipType};
use crate::error::{StorageError, StorageResult};

#[derive(Default)]
struct MemoryState {
    people: Vec<Person>,
    index: HashMap<String, usize>,
    relationships: Vec<Relationship>,
}

impl MemoryState {
    fn person(&self, id: &str) -> Option<&Person> {
        self.index.get(id).map(|&i| &self.people[i])
    }

    fn require(&self, id: &str) -> StorageResult<()> {
        if self.index.contains_key(id) {
            Ok(())
        } else {
            Err(StorageError::PersonNotFound {
                person_id: id.to_string(),
            })
        }
    }

    fn insert_person(&mut self, person: Person) {
        self.index.insert(person.id.clone(), self.people.len());
        self.people.push(person);
    }

    /// Returns false when an identical row already exists.
    fn insert_relationship(&mut self, row: Relationship) -> bool {
        if self.relationships.iter().any(|r| r.same_edge(&row)) {
            debug!(
                person_id = %row.person_id,
                related_person_id = %row.related_person_id,
                relationship_type = %row.relationship_type,
                "Relationship already exists, skipping duplicate"
            );
            return false;
        }
        self.relationships.push(row);
        true
    }
}

/// In-memory person store.
///
/// All operations take a single lock, so concurrent sessions sharing one
/// store see create/link operations applied one at a time.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `people`
    pub fn with_people(people: impl IntoIterator<Item = Person>) -> Self {
        let mut state = MemoryState::default();
        for person in people {
            state.insert_person(person);
        }
        Self {
            state: RwLock::new(state),
        }
    }

    /// Create a store holding three generations of one family.
    ///
    /// Venkat and Lakshmi are the parents of Anil, who is married to Sita.
    /// Anil and Sita are the parents of Ravi and Uma.
    pub fn sample_family() -> Self {
        let [venkat, lakshmi, anil, sita, ravi, uma] = [
            ("Venkat Rao", 1932),
            ("Lakshmi Rao", 1935),
            ("Anil Rao", 1958),
            ("Sita Rao", 1960),
            ("Ravi Rao", 1990),
            ("Uma Rao", 1993),
        ]
        .map(|(name, year)| Person::new(name, year));

        let mut state = MemoryState::default();
        for person in [&venkat, &lakshmi, &anil, &sita, &ravi, &uma] {
            state.insert_person(person.clone());
        }

        for (parent, child) in [
            (&venkat, &anil),
            (&lakshmi, &anil),
            (&anil, &ravi),
            (&sita, &ravi),
            (&anil, &uma),
            (&sita, &uma),
        ] {
            state.insert_relationship(Relationship::new(&child.id, &parent.id, RelationshipType::Parent));
            state.insert_relationship(Relationship::new(&parent.id, &child.id, RelationshipType::Child));
        }

        for (a, b, kind) in [
            (&venkat, &lakshmi, RelationshipType::Spouse),
            (&anil, &sita, RelationshipType::Spouse),
            (&ravi, &uma, RelationshipType::Sibling),
        ] {
            state.insert_relationship(Relationship::new(&a.id, &b.id, kind));
            state.insert_relationship(Relationship::new(&b.id, &a.id, kind));
        }

        Self {
            state: RwLock::new(state),
        }
    }

    /// Number of people on record
    pub async fn person_count(&self) -> usize {
        self.state.read().await.people.len()
    }

    /// Snapshot of every relationship row, in insertion order
    pub async fn relationships(&self) -> Vec<Relationship> {
        self.state.read().await.relationships.clone()
    }

    async fn link_symmetric(
        &self,
        a: &str,
        b: &str,
        relationship_type: RelationshipType,
    ) -> StorageResult<()> {
        let mut state = self.state.write().await;
        state.require(a)?;
        state.require(b)?;
        state.insert_relationship(Relationship::new(a, b, relationship_type));
        state.insert_relationship(Relationship::new(b, a, relationship_type));
        Ok(())
    }
}

#[async_trait]
impl PersonStore for MemoryStore {
    async fn check_existing_person(
        &self,
        full_name: &str,
        birth_year: i32,
    ) -> StorageResult<Option<ExistingPerson>> {
        let state = self.state.read().await;

        let Some(person) = state
            .people
            .iter()
            .find(|p| p.full_name == full_name && p.birth_year == birth_year)
        else {
            return Ok(None);
        };

        let relationships = state
            .relationships
            .iter()
            .filter(|r| r.related_person_id == person.id)
            .filter_map(|r| {
                state
                    .person(&r.person_id)
                    .map(|other| describe_relationship(r.relationship_type, other))
            })
            .collect();

        Ok(Some(ExistingPerson {
            person: person.clone(),
            relationships,
        }))
    }

    async fn find_or_create_person(
        &self,
        full_name: &str,
        birth_year: i32,
    ) -> StorageResult<Person> {
        let mut state = self.state.write().await;

        if let Some(person) = state
            .people
            .iter()
            .find(|p| p.full_name == full_name && p.birth_year == birth_year)
        {
            return Ok(person.clone());
        }

        let person = Person::new(full_name, birth_year);
        debug!(person_id = %person.id, full_name = %full_name, "Created person");
        state.insert_person(person.clone());
        Ok(person)
    }

    async fn get_person(&self, id: &str) -> StorageResult<Option<Person>> {
        Ok(self.state.read().await.person(id).cloned())
    }

    async fn link_parent(&self, child_id: &str, parent_id: &str) -> StorageResult<()> {
        let mut state = self.state.write().await;
        state.require(child_id)?;
        state.require(parent_id)?;
        state.insert_relationship(Relationship::new(
            child_id,
            parent_id,
            RelationshipType::Parent,
        ));
        Ok(())
    }

    async fn link_child(&self, parent_id: &str, child_id: &str) -> StorageResult<()> {
        let mut state = self.state.write().await;
        state.require(parent_id)?;
        state.require(child_id)?;
        state.insert_relationship(Relationship::new(
            parent_id,
            child_id,
            RelationshipType::Child,
        ));
        Ok(())
    }

    async fn link_spouse(&self, person_id: &str, spouse_id: &str) -> StorageResult<()> {
        self.link_symmetric(person_id, spouse_id, RelationshipType::Spouse)
            .await
    }

    async fn link_sibling(&self, person_id: &str, sibling_id: &str) -> StorageResult<()> {
        self.link_symmetric(person_id, sibling_id, RelationshipType::Sibling)
            .await
    }

    async fn related_people(
        &self,
        person_id: &str,
        relationship_type: RelationshipType,
    ) -> StorageResult<Vec<Person>> {
        let state = self.state.read().await;
        Ok(state
            .relationships
            .iter()
            .filter(|r| r.person_id == person_id && r.relationship_type == relationship_type)
            .filter_map(|r| state.person(&r.related_person_id).cloned())
            .collect())
    }

    async fn link_parent_child(&self, parent_id: &str, child_id: &str) -> StorageResult<()> {
        let mut state = self.state.write().await;
        state.require(parent_id)?;
        state.require(child_id)?;
        state.insert_relationship(Relationship::new(
            child_id,
            parent_id,
            RelationshipType::Parent,
        ));
        state.insert_relationship(Relationship::new(
            parent_id,
            child_id,
            RelationshipType::Child,
        ));
        Ok(())
    }
}
