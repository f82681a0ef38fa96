//! Immediate-family lookup for a single person.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::StorageResult;
use crate::storage::{Person, PersonStore, RelationshipType};

/// A person and everyone directly linked to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilySummary {
    pub person: Person,
    pub parents: Vec<Person>,
    pub siblings: Vec<Person>,
    pub spouses: Vec<Person>,
    pub children: Vec<Person>,
}

/// Find `full_name` born in `birth_year` and collect their immediate family.
///
/// Returns `None` when nobody matches.
pub async fn lookup_family(
    store: &dyn PersonStore,
    full_name: &str,
    birth_year: i32,
) -> StorageResult<Option<FamilySummary>> {
    let Some(existing) = store.check_existing_person(full_name, birth_year).await? else {
        return Ok(None);
    };
    let id = existing.person.id.clone();

    Ok(Some(FamilySummary {
        person: existing.person,
        parents: store.related_people(&id, RelationshipType::Parent).await?,
        siblings: store.related_people(&id, RelationshipType::Sibling).await?,
        spouses: store.related_people(&id, RelationshipType::Spouse).await?,
        children: store.related_people(&id, RelationshipType::Child).await?,
    }))
}

impl fmt::Display for FamilySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.person.label())?;
        for (title, people) in [
            ("Parents", &self.parents),
            ("Siblings", &self.siblings),
            ("Spouses", &self.spouses),
            ("Children", &self.children),
        ] {
            if people.is_empty() {
                writeln!(f, "  {}: none", title)?;
            } else {
                let names: Vec<String> = people.iter().map(Person::label).collect();
                writeln!(f, "  {}: {}", title, names.join(", "))?;
            }
        }
        Ok(())
    }
}
