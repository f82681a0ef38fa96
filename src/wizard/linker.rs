use std::sync::Arc;
use tracing::{info, warn};

use super::intent::RelationshipTag;
use crate::error::{WizardError, WizardResult};
use crate::storage::{PersonStore, RelationshipType};

/// Writes relationship edges for the self person.
///
/// Every failure is reported as [`WizardError::Link`] naming the edge that
/// failed. Edges committed by earlier calls are never rolled back.
#[derive(Clone)]
pub struct RelationshipLinker {
    store: Arc<dyn PersonStore>,
}

impl RelationshipLinker {
    /// Create a linker over `store`
    pub fn new(store: Arc<dyn PersonStore>) -> Self {
        Self { store }
    }

    /// Write both halves of a parent/child edge as a unit.
    pub async fn link_parent_child(
        &self,
        parent_id: &str,
        child_id: &str,
        relationship: &str,
    ) -> WizardResult<()> {
        self.store
            .link_parent_child(parent_id, child_id)
            .await
            .map_err(|e| WizardError::link(relationship, e))
    }

    /// Write a symmetric spouse edge.
    pub async fn link_spouse(&self, a_id: &str, b_id: &str, relationship: &str) -> WizardResult<()> {
        self.store
            .link_spouse(a_id, b_id)
            .await
            .map_err(|e| WizardError::link(relationship, e))
    }

    /// Commit `person_id` as the self person's `tag`.
    ///
    /// `mother_id` is the mother recorded in this session; when a father is
    /// committed the two are linked as spouses without asking.
    pub async fn commit(
        &self,
        tag: RelationshipTag,
        self_id: &str,
        person_id: &str,
        mother_id: Option<&str>,
    ) -> WizardResult<()> {
        if person_id == self_id {
            return Err(WizardError::InvalidInput {
                reason: format!("You can't be your own {}.", tag),
            });
        }

        match tag {
            RelationshipTag::Mother => {
                self.link_parent_child(person_id, self_id, "mother").await?;
            }
            RelationshipTag::Father => {
                self.link_parent_child(person_id, self_id, "father").await?;
                if let Some(mother_id) = mother_id {
                    self.link_spouse(mother_id, person_id, "mother and father as spouses")
                        .await?;
                    info!(mother_id = %mother_id, father_id = %person_id, "Linked mother and father as spouses");
                }
            }
            RelationshipTag::Spouse => {
                self.link_spouse(self_id, person_id, "spouse").await?;
            }
            RelationshipTag::Sibling => {
                self.store
                    .link_sibling(self_id, person_id)
                    .await
                    .map_err(|e| WizardError::link("sibling", e))?;

                // Siblings share the parents already on record.
                let parents = self
                    .store
                    .related_people(self_id, RelationshipType::Parent)
                    .await
                    .map_err(|e| WizardError::link("sibling's parents", e))?;
                for parent in parents {
                    self.link_parent_child(&parent.id, person_id, "sibling's parents")
                        .await?;
                }
            }
            RelationshipTag::Child => {
                self.link_parent_child(self_id, person_id, "child").await?;

                // A single recorded spouse is taken as the other parent.
                let spouses = self
                    .store
                    .related_people(self_id, RelationshipType::Spouse)
                    .await
                    .map_err(|e| WizardError::link("child's other parent", e))?;
                if let [spouse] = spouses.as_slice() {
                    self.link_parent_child(&spouse.id, person_id, "child's other parent")
                        .await?;
                }
            }
            RelationshipTag::SelfPerson => {
                return Err(WizardError::InvalidInput {
                    reason: "the self person cannot be linked to themselves".to_string(),
                });
            }
        }

        info!(self_id = %self_id, person_id = %person_id, relationship = %tag, "Committed relationship");
        Ok(())
    }

    /// Whether the self person already has a spouse on record.
    ///
    /// A failed lookup is logged and treated as "no spouse" so the wizard
    /// still asks.
    pub async fn has_spouse(&self, self_id: &str) -> bool {
        match self
            .store
            .related_people(self_id, RelationshipType::Spouse)
            .await
        {
            Ok(spouses) => !spouses.is_empty(),
            Err(e) => {
                warn!(error = %e, self_id = %self_id, "Spouse lookup failed, assuming none");
                false
            }
        }
    }
}
