//! Single-slot holder for a candidate match awaiting the user's answer.

use serde::{Deserialize, Serialize};

use super::intent::{RelationshipTag, ReplyIntent};
use super::step::WizardStep;
use crate::storage::Person;

/// A candidate match held until the user confirms or rejects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    /// The existing person that matched the entry.
    pub candidate: Person,
    /// Relationships already on record for the candidate, for display.
    pub existing_relationships: Vec<String>,
    /// Proposed relationship tags, e.g. `[mother]` or `[self, mother, father, ...]`.
    pub tags: Vec<RelationshipTag>,
}

impl PendingConfirmation {
    /// Whether this confirmation asks "is this you?".
    pub fn is_self(&self) -> bool {
        self.tags.contains(&RelationshipTag::SelfPerson)
    }

    /// The specific relationship proposed, if this is not a self confirmation.
    pub fn relationship(&self) -> Option<RelationshipTag> {
        if self.is_self() {
            return None;
        }
        self.tags
            .iter()
            .copied()
            .find(|tag| *tag != RelationshipTag::SelfPerson)
    }
}

/// How to resolve the pending confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Discard the candidate and ask for the entry again.
    Reject,
    /// Commit the candidate as the given relative.
    AcceptAsRelationship(RelationshipTag),
    /// Adopt the candidate as the self person and continue at `next`.
    AcceptAsSelf { next: WizardStep },
    /// Reply did not answer a relationship confirmation; ask again.
    Unclear,
}

/// Holds at most one [`PendingConfirmation`].
///
/// `is_awaiting()` is derived from the slot, so "awaiting confirmation" and
/// "a confirmation is pending" cannot disagree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfirmationGate {
    pending: Option<PendingConfirmation>,
}

impl ConfirmationGate {
    /// Create an empty gate
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold a new candidate. Any previous one is discarded uncommitted and returned.
    pub fn open(
        &mut self,
        candidate: Person,
        existing_relationships: Vec<String>,
        tags: Vec<RelationshipTag>,
    ) -> Option<PendingConfirmation> {
        self.pending.replace(PendingConfirmation {
            candidate,
            existing_relationships,
            tags,
        })
    }

    /// Whether input must be routed to the confirmation handler.
    pub fn is_awaiting(&self) -> bool {
        self.pending.is_some()
    }

    /// The held confirmation, if any.
    pub fn pending(&self) -> Option<&PendingConfirmation> {
        self.pending.as_ref()
    }

    /// Remove and return the held confirmation.
    pub fn take(&mut self) -> Option<PendingConfirmation> {
        self.pending.take()
    }

    /// Drop the held confirmation.
    pub fn clear(&mut self) {
        self.pending = None;
    }

    /// Classify `reply` against the held confirmation.
    ///
    /// Returns `None` when nothing is pending.
    pub fn decide(&self, reply: &str) -> Option<Decision> {
        let pending = self.pending.as_ref()?;
        let intent = ReplyIntent::classify(reply);

        if intent.reject {
            return Some(Decision::Reject);
        }

        if pending.is_self() {
            let next = intent
                .relationship
                .filter(|tag| pending.tags.contains(tag))
                .map(WizardStep::for_tag)
                .unwrap_or(WizardStep::EnterMother);
            return Some(Decision::AcceptAsSelf { next });
        }

        match pending.relationship() {
            Some(tag) if intent.affirm => Some(Decision::AcceptAsRelationship(tag)),
            _ => Some(Decision::Unclear),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_self_tags() -> Vec<RelationshipTag> {
        let mut tags = vec![RelationshipTag::SelfPerson];
        tags.extend(RelationshipTag::RELATIVES);
        tags
    }

    fn gate_with(tags: Vec<RelationshipTag>) -> ConfirmationGate {
        let mut gate = ConfirmationGate::new();
        gate.open(Person::new("Sita Rao", 1960), vec![], tags);
        gate
    }

    #[test]
    fn test_open_supersedes_previous() {
        let mut gate = ConfirmationGate::new();
        assert!(!gate.is_awaiting());

        let first = Person::new("Sita Rao", 1960);
        let second = Person::new("Anil Rao", 1958);

        assert!(gate
            .open(first.clone(), vec![], vec![RelationshipTag::Mother])
            .is_none());
        let superseded = gate
            .open(second.clone(), vec![], vec![RelationshipTag::Father])
            .unwrap();

        assert_eq!(superseded.candidate, first);
        assert_eq!(gate.pending().unwrap().candidate, second);
        assert!(gate.is_awaiting());
    }

    #[test]
    fn test_take_and_clear_close_the_gate() {
        let mut gate = gate_with(vec![RelationshipTag::Mother]);
        assert!(gate.take().is_some());
        assert!(!gate.is_awaiting());

        let mut gate = gate_with(vec![RelationshipTag::Mother]);
        gate.clear();
        assert!(gate.pending().is_none());
        assert_eq!(gate.decide("yes"), None);
    }

    #[test]
    fn test_rejection_wins() {
        let gate = gate_with(vec![RelationshipTag::Mother]);
        assert_eq!(gate.decide("no"), Some(Decision::Reject));
        assert_eq!(gate.decide("yes, but a new one"), Some(Decision::Reject));

        let gate = gate_with(all_self_tags());
        assert_eq!(gate.decide("different person"), Some(Decision::Reject));
    }

    #[test]
    fn test_affirmative_accepts_relationship() {
        let gate = gate_with(vec![RelationshipTag::Father]);
        assert_eq!(
            gate.decide("Yes"),
            Some(Decision::AcceptAsRelationship(RelationshipTag::Father))
        );
    }

    #[test]
    fn test_unrecognized_reply_during_relationship_confirmation_is_unclear() {
        let gate = gate_with(vec![RelationshipTag::Mother]);
        assert_eq!(gate.decide("hmm"), Some(Decision::Unclear));
        assert_eq!(gate.decide("father"), Some(Decision::Unclear));
    }

    #[test]
    fn test_self_confirmation_picks_next_step() {
        let gate = gate_with(all_self_tags());

        assert_eq!(
            gate.decide("yes"),
            Some(Decision::AcceptAsSelf {
                next: WizardStep::EnterMother
            })
        );
        assert_eq!(
            gate.decide("that's me, add my children"),
            Some(Decision::AcceptAsSelf {
                next: WizardStep::EnterChildren
            })
        );
        assert_eq!(
            gate.decide("spouse"),
            Some(Decision::AcceptAsSelf {
                next: WizardStep::EnterSpouse
            })
        );
    }

    #[test]
    fn test_self_confirmation_ignores_unoffered_relationships() {
        let gate = gate_with(vec![RelationshipTag::SelfPerson, RelationshipTag::Father]);
        assert_eq!(
            gate.decide("mother"),
            Some(Decision::AcceptAsSelf {
                next: WizardStep::EnterMother
            })
        );
        assert_eq!(
            gate.decide("father"),
            Some(Decision::AcceptAsSelf {
                next: WizardStep::EnterFather
            })
        );
    }
}
