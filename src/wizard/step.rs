//! Wizard steps and the `(step, outcome) → next step` transition table.

use serde::{Deserialize, Serialize};

use super::intent::RelationshipTag;

/// Relationship-entry phase of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Identify the user.
    #[default]
    SelectSelf,
    EnterMother,
    EnterFather,
    EnterSpouse,
    EnterSiblings,
    EnterChildren,
    /// Nothing left to ask.
    Done,
}

/// How a step finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A person was linked for this step.
    Linked,
    /// A person was linked and the self person already has a spouse on record.
    LinkedAlreadyMarried,
    /// The user left the entry blank.
    Skipped,
}

impl WizardStep {
    /// Get the step name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::SelectSelf => "select_self",
            WizardStep::EnterMother => "enter_mother",
            WizardStep::EnterFather => "enter_father",
            WizardStep::EnterSpouse => "enter_spouse",
            WizardStep::EnterSiblings => "enter_siblings",
            WizardStep::EnterChildren => "enter_children",
            WizardStep::Done => "done",
        }
    }

    /// Relationship collected by this step.
    pub fn tag(&self) -> Option<RelationshipTag> {
        match self {
            WizardStep::SelectSelf => Some(RelationshipTag::SelfPerson),
            WizardStep::EnterMother => Some(RelationshipTag::Mother),
            WizardStep::EnterFather => Some(RelationshipTag::Father),
            WizardStep::EnterSpouse => Some(RelationshipTag::Spouse),
            WizardStep::EnterSiblings => Some(RelationshipTag::Sibling),
            WizardStep::EnterChildren => Some(RelationshipTag::Child),
            WizardStep::Done => None,
        }
    }

    /// Step that collects `tag`.
    pub fn for_tag(tag: RelationshipTag) -> Self {
        match tag {
            RelationshipTag::SelfPerson => WizardStep::SelectSelf,
            RelationshipTag::Mother => WizardStep::EnterMother,
            RelationshipTag::Father => WizardStep::EnterFather,
            RelationshipTag::Spouse => WizardStep::EnterSpouse,
            RelationshipTag::Sibling => WizardStep::EnterSiblings,
            RelationshipTag::Child => WizardStep::EnterChildren,
        }
    }

    /// Whether a blank entry skips this step.
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            WizardStep::EnterSpouse | WizardStep::EnterSiblings | WizardStep::EnterChildren
        )
    }

    /// Prompt shown when the step becomes current.
    pub fn prompt(&self) -> &'static str {
        match self {
            WizardStep::SelectSelf => {
                "Hi! Let's build your family tree. What is your full name and year of birth?"
            }
            WizardStep::EnterMother => "Tell me your mother's full name and year of birth.",
            WizardStep::EnterFather => "Now tell me your father's full name and year of birth.",
            WizardStep::EnterSpouse => {
                "Are you married? Enter your spouse's full name and birth year, or leave it blank to skip."
            }
            WizardStep::EnterSiblings => {
                "Do you have any siblings? Enter one sibling's full name and birth year, or leave it blank to skip."
            }
            WizardStep::EnterChildren => {
                "Do you have any children? Enter one child's full name and birth year, or leave it blank to finish."
            }
            WizardStep::Done => {
                "All set! Your family tree is ready. Type 'another' to add another family, or look anyone up with the `lookup` command."
            }
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transition table.
///
/// Required steps stay put when skipped. Siblings and children repeat until
/// the user leaves an entry blank.
pub fn next_step(step: WizardStep, outcome: StepOutcome) -> WizardStep {
    use StepOutcome::*;
    use WizardStep::*;

    match (step, outcome) {
        (SelectSelf, Skipped) => SelectSelf,
        (SelectSelf, _) => EnterMother,

        (EnterMother, Skipped) => EnterMother,
        (EnterMother, _) => EnterFather,

        (EnterFather, Skipped) => EnterFather,
        (EnterFather, LinkedAlreadyMarried) => EnterSiblings,
        (EnterFather, Linked) => EnterSpouse,

        (EnterSpouse, _) => EnterSiblings,

        (EnterSiblings, Skipped) => EnterChildren,
        (EnterSiblings, _) => EnterSiblings,

        (EnterChildren, Skipped) => Done,
        (EnterChildren, _) => EnterChildren,

        (Done, _) => Done,
    }
}
