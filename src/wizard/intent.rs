//! Keyword tagging of free-text chat replies.
//!
//! Replies are lowercased and split into words before matching, so `"No!"`
//! is a rejection while `"I know her"` is not.

use serde::{Deserialize, Serialize};

/// Relationship a pending confirmation is proposed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipTag {
    /// The candidate is the user themselves.
    #[serde(rename = "self")]
    SelfPerson,
    Mother,
    Father,
    Spouse,
    Sibling,
    Child,
}

impl RelationshipTag {
    /// Relationship tags a user may name, in keyword priority order.
    pub const RELATIVES: [RelationshipTag; 5] = [
        RelationshipTag::Mother,
        RelationshipTag::Father,
        RelationshipTag::Spouse,
        RelationshipTag::Sibling,
        RelationshipTag::Child,
    ];

    /// Get the tag name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipTag::SelfPerson => "self",
            RelationshipTag::Mother => "mother",
            RelationshipTag::Father => "father",
            RelationshipTag::Spouse => "spouse",
            RelationshipTag::Sibling => "sibling",
            RelationshipTag::Child => "child",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            RelationshipTag::SelfPerson => &[],
            RelationshipTag::Mother => &["mother"],
            RelationshipTag::Father => &["father"],
            RelationshipTag::Spouse => &["spouse"],
            RelationshipTag::Sibling => &["sibling", "siblings"],
            RelationshipTag::Child => &["child", "children"],
        }
    }
}

impl std::fmt::Display for RelationshipTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

const REJECT_WORDS: [&str; 3] = ["no", "new", "different"];
const AFFIRM_WORDS: [&str; 1] = ["yes"];
const RESTART_WORDS: [&str; 3] = ["another", "restart", "again"];

/// What a reply says, independent of what is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyIntent {
    /// Reply asks for a new/different person.
    pub reject: bool,
    /// Reply contains an affirmative token.
    pub affirm: bool,
    /// Reply asks to start over with another family.
    pub restart: bool,
    /// First relationship keyword found, by [`RelationshipTag::RELATIVES`] order.
    pub relationship: Option<RelationshipTag>,
}

impl ReplyIntent {
    /// Tag a raw reply.
    pub fn classify(text: &str) -> Self {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        let has_any = |set: &[&str]| words.iter().any(|w| set.iter().any(|s| s == w));

        Self {
            reject: has_any(&REJECT_WORDS),
            affirm: has_any(&AFFIRM_WORDS),
            restart: has_any(&RESTART_WORDS),
            relationship: RelationshipTag::RELATIVES
                .into_iter()
                .find(|tag| has_any(tag.keywords())),
        }
    }
}
