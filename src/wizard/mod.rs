//! The family-tree wizard.
//!
//! - [`WizardStateMachine`]: routes chat input by step and confirmation state
//! - [`PersonResolver`]: matches an entry against people already on record
//! - [`ConfirmationGate`]: holds the single outstanding candidate match
//! - [`RelationshipLinker`]: writes parent/child, spouse and sibling edges
//! - [`ReplyIntent`]: keyword tagging of confirmation replies
//! - [`next_step`]: the step transition table
//!
//! Output goes through the [`WizardUi`] trait.

mod entry;
mod gate;
mod intent;
mod linker;
mod machine;
mod resolver;
mod session;
mod step;
mod ui;

pub use entry::*;
pub use gate::*;
pub use intent::*;
pub use linker::*;
pub use machine::*;
pub use resolver::*;
pub use session::*;
pub use step::*;
pub use ui::*;
