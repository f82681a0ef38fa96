//! # Family Tree Wizard
//!
//! A conversational family-tree builder. The user chats with a wizard that
//! asks for their mother, father, spouse, siblings and children in turn. Each
//! entered name and birth year is checked against the people already on
//! record, and a match is only linked after the user explicitly confirms it.
//!
//! ## Architecture
//!
//! ```text
//! chat input → WizardStateMachine ─→ PersonResolver ─┐
//!                  │    ↑                            ├→ PersonStore (SQLite / memory)
//!                  ↓    │                            │
//!         ConfirmationGate   RelationshipLinker ─────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use family_tree_wizard::config::WizardConfig;
//! use family_tree_wizard::storage::MemoryStore;
//! use family_tree_wizard::wizard::{Transcript, WizardStateMachine};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(MemoryStore::new());
//!     let mut wizard = WizardStateMachine::new(store, WizardConfig::default(), Transcript::new());
//!     wizard.start();
//!     wizard.handle_input("Ravi Rao, 1990").await;
//!     wizard.handle_input("Sita Rao, 1960").await;
//! }
//! ```

#![warn(missing_docs)]

/// Configuration management.
pub mod config;
/// Error types and result aliases for the application.
pub mod error;
/// Immediate-family lookup.
pub mod lookup;
/// Person store contract and implementations.
pub mod storage;
/// The chat wizard.
pub mod wizard;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use wizard::WizardStateMachine;
