//! Store failure recovery tests
//!
//! Uses a mocked `PersonStore` whose link operations fail, and checks that the
//! wizard reports the failure and stays on the step it was on.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;

use family_tree_wizard::config::WizardConfig;
use family_tree_wizard::error::{StorageError, StorageResult};
use family_tree_wizard::storage::{ExistingPerson, Person, PersonStore, RelationshipType};
use family_tree_wizard::wizard::{Transcript, WizardStateMachine, WizardStep};

mock! {
    pub Store {}

    #[async_trait]
    impl PersonStore for Store {
        async fn check_existing_person(
            &self,
            full_name: &str,
            birth_year: i32,
        ) -> StorageResult<Option<ExistingPerson>>;
        async fn find_or_create_person(&self, full_name: &str, birth_year: i32)
            -> StorageResult<Person>;
        async fn get_person(&self, id: &str) -> StorageResult<Option<Person>>;
        async fn link_parent(&self, child_id: &str, parent_id: &str) -> StorageResult<()>;
        async fn link_child(&self, parent_id: &str, child_id: &str) -> StorageResult<()>;
        async fn link_spouse(&self, person_id: &str, spouse_id: &str) -> StorageResult<()>;
        async fn link_sibling(&self, person_id: &str, sibling_id: &str) -> StorageResult<()>;
        async fn related_people(
            &self,
            person_id: &str,
            relationship_type: RelationshipType,
        ) -> StorageResult<Vec<Person>>;
        async fn link_parent_child(&self, parent_id: &str, child_id: &str) -> StorageResult<()>;
    }
}

fn link_failure() -> StorageError {
    StorageError::Query {
        message: "database is locked".to_string(),
    }
}

/// A mock that knows nobody except `known`, creates anyone else, and fails every link.
fn failing_store(known: Option<Person>) -> MockStore {
    let mut store = MockStore::new();

    store
        .expect_check_existing_person()
        .returning(move |name, year| {
            Ok(known
                .as_ref()
                .filter(|p| p.full_name == name && p.birth_year == year)
                .map(|p| ExistingPerson {
                    person: p.clone(),
                    relationships: vec![],
                }))
        });
    store
        .expect_find_or_create_person()
        .returning(|name, year| Ok(Person::new(name, year)));
    store
        .expect_link_parent_child()
        .returning(|_, _| Err(link_failure()));

    store
}

async fn wizard_at_mother(store: MockStore) -> WizardStateMachine<Transcript> {
    let mut wizard =
        WizardStateMachine::new(Arc::new(store), WizardConfig::default(), Transcript::new());
    wizard.start();
    wizard.handle_input("Ravi Rao, 1990").await;
    assert_eq!(wizard.current_step(), WizardStep::EnterMother);
    wizard
}

#[tokio::test]
async fn test_failed_link_for_new_person_stays_on_step() {
    let mut wizard = wizard_at_mother(failing_store(None)).await;

    wizard.handle_input("Sita Rao, 1960").await;

    assert_eq!(wizard.current_step(), WizardStep::EnterMother);
    assert!(!wizard.awaiting_confirmation());
    assert_eq!(wizard.state().mother_id, None);
    assert_eq!(
        wizard.ui().last_system_message(),
        Some("Error linking mother: Query failed: database is locked")
    );
}

#[tokio::test]
async fn test_failed_link_after_confirmation_clears_gate() {
    let sita = Person::new("Sita Rao", 1960);
    let mut wizard = wizard_at_mother(failing_store(Some(sita))).await;

    wizard.handle_input("Sita Rao, 1960").await;
    assert!(wizard.awaiting_confirmation());

    wizard.handle_input("yes").await;

    assert!(!wizard.awaiting_confirmation());
    assert!(wizard.state().gate.pending().is_none());
    assert_eq!(wizard.current_step(), WizardStep::EnterMother);
    assert_eq!(wizard.state().mother_id, None);
    assert!(wizard
        .ui()
        .last_system_message()
        .unwrap()
        .starts_with("Error linking mother"));

    // The next entry is handled as a fresh mother entry, not a confirmation reply.
    wizard.handle_input("Sita Rao, 1960").await;
    assert!(wizard.awaiting_confirmation());
}

#[tokio::test]
async fn test_lookup_failure_is_reported() {
    let mut store = MockStore::new();
    store
        .expect_check_existing_person()
        .returning(|_, _| {
            Err(StorageError::Connection {
                message: "unreachable".to_string(),
            })
        });

    let mut wizard =
        WizardStateMachine::new(Arc::new(store), WizardConfig::default(), Transcript::new());
    wizard.handle_input("Ravi Rao, 1990").await;

    assert_eq!(wizard.current_step(), WizardStep::SelectSelf);
    assert_eq!(wizard.state().self_person_id, None);
    assert!(wizard
        .ui()
        .last_system_message()
        .unwrap()
        .contains("couldn't check the family records"));
}
