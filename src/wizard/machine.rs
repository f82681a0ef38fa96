use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};

use super::entry::{parse_entry, Entry};
use super::gate::Decision;
use super::intent::{RelationshipTag, ReplyIntent};
use super::linker::RelationshipLinker;
use super::resolver::{MatchResult, PersonResolver};
use super::session::SessionState;
use super::step::{next_step, StepOutcome, WizardStep};
use super::ui::WizardUi;
use crate::config::WizardConfig;
use crate::error::{WizardError, WizardResult};
use crate::storage::{Person, PersonStore};

/// Result of validating a chat entry for the current step.
enum EntryCheck {
    Skip,
    Retry,
    Person { full_name: String, birth_year: i32 },
}

/// Drives one tree-building conversation.
///
/// Each call to [`handle_input`](Self::handle_input) runs to completion
/// before the next one is accepted; the store is the only thing shared with
/// other sessions.
pub struct WizardStateMachine<U: WizardUi> {
    store: Arc<dyn PersonStore>,
    resolver: PersonResolver,
    linker: RelationshipLinker,
    config: WizardConfig,
    state: SessionState,
    ui: U,
}

impl<U: WizardUi> WizardStateMachine<U> {
    /// Create a wizard for a new session
    pub fn new(store: Arc<dyn PersonStore>, config: WizardConfig, ui: U) -> Self {
        Self {
            resolver: PersonResolver::new(store.clone()),
            linker: RelationshipLinker::new(store.clone()),
            store,
            config,
            state: SessionState::new(),
            ui,
        }
    }

    /// Emit the opening prompt.
    pub fn start(&mut self) {
        info!(session_id = %self.state.session_id, "Wizard session started");
        self.ui.append_system_message(WizardStep::SelectSelf.prompt());
    }

    /// Begin a new family in the same conversation.
    ///
    /// Session state starts over at [`WizardStep::SelectSelf`]; the store and
    /// the UI are kept, so people entered so far can be matched again.
    pub fn restart(&mut self) {
        let previous = std::mem::take(&mut self.state);
        info!(
            previous_session_id = %previous.session_id,
            session_id = %self.state.session_id,
            "Wizard restarted for another family"
        );
        self.ui.append_system_message(&format!(
            "Let's add another family. {}",
            WizardStep::SelectSelf.prompt()
        ));
    }

    /// Current session state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The UI collaborator
    pub fn ui(&self) -> &U {
        &self.ui
    }

    /// Current step
    pub fn current_step(&self) -> WizardStep {
        self.state.current_step
    }

    /// Whether the next input answers a pending confirmation
    pub fn awaiting_confirmation(&self) -> bool {
        self.state.awaiting_confirmation()
    }

    /// Whether every step has been completed
    pub fn is_done(&self) -> bool {
        self.state.current_step == WizardStep::Done
    }

    /// Handle one line of user input.
    ///
    /// Never fails: errors are logged and shown to the user as a message, and
    /// the session stays on its current step.
    pub async fn handle_input(&mut self, raw: &str) {
        let span = info_span!(
            "wizard_input",
            session_id = %self.state.session_id,
            step = %self.state.current_step,
            awaiting_confirmation = self.state.awaiting_confirmation(),
        );
        self.dispatch(raw).instrument(span).await;
    }

    async fn dispatch(&mut self, raw: &str) {
        let result = if self.state.awaiting_confirmation() {
            self.handle_confirmation(raw).await
        } else {
            match self.state.current_step {
                WizardStep::SelectSelf => self.handle_select_self(raw).await,
                WizardStep::Done => {
                    self.echo(raw);
                    if ReplyIntent::classify(raw).restart {
                        self.restart();
                    } else {
                        self.ui.append_system_message(WizardStep::Done.prompt());
                    }
                    Ok(())
                }
                step => self.handle_relationship_entry(step, raw).await,
            }
        };

        if let Err(e) = result {
            self.report(e);
        }
        self.ui.clear_inputs();
    }

    fn report(&mut self, err: WizardError) {
        match err {
            WizardError::MissingSelfPerson => {
                error!("Relationship step reached before the self person was set");
                self.state.gate.clear();
                self.ui.append_system_message(
                    "Something went wrong: I don't know who you are yet. Please restart the wizard.",
                );
            }
            WizardError::Link {
                relationship,
                source,
            } => {
                warn!(relationship = %relationship, error = %source, "Link failed");
                self.state.gate.clear();
                self.ui
                    .append_system_message(&format!("Error linking {}: {}", relationship, source));
            }
            WizardError::InvalidInput { reason } => {
                self.ui.append_system_message(&reason);
            }
            WizardError::Lookup(source) => {
                warn!(error = %source, "Store lookup failed");
                self.ui.append_system_message(&format!(
                    "Sorry, I couldn't check the family records: {}. Please try again.",
                    source
                ));
            }
        }
    }

    fn echo(&mut self, raw: &str) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            self.ui.append_user_message(trimmed);
        }
    }

    fn check_entry(&mut self, step: WizardStep, raw: &str) -> EntryCheck {
        match parse_entry(raw) {
            Entry::Blank if step.is_optional() => EntryCheck::Skip,
            Entry::Blank => {
                self.ui.append_system_message(step.prompt());
                EntryCheck::Retry
            }
            Entry::Invalid { reason } => {
                self.ui.append_system_message(&reason);
                EntryCheck::Retry
            }
            Entry::Person { birth_year, .. } if !self.config.accepts_year(birth_year) => {
                self.ui.append_system_message(&format!(
                    "Please enter a valid year between {} and {}.",
                    self.config.min_birth_year, self.config.max_birth_year
                ));
                EntryCheck::Retry
            }
            Entry::Person {
                full_name,
                birth_year,
            } => EntryCheck::Person {
                full_name,
                birth_year,
            },
        }
    }

    fn open_confirmation(
        &mut self,
        candidate: Person,
        existing_relationships: Vec<String>,
        tags: Vec<RelationshipTag>,
    ) {
        debug!(candidate_id = %candidate.id, tags = ?tags, "Awaiting confirmation");
        if let Some(superseded) = self.state.gate.open(candidate, existing_relationships, tags) {
            debug!(candidate_id = %superseded.candidate.id, "Discarded superseded confirmation");
        }
    }

    fn adopt_self(&mut self, person: &Person) {
        info!(person_id = %person.id, "Self person set");
        self.state.self_person_id = Some(person.id.clone());
        self.state.self_display_name = Some(person.full_name.clone());
    }

    async fn handle_select_self(&mut self, raw: &str) -> WizardResult<()> {
        self.echo(raw);

        let (full_name, birth_year) = match self.check_entry(WizardStep::SelectSelf, raw) {
            EntryCheck::Person {
                full_name,
                birth_year,
            } => (full_name, birth_year),
            EntryCheck::Skip | EntryCheck::Retry => return Ok(()),
        };

        match self.resolver.resolve(&full_name, birth_year).await? {
            MatchResult::Match {
                person,
                existing_relationships,
            } => {
                let message = format!(
                    "I found '{}' (born {}) in the database with {}. Is this you? Tell me who to add next (mother, father, spouse, siblings or children), or type 'new' if this is someone else.",
                    person.full_name,
                    person.birth_year,
                    describe_existing(&existing_relationships)
                );
                let mut tags = vec![RelationshipTag::SelfPerson];
                tags.extend(RelationshipTag::RELATIVES);
                self.open_confirmation(person, existing_relationships, tags);
                self.ui.append_system_message(&message);
            }
            MatchResult::NoMatch => {
                let person = self
                    .store
                    .find_or_create_person(&full_name, birth_year)
                    .await?;
                self.adopt_self(&person);
                self.ui.notify_data_updated();

                let next = next_step(WizardStep::SelectSelf, StepOutcome::Linked);
                self.state.current_step = next;
                self.ui.append_system_message(&format!(
                    "Nice to meet you, {}! {}",
                    person.full_name,
                    next.prompt()
                ));
            }
        }

        Ok(())
    }

    async fn handle_relationship_entry(&mut self, step: WizardStep, raw: &str) -> WizardResult<()> {
        self.echo(raw);

        let Some(tag) = step.tag() else {
            return Ok(());
        };
        let self_id = self
            .state
            .self_person_id
            .clone()
            .ok_or(WizardError::MissingSelfPerson)?;

        let (full_name, birth_year) = match self.check_entry(step, raw) {
            EntryCheck::Person {
                full_name,
                birth_year,
            } => (full_name, birth_year),
            EntryCheck::Skip => {
                self.skip(step);
                return Ok(());
            }
            EntryCheck::Retry => return Ok(()),
        };

        match self.resolver.resolve(&full_name, birth_year).await? {
            MatchResult::Match {
                person,
                existing_relationships,
            } => {
                if self.reject_self(tag, &self_id, &person) {
                    return Ok(());
                }
                let message = format!(
                    "I found '{}' (born {}) in the database with {}. Is this your {}? (Type 'yes' to confirm or 'new' to add someone else)",
                    person.full_name,
                    person.birth_year,
                    describe_existing(&existing_relationships),
                    tag
                );
                self.open_confirmation(person, existing_relationships, vec![tag]);
                self.ui.append_system_message(&message);
                Ok(())
            }
            MatchResult::NoMatch => {
                let person = self
                    .store
                    .find_or_create_person(&full_name, birth_year)
                    .await?;
                if self.reject_self(tag, &self_id, &person) {
                    return Ok(());
                }
                self.commit(tag, &self_id, &person).await
            }
        }
    }

    async fn handle_confirmation(&mut self, raw: &str) -> WizardResult<()> {
        self.echo(raw);

        let Some(decision) = self.state.gate.decide(raw) else {
            return Ok(());
        };
        debug!(decision = ?decision, "Confirmation reply classified");

        match decision {
            Decision::Reject => {
                self.state.gate.clear();
                info!("Candidate rejected");
                self.ui.append_system_message(
                    "Okay, please enter the full name and birth year again for the new person.",
                );
            }
            Decision::Unclear => {
                if let Some(pending) = self.state.gate.pending() {
                    let message = format!(
                        "Please type 'yes' if {} is your {}, or 'new' to enter someone else.",
                        pending.candidate.label(),
                        pending
                            .relationship()
                            .map(|t| t.as_str())
                            .unwrap_or("relative")
                    );
                    self.ui.append_system_message(&message);
                }
            }
            Decision::AcceptAsRelationship(tag) => {
                let self_id = self
                    .state
                    .self_person_id
                    .clone()
                    .ok_or(WizardError::MissingSelfPerson)?;
                if let Some(pending) = self.state.gate.take() {
                    self.commit(tag, &self_id, &pending.candidate).await?;
                }
            }
            Decision::AcceptAsSelf { next } => {
                if let Some(pending) = self.state.gate.take() {
                    self.adopt_self(&pending.candidate);
                    self.state.current_step = next;
                    self.ui.append_system_message(&format!(
                        "Welcome back, {}! {}",
                        pending.candidate.full_name,
                        next.prompt()
                    ));
                }
            }
        }

        Ok(())
    }

    /// Re-prompt when the entered relative is the self person.
    fn reject_self(&mut self, tag: RelationshipTag, self_id: &str, person: &Person) -> bool {
        if person.id != self_id {
            return false;
        }
        debug!(person_id = %person.id, relationship = %tag, "Entered relative is the self person");
        self.ui.append_system_message(&format!(
            "That's you! Please enter your {}'s full name and birth year.",
            tag
        ));
        true
    }

    /// Link `person` as the self person's `tag` and advance.
    ///
    /// On failure nothing in the session changes.
    async fn commit(&mut self, tag: RelationshipTag, self_id: &str, person: &Person) -> WizardResult<()> {
        self.linker
            .commit(tag, self_id, &person.id, self.state.mother_id.as_deref())
            .await?;

        match tag {
            RelationshipTag::Mother => self.state.mother_id = Some(person.id.clone()),
            RelationshipTag::Father => self.state.father_id = Some(person.id.clone()),
            RelationshipTag::Spouse => self.state.spouse_id = Some(person.id.clone()),
            _ => {}
        }
        self.ui.notify_data_updated();

        let step = WizardStep::for_tag(tag);
        let outcome = if tag == RelationshipTag::Father && self.linker.has_spouse(self_id).await {
            info!("Self person already married, skipping spouse step");
            StepOutcome::LinkedAlreadyMarried
        } else {
            StepOutcome::Linked
        };
        let next = next_step(step, outcome);
        self.state.current_step = next;

        let follow_up = match (next == step, outcome) {
            (true, _) => format!(
                "Enter another {}'s full name and birth year, or leave it blank to {}.",
                tag,
                if step == WizardStep::EnterChildren {
                    "finish"
                } else {
                    "continue"
                }
            ),
            (false, StepOutcome::LinkedAlreadyMarried) => {
                format!("I see you're already married. {}", next.prompt())
            }
            (false, _) => next.prompt().to_string(),
        };
        self.ui.append_system_message(&format!(
            "Great! I've added {} as your {}. {}",
            person.label(),
            tag,
            follow_up
        ));

        Ok(())
    }

    fn skip(&mut self, step: WizardStep) {
        let next = next_step(step, StepOutcome::Skipped);
        debug!(from = %step, to = %next, "Step skipped");
        self.state.current_step = next;
        self.ui
            .append_system_message(&format!("Okay, skipping. {}", next.prompt()));
    }
}

fn describe_existing(relationships: &[String]) -> String {
    if relationships.is_empty() {
        "no existing relationships".to_string()
    } else {
        relationships.join(", ")
    }
}
