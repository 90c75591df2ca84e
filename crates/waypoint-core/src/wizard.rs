//! Survey wizard state machine.
//!
//! Sequences modules, collects answers, gates each step on validation,
//! persists resumable progress, and triggers scoring on final submission.
//!
//! ## State transitions
//!
//! ```text
//! BranchSelection -> InModule(0) <-> InModule(n) -> Analyzing -> ResultShown
//!                                                      |
//!                         reset() from any state <-----+
//! ```
//!
//! `BranchSelection` exists only for definitions with a branch gate.
//! `Analyzing` awaits the instance's simulated latency; no persisted
//! mutation happens before that wait completes, and dropping a pending
//! `submit()` restores the in-memory state to the final step, so a
//! cancelled submission leaves the wizard (and its snapshot) exactly
//! where it was and can simply be retried.
//!
//! ## Persistence
//!
//! After every mutation the full progress snapshot is written under
//! `progress:<survey_id>`; the persisted snapshot is never ahead of the
//! in-memory state. Writes are fire-and-forget: a failed write is logged
//! and never surfaces to the caller. On successful submission the result
//! is persisted under `result:<survey_id>` and the progress slot cleared.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::WizardError;
use crate::question::{
    AnswerMap, AnswerValue, Module, QuestionId, QuestionKind, SurveyDefinition,
};
use crate::scoring::{compute_result, SurveyResult};
use crate::store::{CompletionFlags, KeyValueStore};
use crate::validation::validate_step;

/// Version tag of the persisted progress and result snapshots. A mismatch
/// on load falls back to fresh state rather than attempting repair.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Wizard states. `InModule` is re-entrant via back/forward navigation;
/// `ResultShown` is terminal until an explicit reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    BranchSelection,
    InModule(usize),
    Analyzing,
    ResultShown,
}

impl WizardState {
    fn name(&self) -> &'static str {
        match self {
            WizardState::BranchSelection => "branch_selection",
            WizardState::InModule(_) => "in_module",
            WizardState::Analyzing => "analyzing",
            WizardState::ResultShown => "result_shown",
        }
    }
}

/// The resumable unit persisted after every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub version: u32,
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub branch: Option<String>,
    pub answers: AnswerMap,
    pub step_index: usize,
}

/// A completed result persisted verbatim so a returning user sees the
/// same output without recomputation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResult {
    pub version: u32,
    pub session_id: String,
    pub completed_at: DateTime<Utc>,
    pub result: SurveyResult,
}

/// Progress information for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardProgressReport {
    pub survey_id: String,
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub state: String,
    /// Current step within the active module list (None outside InModule).
    pub step_index: Option<usize>,
    pub total_steps: usize,
    pub answered_questions: usize,
    pub is_complete: bool,
}

/// The survey wizard. Owns the answer map and progress exclusively;
/// storage and completion flags are injected capabilities.
pub struct SurveyWizard {
    definition: SurveyDefinition,
    store: Arc<dyn KeyValueStore>,
    flags: Arc<dyn CompletionFlags>,
    session_id: String,
    started_at: DateTime<Utc>,
    branch: Option<String>,
    answers: AnswerMap,
    step_index: usize,
    state: WizardState,
    /// Question ids flagged by the last refused transition, for UI highlighting.
    invalid: BTreeSet<QuestionId>,
    /// Presentation intent: return the user to the top of a freshly entered step.
    scroll_to_top: bool,
    result: Option<SurveyResult>,
}

impl SurveyWizard {
    /// Create a wizard, resuming persisted state when a usable snapshot
    /// exists.
    ///
    /// A completed-result snapshot takes precedence (the user sees their
    /// result again, without recomputation). A corrupt or version-
    /// mismatched snapshot of either kind is treated as absent.
    pub fn resume_or_new(
        definition: SurveyDefinition,
        store: Arc<dyn KeyValueStore>,
        flags: Arc<dyn CompletionFlags>,
    ) -> Self {
        let mut wizard = Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            branch: None,
            answers: AnswerMap::new(),
            step_index: 0,
            state: WizardState::InModule(0),
            invalid: BTreeSet::new(),
            scroll_to_top: true,
            result: None,
            definition,
            store,
            flags,
        };

        if let Some(stored) = wizard.load_stored_result() {
            wizard.session_id = stored.session_id;
            wizard.result = Some(stored.result);
            wizard.state = WizardState::ResultShown;
            return wizard;
        }

        if let Some(snapshot) = wizard.load_progress_snapshot() {
            wizard.session_id = snapshot.session_id;
            wizard.started_at = snapshot.started_at;
            wizard.branch = snapshot.branch;
            wizard.answers = snapshot.answers;
            wizard.step_index = snapshot.step_index;
            debug!(
                survey = %wizard.definition.id,
                step = wizard.step_index,
                answers = wizard.answers.len(),
                "resumed in-progress survey"
            );
        }

        wizard.state = wizard.initial_or_resumed_state();
        wizard
    }

    fn initial_or_resumed_state(&self) -> WizardState {
        if self.definition.branch.is_some() && self.branch.is_none() {
            WizardState::BranchSelection
        } else {
            let last = self.active_modules().len().saturating_sub(1);
            WizardState::InModule(self.step_index.min(last))
        }
    }

    fn progress_key(&self) -> String {
        format!("progress:{}", self.definition.id)
    }

    fn result_key(&self) -> String {
        format!("result:{}", self.definition.id)
    }

    fn load_progress_snapshot(&self) -> Option<ProgressSnapshot> {
        let json = self.store.get(&self.progress_key()).ok()??;
        match serde_json::from_str::<ProgressSnapshot>(&json) {
            Ok(s) if s.version == SNAPSHOT_VERSION => Some(s),
            Ok(s) => {
                warn!(
                    survey = %self.definition.id,
                    found = s.version,
                    expected = SNAPSHOT_VERSION,
                    "snapshot version mismatch, starting fresh"
                );
                None
            }
            Err(e) => {
                warn!(survey = %self.definition.id, error = %e, "snapshot unreadable, starting fresh");
                None
            }
        }
    }

    fn load_stored_result(&self) -> Option<StoredResult> {
        let json = self.store.get(&self.result_key()).ok()??;
        match serde_json::from_str::<StoredResult>(&json) {
            Ok(r) if r.version == SNAPSHOT_VERSION => Some(r),
            _ => None,
        }
    }

    /// Write the progress snapshot. Fire-and-forget: failures are logged.
    fn persist_progress(&self) {
        let snapshot = ProgressSnapshot {
            version: SNAPSHOT_VERSION,
            session_id: self.session_id.clone(),
            started_at: self.started_at,
            branch: self.branch.clone(),
            answers: self.answers.clone(),
            step_index: self.step_index,
        };
        match serde_json::to_string(&snapshot) {
            Ok(json) => {
                if let Err(e) = self.store.set(&self.progress_key(), &json) {
                    warn!(survey = %self.definition.id, error = %e, "progress persist failed");
                }
            }
            Err(e) => warn!(survey = %self.definition.id, error = %e, "snapshot encode failed"),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn definition(&self) -> &SurveyDefinition {
        &self.definition
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    /// Modules active for this session's branch choice.
    pub fn active_modules(&self) -> Vec<&Module> {
        self.definition.active_modules(self.branch.as_deref())
    }

    /// The module for the current step, when in one.
    pub fn current_module(&self) -> Option<&Module> {
        match self.state {
            WizardState::InModule(i) => self.active_modules().get(i).copied(),
            _ => None,
        }
    }

    /// Question ids flagged by the last refused advance/submit.
    pub fn invalid_questions(&self) -> &BTreeSet<QuestionId> {
        &self.invalid
    }

    /// The computed result, when shown.
    pub fn result(&self) -> Option<&SurveyResult> {
        self.result.as_ref()
    }

    /// Read and clear the "scroll to top of step" presentation intent.
    pub fn take_scroll_intent(&mut self) -> bool {
        std::mem::take(&mut self.scroll_to_top)
    }

    pub fn progress_report(&self) -> WizardProgressReport {
        WizardProgressReport {
            survey_id: self.definition.id.clone(),
            session_id: self.session_id.clone(),
            started_at: self.started_at,
            state: self.state.name().to_string(),
            step_index: match self.state {
                WizardState::InModule(i) => Some(i),
                _ => None,
            },
            total_steps: self.active_modules().len(),
            answered_questions: self.answers.len(),
            is_complete: matches!(self.state, WizardState::ResultShown),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Record the upfront branch choice.
    ///
    /// Switching module sets discards prior answers by design: the
    /// answer map is reset to empty. The choice is immutable until
    /// `reset()`.
    pub fn choose_branch(&mut self, choice: &str) -> Result<(), WizardError> {
        let Some(gate) = &self.definition.branch else {
            return Err(WizardError::InvalidState {
                state: self.state.name().to_string(),
            });
        };
        if self.branch.is_some() {
            return Err(WizardError::BranchAlreadyChosen);
        }
        if !matches!(self.state, WizardState::BranchSelection) {
            return Err(WizardError::InvalidState {
                state: self.state.name().to_string(),
            });
        }
        if !gate.accepts(choice) {
            return Err(WizardError::UnknownBranch(choice.to_string()));
        }

        self.branch = Some(choice.to_string());
        self.answers.clear();
        self.invalid.clear();
        self.step_index = 0;
        self.state = WizardState::InModule(0);
        self.scroll_to_top = true;
        self.persist_progress();
        Ok(())
    }

    /// Insert or overwrite the answer for a question.
    ///
    /// The only mutation path for question data. Clears the question's
    /// invalid marker; has no other validation side effects. Ranked
    /// answers are truncated to the configured rank count here, so
    /// validation never sees an over-long ranking.
    pub fn set_answer(&mut self, question_id: &str, mut value: AnswerValue) -> Result<(), WizardError> {
        if !matches!(self.state, WizardState::InModule(_)) {
            return Err(WizardError::InvalidState {
                state: self.state.name().to_string(),
            });
        }

        if let (Some(question), AnswerValue::Ranked(keys)) =
            (self.definition.find_question(question_id), &mut value)
        {
            if let QuestionKind::RankedChoice { rank_count, .. } = &question.kind {
                keys.truncate(*rank_count);
            }
        }

        self.answers.insert(question_id.to_string(), value);
        self.invalid.remove(question_id);
        self.persist_progress();
        Ok(())
    }

    /// Move one step forward after validating the current step.
    ///
    /// On validation failure the transition is refused, the invalid
    /// question ids are recorded for highlighting, and an incomplete-step
    /// error is returned.
    pub fn advance(&mut self) -> Result<(), WizardError> {
        let WizardState::InModule(index) = self.state else {
            return Err(WizardError::InvalidState {
                state: self.state.name().to_string(),
            });
        };

        self.validate_current(index)?;

        if index + 1 >= self.active_modules().len() {
            return Err(WizardError::AtFinalStep);
        }

        self.step_index = index + 1;
        self.state = WizardState::InModule(self.step_index);
        self.scroll_to_top = true;
        self.persist_progress();
        Ok(())
    }

    /// Move one step back. Never validates; a user may always go back.
    /// A no-op on the first step.
    pub fn retreat(&mut self) -> Result<(), WizardError> {
        let WizardState::InModule(index) = self.state else {
            return Err(WizardError::InvalidState {
                state: self.state.name().to_string(),
            });
        };
        if index == 0 {
            return Ok(());
        }

        self.step_index = index - 1;
        self.state = WizardState::InModule(self.step_index);
        self.invalid.clear();
        self.scroll_to_top = true;
        self.persist_progress();
        Ok(())
    }

    fn validate_current(&mut self, index: usize) -> Result<(), WizardError> {
        let invalid = match self.active_modules().get(index) {
            Some(module) => validate_step(module, &self.answers),
            None => BTreeSet::new(),
        };
        if invalid.is_empty() {
            self.invalid.clear();
            Ok(())
        } else {
            self.invalid = invalid.clone();
            Err(WizardError::IncompleteStep { invalid })
        }
    }

    /// Validate the final step, wait out the simulated analysis latency,
    /// score the answers, persist the result, flip the completion flag
    /// and show the result.
    ///
    /// Cancel-safe: nothing is persisted or mutated durably before the
    /// latency wait completes, and dropping the future mid-wait restores
    /// the in-memory state to `InModule(index)`, so a timed-out or
    /// abandoned submission can be retried directly.
    pub async fn submit(&mut self) -> Result<SurveyResult, WizardError> {
        let WizardState::InModule(index) = self.state else {
            return Err(WizardError::InvalidState {
                state: self.state.name().to_string(),
            });
        };
        if index + 1 != self.active_modules().len() {
            return Err(WizardError::InvalidState {
                state: self.state.name().to_string(),
            });
        }

        self.validate_current(index)?;

        {
            let mut guard = AnalyzingGuard {
                state: &mut self.state,
                restore: WizardState::InModule(index),
                completed: false,
            };
            *guard.state = WizardState::Analyzing;
            tokio::time::sleep(Duration::from_millis(self.definition.analysis_delay_ms)).await;
            guard.completed = true;
        }

        let scoring_answers = self.answers_for_scoring();
        let result = compute_result(&self.definition.id, &scoring_answers, &self.definition.scoring);

        let stored = StoredResult {
            version: SNAPSHOT_VERSION,
            session_id: self.session_id.clone(),
            completed_at: Utc::now(),
            result: result.clone(),
        };
        match serde_json::to_string(&stored) {
            Ok(json) => {
                if let Err(e) = self.store.set(&self.result_key(), &json) {
                    warn!(survey = %self.definition.id, error = %e, "result persist failed");
                }
            }
            Err(e) => warn!(survey = %self.definition.id, error = %e, "result encode failed"),
        }
        if let Err(e) = self.store.remove(&self.progress_key()) {
            warn!(survey = %self.definition.id, error = %e, "progress cleanup failed");
        }
        if let Err(e) = self.flags.set_complete(&self.definition.id, true) {
            warn!(survey = %self.definition.id, error = %e, "completion flag set failed");
        }

        debug!(survey = %self.definition.id, primary = %result.primary_archetype(), "survey submitted");
        self.result = Some(result.clone());
        self.state = WizardState::ResultShown;
        Ok(result)
    }

    /// Answers handed to the scoring engine.
    ///
    /// For instances with the fill rule, questions of branch-excluded
    /// modules are defaulted to zero-contribution values so the engine's
    /// silent-skip totality is not relied on implicitly.
    fn answers_for_scoring(&self) -> AnswerMap {
        let mut answers = self.answers.clone();
        if !self.definition.fill_skipped_defaults {
            return answers;
        }
        for module in self.definition.excluded_modules(self.branch.as_deref()) {
            for question in &module.questions {
                let default = match &question.kind {
                    QuestionKind::SingleChoice { .. } => AnswerValue::Choice(String::new()),
                    QuestionKind::FreeText { .. } => AnswerValue::Text(String::new()),
                    QuestionKind::MultiChoice { .. } => AnswerValue::Selections(Vec::new()),
                    QuestionKind::RankedChoice { .. } => AnswerValue::Ranked(Vec::new()),
                    QuestionKind::RatedMultiSelect { .. } => AnswerValue::Rated(Vec::new()),
                };
                answers.insert(question.id.clone(), default);
            }
        }
        answers
    }

    /// Clear persisted progress and result, un-set the completion flag,
    /// and return to the initial state with a fresh session.
    pub fn reset(&mut self) {
        if let Err(e) = self.store.remove(&self.progress_key()) {
            warn!(survey = %self.definition.id, error = %e, "progress removal failed");
        }
        if let Err(e) = self.store.remove(&self.result_key()) {
            warn!(survey = %self.definition.id, error = %e, "result removal failed");
        }
        if let Err(e) = self.flags.set_complete(&self.definition.id, false) {
            warn!(survey = %self.definition.id, error = %e, "completion flag clear failed");
        }

        self.session_id = uuid::Uuid::new_v4().to_string();
        self.started_at = Utc::now();
        self.branch = None;
        self.answers.clear();
        self.invalid.clear();
        self.step_index = 0;
        self.result = None;
        self.scroll_to_top = true;
        self.state = if self.definition.branch.is_some() {
            WizardState::BranchSelection
        } else {
            WizardState::InModule(0)
        };
    }
}

/// Restores the pre-analysis state when a `submit()` future is dropped
/// mid-wait. Without it a cancelled submission strands the wizard in
/// `Analyzing`, where every transition is refused until `reset()`.
struct AnalyzingGuard<'a> {
    state: &'a mut WizardState,
    restore: WizardState,
    completed: bool,
}

impl Drop for AnalyzingGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            *self.state = self.restore;
        }
    }
}
