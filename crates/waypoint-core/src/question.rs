//! Survey question and module schema.
//!
//! Questions form a closed set of five kinds; rendering and validation
//! dispatch over [`QuestionKind`] with exhaustive matches, so adding a
//! kind is a compile-time exercise touching one switch per consumer.
//!
//! Configuration is supplied pre-validated at construction. The engine
//! does not defend against malformed tables (e.g. a zero `rank_count`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::scoring::ScoringTable;

/// Stable identifier for a question.
pub type QuestionId = String;

/// Map from question id to the recorded answer.
///
/// Built incrementally as the user progresses; entries are overwritten by
/// re-answering and pruned only on full reset or branch selection.
pub type AnswerMap = HashMap<QuestionId, AnswerValue>;

/// One selectable option of a choice-style question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Option key recorded in the answer map (and looked up in scoring tables).
    pub key: String,
    /// Display text.
    pub label: String,
}

impl ChoiceOption {
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
}

/// A named group of rateable items for the categorized selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatedCategory {
    pub name: String,
    pub items: Vec<String>,
}

/// Type-specific configuration for the five question kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuestionKind {
    /// Exactly one option is chosen.
    SingleChoice { options: Vec<ChoiceOption> },
    /// Any number of options within the configured bounds.
    MultiChoice {
        options: Vec<ChoiceOption>,
        min_selections: usize,
        max_selections: usize,
    },
    /// An ordered top-N selection; complete once exactly `rank_count`
    /// items are ranked.
    RankedChoice {
        options: Vec<ChoiceOption>,
        rank_count: usize,
    },
    /// Unconstrained text input.
    FreeText { placeholder: Option<String> },
    /// Items picked from categories, each with a rating on the scale.
    RatedMultiSelect {
        categories: Vec<RatedCategory>,
        scale_min: u8,
        scale_max: u8,
    },
}

/// A rated item recorded by the categorized selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatedItem {
    pub item: String,
    pub rating: u8,
}

/// The recorded value for a question, shaped by its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AnswerValue {
    /// Chosen option key of a single-choice question.
    Choice(String),
    /// Free-text input.
    Text(String),
    /// Checked option keys of a multi-choice question.
    Selections(Vec<String>),
    /// Ranked option keys, best first.
    Ranked(Vec<String>),
    /// Items with ratings from the categorized selector.
    Rated(Vec<RatedItem>),
}

/// An item belonging to a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier for the question.
    pub id: QuestionId,
    /// Question text.
    pub text: String,
    /// Whether an answer is required to leave the step.
    pub required: bool,
    /// Help text (optional).
    pub help: Option<String>,
    /// Kind tag plus type-specific configuration.
    pub kind: QuestionKind,
}

/// An ordered, named group of questions presented as one wizard step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub title: String,
    pub questions: Vec<Question>,
}

/// Upfront choice that determines which modules are active for a session.
///
/// The gate question is always single-choice. `exclusions` maps a chosen
/// option key to the module ids that become inactive for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchGate {
    pub question: Question,
    pub exclusions: HashMap<String, Vec<String>>,
}

impl BranchGate {
    /// Module ids excluded by the given branch choice.
    pub fn excluded_modules(&self, choice: &str) -> &[String] {
        self.exclusions
            .get(choice)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `choice` is a valid option key of the gate question.
    pub fn accepts(&self, choice: &str) -> bool {
        match &self.question.kind {
            QuestionKind::SingleChoice { options } => options.iter().any(|o| o.key == choice),
            // Gates are single-choice by construction.
            _ => false,
        }
    }
}

/// Static definition of one survey instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyDefinition {
    /// Stable instance id, also the persistence key prefix.
    pub id: String,
    /// Display title.
    pub title: String,
    /// All modules, in presentation order. Branch exclusions filter this list.
    pub modules: Vec<Module>,
    /// Optional upfront branch choice.
    pub branch: Option<BranchGate>,
    /// Simulated analysis latency awaited during submit, in milliseconds.
    pub analysis_delay_ms: u64,
    /// When true, questions of branch-excluded modules are filled with
    /// zero-contribution defaults at the wizard boundary before scoring.
    pub fill_skipped_defaults: bool,
    /// Scoring configuration for this instance.
    pub scoring: ScoringTable,
}

impl SurveyDefinition {
    /// Modules active for the given branch choice (all of them when the
    /// definition has no gate or no choice was made yet).
    pub fn active_modules(&self, branch: Option<&str>) -> Vec<&Module> {
        match (&self.branch, branch) {
            (Some(gate), Some(choice)) => {
                let excluded = gate.excluded_modules(choice);
                self.modules
                    .iter()
                    .filter(|m| !excluded.contains(&m.id))
                    .collect()
            }
            _ => self.modules.iter().collect(),
        }
    }

    /// Modules excluded for the given branch choice.
    pub fn excluded_modules(&self, branch: Option<&str>) -> Vec<&Module> {
        match (&self.branch, branch) {
            (Some(gate), Some(choice)) => {
                let excluded = gate.excluded_modules(choice);
                self.modules
                    .iter()
                    .filter(|m| excluded.contains(&m.id))
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    /// Total question count across all modules (branch-independent).
    pub fn question_count(&self) -> usize {
        self.modules.iter().map(|m| m.questions.len()).sum()
    }

    /// Find a question by id across all modules.
    pub fn find_question(&self, id: &str) -> Option<&Question> {
        self.modules
            .iter()
            .flat_map(|m| m.questions.iter())
            .find(|q| q.id == id)
    }
}
