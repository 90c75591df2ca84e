//! Waypoint core: survey definitions, scoring, and the wizard state machine.
//!
//! The crate is split along one seam: [`scoring`] is a pure, total
//! function from answers and a scoring table to a result, while
//! [`wizard`] owns all session state, persistence, and the analysis
//! transition. Everything the wizard saves goes through the
//! [`store::KeyValueStore`] trait, so frontends choose durability.
//!
//! Built-in survey instances live in [`catalog`].

pub mod catalog;
pub mod error;
pub mod question;
pub mod scoring;
pub mod store;
pub mod validation;
pub mod wizard;

pub use error::{CoreError, Result, StoreError, WizardError};
pub use question::{
    AnswerMap, AnswerValue, BranchGate, ChoiceOption, Module, Question, QuestionId, QuestionKind,
    RatedCategory, RatedItem, SurveyDefinition,
};
pub use scoring::{
    compute_result, compute_raw_scores, compute_scaled_scores, determine_archetypes,
    ArchetypeInfo, ArchetypeRule, Comparison, DimensionDelta, DimensionRange, RuleCondition,
    ScoringTable, SurveyResult,
};
pub use store::{
    data_dir, CompletionFlags, FileStore, KeyValueStore, MemoryStore, StoreCompletionFlags,
};
pub use validation::validate_step;
pub use wizard::{
    ProgressSnapshot, StoredResult, SurveyWizard, WizardProgressReport, WizardState,
    SNAPSHOT_VERSION,
};
