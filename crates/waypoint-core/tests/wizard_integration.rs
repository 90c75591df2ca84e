//! Integration tests for the survey wizard: full take-a-survey workflows
//! over the built-in definitions, plus resume, reset and snapshot
//! robustness against a shared store.

use std::sync::Arc;

use waypoint_core::store::{KeyValueStore, MemoryStore, StoreCompletionFlags};
use waypoint_core::{catalog, AnswerValue, SurveyDefinition, SurveyWizard, WizardState};

fn zero_delay(mut def: SurveyDefinition) -> SurveyDefinition {
    def.analysis_delay_ms = 0;
    def
}

fn career_wizard(store: &Arc<MemoryStore>) -> SurveyWizard {
    let flags = Arc::new(StoreCompletionFlags::new(store.clone()));
    SurveyWizard::resume_or_new(zero_delay(catalog::career_survey()), store.clone(), flags)
}

fn choice(wizard: &mut SurveyWizard, id: &str, key: &str) {
    wizard
        .set_answer(id, AnswerValue::Choice(key.to_string()))
        .unwrap();
}

fn text(wizard: &mut SurveyWizard, id: &str, value: &str) {
    wizard
        .set_answer(id, AnswerValue::Text(value.to_string()))
        .unwrap();
}

fn answer_background(wizard: &mut SurveyWizard) {
    choice(wizard, "bg_education", "c");
    choice(wizard, "bg_field", "a");
    choice(wizard, "bg_experience", "c");
    text(wizard, "bg_role", "Data analyst");
    wizard
        .set_answer(
            "bg_industries",
            AnswerValue::Selections(vec!["tech".into(), "finance".into()]),
        )
        .unwrap();
    wizard
        .set_answer(
            "bg_values",
            AnswerValue::Ranked(vec!["growth".into(), "impact".into(), "pay".into()]),
        )
        .unwrap();
}

fn answer_skills(wizard: &mut SurveyWizard) {
    choice(wizard, "sk_confidence", "c");
    choice(wizard, "sk_learning_speed", "a");
    choice(wizard, "sk_cert_count", "b");
    wizard
        .set_answer(
            "sk_inventory",
            AnswerValue::Rated(vec![waypoint_core::RatedItem {
                item: "Data analysis".into(),
                rating: 4,
            }]),
        )
        .unwrap();
    text(wizard, "sk_strongest", "SQL and dashboarding");
    wizard
        .set_answer(
            "sk_tools",
            AnswerValue::Selections(vec!["docs".into(), "vcs".into()]),
        )
        .unwrap();
    choice(wizard, "sk_practice", "a");
}

fn answer_work_style(wizard: &mut SurveyWizard) {
    choice(wizard, "ws_structure", "a");
    choice(wizard, "ws_ambiguity", "a");
    choice(wizard, "ws_decision", "b");
    choice(wizard, "ws_feedback", "a");
    choice(wizard, "ws_pace", "a");
}

fn answer_goals(wizard: &mut SurveyWizard) {
    choice(wizard, "goals_direction", "a");
    choice(wizard, "goals_timeline", "a");
    choice(wizard, "goals_commitment", "b");
}

#[tokio::test]
async fn test_full_career_workflow() {
    let store = Arc::new(MemoryStore::new());
    let flags = StoreCompletionFlags::new(store.clone());
    let mut wizard = career_wizard(&store);

    assert_eq!(wizard.state(), WizardState::BranchSelection);
    wizard.choose_branch("yes").unwrap();
    assert_eq!(wizard.active_modules().len(), 4);

    answer_background(&mut wizard);
    wizard.advance().unwrap();
    answer_skills(&mut wizard);
    wizard.advance().unwrap();
    answer_work_style(&mut wizard);
    wizard.advance().unwrap();
    assert_eq!(wizard.state(), WizardState::InModule(3));

    answer_goals(&mut wizard);
    let result = wizard.submit().await.unwrap();

    assert_eq!(result.scaled_scores["structure"], 80);
    assert_eq!(result.scaled_scores["ambiguity"], 0);
    assert_eq!(result.scaled_scores["decision"], 50);
    assert_eq!(result.scaled_scores["learning"], 80);
    assert_eq!(result.scaled_scores["transfer"], 50);
    assert_eq!(result.archetypes, vec!["specialist", "builder"]);

    assert_eq!(wizard.state(), WizardState::ResultShown);
    assert!(store.get("result:career-survey").unwrap().is_some());
    assert!(store.get("progress:career-survey").unwrap().is_none());
    assert!(flags.is_complete("career-survey"));
}

#[tokio::test]
async fn test_skipped_module_answers_are_zero_filled() {
    let store = Arc::new(MemoryStore::new());
    let mut wizard = career_wizard(&store);

    wizard.choose_branch("no").unwrap();
    // The skills module is excluded for this branch.
    assert_eq!(wizard.active_modules().len(), 3);
    assert!(wizard.active_modules().iter().all(|m| m.id != "skills"));

    choice(&mut wizard, "bg_education", "d");
    choice(&mut wizard, "bg_field", "d");
    choice(&mut wizard, "bg_experience", "a");
    text(&mut wizard, "bg_role", "Student");
    wizard
        .set_answer("bg_industries", AnswerValue::Selections(vec!["media".into()]))
        .unwrap();
    wizard
        .set_answer(
            "bg_values",
            AnswerValue::Ranked(vec!["impact".into(), "autonomy".into(), "balance".into()]),
        )
        .unwrap();
    wizard.advance().unwrap();

    choice(&mut wizard, "ws_structure", "d");
    choice(&mut wizard, "ws_ambiguity", "d");
    choice(&mut wizard, "ws_decision", "d");
    choice(&mut wizard, "ws_feedback", "a");
    choice(&mut wizard, "ws_pace", "c");
    wizard.advance().unwrap();

    choice(&mut wizard, "goals_direction", "d");
    choice(&mut wizard, "goals_timeline", "c");
    choice(&mut wizard, "goals_commitment", "a");
    let result = wizard.submit().await.unwrap();

    // Skills dimensions exist with zero contribution from the skipped module.
    assert_eq!(result.raw_scores["ambiguity"], 6);
    assert_eq!(result.raw_scores["learning"], 8);
    assert_eq!(result.raw_scores["structure"], 0);
    assert_eq!(result.scaled_scores["ambiguity"], 100);
    assert_eq!(result.scaled_scores["learning"], 80);
    assert_eq!(result.archetypes, vec!["explorer", "builder"]);
}

#[tokio::test]
async fn test_personality_test_workflow() {
    let store = Arc::new(MemoryStore::new());
    let flags = Arc::new(StoreCompletionFlags::new(store.clone()));
    let mut wizard = SurveyWizard::resume_or_new(
        zero_delay(catalog::personality_test()),
        store.clone(),
        flags,
    );

    // No branch gate: the wizard starts directly in the first module.
    assert_eq!(wizard.state(), WizardState::InModule(0));
    assert_eq!(wizard.active_modules().len(), 5);

    let answers = [
        ("p_big_picture", "a"),
        ("p_details", "b"),
        ("e_groups", "b"),
        ("e_recharge", "a"),
        ("t_plan", "a"),
        ("t_improvise", "a"),
        ("r_pressure", "a"),
        ("r_criticism", "b"),
        ("v_direction", "a"),
        ("v_pace", "a"),
    ];
    let steps: Vec<_> = answers.chunks(2).collect();
    for (i, pair) in steps.iter().enumerate() {
        for (id, key) in pair.iter() {
            choice(&mut wizard, id, key);
        }
        if i + 1 < steps.len() {
            wizard.advance().unwrap();
        }
    }

    let result = wizard.submit().await.unwrap();
    assert_eq!(result.scaled_scores["mind"], 100);
    assert_eq!(result.scaled_scores["energy"], 0);
    assert_eq!(result.scaled_scores["tactics"], 100);
    assert_eq!(result.scaled_scores["identity"], 100);
    assert_eq!(result.archetypes, vec!["strategist", "anchor", "mediator"]);
}

#[test]
fn test_resume_restores_progress() {
    let store = Arc::new(MemoryStore::new());

    let mut wizard = career_wizard(&store);
    wizard.choose_branch("yes").unwrap();
    choice(&mut wizard, "bg_education", "c");
    choice(&mut wizard, "bg_field", "a");
    let session = wizard.session_id().to_string();
    drop(wizard);

    let resumed = career_wizard(&store);
    assert_eq!(resumed.session_id(), session);
    assert_eq!(resumed.branch(), Some("yes"));
    assert_eq!(resumed.state(), WizardState::InModule(0));
    assert_eq!(resumed.answers().len(), 2);
}

#[tokio::test]
async fn test_result_redisplayed_without_recomputation() {
    let store = Arc::new(MemoryStore::new());

    let mut wizard = career_wizard(&store);
    wizard.choose_branch("yes").unwrap();
    answer_background(&mut wizard);
    wizard.advance().unwrap();
    answer_skills(&mut wizard);
    wizard.advance().unwrap();
    answer_work_style(&mut wizard);
    wizard.advance().unwrap();
    answer_goals(&mut wizard);
    let result = wizard.submit().await.unwrap();
    let stored_json = store.get("result:career-survey").unwrap().unwrap();
    drop(wizard);

    let resumed = career_wizard(&store);
    assert_eq!(resumed.state(), WizardState::ResultShown);
    assert_eq!(resumed.result(), Some(&result));
    // Resuming reads the stored result verbatim; nothing is rewritten.
    assert_eq!(store.get("result:career-survey").unwrap().unwrap(), stored_json);
}

#[tokio::test]
async fn test_reset_clears_progress_result_and_flag() {
    let store = Arc::new(MemoryStore::new());
    let flags = StoreCompletionFlags::new(store.clone());

    let mut wizard = career_wizard(&store);
    wizard.choose_branch("yes").unwrap();
    answer_background(&mut wizard);
    wizard.advance().unwrap();
    answer_skills(&mut wizard);
    wizard.advance().unwrap();
    answer_work_style(&mut wizard);
    wizard.advance().unwrap();
    answer_goals(&mut wizard);
    wizard.submit().await.unwrap();
    let old_session = wizard.session_id().to_string();

    wizard.reset();

    assert!(store.get("progress:career-survey").unwrap().is_none());
    assert!(store.get("result:career-survey").unwrap().is_none());
    assert!(!flags.is_complete("career-survey"));
    assert_eq!(wizard.state(), WizardState::BranchSelection);
    assert!(wizard.answers().is_empty());
    assert_ne!(wizard.session_id(), old_session);
}

#[test]
fn test_corrupt_snapshot_starts_fresh() {
    let store = Arc::new(MemoryStore::new());
    store.set("progress:career-survey", "not json {{{").unwrap();

    let wizard = career_wizard(&store);
    assert_eq!(wizard.state(), WizardState::BranchSelection);
    assert!(wizard.answers().is_empty());
    assert!(wizard.branch().is_none());
}

#[test]
fn test_snapshot_version_mismatch_starts_fresh() {
    let store = Arc::new(MemoryStore::new());
    let snapshot = serde_json::json!({
        "version": 99,
        "session_id": "old-session",
        "started_at": "2026-01-01T00:00:00Z",
        "branch": "yes",
        "answers": {},
        "step_index": 2,
    });
    store
        .set("progress:career-survey", &snapshot.to_string())
        .unwrap();

    let wizard = career_wizard(&store);
    assert_eq!(wizard.state(), WizardState::BranchSelection);
    assert_ne!(wizard.session_id(), "old-session");
}

#[tokio::test]
async fn test_cancelled_submit_returns_to_final_step() {
    let store = Arc::new(MemoryStore::new());
    let flags = Arc::new(StoreCompletionFlags::new(store.clone()));
    let mut def = catalog::career_survey();
    def.analysis_delay_ms = 200;
    let mut wizard = SurveyWizard::resume_or_new(def, store.clone(), flags);

    wizard.choose_branch("yes").unwrap();
    answer_background(&mut wizard);
    wizard.advance().unwrap();
    answer_skills(&mut wizard);
    wizard.advance().unwrap();
    answer_work_style(&mut wizard);
    wizard.advance().unwrap();
    answer_goals(&mut wizard);

    // Drop the pending submission mid-analysis.
    let cancelled =
        tokio::time::timeout(std::time::Duration::from_millis(20), wizard.submit()).await;
    assert!(cancelled.is_err());

    // The wizard is back on the final step, nothing was persisted, and
    // the session remains fully usable.
    assert_eq!(wizard.state(), WizardState::InModule(3));
    assert!(store.get("result:career-survey").unwrap().is_none());
    assert!(store.get("progress:career-survey").unwrap().is_some());

    choice(&mut wizard, "goals_timeline", "b");
    let result = wizard.submit().await.unwrap();
    assert_eq!(wizard.state(), WizardState::ResultShown);
    assert_eq!(result.primary_archetype(), "specialist");
}

#[tokio::test]
async fn test_submit_only_allowed_on_final_step() {
    let store = Arc::new(MemoryStore::new());
    let mut wizard = career_wizard(&store);
    wizard.choose_branch("yes").unwrap();
    answer_background(&mut wizard);

    assert!(wizard.submit().await.is_err());
    assert_eq!(wizard.state(), WizardState::InModule(0));
}
