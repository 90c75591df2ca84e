//! Per-step completeness validation.
//!
//! A question is invalid only when it is required and its recorded answer
//! is missing or incomplete for its kind. Optional questions never block
//! a step. Over-selection (e.g. ranking more items than configured) is
//! prevented upstream by `set_answer`, not flagged here.

use std::collections::BTreeSet;

use crate::question::{AnswerMap, AnswerValue, Module, Question, QuestionId, QuestionKind};

/// Validate one module against the answer map.
///
/// Returns the ids of required questions whose answers are absent or
/// incomplete. The step may only advance when the set is empty.
pub fn validate_step(module: &Module, answers: &AnswerMap) -> BTreeSet<QuestionId> {
    module
        .questions
        .iter()
        .filter(|q| q.required && !answer_complete(q, answers.get(&q.id)))
        .map(|q| q.id.clone())
        .collect()
}

/// Whether the recorded value completes the question.
///
/// A value whose shape does not match the question kind counts as
/// incomplete; that can only arise from a hand-edited snapshot.
fn answer_complete(question: &Question, answer: Option<&AnswerValue>) -> bool {
    let Some(answer) = answer else {
        return false;
    };
    match (&question.kind, answer) {
        (QuestionKind::SingleChoice { .. }, AnswerValue::Choice(key)) => !key.is_empty(),
        (QuestionKind::FreeText { .. }, AnswerValue::Text(text)) => !text.is_empty(),
        (QuestionKind::MultiChoice { .. }, AnswerValue::Selections(keys)) => !keys.is_empty(),
        (QuestionKind::RankedChoice { rank_count, .. }, AnswerValue::Ranked(keys)) => {
            keys.len() >= *rank_count
        }
        (QuestionKind::RatedMultiSelect { .. }, AnswerValue::Rated(items)) => !items.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::{ChoiceOption, RatedItem};

    fn question(id: &str, required: bool, kind: QuestionKind) -> Question {
        Question {
            id: id.into(),
            text: String::new(),
            required,
            help: None,
            kind,
        }
    }

    fn options(n: usize) -> Vec<ChoiceOption> {
        (0..n)
            .map(|i| ChoiceOption::new(&format!("o{i}"), &format!("Option {i}")))
            .collect()
    }

    fn module(questions: Vec<Question>) -> Module {
        Module {
            id: "m".into(),
            title: "Module".into(),
            questions,
        }
    }

    #[test]
    fn optional_questions_never_block() {
        let m = module(vec![question(
            "q1",
            false,
            QuestionKind::FreeText { placeholder: None },
        )]);
        assert!(validate_step(&m, &AnswerMap::new()).is_empty());
    }

    #[test]
    fn missing_required_answer_is_flagged() {
        let m = module(vec![question(
            "q1",
            true,
            QuestionKind::SingleChoice { options: options(3) },
        )]);
        let invalid = validate_step(&m, &AnswerMap::new());
        assert!(invalid.contains("q1"));
    }

    #[test]
    fn empty_string_answers_are_flagged() {
        let m = module(vec![
            question("choice", true, QuestionKind::SingleChoice { options: options(2) }),
            question("text", true, QuestionKind::FreeText { placeholder: None }),
        ]);
        let answers = AnswerMap::from([
            ("choice".to_string(), AnswerValue::Choice(String::new())),
            ("text".to_string(), AnswerValue::Text(String::new())),
        ]);
        let invalid = validate_step(&m, &answers);
        assert!(invalid.contains("choice"));
        assert!(invalid.contains("text"));
    }

    #[test]
    fn checkbox_requires_non_empty_list() {
        let m = module(vec![question(
            "multi",
            true,
            QuestionKind::MultiChoice {
                options: options(4),
                min_selections: 1,
                max_selections: 3,
            },
        )]);
        let empty = AnswerMap::from([("multi".to_string(), AnswerValue::Selections(vec![]))]);
        assert!(validate_step(&m, &empty).contains("multi"));

        let picked =
            AnswerMap::from([("multi".to_string(), AnswerValue::Selections(vec!["o1".into()]))]);
        assert!(validate_step(&m, &picked).is_empty());
    }

    #[test]
    fn ranking_is_complete_only_at_configured_count() {
        let m = module(vec![question(
            "rank",
            true,
            QuestionKind::RankedChoice {
                options: options(6),
                rank_count: 3,
            },
        )]);

        let two = AnswerMap::from([(
            "rank".to_string(),
            AnswerValue::Ranked(vec!["o0".into(), "o1".into()]),
        )]);
        assert!(validate_step(&m, &two).contains("rank"));

        let three = AnswerMap::from([(
            "rank".to_string(),
            AnswerValue::Ranked(vec!["o0".into(), "o1".into(), "o2".into()]),
        )]);
        assert!(validate_step(&m, &three).is_empty());
    }

    #[test]
    fn rated_selector_requires_at_least_one_item() {
        let m = module(vec![question(
            "rated",
            true,
            QuestionKind::RatedMultiSelect {
                categories: vec![],
                scale_min: 1,
                scale_max: 5,
            },
        )]);
        let empty = AnswerMap::from([("rated".to_string(), AnswerValue::Rated(vec![]))]);
        assert!(validate_step(&m, &empty).contains("rated"));

        let one = AnswerMap::from([(
            "rated".to_string(),
            AnswerValue::Rated(vec![RatedItem {
                item: "sql".into(),
                rating: 3,
            }]),
        )]);
        assert!(validate_step(&m, &one).is_empty());
    }

    #[test]
    fn mismatched_value_shape_is_flagged() {
        let m = module(vec![question(
            "choice",
            true,
            QuestionKind::SingleChoice { options: options(2) },
        )]);
        let answers =
            AnswerMap::from([("choice".to_string(), AnswerValue::Selections(vec!["o0".into()]))]);
        assert!(validate_step(&m, &answers).contains("choice"));
    }
}
