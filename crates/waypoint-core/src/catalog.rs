//! Built-in survey definitions.
//!
//! Two instances share the same wizard/scoring design with different
//! question schemas and scoring tables: the four-module career survey
//! (23 questions, gated by an upfront skill-baseline choice) and the
//! five-module personality test (10 questions, no gate).
//!
//! Tables here are static product configuration, pre-validated by the
//! tests at the bottom of this file; the engine itself never checks them.

use std::collections::HashMap;

use crate::question::{
    BranchGate, ChoiceOption, Module, Question, QuestionKind, RatedCategory, SurveyDefinition,
};
use crate::scoring::{
    ArchetypeInfo, ArchetypeRule, Comparison, DimensionDelta, DimensionRange, RuleCondition,
    ScoringTable,
};

/// Stable id of the career survey instance.
pub const CAREER_SURVEY_ID: &str = "career-survey";
/// Stable id of the personality test instance.
pub const PERSONALITY_TEST_ID: &str = "personality-test";

/// All built-in definitions.
pub fn all() -> Vec<SurveyDefinition> {
    vec![career_survey(), personality_test()]
}

/// Look up a built-in definition by id.
pub fn by_id(id: &str) -> Option<SurveyDefinition> {
    match id {
        CAREER_SURVEY_ID => Some(career_survey()),
        PERSONALITY_TEST_ID => Some(personality_test()),
        _ => None,
    }
}

fn single(id: &str, text: &str, options: &[(&str, &str)]) -> Question {
    Question {
        id: id.to_string(),
        text: text.to_string(),
        required: true,
        help: None,
        kind: QuestionKind::SingleChoice {
            options: options.iter().map(|(k, l)| ChoiceOption::new(k, l)).collect(),
        },
    }
}

fn free_text(id: &str, text: &str, required: bool) -> Question {
    Question {
        id: id.to_string(),
        text: text.to_string(),
        required,
        help: None,
        kind: QuestionKind::FreeText { placeholder: None },
    }
}

fn multi(id: &str, text: &str, required: bool, options: &[(&str, &str)], max: usize) -> Question {
    Question {
        id: id.to_string(),
        text: text.to_string(),
        required,
        help: None,
        kind: QuestionKind::MultiChoice {
            options: options.iter().map(|(k, l)| ChoiceOption::new(k, l)).collect(),
            min_selections: 1,
            max_selections: max,
        },
    }
}

fn deltas(entries: &[(&str, &[(&str, i64)])]) -> HashMap<String, Vec<DimensionDelta>> {
    entries
        .iter()
        .map(|(key, ds)| {
            (
                key.to_string(),
                ds.iter().map(|(dim, d)| DimensionDelta::new(dim, *d)).collect(),
            )
        })
        .collect()
}

fn rule(archetype: &str, conditions: &[(&str, Comparison, i64)]) -> ArchetypeRule {
    ArchetypeRule {
        archetype: archetype.to_string(),
        conditions: conditions
            .iter()
            .map(|(dim, op, t)| RuleCondition::new(dim, *op, *t))
            .collect(),
    }
}

/// The 23-question, four-module career survey.
///
/// The skill-baseline gate excludes the skills module for users without
/// prior experience; its questions are zero-filled at submit time.
pub fn career_survey() -> SurveyDefinition {
    let background = Module {
        id: "background".into(),
        title: "Background".into(),
        questions: vec![
            single(
                "bg_education",
                "What is your highest level of education?",
                &[
                    ("a", "High school"),
                    ("b", "Bootcamp or self-taught"),
                    ("c", "Bachelor's degree"),
                    ("d", "Advanced degree"),
                ],
            ),
            single(
                "bg_field",
                "Which field best matches your background?",
                &[
                    ("a", "Technology"),
                    ("b", "Business or operations"),
                    ("c", "Creative or media"),
                    ("d", "Other"),
                ],
            ),
            single(
                "bg_experience",
                "How many years of professional experience do you have?",
                &[
                    ("a", "Less than 1 year"),
                    ("b", "1-3 years"),
                    ("c", "3-7 years"),
                    ("d", "More than 7 years"),
                ],
            ),
            free_text("bg_role", "What is your current or most recent role?", false),
            multi(
                "bg_industries",
                "Which industries interest you?",
                true,
                &[
                    ("tech", "Technology"),
                    ("finance", "Finance"),
                    ("health", "Healthcare"),
                    ("education", "Education"),
                    ("media", "Media"),
                    ("public", "Public sector"),
                ],
                3,
            ),
            Question {
                id: "bg_values".into(),
                text: "Rank your top three priorities in a job.".into(),
                required: true,
                help: Some("Pick exactly three, in order of importance.".into()),
                kind: QuestionKind::RankedChoice {
                    options: vec![
                        ChoiceOption::new("pay", "Compensation"),
                        ChoiceOption::new("growth", "Growth opportunities"),
                        ChoiceOption::new("stability", "Stability"),
                        ChoiceOption::new("impact", "Impact"),
                        ChoiceOption::new("autonomy", "Autonomy"),
                        ChoiceOption::new("balance", "Work-life balance"),
                    ],
                    rank_count: 3,
                },
            },
        ],
    };

    let skills = Module {
        id: "skills".into(),
        title: "Skill Baseline".into(),
        questions: vec![
            single(
                "sk_confidence",
                "How confident are you in your strongest skill?",
                &[
                    ("a", "Still learning the basics"),
                    ("b", "Comfortable with routine work"),
                    ("c", "Confident on most problems"),
                    ("d", "Others come to me for help"),
                ],
            ),
            single(
                "sk_learning_speed",
                "How quickly do you pick up new tools?",
                &[
                    ("a", "Very quickly"),
                    ("b", "With some ramp-up time"),
                    ("c", "Slowly but thoroughly"),
                ],
            ),
            single(
                "sk_cert_count",
                "How many relevant certifications do you hold?",
                &[("a", "None"), ("b", "One or two"), ("c", "Three or more")],
            ),
            Question {
                id: "sk_inventory".into(),
                text: "Select the skills you use and rate your level in each.".into(),
                required: true,
                help: Some("1 = beginner, 5 = expert".into()),
                kind: QuestionKind::RatedMultiSelect {
                    categories: vec![
                        RatedCategory {
                            name: "Technical".into(),
                            items: vec![
                                "Data analysis".into(),
                                "Programming".into(),
                                "Design tools".into(),
                                "Spreadsheets".into(),
                            ],
                        },
                        RatedCategory {
                            name: "Interpersonal".into(),
                            items: vec![
                                "Presenting".into(),
                                "Negotiation".into(),
                                "Mentoring".into(),
                            ],
                        },
                    ],
                    scale_min: 1,
                    scale_max: 5,
                },
            },
            free_text("sk_strongest", "Describe your strongest skill in one sentence.", true),
            multi(
                "sk_tools",
                "Which collaboration tools have you used professionally?",
                true,
                &[
                    ("docs", "Shared documents"),
                    ("tickets", "Ticket trackers"),
                    ("chat", "Team chat"),
                    ("vcs", "Version control"),
                ],
                4,
            ),
            single(
                "sk_practice",
                "How often do you practice skills outside work?",
                &[
                    ("a", "Weekly or more"),
                    ("b", "Monthly"),
                    ("c", "Rarely"),
                ],
            ),
        ],
    };

    let work_style = Module {
        id: "work-style".into(),
        title: "Work Style".into(),
        questions: vec![
            single(
                "ws_structure",
                "How do you prefer your work to be organized?",
                &[
                    ("a", "Clear processes and checklists"),
                    ("b", "A plan with room to adjust"),
                    ("c", "Loose goals, my own structure"),
                    ("d", "No structure, I improvise"),
                ],
            ),
            single(
                "ws_ambiguity",
                "A project brief is vague. What do you do?",
                &[
                    ("a", "Ask for a precise specification first"),
                    ("b", "Clarify the riskiest unknowns, then start"),
                    ("c", "Start and refine as I learn"),
                    ("d", "Enjoy it -- vague briefs mean freedom"),
                ],
            ),
            single(
                "ws_decision",
                "When facing a hard decision you usually...",
                &[
                    ("a", "Decide fast and own the outcome"),
                    ("b", "Weigh options briefly, then commit"),
                    ("c", "Gather broad input before committing"),
                    ("d", "Keep options open as long as possible"),
                ],
            ),
            single(
                "ws_feedback",
                "How do you respond to critical feedback?",
                &[
                    ("a", "I actively seek it out"),
                    ("b", "I take it on board after reflection"),
                    ("c", "I debate it before accepting"),
                    ("d", "I find it demotivating"),
                ],
            ),
            single(
                "ws_pace",
                "Which working rhythm suits you best?",
                &[
                    ("a", "Steady, predictable cadence"),
                    ("b", "Sprints with planned recovery"),
                    ("c", "Bursts driven by inspiration"),
                    ("d", "Whatever the day brings"),
                ],
            ),
        ],
    };

    let goals = Module {
        id: "goals".into(),
        title: "Goals".into(),
        questions: vec![
            single(
                "goals_direction",
                "What direction are you aiming for?",
                &[
                    ("a", "Deepen my current specialty"),
                    ("b", "Switch to a new field"),
                    ("c", "Move into leadership"),
                    ("d", "Explore before committing"),
                ],
            ),
            single(
                "goals_timeline",
                "When do you want to make your next move?",
                &[
                    ("a", "Within 3 months"),
                    ("b", "Within a year"),
                    ("c", "No fixed timeline"),
                ],
            ),
            single(
                "goals_commitment",
                "How much time can you invest in learning each week?",
                &[
                    ("a", "More than 10 hours"),
                    ("b", "3-10 hours"),
                    ("c", "Less than 3 hours"),
                ],
            ),
            multi(
                "goals_constraints",
                "Any constraints on your next role?",
                false,
                &[
                    ("remote", "Remote only"),
                    ("location", "Fixed location"),
                    ("salary", "Salary floor"),
                    ("hours", "Limited hours"),
                ],
                4,
            ),
            free_text("goals_motivation", "What motivates this change?", false),
        ],
    };

    let scoring = ScoringTable {
        dimensions: vec![
            DimensionRange::new("structure", 0, 10),
            DimensionRange::new("ambiguity", -2, 6),
            DimensionRange::new("decision", 0, 8),
            DimensionRange::new("learning", 0, 10),
            DimensionRange::new("transfer", 0, 6),
        ],
        deltas: HashMap::from([
            (
                "bg_education".to_string(),
                deltas(&[
                    ("a", &[("learning", 1)]),
                    ("b", &[("learning", 2)]),
                    ("c", &[("learning", 2)]),
                    ("d", &[("learning", 3)]),
                ]),
            ),
            (
                "bg_field".to_string(),
                deltas(&[
                    ("a", &[("transfer", 1)]),
                    ("b", &[("transfer", 2)]),
                    ("c", &[("transfer", 1)]),
                ]),
            ),
            (
                "bg_experience".to_string(),
                deltas(&[
                    ("b", &[("transfer", 1)]),
                    ("c", &[("transfer", 2)]),
                    ("d", &[("transfer", 3)]),
                ]),
            ),
            (
                "sk_confidence".to_string(),
                deltas(&[
                    ("b", &[("decision", 1)]),
                    ("c", &[("decision", 1)]),
                    ("d", &[("decision", 2)]),
                ]),
            ),
            (
                "sk_learning_speed".to_string(),
                deltas(&[("a", &[("learning", 2)]), ("b", &[("learning", 1)])]),
            ),
            (
                "sk_cert_count".to_string(),
                deltas(&[("b", &[("structure", 1)]), ("c", &[("structure", 2)])]),
            ),
            (
                "ws_structure".to_string(),
                deltas(&[
                    ("a", &[("structure", 3)]),
                    ("b", &[("structure", 2)]),
                    ("c", &[("structure", 1)]),
                    ("d", &[("ambiguity", 1)]),
                ]),
            ),
            (
                "ws_ambiguity".to_string(),
                deltas(&[
                    ("a", &[("structure", 1), ("ambiguity", -2)]),
                    ("b", &[("ambiguity", -1)]),
                    ("c", &[("ambiguity", 1)]),
                    ("d", &[("ambiguity", 2)]),
                ]),
            ),
            (
                "ws_decision".to_string(),
                deltas(&[
                    ("a", &[("decision", 3)]),
                    ("b", &[("decision", 2)]),
                    ("c", &[("decision", 1)]),
                    ("d", &[("ambiguity", 1)]),
                ]),
            ),
            (
                "ws_feedback".to_string(),
                deltas(&[
                    ("a", &[("learning", 2)]),
                    ("b", &[("learning", 1)]),
                    ("c", &[("decision", 1)]),
                ]),
            ),
            (
                "ws_pace".to_string(),
                deltas(&[
                    ("a", &[("structure", 2)]),
                    ("b", &[("structure", 1)]),
                    ("c", &[("ambiguity", 1)]),
                    ("d", &[("ambiguity", 1)]),
                ]),
            ),
            (
                "goals_direction".to_string(),
                deltas(&[
                    ("a", &[("structure", 1)]),
                    ("b", &[("transfer", 1)]),
                    ("c", &[("decision", 1)]),
                    ("d", &[("ambiguity", 1)]),
                ]),
            ),
            (
                "goals_timeline".to_string(),
                deltas(&[("a", &[("decision", 1)])]),
            ),
            (
                "goals_commitment".to_string(),
                deltas(&[
                    ("a", &[("learning", 3)]),
                    ("b", &[("learning", 2)]),
                    ("c", &[("learning", 1)]),
                ]),
            ),
        ]),
        rules: vec![
            rule(
                "specialist",
                &[
                    ("structure", Comparison::AtLeast, 70),
                    ("ambiguity", Comparison::AtMost, 40),
                ],
            ),
            rule(
                "explorer",
                &[
                    ("ambiguity", Comparison::AtLeast, 60),
                    ("learning", Comparison::AtLeast, 50),
                ],
            ),
            rule(
                "strategist",
                &[
                    ("decision", Comparison::AtLeast, 60),
                    ("structure", Comparison::AtLeast, 50),
                ],
            ),
            rule("builder", &[("learning", Comparison::AtLeast, 70)]),
        ],
        fallback_archetype: "generalist".into(),
        archetype_info: vec![
            ArchetypeInfo::new(
                "specialist",
                "The Specialist",
                "You do your best work inside a well-defined system and compound expertise over time.",
            ),
            ArchetypeInfo::new(
                "explorer",
                "The Explorer",
                "Ambiguity energizes you; unfamiliar problems are where you learn fastest.",
            ),
            ArchetypeInfo::new(
                "strategist",
                "The Strategist",
                "You combine decisiveness with enough structure to make plans that hold.",
            ),
            ArchetypeInfo::new(
                "builder",
                "The Builder",
                "Sustained learning is your engine; you grow capabilities faster than roles demand them.",
            ),
            ArchetypeInfo::new(
                "generalist",
                "The Generalist",
                "You balance structure, ambiguity and learning without a single dominant mode.",
            ),
        ],
        unknown_archetype: ArchetypeInfo::new(
            "unknown",
            "Profile",
            "A description for this profile is not available yet.",
        ),
    };

    SurveyDefinition {
        id: CAREER_SURVEY_ID.into(),
        title: "Career Survey".into(),
        modules: vec![background, skills, work_style, goals],
        branch: Some(BranchGate {
            question: single(
                "skill_baseline",
                "Do you already have a skill baseline from past work or study?",
                &[("yes", "Yes, I can rate my skills"), ("no", "No, I'm starting fresh")],
            ),
            exclusions: HashMap::from([("no".to_string(), vec!["skills".to_string()])]),
        }),
        analysis_delay_ms: 1500,
        fill_skipped_defaults: true,
        scoring,
    }
}

/// The 10-question, five-module personality test.
pub fn personality_test() -> SurveyDefinition {
    let pair = |id: &str, title: &str, q1: Question, q2: Question| Module {
        id: id.to_string(),
        title: title.to_string(),
        questions: vec![q1, q2],
    };

    let modules = vec![
        pair(
            "perspective",
            "Perspective",
            single(
                "p_big_picture",
                "In a new project, what do you notice first?",
                &[("a", "The overall shape and direction"), ("b", "The concrete details")],
            ),
            single(
                "p_details",
                "A plan is missing a small detail. You...",
                &[("a", "Fix it before anything else"), ("b", "Note it and keep moving")],
            ),
        ),
        pair(
            "energy",
            "Social Energy",
            single(
                "e_groups",
                "A day of group workshops leaves you...",
                &[("a", "Energized"), ("b", "Drained")],
            ),
            single(
                "e_recharge",
                "You recharge best by...",
                &[("a", "Time alone"), ("b", "Time with people")],
            ),
        ),
        pair(
            "approach",
            "Approach to Work",
            single(
                "t_plan",
                "Before starting, you prefer to...",
                &[("a", "Lay out a full plan"), ("b", "Sketch a direction and go")],
            ),
            single(
                "t_improvise",
                "When the plan breaks, you...",
                &[("a", "Re-plan carefully"), ("b", "Improvise on the spot")],
            ),
        ),
        pair(
            "resilience",
            "Resilience",
            single(
                "r_pressure",
                "Under deadline pressure you...",
                &[("a", "Get calmer and more focused"), ("b", "Feel the strain quickly")],
            ),
            single(
                "r_criticism",
                "Harsh criticism of your work...",
                &[("a", "Stings for days"), ("b", "Rolls off once addressed")],
            ),
        ),
        pair(
            "direction",
            "Direction",
            single(
                "v_direction",
                "You choose what to work on based on...",
                &[("a", "Long-term vision"), ("b", "What is needed right now")],
            ),
            single(
                "v_pace",
                "Your ideal week is...",
                &[("a", "Mapped out in advance"), ("b", "Decided day by day")],
            ),
        ),
    ];

    let scoring = ScoringTable {
        dimensions: vec![
            DimensionRange::new("mind", -5, 5),
            DimensionRange::new("energy", -4, 4),
            DimensionRange::new("tactics", -5, 5),
            DimensionRange::new("identity", -4, 4),
        ],
        deltas: HashMap::from([
            (
                "p_big_picture".to_string(),
                deltas(&[("a", &[("mind", 2)]), ("b", &[("mind", -2)])]),
            ),
            (
                "p_details".to_string(),
                deltas(&[("a", &[("mind", -2)]), ("b", &[("mind", 2)])]),
            ),
            (
                "e_groups".to_string(),
                deltas(&[("a", &[("energy", 2)]), ("b", &[("energy", -2)])]),
            ),
            (
                "e_recharge".to_string(),
                deltas(&[("a", &[("energy", -2)]), ("b", &[("energy", 2)])]),
            ),
            (
                "t_plan".to_string(),
                deltas(&[("a", &[("tactics", 2)]), ("b", &[("tactics", -2)])]),
            ),
            (
                "t_improvise".to_string(),
                deltas(&[("a", &[("tactics", 2)]), ("b", &[("tactics", -2)])]),
            ),
            (
                "r_pressure".to_string(),
                deltas(&[("a", &[("identity", 2)]), ("b", &[("identity", -2)])]),
            ),
            (
                "r_criticism".to_string(),
                deltas(&[("a", &[("identity", -2)]), ("b", &[("identity", 2)])]),
            ),
            (
                "v_direction".to_string(),
                deltas(&[("a", &[("mind", 1)]), ("b", &[("mind", -1)])]),
            ),
            (
                "v_pace".to_string(),
                deltas(&[("a", &[("tactics", 1)]), ("b", &[("tactics", -1)])]),
            ),
        ]),
        rules: vec![
            rule(
                "strategist",
                &[
                    ("mind", Comparison::AtLeast, 70),
                    ("tactics", Comparison::AtLeast, 70),
                ],
            ),
            rule(
                "catalyst",
                &[
                    ("energy", Comparison::AtLeast, 70),
                    ("mind", Comparison::AtLeast, 50),
                ],
            ),
            rule(
                "anchor",
                &[
                    ("identity", Comparison::AtLeast, 70),
                    ("tactics", Comparison::AtLeast, 50),
                ],
            ),
            rule(
                "mediator",
                &[
                    ("energy", Comparison::AtMost, 30),
                    ("identity", Comparison::AtLeast, 50),
                ],
            ),
        ],
        fallback_archetype: "harmonizer".into(),
        archetype_info: vec![
            ArchetypeInfo::new(
                "strategist",
                "The Strategist",
                "Big-picture thinking backed by deliberate planning.",
            ),
            ArchetypeInfo::new(
                "catalyst",
                "The Catalyst",
                "You draw energy from people and turn ideas into momentum.",
            ),
            ArchetypeInfo::new(
                "anchor",
                "The Anchor",
                "Steady under pressure; teams organize themselves around your calm.",
            ),
            ArchetypeInfo::new(
                "mediator",
                "The Mediator",
                "Quiet resilience and careful listening make you the bridge in hard conversations.",
            ),
            ArchetypeInfo::new(
                "harmonizer",
                "The Harmonizer",
                "You adapt your style to the situation rather than leading with one mode.",
            ),
        ],
        unknown_archetype: ArchetypeInfo::new(
            "unknown",
            "Profile",
            "A description for this profile is not available yet.",
        ),
    };

    SurveyDefinition {
        id: PERSONALITY_TEST_ID.into(),
        title: "Personality Test".into(),
        modules,
        branch: None,
        analysis_delay_ms: 1000,
        fill_skipped_defaults: false,
        scoring,
    }
}
