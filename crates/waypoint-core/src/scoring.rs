//! Survey scoring engine.
//!
//! A pure function pipeline: answer map → raw dimension scores →
//! scaled (0-100) scores → rule-matched archetypes. No side effects,
//! no I/O, and total over its typed domain: unknown question ids and
//! unknown option keys contribute nothing rather than erroring, since
//! in-progress answer maps are routinely partial.
//!
//! Scaled scores are deliberately NOT clamped to [0, 100]. A raw score
//! outside its configured range scales outside the band, which keeps
//! table misconfiguration observable instead of silently masked.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::question::{AnswerMap, AnswerValue};

/// A named scoring axis with its raw-score range used for normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionRange {
    pub id: String,
    pub min: i64,
    pub max: i64,
}

impl DimensionRange {
    pub fn new(id: &str, min: i64, max: i64) -> Self {
        Self {
            id: id.to_string(),
            min,
            max,
        }
    }
}

/// Signed contribution of one chosen option to one dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionDelta {
    pub dimension: String,
    pub delta: i64,
}

impl DimensionDelta {
    pub fn new(dimension: &str, delta: i64) -> Self {
        Self {
            dimension: dimension.to_string(),
            delta,
        }
    }
}

/// Comparison operator of an archetype rule condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    AtLeast,
    AtMost,
    Above,
    Below,
}

impl Comparison {
    fn holds(self, value: i64, threshold: i64) -> bool {
        match self {
            Comparison::AtLeast => value >= threshold,
            Comparison::AtMost => value <= threshold,
            Comparison::Above => value > threshold,
            Comparison::Below => value < threshold,
        }
    }
}

/// One condition over a scaled dimension score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleCondition {
    pub dimension: String,
    pub op: Comparison,
    pub threshold: i64,
}

impl RuleCondition {
    pub fn new(dimension: &str, op: Comparison, threshold: i64) -> Self {
        Self {
            dimension: dimension.to_string(),
            op,
            threshold,
        }
    }
}

/// A named predicate over the scaled scores. All conditions must hold.
///
/// Rules are evaluated in declaration order; matching order, not score
/// magnitude, decides the returned archetype order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchetypeRule {
    pub archetype: String,
    pub conditions: Vec<RuleCondition>,
}

impl ArchetypeRule {
    pub fn matches(&self, scaled: &BTreeMap<String, i64>) -> bool {
        self.conditions.iter().all(|c| {
            let value = scaled.get(&c.dimension).copied().unwrap_or(0);
            c.op.holds(value, c.threshold)
        })
    }
}

/// Descriptive metadata for an archetype (name, narrative text).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchetypeInfo {
    pub id: String,
    pub name: String,
    pub narrative: String,
}

impl ArchetypeInfo {
    pub fn new(id: &str, name: &str, narrative: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            narrative: narrative.to_string(),
        }
    }
}

/// Static scoring configuration for one survey instance.
///
/// `deltas` maps question id → chosen option key → dimension deltas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringTable {
    /// Dimension set with normalization ranges, in declaration order.
    pub dimensions: Vec<DimensionRange>,
    /// (question, option) → contributions.
    pub deltas: HashMap<String, HashMap<String, Vec<DimensionDelta>>>,
    /// Archetype rules in evaluation order.
    pub rules: Vec<ArchetypeRule>,
    /// Archetype returned when no rule matches.
    pub fallback_archetype: String,
    /// Descriptive metadata per archetype id.
    pub archetype_info: Vec<ArchetypeInfo>,
    /// Metadata entry used when an archetype id has no matching entry.
    pub unknown_archetype: ArchetypeInfo,
}

impl ScoringTable {
    /// Look up descriptive metadata, falling back to the designated
    /// unknown entry when the id has none.
    pub fn describe(&self, archetype: &str) -> &ArchetypeInfo {
        self.archetype_info
            .iter()
            .find(|a| a.id == archetype)
            .unwrap_or(&self.unknown_archetype)
    }
}

/// The terminal output of the pipeline. Immutable once computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyResult {
    /// Survey instance the result belongs to.
    pub survey_id: String,
    /// Per-dimension raw totals.
    pub raw_scores: BTreeMap<String, i64>,
    /// Per-dimension scaled scores (nominally 0-100, unclamped).
    pub scaled_scores: BTreeMap<String, i64>,
    /// Matched archetypes in rule order; never empty, first is primary.
    pub archetypes: Vec<String>,
}

impl SurveyResult {
    /// The primary archetype (first match, or the fallback).
    pub fn primary_archetype(&self) -> &str {
        // determine_archetypes guarantees a non-empty list.
        self.archetypes.first().map(String::as_str).unwrap_or("")
    }
}

/// Sum option deltas for every single-choice answer present in the table.
///
/// The output contains an entry for every dimension the table declares,
/// even when never touched. Answers of other kinds, unknown question ids
/// and unknown option keys are skipped silently.
pub fn compute_raw_scores(answers: &AnswerMap, table: &ScoringTable) -> BTreeMap<String, i64> {
    let mut raw: BTreeMap<String, i64> = table
        .dimensions
        .iter()
        .map(|d| (d.id.clone(), 0))
        .collect();

    for (question_id, answer) in answers {
        let AnswerValue::Choice(key) = answer else {
            continue;
        };
        let Some(options) = table.deltas.get(question_id) else {
            continue;
        };
        let Some(deltas) = options.get(key) else {
            continue;
        };
        for d in deltas {
            if let Some(total) = raw.get_mut(&d.dimension) {
                *total += d.delta;
            }
        }
    }

    raw
}

/// Linearly rescale each raw score from its configured range into [0, 100],
/// rounded to the nearest integer.
///
/// A dimension with `min == max` scales to 0 (degenerate but defined).
/// Out-of-range raw inputs are not clamped, so the output can leave
/// [0, 100] when upstream data is inconsistent.
pub fn compute_scaled_scores(
    raw: &BTreeMap<String, i64>,
    dimensions: &[DimensionRange],
) -> BTreeMap<String, i64> {
    let mut scaled = BTreeMap::new();
    for dim in dimensions {
        let value = raw.get(&dim.id).copied().unwrap_or(0);
        let score = if dim.min == dim.max {
            0
        } else {
            let span = (dim.max - dim.min) as f64;
            (((value - dim.min) as f64 / span) * 100.0).round() as i64
        };
        scaled.insert(dim.id.clone(), score);
    }
    scaled
}

/// Evaluate the rules in declaration order and return all matches.
///
/// Never returns an empty list: when zero rules match, exactly the
/// table's fallback archetype is returned.
pub fn determine_archetypes(scaled: &BTreeMap<String, i64>, table: &ScoringTable) -> Vec<String> {
    let matched: Vec<String> = table
        .rules
        .iter()
        .filter(|r| r.matches(scaled))
        .map(|r| r.archetype.clone())
        .collect();

    if matched.is_empty() {
        vec![table.fallback_archetype.clone()]
    } else {
        matched
    }
}

/// Full pipeline: the only entry point the wizard calls.
pub fn compute_result(survey_id: &str, answers: &AnswerMap, table: &ScoringTable) -> SurveyResult {
    let raw_scores = compute_raw_scores(answers, table);
    let scaled_scores = compute_scaled_scores(&raw_scores, &table.dimensions);
    let archetypes = determine_archetypes(&scaled_scores, table);
    SurveyResult {
        survey_id: survey_id.to_string(),
        raw_scores,
        scaled_scores,
        archetypes,
    }
}
