//! Scoring output types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tokens::types::Confidence;

/// Outcome of one scoring check: accumulated penalty (capped at `max_score`)
/// plus the human-readable flags the check raised.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub penalty: f64,
    pub max_score: f64,
    pub flags: Vec<String>,
}

impl CheckResult {
    pub fn new(max_score: f64) -> Self {
        Self {
            penalty: 0.0,
            max_score,
            flags: Vec::new(),
        }
    }

    /// Add a penalty with its flag.
    pub fn hit(&mut self, penalty: f64, flag: impl Into<String>) {
        self.penalty += penalty;
        self.flags.push(flag.into());
    }

    /// Cap the accumulated penalty at the check's maximum.
    pub fn finalize(mut self) -> Self {
        self.penalty = self.penalty.min(self.max_score);
        self
    }

    /// Does any flag contain the given fragment (case-insensitive)?
    pub fn has_flag_containing(&self, fragment: &str) -> bool {
        let needle = fragment.to_lowercase();
        self.flags.iter().any(|f| f.to_lowercase().contains(&needle))
    }
}

/// Booleans derived from combinations of already-computed signals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeRisks {
    pub rug_in_progress: bool,
    pub pump_setup: bool,
    pub wash_trading: bool,
    pub coordinated_dump: bool,
    pub insider_accumulation: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DangerCategory {
    #[serde(rename = "SAFE")]
    Safe,
    #[serde(rename = "LOW_RISK")]
    LowRisk,
    #[serde(rename = "MODERATE")]
    Moderate,
    #[serde(rename = "HIGH_RISK")]
    HighRisk,
    #[serde(rename = "EXTREME")]
    Extreme,
}

impl Default for DangerCategory {
    fn default() -> Self {
        DangerCategory::Safe
    }
}

impl DangerCategory {
    pub fn from_overall(overall: i64) -> Self {
        match overall {
            o if o >= 80 => DangerCategory::Extreme,
            o if o >= 60 => DangerCategory::HighRisk,
            o if o >= 40 => DangerCategory::Moderate,
            o if o >= 20 => DangerCategory::LowRisk,
            _ => DangerCategory::Safe,
        }
    }
}

/// Inverse safety score, boosted by composite risks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DangerScore {
    /// 0 safest, 100 most dangerous.
    pub overall: i64,
    pub confidence: Confidence,
    pub category: DangerCategory,
    /// Up to three flags, ordered by a fixed priority list.
    pub primary_risks: Vec<String>,
    pub positive_signals: Vec<String>,
}

impl Default for DangerScore {
    fn default() -> Self {
        Self {
            overall: 0,
            confidence: Confidence::Low,
            category: DangerCategory::Safe,
            primary_risks: Vec::new(),
            positive_signals: Vec::new(),
        }
    }
}

/// Full result of scoring one token record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// `score >= config.min_score`.
    pub passed: bool,
    /// Integer 0..=100.
    pub score: i64,
    pub flags: Vec<String>,
    /// Per-check breakdown, keyed by check name.
    pub breakdown: BTreeMap<String, CheckResult>,
    pub danger_score: DangerScore,
    pub composite_risks: CompositeRisks,
    pub positive_signals: Vec<String>,
}
