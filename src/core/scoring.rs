// scoring.rs - Composite ranking score over a fixed metric subset

use crate::core::linkage::LdSummary;
use crate::core::metrics::PopulationMetrics;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Metrics that can take part in the ranking score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreMetric {
    He,
    Ho,
    /// `Ae / ae_scale`
    Ae,
    Pic,
    Pd,
    Pad2,
    Pad3,
    Pad4,
    /// Full HWE chi-square p-value
    Hwe,
    /// Two-category HWE p-value
    HweSimple,
    /// `1 - r²_mean`
    LdPenalty,
}

impl ScoreMetric {
    pub const ALL: [ScoreMetric; 11] = [
        ScoreMetric::He,
        ScoreMetric::Ho,
        ScoreMetric::Ae,
        ScoreMetric::Pic,
        ScoreMetric::Pd,
        ScoreMetric::Pad2,
        ScoreMetric::Pad3,
        ScoreMetric::Pad4,
        ScoreMetric::Hwe,
        ScoreMetric::HweSimple,
        ScoreMetric::LdPenalty,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScoreMetric::He => "he",
            ScoreMetric::Ho => "ho",
            ScoreMetric::Ae => "ae",
            ScoreMetric::Pic => "pic",
            ScoreMetric::Pd => "pd",
            ScoreMetric::Pad2 => "pad2",
            ScoreMetric::Pad3 => "pad3",
            ScoreMetric::Pad4 => "pad4",
            ScoreMetric::Hwe => "hwe",
            ScoreMetric::HweSimple => "hwe-simple",
            ScoreMetric::LdPenalty => "ld-penalty",
        }
    }
}

impl fmt::Display for ScoreMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ScoreMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ScoreMetric::ALL
            .iter()
            .copied()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = ScoreMetric::ALL.iter().map(|m| m.name()).collect();
                format!("Invalid score metric: {}. Use: {}", s, names.join(", "))
            })
    }
}

/// Which metrics are averaged into the score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub metrics: Vec<ScoreMetric>,
    /// Divisor that maps `Ae` onto roughly `[0, 1]`
    pub ae_scale: f64,
}

impl Default for ScoringPolicy {
    /// He, Ho, Ae/10, PIC, PD and ProbAllDistinct(4)
    fn default() -> Self {
        Self {
            metrics: vec![
                ScoreMetric::He,
                ScoreMetric::Ho,
                ScoreMetric::Ae,
                ScoreMetric::Pic,
                ScoreMetric::Pd,
                ScoreMetric::Pad4,
            ],
            ae_scale: 10.0,
        }
    }
}

impl ScoringPolicy {
    /// Parse a comma-separated metric list such as `he,ho,pd`
    pub fn from_list(list: &str, ae_scale: f64) -> Result<Self, String> {
        let metrics = list
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(ScoreMetric::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        let policy = Self { metrics, ae_scale };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.metrics.is_empty() {
            return Err("Scoring policy needs at least one metric".to_string());
        }
        if !(self.ae_scale > 0.0) {
            return Err(format!("ae_scale must be positive, got {}", self.ae_scale));
        }
        Ok(())
    }

    pub fn describe(&self) -> String {
        self.metrics
            .iter()
            .map(|m| match m {
                ScoreMetric::Ae => format!("ae/{}", self.ae_scale),
                other => other.name().to_string(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Folds the selected metrics of one window into its ranking score
#[derive(Debug, Clone)]
pub struct WindowScorer {
    policy: ScoringPolicy,
}

impl WindowScorer {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    fn metric_value(&self, metric: ScoreMetric, pop: &PopulationMetrics, ld: &LdSummary) -> Option<f64> {
        match metric {
            ScoreMetric::He => pop.he,
            ScoreMetric::Ho => pop.ho,
            ScoreMetric::Ae => pop.ae.map(|ae| ae / self.policy.ae_scale),
            ScoreMetric::Pic => pop.pic,
            ScoreMetric::Pd => pop.pd,
            ScoreMetric::Pad2 => pop.prob_all_distinct_2,
            ScoreMetric::Pad3 => pop.prob_all_distinct_3,
            ScoreMetric::Pad4 => pop.prob_all_distinct_4,
            ScoreMetric::Hwe => pop.hwe_p_value(),
            ScoreMetric::HweSimple => pop.hwe_simple_p_value(),
            ScoreMetric::LdPenalty => ld.r_squared_mean.map(|r2| 1.0 - r2),
        }
    }

    /// Unweighted mean of the clipped, defined metrics; `None` if none are defined
    pub fn score(&self, pop: &PopulationMetrics, ld: &LdSummary) -> Option<f64> {
        let values: Vec<f64> = self
            .policy
            .metrics
            .iter()
            .filter_map(|&m| self.metric_value(m, pop, ld))
            .filter(|v| !v.is_nan())
            .map(|v| v.clamp(0.0, 1.0))
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }
}
