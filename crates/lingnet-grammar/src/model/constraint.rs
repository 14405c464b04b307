//! Constraints: the weighted dimensions candidates are evaluated on

use serde::{Deserialize, Serialize};

use lingnet_common::{DEFAULT_CONSTRAINT_BIAS, DEFAULT_CONSTRAINT_WEIGHT};

/// Constraint category, used to scale perceptron updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConstraintFamily {
    Markedness,
    InputOutputFaithfulness,
    OutputOutputFaithfulness,
    BaseReduplicantFaithfulness,
    Precedence,
}

impl ConstraintFamily {
    /// Parse the one-letter family code of a `[family]` directive row
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "m" => Some(Self::Markedness),
            "i" => Some(Self::InputOutputFaithfulness),
            "o" => Some(Self::OutputOutputFaithfulness),
            "b" => Some(Self::BaseReduplicantFaithfulness),
            "p" => Some(Self::Precedence),
            _ => None,
        }
    }

    pub fn is_faithfulness(&self) -> bool {
        matches!(
            self,
            Self::InputOutputFaithfulness
                | Self::OutputOutputFaithfulness
                | Self::BaseReduplicantFaithfulness
        )
    }
}

/// A single constraint of a tableau set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Full name (row 1 of the input file)
    pub name: String,
    /// Abbreviated name (row 2 of the input file)
    pub short_name: String,
    /// Name used in marked-up output
    pub markup_name: String,
    /// Current weight; only the learner changes it
    pub weight: f64,
    /// Category, `None` when the file does not classify the constraint
    pub family: Option<ConstraintFamily>,
    /// Local minimum weight overriding the tableau set's default
    pub min_weight: Option<f64>,
    /// Local noise amplitude overriding the tableau set's global noise
    pub noise: Option<f64>,
    pub bias: f64,
    pub initial_ranking: f64,
    /// Stratum index assigned by ranking analysis
    pub stratum: usize,
}

impl Constraint {
    /// Create a constraint at the default weight
    pub fn new(name: impl Into<String>, short_name: impl Into<String>) -> Self {
        let short_name = short_name.into();
        Self {
            name: name.into(),
            markup_name: short_name.clone(),
            short_name,
            weight: DEFAULT_CONSTRAINT_WEIGHT,
            family: None,
            min_weight: None,
            noise: None,
            bias: DEFAULT_CONSTRAINT_BIAS,
            initial_ranking: 0.0,
            stratum: 0,
        }
    }

    /// Builder-style family assignment
    pub fn with_family(mut self, family: ConstraintFamily) -> Self {
        self.family = Some(family);
        self
    }

    /// Builder-style weight assignment
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Minimum weight in force: the local override, else `set_default`
    pub fn effective_min_weight(&self, set_default: f64) -> f64 {
        self.min_weight.unwrap_or(set_default)
    }

    /// Noise amplitude in force: the local override, else `global`
    pub fn effective_noise(&self, global: f64) -> f64 {
        self.noise.unwrap_or(global)
    }

    /// Weight rounded to three decimals for reports
    pub fn rounded_weight(&self) -> f64 {
        (self.weight * 1000.0).round() / 1000.0
    }

    pub fn is_markedness(&self) -> bool {
        self.family == Some(ConstraintFamily::Markedness)
    }

    pub fn is_faithfulness(&self) -> bool {
        self.family.map(|f| f.is_faithfulness()).unwrap_or(false)
    }
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
