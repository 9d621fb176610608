use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier handed out by an entry store when an entry is added.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitteeType {
    #[serde(alias = "workInjury", alias = "work_injury")]
    WorkInjury,
    #[serde(alias = "incomeTax", alias = "income_tax")]
    IncomeTax,
    #[serde(alias = "generalDisability", alias = "general_disability")]
    GeneralDisability,
    #[serde(alias = "specialServices", alias = "special_services")]
    SpecialServices,
    #[serde(alias = "hostilityVictims", alias = "hostility_victims")]
    HostilityVictims,
}

impl CommitteeType {
    pub const ALL: [CommitteeType; 5] = [
        CommitteeType::WorkInjury,
        CommitteeType::IncomeTax,
        CommitteeType::GeneralDisability,
        CommitteeType::SpecialServices,
        CommitteeType::HostilityVictims,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CommitteeType::WorkInjury => "work-injury",
            CommitteeType::IncomeTax => "income-tax",
            CommitteeType::GeneralDisability => "general-disability",
            CommitteeType::SpecialServices => "special-services",
            CommitteeType::HostilityVictims => "hostility-victims",
        }
    }
}

impl fmt::Display for CommitteeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Regulation 15 uplift. Only work-injury committees apply it.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum RegulationAddition {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "1/4", alias = "quarter")]
    Quarter,
    #[serde(rename = "1/3", alias = "third")]
    Third,
    #[serde(rename = "1/2", alias = "half")]
    Half,
}

impl RegulationAddition {
    /// Fraction of the weighted total added on top of it.
    pub fn multiplier(self) -> f64 {
        match self {
            RegulationAddition::None => 0.0,
            RegulationAddition::Quarter => 0.25,
            RegulationAddition::Third => 0.33333,
            RegulationAddition::Half => 0.5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RegulationAddition::None => "none",
            RegulationAddition::Quarter => "1/4",
            RegulationAddition::Third => "1/3",
            RegulationAddition::Half => "1/2",
        }
    }
}

impl fmt::Display for RegulationAddition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisabilityEntry {
    pub id: EntryId,
    pub percentage: f64,
    pub prior_condition: f64,
}

impl DisabilityEntry {
    pub fn new(id: EntryId, percentage: f64, prior_condition: f64) -> Self {
        Self {
            id,
            percentage,
            prior_condition,
        }
    }

    /// Net disability after subtracting the pre-existing condition. May be <= 0.
    pub fn actual_disability(&self) -> f64 {
        self.percentage - self.prior_condition
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub intermediate: f64,
    #[serde(rename = "final")]
    pub final_disability: f64,
}

impl CalculationResult {
    pub const ZERO: CalculationResult = CalculationResult {
        intermediate: 0.0,
        final_disability: 0.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedStep {
    pub entry_id: EntryId,
    pub actual_disability: f64,
    pub weighted_addition: f64,
    pub remaining_capacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationTrace {
    pub result: CalculationResult,
    pub committee_type: CommitteeType,
    /// The addition actually applied; `None` when the committee ignores it.
    pub applied_addition: RegulationAddition,
    pub weighted_total: f64,
    pub adjusted_total: f64,
    pub steps: Vec<WeightedStep>,
}
