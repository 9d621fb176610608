use serde::Serialize;

use super::types::CommitteeType;

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum RoundingRule {
    NearestInteger,
    NearestMultiple { step: f64 },
}

impl RoundingRule {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            RoundingRule::NearestInteger => round_half_up(value),
            RoundingRule::NearestMultiple { step } => round_half_up(value / step) * step,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitteePolicy {
    pub committee_type: CommitteeType,
    pub label: &'static str,
    pub rounding: RoundingRule,
    pub allows_regulation_addition: bool,
}

static COMMITTEE_POLICIES: [CommitteePolicy; 5] = [
    CommitteePolicy {
        committee_type: CommitteeType::WorkInjury,
        label: "נפגעי עבודה",
        rounding: RoundingRule::NearestMultiple { step: 5.0 },
        allows_regulation_addition: true,
    },
    CommitteePolicy {
        committee_type: CommitteeType::IncomeTax,
        label: "מס הכנסה",
        rounding: RoundingRule::NearestInteger,
        allows_regulation_addition: false,
    },
    CommitteePolicy {
        committee_type: CommitteeType::GeneralDisability,
        label: "נכות כללית",
        rounding: RoundingRule::NearestInteger,
        allows_regulation_addition: false,
    },
    CommitteePolicy {
        committee_type: CommitteeType::SpecialServices,
        label: "שירותים מיוחדים",
        rounding: RoundingRule::NearestInteger,
        allows_regulation_addition: false,
    },
    CommitteePolicy {
        committee_type: CommitteeType::HostilityVictims,
        label: "נפגעי איבה",
        rounding: RoundingRule::NearestInteger,
        allows_regulation_addition: false,
    },
];

pub fn committee_policies() -> &'static [CommitteePolicy] {
    &COMMITTEE_POLICIES
}

impl CommitteeType {
    pub fn policy(self) -> &'static CommitteePolicy {
        // The table holds exactly one row per variant, in declaration order.
        &COMMITTEE_POLICIES[self as usize]
    }
}

/// Rounds halves towards positive infinity, so 2.5 -> 3 and -2.5 -> -2.
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}

pub fn round_to_cents(value: f64) -> f64 {
    round_half_up(value * 100.0) / 100.0
}
