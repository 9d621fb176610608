use super::policy::round_to_cents;
use super::types::{
    CalculationResult, CalculationTrace, CommitteeType, DisabilityEntry, RegulationAddition,
    WeightedStep,
};

const FULL_CAPACITY: f64 = 100.0;
const MAX_DISABILITY: f64 = 100.0;

/// Combines disability entries under the diminishing-capacity convention.
///
/// Entries are applied largest net disability first. Equal net values keep the
/// caller's order, which never changes the result since only the net value
/// feeds the arithmetic.
pub fn calculate(
    entries: &[DisabilityEntry],
    committee_type: CommitteeType,
    regulation_addition: RegulationAddition,
) -> CalculationResult {
    calculate_with_trace(entries, committee_type, regulation_addition).result
}

pub fn calculate_with_trace(
    entries: &[DisabilityEntry],
    committee_type: CommitteeType,
    regulation_addition: RegulationAddition,
) -> CalculationTrace {
    let policy = committee_type.policy();
    let applied_addition = if policy.allows_regulation_addition {
        regulation_addition
    } else {
        RegulationAddition::None
    };

    if entries.is_empty() {
        return CalculationTrace {
            result: CalculationResult::ZERO,
            committee_type,
            applied_addition,
            weighted_total: 0.0,
            adjusted_total: 0.0,
            steps: Vec::new(),
        };
    }

    let (weighted_total, steps) = combine_weighted(entries);
    let adjusted_total = apply_regulation_addition(weighted_total, applied_addition);
    let rounded = policy.rounding.apply(adjusted_total);

    CalculationTrace {
        result: CalculationResult {
            intermediate: round_to_cents(weighted_total),
            final_disability: rounded.min(MAX_DISABILITY),
        },
        committee_type,
        applied_addition,
        weighted_total,
        adjusted_total,
        steps,
    }
}

fn combine_weighted(entries: &[DisabilityEntry]) -> (f64, Vec<WeightedStep>) {
    let mut ordered: Vec<(&DisabilityEntry, f64)> = entries
        .iter()
        .map(|entry| (entry, entry.actual_disability()))
        .collect();
    // Stable: ties stay in input order.
    ordered.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut total = 0.0;
    let mut remaining_capacity = FULL_CAPACITY;
    let mut steps = Vec::with_capacity(ordered.len());

    for (entry, actual) in ordered {
        let weighted_addition = if actual > 0.0 {
            actual * remaining_capacity / 100.0
        } else {
            0.0
        };
        total += weighted_addition;
        remaining_capacity -= weighted_addition;
        steps.push(WeightedStep {
            entry_id: entry.id,
            actual_disability: actual,
            weighted_addition,
            remaining_capacity,
        });
    }

    (total, steps)
}

fn apply_regulation_addition(total: f64, addition: RegulationAddition) -> f64 {
    match addition {
        RegulationAddition::None => total,
        other => total + total * other.multiplier(),
    }
}
