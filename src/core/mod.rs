mod engine;
mod entries;
mod policy;
mod types;

pub use engine::{calculate, calculate_with_trace};
pub use entries::{EntryDraft, EntryError, parse_entry, validate_entry};
pub use policy::{CommitteePolicy, RoundingRule, committee_policies, round_half_up};
pub use types::{
    CalculationResult, CalculationTrace, CommitteeType, DisabilityEntry, EntryId,
    RegulationAddition, WeightedStep,
};
