/// A validated entry that has not been given an identity yet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryDraft {
    pub percentage: f64,
    pub prior_condition: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EntryError {
    #[error("enter a valid disability percentage (0-100): percentage is required")]
    MissingPercentage,
    #[error("enter a valid disability percentage (0-100): '{0}' is not a number")]
    NotANumber(String),
    #[error("enter a valid disability percentage (0-100): got {0}")]
    OutOfRange(f64),
    #[error("enter a valid prior condition percentage (0-100): got {0}")]
    PriorOutOfRange(f64),
}

/// Validates one entry before it joins the caller's list.
///
/// A missing or non-numeric prior condition counts as 0; otherwise it must lie
/// in [0, 100]. The prior condition is not compared against the percentage; a
/// larger prior simply nets out to a non-positive disability.
pub fn validate_entry(
    percentage: Option<f64>,
    prior_condition: Option<f64>,
) -> Result<EntryDraft, EntryError> {
    let percentage = percentage.ok_or(EntryError::MissingPercentage)?;
    if !percentage.is_finite() {
        return Err(EntryError::NotANumber(percentage.to_string()));
    }
    if !(0.0..=100.0).contains(&percentage) {
        return Err(EntryError::OutOfRange(percentage));
    }

    let prior_condition = prior_condition.filter(|v| v.is_finite()).unwrap_or(0.0);
    if !(0.0..=100.0).contains(&prior_condition) {
        return Err(EntryError::PriorOutOfRange(prior_condition));
    }

    Ok(EntryDraft {
        percentage,
        prior_condition,
    })
}

/// Same as [`validate_entry`] for raw text fields, e.g. form or CLI input.
pub fn parse_entry(percentage: &str, prior_condition: Option<&str>) -> Result<EntryDraft, EntryError> {
    let raw = percentage.trim();
    if raw.is_empty() {
        return Err(EntryError::MissingPercentage);
    }
    let parsed = raw
        .parse::<f64>()
        .map_err(|_| EntryError::NotANumber(raw.to_string()))?;

    let prior = prior_condition.and_then(|v| v.trim().parse::<f64>().ok());
    validate_entry(Some(parsed), prior)
}
