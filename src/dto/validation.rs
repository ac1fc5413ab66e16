//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::config::{MAX_CARD_COUNT, is_valid_card_count};

/// Validates that a requested card count is even and within `2..=MAX_CARD_COUNT`.
///
/// # Examples
///
/// ```ignore
/// validate_card_count(12) // Ok
/// validate_card_count(7)  // Err - odd
/// validate_card_count(0)  // Err - too small
/// ```
pub fn validate_card_count(card_count: usize) -> Result<(), ValidationError> {
    if is_valid_card_count(card_count) {
        return Ok(());
    }

    let mut err = ValidationError::new("card_count");
    err.message = Some(
        format!("card count must be an even number between 2 and {MAX_CARD_COUNT} (got {card_count})")
            .into(),
    );
    Err(err)
}
