//! Pre-flight input checks.
//!
//! These run before any network call; a failure here means the backend was
//! never contacted.

use chrono::{DateTime, Months, Utc};

use crate::error::ValidationError;

/// Longest a sharing link may remain valid from the moment it is issued or
/// rescheduled.
pub const MAX_SHARING_MONTHS: u32 = 12;

/// A sharing expiry must be strictly in the future and at most one year out.
pub fn validate_sharing_expiry(
    expiry: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if expiry <= now {
        return Err(ValidationError::ExpiryNotInFuture { expiry });
    }
    let horizon = now
        .checked_add_months(Months::new(MAX_SHARING_MONTHS))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    if expiry > horizon {
        return Err(ValidationError::ExpiryTooFar { expiry, horizon });
    }
    Ok(())
}

pub fn validate_original_filename(filename: &str) -> Result<(), ValidationError> {
    if filename.trim().is_empty() {
        return Err(ValidationError::EmptyFilename);
    }
    Ok(())
}
