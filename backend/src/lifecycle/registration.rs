//! Startup registration.

use chrono::{DateTime, NaiveDate, Utc};

use super::error::{FieldCheck, LifecycleError, LifecycleResult};
use crate::models::{Stage, Startup, StartupProfile, StartupStatus};

/// Human-readable code for the `sequence`-th registration (zero based).
pub fn magic_code(sequence: u64) -> String {
    format!("MAGIC{:03}", sequence + 1)
}

/// Loose address check: one `@`, a non-empty local part and a dotted domain
/// without empty labels.
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

/// Check the required profile fields, reporting every offending one.
pub fn validate_profile(profile: &StartupProfile) -> LifecycleResult<()> {
    FieldCheck::new()
        .require("companyName", &profile.company_name, "Company name is required")
        .ensure(is_valid_email(&profile.email), "email", "Valid email is required")
        .require("mobile", &profile.mobile, "Mobile number is required")
        .require("founderName", &profile.founder_name, "Founder name is required")
        .require("city", &profile.city, "City is required")
        .require("sector", &profile.sector, "Sector is required")
        .finish()
}

/// Validate a registration and build the new startup.
///
/// `sequence` is the number of registrations the store has ever accepted
/// (deleted startups included), and `email_taken` whether another startup
/// already uses `profile.email`. The returned record has no id yet.
pub fn register(
    mut profile: StartupProfile,
    registered_date: Option<NaiveDate>,
    sequence: u64,
    email_taken: bool,
    now: DateTime<Utc>,
) -> LifecycleResult<Startup> {
    validate_profile(&profile)?;

    if email_taken {
        return Err(LifecycleError::Conflict(format!(
            "Startup with email {} already exists",
            profile.email.trim()
        )));
    }

    profile.email = profile.email.trim().to_string();

    Ok(Startup {
        id: None,
        magic_code: magic_code(sequence),
        profile,
        registered_date: Some(registered_date.unwrap_or_else(|| now.date_naive())),
        stage: Stage::S0,
        status: StartupStatus::Active,
        pitch_history: Vec::new(),
        one_on_one_history: Vec::new(),
        achievements: Vec::new(),
        revenue_history: Vec::new(),
        total_revenue: 0.0,
        onboarded_date: None,
        graduated_date: None,
        rejected_date: None,
        rejected_from_stage: None,
        rejection_remark: None,
        created_at: Some(now),
        updated_at: Some(now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_code_padding() {
        assert_eq!(magic_code(0), "MAGIC001");
        assert_eq!(magic_code(41), "MAGIC042");
        assert_eq!(magic_code(999), "MAGIC1000");
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email(" founder@studio.co.in "));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("a@@x.com"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("a@x..com"));
        assert!(!is_valid_email(""));
    }
}
