//! Plan privileges
//!
//! A subscription plan carries a JSON object of named capabilities and limits.
//! It is parsed once into [`PlanPrivileges`] when the plan row is loaded so the
//! rest of the system never touches the raw map.

use invoicely_shared::{FieldErrors, Limit};
use serde::{Deserialize, Serialize};

use crate::error::BillingResult;

/// Longest trial a plan may offer
pub const MAX_TRIAL_DAYS: i64 = 365;

/// Level of reporting a plan unlocks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportsAccess {
    #[default]
    None,
    Basic,
    Advanced,
}

/// Typed view of a plan's `privileges` column
///
/// Missing keys take their defaults and unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanPrivileges {
    /// Cap on clients, shared with credits handed to sub-accounts
    pub max_clients: Option<i64>,
    pub max_charges_per_month: Option<i64>,
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub whatsapp_notifications: bool,
    pub reports_access: ReportsAccess,
    pub api_access: bool,
    pub dedicated_support: bool,
    pub custom_branding: bool,
    pub has_trial: bool,
    pub trial_days: Option<i64>,
}

impl PlanPrivileges {
    /// Parse a stored privileges object
    pub fn from_json(value: serde_json::Value) -> BillingResult<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Interpretation of `max_clients` (NULL and -1 are unlimited)
    pub fn client_limit(&self) -> Limit {
        Limit::from_raw(self.max_clients)
    }

    pub fn monthly_charge_limit(&self) -> Limit {
        Limit::from_raw(self.max_charges_per_month)
    }

    /// Check administrator-supplied values, reporting every violation
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        check_optional_positive(&mut errors, "max_clients", self.max_clients);
        check_optional_positive(
            &mut errors,
            "max_charges_per_month",
            self.max_charges_per_month,
        );

        if self.has_trial {
            match self.trial_days {
                None => {
                    errors.insert(
                        "trial_days".to_string(),
                        "trial_days is required when has_trial is enabled".to_string(),
                    );
                }
                Some(days) if !(1..=MAX_TRIAL_DAYS).contains(&days) => {
                    errors.insert(
                        "trial_days".to_string(),
                        format!("trial_days must be between 1 and {}", MAX_TRIAL_DAYS),
                    );
                }
                Some(_) => {}
            }
        }

        errors
    }

    /// Copy with fields that have no effect cleared
    pub fn normalized(&self) -> Self {
        let mut normalized = self.clone();
        if !normalized.has_trial {
            normalized.trial_days = None;
        }
        normalized
    }
}

fn check_optional_positive(errors: &mut FieldErrors, field: &str, value: Option<i64>) {
    if let Some(v) = value {
        if v < 1 {
            errors.insert(
                field.to_string(),
                format!("{} must be a positive integer or null", field),
            );
        }
    }
}
