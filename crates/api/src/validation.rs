//! Request validation
//!
//! Request bodies deserialize into loose structs (every field optional) so
//! that missing fields are reported alongside malformed ones.

use invoicely_billing::NewClient;
use invoicely_shared::FieldErrors;
use serde::Deserialize;

const MAX_NAME_LEN: usize = 255;
const MAX_EMAIL_LEN: usize = 255;
const MAX_PHONE_LEN: usize = 32;
const MAX_NOTES_LEN: usize = 2000;

#[derive(Debug, Default, Deserialize)]
pub struct CreateClientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

impl CreateClientRequest {
    /// Trim, check and convert into a [`NewClient`]
    pub fn validate(self) -> Result<NewClient, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = trimmed(self.name);
        match &name {
            None => required(&mut errors, "name"),
            Some(n) if n.chars().count() > MAX_NAME_LEN => too_long(&mut errors, "name", MAX_NAME_LEN),
            Some(_) => {}
        }

        let email = trimmed(self.email).map(|e| e.to_lowercase());
        match &email {
            None => required(&mut errors, "email"),
            Some(e) if e.len() > MAX_EMAIL_LEN => too_long(&mut errors, "email", MAX_EMAIL_LEN),
            Some(e) if !is_valid_email(e) => {
                errors.insert(
                    "email".to_string(),
                    "email must be a valid email address".to_string(),
                );
            }
            Some(_) => {}
        }

        let company = trimmed(self.company);
        if company
            .as_ref()
            .is_some_and(|c| c.chars().count() > MAX_NAME_LEN)
        {
            too_long(&mut errors, "company", MAX_NAME_LEN);
        }

        let phone = trimmed(self.phone);
        if let Some(p) = &phone {
            if p.len() > MAX_PHONE_LEN {
                too_long(&mut errors, "phone", MAX_PHONE_LEN);
            } else if !is_valid_phone(p) {
                errors.insert(
                    "phone".to_string(),
                    "phone may only contain digits, spaces and + - ( )".to_string(),
                );
            }
        }

        let notes = trimmed(self.notes);
        if notes
            .as_ref()
            .is_some_and(|n| n.chars().count() > MAX_NOTES_LEN)
        {
            too_long(&mut errors, "notes", MAX_NOTES_LEN);
        }

        match (name, email) {
            (Some(name), Some(email)) if errors.is_empty() => Ok(NewClient {
                name,
                email,
                company,
                phone,
                notes,
            }),
            _ => Err(errors),
        }
    }
}

/// Blank strings count as absent
fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(errors: &mut FieldErrors, field: &str) {
    errors.insert(field.to_string(), format!("{} is required", field));
}

fn too_long(errors: &mut FieldErrors, field: &str, max: usize) {
    errors.insert(
        field.to_string(),
        format!("{} may not be longer than {} characters", field, max),
    );
}

/// One `@`, non-empty local part, dotted domain, no whitespace
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

fn is_valid_phone(phone: &str) -> bool {
    phone.chars().any(|c| c.is_ascii_digit())
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'))
}
