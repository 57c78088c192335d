//! Common types used across Invoicely

use std::collections::BTreeMap;

/// Validation failures keyed by field name
pub type FieldErrors = BTreeMap<String, String>;

// =============================================================================
// Limits
// =============================================================================

/// Stored value that means "no cap" alongside NULL
pub const UNLIMITED_SENTINEL: i64 = -1;

/// Interpreted form of a nullable cap column or privilege
///
/// Both NULL and `-1` read as [`Limit::Unlimited`]. Every other value,
/// including other negatives, is a real cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Unlimited,
    Capped(i64),
}

impl Limit {
    /// Interpret a raw nullable value
    pub fn from_raw(raw: Option<i64>) -> Self {
        match raw {
            None | Some(UNLIMITED_SENTINEL) => Self::Unlimited,
            Some(cap) => Self::Capped(cap),
        }
    }

    /// The cap, if any
    pub fn cap(&self) -> Option<i64> {
        match self {
            Self::Unlimited => None,
            Self::Capped(cap) => Some(*cap),
        }
    }
}

// =============================================================================
// Pagination
// =============================================================================

/// Page/size pair with defaults and bounds applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub const DEFAULT_PER_PAGE: i64 = 25;
    pub const MAX_PER_PAGE: i64 = 100;

    /// Normalize optional query values (page >= 1, 1 <= per_page <= 100)
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(Self::DEFAULT_PER_PAGE)
                .clamp(1, Self::MAX_PER_PAGE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_and_sentinel_are_unlimited() {
        assert_eq!(Limit::from_raw(None), Limit::Unlimited);
        assert_eq!(Limit::from_raw(Some(-1)), Limit::Unlimited);
    }

    #[test]
    fn test_other_negatives_are_real_caps() {
        assert_eq!(Limit::from_raw(Some(-2)), Limit::Capped(-2));
        assert_eq!(Limit::from_raw(Some(0)), Limit::Capped(0));
        assert_eq!(Limit::Capped(-2).cap(), Some(-2));
    }

    #[test]
    fn test_pagination_defaults_and_bounds() {
        let p = Pagination::default();
        assert_eq!((p.page, p.per_page, p.offset()), (1, 25, 0));

        let p = Pagination::new(Some(0), Some(1000));
        assert_eq!((p.page, p.per_page), (1, 100));

        let p = Pagination::new(Some(3), Some(10));
        assert_eq!(p.offset(), 20);
    }
}
