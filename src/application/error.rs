use thiserror::Error;

use crate::domain::{Cents, ContactId, ContactType, JournalError};

/// Why a delete was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependentsCode {
    CustomerHasInvoices,
    SomeCustomersHaveInvoices,
}

impl DependentsCode {
    /// Code surfaced to API clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            DependentsCode::CustomerHasInvoices => "customer_has_invoices",
            DependentsCode::SomeCustomersHaveInvoices => "some_customers_have_invoices",
        }
    }
}

impl std::fmt::Display for DependentsCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{contact_type} not found: {ids:?}")]
    NotFound {
        contact_type: ContactType,
        ids: Vec<ContactId>,
    },

    #[error("{code} (contacts {ids:?})")]
    HasDependents {
        code: DependentsCode,
        ids: Vec<ContactId>,
    },

    #[error("Contact type mismatch: expected {expected}, got {found}")]
    ContactTypeMismatch {
        expected: ContactType,
        found: ContactType,
    },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Journal is not balanced: debit {debit}, credit {credit}")]
    UnbalancedJournal { debit: Cents, credit: Cents },

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(contact_type: ContactType, ids: impl Into<Vec<ContactId>>) -> Self {
        AppError::NotFound {
            contact_type,
            ids: ids.into(),
        }
    }

    /// Wire code for the `HasDependents` family, if this is one.
    pub fn dependents_code(&self) -> Option<DependentsCode> {
        match self {
            AppError::HasDependents { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<JournalError> for AppError {
    fn from(err: JournalError) -> Self {
        match err {
            JournalError::NonPositiveAmount(amount) => {
                AppError::InvalidAmount(format!("journal amount must be positive, got {}", amount))
            }
            JournalError::Unbalanced { debit, credit } => AppError::UnbalancedJournal { debit, credit },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependents_codes() {
        assert_eq!(DependentsCode::CustomerHasInvoices.as_str(), "customer_has_invoices");
        assert_eq!(
            DependentsCode::SomeCustomersHaveInvoices.to_string(),
            "some_customers_have_invoices"
        );
    }

    #[test]
    fn test_journal_errors_map_to_app_errors() {
        let err: AppError = JournalError::Unbalanced { debit: 10, credit: 0 }.into();
        assert!(matches!(err, AppError::UnbalancedJournal { debit: 10, credit: 0 }));

        let err: AppError = JournalError::NonPositiveAmount(-5).into();
        assert!(matches!(err, AppError::InvalidAmount(_)));
    }

    #[test]
    fn test_not_found_message() {
        let err = AppError::not_found(ContactType::Customer, vec![4, 9]);
        assert_eq!(err.to_string(), "customer not found: [4, 9]");
        assert_eq!(err.dependents_code(), None);
    }
}
