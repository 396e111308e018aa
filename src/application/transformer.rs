use serde::Serialize;

use crate::domain::{Contact, ViewAttribute, format_money};

const OPENING_BALANCE_AT_FORMAT: &str = "%Y %b %d";

/// Contact with the formatted attributes its profile asks for.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactView {
    #[serde(flatten)]
    pub contact: Contact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_balance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_opening_balance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_opening_balance_at: Option<String>,
}

/// Attaches display attributes to contacts according to their profile.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactTransformer;

impl ContactTransformer {
    pub fn transform(&self, contact: Contact) -> ContactView {
        let profile = contact.profile();
        let currency = contact.currency_code.as_deref();

        let formatted_balance = profile
            .includes(ViewAttribute::FormattedBalance)
            .then(|| format_money(contact.balance, currency));
        let formatted_opening_balance = profile
            .includes(ViewAttribute::FormattedOpeningBalance)
            .then(|| format_money(contact.opening_balance, currency));
        let formatted_opening_balance_at = if profile.includes(ViewAttribute::FormattedOpeningBalanceAt) {
            contact
                .opening_balance_at
                .map(|at| at.format(OPENING_BALANCE_AT_FORMAT).to_string())
        } else {
            None
        };

        ContactView {
            contact,
            formatted_balance,
            formatted_opening_balance,
            formatted_opening_balance_at,
        }
    }

    pub fn transform_all(&self, contacts: Vec<Contact>) -> Vec<ContactView> {
        contacts.into_iter().map(|c| self.transform(c)).collect()
    }
}
