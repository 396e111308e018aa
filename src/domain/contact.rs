use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountKey, Cents};

pub type TenantId = i64;
pub type ContactId = i64;

/// Discriminator stored on every contact row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    Customer,
    Vendor,
}

impl ContactType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactType::Customer => "customer",
            ContactType::Vendor => "vendor",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "customer" => Some(ContactType::Customer),
            "vendor" => Some(ContactType::Vendor),
            _ => None,
        }
    }

    /// Behavior table for this discriminator.
    pub fn profile(&self) -> &'static ContactProfile {
        match self {
            ContactType::Customer => &CUSTOMER_PROFILE,
            ContactType::Vendor => &VENDOR_PROFILE,
        }
    }
}

impl std::fmt::Display for ContactType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One contact id or a batch of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactIds {
    One(ContactId),
    Many(Vec<ContactId>),
}

impl ContactIds {
    /// Normalize into a list, dropping duplicates while keeping first-seen order.
    pub fn into_vec(self) -> Vec<ContactId> {
        match self {
            ContactIds::One(id) => vec![id],
            ContactIds::Many(ids) => {
                let mut unique = Vec::with_capacity(ids.len());
                for id in ids {
                    if !unique.contains(&id) {
                        unique.push(id);
                    }
                }
                unique
            }
        }
    }
}

impl From<ContactId> for ContactIds {
    fn from(id: ContactId) -> Self {
        ContactIds::One(id)
    }
}

impl From<Vec<ContactId>> for ContactIds {
    fn from(ids: Vec<ContactId>) -> Self {
        ContactIds::Many(ids)
    }
}

impl From<&[ContactId]> for ContactIds {
    fn from(ids: &[ContactId]) -> Self {
        ContactIds::Many(ids.to_vec())
    }
}

/// Formatted attributes a transformer may attach to a contact view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAttribute {
    FormattedBalance,
    FormattedOpeningBalance,
    FormattedOpeningBalanceAt,
}

/// Records that must not exist for a contact to be deletable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteGuard {
    SalesInvoices,
}

/// Side of the contact's control account an opening balance lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpeningBalanceSide {
    Debit,
    Credit,
}

/// Per-discriminator configuration: what a contact of this type looks like to
/// the outside and which rules apply to it.
#[derive(Debug)]
pub struct ContactProfile {
    pub contact_type: ContactType,
    pub view_attributes: &'static [ViewAttribute],
    pub delete_guards: &'static [DeleteGuard],
    pub control_account: AccountKey,
    pub opening_balance_side: OpeningBalanceSide,
    /// `reference_type` written on opening balance journal entries.
    pub opening_balance_reference: &'static str,
}

impl ContactProfile {
    pub fn includes(&self, attribute: ViewAttribute) -> bool {
        self.view_attributes.contains(&attribute)
    }

    pub fn guarded_by(&self, guard: DeleteGuard) -> bool {
        self.delete_guards.contains(&guard)
    }
}

const BALANCE_ATTRIBUTES: &[ViewAttribute] = &[
    ViewAttribute::FormattedBalance,
    ViewAttribute::FormattedOpeningBalance,
    ViewAttribute::FormattedOpeningBalanceAt,
];

pub static CUSTOMER_PROFILE: ContactProfile = ContactProfile {
    contact_type: ContactType::Customer,
    view_attributes: BALANCE_ATTRIBUTES,
    delete_guards: &[DeleteGuard::SalesInvoices],
    control_account: AccountKey::AccountsReceivable,
    opening_balance_side: OpeningBalanceSide::Debit,
    opening_balance_reference: "CustomerOpeningBalance",
};

pub static VENDOR_PROFILE: ContactProfile = ContactProfile {
    contact_type: ContactType::Vendor,
    view_attributes: BALANCE_ATTRIBUTES,
    delete_guards: &[],
    control_account: AccountKey::AccountsPayable,
    opening_balance_side: OpeningBalanceSide::Credit,
    opening_balance_reference: "VendorOpeningBalance",
};

/// A customer or vendor as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub tenant_id: TenantId,
    pub contact_type: ContactType,
    pub display_name: String,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub billing_address: Option<String>,
    pub currency_code: Option<String>,
    pub note: Option<String>,
    pub active: bool,
    pub balance: Cents,
    pub opening_balance: Cents,
    pub opening_balance_at: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    pub fn is_customer(&self) -> bool {
        self.contact_type == ContactType::Customer
    }

    pub fn profile(&self) -> &'static ContactProfile {
        self.contact_type.profile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_type_roundtrip() {
        for ct in [ContactType::Customer, ContactType::Vendor] {
            assert_eq!(ContactType::from_str(ct.as_str()), Some(ct));
        }
        assert_eq!(ContactType::from_str("CUSTOMER"), Some(ContactType::Customer));
        assert_eq!(ContactType::from_str("employee"), None);
    }

    #[test]
    fn test_contact_ids_normalize() {
        assert_eq!(ContactIds::from(7_i64).into_vec(), vec![7]);
        assert_eq!(ContactIds::from(vec![3, 1, 3, 2, 1]).into_vec(), vec![3, 1, 2]);
        assert!(ContactIds::from(Vec::new()).into_vec().is_empty());
    }

    #[test]
    fn test_only_customers_are_guarded_by_invoices() {
        assert!(ContactType::Customer.profile().guarded_by(DeleteGuard::SalesInvoices));
        assert!(!ContactType::Vendor.profile().guarded_by(DeleteGuard::SalesInvoices));
    }

    #[test]
    fn test_profiles_point_at_control_accounts() {
        let customer = ContactType::Customer.profile();
        assert_eq!(customer.control_account, AccountKey::AccountsReceivable);
        assert_eq!(customer.opening_balance_side, OpeningBalanceSide::Debit);

        let vendor = ContactType::Vendor.profile();
        assert_eq!(vendor.control_account, AccountKey::AccountsPayable);
        assert_eq!(vendor.opening_balance_side, OpeningBalanceSide::Credit);
        assert!(vendor.includes(ViewAttribute::FormattedBalance));
    }
}
