use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Cents, Contact, ContactType};

/// Customer payload accepted by create and edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub customer_type: Option<ContactType>,
    pub display_name: String,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub billing_address: Option<String>,
    pub currency_code: Option<String>,
    pub note: Option<String>,
    pub active: Option<bool>,
    pub opening_balance: Option<Cents>,
    pub opening_balance_at: Option<NaiveDate>,
}

impl CustomerDto {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Default::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_opening_balance(mut self, amount: Cents, at: NaiveDate) -> Self {
        self.opening_balance = Some(amount);
        self.opening_balance_at = Some(at);
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }
}

/// Generic contact payload consumed by the contacts service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDto {
    pub contact_type: Option<ContactType>,
    pub display_name: String,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub billing_address: Option<String>,
    pub currency_code: Option<String>,
    pub note: Option<String>,
    pub active: bool,
    pub opening_balance: Option<Cents>,
    pub opening_balance_at: Option<NaiveDate>,
}

/// Map a customer payload onto the generic contact payload.
///
/// | customer field       | contact field        |
/// |----------------------|----------------------|
/// | `customer_type`      | `contact_type`       |
/// | `active` (missing)   | `active = true`      |
/// | everything else      | copied unchanged     |
pub fn customer_to_contact_dto(dto: CustomerDto) -> ContactDto {
    ContactDto {
        contact_type: dto.customer_type,
        display_name: dto.display_name,
        company_name: dto.company_name,
        email: dto.email,
        phone: dto.phone,
        billing_address: dto.billing_address,
        currency_code: dto.currency_code,
        note: dto.note,
        active: dto.active.unwrap_or(true),
        opening_balance: dto.opening_balance,
        opening_balance_at: dto.opening_balance_at,
    }
}

/// Payload that reproduces `contact` as stored, leaving its opening balance alone.
pub fn contact_to_customer_dto(contact: Contact) -> CustomerDto {
    CustomerDto {
        customer_type: None,
        display_name: contact.display_name,
        company_name: contact.company_name,
        email: contact.email,
        phone: contact.phone,
        billing_address: contact.billing_address,
        currency_code: contact.currency_code,
        note: contact.note,
        active: Some(contact.active),
        opening_balance: None,
        opening_balance_at: None,
    }
}
