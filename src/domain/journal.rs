use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{Cents, ContactId, ContactType, OpeningBalanceSide};

pub type JournalEntryId = Uuid;

/// Ledger accounts the contact workflows post to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccountKey {
    AccountsReceivable,
    AccountsPayable,
    OpeningBalanceEquity,
}

impl AccountKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKey::AccountsReceivable => "accounts-receivable",
            AccountKey::AccountsPayable => "accounts-payable",
            AccountKey::OpeningBalanceEquity => "opening-balance-equity",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "accounts-receivable" => Some(AccountKey::AccountsReceivable),
            "accounts-payable" => Some(AccountKey::AccountsPayable),
            "opening-balance-equity" => Some(AccountKey::OpeningBalanceEquity),
            _ => None,
        }
    }
}

impl std::fmt::Display for AccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One side of a double-entry posting. Exactly one of `debit`/`credit` is non-zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: JournalEntryId,
    pub reference_type: String,
    pub reference_id: i64,
    pub account: AccountKey,
    pub contact_id: Option<ContactId>,
    pub contact_type: Option<ContactType>,
    pub debit: Cents,
    pub credit: Cents,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl JournalEntry {
    fn new(
        reference_type: &str,
        reference_id: i64,
        account: AccountKey,
        debit: Cents,
        credit: Cents,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            reference_type: reference_type.to_string(),
            reference_id,
            account,
            contact_id: None,
            contact_type: None,
            debit,
            credit,
            date,
            created_at: Utc::now(),
        }
    }

    pub fn debit(
        reference_type: &str,
        reference_id: i64,
        account: AccountKey,
        amount: Cents,
        date: NaiveDate,
    ) -> Self {
        Self::new(reference_type, reference_id, account, amount, 0, date)
    }

    pub fn credit(
        reference_type: &str,
        reference_id: i64,
        account: AccountKey,
        amount: Cents,
        date: NaiveDate,
    ) -> Self {
        Self::new(reference_type, reference_id, account, 0, amount, date)
    }

    pub fn with_contact(mut self, contact_id: ContactId, contact_type: ContactType) -> Self {
        self.contact_id = Some(contact_id);
        self.contact_type = Some(contact_type);
        self
    }

    /// Signed effect on the account balance (debit-positive).
    pub fn net(&self) -> Cents {
        self.debit - self.credit
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JournalError {
    #[error("journal amount must be positive, got {0}")]
    NonPositiveAmount(Cents),

    #[error("journal is not balanced: debit {debit}, credit {credit}")]
    Unbalanced { debit: Cents, credit: Cents },
}

/// In-memory set of entries waiting to be persisted.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: JournalEntry) -> Result<(), JournalError> {
        let amount = entry.debit.max(entry.credit);
        if amount <= 0 || (entry.debit != 0 && entry.credit != 0) {
            return Err(JournalError::NonPositiveAmount(entry.net()));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of debits and credits.
    pub fn totals(&self) -> (Cents, Cents) {
        self.entries
            .iter()
            .fold((0, 0), |(d, c), e| (d + e.debit, c + e.credit))
    }

    pub fn ensure_balanced(&self) -> Result<(), JournalError> {
        let (debit, credit) = self.totals();
        if debit != credit {
            return Err(JournalError::Unbalanced { debit, credit });
        }
        Ok(())
    }

    /// Per-account balance deltas produced by this journal.
    pub fn balance_changes(&self) -> BTreeMap<AccountKey, Cents> {
        balance_changes(&self.entries)
    }
}

/// Net effect of a set of entries on each account they touch.
pub fn balance_changes(entries: &[JournalEntry]) -> BTreeMap<AccountKey, Cents> {
    let mut changes = BTreeMap::new();
    for entry in entries {
        *changes.entry(entry.account).or_insert(0) += entry.net();
    }
    changes
}

/// Deltas that undo `entries` once they are removed.
pub fn reverted_balance_changes(entries: &[JournalEntry]) -> BTreeMap<AccountKey, Cents> {
    balance_changes(entries)
        .into_iter()
        .map(|(account, delta)| (account, -delta))
        .collect()
}

/// Net effect of `entries` on the balance of each contact they are tagged with.
///
/// Only entries on the contact's control account count. Customers carry a
/// debit-positive balance, vendors a credit-positive one.
pub fn contact_balance_changes(entries: &[JournalEntry]) -> BTreeMap<ContactId, Cents> {
    let mut changes = BTreeMap::new();
    for entry in entries {
        let (Some(contact_id), Some(contact_type)) = (entry.contact_id, entry.contact_type) else {
            continue;
        };
        let profile = contact_type.profile();
        if entry.account != profile.control_account {
            continue;
        }
        let delta = match profile.opening_balance_side {
            OpeningBalanceSide::Debit => entry.net(),
            OpeningBalanceSide::Credit => -entry.net(),
        };
        *changes.entry(contact_id).or_insert(0) += delta;
    }
    changes
}
