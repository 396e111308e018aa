use chrono::NaiveDate;

use crate::domain::{
    AccountKey, Cents, ContactId, ContactType, Journal, JournalEntry, OpeningBalanceSide,
    contact_balance_changes,
};
use crate::storage::TenantRepository;

use super::AppError;

/// Collects journal entries for one tenant and persists them.
pub struct JournalPoster {
    repo: TenantRepository,
    journal: Journal,
}

impl JournalPoster {
    pub fn new(repo: TenantRepository) -> Self {
        Self {
            repo,
            journal: Journal::new(),
        }
    }

    pub fn entries(&self) -> &[JournalEntry] {
        self.journal.entries()
    }

    fn post(&mut self, entry: JournalEntry) -> Result<(), AppError> {
        Ok(self.journal.push(entry)?)
    }

    /// Persist account and contact running balances.
    pub async fn save_balance(&self) -> Result<(), AppError> {
        self.journal.ensure_balanced()?;
        let accounts = self.journal.balance_changes();
        let contacts = contact_balance_changes(self.journal.entries());
        self.repo.apply_balance_changes(&accounts, &contacts).await?;
        Ok(())
    }

    /// Persist the entries themselves.
    pub async fn save_entries(&self) -> Result<(), AppError> {
        self.journal.ensure_balanced()?;
        self.repo.save_journal_entries(self.journal.entries()).await?;
        Ok(())
    }
}

/// Builds the postings for business events on top of a poster.
pub struct JournalCommands<'a> {
    poster: &'a mut JournalPoster,
}

impl<'a> JournalCommands<'a> {
    pub fn new(poster: &'a mut JournalPoster) -> Self {
        Self { poster }
    }

    /// Debit accounts receivable for the customer against opening balance equity.
    pub fn customer_opening_balance(
        &mut self,
        customer_id: ContactId,
        amount: Cents,
        date: NaiveDate,
    ) -> Result<(), AppError> {
        self.contact_opening_balance(ContactType::Customer, customer_id, amount, date)
    }

    /// Credit accounts payable for the vendor against opening balance equity.
    pub fn vendor_opening_balance(
        &mut self,
        vendor_id: ContactId,
        amount: Cents,
        date: NaiveDate,
    ) -> Result<(), AppError> {
        self.contact_opening_balance(ContactType::Vendor, vendor_id, amount, date)
    }

    fn contact_opening_balance(
        &mut self,
        contact_type: ContactType,
        contact_id: ContactId,
        amount: Cents,
        date: NaiveDate,
    ) -> Result<(), AppError> {
        if amount <= 0 {
            return Err(AppError::InvalidAmount(format!(
                "opening balance must be positive, got {}",
                amount
            )));
        }

        let profile = contact_type.profile();
        let reference = profile.opening_balance_reference;
        let (control, equity) = match profile.opening_balance_side {
            OpeningBalanceSide::Debit => (
                JournalEntry::debit(reference, contact_id, profile.control_account, amount, date),
                JournalEntry::credit(reference, contact_id, AccountKey::OpeningBalanceEquity, amount, date),
            ),
            OpeningBalanceSide::Credit => (
                JournalEntry::credit(reference, contact_id, profile.control_account, amount, date),
                JournalEntry::debit(reference, contact_id, AccountKey::OpeningBalanceEquity, amount, date),
            ),
        };

        self.poster.post(control.with_contact(contact_id, contact_type))?;
        self.poster.post(equity)?;
        self.poster.journal.ensure_balanced()?;
        Ok(())
    }
}
