use tracing::{debug, info};

use crate::domain::{Contact, ContactDto, ContactId, ContactType, TenantId};
use crate::domain::{contact_balance_changes, reverted_balance_changes};
use crate::storage::Repository;

use super::AppError;

/// Contact CRUD shared by every discriminator.
#[derive(Clone)]
pub struct ContactsService {
    repo: Repository,
}

impl ContactsService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Create a contact tagged with `contact_type`. A payload naming a
    /// different type is refused.
    pub async fn new_contact(
        &self,
        tenant_id: TenantId,
        dto: ContactDto,
        contact_type: ContactType,
    ) -> Result<Contact, AppError> {
        ensure_contact_type(&dto, contact_type)?;

        let contact = self
            .repo
            .tenant(tenant_id)
            .insert_contact(contact_type, &dto)
            .await?;

        debug!(tenant_id, contact_id = contact.id, %contact_type, "contact inserted");
        Ok(contact)
    }

    /// Edit a contact of `contact_type`.
    pub async fn edit_contact(
        &self,
        tenant_id: TenantId,
        contact_id: ContactId,
        dto: ContactDto,
        contact_type: ContactType,
    ) -> Result<Contact, AppError> {
        ensure_contact_type(&dto, contact_type)?;

        self.repo
            .tenant(tenant_id)
            .update_contact(contact_type, contact_id, &dto)
            .await?
            .ok_or_else(|| AppError::not_found(contact_type, vec![contact_id]))
    }

    /// Get a contact by id or fail with `NotFound`.
    pub async fn get_contact(
        &self,
        tenant_id: TenantId,
        contact_id: ContactId,
        contact_type: ContactType,
    ) -> Result<Contact, AppError> {
        self.repo
            .tenant(tenant_id)
            .find_contact(contact_type, contact_id)
            .await?
            .ok_or_else(|| AppError::not_found(contact_type, vec![contact_id]))
    }

    /// Get every requested contact, or fail with `NotFound` listing the missing ids.
    pub async fn get_contacts(
        &self,
        tenant_id: TenantId,
        contact_ids: &[ContactId],
        contact_type: ContactType,
    ) -> Result<Vec<Contact>, AppError> {
        let contacts = self
            .repo
            .tenant(tenant_id)
            .find_contacts(contact_type, contact_ids)
            .await?;
        ensure_all_found(&contacts, contact_ids, contact_type)?;
        Ok(contacts)
    }

    /// Remove opening balance journal entries of the given contacts and undo
    /// their effect on balances. Returns the number of entries removed.
    pub async fn revert_opening_balance_entries(
        &self,
        tenant_id: TenantId,
        contact_ids: &[ContactId],
        contact_type: ContactType,
    ) -> Result<usize, AppError> {
        let repo = self.repo.tenant(tenant_id);
        let reference = contact_type.profile().opening_balance_reference;
        let entries = repo.journal_entries_for(reference, contact_ids).await?;

        if entries.is_empty() {
            debug!(tenant_id, ?contact_ids, "no opening balance entries to revert");
            return Ok(0);
        }

        let accounts = reverted_balance_changes(&entries);
        let contacts = contact_balance_changes(&entries)
            .into_iter()
            .map(|(id, delta)| (id, -delta))
            .collect();
        repo.remove_journal_entries(&entries, &accounts, &contacts)
            .await?;

        info!(
            tenant_id,
            %contact_type,
            entries = entries.len(),
            "opening balance entries reverted"
        );
        Ok(entries.len())
    }
}

fn ensure_contact_type(dto: &ContactDto, expected: ContactType) -> Result<(), AppError> {
    match dto.contact_type {
        Some(found) if found != expected => Err(AppError::ContactTypeMismatch { expected, found }),
        _ => Ok(()),
    }
}

/// Fail with `NotFound` naming every requested id missing from `found`.
pub(crate) fn ensure_all_found(
    found: &[Contact],
    requested: &[ContactId],
    contact_type: ContactType,
) -> Result<(), AppError> {
    let mut missing: Vec<ContactId> = requested
        .iter()
        .copied()
        .filter(|id| !found.iter().any(|c| c.id == *id))
        .collect();
    missing.dedup();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::not_found(contact_type, missing))
    }
}
