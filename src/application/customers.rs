use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use crate::domain::{
    Cents, Contact, ContactId, ContactIds, ContactType, CustomerDto, CustomersFilter, DeleteGuard,
    DomainEvent, FilterMeta, Mutation, OpeningBalance, Pagination, SalesInvoice, TenantId,
    contact_to_customer_dto, customer_to_contact_dto,
};
use crate::storage::{Repository, TenantTransaction};

use super::contacts::ensure_all_found;
use super::{
    AppError, ContactTransformer, ContactView, ContactsService, DependentsCode,
    DynamicListingService, JournalCommands, JournalPoster,
};

/// One page of customers together with how it was produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomersList {
    pub customers: Vec<Contact>,
    pub pagination: Pagination,
    pub filter_meta: FilterMeta,
}

impl CustomersList {
    /// True when the tenant simply has no customers yet, as opposed to a
    /// filter or a later page coming back empty.
    pub fn is_empty_status(&self) -> bool {
        self.customers.is_empty() && self.pagination.page == 1 && !self.filter_meta.is_filtered()
    }
}

/// Customer use cases. All operations are scoped to the tenant passed first.
#[derive(Clone)]
pub struct CustomersService {
    repo: Repository,
    contacts: ContactsService,
    listing: DynamicListingService,
    transformer: ContactTransformer,
}

impl CustomersService {
    pub fn new(repo: Repository, contacts: ContactsService, listing: DynamicListingService) -> Self {
        Self {
            repo,
            contacts,
            listing,
            transformer: ContactTransformer,
        }
    }

    /// Wire the service with its default collaborators over `repo`.
    pub fn from_repository(repo: Repository) -> Self {
        let contacts = ContactsService::new(repo.clone());
        Self::new(repo, contacts, DynamicListingService::contacts())
    }

    // ========================
    // Mutations
    // ========================

    pub async fn new_customer(
        &self,
        tenant_id: TenantId,
        dto: CustomerDto,
    ) -> Result<Mutation<Contact>, AppError> {
        info!(tenant_id, display_name = %dto.display_name, "trying to create a new customer");

        let opening_balance = opening_balance_of(&dto);
        let contact_dto = customer_to_contact_dto(dto);
        let customer = self
            .contacts
            .new_contact(tenant_id, contact_dto, ContactType::Customer)
            .await?;

        info!(tenant_id, customer_id = customer.id, "customer created successfully");
        let event = DomainEvent::CustomerCreated {
            tenant_id,
            customer_id: customer.id,
            opening_balance,
        };
        Ok(Mutation::new(customer, event))
    }

    pub async fn edit_customer(
        &self,
        tenant_id: TenantId,
        customer_id: ContactId,
        dto: CustomerDto,
    ) -> Result<Mutation<Contact>, AppError> {
        info!(tenant_id, customer_id, "trying to edit customer");

        let opening_balance = opening_balance_of(&dto);
        let contact_dto = customer_to_contact_dto(dto);
        let customer = self
            .contacts
            .edit_contact(tenant_id, customer_id, contact_dto, ContactType::Customer)
            .await?;

        info!(tenant_id, customer_id, "customer edited successfully");
        let event = DomainEvent::CustomerEdited {
            tenant_id,
            customer_id,
            opening_balance,
        };
        Ok(Mutation::new(customer, event))
    }

    /// Delete a customer that no sales invoice refers to.
    pub async fn delete_customer(
        &self,
        tenant_id: TenantId,
        customer_id: ContactId,
    ) -> Result<Mutation<()>, AppError> {
        info!(tenant_id, customer_id, "trying to delete customer");

        let mut tx = self.repo.tenant(tenant_id).begin().await?;
        let ids = [customer_id];
        let found = tx.find_contacts(ContactType::Customer, &ids).await?;
        ensure_all_found(&found, &ids, ContactType::Customer)?;
        ensure_no_invoices(&mut tx, &ids, DependentsCode::CustomerHasInvoices).await?;

        tx.delete_contacts(ContactType::Customer, &ids).await?;
        tx.commit().await?;

        info!(tenant_id, customer_id, "customer deleted successfully");
        let event = DomainEvent::CustomerDeleted {
            tenant_id,
            customer_id,
        };
        Ok(Mutation::new((), event))
    }

    /// Delete several customers at once. Either every id is deleted or none is.
    pub async fn delete_bulk_customers(
        &self,
        tenant_id: TenantId,
        customer_ids: impl Into<ContactIds>,
    ) -> Result<Mutation<Vec<ContactId>>, AppError> {
        let ids = customer_ids.into().into_vec();
        info!(tenant_id, customer_ids = ?ids, "trying to delete customers in bulk");

        if !ids.is_empty() {
            let mut tx = self.repo.tenant(tenant_id).begin().await?;
            let found = tx.find_contacts(ContactType::Customer, &ids).await?;
            ensure_all_found(&found, &ids, ContactType::Customer)?;
            ensure_no_invoices(&mut tx, &ids, DependentsCode::SomeCustomersHaveInvoices).await?;

            let deleted = tx.delete_contacts(ContactType::Customer, &ids).await?;
            tx.commit().await?;
            info!(tenant_id, deleted, "customers deleted successfully");
        }

        let event = DomainEvent::CustomersBulkDeleted {
            tenant_id,
            customer_ids: ids.clone(),
        };
        Ok(Mutation::new(ids, event))
    }

    // ========================
    // Queries
    // ========================

    pub async fn get_customer(
        &self,
        tenant_id: TenantId,
        customer_id: ContactId,
    ) -> Result<Contact, AppError> {
        self.contacts
            .get_contact(tenant_id, customer_id, ContactType::Customer)
            .await
    }

    /// Customer with its formatted display attributes.
    pub async fn get_customer_view(
        &self,
        tenant_id: TenantId,
        customer_id: ContactId,
    ) -> Result<ContactView, AppError> {
        let customer = self.get_customer(tenant_id, customer_id).await?;
        Ok(self.transformer.transform(customer))
    }

    /// Resolve every id or fail naming the missing ones.
    pub async fn get_customers(
        &self,
        tenant_id: TenantId,
        customer_ids: impl Into<ContactIds>,
    ) -> Result<Vec<Contact>, AppError> {
        let ids = customer_ids.into().into_vec();
        self.contacts
            .get_contacts(tenant_id, &ids, ContactType::Customer)
            .await
    }

    pub async fn get_customers_list(
        &self,
        tenant_id: TenantId,
        filter: &CustomersFilter,
    ) -> Result<CustomersList, AppError> {
        let list = self.listing.dynamic_list(filter);
        let page_index = filter.page_index();
        let page_size = filter.bounded_page_size();

        let (customers, total) = self
            .repo
            .tenant(tenant_id)
            .paginate_contacts(ContactType::Customer, &list, page_index, page_size)
            .await?;

        Ok(CustomersList {
            customers,
            pagination: Pagination::new(page_index, page_size, total),
            filter_meta: list.meta,
        })
    }

    // ========================
    // Opening balance
    // ========================

    /// Post the opening balance of a customer: accounts receivable against
    /// opening balance equity, dated at the customer's opening balance date.
    pub async fn write_customer_opening_balance_journal(
        &self,
        tenant_id: TenantId,
        customer_id: ContactId,
        amount: Cents,
    ) -> Result<(), AppError> {
        let customer = self.get_customer(tenant_id, customer_id).await?;
        let date = opening_date(&customer);

        let mut poster = JournalPoster::new(self.repo.tenant(tenant_id));
        JournalCommands::new(&mut poster).customer_opening_balance(customer_id, amount, date)?;

        tokio::try_join!(poster.save_balance(), poster.save_entries())?;

        info!(tenant_id, customer_id, amount, "customer opening balance journal written");
        Ok(())
    }

    /// Store a new opening balance on the customer. Delivering the returned
    /// edit event reverts the journal posted for the old one and posts the
    /// new amount. Zero clears it.
    pub async fn replace_opening_balance(
        &self,
        tenant_id: TenantId,
        customer_id: ContactId,
        amount: Cents,
        at: Option<NaiveDate>,
    ) -> Result<Mutation<Contact>, AppError> {
        if amount < 0 {
            return Err(AppError::InvalidAmount(format!(
                "opening balance must not be negative, got {}",
                amount
            )));
        }

        let current = self.get_customer(tenant_id, customer_id).await?;
        let at = at.or(current.opening_balance_at);
        let dto = CustomerDto {
            opening_balance: Some(amount),
            opening_balance_at: at,
            ..contact_to_customer_dto(current)
        };
        self.edit_customer(tenant_id, customer_id, dto).await
    }

    pub async fn revert_opening_balance_entries(
        &self,
        tenant_id: TenantId,
        customer_ids: impl Into<ContactIds>,
    ) -> Result<(), AppError> {
        let ids = customer_ids.into().into_vec();
        info!(tenant_id, customer_ids = ?ids, "trying to revert opening balance journal entries");

        self.contacts
            .revert_opening_balance_entries(tenant_id, &ids, ContactType::Customer)
            .await?;
        Ok(())
    }

    // ========================
    // Sales invoices
    // ========================

    pub async fn record_sales_invoice(
        &self,
        tenant_id: TenantId,
        customer_id: ContactId,
        invoice_no: &str,
        amount: Cents,
        invoice_date: NaiveDate,
    ) -> Result<SalesInvoice, AppError> {
        if amount <= 0 {
            return Err(AppError::InvalidAmount(format!(
                "invoice amount must be positive, got {}",
                amount
            )));
        }
        self.get_customer(tenant_id, customer_id).await?;

        let invoice = self
            .repo
            .tenant(tenant_id)
            .insert_sales_invoice(customer_id, invoice_no, amount, invoice_date)
            .await?;

        info!(tenant_id, customer_id, invoice_no, "sales invoice recorded");
        Ok(invoice)
    }

    pub async fn sales_invoices(
        &self,
        tenant_id: TenantId,
        customer_id: ContactId,
    ) -> Result<Vec<SalesInvoice>, AppError> {
        self.get_customer(tenant_id, customer_id).await?;
        Ok(self
            .repo
            .tenant(tenant_id)
            .sales_invoices_for_customer(customer_id)
            .await?)
    }
}

fn opening_balance_of(dto: &CustomerDto) -> Option<OpeningBalance> {
    dto.opening_balance.map(|amount| OpeningBalance {
        amount,
        at: dto.opening_balance_at,
    })
}

fn opening_date(customer: &Contact) -> NaiveDate {
    customer
        .opening_balance_at
        .unwrap_or_else(|| Utc::now().date_naive())
}

async fn ensure_no_invoices(
    tx: &mut TenantTransaction,
    ids: &[ContactId],
    code: DependentsCode,
) -> Result<(), AppError> {
    if !ContactType::Customer
        .profile()
        .guarded_by(DeleteGuard::SalesInvoices)
    {
        return Ok(());
    }

    let with_invoices = tx.contacts_with_sales_invoices(ids).await?;
    if with_invoices.is_empty() {
        Ok(())
    } else {
        Err(AppError::HasDependents {
            code,
            ids: with_invoices,
        })
    }
}
