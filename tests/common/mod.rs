// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use ledgerbook::application::LedgerService;
use ledgerbook::domain::{Contact, CustomerDto, TenantId};
use ledgerbook::storage::Repository;
use tempfile::TempDir;

pub const TENANT: TenantId = 1;
pub const OTHER_TENANT: TenantId = 2;

/// Service plus direct repository access over one temporary database.
pub struct TestContext {
    pub service: LedgerService,
    pub repo: Repository,
    pub db_url: String,
    _temp: TempDir,
}

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<TestContext> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.to_str().unwrap());
    let repo = Repository::init(&db_url).await?;
    Ok(TestContext {
        service: LedgerService::new(repo.clone()),
        repo,
        db_url,
        _temp: temp_dir,
    })
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Test fixture: customers created without delivering their events
pub struct Customers;

impl Customers {
    pub async fn create(ctx: &TestContext, tenant_id: TenantId, name: &str) -> Result<Contact> {
        let mutation = ctx
            .service
            .customers
            .new_customer(tenant_id, CustomerDto::new(name))
            .await?;
        Ok(mutation.value)
    }

    /// Create several customers in order, returning their ids
    pub async fn create_many(ctx: &TestContext, tenant_id: TenantId, names: &[&str]) -> Result<Vec<i64>> {
        let mut ids = Vec::new();
        for name in names {
            ids.push(Self::create(ctx, tenant_id, name).await?.id);
        }
        Ok(ids)
    }

    /// Create a customer and deliver its creation event
    pub async fn create_with_opening_balance(
        ctx: &TestContext,
        tenant_id: TenantId,
        name: &str,
        amount: i64,
        at: &str,
    ) -> Result<Contact> {
        let dto = CustomerDto::new(name).with_opening_balance(amount, parse_date(at));
        let mutation = ctx.service.customers.new_customer(tenant_id, dto).await?;
        Ok(ctx.service.events.deliver(mutation).await?)
    }

    pub async fn invoice(ctx: &TestContext, tenant_id: TenantId, customer_id: i64, invoice_no: &str) -> Result<()> {
        ctx.service
            .customers
            .record_sales_invoice(tenant_id, customer_id, invoice_no, 10000, parse_date("2024-02-01"))
            .await?;
        Ok(())
    }
}
