use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{Sqlite, SqliteConnection, SqliteExecutor, SqlitePool, SqliteRow};
use sqlx::{QueryBuilder, Row, Transaction};
use uuid::Uuid;

use crate::domain::{
    AccountKey, Cents, Comparator, Condition, Contact, ContactDto, ContactId, ContactType,
    DynamicList, FieldKind, FieldValue, JournalEntry, Pagination, Predicate, SalesInvoice,
    TenantId,
};

use super::{MIGRATION_001_CONTACTS, MIGRATION_002_JOURNAL};

const CONTACT_COLUMNS: &str = "id, tenant_id, contact_type, display_name, company_name, email, \
     phone, billing_address, currency_code, note, active, balance, opening_balance, \
     opening_balance_at, created_at, updated_at";

const JOURNAL_COLUMNS: &str = "id, reference_type, reference_id, account, contact_id, \
     contact_type, debit, credit, date, created_at";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Owns the connection pool; hands out tenant-scoped handles.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_CONTACTS)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;

        sqlx::raw_sql(MIGRATION_002_JOURNAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 002")?;

        Ok(())
    }

    /// Initialize a database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// Handle whose every statement is restricted to `tenant_id`.
    pub fn tenant(&self, tenant_id: TenantId) -> TenantRepository {
        TenantRepository {
            pool: self.pool.clone(),
            tenant_id,
        }
    }
}

/// Data access for a single tenant.
#[derive(Clone)]
pub struct TenantRepository {
    pool: SqlitePool,
    tenant_id: TenantId,
}

impl TenantRepository {
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Open a transaction scoped to this tenant.
    pub async fn begin(&self) -> Result<TenantTransaction> {
        let tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;
        Ok(TenantTransaction {
            tx,
            tenant_id: self.tenant_id,
        })
    }

    // ========================
    // Contacts
    // ========================

    /// Insert a contact tagged with `contact_type`.
    pub async fn insert_contact(&self, contact_type: ContactType, dto: &ContactDto) -> Result<Contact> {
        let now = Utc::now().to_rfc3339();
        let sql = format!(
            r#"
            INSERT INTO contacts (tenant_id, contact_type, display_name, company_name, email, phone,
                billing_address, currency_code, note, active, balance, opening_balance,
                opening_balance_at, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?)
            RETURNING {CONTACT_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(self.tenant_id)
            .bind(contact_type.as_str())
            .bind(&dto.display_name)
            .bind(&dto.company_name)
            .bind(&dto.email)
            .bind(&dto.phone)
            .bind(&dto.billing_address)
            .bind(&dto.currency_code)
            .bind(&dto.note)
            .bind(dto.active)
            .bind(dto.opening_balance.unwrap_or(0))
            .bind(dto.opening_balance_at.map(format_date))
            .bind(&now)
            .bind(&now)
            .fetch_one(&self.pool)
            .await
            .context("Failed to save contact")?;

        row_to_contact(&row)
    }

    /// Update a contact of the given type. Balance columns are left alone;
    /// opening balance fields are only replaced when supplied.
    pub async fn update_contact(
        &self,
        contact_type: ContactType,
        id: ContactId,
        dto: &ContactDto,
    ) -> Result<Option<Contact>> {
        let sql = format!(
            r#"
            UPDATE contacts
            SET display_name = ?, company_name = ?, email = ?, phone = ?, billing_address = ?,
                currency_code = ?, note = ?, active = ?,
                opening_balance = COALESCE(?, opening_balance),
                opening_balance_at = COALESCE(?, opening_balance_at),
                updated_at = ?
            WHERE tenant_id = ? AND contact_type = ? AND id = ?
            RETURNING {CONTACT_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(&dto.display_name)
            .bind(&dto.company_name)
            .bind(&dto.email)
            .bind(&dto.phone)
            .bind(&dto.billing_address)
            .bind(&dto.currency_code)
            .bind(&dto.note)
            .bind(dto.active)
            .bind(dto.opening_balance)
            .bind(dto.opening_balance_at.map(format_date))
            .bind(Utc::now().to_rfc3339())
            .bind(self.tenant_id)
            .bind(contact_type.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to update contact")?;

        row.as_ref().map(row_to_contact).transpose()
    }

    /// Get a contact by id and type.
    pub async fn find_contact(&self, contact_type: ContactType, id: ContactId) -> Result<Option<Contact>> {
        let contacts = fetch_contacts(&self.pool, self.tenant_id, contact_type, &[id]).await?;
        Ok(contacts.into_iter().next())
    }

    /// Get every contact of the given type whose id is in `ids`.
    pub async fn find_contacts(
        &self,
        contact_type: ContactType,
        ids: &[ContactId],
    ) -> Result<Vec<Contact>> {
        fetch_contacts(&self.pool, self.tenant_id, contact_type, ids).await
    }

    /// One page of contacts of `contact_type` narrowed by `list`, plus the
    /// total number of matching rows.
    pub async fn paginate_contacts(
        &self,
        contact_type: ContactType,
        list: &DynamicList,
        page_index: u32,
        page_size: u32,
    ) -> Result<(Vec<Contact>, u64)> {
        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) AS total FROM contacts");
        push_contact_filters(&mut count, self.tenant_id, contact_type, list);
        let total: i64 = count
            .build()
            .fetch_one(&self.pool)
            .await
            .context("Failed to count contacts")?
            .get("total");

        let mut page = QueryBuilder::<Sqlite>::new(format!("SELECT {CONTACT_COLUMNS} FROM contacts"));
        push_contact_filters(&mut page, self.tenant_id, contact_type, list);
        let order = list.sort.order.as_sql();
        page.push(format!(" ORDER BY {} {}, id {}", list.sort.column, order, order));
        page.push(" LIMIT ")
            .push_bind(i64::from(page_size))
            .push(" OFFSET ")
            .push_bind(Pagination::offset(page_index, page_size) as i64);

        let rows = page
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list contacts")?;
        let contacts = rows.iter().map(row_to_contact).collect::<Result<Vec<_>>>()?;

        Ok((contacts, total.max(0) as u64))
    }

    // ========================
    // Sales invoices
    // ========================

    pub async fn insert_sales_invoice(
        &self,
        customer_id: ContactId,
        invoice_no: &str,
        amount: Cents,
        invoice_date: NaiveDate,
    ) -> Result<SalesInvoice> {
        let row = sqlx::query(
            r#"
            INSERT INTO sales_invoices (tenant_id, customer_id, invoice_no, amount, invoice_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, tenant_id, customer_id, invoice_no, amount, invoice_date, created_at
            "#,
        )
        .bind(self.tenant_id)
        .bind(customer_id)
        .bind(invoice_no)
        .bind(amount)
        .bind(format_date(invoice_date))
        .bind(Utc::now().to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .context("Failed to save sales invoice")?;

        row_to_sales_invoice(&row)
    }

    /// Sales invoices issued to a customer.
    pub async fn sales_invoices_for_customer(&self, customer_id: ContactId) -> Result<Vec<SalesInvoice>> {
        let rows = sqlx::query(
            r#"
            SELECT id, tenant_id, customer_id, invoice_no, amount, invoice_date, created_at
            FROM sales_invoices
            WHERE tenant_id = ? AND customer_id = ?
            ORDER BY id
            "#,
        )
        .bind(self.tenant_id)
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch sales invoices")?;

        rows.iter().map(row_to_sales_invoice).collect()
    }

    // ========================
    // Journal
    // ========================

    /// Insert journal entries in a single transaction.
    pub async fn save_journal_entries(&self, entries: &[JournalEntry]) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        for entry in entries {
            insert_journal_entry(&mut tx, self.tenant_id, entry).await?;
        }
        tx.commit().await.context("Failed to commit journal entries")?;
        Ok(())
    }

    /// Add balance deltas to accounts and contacts in a single transaction.
    pub async fn apply_balance_changes(
        &self,
        accounts: &BTreeMap<AccountKey, Cents>,
        contacts: &BTreeMap<ContactId, Cents>,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        apply_account_changes(&mut tx, self.tenant_id, accounts).await?;
        apply_contact_changes(&mut tx, self.tenant_id, contacts).await?;
        tx.commit().await.context("Failed to commit balances")?;
        Ok(())
    }

    /// Delete entries and apply the balance deltas that undo them, atomically.
    pub async fn remove_journal_entries(
        &self,
        entries: &[JournalEntry],
        accounts: &BTreeMap<AccountKey, Cents>,
        contacts: &BTreeMap<ContactId, Cents>,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;
        for entry in entries {
            sqlx::query("DELETE FROM journal_entries WHERE tenant_id = ? AND id = ?")
                .bind(self.tenant_id)
                .bind(entry.id.to_string())
                .execute(&mut *tx)
                .await
                .context("Failed to delete journal entry")?;
        }
        apply_account_changes(&mut tx, self.tenant_id, accounts).await?;
        apply_contact_changes(&mut tx, self.tenant_id, contacts).await?;
        tx.commit().await.context("Failed to commit journal removal")?;
        Ok(())
    }

    /// Entries written under `reference_type` for any of `reference_ids`.
    pub async fn journal_entries_for(
        &self,
        reference_type: &str,
        reference_ids: &[i64],
    ) -> Result<Vec<JournalEntry>> {
        if reference_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {JOURNAL_COLUMNS} FROM journal_entries WHERE tenant_id = "
        ));
        query
            .push_bind(self.tenant_id)
            .push(" AND reference_type = ")
            .push_bind(reference_type.to_string())
            .push(" AND reference_id IN (");
        let mut ids = query.separated(", ");
        for id in reference_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(")");
        query.push(" ORDER BY created_at, id");

        let rows = query
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to fetch journal entries")?;

        rows.iter().map(row_to_journal_entry).collect()
    }

    /// Running balance of an account (debit-positive). Untouched accounts are 0.
    pub async fn account_balance(&self, account: AccountKey) -> Result<Cents> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(balance), 0) AS balance FROM account_balances WHERE tenant_id = ? AND account = ?",
        )
        .bind(self.tenant_id)
        .bind(account.as_str())
        .fetch_one(&self.pool)
        .await
        .context("Failed to fetch account balance")?;

        Ok(row.get("balance"))
    }
}

/// Tenant-scoped transaction used where a check must hold until the write commits.
pub struct TenantTransaction {
    tx: Transaction<'static, Sqlite>,
    tenant_id: TenantId,
}

impl TenantTransaction {
    pub async fn find_contacts(
        &mut self,
        contact_type: ContactType,
        ids: &[ContactId],
    ) -> Result<Vec<Contact>> {
        fetch_contacts(&mut *self.tx, self.tenant_id, contact_type, ids).await
    }

    /// Which of `ids` are referenced by at least one sales invoice.
    pub async fn contacts_with_sales_invoices(&mut self, ids: &[ContactId]) -> Result<Vec<ContactId>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT DISTINCT customer_id FROM sales_invoices WHERE tenant_id = ",
        );
        query.push_bind(self.tenant_id).push(" AND customer_id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");
        query.push(" ORDER BY customer_id");

        let rows = query
            .build()
            .fetch_all(&mut *self.tx)
            .await
            .context("Failed to check sales invoices")?;

        Ok(rows.iter().map(|row| row.get("customer_id")).collect())
    }

    /// Delete contacts of the given type by id. Returns the number of rows removed.
    pub async fn delete_contacts(&mut self, contact_type: ContactType, ids: &[ContactId]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut query = QueryBuilder::<Sqlite>::new("DELETE FROM contacts WHERE tenant_id = ");
        query
            .push_bind(self.tenant_id)
            .push(" AND contact_type = ")
            .push_bind(contact_type.as_str())
            .push(" AND id IN (");
        let mut separated = query.separated(", ");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let result = query
            .build()
            .execute(&mut *self.tx)
            .await
            .context("Failed to delete contacts")?;

        Ok(result.rows_affected())
    }

    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await.context("Failed to commit transaction")
    }
}

async fn fetch_contacts<'e, E>(
    executor: E,
    tenant_id: TenantId,
    contact_type: ContactType,
    ids: &[ContactId],
) -> Result<Vec<Contact>>
where
    E: SqliteExecutor<'e>,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts WHERE tenant_id = "
    ));
    query
        .push_bind(tenant_id)
        .push(" AND contact_type = ")
        .push_bind(contact_type.as_str())
        .push(" AND id IN (");
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(*id);
    }
    separated.push_unseparated(")");
    query.push(" ORDER BY id");

    let rows = query
        .build()
        .fetch_all(executor)
        .await
        .context("Failed to fetch contacts")?;

    rows.iter().map(row_to_contact).collect()
}

/// Base modifier (tenant + discriminator) followed by the dynamic predicates.
fn push_contact_filters(
    query: &mut QueryBuilder<'_, Sqlite>,
    tenant_id: TenantId,
    contact_type: ContactType,
    list: &DynamicList,
) {
    query
        .push(" WHERE tenant_id = ")
        .push_bind(tenant_id)
        .push(" AND contact_type = ")
        .push_bind(contact_type.as_str());

    if list.active_only {
        query.push(" AND active = 1");
    }

    if let Some(keyword) = &list.search_keyword {
        let pattern = like_pattern(keyword);
        query.push(" AND (");
        for (i, column) in list.search_columns.iter().enumerate() {
            if i > 0 {
                query.push(" OR ");
            }
            query
                .push(*column)
                .push(" LIKE ")
                .push_bind(pattern.clone())
                .push(LIKE_ESCAPE);
        }
        query.push(")");
    }

    if !list.predicates.is_empty() {
        query.push(" AND (");
        for (i, predicate) in list.predicates.iter().enumerate() {
            if i > 0 {
                query.push(match predicate.condition {
                    Condition::And => " AND ",
                    Condition::Or => " OR ",
                });
            }
            push_predicate(query, predicate);
        }
        query.push(")");
    }
}

fn push_predicate(query: &mut QueryBuilder<'_, Sqlite>, predicate: &Predicate) {
    // Dates are stored as text; timestamps compare on their date prefix.
    let column = match predicate.kind {
        FieldKind::Date => format!("substr({}, 1, 10)", predicate.column),
        _ => predicate.column.to_string(),
    };
    let is_text = predicate.kind == FieldKind::Text;

    match (predicate.comparator, &predicate.value) {
        (Comparator::Empty, _) if is_text => {
            query.push(format!("({column} IS NULL OR {column} = '')"));
        }
        (Comparator::Empty, _) => {
            query.push(format!("{column} IS NULL"));
        }
        (Comparator::NotEmpty, _) if is_text => {
            query.push(format!("({column} IS NOT NULL AND {column} != '')"));
        }
        (Comparator::NotEmpty, _) => {
            query.push(format!("{column} IS NOT NULL"));
        }
        (Comparator::Contains, Some(FieldValue::Text(text))) => {
            query
                .push(format!("{column} LIKE "))
                .push_bind(like_pattern(text))
                .push(LIKE_ESCAPE);
        }
        (Comparator::NotContains, Some(FieldValue::Text(text))) => {
            query
                .push(format!("({column} IS NULL OR {column} NOT LIKE "))
                .push_bind(like_pattern(text))
                .push(LIKE_ESCAPE)
                .push(")");
        }
        (Comparator::NotEqual, Some(value)) => {
            query.push(format!("({column} IS NULL OR {column} != "));
            push_value(query, value);
            query.push(")");
        }
        (comparator, Some(value)) => {
            let operator = match comparator {
                Comparator::Bigger => ">",
                Comparator::BiggerOrEquals => ">=",
                Comparator::Smaller => "<",
                Comparator::SmallerOrEquals => "<=",
                _ => "=",
            };
            query.push(format!("{column} {operator} "));
            push_value(query, value);
        }
        (_, None) => {
            query.push("1 = 1");
        }
    }
}

const LIKE_ESCAPE: &str = " ESCAPE '\\'";

/// `%text%` with LIKE wildcards in `text` matched literally.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn push_value(query: &mut QueryBuilder<'_, Sqlite>, value: &FieldValue) {
    match value {
        FieldValue::Text(text) => query.push_bind(text.clone()),
        FieldValue::Number(number) => query.push_bind(*number),
        FieldValue::Boolean(flag) => query.push_bind(i64::from(*flag)),
        FieldValue::Date(date) => query.push_bind(format_date(*date)),
    };
}

async fn insert_journal_entry(
    conn: &mut SqliteConnection,
    tenant_id: TenantId,
    entry: &JournalEntry,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO journal_entries (id, tenant_id, reference_type, reference_id, account,
            contact_id, contact_type, debit, credit, date, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entry.id.to_string())
    .bind(tenant_id)
    .bind(&entry.reference_type)
    .bind(entry.reference_id)
    .bind(entry.account.as_str())
    .bind(entry.contact_id)
    .bind(entry.contact_type.map(|ct| ct.as_str()))
    .bind(entry.debit)
    .bind(entry.credit)
    .bind(format_date(entry.date))
    .bind(entry.created_at.to_rfc3339())
    .execute(conn)
    .await
    .context("Failed to save journal entry")?;
    Ok(())
}

async fn apply_account_changes(
    conn: &mut SqliteConnection,
    tenant_id: TenantId,
    changes: &BTreeMap<AccountKey, Cents>,
) -> Result<()> {
    for (account, delta) in changes {
        sqlx::query(
            r#"
            INSERT INTO account_balances (tenant_id, account, balance)
            VALUES (?, ?, ?)
            ON CONFLICT (tenant_id, account) DO UPDATE SET balance = balance + excluded.balance
            "#,
        )
        .bind(tenant_id)
        .bind(account.as_str())
        .bind(*delta)
        .execute(&mut *conn)
        .await
        .context("Failed to save account balance")?;
    }
    Ok(())
}

async fn apply_contact_changes(
    conn: &mut SqliteConnection,
    tenant_id: TenantId,
    changes: &BTreeMap<ContactId, Cents>,
) -> Result<()> {
    for (contact_id, delta) in changes {
        sqlx::query("UPDATE contacts SET balance = balance + ? WHERE tenant_id = ? AND id = ?")
            .bind(*delta)
            .bind(tenant_id)
            .bind(*contact_id)
            .execute(&mut *conn)
            .await
            .context("Failed to save contact balance")?;
    }
    Ok(())
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).with_context(|| format!("Invalid date: {value}"))
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("Invalid timestamp: {value}"))?
        .with_timezone(&Utc))
}

fn row_to_contact(row: &SqliteRow) -> Result<Contact> {
    let contact_type_str: String = row.get("contact_type");
    let opening_balance_at: Option<String> = row.get("opening_balance_at");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Contact {
        id: row.get("id"),
        tenant_id: row.get("tenant_id"),
        contact_type: ContactType::from_str(&contact_type_str)
            .ok_or_else(|| anyhow::anyhow!("Invalid contact type: {}", contact_type_str))?,
        display_name: row.get("display_name"),
        company_name: row.get("company_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        billing_address: row.get("billing_address"),
        currency_code: row.get("currency_code"),
        note: row.get("note"),
        active: row.get::<i64, _>("active") != 0,
        balance: row.get("balance"),
        opening_balance: row.get("opening_balance"),
        opening_balance_at: opening_balance_at.as_deref().map(parse_date).transpose()?,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn row_to_sales_invoice(row: &SqliteRow) -> Result<SalesInvoice> {
    let invoice_date: String = row.get("invoice_date");
    let created_at: String = row.get("created_at");

    Ok(SalesInvoice {
        id: row.get("id"),
        tenant_id: row.get("tenant_id"),
        customer_id: row.get("customer_id"),
        invoice_no: row.get("invoice_no"),
        amount: row.get("amount"),
        invoice_date: parse_date(&invoice_date)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

fn row_to_journal_entry(row: &SqliteRow) -> Result<JournalEntry> {
    let id: String = row.get("id");
    let account: String = row.get("account");
    let contact_type: Option<String> = row.get("contact_type");
    let date: String = row.get("date");
    let created_at: String = row.get("created_at");

    Ok(JournalEntry {
        id: Uuid::parse_str(&id).context("Invalid journal entry ID")?,
        reference_type: row.get("reference_type"),
        reference_id: row.get("reference_id"),
        account: AccountKey::from_str(&account)
            .ok_or_else(|| anyhow::anyhow!("Invalid account: {}", account))?,
        contact_id: row.get("contact_id"),
        contact_type: contact_type
            .map(|ct| {
                ContactType::from_str(&ct).ok_or_else(|| anyhow::anyhow!("Invalid contact type: {}", ct))
            })
            .transpose()?,
        debit: row.get("debit"),
        credit: row.get("credit"),
        date: parse_date(&date)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("acme"), "%acme%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
