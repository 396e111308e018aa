use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::application::{CustomersList, LedgerService};
use crate::config::Config;
use crate::domain::{
    Comparator, Condition, ContactId, CustomerDto, CustomersFilter, FilterRole, SortOrder,
    TenantId, contact_to_customer_dto, format_money, parse_cents,
};
use crate::io::{CustomersExporter, ExportFormat};

/// Ledgerbook - tenant-scoped customer ledger
#[derive(Parser)]
#[command(name = "ledgerbook")]
#[command(about = "Customers, their opening balances and the journal behind them")]
#[command(version)]
pub struct Cli {
    /// Database file path (overrides LEDGERBOOK_DATABASE)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Tenant to operate on (overrides LEDGERBOOK_TENANT)
    #[arg(short, long, global = true)]
    pub tenant: Option<TenantId>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Customer management commands
    #[command(subcommand)]
    Customer(CustomerCommands),

    /// Sales invoice commands
    #[command(subcommand)]
    Invoice(InvoiceCommands),
}

/// Optional customer fields shared by `new` and `edit`.
#[derive(clap::Args, Default)]
pub struct CustomerFields {
    #[arg(long)]
    company: Option<String>,

    #[arg(long)]
    email: Option<String>,

    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    address: Option<String>,

    /// ISO currency code (e.g. USD)
    #[arg(long)]
    currency: Option<String>,

    #[arg(long)]
    note: Option<String>,

    /// Opening balance amount (e.g. "150.00")
    #[arg(long)]
    opening_balance: Option<String>,

    /// Opening balance date (YYYY-MM-DD)
    #[arg(long)]
    opening_balance_at: Option<String>,
}

#[derive(Subcommand)]
pub enum CustomerCommands {
    /// Create a customer
    New {
        /// Display name
        name: String,

        #[command(flatten)]
        fields: CustomerFields,

        /// Create the customer as inactive
        #[arg(long)]
        inactive: bool,
    },

    /// Edit a customer; omitted fields keep their current value
    Edit {
        id: ContactId,

        /// New display name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        fields: CustomerFields,

        /// Set the active flag
        #[arg(long)]
        active: Option<bool>,
    },

    /// Show a customer
    Show {
        id: ContactId,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// List customers page by page
    List {
        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Rows per page (defaults to LEDGERBOOK_PAGE_SIZE)
        #[arg(long)]
        page_size: Option<u32>,

        /// Filter role as field:comparator[:value], combined with AND
        #[arg(long = "filter")]
        filters: Vec<String>,

        /// Filter role as field:comparator[:value], combined with OR
        #[arg(long = "or-filter")]
        or_filters: Vec<String>,

        /// Column to sort by
        #[arg(long)]
        sort: Option<String>,

        /// Sort order: asc, desc
        #[arg(long)]
        order: Option<String>,

        /// Search keyword
        #[arg(short, long)]
        search: Option<String>,

        /// Include inactive customers
        #[arg(long)]
        all: bool,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Delete a customer without sales invoices
    Delete { id: ContactId },

    /// Delete several customers; nothing is deleted if any of them fails
    DeleteBulk {
        #[arg(required = true)]
        ids: Vec<ContactId>,
    },

    /// Set a customer's opening balance, replacing any posted before
    OpeningBalance {
        id: ContactId,

        /// Amount (e.g. "150.00"); zero clears it
        amount: String,

        /// Opening balance date (YYYY-MM-DD, defaults to the current one)
        #[arg(long)]
        at: Option<String>,
    },

    /// Remove opening balance journal entries of customers
    RevertOpeningBalance {
        #[arg(required = true)]
        ids: Vec<ContactId>,
    },

    /// List sales invoices of a customer
    Invoices { id: ContactId },
}

#[derive(Subcommand)]
pub enum InvoiceCommands {
    /// Record a sales invoice for a customer
    Add {
        customer_id: ContactId,

        /// Invoice number, unique per tenant
        invoice_no: String,

        /// Amount (e.g. "99.90")
        amount: String,

        /// Invoice date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut config = Config::from_env();
        if let Some(database) = self.database {
            config.database_path = database;
        }
        if let Some(tenant) = self.tenant {
            config.tenant_id = tenant;
        }

        match self.command {
            Commands::Init => {
                LedgerService::init(&config.database_path).await?;
                println!("Database initialized: {}", config.database_path);
            }

            Commands::Customer(cmd) => {
                let service = LedgerService::connect(&config.database_path).await?;
                run_customer_command(&service, &config, cmd).await?;
            }

            Commands::Invoice(cmd) => {
                let service = LedgerService::connect(&config.database_path).await?;
                run_invoice_command(&service, config.tenant_id, cmd).await?;
            }
        }

        Ok(())
    }
}

async fn run_customer_command(
    service: &LedgerService,
    config: &Config,
    cmd: CustomerCommands,
) -> Result<()> {
    let tenant_id = config.tenant_id;
    let customers = &service.customers;

    match cmd {
        CustomerCommands::New {
            name,
            fields,
            inactive,
        } => {
            let dto = fields.apply(CustomerDto::new(name))?.with_active(!inactive);
            let mutation = customers.new_customer(tenant_id, dto).await?;
            let customer = service.events.deliver(mutation).await?;
            println!("Created customer #{}: {}", customer.id, customer.display_name);
        }

        CustomerCommands::Edit {
            id,
            name,
            fields,
            active,
        } => {
            let current = customers.get_customer(tenant_id, id).await?;
            let mut dto = fields.apply(contact_to_customer_dto(current))?;
            if let Some(name) = name {
                dto.display_name = name;
            }
            if let Some(active) = active {
                dto.active = Some(active);
            }

            let mutation = customers.edit_customer(tenant_id, id, dto).await?;
            let customer = service.events.deliver(mutation).await?;
            println!("Updated customer #{}: {}", customer.id, customer.display_name);
        }

        CustomerCommands::Show { id, format } => {
            let view = customers.get_customer_view(tenant_id, id).await?;
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(&view)?);
                return Ok(());
            }

            let customer = &view.contact;
            println!("Customer: {}", customer.display_name);
            println!("  ID:              {}", customer.id);
            if let Some(company) = &customer.company_name {
                println!("  Company:         {}", company);
            }
            if let Some(email) = &customer.email {
                println!("  Email:           {}", email);
            }
            if let Some(phone) = &customer.phone {
                println!("  Phone:           {}", phone);
            }
            println!("  Active:          {}", if customer.active { "yes" } else { "no" });
            if let Some(balance) = &view.formatted_balance {
                println!("  Balance:         {}", balance);
            }
            if let Some(opening) = &view.formatted_opening_balance {
                println!("  Opening balance: {}", opening);
            }
            if let Some(at) = &view.formatted_opening_balance_at {
                println!("  Opening date:    {}", at);
            }
            println!(
                "  Created:         {}",
                customer.created_at.format("%Y-%m-%d %H:%M:%S")
            );
        }

        CustomerCommands::List {
            page,
            page_size,
            filters,
            or_filters,
            sort,
            order,
            search,
            all,
            format,
            output,
        } => {
            let mut filter = CustomersFilter::page(page, page_size.unwrap_or(config.page_size));
            for role in &filters {
                filter = filter.with_role(parse_filter_role(role, Condition::And)?);
            }
            for role in &or_filters {
                filter = filter.with_role(parse_filter_role(role, Condition::Or)?);
            }
            if let Some(order) = order {
                let order = SortOrder::from_str(&order)
                    .ok_or_else(|| anyhow!("Invalid sort order '{}'. Use asc or desc", order))?;
                filter.sort_order = Some(order);
            }
            filter.column_sort_by = sort;
            if let Some(keyword) = search {
                filter = filter.with_keyword(keyword);
            }
            if all {
                filter = filter.including_inactive();
            }

            let format = ExportFormat::from_str(&format)
                .ok_or_else(|| anyhow!("Invalid format '{}'. Use table, json or csv", format))?;
            let list = customers.get_customers_list(tenant_id, &filter).await?;
            write_customers_list(&list, format, output.as_deref())?;
        }

        CustomerCommands::Delete { id } => {
            let mutation = customers.delete_customer(tenant_id, id).await?;
            service.events.deliver(mutation).await?;
            println!("Deleted customer #{}", id);
        }

        CustomerCommands::DeleteBulk { ids } => {
            let mutation = customers.delete_bulk_customers(tenant_id, ids).await?;
            let deleted = service.events.deliver(mutation).await?;
            println!("Deleted {} customer(s)", deleted.len());
        }

        CustomerCommands::OpeningBalance { id, amount, at } => {
            let amount = parse_cents(&amount).context("Invalid amount")?;
            let at = at.as_deref().map(parse_date).transpose()?;
            let mutation = customers
                .replace_opening_balance(tenant_id, id, amount, at)
                .await?;
            let customer = service.events.deliver(mutation).await?;
            println!(
                "Opening balance of customer #{} set to {}",
                customer.id,
                format_money(customer.opening_balance, customer.currency_code.as_deref())
            );
        }

        CustomerCommands::RevertOpeningBalance { ids } => {
            customers.revert_opening_balance_entries(tenant_id, ids).await?;
            println!("Opening balance entries reverted");
        }

        CustomerCommands::Invoices { id } => {
            let customer = customers.get_customer(tenant_id, id).await?;
            let invoices = customers.sales_invoices(tenant_id, id).await?;
            if invoices.is_empty() {
                println!("No invoices found.");
            } else {
                println!("{:<16} {:<12} {:>14}", "INVOICE", "DATE", "AMOUNT");
                println!("{}", "-".repeat(44));
                for invoice in invoices {
                    println!(
                        "{:<16} {:<12} {:>14}",
                        truncate(&invoice.invoice_no, 16),
                        invoice.invoice_date,
                        format_money(invoice.amount, customer.currency_code.as_deref())
                    );
                }
            }
        }
    }
    Ok(())
}

async fn run_invoice_command(
    service: &LedgerService,
    tenant_id: TenantId,
    cmd: InvoiceCommands,
) -> Result<()> {
    match cmd {
        InvoiceCommands::Add {
            customer_id,
            invoice_no,
            amount,
            date,
        } => {
            let amount = parse_cents(&amount).context("Invalid amount")?;
            let date = match date {
                Some(d) => parse_date(&d)?,
                None => chrono::Utc::now().date_naive(),
            };

            let invoice = service
                .customers
                .record_sales_invoice(tenant_id, customer_id, &invoice_no, amount, date)
                .await?;
            println!(
                "Recorded invoice {} for customer #{}",
                invoice.invoice_no, invoice.customer_id
            );
        }
    }
    Ok(())
}

impl CustomerFields {
    fn apply(self, mut dto: CustomerDto) -> Result<CustomerDto> {
        if let Some(v) = self.company {
            dto.company_name = Some(v);
        }
        if let Some(v) = self.email {
            dto.email = Some(v);
        }
        if let Some(v) = self.phone {
            dto.phone = Some(v);
        }
        if let Some(v) = self.address {
            dto.billing_address = Some(v);
        }
        if let Some(v) = self.currency {
            dto.currency_code = Some(v.to_uppercase());
        }
        if let Some(v) = self.note {
            dto.note = Some(v);
        }
        if let Some(amount) = self.opening_balance {
            dto.opening_balance = Some(parse_cents(&amount).context("Invalid opening balance")?);
        }
        if let Some(at) = self.opening_balance_at {
            dto.opening_balance_at = Some(parse_date(&at)?);
        }
        Ok(dto)
    }
}

fn write_customers_list(list: &CustomersList, format: ExportFormat, output: Option<&str>) -> Result<()> {
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = CustomersExporter::new(list);
    match format {
        ExportFormat::Table => print_customers_table(list),
        ExportFormat::Json | ExportFormat::Csv => {
            let writer: Box<dyn Write> = match output {
                Some(path) => Box::new(
                    File::create(path).with_context(|| format!("Failed to create file: {}", path))?,
                ),
                None => Box::new(stdout()),
            };
            if format == ExportFormat::Json {
                exporter.export_json(writer)?;
            } else {
                let count = exporter.export_csv(writer)?;
                if let Some(path) = output {
                    eprintln!("Exported {} customer(s) to {}", count, path);
                }
            }
        }
    }
    Ok(())
}

fn print_customers_table(list: &CustomersList) {
    if list.is_empty_status() {
        println!("No customers yet. Create one with `ledgerbook customer new <NAME>`.");
        return;
    }
    if list.customers.is_empty() {
        println!("No customers match.");
    } else {
        println!(
            "{:<6} {:<24} {:<28} {:>14} {:<6}",
            "ID", "NAME", "EMAIL", "BALANCE", "ACTIVE"
        );
        println!("{}", "-".repeat(82));
        for customer in &list.customers {
            println!(
                "{:<6} {:<24} {:<28} {:>14} {:<6}",
                customer.id,
                truncate(&customer.display_name, 24),
                truncate(customer.email.as_deref().unwrap_or(""), 28),
                format_money(customer.balance, customer.currency_code.as_deref()),
                if customer.active { "yes" } else { "no" }
            );
        }
    }
    println!(
        "Page {} of {} ({} customer(s))",
        list.pagination.page,
        list.pagination.total_pages.max(1),
        list.pagination.total
    );
}

/// Parse `field:comparator[:value]`. The value may itself contain colons.
fn parse_filter_role(input: &str, condition: Condition) -> Result<FilterRole> {
    let mut parts = input.splitn(3, ':');
    let field_key = parts.next().unwrap_or_default();
    let comparator = parts
        .next()
        .ok_or_else(|| anyhow!("Filter '{}' must look like field:comparator[:value]", input))?;
    let comparator = Comparator::from_str(comparator)
        .ok_or_else(|| anyhow!("Unknown comparator '{}'", comparator))?;

    Ok(FilterRole {
        field_key: field_key.to_string(),
        comparator,
        value: parts.next().map(str::to_string),
        condition,
    })
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").context("Date must be in YYYY-MM-DD format")
}
