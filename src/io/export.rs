use anyhow::Result;
use std::io::Write;

use crate::application::CustomersList;
use crate::domain::format_cents;

/// Output formats for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Table,
    Json,
    Csv,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(ExportFormat::Table),
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }
}

/// Writes one page of customers in an external format.
pub struct CustomersExporter<'a> {
    list: &'a CustomersList,
}

impl<'a> CustomersExporter<'a> {
    pub fn new(list: &'a CustomersList) -> Self {
        Self { list }
    }

    /// Export the page as CSV. Returns the number of rows written.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "display_name",
            "company_name",
            "email",
            "phone",
            "currency_code",
            "active",
            "balance",
            "opening_balance",
            "opening_balance_at",
            "created_at",
        ])?;

        let mut count = 0;
        for customer in &self.list.customers {
            csv_writer.write_record([
                customer.id.to_string(),
                customer.display_name.clone(),
                customer.company_name.clone().unwrap_or_default(),
                customer.email.clone().unwrap_or_default(),
                customer.phone.clone().unwrap_or_default(),
                customer.currency_code.clone().unwrap_or_default(),
                customer.active.to_string(),
                format_cents(customer.balance),
                format_cents(customer.opening_balance),
                customer
                    .opening_balance_at
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                customer.created_at.to_rfc3339(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the whole list result, pagination and filter meta included.
    pub fn export_json<W: Write>(&self, mut writer: W) -> Result<()> {
        let json = serde_json::to_string_pretty(self.list)?;
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}
