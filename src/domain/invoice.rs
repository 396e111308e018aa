use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Cents, ContactId, TenantId};

pub type SalesInvoiceId = i64;

/// Sales invoice header. Only what the customer rules need is modelled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesInvoice {
    pub id: SalesInvoiceId,
    pub tenant_id: TenantId,
    pub customer_id: ContactId,
    pub invoice_no: String,
    pub amount: Cents,
    pub invoice_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}
