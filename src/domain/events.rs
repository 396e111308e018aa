use chrono::NaiveDate;
use serde::Serialize;

use super::{Cents, ContactId, TenantId};

/// Opening balance carried by create/edit notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OpeningBalance {
    pub amount: Cents,
    pub at: Option<NaiveDate>,
}

/// Notifications produced by customer mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum DomainEvent {
    CustomerCreated {
        tenant_id: TenantId,
        customer_id: ContactId,
        opening_balance: Option<OpeningBalance>,
    },
    CustomerEdited {
        tenant_id: TenantId,
        customer_id: ContactId,
        opening_balance: Option<OpeningBalance>,
    },
    CustomerDeleted {
        tenant_id: TenantId,
        customer_id: ContactId,
    },
    CustomersBulkDeleted {
        tenant_id: TenantId,
        customer_ids: Vec<ContactId>,
    },
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::CustomerCreated { .. } => "customers.onCreated",
            DomainEvent::CustomerEdited { .. } => "customers.onEdited",
            DomainEvent::CustomerDeleted { .. } => "customers.onDeleted",
            DomainEvent::CustomersBulkDeleted { .. } => "customers.onBulkDeleted",
        }
    }

    pub fn tenant_id(&self) -> TenantId {
        match self {
            DomainEvent::CustomerCreated { tenant_id, .. }
            | DomainEvent::CustomerEdited { tenant_id, .. }
            | DomainEvent::CustomerDeleted { tenant_id, .. }
            | DomainEvent::CustomersBulkDeleted { tenant_id, .. } => *tenant_id,
        }
    }
}

/// Result of a mutating operation: the value plus the event to deliver.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation<T> {
    pub value: T,
    pub event: DomainEvent,
}

impl<T> Mutation<T> {
    pub fn new(value: T, event: DomainEvent) -> Self {
        Self { value, event }
    }

    pub fn into_parts(self) -> (T, DomainEvent) {
        (self.value, self.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let created = DomainEvent::CustomerCreated {
            tenant_id: 1,
            customer_id: 2,
            opening_balance: None,
        };
        let bulk = DomainEvent::CustomersBulkDeleted {
            tenant_id: 1,
            customer_ids: vec![2, 3],
        };
        assert_eq!(created.name(), "customers.onCreated");
        assert_eq!(bulk.name(), "customers.onBulkDeleted");
        assert_eq!(bulk.tenant_id(), 1);
    }
}
