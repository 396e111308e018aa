use tracing::{debug, info};

use crate::domain::{DomainEvent, Mutation, OpeningBalance};

use super::{AppError, CustomersService};

/// Delivers domain events to the subscribers that keep the journal in step
/// with customer changes.
#[derive(Clone)]
pub struct EventDispatcher {
    customers: CustomersService,
}

impl EventDispatcher {
    pub fn new(customers: CustomersService) -> Self {
        Self { customers }
    }

    /// Deliver the event of a mutation and hand back its value.
    pub async fn deliver<T>(&self, mutation: Mutation<T>) -> Result<T, AppError> {
        let (value, event) = mutation.into_parts();
        self.dispatch(&event).await?;
        Ok(value)
    }

    pub async fn dispatch(&self, event: &DomainEvent) -> Result<(), AppError> {
        info!(event = event.name(), tenant_id = event.tenant_id(), "dispatching event");

        match event {
            DomainEvent::CustomerCreated {
                tenant_id,
                customer_id,
                opening_balance,
            } => {
                if let Some(amount) = positive_amount(opening_balance) {
                    self.customers
                        .write_customer_opening_balance_journal(*tenant_id, *customer_id, amount)
                        .await?;
                }
            }
            DomainEvent::CustomerEdited {
                tenant_id,
                customer_id,
                opening_balance,
            } => {
                // Unchanged opening balance leaves the journal alone.
                if opening_balance.is_none() {
                    debug!(customer_id, "opening balance untouched");
                    return Ok(());
                }
                self.customers
                    .revert_opening_balance_entries(*tenant_id, *customer_id)
                    .await?;
                if let Some(amount) = positive_amount(opening_balance) {
                    self.customers
                        .write_customer_opening_balance_journal(*tenant_id, *customer_id, amount)
                        .await?;
                }
            }
            DomainEvent::CustomerDeleted {
                tenant_id,
                customer_id,
            } => {
                self.customers
                    .revert_opening_balance_entries(*tenant_id, *customer_id)
                    .await?;
            }
            DomainEvent::CustomersBulkDeleted {
                tenant_id,
                customer_ids,
            } => {
                self.customers
                    .revert_opening_balance_entries(*tenant_id, customer_ids.clone())
                    .await?;
            }
        }

        Ok(())
    }
}

fn positive_amount(opening_balance: &Option<OpeningBalance>) -> Option<i64> {
    opening_balance
        .map(|ob| ob.amount)
        .filter(|amount| *amount > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_positive_amounts_are_posted() {
        let ob = |amount| Some(OpeningBalance { amount, at: None });

        assert_eq!(positive_amount(&ob(2500)), Some(2500));
        assert_eq!(positive_amount(&ob(0)), None);
        assert_eq!(positive_amount(&ob(-10)), None);
        assert_eq!(positive_amount(&None), None);
    }
}
