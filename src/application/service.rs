use crate::storage::Repository;

use super::{AppError, CustomersService, EventDispatcher};

/// Entry point for clients (CLI, API, tests): the customer use cases plus
/// the dispatcher that delivers their events.
#[derive(Clone)]
pub struct LedgerService {
    pub customers: CustomersService,
    pub events: EventDispatcher,
}

impl LedgerService {
    /// Wire every service over the given repository.
    pub fn new(repo: Repository) -> Self {
        let customers = CustomersService::from_repository(repo);
        let events = EventDispatcher::new(customers.clone());
        Self { customers, events }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }
}
