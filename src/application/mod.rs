// Application layer: use cases and orchestration over the storage layer.

pub mod contacts;
pub mod customers;
pub mod error;
pub mod events;
pub mod journal;
pub mod listing;
pub mod service;
pub mod transformer;

pub use contacts::ContactsService;
pub use customers::{CustomersList, CustomersService};
pub use error::*;
pub use events::EventDispatcher;
pub use journal::{JournalCommands, JournalPoster};
pub use listing::DynamicListingService;
pub use service::LedgerService;
pub use transformer::{ContactTransformer, ContactView};
