mod repository;

pub use repository::*;

/// Contacts and sales invoices.
pub const MIGRATION_001_CONTACTS: &str = include_str!("migrations/001_contacts.sql");

/// Journal entries and running account balances.
pub const MIGRATION_002_JOURNAL: &str = include_str!("migrations/002_journal.sql");
