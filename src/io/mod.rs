// Import/export of ledger data in external formats.

pub mod export;

pub use export::{CustomersExporter, ExportFormat};
