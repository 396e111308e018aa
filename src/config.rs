use std::env;

use crate::domain::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, TenantId};

/// Runtime settings read from the environment (and `.env`, if present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: String,
    pub tenant_id: TenantId,
    pub page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "ledgerbook.db".to_string(),
            tenant_id: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            database_path: lookup("LEDGERBOOK_DATABASE").unwrap_or(defaults.database_path),
            tenant_id: lookup("LEDGERBOOK_TENANT")
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.tenant_id),
            page_size: lookup("LEDGERBOOK_PAGE_SIZE")
                .and_then(|s| s.parse::<u32>().ok())
                .map(|s| s.clamp(1, MAX_PAGE_SIZE))
                .unwrap_or(defaults.page_size),
        }
    }
}
