use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 12;
pub const MAX_PAGE_SIZE: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparator {
    Equals,
    NotEqual,
    Contains,
    NotContains,
    Bigger,
    BiggerOrEquals,
    Smaller,
    SmallerOrEquals,
    Empty,
    NotEmpty,
}

impl Comparator {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "equals" | "eq" => Some(Comparator::Equals),
            "not_equal" | "ne" => Some(Comparator::NotEqual),
            "contains" | "contain" => Some(Comparator::Contains),
            "not_contains" | "not_contain" => Some(Comparator::NotContains),
            "bigger" | "gt" => Some(Comparator::Bigger),
            "bigger_or_equals" | "gte" => Some(Comparator::BiggerOrEquals),
            "smaller" | "lt" => Some(Comparator::Smaller),
            "smaller_or_equals" | "lte" => Some(Comparator::SmallerOrEquals),
            "empty" => Some(Comparator::Empty),
            "not_empty" => Some(Comparator::NotEmpty),
            _ => None,
        }
    }

    pub fn needs_value(&self) -> bool {
        !matches!(self, Comparator::Empty | Comparator::NotEmpty)
    }

    /// Whether this comparator makes sense for a field of the given kind.
    pub fn applies_to(&self, kind: FieldKind) -> bool {
        use Comparator::*;
        match kind {
            FieldKind::Text => matches!(
                self,
                Equals | NotEqual | Contains | NotContains | Empty | NotEmpty
            ),
            FieldKind::Number | FieldKind::Date => matches!(
                self,
                Equals
                    | NotEqual
                    | Bigger
                    | BiggerOrEquals
                    | Smaller
                    | SmallerOrEquals
                    | Empty
                    | NotEmpty
            ),
            FieldKind::Boolean => matches!(self, Equals | NotEqual),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Condition {
    #[default]
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Boolean,
    Date,
}

/// A resource field the listing layer knows how to filter and sort on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListableField {
    pub key: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
}

/// Fields of the contacts resource exposed to dynamic filters.
pub static CONTACT_FIELDS: &[ListableField] = &[
    ListableField { key: "display_name", column: "display_name", kind: FieldKind::Text },
    ListableField { key: "company_name", column: "company_name", kind: FieldKind::Text },
    ListableField { key: "email", column: "email", kind: FieldKind::Text },
    ListableField { key: "phone", column: "phone", kind: FieldKind::Text },
    ListableField { key: "currency_code", column: "currency_code", kind: FieldKind::Text },
    ListableField { key: "active", column: "active", kind: FieldKind::Boolean },
    ListableField { key: "balance", column: "balance", kind: FieldKind::Number },
    ListableField { key: "opening_balance", column: "opening_balance", kind: FieldKind::Number },
    ListableField { key: "opening_balance_at", column: "opening_balance_at", kind: FieldKind::Date },
    ListableField { key: "created_at", column: "created_at", kind: FieldKind::Date },
];

/// Columns searched by a free-text keyword.
pub static CONTACT_SEARCH_COLUMNS: &[&str] = &["display_name", "company_name", "email"];

/// One user supplied filter line, as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRole {
    pub field_key: String,
    pub comparator: Comparator,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub condition: Condition,
}

impl FilterRole {
    pub fn new(field_key: impl Into<String>, comparator: Comparator, value: impl Into<String>) -> Self {
        Self {
            field_key: field_key.into(),
            comparator,
            value: Some(value.into()),
            condition: Condition::And,
        }
    }

    pub fn or(mut self) -> Self {
        self.condition = Condition::Or;
        self
    }
}

/// Typed literal a predicate compares against.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(i64),
    Boolean(bool),
    Date(NaiveDate),
}

impl FieldValue {
    /// Parse a raw role value for a field of `kind`; `None` when it does not fit.
    pub fn parse(kind: FieldKind, raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match kind {
            FieldKind::Text => Some(FieldValue::Text(raw.to_string())),
            FieldKind::Number => raw.parse().ok().map(FieldValue::Number),
            FieldKind::Boolean => match raw.to_lowercase().as_str() {
                "true" | "1" | "yes" => Some(FieldValue::Boolean(true)),
                "false" | "0" | "no" => Some(FieldValue::Boolean(false)),
                _ => None,
            },
            FieldKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(FieldValue::Date),
        }
    }
}

/// A recognized filter line, ready to be rendered by storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub condition: Condition,
    pub column: &'static str,
    pub kind: FieldKind,
    pub comparator: Comparator,
    pub value: Option<FieldValue>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortBy {
    pub column: &'static str,
    pub order: SortOrder,
}

/// Query modifier produced from a filter: predicates, keyword search, sort.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicList {
    pub predicates: Vec<Predicate>,
    pub search_keyword: Option<String>,
    pub search_columns: &'static [&'static str],
    pub active_only: bool,
    pub sort: SortBy,
    pub meta: FilterMeta,
}

/// Listing request for customers (and any other contact list).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomersFilter {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub filter_roles: Vec<FilterRole>,
    #[serde(default)]
    pub column_sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
    #[serde(default)]
    pub search_keyword: Option<String>,
    /// Include inactive contacts.
    #[serde(default)]
    pub inactive_mode: bool,
}

fn first_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for CustomersFilter {
    fn default() -> Self {
        Self {
            page: first_page(),
            page_size: default_page_size(),
            filter_roles: Vec::new(),
            column_sort_by: None,
            sort_order: None,
            search_keyword: None,
            inactive_mode: false,
        }
    }
}

impl CustomersFilter {
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            ..Default::default()
        }
    }

    pub fn with_role(mut self, role: FilterRole) -> Self {
        self.filter_roles.push(role);
        self
    }

    pub fn sorted_by(mut self, column: impl Into<String>, order: SortOrder) -> Self {
        self.column_sort_by = Some(column.into());
        self.sort_order = Some(order);
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.search_keyword = Some(keyword.into());
        self
    }

    pub fn including_inactive(mut self) -> Self {
        self.inactive_mode = true;
        self
    }

    /// Zero-based page index handed to storage. Page numbers below 1 read as 1.
    pub fn page_index(&self) -> u32 {
        self.page.max(1) - 1
    }

    pub fn bounded_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }
}

/// Which parts of a filter actually took effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterMeta {
    pub filter_roles: Vec<FilterRole>,
    pub column_sort_by: String,
    pub sort_order: SortOrder,
    pub search_keyword: Option<String>,
    pub inactive_mode: bool,
}

impl FilterMeta {
    /// True when at least one narrowing filter was applied.
    pub fn is_filtered(&self) -> bool {
        !self.filter_roles.is_empty() || self.search_keyword.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// 1-based page number.
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page_index: u32, page_size: u32, total: u64) -> Self {
        let size = u64::from(page_size.max(1));
        Self {
            page: page_index + 1,
            page_size,
            total,
            total_pages: total.div_ceil(size),
        }
    }

    /// Row offset of the first row on this page.
    pub fn offset(page_index: u32, page_size: u32) -> u64 {
        u64::from(page_index) * u64::from(page_size)
    }
}
