use tracing::warn;

use crate::domain::{
    CONTACT_FIELDS, CONTACT_SEARCH_COLUMNS, CustomersFilter, DynamicList, FieldValue, FilterMeta,
    FilterRole, ListableField, Predicate, SortBy, SortOrder,
};

/// Translates a generic list filter into query predicates for one resource.
#[derive(Debug, Clone)]
pub struct DynamicListingService {
    fields: &'static [ListableField],
    search_columns: &'static [&'static str],
    default_sort: &'static str,
}

impl DynamicListingService {
    pub fn new(
        fields: &'static [ListableField],
        search_columns: &'static [&'static str],
        default_sort: &'static str,
    ) -> Self {
        Self {
            fields,
            search_columns,
            default_sort,
        }
    }

    /// Listing over the contacts resource, newest first by default.
    pub fn contacts() -> Self {
        Self::new(CONTACT_FIELDS, CONTACT_SEARCH_COLUMNS, "created_at")
    }

    fn field(&self, key: &str) -> Option<&'static ListableField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Build the query modifier for `filter`. Roles naming unknown fields,
    /// comparators that do not fit the field, or values that do not parse are
    /// skipped and left out of the returned meta.
    pub fn dynamic_list(&self, filter: &CustomersFilter) -> DynamicList {
        let mut predicates = Vec::new();
        let mut applied_roles = Vec::new();

        for role in &filter.filter_roles {
            match self.recognize(role) {
                Some(predicate) => {
                    predicates.push(predicate);
                    applied_roles.push(role.clone());
                }
                None => warn!(
                    field_key = %role.field_key,
                    comparator = ?role.comparator,
                    "skipping unrecognized filter role"
                ),
            }
        }

        let sort_field = filter
            .column_sort_by
            .as_deref()
            .and_then(|key| {
                let field = self.field(key);
                if field.is_none() {
                    warn!(column = key, "unknown sort column, using default");
                }
                field
            })
            .or_else(|| self.field(self.default_sort));
        let (sort_key, sort_column) = match sort_field {
            Some(field) => (field.key, field.column),
            None => ("id", "id"),
        };
        let sort_order = filter.sort_order.unwrap_or(SortOrder::Desc);

        let search_keyword = filter
            .search_keyword
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);

        DynamicList {
            predicates,
            search_keyword: search_keyword.clone(),
            search_columns: self.search_columns,
            active_only: !filter.inactive_mode,
            sort: SortBy {
                column: sort_column,
                order: sort_order,
            },
            meta: FilterMeta {
                filter_roles: applied_roles,
                column_sort_by: sort_key.to_string(),
                sort_order,
                search_keyword,
                inactive_mode: filter.inactive_mode,
            },
        }
    }

    fn recognize(&self, role: &FilterRole) -> Option<Predicate> {
        let field = self.field(&role.field_key)?;
        if !role.comparator.applies_to(field.kind) {
            return None;
        }

        let value = if role.comparator.needs_value() {
            Some(FieldValue::parse(field.kind, role.value.as_deref()?)?)
        } else {
            None
        };

        Some(Predicate {
            condition: role.condition,
            column: field.column,
            kind: field.kind,
            comparator: role.comparator,
            value,
        })
    }
}

impl Default for DynamicListingService {
    fn default() -> Self {
        Self::contacts()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Comparator, Condition, FieldKind};

    #[test]
    fn test_default_list_sorts_newest_first() {
        let list = DynamicListingService::contacts().dynamic_list(&CustomersFilter::default());

        assert!(list.predicates.is_empty());
        assert!(list.active_only);
        assert_eq!(list.sort, SortBy { column: "created_at", order: SortOrder::Desc });
        assert!(!list.meta.is_filtered());
        assert_eq!(list.meta.column_sort_by, "created_at");
    }

    #[test]
    fn test_recognized_roles_become_predicates() {
        let filter = CustomersFilter::default()
            .with_role(FilterRole::new("display_name", Comparator::Contains, "acme"))
            .with_role(FilterRole::new("balance", Comparator::Bigger, "1000").or());

        let list = DynamicListingService::contacts().dynamic_list(&filter);

        assert_eq!(list.predicates.len(), 2);
        assert_eq!(list.predicates[0].kind, FieldKind::Text);
        assert_eq!(list.predicates[1].condition, Condition::Or);
        assert_eq!(list.predicates[1].value, Some(FieldValue::Number(1000)));
        assert_eq!(list.meta.filter_roles, filter.filter_roles);
    }

    #[test]
    fn test_unrecognized_roles_are_dropped_from_meta() {
        let filter = CustomersFilter::default()
            .with_role(FilterRole::new("shoe_size", Comparator::Equals, "42"))
            .with_role(FilterRole::new("balance", Comparator::Contains, "12"))
            .with_role(FilterRole::new("balance", Comparator::Equals, "twelve"))
            .with_role(FilterRole::new("email", Comparator::Equals, "a@b.test"));

        let list = DynamicListingService::contacts().dynamic_list(&filter);

        assert_eq!(list.predicates.len(), 1);
        assert_eq!(list.meta.filter_roles.len(), 1);
        assert_eq!(list.meta.filter_roles[0].field_key, "email");
    }

    #[test]
    fn test_empty_comparator_needs_no_value() {
        let role = FilterRole {
            field_key: "email".into(),
            comparator: Comparator::Empty,
            value: None,
            condition: Condition::And,
        };
        let list = DynamicListingService::contacts()
            .dynamic_list(&CustomersFilter::default().with_role(role));

        assert_eq!(list.predicates.len(), 1);
        assert_eq!(list.predicates[0].value, None);
    }

    #[test]
    fn test_sort_and_keyword_are_reported() {
        let filter = CustomersFilter::default()
            .sorted_by("display_name", SortOrder::Asc)
            .with_keyword("  acme ")
            .including_inactive();

        let list = DynamicListingService::contacts().dynamic_list(&filter);

        assert_eq!(list.sort, SortBy { column: "display_name", order: SortOrder::Asc });
        assert!(!list.active_only);
        assert_eq!(list.search_keyword.as_deref(), Some("acme"));
        assert!(list.meta.is_filtered());
        assert!(list.meta.inactive_mode);
    }

    #[test]
    fn test_unknown_sort_column_falls_back() {
        let filter = CustomersFilter::default().sorted_by("password", SortOrder::Asc);
        let list = DynamicListingService::contacts().dynamic_list(&filter);

        assert_eq!(list.sort.column, "created_at");
        assert_eq!(list.sort.order, SortOrder::Asc);
        assert_eq!(list.meta.column_sort_by, "created_at");
    }

    #[test]
    fn test_blank_keyword_is_ignored() {
        let list = DynamicListingService::contacts()
            .dynamic_list(&CustomersFilter::default().with_keyword("   "));
        assert_eq!(list.search_keyword, None);
        assert!(!list.meta.is_filtered());
    }
}
