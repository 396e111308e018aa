mod common;

use anyhow::Result;
use common::{Customers, OTHER_TENANT, TENANT, test_service};
use ledgerbook::application::{AppError, ContactsService, DependentsCode};
use ledgerbook::domain::{
    Comparator, ContactType, CustomerDto, CustomersFilter, DomainEvent, FilterRole, SortOrder,
    customer_to_contact_dto,
};

#[tokio::test]
async fn test_new_customer_defaults_to_active() -> Result<()> {
    let ctx = test_service().await?;

    let mutation = ctx
        .service
        .customers
        .new_customer(TENANT, CustomerDto::new("Acme").with_email("ar@acme.test"))
        .await?;

    let customer = &mutation.value;
    assert!(customer.active);
    assert_eq!(customer.contact_type, ContactType::Customer);
    assert_eq!(customer.balance, 0);
    assert_eq!(mutation.event.name(), "customers.onCreated");
    assert_eq!(
        mutation.event,
        DomainEvent::CustomerCreated {
            tenant_id: TENANT,
            customer_id: customer.id,
            opening_balance: None,
        }
    );

    let stored = ctx.service.customers.get_customer(TENANT, customer.id).await?;
    assert_eq!(stored.email.as_deref(), Some("ar@acme.test"));

    Ok(())
}

#[tokio::test]
async fn test_customer_payload_with_vendor_type_is_refused() -> Result<()> {
    let ctx = test_service().await?;

    let dto = CustomerDto {
        customer_type: Some(ContactType::Vendor),
        ..CustomerDto::new("Not a customer")
    };
    let result = ctx.service.customers.new_customer(TENANT, dto).await;

    assert!(matches!(result, Err(AppError::ContactTypeMismatch { .. })));
    Ok(())
}

#[tokio::test]
async fn test_edit_customer() -> Result<()> {
    let ctx = test_service().await?;
    let customer = Customers::create(&ctx, TENANT, "Acme").await?;

    let dto = CustomerDto::new("Acme Corp").with_active(false);
    let mutation = ctx
        .service
        .customers
        .edit_customer(TENANT, customer.id, dto)
        .await?;

    assert_eq!(mutation.value.display_name, "Acme Corp");
    assert!(!mutation.value.active);
    assert_eq!(mutation.event.name(), "customers.onEdited");

    let missing = ctx
        .service
        .customers
        .edit_customer(TENANT, customer.id + 100, CustomerDto::new("Ghost"))
        .await;
    assert!(matches!(missing, Err(AppError::NotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_delete_customer() -> Result<()> {
    let ctx = test_service().await?;
    let customer = Customers::create(&ctx, TENANT, "Acme").await?;

    let mutation = ctx.service.customers.delete_customer(TENANT, customer.id).await?;
    assert_eq!(
        mutation.event,
        DomainEvent::CustomerDeleted {
            tenant_id: TENANT,
            customer_id: customer.id,
        }
    );

    let result = ctx.service.customers.get_customer(TENANT, customer.id).await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_delete_missing_customer_is_not_found() -> Result<()> {
    let ctx = test_service().await?;

    let result = ctx.service.customers.delete_customer(TENANT, 999).await;
    match result {
        Err(AppError::NotFound { contact_type, ids }) => {
            assert_eq!(contact_type, ContactType::Customer);
            assert_eq!(ids, vec![999]);
        }
        other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
    }

    Ok(())
}

#[tokio::test]
async fn test_delete_customer_with_invoices_is_refused() -> Result<()> {
    let ctx = test_service().await?;
    let customer = Customers::create(&ctx, TENANT, "Acme").await?;
    Customers::invoice(&ctx, TENANT, customer.id, "INV-0001").await?;

    let err = ctx
        .service
        .customers
        .delete_customer(TENANT, customer.id)
        .await
        .unwrap_err();

    assert_eq!(err.dependents_code(), Some(DependentsCode::CustomerHasInvoices));
    assert_eq!(err.dependents_code().unwrap().as_str(), "customer_has_invoices");

    // Still there
    ctx.service.customers.get_customer(TENANT, customer.id).await?;
    Ok(())
}

#[tokio::test]
async fn test_bulk_delete_emits_one_event() -> Result<()> {
    let ctx = test_service().await?;
    let ids = Customers::create_many(&ctx, TENANT, &["A", "B", "C"]).await?;

    let mut requested = ids.clone();
    requested.push(ids[0]);
    let mutation = ctx
        .service
        .customers
        .delete_bulk_customers(TENANT, requested)
        .await?;

    assert_eq!(mutation.value, ids);
    assert_eq!(
        mutation.event,
        DomainEvent::CustomersBulkDeleted {
            tenant_id: TENANT,
            customer_ids: ids.clone(),
        }
    );

    let list = ctx
        .service
        .customers
        .get_customers_list(TENANT, &CustomersFilter::default())
        .await?;
    assert!(list.customers.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_bulk_delete_with_missing_id_deletes_nothing() -> Result<()> {
    let ctx = test_service().await?;
    let ids = Customers::create_many(&ctx, TENANT, &["A", "B"]).await?;

    let result = ctx
        .service
        .customers
        .delete_bulk_customers(TENANT, vec![ids[0], ids[1], 4242])
        .await;

    match result {
        Err(AppError::NotFound { ids: missing, .. }) => assert_eq!(missing, vec![4242]),
        other => panic!("expected NotFound, got {:?}", other.map(|m| m.value)),
    }

    let remaining = ctx.service.customers.get_customers(TENANT, ids).await?;
    assert_eq!(remaining.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_bulk_delete_with_invoices_deletes_nothing() -> Result<()> {
    let ctx = test_service().await?;
    let ids = Customers::create_many(&ctx, TENANT, &["A", "B", "C"]).await?;
    Customers::invoice(&ctx, TENANT, ids[1], "INV-0001").await?;

    let err = ctx
        .service
        .customers
        .delete_bulk_customers(TENANT, ids.clone())
        .await
        .unwrap_err();

    match err {
        AppError::HasDependents { code, ids: blocked } => {
            assert_eq!(code, DependentsCode::SomeCustomersHaveInvoices);
            assert_eq!(blocked, vec![ids[1]]);
        }
        other => panic!("expected HasDependents, got {other:?}"),
    }

    let remaining = ctx.service.customers.get_customers(TENANT, ids).await?;
    assert_eq!(remaining.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_empty_bulk_delete_is_a_no_op() -> Result<()> {
    let ctx = test_service().await?;
    Customers::create(&ctx, TENANT, "Keep me").await?;

    let mutation = ctx
        .service
        .customers
        .delete_bulk_customers(TENANT, Vec::<i64>::new())
        .await?;
    assert!(mutation.value.is_empty());

    let list = ctx
        .service
        .customers
        .get_customers_list(TENANT, &CustomersFilter::default())
        .await?;
    assert_eq!(list.customers.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_customers_are_tenant_scoped() -> Result<()> {
    let ctx = test_service().await?;
    let customer = Customers::create(&ctx, TENANT, "Acme").await?;
    Customers::create(&ctx, OTHER_TENANT, "Globex").await?;

    let result = ctx.service.customers.get_customer(OTHER_TENANT, customer.id).await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));

    let result = ctx.service.customers.delete_customer(OTHER_TENANT, customer.id).await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));

    let list = ctx
        .service
        .customers
        .get_customers_list(TENANT, &CustomersFilter::default())
        .await?;
    assert_eq!(list.customers.len(), 1);
    assert_eq!(list.customers[0].display_name, "Acme");
    Ok(())
}

#[tokio::test]
async fn test_vendors_are_not_customers() -> Result<()> {
    let ctx = test_service().await?;
    let contacts = ContactsService::new(ctx.repo.clone());
    let vendor = contacts
        .new_contact(
            TENANT,
            customer_to_contact_dto(CustomerDto::new("Supplier")),
            ContactType::Vendor,
        )
        .await?;
    Customers::create(&ctx, TENANT, "Acme").await?;

    let list = ctx
        .service
        .customers
        .get_customers_list(TENANT, &CustomersFilter::default())
        .await?;
    assert_eq!(list.customers.len(), 1);
    assert!(list.customers.iter().all(|c| c.is_customer()));

    let result = ctx.service.customers.delete_customer(TENANT, vendor.id).await;
    assert!(matches!(result, Err(AppError::NotFound { .. })));
    contacts.get_contact(TENANT, vendor.id, ContactType::Vendor).await?;

    Ok(())
}

#[tokio::test]
async fn test_list_pages_are_one_based_for_callers() -> Result<()> {
    let ctx = test_service().await?;
    let ids = Customers::create_many(&ctx, TENANT, &["A", "B", "C", "D", "E"]).await?;

    let list = ctx
        .service
        .customers
        .get_customers_list(TENANT, &CustomersFilter::page(2, 2))
        .await?;

    // Newest first: E, D | C, B | A
    let page: Vec<i64> = list.customers.iter().map(|c| c.id).collect();
    assert_eq!(page, vec![ids[2], ids[1]]);
    assert_eq!(list.pagination.page, 2);
    assert_eq!(list.pagination.page_size, 2);
    assert_eq!(list.pagination.total, 5);
    assert_eq!(list.pagination.total_pages, 3);
    assert!(!list.is_empty_status());

    let last = ctx
        .service
        .customers
        .get_customers_list(TENANT, &CustomersFilter::page(3, 2))
        .await?;
    assert_eq!(last.customers.len(), 1);
    assert_eq!(last.customers[0].id, ids[0]);

    Ok(())
}

#[tokio::test]
async fn test_list_sorting() -> Result<()> {
    let ctx = test_service().await?;
    Customers::create_many(&ctx, TENANT, &["Charlie", "alpha", "Bravo"]).await?;

    let filter = CustomersFilter::default().sorted_by("display_name", SortOrder::Asc);
    let list = ctx.service.customers.get_customers_list(TENANT, &filter).await?;
    let names: Vec<&str> = list.customers.iter().map(|c| c.display_name.as_str()).collect();

    // SQLite's default collation is binary
    assert_eq!(names, vec!["Bravo", "Charlie", "alpha"]);
    assert_eq!(list.filter_meta.column_sort_by, "display_name");
    assert_eq!(list.filter_meta.sort_order, SortOrder::Asc);
    Ok(())
}

#[tokio::test]
async fn test_list_filters_and_meta() -> Result<()> {
    let ctx = test_service().await?;
    let svc = &ctx.service.customers;
    svc.new_customer(TENANT, CustomerDto::new("Acme").with_email("ar@acme.test"))
        .await?;
    svc.new_customer(TENANT, CustomerDto::new("Globex")).await?;
    svc.new_customer(TENANT, CustomerDto::new("Initech").with_email("pay@initech.test"))
        .await?;

    let filter = CustomersFilter::default()
        .with_role(FilterRole::new("email", Comparator::Contains, "acme"))
        .with_role(FilterRole::new("display_name", Comparator::Equals, "Initech").or())
        .with_role(FilterRole::new("favourite_color", Comparator::Equals, "red"));
    let list = svc.get_customers_list(TENANT, &filter).await?;

    let mut names: Vec<&str> = list.customers.iter().map(|c| c.display_name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["Acme", "Initech"]);
    assert_eq!(list.filter_meta.filter_roles.len(), 2);
    assert!(
        list.filter_meta
            .filter_roles
            .iter()
            .all(|r| r.field_key != "favourite_color")
    );

    let filter = CustomersFilter::default()
        .with_role(FilterRole {
            field_key: "email".into(),
            comparator: Comparator::Empty,
            value: None,
            condition: Default::default(),
        });
    let list = svc.get_customers_list(TENANT, &filter).await?;
    assert_eq!(list.customers.len(), 1);
    assert_eq!(list.customers[0].display_name, "Globex");

    Ok(())
}

#[tokio::test]
async fn test_search_keyword_and_inactive_mode() -> Result<()> {
    let ctx = test_service().await?;
    let svc = &ctx.service.customers;
    svc.new_customer(TENANT, CustomerDto::new("Acme North")).await?;
    svc.new_customer(TENANT, CustomerDto::new("Acme South").with_active(false))
        .await?;
    svc.new_customer(TENANT, CustomerDto::new("Globex")).await?;

    let list = svc
        .get_customers_list(TENANT, &CustomersFilter::default().with_keyword("acme"))
        .await?;
    assert_eq!(list.customers.len(), 1);
    assert_eq!(list.customers[0].display_name, "Acme North");
    assert_eq!(list.filter_meta.search_keyword.as_deref(), Some("acme"));

    let list = svc
        .get_customers_list(
            TENANT,
            &CustomersFilter::default().with_keyword("acme").including_inactive(),
        )
        .await?;
    assert_eq!(list.customers.len(), 2);
    assert!(list.filter_meta.inactive_mode);

    Ok(())
}

#[tokio::test]
async fn test_empty_status_on_fresh_tenant() -> Result<()> {
    let ctx = test_service().await?;

    let list = ctx
        .service
        .customers
        .get_customers_list(TENANT, &CustomersFilter::default())
        .await?;
    assert!(list.is_empty_status());
    assert_eq!(list.pagination.total, 0);

    let filtered = ctx
        .service
        .customers
        .get_customers_list(TENANT, &CustomersFilter::default().with_keyword("x"))
        .await?;
    assert!(!filtered.is_empty_status());
    Ok(())
}

#[tokio::test]
async fn test_customer_view_formats_balances() -> Result<()> {
    let ctx = test_service().await?;
    let dto = CustomerDto {
        currency_code: Some("EUR".into()),
        ..CustomerDto::new("Acme").with_opening_balance(12050, common::parse_date("2024-01-05"))
    };
    let mutation = ctx.service.customers.new_customer(TENANT, dto).await?;
    let customer = ctx.service.events.deliver(mutation).await?;

    let view = ctx.service.customers.get_customer_view(TENANT, customer.id).await?;
    assert_eq!(view.formatted_balance.as_deref(), Some("EUR 120.50"));
    assert_eq!(view.formatted_opening_balance.as_deref(), Some("EUR 120.50"));
    assert_eq!(view.formatted_opening_balance_at.as_deref(), Some("2024 Jan 05"));
    Ok(())
}

#[tokio::test]
async fn test_invoices_require_an_existing_customer() -> Result<()> {
    let ctx = test_service().await?;
    let customer = Customers::create(&ctx, TENANT, "Acme").await?;
    Customers::invoice(&ctx, TENANT, customer.id, "INV-0001").await?;

    let invoices = ctx.service.customers.sales_invoices(TENANT, customer.id).await?;
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0].invoice_no, "INV-0001");

    let result = Customers::invoice(&ctx, TENANT, 777, "INV-0002").await;
    assert!(result.is_err());
    Ok(())
}

#[tokio::test]
async fn test_search_matches_wildcard_characters_literally() -> Result<()> {
    let ctx = test_service().await?;
    Customers::create_many(
        &ctx,
        TENANT,
        &["Acme", "Globex", "Initech", "50% Off Ltd", "snake_case Co"],
    )
    .await?;
    let svc = &ctx.service.customers;

    let list = svc
        .get_customers_list(TENANT, &CustomersFilter::default().with_keyword("%"))
        .await?;
    assert_eq!(list.customers.len(), 1);
    assert_eq!(list.customers[0].display_name, "50% Off Ltd");

    let list = svc
        .get_customers_list(TENANT, &CustomersFilter::default().with_keyword("_"))
        .await?;
    assert_eq!(list.customers.len(), 1);
    assert_eq!(list.customers[0].display_name, "snake_case Co");

    let filter = CustomersFilter::default()
        .with_role(FilterRole::new("display_name", Comparator::Contains, "_"));
    let list = svc.get_customers_list(TENANT, &filter).await?;
    assert_eq!(list.customers.len(), 1);

    let filter = CustomersFilter::default()
        .with_role(FilterRole::new("display_name", Comparator::NotContains, "%"));
    let list = svc.get_customers_list(TENANT, &filter).await?;
    assert_eq!(list.customers.len(), 4);

    Ok(())
}
