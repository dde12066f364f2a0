//! Repository contract checks shared by every backend's integration tests.
//!
//! Each check takes a fresh customer id so backends with shared state
//! (a real database) don't see each other's rows.

#![allow(dead_code)]

use servicebay_core::{CustomerId, LineItemId, Page, QuoteId, VehicleId};
use servicebay_quotes::{
    CreateInput, CreateLineItem, LineItem, Quote, QuoteError, QuoteRepository, QuoteService,
    QuoteStatus,
};

pub fn unique_customer(label: &str) -> CustomerId {
    CustomerId::new(format!("{label}-{}", CustomerId::generate()))
}

pub fn brake_job(customer_id: &CustomerId) -> CreateInput {
    CreateInput {
        customer_id: customer_id.clone(),
        vehicle_id: VehicleId::new("veh-1"),
        line_items: vec![
            CreateLineItem {
                description: "Brake Pads".to_string(),
                quantity: 1,
                unit_price: 15000,
                labor_hours: 1.5,
            },
            CreateLineItem {
                description: "Rotor".to_string(),
                quantity: 2,
                unit_price: 10000,
                labor_hours: 2.0,
            },
        ],
    }
}

pub fn line(description: &str, quantity: u32, unit_price: i64) -> LineItem {
    LineItem {
        id: LineItemId::unassigned(),
        quote_id: QuoteId::unassigned(),
        description: description.to_string(),
        quantity,
        unit_price,
        labor_hours: 0.25,
        sort_order: 0,
    }
}

/// Create through the service, fetch it back, list it for the customer.
pub fn create_then_get_and_list<R: QuoteRepository>(repo: R) {
    let customer = unique_customer("flow");
    let svc = QuoteService::new(repo);

    let created = svc.create(brake_job(&customer)).unwrap();
    assert_eq!(created.status, QuoteStatus::Draft);
    assert_eq!(created.total_amount, 35000);
    assert_eq!(created.id.as_str().len(), 32);

    let fetched = svc.get(&created.id).unwrap();
    assert_eq!(fetched, created);
    let descriptions: Vec<&str> = fetched
        .line_items
        .iter()
        .map(|li| li.description.as_str())
        .collect();
    assert_eq!(descriptions, vec!["Brake Pads", "Rotor"]);

    let listed = svc.list_for_customer(&customer, Page::new(0, 10)).unwrap();
    assert_eq!(listed, vec![created]);
}

/// Saving new line items replaces the old set instead of merging.
pub fn update_replaces_line_items<R: QuoteRepository>(repo: R) {
    let customer = unique_customer("replace");
    let svc = QuoteService::new(repo);
    let created = svc.create(brake_job(&customer)).unwrap();

    let mut edited = created.clone();
    edited.line_items = vec![line("Oil Change", 1, 4999), line("Filter", 1, 1500), line("Wipers", 2, 900)];
    let saved = svc.repository().save(edited).unwrap();

    let fetched = svc.get(&created.id).unwrap();
    assert_eq!(fetched, saved);
    assert_eq!(fetched.created_at, created.created_at);
    assert!(fetched.updated_at > created.updated_at);
    let descriptions: Vec<&str> = fetched
        .line_items
        .iter()
        .map(|li| li.description.as_str())
        .collect();
    assert_eq!(descriptions, vec!["Oil Change", "Filter", "Wipers"]);
    for (idx, li) in fetched.line_items.iter().enumerate() {
        assert_eq!(li.sort_order as usize, idx);
        assert_eq!(li.quote_id, created.id);
    }
    // Total is frozen at creation.
    assert_eq!(fetched.total_amount, 35000);
}

/// Status updates touch nothing but status and `updated_at`.
pub fn status_update_preserves_everything_else<R: QuoteRepository>(repo: R) {
    let customer = unique_customer("status");
    let svc = QuoteService::new(repo);
    let created = svc.create(brake_job(&customer)).unwrap();

    let sent = svc.update_status(&created.id, QuoteStatus::Sent).unwrap();
    let sent_again = svc.update_status(&created.id, QuoteStatus::Sent).unwrap();

    assert!(sent.updated_at > created.updated_at);
    assert!(sent_again.updated_at > sent.updated_at);
    for quote in [&sent, &sent_again] {
        assert_eq!(quote.status, QuoteStatus::Sent);
        assert_eq!(quote.total_amount, created.total_amount);
        assert_eq!(quote.line_items.len(), created.line_items.len());
        assert_eq!(quote.created_at, created.created_at);
    }
    assert_eq!(svc.get(&created.id).unwrap().status, QuoteStatus::Sent);
}

/// Updating an id that was never stored is `NotFound` and stores nothing.
pub fn stale_update_is_not_found<R: QuoteRepository>(repo: R) {
    let customer = unique_customer("stale");
    let mut ghost = Quote::draft(customer.clone(), VehicleId::new("veh-1"));
    ghost.id = QuoteId::generate();
    ghost.line_items = vec![line("Spark Plugs", 4, 800)];

    assert_eq!(repo.save(ghost.clone()), Err(QuoteError::NotFound));
    assert_eq!(repo.find_by_id(&ghost.id), Err(QuoteError::NotFound));
    assert!(repo.list_by_customer(&customer, Page::all()).unwrap().is_empty());
}

/// Zero-quantity line items are `Invalid` on insert and update alike, and
/// leave the store as it was.
pub fn zero_quantity_is_invalid<R: QuoteRepository>(repo: R) {
    let customer = unique_customer("zero-qty");

    let mut draft = Quote::draft(customer.clone(), VehicleId::new("veh-1"));
    draft.line_items = vec![line("Valid", 1, 100), line("Empty", 0, 100)];
    assert!(matches!(repo.save(draft), Err(QuoteError::Invalid(_))));
    assert!(repo.list_by_customer(&customer, Page::all()).unwrap().is_empty());

    let svc = QuoteService::new(&repo);
    let mut input = brake_job(&customer);
    input.line_items[0].quantity = 0;
    assert!(matches!(svc.create(input), Err(QuoteError::Invalid(_))));

    let stored = svc.create(brake_job(&customer)).unwrap();
    let mut edited = stored.clone();
    edited.line_items = vec![line("Empty", 0, 100)];
    assert!(matches!(repo.save(edited), Err(QuoteError::Invalid(_))));
    assert_eq!(repo.find_by_id(&stored.id).unwrap(), stored);
    assert_eq!(repo.list_by_customer(&customer, Page::all()).unwrap(), vec![stored]);
}

pub fn missing_quote_is_not_found<R: QuoteRepository>(repo: R) {
    assert_eq!(
        repo.find_by_id(&QuoteId::generate()),
        Err(QuoteError::NotFound)
    );
}

/// Listing is oldest first and windows correctly.
pub fn listing_is_ordered_and_paged<R: QuoteRepository>(repo: R) {
    let customer = unique_customer("paging");
    let other = unique_customer("paging-other");
    let svc = QuoteService::new(repo);

    let mut created = Vec::new();
    for _ in 0..5 {
        created.push(svc.create(brake_job(&customer)).unwrap());
    }
    svc.create(brake_job(&other)).unwrap();

    let all = svc.list_for_customer(&customer, Page::all()).unwrap();
    assert_eq!(all.len(), 5);
    for pair in all.windows(2) {
        assert!(
            (pair[0].created_at, &pair[0].id) <= (pair[1].created_at, &pair[1].id),
            "listing must be created_at ASC, id ASC"
        );
    }
    let mut expected_ids: Vec<QuoteId> = created.iter().map(|q| q.id.clone()).collect();
    expected_ids.sort();
    let mut listed_ids: Vec<QuoteId> = all.iter().map(|q| q.id.clone()).collect();
    listed_ids.sort();
    assert_eq!(listed_ids, expected_ids);

    let window = svc.list_for_customer(&customer, Page::new(1, 2)).unwrap();
    assert_eq!(window, all[1..3].to_vec());

    let tail = svc.list_for_customer(&customer, Page::new(4, 10)).unwrap();
    assert_eq!(tail, all[4..].to_vec());

    assert!(svc.list_for_customer(&customer, Page::new(5, 10)).unwrap().is_empty());
    assert_eq!(svc.list_for_customer(&customer, Page::new(-3, 0)).unwrap(), all);
}
