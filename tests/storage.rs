use stockroom::error::StoreError;
use stockroom::persist::{Cmp, Filter, SortOrder, Store};
use stockroom::schema::Values;

fn tour(name: &str, price: i64) -> Values {
    Values::new()
        .with("name", name)
        .with("category", "culture")
        .with("price", price)
        .with("supplier_name", "Acme")
        .with("supplier_email", "a@x.com")
}

#[test]
fn schema_creation_is_idempotent() {
    let store = Store::open_in_memory().unwrap();
    store.ensure_schema().unwrap();
    store.ensure_schema().unwrap();
    store.insert(&tour("Tour A", 100)).unwrap();
    assert_eq!(store.query(&Filter::all(), None, None).unwrap().len(), 1);
}

#[test]
fn file_mode_persists_across_reopen() {
    let path = "test_stockroom_temp.db".to_string();
    // Ensure clean start
    let _ = std::fs::remove_file(&path);
    {
        let store = Store::open(&path).expect("store");
        store.insert(&tour("Tour A", 100)).unwrap();
    }
    {
        let store = Store::open(&path).expect("store");
        let records = store.query_records(&Filter::all(), None).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Tour A");
    }
    // Clean up
    let _ = std::fs::remove_file(&path);
}

#[test]
fn defaults_apply_to_omitted_columns() {
    let store = Store::open_in_memory().unwrap();
    store.insert(&tour("Tour A", 100)).unwrap();
    let records = store.query_records(&Filter::all(), None).unwrap();
    let record = &records[0];
    assert_eq!(record.description, None);
    assert_eq!(record.quantity, 0);
    assert_eq!(record.reorder_quantity, 1);
}

#[test]
fn range_filters_and_ordering() {
    let store = Store::open_in_memory().unwrap();
    store.insert(&tour("Cheap", 100)).unwrap();
    store.insert(&tour("Mid", 200)).unwrap();
    store.insert(&tour("Dear", 300)).unwrap();

    let filter = Filter::all().and("price", Cmp::Ge, 200);
    let records = store
        .query_records(&filter, Some(&SortOrder::descending("price")))
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Dear");
    assert_eq!(records[1].name, "Mid");

    let none = Filter::all().and("price", Cmp::Lt, 100);
    assert!(store.query_records(&none, None).unwrap().is_empty());
}

#[test]
fn update_merges_only_supplied_columns() {
    let store = Store::open_in_memory().unwrap();
    let id = store.insert(&tour("Tour A", 100)).unwrap();
    let count = store
        .update(&Filter::id(id), &Values::new().with("quantity", 9))
        .unwrap();
    assert_eq!(count, 1);
    let records = store.query_records(&Filter::id(id), None).unwrap();
    let record = &records[0];
    assert_eq!(record.quantity, 9);
    assert_eq!(record.name, "Tour A");
    assert_eq!(record.price, 100);
}

#[test]
fn zero_row_outcomes_are_not_errors() {
    let store = Store::open_in_memory().unwrap();
    let absent = Filter::id(12345);
    assert_eq!(store.update(&absent, &Values::new().with("quantity", 1)).unwrap(), 0);
    assert_eq!(store.update(&absent, &Values::new()).unwrap(), 0);
    assert_eq!(store.delete(&absent).unwrap(), 0);
}

#[test]
fn constraint_violations_surface_as_write_failures() {
    let store = Store::open_in_memory().unwrap();
    let nameless = Values::new().with("description", "no name at all");
    match store.insert(&nameless) {
        Err(StoreError::StorageWriteFailed(_)) => {}
        other => panic!("expected StorageWriteFailed, got {other:?}"),
    }
}

#[test]
fn unknown_columns_are_rejected_everywhere() {
    let store = Store::open_in_memory().unwrap();
    let unknown = Filter::all().and("colour", Cmp::Eq, "red");
    assert!(matches!(
        store.query(&unknown, None, None),
        Err(StoreError::UnknownColumn(_))
    ));
    assert!(matches!(
        store.query(&Filter::all(), Some(&["colour"]), None),
        Err(StoreError::UnknownColumn(_))
    ));
    assert!(matches!(
        store.query(&Filter::all(), None, Some(&SortOrder::ascending("colour"))),
        Err(StoreError::UnknownColumn(_))
    ));
    assert!(matches!(
        store.delete(&unknown),
        Err(StoreError::UnknownColumn(_))
    ));
}
