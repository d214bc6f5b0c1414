use std::sync::Arc;

use stockroom::error::StoreError;
use stockroom::notify::ChangeHub;
use stockroom::persist::{Filter, Store};
use stockroom::provider::InventoryProvider;
use stockroom::router::{Router, Target};
use stockroom::schema::Values;

const AUTHORITY: &str = "net.stockroom.local";
const PRODUCTS: &str = "res://net.stockroom.local/products";

fn setup() -> InventoryProvider {
    let store = Store::open_in_memory().unwrap();
    let router = Router::new(AUTHORITY).unwrap();
    InventoryProvider::new(router, store, Arc::new(ChangeHub::new()))
}

fn tour(name: &str) -> Values {
    Values::new()
        .with("name", name)
        .with("category", "culture")
        .with("price", 2500)
        .with("supplier_name", "Acme")
        .with("supplier_email", "a@x.com")
}

#[test]
fn classification() {
    let router = Router::new(AUTHORITY).unwrap();
    assert_eq!(router.classify(PRODUCTS).unwrap(), Target::Collection);
    assert_eq!(
        router.classify("res://net.stockroom.local/products/17").unwrap(),
        Target::Item(17)
    );
}

#[test]
fn unrecognized_identifiers() {
    let router = Router::new(AUTHORITY).unwrap();
    let bad = [
        "res://other.authority/products",
        "res://net.stockroom.local/warehouses",
        "res://net.stockroom.local/products/seventeen",
        "res://net.stockroom.local/products/17/name",
        "net.stockroom.local/products",
        "res://net.stockroom.local/products/99999999999999999999",
    ];
    for identifier in bad {
        match router.classify(identifier) {
            Err(StoreError::UnrecognizedIdentifier(id)) => assert_eq!(id, identifier),
            other => panic!("expected UnrecognizedIdentifier for {identifier}, got {other:?}"),
        }
    }
}

#[test]
fn type_tags() {
    let provider = setup();
    assert_eq!(
        provider.type_of(PRODUCTS).unwrap(),
        "vnd.stockroom.dir/net.stockroom.local/products"
    );
    assert_eq!(
        provider.type_of("res://net.stockroom.local/products/3").unwrap(),
        "vnd.stockroom.item/net.stockroom.local/products"
    );
    assert!(matches!(
        provider.type_of("res://elsewhere/products"),
        Err(StoreError::UnrecognizedIdentifier(_))
    ));
}

#[test]
fn insert_against_an_item_identifier_is_unsupported() {
    let provider = setup();
    let item = provider.router().item_identifier(1);
    match provider.insert(&item, &tour("Tour A")) {
        Err(StoreError::UnsupportedOperation(_)) => {}
        other => panic!("expected UnsupportedOperation, got {other:?}"),
    }
}

#[test]
fn operations_against_unrecognized_identifiers_fail_fast() {
    let provider = setup();
    let bogus = "res://elsewhere/products";
    assert!(matches!(
        provider.query(bogus, None, &Filter::all(), None),
        Err(StoreError::UnrecognizedIdentifier(_))
    ));
    assert!(matches!(
        provider.insert(bogus, &tour("Tour A")),
        Err(StoreError::UnrecognizedIdentifier(_))
    ));
    assert!(matches!(
        provider.update(bogus, &Values::new().with("quantity", 1), &Filter::all()),
        Err(StoreError::UnrecognizedIdentifier(_))
    ));
    assert!(matches!(
        provider.delete(bogus, &Filter::all()),
        Err(StoreError::UnrecognizedIdentifier(_))
    ));
}

#[test]
fn item_writes_touch_only_their_own_row() {
    let provider = setup();
    provider.insert(PRODUCTS, &tour("Tour A")).unwrap();
    provider.insert(PRODUCTS, &tour("Tour B")).unwrap();

    let first = provider.router().item_identifier(1);
    provider
        .update(&first, &Values::new().with("name", "Tour A+"), &Filter::all())
        .unwrap();

    let records = provider
        .query(PRODUCTS, None, &Filter::all(), None)
        .unwrap()
        .records()
        .unwrap();
    assert_eq!(records[0].name, "Tour A+");
    assert_eq!(records[1].name, "Tour B");
}

#[test]
fn snapshot_remembers_its_identifier() {
    let provider = setup();
    provider.insert(PRODUCTS, &tour("Tour A")).unwrap();
    let item = provider.router().item_identifier(1);
    let snapshot = provider.query(&item, None, &Filter::all(), None).unwrap();
    assert_eq!(snapshot.identifier(), item);
    assert_eq!(snapshot.target(), Target::Item(1));
}
