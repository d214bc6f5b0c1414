use std::sync::Arc;

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
fn insert_notifies_collection_observers() {
    let provider = setup();
    let events = provider.hub().subscribe(Target::Collection);
    provider.insert(PRODUCTS, &tour("Tour A")).unwrap();

    let event = events.try_recv().unwrap();
    assert_eq!(event.target, Target::Collection);
    assert_eq!(event.identifier, PRODUCTS);
    assert!(events.try_recv().is_err());
}

#[test]
fn item_update_notifies_exactly_that_item() {
    let provider = setup();
    provider.insert(PRODUCTS, &tour("Tour A")).unwrap();
    let item = provider.router().item_identifier(1);

    let item_events = provider.hub().subscribe(Target::Item(1));
    let other_item_events = provider.hub().subscribe(Target::Item(2));
    let collection_events = provider.hub().subscribe(Target::Collection);

    let count = provider
        .update(&item, &Values::new().with("quantity", 5), &Filter::all())
        .unwrap();
    assert_eq!(count, 1);

    let event = item_events.try_recv().unwrap();
    assert_eq!(event.target, Target::Item(1));
    assert_eq!(event.identifier, item);

    // Scoping is by the exact identifier written; neither the collection
    // nor a different item hears about it.
    assert!(other_item_events.try_recv().is_err());
    assert!(collection_events.try_recv().is_err());
}

#[test]
fn empty_update_publishes_nothing() {
    let provider = setup();
    provider.insert(PRODUCTS, &tour("Tour A")).unwrap();
    let item = provider.router().item_identifier(1);
    let events = provider.hub().subscribe(Target::Item(1));

    assert_eq!(provider.update(&item, &Values::new(), &Filter::all()).unwrap(), 0);
    assert!(events.try_recv().is_err());
}

#[test]
fn ineffective_mutations_publish_nothing() {
    let provider = setup();
    let missing = provider.router().item_identifier(99);
    let events = provider.hub().subscribe(Target::Item(99));

    let count = provider
        .update(&missing, &Values::new().with("quantity", 5), &Filter::all())
        .unwrap();
    assert_eq!(count, 0);
    assert_eq!(provider.delete(&missing, &Filter::all()).unwrap(), 0);
    assert!(events.try_recv().is_err());
}

#[test]
fn delete_notifies_once_per_effective_call() {
    let provider = setup();
    provider.insert(PRODUCTS, &tour("Tour A")).unwrap();
    let item = provider.router().item_identifier(1);
    let events = provider.hub().subscribe(Target::Item(1));

    assert_eq!(provider.delete(&item, &Filter::all()).unwrap(), 1);
    assert!(events.try_recv().is_ok());

    // The second delete matches nothing and stays silent.
    assert_eq!(provider.delete(&item, &Filter::all()).unwrap(), 0);
    assert!(events.try_recv().is_err());
}

#[test]
fn gone_observers_are_pruned_on_publish() {
    let hub = ChangeHub::new();
    let kept = hub.subscribe(Target::Collection);
    let dropped = hub.subscribe(Target::Collection);
    drop(dropped);
    assert_eq!(hub.observer_count(Target::Collection), 2);

    hub.publish(Target::Collection, PRODUCTS);
    assert_eq!(hub.observer_count(Target::Collection), 1);
    assert!(kept.try_recv().is_ok());

    // Publishing with no observers at all is not an error.
    hub.publish(Target::Item(7), PRODUCTS);
}
