//! Integration tests for cart mutations and stock validation.
//!
//! The store is exercised against in-memory fakes of its collaborators; no
//! catalog server or filesystem is involved.

use std::sync::Arc;

use stride_cart::{
    CART_STORAGE_KEY, CartError, CartStorage, CartStore, MemoryNotifier, MemoryStorage,
};
use stride_core::ProductId;

use stride_integration_tests::FakeCatalog;

/// Wire a store to a fresh catalog, storage, and notifier.
fn store_with(
    catalog: FakeCatalog,
) -> (
    CartStore,
    Arc<FakeCatalog>,
    Arc<MemoryStorage>,
    Arc<MemoryNotifier>,
) {
    let catalog = Arc::new(catalog);
    let storage = Arc::new(MemoryStorage::new());
    let notifier = Arc::new(MemoryNotifier::new());
    let store = CartStore::new(catalog.clone(), storage.clone(), notifier.clone())
        .expect("store construction");
    (store, catalog, storage, notifier)
}

fn stored_blob(storage: &MemoryStorage) -> Option<String> {
    storage.get(CART_STORAGE_KEY).expect("storage read")
}

// =============================================================================
// add_product
// =============================================================================

#[tokio::test]
async fn test_add_to_empty_cart_appends_entry_with_quantity_one() {
    let (store, _, _, notifier) =
        store_with(FakeCatalog::new().with_product(1, "Trail Runner XT", 17990, 5));

    store.add_product(ProductId::new(1)).await.expect("add");

    let cart = store.cart();
    assert_eq!(cart.len(), 1);
    let item = cart.first().expect("entry");
    assert_eq!(item.id, ProductId::new(1));
    assert_eq!(item.title, "Trail Runner XT");
    assert_eq!(item.amount, 1);
    assert!(notifier.messages().is_empty(), "no notification on success");
}

#[tokio::test]
async fn test_add_existing_product_increments_in_place() {
    let (store, catalog, _, _) = store_with(
        FakeCatalog::new()
            .with_product(1, "Trail Runner XT", 17990, 5)
            .with_product(2, "Court Classic", 12990, 5),
    );

    store.add_product(ProductId::new(1)).await.expect("add");
    store.add_product(ProductId::new(2)).await.expect("add");
    let product_fetches = catalog.product_calls();

    store.add_product(ProductId::new(1)).await.expect("add");

    let cart = store.cart();
    let ids: Vec<_> = cart.iter().map(|item| item.id.as_i64()).collect();
    assert_eq!(ids, vec![1, 2], "position unchanged on increment");
    assert_eq!(cart.first().expect("entry").amount, 2);
    assert_eq!(cart.get(1).expect("entry").amount, 1, "other entry untouched");
    assert_eq!(
        catalog.product_calls(),
        product_fetches,
        "increment path needs no product fetch"
    );
}

#[tokio::test]
async fn test_add_beyond_stock_leaves_cart_and_blob_unchanged() {
    let (store, _, storage, notifier) =
        store_with(FakeCatalog::new().with_product(1, "Trail Runner XT", 17990, 1));

    store.add_product(ProductId::new(1)).await.expect("add");
    let cart_before = store.cart();
    let blob_before = stored_blob(&storage);

    let result = store.add_product(ProductId::new(1)).await;

    assert!(matches!(result, Err(CartError::StockExceeded { .. })));
    assert_eq!(store.cart(), cart_before);
    assert_eq!(stored_blob(&storage), blob_before, "no persistence write");
    assert_eq!(
        notifier.messages(),
        vec!["Requested quantity is out of stock"]
    );
}

#[tokio::test]
async fn test_add_validates_against_live_stock() {
    let (store, catalog, _, _) =
        store_with(FakeCatalog::new().with_product(1, "Trail Runner XT", 17990, 1));

    store.add_product(ProductId::new(1)).await.expect("add");

    // Upstream restock between operations must be observed.
    catalog.set_stock(1, 2);
    store.add_product(ProductId::new(1)).await.expect("add");

    assert_eq!(store.cart().first().expect("entry").amount, 2);
}

#[tokio::test]
async fn test_add_unknown_product_reports_generic_failure() {
    let (store, _, storage, notifier) = store_with(FakeCatalog::new());

    let result = store.add_product(ProductId::new(99)).await;

    assert!(matches!(result, Err(CartError::Catalog(_))));
    assert!(store.cart().is_empty());
    assert!(stored_blob(&storage).is_none(), "no persistence write");
    assert_eq!(notifier.messages(), vec!["Error adding product"]);
}

#[tokio::test]
async fn test_add_upstream_failure_reports_generic_failure() {
    let (store, catalog, _, notifier) =
        store_with(FakeCatalog::new().with_product(1, "Trail Runner XT", 17990, 5));
    catalog.fail_upstream();

    let result = store.add_product(ProductId::new(1)).await;

    assert!(matches!(result, Err(CartError::Catalog(_))));
    assert!(store.cart().is_empty());
    assert_eq!(notifier.messages(), vec!["Error adding product"]);
}

// =============================================================================
// remove_product
// =============================================================================

#[tokio::test]
async fn test_remove_deletes_exactly_one_entry_preserving_order() {
    let (store, _, _, _) = store_with(
        FakeCatalog::new()
            .with_product(1, "Trail Runner XT", 17990, 5)
            .with_product(2, "Court Classic", 12990, 5)
            .with_product(3, "Street Glide", 9990, 5),
    );
    for id in [1, 2, 3] {
        store.add_product(ProductId::new(id)).await.expect("add");
    }

    store.remove_product(ProductId::new(2)).await.expect("remove");

    let ids: Vec<_> = store.cart().iter().map(|item| item.id.as_i64()).collect();
    assert_eq!(ids, vec![1, 3]);
}

#[tokio::test]
async fn test_remove_works_with_unreachable_catalog() {
    let (store, catalog, _, _) =
        store_with(FakeCatalog::new().with_product(1, "Trail Runner XT", 17990, 5));
    store.add_product(ProductId::new(1)).await.expect("add");

    // Removal requires no lookups, so a dead catalog is irrelevant.
    catalog.fail_upstream();
    store.remove_product(ProductId::new(1)).await.expect("remove");

    assert!(store.cart().is_empty());
}

#[tokio::test]
async fn test_remove_absent_product_signals_failure() {
    let (store, _, storage, notifier) =
        store_with(FakeCatalog::new().with_product(1, "Trail Runner XT", 17990, 5));
    store.add_product(ProductId::new(1)).await.expect("add");
    let cart_before = store.cart();
    let blob_before = stored_blob(&storage);

    let result = store.remove_product(ProductId::new(42)).await;

    assert!(matches!(
        result,
        Err(CartError::ProductNotFound(id)) if id == ProductId::new(42)
    ));
    assert_eq!(store.cart(), cart_before);
    assert_eq!(stored_blob(&storage), blob_before);
    assert_eq!(notifier.messages(), vec!["Error removing product"]);
}

#[tokio::test]
async fn test_remove_clears_last_entry() {
    let (store, _, _, _) =
        store_with(FakeCatalog::new().with_product(1, "Trail Runner XT", 17990, 5));
    store.add_product(ProductId::new(1)).await.expect("add");
    store.add_product(ProductId::new(1)).await.expect("add");

    store.remove_product(ProductId::new(1)).await.expect("remove");

    assert!(store.cart().is_empty(), "entry removed regardless of quantity");
}

// =============================================================================
// update_product_amount
// =============================================================================

#[tokio::test]
async fn test_update_sets_exact_amount_within_stock() {
    let (store, _, _, _) =
        store_with(FakeCatalog::new().with_product(1, "Trail Runner XT", 17990, 10));
    store.add_product(ProductId::new(1)).await.expect("add");

    store
        .update_product_amount(ProductId::new(1), 7)
        .await
        .expect("update");

    assert_eq!(store.cart().first().expect("entry").amount, 7);
}

#[tokio::test]
async fn test_update_to_zero_is_rejected_before_any_lookup() {
    let (store, catalog, storage, notifier) =
        store_with(FakeCatalog::new().with_product(1, "Trail Runner XT", 17990, 10));
    store.add_product(ProductId::new(1)).await.expect("add");
    let cart_before = store.cart();
    let blob_before = stored_blob(&storage);
    let stock_lookups = catalog.stock_calls();

    let result = store.update_product_amount(ProductId::new(1), 0).await;

    assert!(matches!(result, Err(CartError::InvalidAmount(0))));
    assert_eq!(store.cart(), cart_before);
    assert_eq!(stored_blob(&storage), blob_before);
    assert_eq!(catalog.stock_calls(), stock_lookups, "precondition short-circuits");
    assert_eq!(notifier.messages(), vec!["Error updating product quantity"]);
}

#[tokio::test]
async fn test_update_beyond_stock_is_rejected() {
    let (store, _, _, notifier) =
        store_with(FakeCatalog::new().with_product(1, "Trail Runner XT", 17990, 3));
    store.add_product(ProductId::new(1)).await.expect("add");

    let result = store.update_product_amount(ProductId::new(1), 4).await;

    assert!(matches!(
        result,
        Err(CartError::StockExceeded {
            requested: 4,
            available: 3,
            ..
        })
    ));
    assert_eq!(store.cart().first().expect("entry").amount, 1);
    assert_eq!(
        notifier.messages(),
        vec!["Requested quantity is out of stock"]
    );
}

#[tokio::test]
async fn test_update_absent_product_never_creates_an_entry() {
    let (store, _, _, notifier) =
        store_with(FakeCatalog::new().with_product(1, "Trail Runner XT", 17990, 10));

    let result = store.update_product_amount(ProductId::new(1), 2).await;

    assert!(matches!(result, Err(CartError::ProductNotFound(_))));
    assert!(store.cart().is_empty());
    assert_eq!(notifier.messages(), vec!["Error updating product quantity"]);
}

// =============================================================================
// Notification contract
// =============================================================================

#[tokio::test]
async fn test_each_failed_operation_notifies_exactly_once() {
    let (store, _, _, notifier) =
        store_with(FakeCatalog::new().with_product(1, "Trail Runner XT", 17990, 0));

    let _ = store.add_product(ProductId::new(1)).await;
    let _ = store.remove_product(ProductId::new(1)).await;
    let _ = store.update_product_amount(ProductId::new(1), 0).await;

    assert_eq!(
        notifier.messages(),
        vec![
            "Requested quantity is out of stock",
            "Error removing product",
            "Error updating product quantity",
        ]
    );
}
