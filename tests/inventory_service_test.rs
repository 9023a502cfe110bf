mod common;

use assert_matches::assert_matches;
use common::{ledger_row, maybe_ledger_row, seed_stock, setup, tenant};
use stockflow_api::{
    errors::ServiceError,
    services::inventory::{InventoryService, StockKey},
};
use uuid::Uuid;

#[tokio::test]
async fn receive_creates_and_accumulates_stock() {
    let app = setup().await;
    let ctx = tenant();
    let item = Uuid::new_v4();
    let location = Uuid::new_v4();
    let key = StockKey::new(ctx.tenant_id, item, location);

    let first = app.services.inventory.receive(key, 40).await.unwrap();
    assert_eq!(first.quantity, 40);
    assert_eq!(first.reserved_quantity, 0);

    let second = app.services.inventory.receive(key, 25).await.unwrap();
    assert_eq!(second.quantity, 65);
    assert_eq!(second.available_quantity(), 65);
}

#[tokio::test]
async fn receive_rejects_non_positive_quantity() {
    let app = setup().await;
    let ctx = tenant();
    let key = StockKey::new(ctx.tenant_id, Uuid::new_v4(), Uuid::new_v4());

    let err = app.services.inventory.receive(key, 0).await.unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn reserve_respects_available_quantity() {
    let app = setup().await;
    let ctx = tenant();
    let item = Uuid::new_v4();
    let location = Uuid::new_v4();
    seed_stock(&app, &ctx, item, location, 10).await;

    let key = StockKey::new(ctx.tenant_id, item, location);
    let record = InventoryService::reserve(app.db.as_ref(), &key, 6)
        .await
        .unwrap();
    assert_eq!(record.reserved_quantity, 6);
    assert_eq!(record.available_quantity(), 4);

    // Only 4 units remain available; the guard rejects a second 6.
    let err = InventoryService::reserve(app.db.as_ref(), &key, 6)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::InsufficientStock { available: 4, .. }
    );

    // The failed attempt must not have touched the row.
    let row = ledger_row(app.db.as_ref(), &ctx, item, location).await;
    assert_eq!(row.quantity, 10);
    assert_eq!(row.reserved_quantity, 6);
}

#[tokio::test]
async fn reserve_against_missing_record_reports_zero_available() {
    let app = setup().await;
    let ctx = tenant();
    let key = StockKey::new(ctx.tenant_id, Uuid::new_v4(), Uuid::new_v4());

    let err = InventoryService::reserve(app.db.as_ref(), &key, 1)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::InsufficientStock { available: 0, .. }
    );
}

#[tokio::test]
async fn release_returns_reserved_units_to_available() {
    let app = setup().await;
    let ctx = tenant();
    let item = Uuid::new_v4();
    let location = Uuid::new_v4();
    seed_stock(&app, &ctx, item, location, 20).await;

    let key = StockKey::new(ctx.tenant_id, item, location);
    InventoryService::reserve(app.db.as_ref(), &key, 15)
        .await
        .unwrap();
    let record = InventoryService::release(app.db.as_ref(), &key, 15)
        .await
        .unwrap();
    assert_eq!(record.quantity, 20);
    assert_eq!(record.reserved_quantity, 0);
    assert_eq!(record.available_quantity(), 20);
}

#[tokio::test]
async fn release_beyond_reserved_is_rejected() {
    let app = setup().await;
    let ctx = tenant();
    let item = Uuid::new_v4();
    let location = Uuid::new_v4();
    seed_stock(&app, &ctx, item, location, 20).await;

    let key = StockKey::new(ctx.tenant_id, item, location);
    InventoryService::reserve(app.db.as_ref(), &key, 5)
        .await
        .unwrap();
    let err = InventoryService::release(app.db.as_ref(), &key, 6)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InternalError(_));

    let row = ledger_row(app.db.as_ref(), &ctx, item, location).await;
    assert_eq!(row.reserved_quantity, 5);
}

#[tokio::test]
async fn commit_reservation_removes_stock_and_reservation_together() {
    let app = setup().await;
    let ctx = tenant();
    let item = Uuid::new_v4();
    let location = Uuid::new_v4();
    seed_stock(&app, &ctx, item, location, 50).await;

    let key = StockKey::new(ctx.tenant_id, item, location);
    InventoryService::reserve(app.db.as_ref(), &key, 30)
        .await
        .unwrap();
    let record = InventoryService::commit_reservation(app.db.as_ref(), &key, 30)
        .await
        .unwrap();
    assert_eq!(record.quantity, 20);
    assert_eq!(record.reserved_quantity, 0);
}

#[tokio::test]
async fn commit_reservation_on_missing_record_is_a_consistency_fault() {
    let app = setup().await;
    let ctx = tenant();
    let key = StockKey::new(ctx.tenant_id, Uuid::new_v4(), Uuid::new_v4());

    let err = InventoryService::commit_reservation(app.db.as_ref(), &key, 1)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::SourceInventoryMissing { .. });
}

#[tokio::test]
async fn direct_decrement_may_drive_quantity_negative() {
    let app = setup().await;
    let ctx = tenant();
    let item = Uuid::new_v4();
    let location = Uuid::new_v4();
    seed_stock(&app, &ctx, item, location, 5).await;

    let key = StockKey::new(ctx.tenant_id, item, location);
    let record = InventoryService::direct_decrement(app.db.as_ref(), &key, 8)
        .await
        .unwrap();
    assert_eq!(record.quantity, -3);
    assert_eq!(record.reserved_quantity, 0);
}

#[tokio::test]
async fn direct_decrement_creates_missing_record_at_negated_quantity() {
    let app = setup().await;
    let ctx = tenant();
    let item = Uuid::new_v4();
    let location = Uuid::new_v4();

    let key = StockKey::new(ctx.tenant_id, item, location);
    let record = InventoryService::direct_decrement(app.db.as_ref(), &key, 4)
        .await
        .unwrap();
    assert_eq!(record.quantity, -4);
}

#[tokio::test]
async fn every_write_bumps_the_version_counter() {
    let app = setup().await;
    let ctx = tenant();
    let item = Uuid::new_v4();
    let location = Uuid::new_v4();
    seed_stock(&app, &ctx, item, location, 10).await;

    let before = ledger_row(app.db.as_ref(), &ctx, item, location).await;
    let key = StockKey::new(ctx.tenant_id, item, location);
    InventoryService::reserve(app.db.as_ref(), &key, 2)
        .await
        .unwrap();
    let after = ledger_row(app.db.as_ref(), &ctx, item, location).await;
    assert_eq!(after.version, before.version + 1);
}

#[tokio::test]
async fn records_are_scoped_per_tenant() {
    let app = setup().await;
    let ctx_a = tenant();
    let ctx_b = tenant();
    let item = Uuid::new_v4();
    let location = Uuid::new_v4();
    seed_stock(&app, &ctx_a, item, location, 12).await;

    assert!(maybe_ledger_row(app.db.as_ref(), &ctx_b, item, location)
        .await
        .is_none());

    let key = StockKey::new(ctx_b.tenant_id, item, location);
    let err = app
        .services
        .inventory
        .get_record(&key)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn list_records_paginates_per_tenant() {
    let app = setup().await;
    let ctx = tenant();
    let location = Uuid::new_v4();
    for _ in 0..3 {
        seed_stock(&app, &ctx, Uuid::new_v4(), location, 1).await;
    }

    let (records, total) = app
        .services
        .inventory
        .list_records(ctx.tenant_id, 1, 2)
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(records.len(), 2);

    let (rest, _) = app
        .services
        .inventory
        .list_records(ctx.tenant_id, 2, 2)
        .await
        .unwrap();
    assert_eq!(rest.len(), 1);
}
