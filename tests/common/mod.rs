#![allow(dead_code)]

use sea_orm::ConnectionTrait;
use std::sync::Arc;
use stockflow_api::{
    auth::TenantContext,
    db::{establish_connection_with_config, run_migrations, DbConfig, DbPool},
    entities::inventory_record,
    events::{Event, EventSender},
    handlers::AppServices,
    services::inventory::{InventoryService, StockKey},
};
use tokio::sync::mpsc;
use uuid::Uuid;

/// In-memory database plus wired-up services. The event receiver is held so
/// workflow event sends keep succeeding for the life of the test.
pub struct TestApp {
    pub db: Arc<DbPool>,
    pub services: AppServices,
    pub event_sender: Arc<EventSender>,
    _event_rx: mpsc::Receiver<Event>,
}

pub async fn setup() -> TestApp {
    // A single pooled connection keeps the in-memory database alive and
    // shared across all operations in the test.
    let config = DbConfig {
        url: "sqlite::memory:".into(),
        max_connections: 1,
        min_connections: 1,
        ..Default::default()
    };
    let db = Arc::new(
        establish_connection_with_config(&config)
            .await
            .expect("failed to open in-memory database"),
    );
    run_migrations(&db).await.expect("migrations failed");

    let (tx, rx) = mpsc::channel(256);
    let event_sender = Arc::new(EventSender::new(tx));
    let services = AppServices::new(db.clone(), event_sender.clone());

    TestApp {
        db,
        services,
        event_sender,
        _event_rx: rx,
    }
}

pub fn tenant() -> TenantContext {
    TenantContext::new(Uuid::new_v4(), Uuid::new_v4())
}

/// Seeds on-hand stock through the goods-receipt path.
pub async fn seed_stock(
    app: &TestApp,
    ctx: &TenantContext,
    item_id: Uuid,
    location_id: Uuid,
    qty: i32,
) {
    let key = StockKey::new(ctx.tenant_id, item_id, location_id);
    app.services
        .inventory
        .receive(key, qty)
        .await
        .expect("seeding stock failed");
}

/// Reads one ledger row directly, panicking when absent.
pub async fn ledger_row(
    conn: &impl ConnectionTrait,
    ctx: &TenantContext,
    item_id: Uuid,
    location_id: Uuid,
) -> inventory_record::Model {
    let key = StockKey::new(ctx.tenant_id, item_id, location_id);
    InventoryService::get(conn, &key)
        .await
        .expect("ledger read failed")
        .expect("ledger row missing")
}

/// Reads one ledger row, returning None when it does not exist.
pub async fn maybe_ledger_row(
    conn: &impl ConnectionTrait,
    ctx: &TenantContext,
    item_id: Uuid,
    location_id: Uuid,
) -> Option<inventory_record::Model> {
    let key = StockKey::new(ctx.tenant_id, item_id, location_id);
    InventoryService::get(conn, &key)
        .await
        .expect("ledger read failed")
}
