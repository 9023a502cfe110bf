mod common;

use assert_matches::assert_matches;
use common::{ledger_row, seed_stock, setup, tenant};
use stockflow_api::{
    entities::sales_order::SalesOrderStatus,
    errors::ServiceError,
    services::sales_orders::{NewSalesOrder, NewSalesOrderLine},
};
use uuid::Uuid;

fn single_line_order(location: Uuid, item: Uuid, qty: i32) -> NewSalesOrder {
    NewSalesOrder {
        location_id: location,
        lines: vec![NewSalesOrderLine {
            item_id: item,
            quantity: qty,
        }],
    }
}

#[tokio::test]
async fn order_creation_decrements_on_hand_directly() {
    let app = setup().await;
    let ctx = tenant();
    let item = Uuid::new_v4();
    let location = Uuid::new_v4();
    seed_stock(&app, &ctx, item, location, 10).await;

    let detail = app
        .services
        .sales_orders
        .create(&ctx, single_line_order(location, item, 3))
        .await
        .unwrap();
    assert_eq!(detail.order.status, SalesOrderStatus::Pending);
    assert!(detail.order.order_number.starts_with("SO-"));

    let row = ledger_row(app.db.as_ref(), &ctx, item, location).await;
    assert_eq!(row.quantity, 7);
    assert_eq!(row.reserved_quantity, 0);
}

#[tokio::test]
async fn oversold_orders_succeed_and_record_a_backorder() {
    let app = setup().await;
    let ctx = tenant();
    let item = Uuid::new_v4();
    let location = Uuid::new_v4();
    seed_stock(&app, &ctx, item, location, 10).await;

    app.services
        .sales_orders
        .create(&ctx, single_line_order(location, item, 3))
        .await
        .unwrap();
    // 7 on hand, ordering 9 more: sales never fail on availability.
    app.services
        .sales_orders
        .create(&ctx, single_line_order(location, item, 9))
        .await
        .unwrap();

    let row = ledger_row(app.db.as_ref(), &ctx, item, location).await;
    assert_eq!(row.quantity, -2);
}

#[tokio::test]
async fn ordering_an_unknown_item_creates_a_negative_row() {
    let app = setup().await;
    let ctx = tenant();
    let item = Uuid::new_v4();
    let location = Uuid::new_v4();

    app.services
        .sales_orders
        .create(&ctx, single_line_order(location, item, 4))
        .await
        .unwrap();

    let row = ledger_row(app.db.as_ref(), &ctx, item, location).await;
    assert_eq!(row.quantity, -4);
}

#[tokio::test]
async fn cancel_restocks_every_line() {
    let app = setup().await;
    let ctx = tenant();
    let item = Uuid::new_v4();
    let location = Uuid::new_v4();
    seed_stock(&app, &ctx, item, location, 10).await;

    let detail = app
        .services
        .sales_orders
        .create(&ctx, single_line_order(location, item, 9))
        .await
        .unwrap();
    let cancelled = app
        .services
        .sales_orders
        .cancel(&ctx, detail.order.id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, SalesOrderStatus::Cancelled);

    // Create-then-cancel round-trips the ledger.
    let row = ledger_row(app.db.as_ref(), &ctx, item, location).await;
    assert_eq!(row.quantity, 10);
}

#[tokio::test]
async fn cancel_is_terminal_and_never_restocks_twice() {
    let app = setup().await;
    let ctx = tenant();
    let item = Uuid::new_v4();
    let location = Uuid::new_v4();
    seed_stock(&app, &ctx, item, location, 10).await;

    let detail = app
        .services
        .sales_orders
        .create(&ctx, single_line_order(location, item, 4))
        .await
        .unwrap();
    app.services
        .sales_orders
        .cancel(&ctx, detail.order.id)
        .await
        .unwrap();

    let err = app
        .services
        .sales_orders
        .cancel(&ctx, detail.order.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::AlreadyCancelled { .. });

    let row = ledger_row(app.db.as_ref(), &ctx, item, location).await;
    assert_eq!(row.quantity, 10);
}

#[tokio::test]
async fn multi_line_orders_decrement_each_item() {
    let app = setup().await;
    let ctx = tenant();
    let item_a = Uuid::new_v4();
    let item_b = Uuid::new_v4();
    let location = Uuid::new_v4();
    seed_stock(&app, &ctx, item_a, location, 20).await;
    seed_stock(&app, &ctx, item_b, location, 5).await;

    let input = NewSalesOrder {
        location_id: location,
        lines: vec![
            NewSalesOrderLine {
                item_id: item_a,
                quantity: 6,
            },
            NewSalesOrderLine {
                item_id: item_b,
                quantity: 5,
            },
        ],
    };
    let detail = app.services.sales_orders.create(&ctx, input).await.unwrap();
    assert_eq!(detail.lines.len(), 2);

    let row_a = ledger_row(app.db.as_ref(), &ctx, item_a, location).await;
    let row_b = ledger_row(app.db.as_ref(), &ctx, item_b, location).await;
    assert_eq!(row_a.quantity, 14);
    assert_eq!(row_b.quantity, 0);
}

#[tokio::test]
async fn sales_leave_reservations_untouched() {
    let app = setup().await;
    let ctx = tenant();
    let item = Uuid::new_v4();
    let location = Uuid::new_v4();
    seed_stock(&app, &ctx, item, location, 30).await;

    use stockflow_api::services::inventory::{InventoryService, StockKey};
    let key = StockKey::new(ctx.tenant_id, item, location);
    InventoryService::reserve(app.db.as_ref(), &key, 10)
        .await
        .unwrap();

    app.services
        .sales_orders
        .create(&ctx, single_line_order(location, item, 25))
        .await
        .unwrap();

    // On-hand may fall below the reserved quantity; the sales path does not
    // check availability.
    let row = ledger_row(app.db.as_ref(), &ctx, item, location).await;
    assert_eq!(row.quantity, 5);
    assert_eq!(row.reserved_quantity, 10);
}

#[tokio::test]
async fn validation_rejects_degenerate_orders() {
    let app = setup().await;
    let ctx = tenant();

    let err = app
        .services
        .sales_orders
        .create(
            &ctx,
            NewSalesOrder {
                location_id: Uuid::new_v4(),
                lines: vec![],
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::EmptyLineSet);

    let err = app
        .services
        .sales_orders
        .create(
            &ctx,
            single_line_order(Uuid::new_v4(), Uuid::new_v4(), 0),
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn orders_are_invisible_across_tenants() {
    let app = setup().await;
    let ctx_a = tenant();
    let ctx_b = tenant();
    let item = Uuid::new_v4();
    let location = Uuid::new_v4();
    seed_stock(&app, &ctx_a, item, location, 10).await;

    let detail = app
        .services
        .sales_orders
        .create(&ctx_a, single_line_order(location, item, 2))
        .await
        .unwrap();

    let err = app
        .services
        .sales_orders
        .get(&ctx_b, detail.order.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let err = app
        .services
        .sales_orders
        .cancel(&ctx_b, detail.order.id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}
