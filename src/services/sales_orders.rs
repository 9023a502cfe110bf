use crate::{
    auth::TenantContext,
    db::DbPool,
    entities::{
        sales_order::{self, Entity as SalesOrder, SalesOrderStatus},
        sales_order_line::{self, Entity as SalesOrderLine},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::inventory::{unwrap_txn_err, InventoryService, StockKey},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewSalesOrderLine {
    pub item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct NewSalesOrder {
    pub location_id: Uuid,
    pub lines: Vec<NewSalesOrderLine>,
}

#[derive(Debug, Clone)]
pub struct SalesOrderDetail {
    pub order: sales_order::Model,
    pub lines: Vec<sales_order_line::Model>,
}

/// Sales fulfillment decrement.
///
/// Order creation subtracts each line's quantity from on-hand stock at the
/// order's location directly, with no reservation phase; negative on-hand is
/// the backorder signal. Cancellation restocks the same quantities under the
/// same transaction discipline.
#[derive(Clone)]
pub struct SalesOrderService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl SalesOrderService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates an order and decrements on-hand stock per line. A missing
    /// inventory record is created at the negated quantity.
    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id))]
    pub async fn create(
        &self,
        ctx: &TenantContext,
        input: NewSalesOrder,
    ) -> Result<SalesOrderDetail, ServiceError> {
        if input.lines.is_empty() {
            return Err(ServiceError::EmptyLineSet);
        }
        for line in &input.lines {
            if line.quantity <= 0 {
                return Err(ServiceError::ValidationError(format!(
                    "order quantity must be positive for item {}",
                    line.item_id
                )));
            }
        }

        let tenant_id = ctx.tenant_id;
        let user_id = ctx.user_id;
        let detail = self
            .db_pool
            .transaction::<_, SalesOrderDetail, ServiceError>(move |txn| {
                Box::pin(async move {
                    let today = Utc::now().date_naive();
                    let order_number = next_order_number(txn, tenant_id, today).await?;
                    let now = Utc::now();

                    let header = sales_order::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tenant_id: Set(tenant_id),
                        order_number: Set(order_number),
                        order_date: Set(today),
                        location_id: Set(input.location_id),
                        status: Set(SalesOrderStatus::Pending),
                        created_by_id: Set(user_id),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(txn)
                    .await?;

                    let mut lines = Vec::with_capacity(input.lines.len());
                    for line in &input.lines {
                        let stored = sales_order_line::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            order_id: Set(header.id),
                            item_id: Set(line.item_id),
                            quantity: Set(line.quantity),
                        }
                        .insert(txn)
                        .await?;

                        let key = StockKey::new(tenant_id, line.item_id, input.location_id);
                        InventoryService::direct_decrement(txn, &key, line.quantity).await?;
                        lines.push(stored);
                    }

                    Ok(SalesOrderDetail {
                        order: header,
                        lines,
                    })
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        info!(
            order_number = %detail.order.order_number,
            line_count = detail.lines.len(),
            "Created sales order and decremented on-hand stock"
        );

        self.event_sender
            .send(Event::SalesOrderCreated {
                order_id: detail.order.id,
                order_number: detail.order.order_number.clone(),
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(detail)
    }

    /// PENDING -> CANCELLED with a compensating restock: each line's quantity
    /// is added back to on-hand stock in the same transaction.
    #[instrument(skip(self, ctx))]
    pub async fn cancel(
        &self,
        ctx: &TenantContext,
        order_id: Uuid,
    ) -> Result<sales_order::Model, ServiceError> {
        let tenant_id = ctx.tenant_id;
        let updated = self
            .db_pool
            .transaction::<_, sales_order::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let found = find_order(txn, tenant_id, order_id).await?;
                    match found.status {
                        SalesOrderStatus::Cancelled => {
                            return Err(ServiceError::AlreadyCancelled {
                                entity: "sales order",
                                id: found.id,
                            });
                        }
                        SalesOrderStatus::Pending => {}
                    }

                    let lines = find_lines(txn, order_id).await?;
                    for line in &lines {
                        let key = StockKey::new(tenant_id, line.item_id, found.location_id);
                        InventoryService::apply_delta(txn, &key, line.quantity, 0).await?;
                    }

                    let mut active: sales_order::ActiveModel = found.into();
                    active.status = Set(SalesOrderStatus::Cancelled);
                    active.updated_at = Set(Utc::now());
                    Ok(active.update(txn).await?)
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        info!(order_id = %updated.id, "Cancelled sales order; stock restored");

        self.event_sender
            .send(Event::SalesOrderCancelled(updated.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    /// Fetches one order with its lines.
    #[instrument(skip(self, ctx))]
    pub async fn get(
        &self,
        ctx: &TenantContext,
        order_id: Uuid,
    ) -> Result<SalesOrderDetail, ServiceError> {
        let db = self.db_pool.as_ref();
        let order = find_order(db, ctx.tenant_id, order_id).await?;
        let lines = find_lines(db, order_id).await?;
        Ok(SalesOrderDetail { order, lines })
    }
}

async fn find_order<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    order_id: Uuid,
) -> Result<sales_order::Model, ServiceError> {
    SalesOrder::find_by_id(order_id)
        .filter(sales_order::Column::TenantId.eq(tenant_id))
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Sales order {} not found", order_id)))
}

async fn find_lines<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
) -> Result<Vec<sales_order_line::Model>, ServiceError> {
    SalesOrderLine::find()
        .filter(sales_order_line::Column::OrderId.eq(order_id))
        .all(conn)
        .await
        .map_err(ServiceError::DatabaseError)
}

async fn next_order_number<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    date: chrono::NaiveDate,
) -> Result<String, ServiceError> {
    let existing = SalesOrder::find()
        .filter(sales_order::Column::TenantId.eq(tenant_id))
        .filter(sales_order::Column::OrderDate.eq(date))
        .count(conn)
        .await?;
    Ok(format!("SO-{}-{:04}", date.format("%Y%m%d"), existing + 1))
}
