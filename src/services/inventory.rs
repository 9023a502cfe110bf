use crate::{
    db::DbPool,
    entities::inventory_record::{self, Entity as InventoryRecord},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionError, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Lookup key of one ledger row: (tenant, item, location).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockKey {
    pub tenant_id: Uuid,
    pub item_id: Uuid,
    pub location_id: Uuid,
}

impl StockKey {
    pub fn new(tenant_id: Uuid, item_id: Uuid, location_id: Uuid) -> Self {
        Self {
            tenant_id,
            item_id,
            location_id,
        }
    }
}

/// The Inventory Record Store.
///
/// Every ledger mutation in the system goes through the associated functions
/// on this type; no workflow touches `inventory_records` through another code
/// path. All mutating primitives are single conditional UPDATE statements
/// with a rows-affected check, executed on a caller-supplied connection so a
/// workflow operation's ledger writes commit or roll back with its own
/// transaction. The two consistency strengths are explicit: transfers use
/// `reserve`/`release`/`commit_reservation`, sales use `direct_decrement`.
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Reads one ledger row, if it exists.
    pub async fn get<C: ConnectionTrait>(
        conn: &C,
        key: &StockKey,
    ) -> Result<Option<inventory_record::Model>, ServiceError> {
        InventoryRecord::find()
            .filter(inventory_record::Column::TenantId.eq(key.tenant_id))
            .filter(inventory_record::Column::ItemId.eq(key.item_id))
            .filter(inventory_record::Column::LocationId.eq(key.location_id))
            .one(conn)
            .await
            .map_err(ServiceError::DatabaseError)
    }

    /// Applies `(quantity_delta, reserved_delta)` to the row, creating it
    /// lazily when absent. The reservation counter is guarded so it can never
    /// go negative. Positive quantity deltas are the seam used by the
    /// goods-receipt collaborator.
    pub async fn apply_delta<C: ConnectionTrait>(
        conn: &C,
        key: &StockKey,
        quantity_delta: i32,
        reserved_delta: i32,
    ) -> Result<inventory_record::Model, ServiceError> {
        let result = Self::key_update(key)
            .col_expr(
                inventory_record::Column::Quantity,
                Expr::col(inventory_record::Column::Quantity).add(quantity_delta),
            )
            .col_expr(
                inventory_record::Column::ReservedQuantity,
                Expr::col(inventory_record::Column::ReservedQuantity).add(reserved_delta),
            )
            // reserved + delta >= 0
            .filter(Expr::col(inventory_record::Column::ReservedQuantity).gte(-reserved_delta))
            .exec(conn)
            .await?;

        if result.rows_affected > 0 {
            return Self::fetch_updated(conn, key).await;
        }

        match Self::get(conn, key).await? {
            Some(record) => Err(ServiceError::InternalError(format!(
                "reserved quantity would underflow: delta {} on reserved {} for item {} at location {}",
                reserved_delta, record.reserved_quantity, key.item_id, key.location_id
            ))),
            None if reserved_delta < 0 => Err(ServiceError::SourceInventoryMissing {
                item_id: key.item_id,
                location_id: key.location_id,
            }),
            None => Self::create(conn, key, quantity_delta, reserved_delta).await,
        }
    }

    /// Earmarks `qty` units at the key for an in-flight transfer. The guard
    /// `quantity >= reserved + qty` makes the read-check-write race a single
    /// atomic statement; zero rows affected means insufficient availability.
    pub async fn reserve<C: ConnectionTrait>(
        conn: &C,
        key: &StockKey,
        qty: i32,
    ) -> Result<inventory_record::Model, ServiceError> {
        let result = Self::key_update(key)
            .col_expr(
                inventory_record::Column::ReservedQuantity,
                Expr::col(inventory_record::Column::ReservedQuantity).add(qty),
            )
            .filter(
                Expr::col(inventory_record::Column::Quantity)
                    .gte(Expr::col(inventory_record::Column::ReservedQuantity).add(qty)),
            )
            .exec(conn)
            .await?;

        if result.rows_affected > 0 {
            return Self::fetch_updated(conn, key).await;
        }

        let available = Self::get(conn, key)
            .await?
            .map(|r| r.available_quantity())
            .unwrap_or(0);
        Err(ServiceError::InsufficientStock {
            item_id: key.item_id,
            available,
        })
    }

    /// Releases an earlier reservation without touching on-hand stock
    /// (transfer cancellation).
    pub async fn release<C: ConnectionTrait>(
        conn: &C,
        key: &StockKey,
        qty: i32,
    ) -> Result<inventory_record::Model, ServiceError> {
        let result = Self::key_update(key)
            .col_expr(
                inventory_record::Column::ReservedQuantity,
                Expr::col(inventory_record::Column::ReservedQuantity).sub(qty),
            )
            .filter(Expr::col(inventory_record::Column::ReservedQuantity).gte(qty))
            .exec(conn)
            .await?;

        if result.rows_affected > 0 {
            return Self::fetch_updated(conn, key).await;
        }

        match Self::get(conn, key).await? {
            Some(record) => Err(ServiceError::InternalError(format!(
                "cannot release {} units: only {} reserved for item {} at location {}",
                qty, record.reserved_quantity, key.item_id, key.location_id
            ))),
            None => Err(ServiceError::SourceInventoryMissing {
                item_id: key.item_id,
                location_id: key.location_id,
            }),
        }
    }

    /// Removes physical stock and releases the reservation in the same
    /// statement (transfer completion at the source location). A missing row
    /// here is a consistency fault, never silently ignored.
    pub async fn commit_reservation<C: ConnectionTrait>(
        conn: &C,
        key: &StockKey,
        qty: i32,
    ) -> Result<inventory_record::Model, ServiceError> {
        let result = Self::key_update(key)
            .col_expr(
                inventory_record::Column::Quantity,
                Expr::col(inventory_record::Column::Quantity).sub(qty),
            )
            .col_expr(
                inventory_record::Column::ReservedQuantity,
                Expr::col(inventory_record::Column::ReservedQuantity).sub(qty),
            )
            .filter(Expr::col(inventory_record::Column::ReservedQuantity).gte(qty))
            .exec(conn)
            .await?;

        if result.rows_affected > 0 {
            return Self::fetch_updated(conn, key).await;
        }

        match Self::get(conn, key).await? {
            Some(record) => Err(ServiceError::InternalError(format!(
                "cannot commit {} units: only {} reserved for item {} at location {}",
                qty, record.reserved_quantity, key.item_id, key.location_id
            ))),
            None => Err(ServiceError::SourceInventoryMissing {
                item_id: key.item_id,
                location_id: key.location_id,
            }),
        }
    }

    /// Overwrites on-hand stock with an absolute value, leaving the reserved
    /// counter untouched (adjustment path). Creates the row when absent.
    pub async fn set_absolute<C: ConnectionTrait>(
        conn: &C,
        key: &StockKey,
        quantity: i32,
    ) -> Result<inventory_record::Model, ServiceError> {
        let result = Self::key_update(key)
            .col_expr(inventory_record::Column::Quantity, Expr::value(quantity))
            .exec(conn)
            .await?;

        if result.rows_affected > 0 {
            return Self::fetch_updated(conn, key).await;
        }
        Self::create(conn, key, quantity, 0).await
    }

    /// Decrements on-hand stock with no reservation phase (sales path).
    /// Negative on-hand is a valid backorder signal, so there is no floor;
    /// a missing row is created at `-qty`.
    pub async fn direct_decrement<C: ConnectionTrait>(
        conn: &C,
        key: &StockKey,
        qty: i32,
    ) -> Result<inventory_record::Model, ServiceError> {
        Self::apply_delta(conn, key, -qty, 0).await
    }

    /// Base UPDATE scoped to one ledger key, with version bump and timestamp.
    fn key_update(key: &StockKey) -> sea_orm::UpdateMany<InventoryRecord> {
        InventoryRecord::update_many()
            .col_expr(
                inventory_record::Column::Version,
                Expr::col(inventory_record::Column::Version).add(1),
            )
            .col_expr(inventory_record::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(inventory_record::Column::TenantId.eq(key.tenant_id))
            .filter(inventory_record::Column::ItemId.eq(key.item_id))
            .filter(inventory_record::Column::LocationId.eq(key.location_id))
    }

    async fn create<C: ConnectionTrait>(
        conn: &C,
        key: &StockKey,
        quantity: i32,
        reserved: i32,
    ) -> Result<inventory_record::Model, ServiceError> {
        debug_assert!(reserved >= 0);
        let now = Utc::now();
        let record = inventory_record::ActiveModel {
            id: Set(Uuid::new_v4()),
            tenant_id: Set(key.tenant_id),
            item_id: Set(key.item_id),
            location_id: Set(key.location_id),
            quantity: Set(quantity),
            reserved_quantity: Set(reserved),
            version: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
        };
        record.insert(conn).await.map_err(ServiceError::DatabaseError)
    }

    async fn fetch_updated<C: ConnectionTrait>(
        conn: &C,
        key: &StockKey,
    ) -> Result<inventory_record::Model, ServiceError> {
        Self::get(conn, key).await?.ok_or_else(|| {
            ServiceError::InternalError(format!(
                "inventory record vanished after update for item {} at location {}",
                key.item_id, key.location_id
            ))
        })
    }

    /// Reads one ledger row for the HTTP surface; absent rows are NotFound.
    #[instrument(skip(self))]
    pub async fn get_record(
        &self,
        key: &StockKey,
    ) -> Result<inventory_record::Model, ServiceError> {
        Self::get(self.db_pool.as_ref(), key)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "No inventory record for item {} at location {}",
                    key.item_id, key.location_id
                ))
            })
    }

    /// Lists a tenant's ledger rows with pagination.
    #[instrument(skip(self))]
    pub async fn list_records(
        &self,
        tenant_id: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<inventory_record::Model>, u64), ServiceError> {
        let paginator = InventoryRecord::find()
            .filter(inventory_record::Column::TenantId.eq(tenant_id))
            .order_by_asc(inventory_record::Column::ItemId)
            .order_by_asc(inventory_record::Column::LocationId)
            .paginate(self.db_pool.as_ref(), limit);

        let total = paginator.num_items().await?;
        let records = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((records, total))
    }

    /// Goods-receipt seam: adds received stock to on-hand inside its own
    /// transaction. Exposed to the purchasing collaborator over HTTP.
    #[instrument(skip(self))]
    pub async fn receive(
        &self,
        key: StockKey,
        qty: i32,
    ) -> Result<inventory_record::Model, ServiceError> {
        if qty <= 0 {
            return Err(ServiceError::ValidationError(
                "received quantity must be positive".into(),
            ));
        }

        let record = self
            .db_pool
            .transaction::<_, inventory_record::Model, ServiceError>(move |txn| {
                Box::pin(async move { Self::apply_delta(txn, &key, qty, 0).await })
            })
            .await
            .map_err(unwrap_txn_err)?;

        info!(
            item_id = %key.item_id,
            location_id = %key.location_id,
            qty,
            "Received stock into inventory"
        );

        self.event_sender
            .send(Event::InventoryReceived {
                tenant_id: key.tenant_id,
                item_id: key.item_id,
                location_id: key.location_id,
                quantity: qty,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(record)
    }
}

/// Unwraps sea-orm's transaction error wrapper back into a ServiceError.
pub(crate) fn unwrap_txn_err(err: TransactionError<ServiceError>) -> ServiceError {
    match err {
        TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
        TransactionError::Transaction(service_err) => service_err,
    }
}
