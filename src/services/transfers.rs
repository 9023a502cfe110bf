use crate::{
    auth::TenantContext,
    db::DbPool,
    entities::{
        transfer::{self, Entity as Transfer, TransferStatus},
        transfer_line::{self, Entity as TransferLine},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::inventory::{unwrap_txn_err, InventoryService, StockKey},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct NewTransferLine {
    pub item_id: Uuid,
    pub quantity: i32,
    pub notes: Option<String>,
    pub serial_numbers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    pub notes: Option<String>,
    pub lines: Vec<NewTransferLine>,
}

#[derive(Debug, Clone)]
pub struct TransferDetail {
    pub transfer: transfer::Model,
    pub lines: Vec<transfer_line::Model>,
}

/// Inter-location transfer workflow.
///
/// Creation reserves the quantity at the source; completion moves physical
/// stock; cancellation releases the reservation. Every operation runs inside
/// one database transaction, so a failure on any line leaves the transfer and
/// the ledger unchanged.
#[derive(Clone)]
pub struct TransferService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl TransferService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a transfer in DRAFT and reserves each line's quantity at the
    /// source location. No physical stock moves yet.
    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id))]
    pub async fn create(
        &self,
        ctx: &TenantContext,
        input: NewTransfer,
    ) -> Result<TransferDetail, ServiceError> {
        if input.lines.is_empty() {
            return Err(ServiceError::EmptyLineSet);
        }
        if input.from_location_id == input.to_location_id {
            return Err(ServiceError::ValidationError(
                "source and destination locations must differ".into(),
            ));
        }
        for line in &input.lines {
            if line.quantity <= 0 {
                return Err(ServiceError::ValidationError(format!(
                    "transfer quantity must be positive for item {}",
                    line.item_id
                )));
            }
        }

        let tenant_id = ctx.tenant_id;
        let user_id = ctx.user_id;
        let detail = self
            .db_pool
            .transaction::<_, TransferDetail, ServiceError>(move |txn| {
                Box::pin(async move {
                    let today = Utc::now().date_naive();
                    let transfer_number =
                        next_transfer_number(txn, tenant_id, today).await?;
                    let now = Utc::now();

                    let header = transfer::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tenant_id: Set(tenant_id),
                        transfer_number: Set(transfer_number),
                        transfer_date: Set(today),
                        from_location_id: Set(input.from_location_id),
                        to_location_id: Set(input.to_location_id),
                        status: Set(TransferStatus::Draft),
                        notes: Set(input.notes.clone()),
                        created_by_id: Set(user_id),
                        approved_by_id: Set(None),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(txn)
                    .await?;

                    let mut lines = Vec::with_capacity(input.lines.len());
                    for line in &input.lines {
                        let serials = if line.serial_numbers.is_empty() {
                            None
                        } else {
                            Some(serde_json::json!(line.serial_numbers))
                        };
                        let stored = transfer_line::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            transfer_id: Set(header.id),
                            item_id: Set(line.item_id),
                            quantity: Set(line.quantity),
                            notes: Set(line.notes.clone()),
                            serial_numbers: Set(serials),
                        }
                        .insert(txn)
                        .await?;

                        let key =
                            StockKey::new(tenant_id, line.item_id, input.from_location_id);
                        InventoryService::reserve(txn, &key, line.quantity).await?;
                        lines.push(stored);
                    }

                    Ok(TransferDetail {
                        transfer: header,
                        lines,
                    })
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        info!(
            transfer_number = %detail.transfer.transfer_number,
            line_count = detail.lines.len(),
            "Created transfer with source reservation"
        );

        self.event_sender
            .send(Event::TransferCreated {
                transfer_id: detail.transfer.id,
                transfer_number: detail.transfer.transfer_number.clone(),
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(detail)
    }

    /// DRAFT -> APPROVED. Pure status transition, no ledger effect.
    #[instrument(skip(self, ctx))]
    pub async fn approve(
        &self,
        ctx: &TenantContext,
        transfer_id: Uuid,
    ) -> Result<transfer::Model, ServiceError> {
        let tenant_id = ctx.tenant_id;
        let approver_id = ctx.user_id;
        let updated = self
            .db_pool
            .transaction::<_, transfer::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let found = find_transfer(txn, tenant_id, transfer_id).await?;
                    if !found.status.can_approve() {
                        return Err(ServiceError::InvalidStateTransition {
                            entity: "transfer",
                            from: found.status.to_string(),
                            attempted: "approve",
                        });
                    }

                    let mut active: transfer::ActiveModel = found.into();
                    active.status = Set(TransferStatus::Approved);
                    active.approved_by_id = Set(Some(approver_id));
                    active.updated_at = Set(Utc::now());
                    Ok(active.update(txn).await?)
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        self.event_sender
            .send(Event::TransferApproved(updated.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    /// APPROVED -> IN_TRANSIT. Pure status transition, no ledger effect.
    #[instrument(skip(self, ctx))]
    pub async fn mark_in_transit(
        &self,
        ctx: &TenantContext,
        transfer_id: Uuid,
    ) -> Result<transfer::Model, ServiceError> {
        let tenant_id = ctx.tenant_id;
        let updated = self
            .db_pool
            .transaction::<_, transfer::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let found = find_transfer(txn, tenant_id, transfer_id).await?;
                    if !found.status.can_mark_in_transit() {
                        return Err(ServiceError::InvalidStateTransition {
                            entity: "transfer",
                            from: found.status.to_string(),
                            attempted: "mark in transit",
                        });
                    }

                    let mut active: transfer::ActiveModel = found.into();
                    active.status = Set(TransferStatus::InTransit);
                    active.updated_at = Set(Utc::now());
                    Ok(active.update(txn).await?)
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        self.event_sender
            .send(Event::TransferInTransit(updated.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    /// APPROVED/IN_TRANSIT -> COMPLETED. For each line, removes stock and
    /// releases the reservation at the source in one step, then adds stock at
    /// the destination (creating the record when absent). Terminal.
    #[instrument(skip(self, ctx))]
    pub async fn complete(
        &self,
        ctx: &TenantContext,
        transfer_id: Uuid,
    ) -> Result<transfer::Model, ServiceError> {
        let tenant_id = ctx.tenant_id;
        let updated = self
            .db_pool
            .transaction::<_, transfer::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let found = find_transfer(txn, tenant_id, transfer_id).await?;
                    if !found.status.can_complete() {
                        return Err(ServiceError::InvalidStateTransition {
                            entity: "transfer",
                            from: found.status.to_string(),
                            attempted: "complete",
                        });
                    }

                    let lines = find_lines(txn, transfer_id).await?;
                    for line in &lines {
                        let source =
                            StockKey::new(tenant_id, line.item_id, found.from_location_id);
                        let destination =
                            StockKey::new(tenant_id, line.item_id, found.to_location_id);
                        InventoryService::commit_reservation(txn, &source, line.quantity)
                            .await?;
                        InventoryService::apply_delta(txn, &destination, line.quantity, 0)
                            .await?;
                    }

                    let mut active: transfer::ActiveModel = found.into();
                    active.status = Set(TransferStatus::Completed);
                    active.updated_at = Set(Utc::now());
                    Ok(active.update(txn).await?)
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        info!(transfer_id = %updated.id, "Completed transfer; stock moved to destination");

        self.event_sender
            .send(Event::TransferCompleted(updated.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    /// Any non-terminal state -> CANCELLED. Releases the source reservation
    /// without touching on-hand stock. Terminal.
    #[instrument(skip(self, ctx))]
    pub async fn cancel(
        &self,
        ctx: &TenantContext,
        transfer_id: Uuid,
    ) -> Result<transfer::Model, ServiceError> {
        let tenant_id = ctx.tenant_id;
        let updated = self
            .db_pool
            .transaction::<_, transfer::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let found = find_transfer(txn, tenant_id, transfer_id).await?;
                    match found.status {
                        TransferStatus::Cancelled => {
                            return Err(ServiceError::AlreadyCancelled {
                                entity: "transfer",
                                id: found.id,
                            });
                        }
                        TransferStatus::Completed => {
                            return Err(ServiceError::InvalidStateTransition {
                                entity: "transfer",
                                from: found.status.to_string(),
                                attempted: "cancel",
                            });
                        }
                        _ => {}
                    }

                    if found.status.holds_reservation() {
                        let lines = find_lines(txn, transfer_id).await?;
                        for line in &lines {
                            let source =
                                StockKey::new(tenant_id, line.item_id, found.from_location_id);
                            InventoryService::release(txn, &source, line.quantity).await?;
                        }
                    }

                    let mut active: transfer::ActiveModel = found.into();
                    active.status = Set(TransferStatus::Cancelled);
                    active.updated_at = Set(Utc::now());
                    Ok(active.update(txn).await?)
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        self.event_sender
            .send(Event::TransferCancelled(updated.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    /// Fetches one transfer with its lines.
    #[instrument(skip(self, ctx))]
    pub async fn get(
        &self,
        ctx: &TenantContext,
        transfer_id: Uuid,
    ) -> Result<TransferDetail, ServiceError> {
        let db = self.db_pool.as_ref();
        let transfer = find_transfer(db, ctx.tenant_id, transfer_id).await?;
        let lines = find_lines(db, transfer_id).await?;
        Ok(TransferDetail { transfer, lines })
    }

    /// Lists a tenant's transfers, newest first.
    #[instrument(skip(self, ctx))]
    pub async fn list(
        &self,
        ctx: &TenantContext,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<transfer::Model>, u64), ServiceError> {
        let paginator = Transfer::find()
            .filter(transfer::Column::TenantId.eq(ctx.tenant_id))
            .order_by_desc(transfer::Column::CreatedAt)
            .paginate(self.db_pool.as_ref(), limit);

        let total = paginator.num_items().await?;
        let transfers = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((transfers, total))
    }
}

async fn find_transfer<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    transfer_id: Uuid,
) -> Result<transfer::Model, ServiceError> {
    Transfer::find_by_id(transfer_id)
        .filter(transfer::Column::TenantId.eq(tenant_id))
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Transfer {} not found", transfer_id)))
}

async fn find_lines<C: ConnectionTrait>(
    conn: &C,
    transfer_id: Uuid,
) -> Result<Vec<transfer_line::Model>, ServiceError> {
    TransferLine::find()
        .filter(transfer_line::Column::TransferId.eq(transfer_id))
        .all(conn)
        .await
        .map_err(ServiceError::DatabaseError)
}

/// `TRF-<YYYYMMDD>-<seq>`; the sequence restarts per tenant per day and is
/// computed inside the creating transaction.
async fn next_transfer_number<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    date: chrono::NaiveDate,
) -> Result<String, ServiceError> {
    let existing = Transfer::find()
        .filter(transfer::Column::TenantId.eq(tenant_id))
        .filter(transfer::Column::TransferDate.eq(date))
        .count(conn)
        .await?;
    Ok(format!(
        "TRF-{}-{:04}",
        date.format("%Y%m%d"),
        existing + 1
    ))
}
