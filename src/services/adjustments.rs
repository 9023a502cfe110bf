use crate::{
    auth::TenantContext,
    db::DbPool,
    entities::{
        adjustment::{self, AdjustmentStatus, AdjustmentType, Entity as Adjustment},
        adjustment_line::{self, Entity as AdjustmentLine},
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
pub struct NewAdjustmentLine {
    pub item_id: Uuid,
    pub before_quantity: i32,
    pub after_quantity: i32,
    pub notes: Option<String>,
    pub serial_numbers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewAdjustment {
    pub location_id: Uuid,
    pub adjustment_type: AdjustmentType,
    pub reason: String,
    pub lines: Vec<NewAdjustmentLine>,
}

#[derive(Debug, Clone)]
pub struct AdjustmentDetail {
    pub adjustment: adjustment::Model,
    pub lines: Vec<adjustment_line::Model>,
}

/// Manual stock correction workflow.
///
/// The ledger is written at creation time: a DRAFT adjustment is a submitted
/// count, not an unsubmitted proposal, so APPROVED is a pure status flag.
/// Cancellation restores every line's before-quantity.
#[derive(Clone)]
pub struct AdjustmentService {
    db_pool: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl AdjustmentService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates an adjustment in DRAFT and immediately overwrites each line's
    /// on-hand quantity with the counted after-value.
    #[instrument(skip(self, ctx, input), fields(tenant_id = %ctx.tenant_id))]
    pub async fn create(
        &self,
        ctx: &TenantContext,
        input: NewAdjustment,
    ) -> Result<AdjustmentDetail, ServiceError> {
        if input.lines.is_empty() {
            return Err(ServiceError::EmptyLineSet);
        }

        let tenant_id = ctx.tenant_id;
        let user_id = ctx.user_id;
        let detail = self
            .db_pool
            .transaction::<_, AdjustmentDetail, ServiceError>(move |txn| {
                Box::pin(async move {
                    let today = Utc::now().date_naive();
                    let adjustment_number =
                        next_adjustment_number(txn, tenant_id, today).await?;
                    let now = Utc::now();

                    let header = adjustment::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        tenant_id: Set(tenant_id),
                        adjustment_number: Set(adjustment_number),
                        adjustment_date: Set(today),
                        location_id: Set(input.location_id),
                        adjustment_type: Set(input.adjustment_type),
                        reason: Set(input.reason.clone()),
                        status: Set(AdjustmentStatus::Draft),
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
                        let stored = adjustment_line::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            adjustment_id: Set(header.id),
                            item_id: Set(line.item_id),
                            before_quantity: Set(line.before_quantity),
                            after_quantity: Set(line.after_quantity),
                            adjusted_quantity: Set(line.after_quantity - line.before_quantity),
                            notes: Set(line.notes.clone()),
                            serial_numbers: Set(serials),
                        }
                        .insert(txn)
                        .await?;

                        let key = StockKey::new(tenant_id, line.item_id, input.location_id);
                        InventoryService::set_absolute(txn, &key, line.after_quantity).await?;
                        lines.push(stored);
                    }

                    Ok(AdjustmentDetail {
                        adjustment: header,
                        lines,
                    })
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        info!(
            adjustment_number = %detail.adjustment.adjustment_number,
            line_count = detail.lines.len(),
            "Created adjustment and applied counted quantities"
        );

        self.event_sender
            .send(Event::AdjustmentCreated {
                adjustment_id: detail.adjustment.id,
                adjustment_number: detail.adjustment.adjustment_number.clone(),
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(detail)
    }

    /// DRAFT -> APPROVED. No ledger effect; the effect happened at create.
    #[instrument(skip(self, ctx))]
    pub async fn approve(
        &self,
        ctx: &TenantContext,
        adjustment_id: Uuid,
    ) -> Result<adjustment::Model, ServiceError> {
        let tenant_id = ctx.tenant_id;
        let approver_id = ctx.user_id;
        let updated = self
            .db_pool
            .transaction::<_, adjustment::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let found = find_adjustment(txn, tenant_id, adjustment_id).await?;
                    if !found.status.can_approve() {
                        return Err(ServiceError::InvalidStateTransition {
                            entity: "adjustment",
                            from: found.status.to_string(),
                            attempted: "approve",
                        });
                    }

                    let mut active: adjustment::ActiveModel = found.into();
                    active.status = Set(AdjustmentStatus::Approved);
                    active.approved_by_id = Set(Some(approver_id));
                    active.updated_at = Set(Utc::now());
                    Ok(active.update(txn).await?)
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        self.event_sender
            .send(Event::AdjustmentApproved(updated.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    /// Any state except CANCELLED -> CANCELLED. Restores every line's
    /// before-quantity on the ledger. Terminal.
    #[instrument(skip(self, ctx))]
    pub async fn cancel(
        &self,
        ctx: &TenantContext,
        adjustment_id: Uuid,
    ) -> Result<adjustment::Model, ServiceError> {
        let tenant_id = ctx.tenant_id;
        let updated = self
            .db_pool
            .transaction::<_, adjustment::Model, ServiceError>(move |txn| {
                Box::pin(async move {
                    let found = find_adjustment(txn, tenant_id, adjustment_id).await?;
                    if !found.status.can_cancel() {
                        return Err(ServiceError::AlreadyCancelled {
                            entity: "adjustment",
                            id: found.id,
                        });
                    }

                    let lines = find_lines(txn, adjustment_id).await?;
                    for line in &lines {
                        let key = StockKey::new(tenant_id, line.item_id, found.location_id);
                        InventoryService::set_absolute(txn, &key, line.before_quantity).await?;
                    }

                    let mut active: adjustment::ActiveModel = found.into();
                    active.status = Set(AdjustmentStatus::Cancelled);
                    active.updated_at = Set(Utc::now());
                    Ok(active.update(txn).await?)
                })
            })
            .await
            .map_err(unwrap_txn_err)?;

        info!(adjustment_id = %updated.id, "Cancelled adjustment; pre-adjustment stock restored");

        self.event_sender
            .send(Event::AdjustmentCancelled(updated.id))
            .await
            .map_err(ServiceError::EventError)?;

        Ok(updated)
    }

    /// Fetches one adjustment with its lines.
    #[instrument(skip(self, ctx))]
    pub async fn get(
        &self,
        ctx: &TenantContext,
        adjustment_id: Uuid,
    ) -> Result<AdjustmentDetail, ServiceError> {
        let db = self.db_pool.as_ref();
        let adjustment = find_adjustment(db, ctx.tenant_id, adjustment_id).await?;
        let lines = find_lines(db, adjustment_id).await?;
        Ok(AdjustmentDetail { adjustment, lines })
    }

    /// Lists a tenant's adjustments, newest first.
    #[instrument(skip(self, ctx))]
    pub async fn list(
        &self,
        ctx: &TenantContext,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<adjustment::Model>, u64), ServiceError> {
        let paginator = Adjustment::find()
            .filter(adjustment::Column::TenantId.eq(ctx.tenant_id))
            .order_by_desc(adjustment::Column::CreatedAt)
            .paginate(self.db_pool.as_ref(), limit);

        let total = paginator.num_items().await?;
        let adjustments = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((adjustments, total))
    }
}

async fn find_adjustment<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    adjustment_id: Uuid,
) -> Result<adjustment::Model, ServiceError> {
    Adjustment::find_by_id(adjustment_id)
        .filter(adjustment::Column::TenantId.eq(tenant_id))
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Adjustment {} not found", adjustment_id)))
}

async fn find_lines<C: ConnectionTrait>(
    conn: &C,
    adjustment_id: Uuid,
) -> Result<Vec<adjustment_line::Model>, ServiceError> {
    AdjustmentLine::find()
        .filter(adjustment_line::Column::AdjustmentId.eq(adjustment_id))
        .all(conn)
        .await
        .map_err(ServiceError::DatabaseError)
}

async fn next_adjustment_number<C: ConnectionTrait>(
    conn: &C,
    tenant_id: Uuid,
    date: chrono::NaiveDate,
) -> Result<String, ServiceError> {
    let existing = Adjustment::find()
        .filter(adjustment::Column::TenantId.eq(tenant_id))
        .filter(adjustment::Column::AdjustmentDate.eq(date))
        .count(conn)
        .await?;
    Ok(format!(
        "ADJ-{}-{:04}",
        date.format("%Y%m%d"),
        existing + 1
    ))
}
