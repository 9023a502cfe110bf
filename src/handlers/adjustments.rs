use crate::{
    auth::TenantContext,
    entities::{
        adjustment::{self, AdjustmentType},
        adjustment_line,
    },
    errors::ServiceError,
    services::adjustments::{AdjustmentDetail, NewAdjustment, NewAdjustmentLine},
    ApiResponse, AppState, ListQuery, PaginatedResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, serde::Serialize, Validate, ToSchema)]
pub struct CreateAdjustmentLineRequest {
    pub item_id: Uuid,
    pub before_quantity: i32,
    pub after_quantity: i32,
    pub notes: Option<String>,
    #[serde(default)]
    pub serial_numbers: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAdjustmentRequest {
    pub location_id: Uuid,
    pub adjustment_type: AdjustmentType,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
    #[validate(length(min = 1))]
    pub lines: Vec<CreateAdjustmentLineRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdjustmentLineDto {
    pub id: Uuid,
    pub item_id: Uuid,
    pub before_quantity: i32,
    pub after_quantity: i32,
    pub adjusted_quantity: i32,
    pub notes: Option<String>,
}

impl From<adjustment_line::Model> for AdjustmentLineDto {
    fn from(line: adjustment_line::Model) -> Self {
        Self {
            id: line.id,
            item_id: line.item_id,
            before_quantity: line.before_quantity,
            after_quantity: line.after_quantity,
            adjusted_quantity: line.adjusted_quantity,
            notes: line.notes,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdjustmentDto {
    pub id: Uuid,
    pub adjustment_number: String,
    pub status: String,
    pub adjustment_type: String,
    pub location_id: Uuid,
    pub reason: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<adjustment::Model> for AdjustmentDto {
    fn from(model: adjustment::Model) -> Self {
        Self {
            id: model.id,
            adjustment_number: model.adjustment_number,
            status: model.status.to_string(),
            adjustment_type: model.adjustment_type.to_string(),
            location_id: model.location_id,
            reason: model.reason,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdjustmentDetailDto {
    #[serde(flatten)]
    pub adjustment: AdjustmentDto,
    pub lines: Vec<AdjustmentLineDto>,
}

impl From<AdjustmentDetail> for AdjustmentDetailDto {
    fn from(detail: AdjustmentDetail) -> Self {
        Self {
            adjustment: detail.adjustment.into(),
            lines: detail.lines.into_iter().map(Into::into).collect(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_adjustment).get(list_adjustments))
        .route("/:id", get(get_adjustment))
        .route("/:id/approve", post(approve_adjustment))
        .route("/:id/cancel", post(cancel_adjustment))
}

/// Create an adjustment and apply the counted quantities to the ledger.
#[utoipa::path(
    post,
    path = "/api/v1/adjustments",
    request_body = CreateAdjustmentRequest,
    responses(
        (status = 201, description = "Adjustment created and applied", body = AdjustmentDetailDto),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "adjustments"
)]
pub async fn create_adjustment(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<CreateAdjustmentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let input = NewAdjustment {
        location_id: payload.location_id,
        adjustment_type: payload.adjustment_type,
        reason: payload.reason,
        lines: payload
            .lines
            .into_iter()
            .map(|line| NewAdjustmentLine {
                item_id: line.item_id,
                before_quantity: line.before_quantity,
                after_quantity: line.after_quantity,
                notes: line.notes,
                serial_numbers: line.serial_numbers,
            })
            .collect(),
    };
    let detail = state.services.adjustments.create(&ctx, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(AdjustmentDetailDto::from(detail))),
    ))
}

/// List the tenant's adjustments, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/adjustments",
    responses((status = 200, description = "Adjustments returned")),
    tag = "adjustments"
)]
pub async fn list_adjustments(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (adjustments, total) = state
        .services
        .adjustments
        .list(&ctx, query.page, query.limit)
        .await?;
    let items: Vec<AdjustmentDto> = adjustments.into_iter().map(Into::into).collect();
    let total_pages = total.div_ceil(query.limit.max(1));
    Ok(Json(ApiResponse::success(PaginatedResponse {
        items,
        total,
        page: query.page,
        limit: query.limit,
        total_pages,
    })))
}

/// Fetch one adjustment with its lines.
#[utoipa::path(
    get,
    path = "/api/v1/adjustments/{id}",
    responses(
        (status = 200, description = "Adjustment returned", body = AdjustmentDetailDto),
        (status = 404, description = "Adjustment not found", body = crate::errors::ErrorResponse)
    ),
    tag = "adjustments"
)]
pub async fn get_adjustment(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let detail = state.services.adjustments.get(&ctx, id).await?;
    Ok(Json(ApiResponse::success(AdjustmentDetailDto::from(detail))))
}

/// DRAFT -> APPROVED. The ledger effect already happened at creation.
#[utoipa::path(
    post,
    path = "/api/v1/adjustments/{id}/approve",
    responses(
        (status = 200, description = "Adjustment approved", body = AdjustmentDto),
        (status = 409, description = "Not in an approvable state", body = crate::errors::ErrorResponse)
    ),
    tag = "adjustments"
)]
pub async fn approve_adjustment(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.adjustments.approve(&ctx, id).await?;
    Ok(Json(ApiResponse::success(AdjustmentDto::from(updated))))
}

/// Cancel an adjustment and restore the pre-adjustment quantities.
#[utoipa::path(
    post,
    path = "/api/v1/adjustments/{id}/cancel",
    responses(
        (status = 200, description = "Adjustment cancelled", body = AdjustmentDto),
        (status = 409, description = "Already cancelled", body = crate::errors::ErrorResponse)
    ),
    tag = "adjustments"
)]
pub async fn cancel_adjustment(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.adjustments.cancel(&ctx, id).await?;
    Ok(Json(ApiResponse::success(AdjustmentDto::from(updated))))
}
