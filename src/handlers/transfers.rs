use crate::{
    auth::TenantContext,
    entities::{transfer, transfer_line},
    errors::ServiceError,
    services::transfers::{NewTransfer, NewTransferLine, TransferDetail},
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
pub struct CreateTransferLineRequest {
    pub item_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub notes: Option<String>,
    #[serde(default)]
    pub serial_numbers: Vec<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTransferRequest {
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    pub notes: Option<String>,
    #[validate(length(min = 1))]
    pub lines: Vec<CreateTransferLineRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransferLineDto {
    pub id: Uuid,
    pub item_id: Uuid,
    pub quantity: i32,
    pub notes: Option<String>,
    pub serial_numbers: Option<serde_json::Value>,
}

impl From<transfer_line::Model> for TransferLineDto {
    fn from(line: transfer_line::Model) -> Self {
        Self {
            id: line.id,
            item_id: line.item_id,
            quantity: line.quantity,
            notes: line.notes,
            serial_numbers: line.serial_numbers,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransferDto {
    pub id: Uuid,
    pub transfer_number: String,
    pub status: String,
    pub from_location_id: Uuid,
    pub to_location_id: Uuid,
    pub notes: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<transfer::Model> for TransferDto {
    fn from(model: transfer::Model) -> Self {
        Self {
            id: model.id,
            transfer_number: model.transfer_number,
            status: model.status.to_string(),
            from_location_id: model.from_location_id,
            to_location_id: model.to_location_id,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransferDetailDto {
    #[serde(flatten)]
    pub transfer: TransferDto,
    pub lines: Vec<TransferLineDto>,
}

impl From<TransferDetail> for TransferDetailDto {
    fn from(detail: TransferDetail) -> Self {
        Self {
            transfer: detail.transfer.into(),
            lines: detail.lines.into_iter().map(Into::into).collect(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_transfer).get(list_transfers))
        .route("/:id", get(get_transfer))
        .route("/:id/approve", post(approve_transfer))
        .route("/:id/in-transit", post(mark_transfer_in_transit))
        .route("/:id/complete", post(complete_transfer))
        .route("/:id/cancel", post(cancel_transfer))
}

/// Create a transfer and reserve its quantities at the source location.
#[utoipa::path(
    post,
    path = "/api/v1/transfers",
    request_body = CreateTransferRequest,
    responses(
        (status = 201, description = "Transfer created", body = TransferDetailDto),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 422, description = "Insufficient available stock", body = crate::errors::ErrorResponse)
    ),
    tag = "transfers"
)]
pub async fn create_transfer(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<CreateTransferRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let input = NewTransfer {
        from_location_id: payload.from_location_id,
        to_location_id: payload.to_location_id,
        notes: payload.notes,
        lines: payload
            .lines
            .into_iter()
            .map(|line| NewTransferLine {
                item_id: line.item_id,
                quantity: line.quantity,
                notes: line.notes,
                serial_numbers: line.serial_numbers,
            })
            .collect(),
    };
    let detail = state.services.transfers.create(&ctx, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(TransferDetailDto::from(detail))),
    ))
}

/// List the tenant's transfers, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/transfers",
    responses((status = 200, description = "Transfers returned")),
    tag = "transfers"
)]
pub async fn list_transfers(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (transfers, total) = state
        .services
        .transfers
        .list(&ctx, query.page, query.limit)
        .await?;
    let items: Vec<TransferDto> = transfers.into_iter().map(Into::into).collect();
    let total_pages = total.div_ceil(query.limit.max(1));
    Ok(Json(ApiResponse::success(PaginatedResponse {
        items,
        total,
        page: query.page,
        limit: query.limit,
        total_pages,
    })))
}

/// Fetch one transfer with its lines.
#[utoipa::path(
    get,
    path = "/api/v1/transfers/{id}",
    responses(
        (status = 200, description = "Transfer returned", body = TransferDetailDto),
        (status = 404, description = "Transfer not found", body = crate::errors::ErrorResponse)
    ),
    tag = "transfers"
)]
pub async fn get_transfer(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let detail = state.services.transfers.get(&ctx, id).await?;
    Ok(Json(ApiResponse::success(TransferDetailDto::from(detail))))
}

/// DRAFT -> APPROVED.
#[utoipa::path(
    post,
    path = "/api/v1/transfers/{id}/approve",
    responses(
        (status = 200, description = "Transfer approved", body = TransferDto),
        (status = 409, description = "Not in an approvable state", body = crate::errors::ErrorResponse)
    ),
    tag = "transfers"
)]
pub async fn approve_transfer(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.transfers.approve(&ctx, id).await?;
    Ok(Json(ApiResponse::success(TransferDto::from(updated))))
}

/// APPROVED -> IN_TRANSIT.
#[utoipa::path(
    post,
    path = "/api/v1/transfers/{id}/in-transit",
    responses(
        (status = 200, description = "Transfer marked in transit", body = TransferDto),
        (status = 409, description = "Not in transit-eligible state", body = crate::errors::ErrorResponse)
    ),
    tag = "transfers"
)]
pub async fn mark_transfer_in_transit(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.transfers.mark_in_transit(&ctx, id).await?;
    Ok(Json(ApiResponse::success(TransferDto::from(updated))))
}

/// APPROVED/IN_TRANSIT -> COMPLETED; moves stock to the destination.
#[utoipa::path(
    post,
    path = "/api/v1/transfers/{id}/complete",
    responses(
        (status = 200, description = "Transfer completed", body = TransferDto),
        (status = 409, description = "Not in a completable state", body = crate::errors::ErrorResponse)
    ),
    tag = "transfers"
)]
pub async fn complete_transfer(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.transfers.complete(&ctx, id).await?;
    Ok(Json(ApiResponse::success(TransferDto::from(updated))))
}

/// Any non-terminal state -> CANCELLED; releases the source reservation.
#[utoipa::path(
    post,
    path = "/api/v1/transfers/{id}/cancel",
    responses(
        (status = 200, description = "Transfer cancelled", body = TransferDto),
        (status = 409, description = "Already cancelled or completed", body = crate::errors::ErrorResponse)
    ),
    tag = "transfers"
)]
pub async fn cancel_transfer(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.transfers.cancel(&ctx, id).await?;
    Ok(Json(ApiResponse::success(TransferDto::from(updated))))
}
