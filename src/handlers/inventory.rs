use crate::{
    auth::TenantContext,
    entities::inventory_record,
    errors::ServiceError,
    services::inventory::StockKey,
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

#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryRecordDto {
    pub item_id: Uuid,
    pub location_id: Uuid,
    pub quantity: i32,
    pub reserved_quantity: i32,
    pub available_quantity: i32,
}

impl From<inventory_record::Model> for InventoryRecordDto {
    fn from(record: inventory_record::Model) -> Self {
        Self {
            item_id: record.item_id,
            location_id: record.location_id,
            quantity: record.quantity,
            reserved_quantity: record.reserved_quantity,
            available_quantity: record.available_quantity(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ReceiveInventoryRequest {
    pub item_id: Uuid,
    pub location_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_inventory))
        .route("/receive", post(receive_inventory))
        .route("/:item_id/:location_id", get(get_inventory))
}

/// List the tenant's inventory records with pagination.
#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    responses(
        (status = 200, description = "Inventory records returned"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (records, total) = state
        .services
        .inventory
        .list_records(ctx.tenant_id, query.page, query.limit)
        .await?;

    let items: Vec<InventoryRecordDto> = records.into_iter().map(Into::into).collect();
    let total_pages = total.div_ceil(query.limit.max(1));
    Ok(Json(ApiResponse::success(PaginatedResponse {
        items,
        total,
        page: query.page,
        limit: query.limit,
        total_pages,
    })))
}

/// Read the stock position of one item at one location.
#[utoipa::path(
    get,
    path = "/api/v1/inventory/{item_id}/{location_id}",
    responses(
        (status = 200, description = "Inventory record returned", body = InventoryRecordDto),
        (status = 404, description = "No record for this item/location", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn get_inventory(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path((item_id, location_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ServiceError> {
    let key = StockKey::new(ctx.tenant_id, item_id, location_id);
    let record = state.services.inventory.get_record(&key).await?;
    Ok(Json(ApiResponse::success(InventoryRecordDto::from(record))))
}

/// Goods-receipt seam: add received stock to on-hand quantity.
#[utoipa::path(
    post,
    path = "/api/v1/inventory/receive",
    request_body = ReceiveInventoryRequest,
    responses(
        (status = 200, description = "Stock received", body = InventoryRecordDto),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "inventory"
)]
pub async fn receive_inventory(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<ReceiveInventoryRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let key = StockKey::new(ctx.tenant_id, payload.item_id, payload.location_id);
    let record = state
        .services
        .inventory
        .receive(key, payload.quantity)
        .await?;
    Ok((
        StatusCode::OK,
        Json(ApiResponse::success(InventoryRecordDto::from(record))),
    ))
}
