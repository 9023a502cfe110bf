use crate::{
    auth::TenantContext,
    entities::{sales_order, sales_order_line},
    errors::ServiceError,
    services::sales_orders::{NewSalesOrder, NewSalesOrderLine, SalesOrderDetail},
    ApiResponse, AppState,
};
use axum::{
    extract::{Path, State},
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
pub struct CreateSalesOrderLineRequest {
    pub item_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateSalesOrderRequest {
    pub location_id: Uuid,
    #[validate(length(min = 1))]
    pub lines: Vec<CreateSalesOrderLineRequest>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesOrderLineDto {
    pub id: Uuid,
    pub item_id: Uuid,
    pub quantity: i32,
}

impl From<sales_order_line::Model> for SalesOrderLineDto {
    fn from(line: sales_order_line::Model) -> Self {
        Self {
            id: line.id,
            item_id: line.item_id,
            quantity: line.quantity,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesOrderDto {
    pub id: Uuid,
    pub order_number: String,
    pub status: String,
    pub location_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<sales_order::Model> for SalesOrderDto {
    fn from(model: sales_order::Model) -> Self {
        Self {
            id: model.id,
            order_number: model.order_number,
            status: model.status.to_string(),
            location_id: model.location_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SalesOrderDetailDto {
    #[serde(flatten)]
    pub order: SalesOrderDto,
    pub lines: Vec<SalesOrderLineDto>,
}

impl From<SalesOrderDetail> for SalesOrderDetailDto {
    fn from(detail: SalesOrderDetail) -> Self {
        Self {
            order: detail.order.into(),
            lines: detail.lines.into_iter().map(Into::into).collect(),
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_sales_order))
        .route("/:id", get(get_sales_order))
        .route("/:id/cancel", post(cancel_sales_order))
}

/// Create a sales order and decrement on-hand stock per line. Negative
/// on-hand is a valid backorder position.
#[utoipa::path(
    post,
    path = "/api/v1/sales-orders",
    request_body = CreateSalesOrderRequest,
    responses(
        (status = 201, description = "Sales order created", body = SalesOrderDetailDto),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    ),
    tag = "sales-orders"
)]
pub async fn create_sales_order(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(payload): Json<CreateSalesOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let input = NewSalesOrder {
        location_id: payload.location_id,
        lines: payload
            .lines
            .into_iter()
            .map(|line| NewSalesOrderLine {
                item_id: line.item_id,
                quantity: line.quantity,
            })
            .collect(),
    };
    let detail = state.services.sales_orders.create(&ctx, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(SalesOrderDetailDto::from(detail))),
    ))
}

/// Fetch one sales order with its lines.
#[utoipa::path(
    get,
    path = "/api/v1/sales-orders/{id}",
    responses(
        (status = 200, description = "Sales order returned", body = SalesOrderDetailDto),
        (status = 404, description = "Sales order not found", body = crate::errors::ErrorResponse)
    ),
    tag = "sales-orders"
)]
pub async fn get_sales_order(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let detail = state.services.sales_orders.get(&ctx, id).await?;
    Ok(Json(ApiResponse::success(SalesOrderDetailDto::from(detail))))
}

/// PENDING -> CANCELLED, restocking each line's quantity.
#[utoipa::path(
    post,
    path = "/api/v1/sales-orders/{id}/cancel",
    responses(
        (status = 200, description = "Sales order cancelled", body = SalesOrderDto),
        (status = 409, description = "Already cancelled", body = crate::errors::ErrorResponse)
    ),
    tag = "sales-orders"
)]
pub async fn cancel_sales_order(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.sales_orders.cancel(&ctx, id).await?;
    Ok(Json(ApiResponse::success(SalesOrderDto::from(updated))))
}
