use crate::{
    entities::adjustment::AdjustmentType,
    errors::ErrorResponse,
    handlers::{adjustments, health, inventory, sales_orders, transfers},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockflow API",
        description = "Multi-tenant inventory ledger and stock movement engine",
        version = env!("CARGO_PKG_VERSION")
    ),
    paths(
        health::health_check,
        inventory::list_inventory,
        inventory::get_inventory,
        inventory::receive_inventory,
        transfers::create_transfer,
        transfers::list_transfers,
        transfers::get_transfer,
        transfers::approve_transfer,
        transfers::mark_transfer_in_transit,
        transfers::complete_transfer,
        transfers::cancel_transfer,
        adjustments::create_adjustment,
        adjustments::list_adjustments,
        adjustments::get_adjustment,
        adjustments::approve_adjustment,
        adjustments::cancel_adjustment,
        sales_orders::create_sales_order,
        sales_orders::get_sales_order,
        sales_orders::cancel_sales_order,
    ),
    components(schemas(
        ErrorResponse,
        AdjustmentType,
        health::HealthResponse,
        inventory::InventoryRecordDto,
        inventory::ReceiveInventoryRequest,
        transfers::CreateTransferRequest,
        transfers::CreateTransferLineRequest,
        transfers::TransferDto,
        transfers::TransferLineDto,
        transfers::TransferDetailDto,
        adjustments::CreateAdjustmentRequest,
        adjustments::CreateAdjustmentLineRequest,
        adjustments::AdjustmentDto,
        adjustments::AdjustmentLineDto,
        adjustments::AdjustmentDetailDto,
        sales_orders::CreateSalesOrderRequest,
        sales_orders::CreateSalesOrderLineRequest,
        sales_orders::SalesOrderDto,
        sales_orders::SalesOrderLineDto,
        sales_orders::SalesOrderDetailDto,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "inventory", description = "Inventory ledger records"),
        (name = "transfers", description = "Inter-location stock transfers"),
        (name = "adjustments", description = "Manual stock corrections"),
        (name = "sales-orders", description = "Sales fulfillment decrements")
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at `/swagger-ui`, serving the OpenAPI document at
/// `/api-docs/openapi.json`.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
