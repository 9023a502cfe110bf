use crate::{
    db::DbPool,
    events::EventSender,
    services::{
        adjustments::AdjustmentService, inventory::InventoryService,
        sales_orders::SalesOrderService, transfers::TransferService,
    },
};
use std::sync::Arc;

pub mod adjustments;
pub mod health;
pub mod inventory;
pub mod sales_orders;
pub mod transfers;

/// Aggregated services used by the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub inventory: Arc<InventoryService>,
    pub transfers: Arc<TransferService>,
    pub adjustments: Arc<AdjustmentService>,
    pub sales_orders: Arc<SalesOrderService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            inventory: Arc::new(InventoryService::new(db.clone(), event_sender.clone())),
            transfers: Arc::new(TransferService::new(db.clone(), event_sender.clone())),
            adjustments: Arc::new(AdjustmentService::new(db.clone(), event_sender.clone())),
            sales_orders: Arc::new(SalesOrderService::new(db, event_sender)),
        }
    }
}
