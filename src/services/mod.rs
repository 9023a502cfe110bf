pub mod adjustments;
pub mod inventory;
pub mod sales_orders;
pub mod transfers;
