pub mod adjustment;
pub mod adjustment_line;
pub mod inventory_record;
pub mod sales_order;
pub mod sales_order_line;
pub mod transfer;
pub mod transfer_line;
