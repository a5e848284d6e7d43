//! SeaORM entities, one module per table.

pub mod contractor;
pub mod equipment_category;
pub mod equipment_item;
pub mod log_entry;
pub mod ore_batch;
pub mod ore_type;
pub mod order;
pub mod order_item;
pub mod shipment;
pub mod transport;
pub mod unit;
pub mod warehouse;
