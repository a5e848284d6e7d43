use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Line item owned by exactly one order. Created only inside the order
/// creation transaction and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub order_id: i32,
    pub batch_id: i32,
    pub unit_id: i32,
    pub quantity: f64,
    pub price_per_unit: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    // No FK in the schema: a batch may disappear under an existing item.
    #[sea_orm(
        belongs_to = "super::ore_batch::Entity",
        from = "Column::BatchId",
        to = "super::ore_batch::Column::Id"
    )]
    OreBatch,
    #[sea_orm(
        belongs_to = "super::unit::Entity",
        from = "Column::UnitId",
        to = "super::unit::Column::Id"
    )]
    Unit,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
