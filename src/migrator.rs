use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_catalog_tables::Migration),
            Box::new(m20240301_000002_create_inventory_tables::Migration),
            Box::new(m20240301_000003_create_orders_tables::Migration),
            Box::new(m20240301_000004_create_shipments_table::Migration),
            Box::new(m20240301_000005_create_logs_table::Migration),
        ]
    }
}

fn id_column<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

mod m20240301_000001_create_catalog_tables {
    use super::id_column;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Units::Table)
                        .if_not_exists()
                        .col(&mut id_column(Units::Id))
                        .col(ColumnDef::new(Units::Name).string().not_null())
                        .col(ColumnDef::new(Units::Symbol).string().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Warehouses::Table)
                        .if_not_exists()
                        .col(&mut id_column(Warehouses::Id))
                        .col(ColumnDef::new(Warehouses::Name).string().not_null())
                        .col(ColumnDef::new(Warehouses::Location).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OreTypes::Table)
                        .if_not_exists()
                        .col(&mut id_column(OreTypes::Id))
                        .col(ColumnDef::new(OreTypes::Name).string().not_null())
                        .col(ColumnDef::new(OreTypes::Description).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(EquipmentCategories::Table)
                        .if_not_exists()
                        .col(&mut id_column(EquipmentCategories::Id))
                        .col(
                            ColumnDef::new(EquipmentCategories::Name)
                                .string()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Contractors::Table)
                        .if_not_exists()
                        .col(&mut id_column(Contractors::Id))
                        .col(ColumnDef::new(Contractors::Name).string().not_null())
                        .col(ColumnDef::new(Contractors::Contact).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Transport::Table)
                        .if_not_exists()
                        .col(&mut id_column(Transport::Id))
                        .col(ColumnDef::new(Transport::Name).string().not_null())
                        .col(ColumnDef::new(Transport::PlateNumber).string().null())
                        .col(ColumnDef::new(Transport::Capacity).double().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Transport::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Contractors::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(EquipmentCategories::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OreTypes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Warehouses::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Units::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Units {
        Table,
        Id,
        Name,
        Symbol,
    }

    #[derive(DeriveIden)]
    enum Warehouses {
        Table,
        Id,
        Name,
        Location,
    }

    #[derive(DeriveIden)]
    enum OreTypes {
        Table,
        Id,
        Name,
        Description,
    }

    #[derive(DeriveIden)]
    enum EquipmentCategories {
        Table,
        Id,
        Name,
    }

    #[derive(DeriveIden)]
    enum Contractors {
        Table,
        Id,
        Name,
        Contact,
    }

    #[derive(DeriveIden)]
    enum Transport {
        Table,
        Id,
        Name,
        PlateNumber,
        Capacity,
    }
}

mod m20240301_000002_create_inventory_tables {
    use super::id_column;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_inventory_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OreBatches::Table)
                        .if_not_exists()
                        .col(&mut id_column(OreBatches::Id))
                        .col(ColumnDef::new(OreBatches::BatchCode).string().not_null())
                        .col(ColumnDef::new(OreBatches::OreTypeId).integer().not_null())
                        .col(ColumnDef::new(OreBatches::WarehouseId).integer().not_null())
                        .col(ColumnDef::new(OreBatches::UnitId).integer().not_null())
                        .col(ColumnDef::new(OreBatches::Quantity).double().not_null())
                        .col(ColumnDef::new(OreBatches::Quality).double().null())
                        .col(ColumnDef::new(OreBatches::Priority).string().null())
                        .col(ColumnDef::new(OreBatches::Status).string().null())
                        .col(ColumnDef::new(OreBatches::MinedOn).date().null())
                        .col(
                            ColumnDef::new(OreBatches::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_ore_batches_ore_type_id")
                                .from(OreBatches::Table, OreBatches::OreTypeId)
                                .to(OreTypes::Table, OreTypes::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_ore_batches_warehouse_id")
                                .from(OreBatches::Table, OreBatches::WarehouseId)
                                .to(Warehouses::Table, Warehouses::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_ore_batches_unit_id")
                                .from(OreBatches::Table, OreBatches::UnitId)
                                .to(Units::Table, Units::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(EquipmentItems::Table)
                        .if_not_exists()
                        .col(&mut id_column(EquipmentItems::Id))
                        .col(
                            ColumnDef::new(EquipmentItems::CategoryId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EquipmentItems::WarehouseId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EquipmentItems::UnitId).integer().not_null())
                        .col(ColumnDef::new(EquipmentItems::Quantity).double().not_null())
                        .col(ColumnDef::new(EquipmentItems::SerialNumber).string().null())
                        .col(
                            ColumnDef::new(EquipmentItems::ServiceLifeMonths)
                                .integer()
                                .null(),
                        )
                        .col(ColumnDef::new(EquipmentItems::Status).string().null())
                        .col(
                            ColumnDef::new(EquipmentItems::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_equipment_items_category_id")
                                .from(EquipmentItems::Table, EquipmentItems::CategoryId)
                                .to(EquipmentCategories::Table, EquipmentCategories::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_equipment_items_warehouse_id")
                                .from(EquipmentItems::Table, EquipmentItems::WarehouseId)
                                .to(Warehouses::Table, Warehouses::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_equipment_items_unit_id")
                                .from(EquipmentItems::Table, EquipmentItems::UnitId)
                                .to(Units::Table, Units::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(EquipmentItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OreBatches::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum OreBatches {
        Table,
        Id,
        BatchCode,
        OreTypeId,
        WarehouseId,
        UnitId,
        Quantity,
        Quality,
        Priority,
        Status,
        MinedOn,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum EquipmentItems {
        Table,
        Id,
        CategoryId,
        WarehouseId,
        UnitId,
        Quantity,
        SerialNumber,
        ServiceLifeMonths,
        Status,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum OreTypes {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum EquipmentCategories {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Warehouses {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Units {
        Table,
        Id,
    }
}

mod m20240301_000003_create_orders_tables {
    use super::id_column;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_orders_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(&mut id_column(Orders::Id))
                        .col(ColumnDef::new(Orders::OrderNumber).string().not_null())
                        .col(ColumnDef::new(Orders::ContractorId).integer().not_null())
                        .col(ColumnDef::new(Orders::WarehouseId).integer().not_null())
                        .col(
                            ColumnDef::new(Orders::Status)
                                .string()
                                .not_null()
                                .default("new"),
                        )
                        .col(ColumnDef::new(Orders::OrderDate).date().not_null())
                        .col(
                            ColumnDef::new(Orders::TotalQuantity)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_contractor_id")
                                .from(Orders::Table, Orders::ContractorId)
                                .to(Contractors::Table, Contractors::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_warehouse_id")
                                .from(Orders::Table, Orders::WarehouseId)
                                .to(Warehouses::Table, Warehouses::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_created_at")
                        .table(Orders::Table)
                        .col(Orders::CreatedAt)
                        .to_owned(),
                )
                .await?;

            // No foreign key on batch_id: items outlive the batch they reference
            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(&mut id_column(OrderItems::Id))
                        .col(ColumnDef::new(OrderItems::OrderId).integer().not_null())
                        .col(ColumnDef::new(OrderItems::BatchId).integer().not_null())
                        .col(ColumnDef::new(OrderItems::UnitId).integer().not_null())
                        .col(ColumnDef::new(OrderItems::Quantity).double().not_null())
                        .col(
                            ColumnDef::new(OrderItems::PricePerUnit)
                                .double()
                                .not_null()
                                .default(0.0),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_order_id")
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_order_items_unit_id")
                                .from(OrderItems::Table, OrderItems::UnitId)
                                .to(Units::Table, Units::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_batch_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::BatchId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        OrderNumber,
        ContractorId,
        WarehouseId,
        Status,
        OrderDate,
        TotalQuantity,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum OrderItems {
        Table,
        Id,
        OrderId,
        BatchId,
        UnitId,
        Quantity,
        PricePerUnit,
    }

    #[derive(DeriveIden)]
    enum Contractors {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Warehouses {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Units {
        Table,
        Id,
    }
}

mod m20240301_000004_create_shipments_table {
    use super::id_column;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_shipments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Shipments::Table)
                        .if_not_exists()
                        .col(&mut id_column(Shipments::Id))
                        .col(ColumnDef::new(Shipments::OrderId).integer().not_null())
                        .col(ColumnDef::new(Shipments::TransportId).integer().null())
                        .col(ColumnDef::new(Shipments::PlannedDate).date().null())
                        .col(ColumnDef::new(Shipments::ActualDate).date().null())
                        .col(
                            ColumnDef::new(Shipments::Status)
                                .string()
                                .not_null()
                                .default("planned"),
                        )
                        .col(
                            ColumnDef::new(Shipments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Shipments::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_shipments_order_id")
                                .from(Shipments::Table, Shipments::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_shipments_transport_id")
                                .from(Shipments::Table, Shipments::TransportId)
                                .to(Transport::Table, Transport::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_shipments_order_id")
                        .table(Shipments::Table)
                        .col(Shipments::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Shipments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Shipments {
        Table,
        Id,
        OrderId,
        TransportId,
        PlannedDate,
        ActualDate,
        Status,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Transport {
        Table,
        Id,
    }
}

mod m20240301_000005_create_logs_table {
    use super::id_column;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_logs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Logs::Table)
                        .if_not_exists()
                        .col(&mut id_column(Logs::Id))
                        .col(
                            ColumnDef::new(Logs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Logs::Actor).string().not_null())
                        .col(ColumnDef::new(Logs::Action).string().not_null())
                        .col(ColumnDef::new(Logs::EntityKind).string().not_null())
                        .col(ColumnDef::new(Logs::Detail).text().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_logs_created_at")
                        .table(Logs::Table)
                        .col(Logs::CreatedAt)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Logs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Logs {
        Table,
        Id,
        CreatedAt,
        Actor,
        Action,
        EntityKind,
        Detail,
    }
}
