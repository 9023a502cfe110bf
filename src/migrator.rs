use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_inventory_records_table::Migration),
            Box::new(m20240101_000002_create_transfers_tables::Migration),
            Box::new(m20240101_000003_create_adjustments_tables::Migration),
            Box::new(m20240101_000004_create_sales_orders_tables::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_inventory_records_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_inventory_records_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryRecords::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryRecords::TenantId).uuid().not_null())
                        .col(ColumnDef::new(InventoryRecords::ItemId).uuid().not_null())
                        .col(
                            ColumnDef::new(InventoryRecords::LocationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::Quantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::ReservedQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryRecords::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // One row per (tenant, item, location)
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inventory_records_tenant_item_location")
                        .table(InventoryRecords::Table)
                        .col(InventoryRecords::TenantId)
                        .col(InventoryRecords::ItemId)
                        .col(InventoryRecords::LocationId)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryRecords::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum InventoryRecords {
        Table,
        Id,
        TenantId,
        ItemId,
        LocationId,
        Quantity,
        ReservedQuantity,
        Version,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_transfers_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_transfers_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Transfers::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Transfers::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Transfers::TenantId).uuid().not_null())
                        .col(
                            ColumnDef::new(Transfers::TransferNumber)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Transfers::TransferDate).date().not_null())
                        .col(
                            ColumnDef::new(Transfers::FromLocationId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Transfers::ToLocationId).uuid().not_null())
                        .col(ColumnDef::new(Transfers::Status).string().not_null())
                        .col(ColumnDef::new(Transfers::Notes).string().null())
                        .col(ColumnDef::new(Transfers::CreatedById).uuid().not_null())
                        .col(ColumnDef::new(Transfers::ApprovedById).uuid().null())
                        .col(ColumnDef::new(Transfers::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Transfers::UpdatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transfers_tenant_status")
                        .table(Transfers::Table)
                        .col(Transfers::TenantId)
                        .col(Transfers::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transfers_tenant_date")
                        .table(Transfers::Table)
                        .col(Transfers::TenantId)
                        .col(Transfers::TransferDate)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TransferLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TransferLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(TransferLines::TransferId).uuid().not_null())
                        .col(ColumnDef::new(TransferLines::ItemId).uuid().not_null())
                        .col(ColumnDef::new(TransferLines::Quantity).integer().not_null())
                        .col(ColumnDef::new(TransferLines::Notes).string().null())
                        .col(ColumnDef::new(TransferLines::SerialNumbers).json().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transfer_lines_transfer_id")
                        .table(TransferLines::Table)
                        .col(TransferLines::TransferId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TransferLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Transfers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Transfers {
        Table,
        Id,
        TenantId,
        TransferNumber,
        TransferDate,
        FromLocationId,
        ToLocationId,
        Status,
        Notes,
        CreatedById,
        ApprovedById,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum TransferLines {
        Table,
        Id,
        TransferId,
        ItemId,
        Quantity,
        Notes,
        SerialNumbers,
    }
}

mod m20240101_000003_create_adjustments_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_adjustments_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Adjustments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Adjustments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Adjustments::TenantId).uuid().not_null())
                        .col(
                            ColumnDef::new(Adjustments::AdjustmentNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Adjustments::AdjustmentDate)
                                .date()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Adjustments::LocationId).uuid().not_null())
                        .col(
                            ColumnDef::new(Adjustments::AdjustmentType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Adjustments::Reason).string().not_null())
                        .col(ColumnDef::new(Adjustments::Status).string().not_null())
                        .col(ColumnDef::new(Adjustments::CreatedById).uuid().not_null())
                        .col(ColumnDef::new(Adjustments::ApprovedById).uuid().null())
                        .col(
                            ColumnDef::new(Adjustments::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Adjustments::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_adjustments_tenant_status")
                        .table(Adjustments::Table)
                        .col(Adjustments::TenantId)
                        .col(Adjustments::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(AdjustmentLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(AdjustmentLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AdjustmentLines::AdjustmentId)
                                .uuid()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AdjustmentLines::ItemId).uuid().not_null())
                        .col(
                            ColumnDef::new(AdjustmentLines::BeforeQuantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AdjustmentLines::AfterQuantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(AdjustmentLines::AdjustedQuantity)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(AdjustmentLines::Notes).string().null())
                        .col(
                            ColumnDef::new(AdjustmentLines::SerialNumbers)
                                .json()
                                .null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_adjustment_lines_adjustment_id")
                        .table(AdjustmentLines::Table)
                        .col(AdjustmentLines::AdjustmentId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(AdjustmentLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Adjustments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Adjustments {
        Table,
        Id,
        TenantId,
        AdjustmentNumber,
        AdjustmentDate,
        LocationId,
        AdjustmentType,
        Reason,
        Status,
        CreatedById,
        ApprovedById,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum AdjustmentLines {
        Table,
        Id,
        AdjustmentId,
        ItemId,
        BeforeQuantity,
        AfterQuantity,
        AdjustedQuantity,
        Notes,
        SerialNumbers,
    }
}

mod m20240101_000004_create_sales_orders_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_sales_orders_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SalesOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SalesOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SalesOrders::TenantId).uuid().not_null())
                        .col(ColumnDef::new(SalesOrders::OrderNumber).string().not_null())
                        .col(ColumnDef::new(SalesOrders::OrderDate).date().not_null())
                        .col(ColumnDef::new(SalesOrders::LocationId).uuid().not_null())
                        .col(ColumnDef::new(SalesOrders::Status).string().not_null())
                        .col(ColumnDef::new(SalesOrders::CreatedById).uuid().not_null())
                        .col(
                            ColumnDef::new(SalesOrders::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesOrders::UpdatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(SalesOrderLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SalesOrderLines::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SalesOrderLines::OrderId).uuid().not_null())
                        .col(ColumnDef::new(SalesOrderLines::ItemId).uuid().not_null())
                        .col(
                            ColumnDef::new(SalesOrderLines::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sales_order_lines_order_id")
                        .table(SalesOrderLines::Table)
                        .col(SalesOrderLines::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SalesOrderLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SalesOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum SalesOrders {
        Table,
        Id,
        TenantId,
        OrderNumber,
        OrderDate,
        LocationId,
        Status,
        CreatedById,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum SalesOrderLines {
        Table,
        Id,
        OrderId,
        ItemId,
        Quantity,
    }
}
