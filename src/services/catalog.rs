use crate::{
    db::DbPool,
    entities::{contractor, equipment_category, ore_type, transport, unit, warehouse},
    errors::ServiceError,
};
use sea_orm::{EntityTrait, Iterable, PrimaryKeyToColumn, PrimaryKeyTrait, QueryOrder};
use std::sync::Arc;
use tracing::{error, instrument};

/// Read-only access to reference data
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    async fn list_all<E: EntityTrait>(&self, kind: &str) -> Result<Vec<E::Model>, ServiceError> {
        let mut query = E::find();
        for key in E::PrimaryKey::iter() {
            query = query.order_by_asc(key.into_column());
        }

        query.all(&*self.db_pool).await.map_err(|e| {
            error!(error = %e, kind, "Failed to list catalog entries");
            ServiceError::db_error(e)
        })
    }

    async fn find_one<E>(&self, kind: &str, id: i32) -> Result<E::Model, ServiceError>
    where
        E: EntityTrait,
        <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i32>,
    {
        E::find_by_id(id)
            .one(&*self.db_pool)
            .await
            .map_err(|e| {
                error!(error = %e, kind, id, "Failed to fetch catalog entry");
                ServiceError::db_error(e)
            })?
            .ok_or_else(|| ServiceError::NotFound(format!("{kind} {id} not found")))
    }

    #[instrument(skip(self))]
    pub async fn list_units(&self) -> Result<Vec<unit::Model>, ServiceError> {
        self.list_all::<unit::Entity>("unit").await
    }

    #[instrument(skip(self))]
    pub async fn get_unit(&self, id: i32) -> Result<unit::Model, ServiceError> {
        self.find_one::<unit::Entity>("unit", id).await
    }

    #[instrument(skip(self))]
    pub async fn list_warehouses(&self) -> Result<Vec<warehouse::Model>, ServiceError> {
        self.list_all::<warehouse::Entity>("warehouse").await
    }

    #[instrument(skip(self))]
    pub async fn get_warehouse(&self, id: i32) -> Result<warehouse::Model, ServiceError> {
        self.find_one::<warehouse::Entity>("warehouse", id).await
    }

    #[instrument(skip(self))]
    pub async fn list_ore_types(&self) -> Result<Vec<ore_type::Model>, ServiceError> {
        self.list_all::<ore_type::Entity>("ore type").await
    }

    #[instrument(skip(self))]
    pub async fn get_ore_type(&self, id: i32) -> Result<ore_type::Model, ServiceError> {
        self.find_one::<ore_type::Entity>("ore type", id).await
    }

    #[instrument(skip(self))]
    pub async fn list_equipment_categories(
        &self,
    ) -> Result<Vec<equipment_category::Model>, ServiceError> {
        self.list_all::<equipment_category::Entity>("equipment category")
            .await
    }

    #[instrument(skip(self))]
    pub async fn get_equipment_category(
        &self,
        id: i32,
    ) -> Result<equipment_category::Model, ServiceError> {
        self.find_one::<equipment_category::Entity>("equipment category", id)
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_contractors(&self) -> Result<Vec<contractor::Model>, ServiceError> {
        self.list_all::<contractor::Entity>("contractor").await
    }

    #[instrument(skip(self))]
    pub async fn get_contractor(&self, id: i32) -> Result<contractor::Model, ServiceError> {
        self.find_one::<contractor::Entity>("contractor", id).await
    }

    #[instrument(skip(self))]
    pub async fn list_transport(&self) -> Result<Vec<transport::Model>, ServiceError> {
        self.list_all::<transport::Entity>("transport").await
    }

    #[instrument(skip(self))]
    pub async fn get_transport(&self, id: i32) -> Result<transport::Model, ServiceError> {
        self.find_one::<transport::Entity>("transport", id).await
    }
}
