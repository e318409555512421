//! Courier persistence.

use std::sync::Arc;

use async_trait::async_trait;
use geotask_domain::Courier;

use crate::error::StoreError;
use crate::geo::GeoStore;
use crate::repository::CourierRepository;

/// Key holding the serialized courier.
pub const COURIER_KEY: &str = "courier";

/// Courier repository over any `GeoStore`.
pub struct CourierStorage<S: GeoStore> {
    store: Arc<S>,
}

impl<S: GeoStore> CourierStorage<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: GeoStore> CourierRepository for CourierStorage<S> {
    async fn get_one(&self) -> Result<Option<Courier>, StoreError> {
        match self.store.get(COURIER_KEY).await? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, courier: &Courier) -> Result<(), StoreError> {
        let data = serde_json::to_vec(courier)?;
        self.store.set(COURIER_KEY, &data, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use geotask_domain::Point;

    #[tokio::test]
    async fn test_missing_courier_is_none() {
        let storage = CourierStorage::new(Arc::new(MemoryStore::new()));

        assert!(storage.get_one().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let storage = CourierStorage::new(Arc::new(MemoryStore::new()));
        let courier = Courier { score: 3, location: Point::new(59.93, 30.36) };

        storage.save(&courier).await.unwrap();

        assert_eq!(storage.get_one().await.unwrap(), Some(courier));
    }

    #[tokio::test]
    async fn test_corrupt_record_is_serialization_error() {
        let store = Arc::new(MemoryStore::new());
        store.set(COURIER_KEY, b"{not json", None).await.unwrap();
        let storage = CourierStorage::new(store);

        assert!(matches!(storage.get_one().await, Err(StoreError::Serialization(_))));
    }
}
