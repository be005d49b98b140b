use async_trait::async_trait;
use std::sync::Arc;

use crate::catalog::store::{Catalog, CatalogError};
use crate::models::{Service, ServiceId};

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Service>, CatalogError>;
    async fn find_by_id(&self, id: ServiceId) -> Result<Option<Service>, CatalogError>;
    async fn search(&self, term: &str) -> Result<Vec<Service>, CatalogError>;
}

pub struct CatalogServiceRepository {
    services: Arc<Vec<Service>>,
}

impl CatalogServiceRepository {
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            services: catalog.services(),
        }
    }
}

#[async_trait]
impl ServiceRepository for CatalogServiceRepository {
    async fn find_all(&self) -> Result<Vec<Service>, CatalogError> {
        Ok(self.services.as_ref().clone())
    }

    async fn find_by_id(&self, id: ServiceId) -> Result<Option<Service>, CatalogError> {
        Ok(self.services.iter().find(|s| s.id == id).cloned())
    }

    async fn search(&self, term: &str) -> Result<Vec<Service>, CatalogError> {
        let needle = term.trim().to_lowercase();
        Ok(self
            .services
            .iter()
            .filter(|s| {
                s.name.to_lowercase().contains(&needle)
                    || s.description.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }
}
