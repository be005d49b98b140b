use async_trait::async_trait;
use std::sync::Arc;

use crate::catalog::store::{Catalog, CatalogError};
use crate::models::{Product, ProductId};

/// Product repository trait for catalog lookups
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Product>, CatalogError>;
    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, CatalogError>;
    /// Case-insensitive name match, as typed into the product search box.
    async fn search(&self, term: &str) -> Result<Vec<Product>, CatalogError>;
    /// Products with stock left, the choices offered when quoting.
    async fn find_available(&self) -> Result<Vec<Product>, CatalogError>;
}

/// ProductRepository backed by a loaded [`Catalog`]
pub struct CatalogProductRepository {
    products: Arc<Vec<Product>>,
}

impl CatalogProductRepository {
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            products: catalog.products(),
        }
    }
}

#[async_trait]
impl ProductRepository for CatalogProductRepository {
    async fn find_all(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self.products.as_ref().clone())
    }

    async fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, CatalogError> {
        Ok(self.products.iter().find(|p| p.id == id).cloned())
    }

    async fn search(&self, term: &str) -> Result<Vec<Product>, CatalogError> {
        let needle = term.trim().to_lowercase();
        let products = self
            .products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(products)
    }

    async fn find_available(&self) -> Result<Vec<Product>, CatalogError> {
        Ok(self
            .products
            .iter()
            .filter(|p| p.is_available())
            .cloned()
            .collect())
    }
}
