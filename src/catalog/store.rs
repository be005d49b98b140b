use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use rust_decimal::Decimal;

use crate::models::{Product, QuotedService, Service, ServiceId};
use crate::utils::validation::check_amount;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Duplicate {table} id {id}")]
    DuplicateId { table: &'static str, id: String },
    #[error("Invalid {field} '{value}' for {table} {id}: amounts must be 0 or more, with at most 8 digits and 2 decimals")]
    InvalidAmount {
        table: &'static str,
        id: String,
        field: &'static str,
        value: String,
    },
    #[error("Quote {quote} refers to unknown service {service}")]
    UnknownService { quote: String, service: String },
}

/// On-disk shape of the data set the register pages are rendered from.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogDocument {
    #[serde(rename = "productos", default)]
    pub products: Vec<Product>,
    #[serde(rename = "servicios", default)]
    pub services: Vec<Service>,
    #[serde(rename = "cotizaciones", default)]
    pub quotes: Vec<QuotedService>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogHealth {
    pub products: usize,
    pub services: usize,
    pub out_of_stock: usize,
    pub pending_quotes: usize,
}

/// Read-only snapshot of products and services, loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Arc<Vec<Product>>,
    services: Arc<Vec<Service>>,
    quotes: Arc<Vec<QuotedService>>,
}

fn check_catalog_amount(
    table: &'static str,
    id: impl ToString,
    field: &'static str,
    amount: Decimal,
) -> Result<(), CatalogError> {
    check_amount(amount)
        .map(|_| ())
        .map_err(|_| CatalogError::InvalidAmount {
            table,
            id: id.to_string(),
            field,
            value: amount.to_string(),
        })
}

impl Catalog {
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        tracing::info!("Loading catalog from {}", path.display());

        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CatalogError::Io {
                path: path.display().to_string(),
                source,
            })?;

        let catalog = Self::from_json(&contents)?;
        tracing::info!(
            "Catalog loaded: {} products, {} services",
            catalog.products.len(),
            catalog.services.len()
        );
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    pub fn from_document(mut document: CatalogDocument) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for product in &document.products {
            if !seen.insert(product.id) {
                return Err(CatalogError::DuplicateId {
                    table: "product",
                    id: product.id.to_string(),
                });
            }
            check_catalog_amount("product", product.id, "precio", product.price)?;
        }

        let mut names: HashMap<ServiceId, String> = HashMap::new();
        for service in &document.services {
            if names.insert(service.id, service.name.clone()).is_some() {
                return Err(CatalogError::DuplicateId {
                    table: "service",
                    id: service.id.to_string(),
                });
            }
            check_catalog_amount("service", service.id, "costo", service.cost)?;
        }

        let mut seen = HashSet::new();
        for quote in &mut document.quotes {
            if !seen.insert(quote.id) {
                return Err(CatalogError::DuplicateId {
                    table: "quote",
                    id: quote.id.to_string(),
                });
            }
            check_catalog_amount("quote", quote.id, "precio_servicio", quote.service_price)?;
            check_catalog_amount("quote", quote.id, "precio_productos", quote.products_price)?;
            check_catalog_amount("quote", quote.id, "precio_total", quote.total)?;

            quote.service_name = names
                .get(&quote.service_id)
                .cloned()
                .ok_or_else(|| CatalogError::UnknownService {
                    quote: quote.id.to_string(),
                    service: quote.service_id.to_string(),
                })?;
        }

        Ok(Self {
            products: Arc::new(document.products),
            services: Arc::new(document.services),
            quotes: Arc::new(document.quotes),
        })
    }

    pub fn health_check(&self) -> CatalogHealth {
        let health = CatalogHealth {
            products: self.products.len(),
            services: self.services.len(),
            out_of_stock: self.products.iter().filter(|p| !p.is_available()).count(),
            pending_quotes: self.quotes.iter().filter(|q| !q.is_paid()).count(),
        };
        if health.products == 0 {
            tracing::warn!("Catalog has no products");
        }
        health
    }

    pub fn products(&self) -> Arc<Vec<Product>> {
        Arc::clone(&self.products)
    }

    pub fn services(&self) -> Arc<Vec<Service>> {
        Arc::clone(&self.services)
    }

    pub fn quotes(&self) -> Arc<Vec<QuotedService>> {
        Arc::clone(&self.quotes)
    }
}
