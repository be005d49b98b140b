use async_trait::async_trait;
use std::cmp::Reverse;
use std::sync::Arc;

use crate::catalog::store::{Catalog, CatalogError};
use crate::models::{QuoteStatus, QuotedService, QuotedServiceId};

/// Quotes issued to customers, for the payment counter.
#[async_trait]
pub trait QuotedServiceRepository: Send + Sync {
    async fn find_by_id(&self, id: QuotedServiceId) -> Result<Option<QuotedService>, CatalogError>;
    /// Quotes in `status`, newest first: pending ones by creation date, paid
    /// ones by payment date. `term` matches the customer or the service name.
    async fn find_by_status(
        &self,
        status: QuoteStatus,
        term: Option<&str>,
    ) -> Result<Vec<QuotedService>, CatalogError>;
}

pub struct CatalogQuotedServiceRepository {
    quotes: Arc<Vec<QuotedService>>,
}

impl CatalogQuotedServiceRepository {
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            quotes: catalog.quotes(),
        }
    }
}

#[async_trait]
impl QuotedServiceRepository for CatalogQuotedServiceRepository {
    async fn find_by_id(&self, id: QuotedServiceId) -> Result<Option<QuotedService>, CatalogError> {
        Ok(self.quotes.iter().find(|q| q.id == id).cloned())
    }

    async fn find_by_status(
        &self,
        status: QuoteStatus,
        term: Option<&str>,
    ) -> Result<Vec<QuotedService>, CatalogError> {
        let needle = term.map(|t| t.trim().to_lowercase()).unwrap_or_default();

        let mut quotes: Vec<QuotedService> = self
            .quotes
            .iter()
            .filter(|q| q.status == status)
            .filter(|q| {
                needle.is_empty()
                    || q.customer_name.to_lowercase().contains(&needle)
                    || q.service_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();

        match status {
            QuoteStatus::Quoted => quotes.sort_by_key(|q| Reverse(q.created_at)),
            QuoteStatus::Paid => quotes.sort_by_key(|q| Reverse(q.paid_at)),
        }
        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository() -> CatalogQuotedServiceRepository {
        let catalog = Catalog::from_json(
            r#"{
                "servicios": [
                    {"id": 1, "nombre": "Formatting", "costo": "150.00"},
                    {"id": 2, "nombre": "Screen replacement", "costo": "300.00"}
                ],
                "cotizaciones": [
                    {"id": 10, "servicio_id": 1, "nombre_cliente": "Ana Ruiz", "precio_servicio": "150.00",
                     "precio_total": "150.00", "fecha_creacion": "2026-03-01T10:00:00Z"},
                    {"id": 11, "servicio_id": 2, "nombre_cliente": "Luis Gil", "precio_servicio": "300.00",
                     "precio_total": "300.00", "fecha_creacion": "2026-03-05T10:00:00Z"},
                    {"id": 12, "servicio_id": 1, "nombre_cliente": "Eva Paz", "precio_servicio": "150.00",
                     "precio_total": "150.00", "estado": "pagado",
                     "fecha_creacion": "2026-01-01T10:00:00Z", "fecha_pago": "2026-01-02T09:00:00Z"}
                ]
            }"#,
        )
        .unwrap();
        CatalogQuotedServiceRepository::new(&catalog)
    }

    #[test]
    fn test_pending_quotes_newest_first() {
        let repo = repository();
        let pending = tokio_test::block_on(repo.find_by_status(QuoteStatus::Quoted, None)).unwrap();
        let ids: Vec<QuotedServiceId> = pending.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![QuotedServiceId(11), QuotedServiceId(10)]);
    }

    #[test]
    fn test_search_matches_customer_or_service() {
        let repo = repository();
        let by_service =
            tokio_test::block_on(repo.find_by_status(QuoteStatus::Quoted, Some("SCREEN"))).unwrap();
        assert_eq!(by_service.len(), 1);
        assert_eq!(by_service[0].customer_name, "Luis Gil");

        let by_customer =
            tokio_test::block_on(repo.find_by_status(QuoteStatus::Paid, Some("eva"))).unwrap();
        assert_eq!(by_customer.len(), 1);
        assert!(tokio_test::block_on(repo.find_by_status(QuoteStatus::Paid, Some("ana")))
            .unwrap()
            .is_empty());
    }
}
