use rust_decimal::Decimal;
use std::io::Write;
use tempfile::NamedTempFile;

use todolap_pos::catalog::{
    repositories::{
        CatalogProductRepository, CatalogServiceRepository, ProductRepository, ServiceRepository,
    },
    Catalog, CatalogError,
};
use todolap_pos::models::{ProductId, ServiceId};

const CATALOG_JSON: &str = r#"{
    "productos": [
        {"id": 1, "nombre": "Wireless Mouse", "descripcion": "2.4GHz", "precio": "12.50", "cantidad_stock": 5},
        {"id": 2, "nombre": "USB Keyboard", "precio": "20.00", "cantidad_stock": 0},
        {"id": 3, "nombre": "Mouse Pad", "precio": "4.99", "cantidad_stock": 12}
    ],
    "servicios": [
        {"id": 10, "nombre": "Formatting", "descripcion": "OS reinstall and drivers", "costo": "150.00"},
        {"id": 11, "nombre": "Screen replacement", "descripcion": "Labour only", "costo": "300.00"}
    ]
}"#;

fn write_catalog(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("Failed to create temp catalog");
    file.write_all(contents.as_bytes()).unwrap();
    file
}

async fn setup_catalog() -> (Catalog, NamedTempFile) {
    let file = write_catalog(CATALOG_JSON);
    let catalog = Catalog::from_path(file.path())
        .await
        .expect("Failed to load catalog");
    (catalog, file)
}

#[tokio::test]
async fn test_load_catalog_from_file() {
    let (catalog, _file) = setup_catalog().await;

    let health = catalog.health_check();
    assert_eq!(health.products, 3);
    assert_eq!(health.services, 2);
    assert_eq!(health.out_of_stock, 1);
}

#[tokio::test]
async fn test_missing_catalog_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = Catalog::from_path(dir.path().join("nope.json")).await;

    assert!(matches!(result, Err(CatalogError::Io { .. })));
}

#[tokio::test]
async fn test_malformed_catalog_file() {
    let file = write_catalog("{\"productos\": [");
    let result = Catalog::from_path(file.path()).await;

    assert!(matches!(result, Err(CatalogError::Parse(_))));
}

#[tokio::test]
async fn test_find_product_by_id() {
    let (catalog, _file) = setup_catalog().await;
    let repo = CatalogProductRepository::new(&catalog);

    let product = repo.find_by_id(ProductId(1)).await.unwrap().unwrap();
    assert_eq!(product.name, "Wireless Mouse");
    assert_eq!(product.price, Decimal::new(1250, 2));
    assert_eq!(product.description.as_deref(), Some("2.4GHz"));

    assert!(repo.find_by_id(ProductId(99)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_search_products_ignores_case() {
    let (catalog, _file) = setup_catalog().await;
    let repo = CatalogProductRepository::new(&catalog);

    let found = repo.search("mouse").await.unwrap();
    let ids: Vec<ProductId> = found.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![ProductId(1), ProductId(3)]);

    assert!(repo.search("monitor").await.unwrap().is_empty());
    assert_eq!(repo.search("").await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_available_products_skip_empty_stock() {
    let (catalog, _file) = setup_catalog().await;
    let repo = CatalogProductRepository::new(&catalog);

    let available = repo.find_available().await.unwrap();
    assert_eq!(available.len(), 2);
    assert!(available.iter().all(|p| p.stock > 0));
}

#[tokio::test]
async fn test_service_lookup_and_search() {
    let (catalog, _file) = setup_catalog().await;
    let repo = CatalogServiceRepository::new(&catalog);

    let service = repo.find_by_id(ServiceId(10)).await.unwrap().unwrap();
    assert_eq!(service.cost, Decimal::from(150));

    // Matches on description as well as name.
    let found = repo.search("labour").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, ServiceId(11));

    assert_eq!(repo.find_all().await.unwrap().len(), 2);
}
