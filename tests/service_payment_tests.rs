use rust_decimal::Decimal;

use todolap_pos::catalog::{
    repositories::{CatalogQuotedServiceRepository, QuotedServiceRepository},
    Catalog,
};
use todolap_pos::models::{QuoteStatus, QuotedServiceId};
use todolap_pos::services::{FormTarget, OutboxFormTarget, PaymentDesk, PaymentError, PresetConfirmation};

fn setup_catalog() -> Catalog {
    Catalog::from_json(
        r#"{
            "servicios": [
                {"id": 1, "nombre": "Formatting", "costo": "150.00"},
                {"id": 2, "nombre": "Maintenance", "costo": "200.00"}
            ],
            "cotizaciones": [
                {"id": 21, "servicio_id": 1, "nombre_cliente": "Maria Lopez", "precio_servicio": "150.00",
                 "precio_productos": "12.50", "precio_total": "162.50",
                 "fecha_creacion": "2026-04-02T15:30:00Z"},
                {"id": 22, "servicio_id": 2, "nombre_cliente": "Jorge Diaz", "precio_servicio": "200.00",
                 "precio_total": "200.00", "fecha_creacion": "2026-04-01T11:00:00Z"},
                {"id": 20, "servicio_id": 2, "nombre_cliente": "Maria Lopez", "precio_servicio": "200.00",
                 "precio_total": "200.00", "estado": "pagado",
                 "fecha_creacion": "2026-03-10T09:00:00Z", "fecha_pago": "2026-03-11T09:00:00Z"}
            ]
        }"#,
    )
    .expect("Failed to parse catalog")
}

#[tokio::test]
async fn test_pay_quoted_service_to_outbox() {
    let catalog = setup_catalog();
    let repo = CatalogQuotedServiceRepository::new(&catalog);
    let dir = tempfile::tempdir().unwrap();
    let outbox = OutboxFormTarget::new(dir.path().join("outbox.jsonl"));

    let pending = repo.find_by_status(QuoteStatus::Quoted, None).await.unwrap();
    assert_eq!(pending.len(), 2);
    let mut desk = PaymentDesk::new(pending);

    let confirmation = PresetConfirmation::accept();
    let form = desk
        .pay(QuotedServiceId(21), &confirmation)
        .unwrap()
        .expect("Payment should be confirmed");
    assert_eq!(form.total, Decimal::new(16250, 2));
    assert!(confirmation.prompts()[0].contains("$162.50"));

    outbox.submit(&form.to_submission()).await.unwrap();
    assert!(desk.mark_paid(form.quote_id, chrono::Utc::now()));

    let stored = outbox.read_all().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].action, "/ventas/pagar-servicio/21/");

    let remaining: Vec<QuotedServiceId> = desk.pending().iter().map(|q| q.id).collect();
    assert_eq!(remaining, vec![QuotedServiceId(22)]);
    assert!(matches!(
        desk.pay(QuotedServiceId(21), &confirmation),
        Err(PaymentError::AlreadyPaid { .. })
    ));
}

#[tokio::test]
async fn test_paid_history_is_searchable() {
    let catalog = setup_catalog();
    let repo = CatalogQuotedServiceRepository::new(&catalog);

    let paid = repo.find_by_status(QuoteStatus::Paid, Some("maria")).await.unwrap();
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].service_name, "Maintenance");

    let quoted = repo.find_by_status(QuoteStatus::Quoted, Some("maria")).await.unwrap();
    assert_eq!(quoted.len(), 1);
    assert_eq!(quoted[0].id, QuotedServiceId(21));

    let found = repo.find_by_id(QuotedServiceId(20)).await.unwrap().unwrap();
    assert!(found.is_paid());
}
