use zoningbot::boundaries::{BoundaryLayer, BoundaryPolygon};
use zoningbot::store::Store;
use zoningbot::types::OrdinanceRecord;

fn ordinance(number: &str, published: &str) -> OrdinanceRecord {
    OrdinanceRecord {
        matter_id: format!("id-{number}"),
        record_number: number.to_string(),
        status: "Active".to_string(),
        sub_status: "Referred".to_string(),
        introduction_date: "2025-02-01T00:00:00.000Z".to_string(),
        final_action_date: None,
        title: "Zoning Reclassification".to_string(),
        record_create_date: "2025-02-01T00:00:00.000Z".to_string(),
        matter_category: "ZONING RECLASSIFICATIONS".to_string(),
        last_publication_date: published.to_string(),
        address: Some("2934 N Milwaukee Ave".to_string()),
    }
}

fn square_layer(name: &str) -> BoundaryLayer {
    use geo::polygon;
    BoundaryLayer::new(vec![BoundaryPolygon {
        name: name.to_string(),
        geometry: geo::MultiPolygon(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
            (x: 0.0, y: 0.0),
        ]]),
    }])
}

#[test]
fn upsert_survives_reopen_and_stays_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zoningbot.db");

    {
        let store = Store::open(&path).unwrap();
        store
            .upsert_ordinances(&[ordinance("O2025-001", "2025-02-02T00:00:00.000Z")])
            .unwrap();
    }

    // Re-running the same upsert against the reopened store changes nothing
    let store = Store::open(&path).unwrap();
    store
        .upsert_ordinances(&[ordinance("O2025-001", "2025-02-02T00:00:00.000Z")])
        .unwrap();

    let stored = store.all_ordinances().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].record_number, "O2025-001");
}

#[test]
fn watermark_is_monotonic_across_runs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zoningbot.db");

    let first_watermark = {
        let store = Store::open(&path).unwrap();
        store
            .upsert_ordinances(&[ordinance("O2025-001", "2025-02-02T00:00:00.000Z")])
            .unwrap();
        store.last_watermark().unwrap().unwrap()
    };

    let store = Store::open(&path).unwrap();
    store
        .upsert_ordinances(&[
            // An older record arriving late must not move the watermark back
            ordinance("O2025-000", "2025-01-15T00:00:00.000Z"),
            ordinance("O2025-002", "2025-03-01T00:00:00.000Z"),
        ])
        .unwrap();
    let second_watermark = store.last_watermark().unwrap().unwrap();

    assert!(second_watermark >= first_watermark);
    assert_eq!(second_watermark, "2025-03-01T00:00:00.000Z");
}

#[test]
fn reference_layers_are_created_once_and_never_altered() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("zoningbot.db");

    {
        let store = Store::open(&path).unwrap();
        store
            .ensure_reference_layers(&square_layer("AVONDALE"), &square_layer("30"))
            .unwrap();
    }

    // A second run with different layer contents must not replace the
    // stored reference data
    let store = Store::open(&path).unwrap();
    store
        .ensure_reference_layers(&square_layer("SOMEWHERE ELSE"), &square_layer("99"))
        .unwrap();

    assert_eq!(
        store.reference_layer_names("communities").unwrap(),
        vec!["AVONDALE".to_string()]
    );
    assert_eq!(
        store.reference_layer_names("wards").unwrap(),
        vec!["30".to_string()]
    );
}
