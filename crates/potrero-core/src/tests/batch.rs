use crate::*;
use std::collections::HashMap;

const RING_A: &str = "(-37.33,-59.13)(-37.35,-59.15)(-37.32,-59.18)";
const RING_B: &str = "(-36.10,-58.20)(-36.12,-58.22)(-36.09,-58.25)";

fn item(renspa: &str, poligono: Option<&str>) -> RegistryItem {
    RegistryItem {
        renspa: renspa.to_string(),
        poligono: poligono.map(str::to_string),
        titular: Some("TITULAR".to_string()),
        localidad: Some("Tandil".to_string()),
        superficie: Some(52.5),
        ..RegistryItem::default()
    }
}

/// Detail collaborator backed by a fixed map; `fail` makes every call error.
#[derive(Default)]
struct MapFetch {
    details: HashMap<String, RegistryItem>,
    fail: bool,
}

impl DetailFetch for MapFetch {
    fn fetch_detail(
        &self,
        renspa: &Renspa,
    ) -> std::result::Result<Option<RegistryItem>, DetailFetchError> {
        if self.fail {
            return Err(DetailFetchError {
                renspa: renspa.as_str().to_string(),
                message: "simulated outage".to_string(),
            });
        }
        Ok(self.details.get(renspa.as_str()).cloned())
    }
}

#[test]
fn one_bad_item_never_aborts_the_batch() {
    let items = vec![
        item("01.001.0.00123/01", Some(RING_A)),
        item("01.001.0.00456/02", Some("(no,geometry)")),
        item("01.001.0.00789/03", Some(RING_B)),
    ];
    let outcome = Processor::new().process_batch(&items, &NoDetailFetch);

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.failed, vec!["01.001.0.00456/02".to_string()]);
    // Output order matches input order of the items that produced a record.
    assert_eq!(outcome.records[0].renspa.as_str(), "01.001.0.00123/01");
    assert_eq!(outcome.records[1].renspa.as_str(), "01.001.0.00789/03");
}

#[test]
fn detail_lookup_supplies_the_missing_polygon() {
    let mut bare = item("01.001.0.00123/01", None);
    bare.titular = None;

    let mut fetch = MapFetch::default();
    let mut detail = item("01.001.0.00123/01", Some(RING_A));
    detail.titular = Some("DESDE DETALLE".to_string());
    fetch
        .details
        .insert("01.001.0.00123/01".to_string(), detail);

    let outcome = Processor::new().process_batch(&[bare], &fetch);
    assert_eq!(outcome.records.len(), 1);
    assert!(outcome.failed.is_empty());
    // The detail item fills fields the bulk item lacked.
    assert_eq!(outcome.records[0].titular, "DESDE DETALLE");
    assert_eq!(outcome.records[0].coords.len(), 4);
}

#[test]
fn inline_polygon_wins_over_a_differing_detail() {
    let mut fetch = MapFetch::default();
    fetch.details.insert(
        "01.001.0.00123/01".to_string(),
        item("01.001.0.00123/01", Some(RING_B)),
    );

    let items = vec![item("01.001.0.00123/01", Some(RING_A))];
    let outcome = Processor::new().process_batch(&items, &fetch);
    assert_eq!(outcome.records[0].coords[0], [-59.13, -37.33]);
}

#[test]
fn failing_collaborator_downgrades_to_no_geometry() {
    let fetch = MapFetch {
        fail: true,
        ..MapFetch::default()
    };
    let items = vec![
        item("01.001.0.00123/01", None),
        item("01.001.0.00456/02", Some(RING_A)),
    ];
    let outcome = Processor::new().process_batch(&items, &fetch);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.failed, vec!["01.001.0.00123/01".to_string()]);
}

#[test]
fn unparseable_renspa_is_recorded_and_skipped() {
    let items = vec![item("not-a-renspa", Some(RING_A))];
    let outcome = Processor::new().process_batch(&items, &NoDetailFetch);
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.failed, vec!["not-a-renspa".to_string()]);
}

#[test]
fn flat_digit_renspa_is_canonicalized_in_the_output() {
    let items = vec![item("0100100012301", Some(RING_A))];
    let outcome = Processor::new().process_batch(&items, &NoDetailFetch);
    assert_eq!(outcome.records[0].renspa.as_str(), "01.001.0.00123/01");
}

#[test]
fn duplicate_renspa_is_taken_once() {
    let items = vec![
        item("01.001.0.00123/01", Some(RING_A)),
        item("0100100012301", Some(RING_B)),
    ];
    let outcome = Processor::new().process_batch(&items, &NoDetailFetch);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].coords[0], [-59.13, -37.33]);
}

#[test]
fn only_active_skips_deregistered_items() {
    let mut inactive = item("01.001.0.00456/02", Some(RING_B));
    inactive.fecha_baja = Some("2021-03-04".to_string());

    let items = vec![item("01.001.0.00123/01", Some(RING_A)), inactive];
    let outcome = Processor::new()
        .with_only_active(true)
        .process_batch(&items, &NoDetailFetch);
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.skipped_inactive, 1);
    assert!(outcome.failed.is_empty());
}

#[test]
fn missing_superficie_defaults_to_zero() {
    let mut bare = item("01.001.0.00123/01", Some(RING_A));
    bare.superficie = None;
    let outcome = Processor::new().process_batch(&[bare], &NoDetailFetch);
    assert_eq!(outcome.records[0].superficie, 0.0);
}

#[test]
fn malformed_cuit_on_an_item_is_dropped_silently() {
    let mut tagged = item("01.001.0.00123/01", Some(RING_A));
    tagged.cuit = Some("not-a-cuit".to_string());
    let outcome = Processor::new().process_batch(&[tagged], &NoDetailFetch);
    assert_eq!(outcome.records[0].cuit, None);
}

#[test]
fn summary_counts_and_renders_the_aggregate_line() {
    let mut inactive = item("01.001.0.01012/04", Some(RING_A));
    inactive.fecha_baja = Some("2020-01-01".to_string());
    let items = vec![
        item("01.001.0.00123/01", Some(RING_A)),
        item("01.001.0.00456/02", None),
        item("01.001.0.00789/03", Some(RING_B)),
        inactive,
    ];
    let outcome = Processor::new()
        .with_only_active(true)
        .process_batch(&items, &NoDetailFetch);

    let summary = outcome.summary();
    assert_eq!(summary.processed, 4);
    assert_eq!(summary.with_geometry, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.to_string(), "4 processed, 2 with geometry, 1 failed");
}

#[test]
fn registry_item_deserializes_from_upstream_json() {
    let raw = r#"{
        "renspa": "01.001.0.00123/01",
        "poligono": "(-37.33,-59.13)(-37.35,-59.15)(-37.32,-59.18)",
        "titular": "AGRICULTOR EJEMPLO 1",
        "localidad": "Tandil",
        "superficie": 120.3,
        "fecha_baja": null,
        "extra_upstream_key": true
    }"#;
    let item: RegistryItem = serde_json::from_str(raw).unwrap();
    assert!(item.is_active());
    assert_eq!(item.titular.as_deref(), Some("AGRICULTOR EJEMPLO 1"));
    assert!(item.cuit.is_none());
}
