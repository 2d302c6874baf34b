use potrero_core::PolygonRecord;
use serde_json::{Value, json};

/// Encodes records as an RFC 7946 `FeatureCollection`.
///
/// One `Feature` per record; geometry type `Polygon` with a single exterior
/// ring in `[lon, lat]` order. A record without a usable ring is skipped, so
/// a `null` geometry is never emitted. Property values keep their source
/// type: `superficie` stays numeric, everything else stays a string, and
/// `cuit` appears only when the record has one.
pub fn feature_collection(records: &[PolygonRecord]) -> Value {
    let features: Vec<Value> = records
        .iter()
        .filter(|r| !r.coords.is_empty())
        .map(feature)
        .collect();
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

fn feature(record: &PolygonRecord) -> Value {
    let mut properties = serde_json::Map::new();
    properties.insert("renspa".to_string(), json!(record.renspa.as_str()));
    properties.insert("titular".to_string(), json!(record.titular));
    properties.insert("localidad".to_string(), json!(record.localidad));
    properties.insert("superficie".to_string(), json!(record.superficie));
    if let Some(cuit) = &record.cuit {
        properties.insert("cuit".to_string(), json!(cuit.as_str()));
    }

    json!({
        "type": "Feature",
        "geometry": {
            "type": "Polygon",
            "coordinates": [record.coords],
        },
        "properties": properties,
    })
}

/// `feature_collection` serialized to text.
pub fn feature_collection_string(records: &[PolygonRecord], pretty: bool) -> crate::Result<String> {
    let value = feature_collection(records);
    Ok(if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use potrero_core::{Cuit, PolygonRecord, Renspa};

    fn record(cuit: Option<&str>) -> PolygonRecord {
        PolygonRecord {
            renspa: Renspa::parse("01.001.0.00123/01").unwrap(),
            coords: vec![
                [-59.13, -37.33],
                [-59.15, -37.35],
                [-59.18, -37.32],
                [-59.13, -37.33],
            ],
            superficie: 52.5,
            titular: "AGRICULTOR EJEMPLO 1".to_string(),
            localidad: "Tandil".to_string(),
            cuit: cuit.map(|c| Cuit::parse(c).unwrap()),
        }
    }

    #[test]
    fn round_trips_the_exterior_ring() {
        let rec = record(None);
        let fc = feature_collection(std::slice::from_ref(&rec));
        assert_eq!(fc["type"], "FeatureCollection");
        assert_eq!(fc["features"].as_array().unwrap().len(), 1);

        let geometry = &fc["features"][0]["geometry"];
        assert_eq!(geometry["type"], "Polygon");
        let ring: Vec<[f64; 2]> =
            serde_json::from_value(geometry["coordinates"][0].clone()).unwrap();
        assert_eq!(ring, rec.coords);
    }

    #[test]
    fn properties_keep_source_types() {
        let fc = feature_collection(&[record(Some("30-65642575-6"))]);
        let props = &fc["features"][0]["properties"];
        assert_eq!(props["renspa"], "01.001.0.00123/01");
        assert_eq!(props["superficie"], 52.5);
        assert_eq!(props["cuit"], "30-65642575-6");
    }

    #[test]
    fn cuit_is_omitted_when_absent() {
        let fc = feature_collection(&[record(None)]);
        assert!(fc["features"][0]["properties"].get("cuit").is_none());
    }

    #[test]
    fn record_without_a_ring_is_skipped() {
        let mut empty = record(None);
        empty.coords.clear();
        let fc = feature_collection(&[empty, record(None)]);
        assert_eq!(fc["features"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn empty_input_yields_an_empty_collection() {
        let fc = feature_collection(&[]);
        assert_eq!(fc["features"].as_array().unwrap().len(), 0);
        assert_eq!(
            feature_collection_string(&[], false).unwrap(),
            r#"{"type":"FeatureCollection","features":[]}"#
        );
    }
}
