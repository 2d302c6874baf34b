use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn aoi_collection_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)var aoi = ee\.FeatureCollection\(.*?\);").expect("valid regex")
    })
}

fn aoi_assignment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"var aoi = [^;]*;").expect("valid regex"))
}

/// Bundled Earth-Engine analysis script: yearly cloud-filtered NDVI
/// composites (2019-2023) over the loaded AOI. The `var aoi` assignment is
/// the splice target of [`splice_aoi`].
pub const ANALYSIS_TEMPLATE: &str = r#"// Analisis historico de cultivos sobre los campos cargados.
var aoi = ee.FeatureCollection([]);

var inicio = 2019;
var fin = 2023;

Map.centerObject(aoi, 12);
Map.addLayer(aoi.style({color: 'red', fillColor: '00000000'}), {}, 'Campos');

for (var anio = inicio; anio <= fin; anio++) {
  var coleccion = ee.ImageCollection('COPERNICUS/S2_SR_HARMONIZED')
    .filterBounds(aoi)
    .filterDate(anio + '-01-01', anio + '-12-31')
    .filter(ee.Filter.lt('CLOUDY_PIXEL_PERCENTAGE', 20));
  var ndvi = coleccion.map(function (imagen) {
    return imagen.normalizedDifference(['B8', 'B4']).rename('NDVI');
  }).median().clip(aoi);
  Map.addLayer(ndvi, {min: 0, max: 1, palette: ['white', 'green']}, 'NDVI ' + anio, false);
}
"#;

/// Emits the AOI construction call for the Polygon features of a GeoJSON
/// `FeatureCollection` value.
///
/// Each feature becomes `ee.Feature(ee.Geometry.Polygon([ring]), {props})`
/// with the exterior ring as a literal coordinate array in `[lon, lat]`
/// order. Numeric property values stay unquoted and print the way the
/// scripting environment prints them (no trailing `.0` on integral values);
/// string values are single-quoted. Non-Polygon features are skipped. An
/// empty input yields the empty collection call.
pub fn aoi_snippet(features: &Value) -> String {
    let empty = Vec::new();
    let list = features
        .get("features")
        .and_then(Value::as_array)
        .unwrap_or(&empty);

    let mut buf = ryu_js::Buffer::new();
    let mut parts: Vec<String> = Vec::new();
    for feature in list {
        if feature.pointer("/geometry/type").and_then(Value::as_str) != Some("Polygon") {
            continue;
        }
        let Some(ring) = feature
            .pointer("/geometry/coordinates/0")
            .and_then(Value::as_array)
        else {
            continue;
        };

        let mut part = String::from("  ee.Feature(ee.Geometry.Polygon([[");
        for (i, coord) in ring.iter().enumerate() {
            if i > 0 {
                part.push_str(", ");
            }
            part.push('[');
            part.push_str(&number_literal(coord.get(0), &mut buf));
            part.push_str(", ");
            part.push_str(&number_literal(coord.get(1), &mut buf));
            part.push(']');
        }
        part.push_str("]]), {");

        let props = feature.pointer("/properties").and_then(Value::as_object);
        if let Some(props) = props {
            for (i, (key, value)) in props.iter().enumerate() {
                if i > 0 {
                    part.push_str(", ");
                }
                part.push_str(&format!("'{}': {}", escape_js(key), value_literal(value, &mut buf)));
            }
        }
        part.push_str("})");
        parts.push(part);
    }

    if parts.is_empty() {
        return "var aoi = ee.FeatureCollection([]);".to_string();
    }
    format!("var aoi = ee.FeatureCollection([\n{}\n]);", parts.join(",\n"))
}

/// Replaces the AOI assignment inside a larger script.
///
/// Three tiers, never failing: the full `ee.FeatureCollection` statement
/// first, then any `var aoi = ...;` assignment, and when the template has
/// neither, the snippet is prepended and the template kept verbatim. Only
/// the first match of a tier is replaced.
pub fn splice_aoi(template: &str, snippet: &str) -> String {
    for regex in [aoi_collection_regex(), aoi_assignment_regex()] {
        if let Some(found) = regex.find(template) {
            let mut out = String::with_capacity(template.len() + snippet.len());
            out.push_str(&template[..found.start()]);
            out.push_str(snippet);
            out.push_str(&template[found.end()..]);
            return out;
        }
    }
    format!("{snippet}\n\n{template}")
}

/// [`aoi_snippet`] spliced into [`ANALYSIS_TEMPLATE`].
pub fn analysis_script(features: &Value) -> String {
    splice_aoi(ANALYSIS_TEMPLATE, &aoi_snippet(features))
}

fn number_literal(value: Option<&Value>, buf: &mut ryu_js::Buffer) -> String {
    let Some(v) = value.and_then(Value::as_f64) else {
        return "0".to_string();
    };
    if !v.is_finite() {
        return "0".to_string();
    }
    buf.format_finite(v).to_string()
}

fn value_literal(value: &Value, buf: &mut ryu_js::Buffer) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(_) => number_literal(Some(value), buf),
        Value::String(s) => format!("'{}'", escape_js(s)),
        other => format!("'{}'", escape_js(&other.to_string())),
    }
}

fn escape_js(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(ch),
        }
    }
    out
}
