use indexmap::IndexMap;
use potrero_core::PolygonRecord;
use std::io::Write;

/// Fill alpha for polygon interiors (partially transparent).
const FILL_ALPHA: u8 = 0x66;
/// Outline alpha (fully opaque).
const OUTLINE_ALPHA: u8 = 0xff;

const SHARED_STYLE_ID: &str = "area";
const DEFAULT_COLOR: RgbColor = RgbColor {
    r: 0x2e,
    g: 0x7d,
    b: 0x32,
};

/// An RGB color in `#RRGGBB` component order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    /// Parses `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self {
            r: byte(0)?,
            g: byte(2)?,
            b: byte(4)?,
        })
    }

    /// KML color text: `aabbggrr` byte order, lowercase hex.
    pub fn to_kml(self, alpha: u8) -> String {
        format!("{:02x}{:02x}{:02x}{:02x}", alpha, self.b, self.g, self.r)
    }
}

/// Assigns a fill color to each distinguishing key (one key per CUIT when
/// per-owner differentiation is requested). Implementations must be
/// deterministic so exports are reproducible.
pub trait ColorStrategy {
    /// `index` is the key's first-appearance position within the batch.
    fn color_for(&self, key: &str, index: usize) -> RgbColor;
}

const PALETTE: [RgbColor; 8] = [
    RgbColor { r: 0xe5, g: 0x39, b: 0x35 },
    RgbColor { r: 0x1e, g: 0x88, b: 0xe5 },
    RgbColor { r: 0x43, g: 0xa0, b: 0x47 },
    RgbColor { r: 0xfb, g: 0x8c, b: 0x00 },
    RgbColor { r: 0x8e, g: 0x24, b: 0xaa },
    RgbColor { r: 0x00, g: 0xac, b: 0xc1 },
    RgbColor { r: 0x6d, g: 0x4c, b: 0x41 },
    RgbColor { r: 0xf4, g: 0x51, b: 0x1e },
];

/// Cycles a fixed palette by first-appearance index.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaletteStrategy;

impl ColorStrategy for PaletteStrategy {
    fn color_for(&self, _key: &str, index: usize) -> RgbColor {
        PALETTE[index % PALETTE.len()]
    }
}

/// Derives a color from the key itself (FNV-1a), stable across batches
/// regardless of record order.
#[derive(Debug, Clone, Copy, Default)]
pub struct HashStrategy;

impl ColorStrategy for HashStrategy {
    fn color_for(&self, key: &str, _index: usize) -> RgbColor {
        let mut hash: u32 = 0x811c_9dc5;
        for b in key.bytes() {
            hash ^= u32::from(b);
            hash = hash.wrapping_mul(0x0100_0193);
        }
        RgbColor {
            r: (hash >> 16) as u8,
            g: (hash >> 8) as u8,
            b: hash as u8,
        }
    }
}

/// How placemarks are colored.
pub enum ColorMode {
    /// One shared style for the whole document.
    Single(RgbColor),
    /// One style per CUIT, colored by the given strategy. Records without a
    /// CUIT share one fallback style.
    PerCuit(Box<dyn ColorStrategy + Send + Sync>),
}

pub struct KmlOptions {
    pub document_name: String,
    pub colors: ColorMode,
}

impl Default for KmlOptions {
    fn default() -> Self {
        Self {
            document_name: "RENSPA".to_string(),
            colors: ColorMode::Single(DEFAULT_COLOR),
        }
    }
}

impl KmlOptions {
    pub fn with_document_name(mut self, name: impl Into<String>) -> Self {
        self.document_name = name.into();
        self
    }

    pub fn with_per_cuit_colors(mut self, strategy: impl ColorStrategy + Send + Sync + 'static) -> Self {
        self.colors = ColorMode::PerCuit(Box::new(strategy));
        self
    }
}

/// Emits an OGC KML 2.2 `<Document>`: one `<Style>` per distinguishing key
/// and one `<Placemark><Polygon>` per record, coordinates as `lon,lat,0`
/// clamped to ground. Style order follows first appearance in the batch.
pub fn kml_document(records: &[PolygonRecord], options: &KmlOptions) -> String {
    let styles = assign_styles(records, options);

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<kml xmlns=\"http://www.opengis.net/kml/2.2\">\n");
    out.push_str("<Document>\n");
    out.push_str(&format!(
        "  <name>{}</name>\n",
        escape_xml(&options.document_name)
    ));

    for (id, color) in &styles {
        out.push_str(&format!("  <Style id=\"{}\">\n", escape_xml(id)));
        out.push_str(&format!(
            "    <LineStyle><color>{}</color><width>2</width></LineStyle>\n",
            color.to_kml(OUTLINE_ALPHA)
        ));
        out.push_str(&format!(
            "    <PolyStyle><color>{}</color></PolyStyle>\n",
            color.to_kml(FILL_ALPHA)
        ));
        out.push_str("  </Style>\n");
    }

    let mut buf = ryu_js::Buffer::new();
    for record in records {
        if record.coords.is_empty() {
            continue;
        }
        out.push_str("  <Placemark>\n");
        out.push_str(&format!(
            "    <name>{}</name>\n",
            escape_xml(record.renspa.as_str())
        ));
        out.push_str(&format!(
            "    <description>{}</description>\n",
            escape_xml(&placemark_description(record))
        ));
        out.push_str(&format!(
            "    <styleUrl>#{}</styleUrl>\n",
            escape_xml(&style_id(record, options))
        ));
        out.push_str("    <Polygon>\n");
        out.push_str("      <altitudeMode>clampToGround</altitudeMode>\n");
        out.push_str("      <outerBoundaryIs>\n        <LinearRing>\n          <coordinates>");
        for (i, coord) in record.coords.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.push_str(fmt_number(coord[0], &mut buf));
            out.push(',');
            out.push_str(fmt_number(coord[1], &mut buf));
            out.push_str(",0");
        }
        out.push_str("</coordinates>\n        </LinearRing>\n      </outerBoundaryIs>\n");
        out.push_str("    </Polygon>\n");
        out.push_str("  </Placemark>\n");
    }

    out.push_str("</Document>\n");
    out.push_str("</kml>\n");
    out
}

/// The KML text stored as the single `doc.kml` entry of a zip container.
pub fn kmz_archive(records: &[PolygonRecord], options: &KmlOptions) -> crate::Result<Vec<u8>> {
    let kml = kml_document(records, options);
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let entry = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    writer.start_file("doc.kml", entry)?;
    writer.write_all(kml.as_bytes())?;
    Ok(writer.finish()?.into_inner())
}

fn assign_styles(records: &[PolygonRecord], options: &KmlOptions) -> IndexMap<String, RgbColor> {
    let mut styles: IndexMap<String, RgbColor> = IndexMap::new();
    match &options.colors {
        ColorMode::Single(color) => {
            styles.insert(SHARED_STYLE_ID.to_string(), *color);
        }
        ColorMode::PerCuit(strategy) => {
            for record in records {
                if record.coords.is_empty() {
                    continue;
                }
                let id = style_id(record, options);
                if !styles.contains_key(&id) {
                    let key = cuit_key(record);
                    let color = strategy.color_for(&key, styles.len());
                    styles.insert(id, color);
                }
            }
        }
    }
    styles
}

fn cuit_key(record: &PolygonRecord) -> String {
    record
        .cuit
        .as_ref()
        .map(|c| c.as_str().to_string())
        .unwrap_or_default()
}

fn style_id(record: &PolygonRecord, options: &KmlOptions) -> String {
    match &options.colors {
        ColorMode::Single(_) => SHARED_STYLE_ID.to_string(),
        ColorMode::PerCuit(_) => match &record.cuit {
            Some(cuit) => format!("cuit-{}", cuit.digits()),
            None => "cuit-sin-datos".to_string(),
        },
    }
}

fn placemark_description(record: &PolygonRecord) -> String {
    format!(
        "{} ({}) - {} ha",
        record.titular, record.localidad, record.superficie
    )
}

fn fmt_number(v: f64, buf: &mut ryu_js::Buffer) -> &str {
    if !v.is_finite() {
        return "0";
    }
    buf.format_finite(v)
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
