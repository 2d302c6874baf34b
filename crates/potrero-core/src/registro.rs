use crate::ident::{Cuit, Renspa};
use crate::poligono::Ring;
use serde::{Deserialize, Serialize};

/// One raw item as returned by the SENASA RENSPA API.
///
/// Field names follow the upstream JSON keys. Everything except `renspa` is
/// optional upstream; defaults are resolved here and in the batch builder,
/// never further down the pipeline. Unknown upstream keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryItem {
    pub renspa: String,
    /// Proprietary coordinate text, a run of parenthesized `(lat,lon)` pairs.
    #[serde(default)]
    pub poligono: Option<String>,
    /// Owner name.
    #[serde(default)]
    pub titular: Option<String>,
    #[serde(default)]
    pub localidad: Option<String>,
    /// Area in hectares.
    #[serde(default)]
    pub superficie: Option<f64>,
    /// Deregistration date as reported upstream; `None` means the
    /// registration is currently active.
    #[serde(default)]
    pub fecha_baja: Option<String>,
    /// Present when the query aggregated several owners.
    #[serde(default)]
    pub cuit: Option<String>,
}

impl RegistryItem {
    pub fn is_active(&self) -> bool {
        self.fecha_baja.is_none()
    }
}

/// The canonical polygon for one RENSPA, assembled by the batch builder and
/// consumed read-only by every serializer. Lives for the duration of one
/// batch; nothing persists it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolygonRecord {
    pub renspa: Renspa,
    /// Closed exterior ring, `[lon, lat]` positions.
    pub coords: Ring,
    /// Area in hectares; 0.0 when absent on every source.
    pub superficie: f64,
    pub titular: String,
    pub localidad: String,
    pub cuit: Option<Cuit>,
}
