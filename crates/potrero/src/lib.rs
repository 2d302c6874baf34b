#![forbid(unsafe_code)]

//! `potrero` turns raw SENASA RENSPA registry records into map-ready polygon
//! artifacts.
//!
//! The core is headless and synchronous: identifier normalization, polygon
//! text parsing and batch assembly are pure transformations over in-memory
//! data. Fetching registry data is the caller's job; the one secondary
//! lookup the pipeline may need is injected through
//! [`DetailFetch`](potrero_core::DetailFetch).
//!
//! # Features
//!
//! - `export`: enable the GeoJSON / KML / KMZ / Earth-Engine serializers
//!   (`potrero::export`)

pub use potrero_core::*;

#[cfg(feature = "export")]
pub mod export {
    pub use potrero_export::ee::{ANALYSIS_TEMPLATE, analysis_script, aoi_snippet, splice_aoi};
    pub use potrero_export::geojson::{feature_collection, feature_collection_string};
    pub use potrero_export::kml::{
        ColorMode, ColorStrategy, HashStrategy, KmlOptions, PaletteStrategy, RgbColor,
        kml_document, kmz_archive,
    };
    pub use potrero_export::{Error as ExportError, Result as ExportResult};

    use potrero_core::{BatchOutcome, DetailFetch, PolygonRecord, Processor, RegistryItem};

    /// Convenience wrapper that bundles batch options and KML styling.
    ///
    /// This is intended for UI integrations where passing 3-4 separate
    /// parameters per call is noisy. It holds no session state: every call
    /// is an independent pure transformation, and any caching layer belongs
    /// to the caller.
    pub struct Exporter {
        pub processor: Processor,
        pub kml: KmlOptions,
    }

    impl Default for Exporter {
        fn default() -> Self {
            Self {
                processor: Processor::new(),
                kml: KmlOptions::default(),
            }
        }
    }

    impl Exporter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_processor(mut self, processor: Processor) -> Self {
            self.processor = processor;
            self
        }

        pub fn with_kml_options(mut self, kml: KmlOptions) -> Self {
            self.kml = kml;
            self
        }

        pub fn process(&self, items: &[RegistryItem], fetch: &dyn DetailFetch) -> BatchOutcome {
            self.processor.process_batch(items, fetch)
        }

        pub fn geojson(&self, records: &[PolygonRecord]) -> serde_json::Value {
            feature_collection(records)
        }

        pub fn geojson_string(
            &self,
            records: &[PolygonRecord],
            pretty: bool,
        ) -> ExportResult<String> {
            feature_collection_string(records, pretty)
        }

        pub fn kml(&self, records: &[PolygonRecord]) -> String {
            kml_document(records, &self.kml)
        }

        pub fn kmz(&self, records: &[PolygonRecord]) -> ExportResult<Vec<u8>> {
            kmz_archive(records, &self.kml)
        }

        /// The bundled analysis script with the batch spliced in as its AOI.
        pub fn ee_script(&self, records: &[PolygonRecord]) -> String {
            analysis_script(&feature_collection(records))
        }
    }
}
