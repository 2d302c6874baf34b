#![forbid(unsafe_code)]

//! SENASA RENSPA registry parsing + canonical polygon model (headless).
//!
//! Design goals:
//! - deterministic, testable outputs (no ambient state, no I/O)
//! - permissive ingestion: upstream registry payloads are not contractual, so
//!   partial corruption degrades to "no geometry" instead of failing a batch
//! - explicit collaborator seams for the one latency-bearing operation
//!   (the per-RENSPA detail lookup)

pub mod batch;
pub mod error;
pub mod ident;
pub mod poligono;
pub mod registro;

pub use batch::{
    BatchOutcome, BatchSummary, DetailFetch, DetailFetchError, NoDetailFetch, Processor,
};
pub use error::{Error, Result};
pub use ident::{Cuit, Renspa};
pub use poligono::{Coord, Ring, parse_polygon_text};
pub use registro::{PolygonRecord, RegistryItem};

#[cfg(test)]
mod tests;
