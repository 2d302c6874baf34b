use crate::ident::{Cuit, Renspa};
use crate::poligono::{Ring, parse_polygon_text};
use crate::registro::{PolygonRecord, RegistryItem};
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

/// Error surfaced by a [`DetailFetch`] collaborator.
///
/// The builder never propagates it: a failed lookup downgrades to "no
/// geometry" for that single item and the batch continues.
#[derive(Debug, thiserror::Error)]
#[error("detail lookup failed for {renspa}: {message}")]
pub struct DetailFetchError {
    pub renspa: String,
    pub message: String,
}

/// Per-RENSPA secondary lookup, consulted when a bulk item carries no usable
/// polygon text. Implemented outside this crate; the caller owns transport,
/// pagination and any inter-request delay.
pub trait DetailFetch {
    fn fetch_detail(&self, renspa: &Renspa) -> Result<Option<RegistryItem>, DetailFetchError>;
}

/// Collaborator for callers that only have bulk data: never returns a detail
/// item.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDetailFetch;

impl DetailFetch for NoDetailFetch {
    fn fetch_detail(&self, _renspa: &Renspa) -> Result<Option<RegistryItem>, DetailFetchError> {
        Ok(None)
    }
}

/// Batch-builder options. Each `process_batch` call is an independent pure
/// transformation; the processor holds no session state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Processor {
    /// Skip items whose registration carries a `fecha_baja` (deregistered).
    pub only_active: bool,
}

impl Processor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_only_active(mut self, only_active: bool) -> Self {
        self.only_active = only_active;
        self
    }

    /// Builds the canonical polygon list for one batch of registry items.
    ///
    /// Outcomes are per item: a bad item lands in [`BatchOutcome::failed`]
    /// and never aborts the batch. Records keep the input order of the items
    /// that produced them, and a RENSPA repeated within the batch is taken
    /// once. When an item's own `poligono` and a detail lookup both yield
    /// text, the first string that parses wins; the two are never reconciled.
    pub fn process_batch(&self, items: &[RegistryItem], fetch: &dyn DetailFetch) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let mut seen: FxHashSet<String> = FxHashSet::default();

        for item in items {
            if self.only_active && !item.is_active() {
                outcome.skipped_inactive += 1;
                continue;
            }

            let renspa = match Renspa::parse(&item.renspa) {
                Ok(renspa) => renspa,
                Err(_) => {
                    warn!(renspa = %item.renspa, "unparseable renspa in batch");
                    outcome.failed.push(item.renspa.clone());
                    continue;
                }
            };
            if !seen.insert(renspa.as_str().to_string()) {
                continue;
            }

            match resolve_ring(item, &renspa, fetch) {
                Some((coords, detail)) => {
                    let detail = detail.as_ref();
                    outcome.records.push(PolygonRecord {
                        superficie: item
                            .superficie
                            .or_else(|| detail.and_then(|d| d.superficie))
                            .unwrap_or(0.0),
                        titular: item
                            .titular
                            .clone()
                            .or_else(|| detail.and_then(|d| d.titular.clone()))
                            .unwrap_or_default(),
                        localidad: item
                            .localidad
                            .clone()
                            .or_else(|| detail.and_then(|d| d.localidad.clone()))
                            .unwrap_or_default(),
                        cuit: item
                            .cuit
                            .as_deref()
                            .or_else(|| detail.and_then(|d| d.cuit.as_deref()))
                            .and_then(|c| Cuit::parse(c).ok()),
                        renspa,
                        coords,
                    });
                }
                None => outcome.failed.push(renspa.as_str().to_string()),
            }
        }

        outcome
    }
}

/// One attempt on the item's own text, then at most one detail lookup.
/// Returns the winning ring together with the detail item when the fallback
/// path supplied it (its descriptive fields may fill gaps in the bulk item).
fn resolve_ring(
    item: &RegistryItem,
    renspa: &Renspa,
    fetch: &dyn DetailFetch,
) -> Option<(Ring, Option<RegistryItem>)> {
    if let Some(ring) = parse_polygon_text(item.poligono.as_deref()) {
        debug!(renspa = %renspa, points = ring.len(), "inline polygon accepted");
        return Some((ring, None));
    }

    let detail = match fetch.fetch_detail(renspa) {
        Ok(detail) => detail,
        Err(err) => {
            warn!(renspa = %renspa, error = %err, "detail lookup failed");
            return None;
        }
    };
    let detail = detail?;
    let ring = parse_polygon_text(detail.poligono.as_deref())?;
    debug!(renspa = %renspa, points = ring.len(), "detail polygon accepted");
    Some((ring, Some(detail)))
}

/// Result of one batch: canonical records, identifiers that yielded no
/// usable geometry, and the count of items dropped by the active filter.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub records: Vec<PolygonRecord>,
    pub failed: Vec<String>,
    pub skipped_inactive: usize,
}

impl BatchOutcome {
    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            processed: self.records.len() + self.failed.len() + self.skipped_inactive,
            with_geometry: self.records.len(),
            failed: self.failed.len(),
        }
    }
}

/// End-of-batch aggregate surfaced to the user instead of interrupting a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub with_geometry: usize,
    pub failed: usize,
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} processed, {} with geometry, {} failed",
            self.processed, self.with_geometry, self.failed
        )
    }
}
