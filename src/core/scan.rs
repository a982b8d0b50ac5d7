//! Run drivers: feed a batch of records through the extractor.
//!
//! Records are processed strictly in source order, which is what makes
//! first-write-wins deterministic for [`collect_types_data`]. The first error
//! aborts the whole batch.

use tracing::info;

use super::accumulator::{Accumulator, DedupStore, OccurrenceCounter};
use super::error::ExtractError;
use super::extractor::Extractor;
use crate::domain::ContentRecord;

/// Run every record through the extractor into `acc`
pub fn scan<A>(records: &[ContentRecord], extractor: &Extractor<'_>, acc: &mut A) -> Result<(), ExtractError>
where
    A: Accumulator + ?Sized,
{
    for record in records {
        extractor.extract_record(record, acc)?;
    }
    Ok(())
}

/// Parameters of every library version in use, first occurrence wins
pub fn collect_types_data(
    records: &[ContentRecord],
    extractor: &Extractor<'_>,
) -> Result<DedupStore, ExtractError> {
    let mut store = DedupStore::new();
    scan(records, extractor, &mut store)?;

    info!(records = records.len(), libraries = store.len(), "Collected content type data");
    Ok(store)
}

/// Occurrences of each machine name, top-level records included
pub fn count_types(
    records: &[ContentRecord],
    extractor: &Extractor<'_>,
) -> Result<OccurrenceCounter, ExtractError> {
    let mut counter = OccurrenceCounter::new();
    scan(records, extractor, &mut counter)?;

    info!(records = records.len(), types = counter.len(), total = counter.total(), "Counted content types");
    Ok(counter)
}
