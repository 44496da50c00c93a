//! Gene-name sets → minimal covering genomic intervals.

use hashbrown::HashSet;
use indexmap::IndexMap;

use crate::data_structs::coords::GenomicInterval;
use crate::data_structs::typedef::{ChromId, PosType};
use crate::repo::{GeneCatalog, GeneSpan};

/// Merges raw spans on one chromosome into the smallest set of
/// non-overlapping intervals covering them all. Spans must arrive sorted by
/// start; a span that starts at or before the running stop is absorbed
/// (touching counts as overlap), otherwise the running interval is flushed.
fn merge_sorted_spans(
    chrom: ChromId,
    spans: &[(PosType, PosType)],
) -> Vec<GenomicInterval> {
    let mut merged = Vec::new();
    let mut iter = spans.iter();
    let Some(&(start, stop)) = iter.next()
    else {
        return merged;
    };
    let mut running = GenomicInterval::new(chrom, start, stop);
    for &(start, stop) in iter {
        if start <= running.stop() {
            running.extend_to(stop);
        }
        else {
            merged.push(running);
            running = GenomicInterval::new(chrom, start, stop);
        }
    }
    merged.push(running);
    merged
}

/// Converts raw catalog spans into merged intervals.
///
/// Spans are grouped by chromosome preserving first-seen order, sorted by
/// start within each group and merged. O(N log N) in the span count.
pub fn merge_spans(spans: Vec<GeneSpan>) -> Vec<GenomicInterval> {
    let mut groups: IndexMap<ChromId, Vec<(PosType, PosType)>> = IndexMap::new();
    for span in spans {
        groups
            .entry(span.chrom)
            .or_default()
            .push((span.start, span.stop));
    }

    let mut regions = Vec::new();
    for (chrom, mut chrom_spans) in groups {
        chrom_spans.sort_unstable();
        regions.extend(merge_sorted_spans(chrom, &chrom_spans));
    }
    regions
}

/// Looks the gene names up in the catalog and merges the hit spans into the
/// minimal covering interval list. Names with no catalog entry contribute
/// nothing; a fully unmatched set yields an empty list, which is a normal
/// outcome and not an error.
pub fn genes_to_regions<C: GeneCatalog + ?Sized>(
    catalog: &C,
    gene_names: &HashSet<String>,
) -> anyhow::Result<Vec<GenomicInterval>> {
    let spans = catalog.lookup(gene_names)?;
    Ok(merge_spans(spans))
}
