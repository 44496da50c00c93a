//! Row explosion: one output row per resolved value.
//!
//! A variant record whose genotype called several distinct alternate
//! alleles resolves to list-shaped allele and frequency columns. Those two
//! columns are zipped positionally and fanned out into one row per element;
//! every scalar column is copied unchanged to each generated row. Rows whose
//! resolved columns are all scalar come out once. Input order is preserved
//! and the rows generated from one record are contiguous, in list order.

use anyhow::bail;

use crate::data_structs::typedef::{FreqType, VpSmallStr};
use crate::data_structs::variant::{ExplodedRow, NoteColumns, Resolved, VariantRecord};
use crate::pipeline::genotype::resolve;

/// Rows a paired column group fans out to: the common list length, or 1
/// when every member is scalar. Disagreeing list lengths are an error.
pub fn fan_out_len<A, B>(
    a: &Resolved<A>,
    b: &Resolved<B>,
) -> anyhow::Result<usize> {
    match (a.list_len(), b.list_len()) {
        (Some(n), Some(m)) if n != m => {
            bail!("Paired list columns disagree in length: {} vs {}", n, m)
        },
        (Some(n), _) | (_, Some(n)) => Ok(n),
        (None, None) => Ok(1),
    }
}

/// Resolves one record's allele and frequency columns.
///
/// Alleles default to the reference on a call with no alternates (index 0
/// of the allele array); frequencies have no reference entry, so the same
/// call resolves to no value there.
pub fn resolve_record(
    record: &VariantRecord,
) -> anyhow::Result<(Resolved<VpSmallStr>, Resolved<FreqType>)> {
    let allele = resolve(&record.alleles, &record.genotype, false, true)?;
    let freq = resolve(&record.allele_freq, &record.genotype, true, false)?;
    Ok((allele, freq))
}

/// Fans one record out into its exploded rows.
pub fn explode_record(
    record: VariantRecord,
    allele: Resolved<VpSmallStr>,
    freq: Resolved<FreqType>,
) -> anyhow::Result<Vec<ExplodedRow>> {
    let chrom = record.chrom()?;
    let fan = fan_out_len(&allele, &freq)?;

    let rows = (0..fan)
        .map(|i| {
            ExplodedRow {
                sample:      record.sample.clone(),
                id:          record.id.clone(),
                alleles:     record.alleles.clone(),
                genotype:    record.genotype.clone(),
                contig:      record.contig.clone(),
                chrom,
                pos_start:   record.pos_start,
                pos_end:     record.pos_end,
                allele:      allele.get(i).cloned(),
                allele_freq: freq.get(i).copied(),
                note:        NoteColumns::miss(),
            }
        })
        .collect();
    Ok(rows)
}

/// Resolves and explodes a whole batch, preserving input order.
pub fn explode(records: Vec<VariantRecord>) -> anyhow::Result<Vec<ExplodedRow>> {
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        record.validate()?;
        let (allele, freq) = resolve_record(&record)?;
        out.extend(explode_record(record, allele, freq)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        sample: &str,
        alleles: &[&str],
        genotype: &[i32],
        freqs: &[FreqType],
    ) -> VariantRecord {
        VariantRecord {
            sample:      sample.into(),
            id:          ".".into(),
            alleles:     alleles.iter().map(|a| (*a).into()).collect(),
            genotype:    genotype.to_vec(),
            contig:      "chr1".into(),
            pos_start:   100,
            pos_end:     100,
            allele_freq: freqs.to_vec(),
        }
    }

    #[test]
    fn test_scalar_row_emits_once() {
        let rows = explode(vec![record("s1", &["A", "C"], &[0, 1], &[0.3])]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].allele.as_deref(), Some("C"));
        assert_eq!(rows[0].allele_freq, Some(0.3));
    }

    #[test]
    fn test_multi_allelic_row_fans_out() {
        let rows =
            explode(vec![record("s1", &["A", "C", "T"], &[1, 2], &[0.1, 0.2])]).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].allele.as_deref(), Some("C"));
        assert_eq!(rows[0].allele_freq, Some(0.1));
        assert_eq!(rows[1].allele.as_deref(), Some("T"));
        assert_eq!(rows[1].allele_freq, Some(0.2));
    }

    #[test]
    fn test_scalar_columns_copied_to_every_row() {
        let rows =
            explode(vec![record("s1", &["A", "C", "T"], &[1, 2], &[0.1, 0.2])]).unwrap();
        for row in &rows {
            assert_eq!(row.sample.as_str(), "s1");
            assert_eq!(row.pos_start, 100);
            assert_eq!(row.genotype, vec![1, 2]);
        }
    }

    #[test]
    fn test_reference_call_keeps_ref_allele_without_freq() {
        let rows = explode(vec![record("s1", &["A", "C"], &[0, 0], &[0.3])]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].allele.as_deref(), Some("A"));
        assert_eq!(rows[0].allele_freq, None);
    }

    #[test]
    fn test_batch_order_preserved_and_counts_add_up() {
        let batch = vec![
            record("s1", &["A", "C", "T"], &[1, 2], &[0.1, 0.2]),
            record("s2", &["G", "GA"], &[0, 0], &[0.9]),
            record("s3", &["A", "C", "T", "TT"], &[1, 2, 3], &[0.1, 0.2, 0.3]),
        ];
        let rows = explode(batch).unwrap();
        // 2 + 1 + 3
        assert_eq!(rows.len(), 6);
        let samples: Vec<&str> = rows.iter().map(|r| r.sample.as_str()).collect();
        assert_eq!(samples, vec!["s1", "s1", "s2", "s3", "s3", "s3"]);
    }

    #[test]
    fn test_fan_out_rejects_mismatched_lists() {
        let a: Resolved<u8> = Resolved::Many(vec![1, 2]);
        let b: Resolved<u8> = Resolved::Many(vec![1, 2, 3]);
        assert!(fan_out_len(&a, &b).is_err());
    }

    #[test]
    fn test_corrupt_genotype_is_fatal() {
        assert!(explode(vec![record("s1", &["A", "C"], &[0, 7], &[0.3])]).is_err());
    }
}
