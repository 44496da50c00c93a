//! Annotation joins against the SNP, ClinVar and gene catalogs, plus the
//! curator note attachment.
//!
//! Catalog round trips dominate the cost of a query, so the joiner never
//! queries per row. It collects the distinct locus keys of the batch,
//! resolves each key once on the worker pool, and joins the results back in
//! memory — the per-row semantics (first-match for SNP/ClinVar, union for
//! genes, uniform miss sentinels) are preserved regardless of execution
//! order, and rows keep their input order.

use hashbrown::{HashMap, HashSet};
use itertools::Itertools;
use log::warn;
use rayon::prelude::*;

use crate::data_structs::annotation::MISS_SENTINEL;
use crate::data_structs::typedef::{ChromId, PosType};
use crate::data_structs::variant::{AnnotatedRow, ExplodedRow, NoteColumns, NO_ID};
use crate::repo::{AnnotationRepository, NoteLookup};
use crate::utils::THREAD_POOL;

/// Which catalog joins to run.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationFlags {
    pub clinvar:   bool,
    pub gene_list: bool,
    pub snp:       bool,
}

type AlleleKey = (ChromId, PosType, PosType, String);
type SpanKey = (ChromId, PosType, PosType);

fn allele_key(row: &ExplodedRow) -> Option<AlleleKey> {
    row.allele
        .as_ref()
        .map(|allele| (row.chrom, row.pos_start, row.pos_end, allele.to_string()))
}

/// Joins annotations onto exploded rows.
pub struct AnnotationJoiner<'a> {
    repo:  &'a dyn AnnotationRepository,
    notes: &'a dyn NoteLookup,
}

impl<'a> AnnotationJoiner<'a> {
    pub fn new(
        repo: &'a dyn AnnotationRepository,
        notes: &'a dyn NoteLookup,
    ) -> Self {
        Self { repo, notes }
    }

    /// Attaches curator note columns to every row that resolved an allele.
    /// Rows without a note at their locus keep the miss sentinel columns.
    pub fn attach_notes(
        &self,
        rows: &mut [ExplodedRow],
    ) {
        let mut cache: HashMap<AlleleKey, NoteColumns> = HashMap::new();
        for row in rows.iter_mut() {
            let Some(key) = allele_key(row)
            else {
                continue;
            };
            let columns = cache
                .entry(key)
                .or_insert_with_key(|(chrom, start, stop, allele)| {
                    self.notes
                        .find_by_locus(*chrom, *start, *stop, allele)
                        .map(|note| note.to_columns())
                        .unwrap_or_else(NoteColumns::miss)
                });
            row.note = columns.clone();
        }
    }

    /// Runs the flagged catalog joins over the batch.
    ///
    /// `clinvar_search_limit`, when nonzero, restricts the ClinVar (and SNP)
    /// lookup to the first that many rows; the remainder get miss sentinels.
    /// This is a latency guard, not a correctness rule.
    pub fn annotate(
        &self,
        rows: Vec<ExplodedRow>,
        flags: AnnotationFlags,
        clinvar_search_limit: usize,
    ) -> Vec<AnnotatedRow> {
        let searched_rows = if clinvar_search_limit > 0 {
            clinvar_search_limit.min(rows.len())
        }
        else {
            rows.len()
        };

        let gene_map = if flags.gene_list {
            self.lookup_genes(&rows)
        }
        else {
            HashMap::new()
        };
        let snp_map = if flags.snp {
            self.lookup_snps(&rows[..searched_rows])
        }
        else {
            HashMap::new()
        };
        let clinvar_map = if flags.clinvar {
            self.lookup_clinvar(&rows[..searched_rows])
        }
        else {
            HashMap::new()
        };

        rows.into_iter()
            .enumerate()
            .map(|(index, row)| {
                let genes = gene_map
                    .get(&(row.chrom, row.pos_start, row.pos_end))
                    .cloned()
                    .flatten();

                // a dbSNP id carried by the source record wins outright
                let rsid = if row.id.as_str() != NO_ID {
                    row.id.to_string()
                }
                else if flags.snp && index < searched_rows {
                    allele_key(&row)
                        .and_then(|key| snp_map.get(&key).cloned().flatten())
                        .unwrap_or_else(|| MISS_SENTINEL.to_string())
                }
                else {
                    MISS_SENTINEL.to_string()
                };

                let clinvar = if flags.clinvar && index < searched_rows {
                    allele_key(&row)
                        .and_then(|key| clinvar_map.get(&key).cloned().flatten())
                }
                else {
                    None
                };

                AnnotatedRow {
                    row,
                    rsid,
                    clinvar,
                    genes,
                }
            })
            .collect()
    }

    /// Resolves each distinct row span to its union of overlapping gene
    /// names, deduplicated and semicolon-joined.
    fn lookup_genes(
        &self,
        rows: &[ExplodedRow],
    ) -> HashMap<SpanKey, Option<String>> {
        let keys: Vec<SpanKey> = rows
            .iter()
            .map(|row| (row.chrom, row.pos_start, row.pos_end))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        THREAD_POOL.install(|| {
            keys.into_par_iter()
                .map(|key| {
                    let (chrom, start, stop) = key;
                    let joined = match self.repo.find_genes_overlapping(chrom, start, stop) {
                        Ok(hits) => {
                            let names: Vec<String> = hits
                                .into_iter()
                                .map(|gene| gene.gene)
                                .unique()
                                .collect();
                            if names.is_empty() {
                                None
                            }
                            else {
                                Some(names.join(";"))
                            }
                        },
                        Err(e) => {
                            warn!("Gene lookup failed for {}:{}-{}: {}", chrom, start, stop, e);
                            None
                        },
                    };
                    (key, joined)
                })
                .collect::<Vec<_>>()
                .into_iter()
                .collect()
        })
    }

    /// First-match rsid per distinct (locus, allele) key.
    fn lookup_snps(
        &self,
        rows: &[ExplodedRow],
    ) -> HashMap<AlleleKey, Option<String>> {
        let keys: Vec<AlleleKey> = rows
            .iter()
            .filter(|row| row.id.as_str() == NO_ID)
            .filter_map(allele_key)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        THREAD_POOL.install(|| {
            keys.into_par_iter()
                .map(|key| {
                    let (chrom, start, stop, ref allele) = key;
                    let rsid = match self.repo.find_snp(chrom, start, stop, allele) {
                        Ok(hits) => hits.into_iter().next().map(|s| s.rsid.to_string()),
                        Err(e) => {
                            warn!("SNP lookup failed for {}:{}-{}: {}", chrom, start, stop, e);
                            None
                        },
                    };
                    (key, rsid)
                })
                .collect::<Vec<_>>()
                .into_iter()
                .collect()
        })
    }

    /// First-match ClinVar record per distinct (locus, allele) key.
    fn lookup_clinvar(
        &self,
        rows: &[ExplodedRow],
    ) -> HashMap<AlleleKey, Option<crate::data_structs::annotation::ClinvarRecord>> {
        let keys: Vec<AlleleKey> = rows
            .iter()
            .filter_map(allele_key)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        THREAD_POOL.install(|| {
            keys.into_par_iter()
                .map(|key| {
                    let (chrom, start, stop, ref allele) = key;
                    let record = match self.repo.find_clinvar(chrom, start, stop, allele) {
                        Ok(hits) => hits.into_iter().next(),
                        Err(e) => {
                            warn!(
                                "ClinVar lookup failed for {}:{}-{}: {}",
                                chrom, start, stop, e
                            );
                            None
                        },
                    };
                    (key, record)
                })
                .collect::<Vec<_>>()
                .into_iter()
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structs::annotation::{ClinvarRecord, GeneRecord, SnpRecord};
    use crate::notes::NoteVersionStore;
    use crate::repo::memory::InMemoryAnnotationRepository;

    fn row(
        chrom: ChromId,
        start: PosType,
        allele: Option<&str>,
        id: &str,
    ) -> ExplodedRow {
        ExplodedRow {
            sample: "s1".into(),
            id: id.into(),
            alleles: vec!["A".into(), "T".into()],
            genotype: vec![0, 1],
            contig: "chr1".into(),
            chrom,
            pos_start: start,
            pos_end: start,
            allele: allele.map(|a| a.into()),
            allele_freq: None,
            note: NoteColumns::miss(),
        }
    }

    fn clinvar_at(
        chrom: ChromId,
        start: PosType,
        alt: &str,
        alleleid: i64,
    ) -> ClinvarRecord {
        ClinvarRecord {
            id: alleleid,
            alleleid,
            r#type: "SNV".to_string(),
            name: format!("var-{}", alleleid),
            geneid: 1,
            genesymbol: "GENE".to_string(),
            hgnc_id: "HGNC:1".to_string(),
            clinicalsignificance: "Pathogenic".to_string(),
            clinsigsimple: 1,
            lastevaluated: "-".to_string(),
            rsid: 0,
            nsvesv: "-".to_string(),
            rcvaccession: "-".to_string(),
            phenotypeids: "-".to_string(),
            phenotypelist: "-".to_string(),
            origin: "germline".to_string(),
            originsimple: "germline".to_string(),
            assembly: "GRCh38".to_string(),
            chromosomeaccession: "-".to_string(),
            chromosome: chrom,
            start,
            stop: start,
            referenceallele: "A".to_string(),
            alternateallele: alt.to_string(),
            cytogenetic: "-".to_string(),
            reviewstatus: "-".to_string(),
            numbersubmitters: 1,
            guidelines: "-".to_string(),
            testedingtr: "N".to_string(),
            otherids: "-".to_string(),
            submittercategories: 1,
            variationid: alleleid,
            positionvcf: start,
            referenceallelevcf: "A".to_string(),
            alternateallelevcf: alt.to_string(),
            order: 1.0,
        }
    }

    fn repo() -> InMemoryAnnotationRepository {
        InMemoryAnnotationRepository::new(
            vec![SnpRecord {
                rsid:  "rs100".into(),
                chrom: 1,
                start: 100,
                stop:  100,
                r#ref: "A".into(),
                alt:   "T".into(),
            }],
            vec![
                clinvar_at(1, 100, "T", 1),
                // second record at the same key: first-match must win
                clinvar_at(1, 100, "T", 2),
            ],
            vec![
                GeneRecord {
                    chrom:     1,
                    source:    None,
                    gene_type: None,
                    start:     50,
                    stop:      150,
                    gene:      "GENE1".to_string(),
                    product:   None,
                },
                GeneRecord {
                    chrom:     1,
                    source:    None,
                    gene_type: None,
                    start:     90,
                    stop:      110,
                    gene:      "GENE2".to_string(),
                    product:   None,
                },
            ],
        )
    }

    fn all_flags() -> AnnotationFlags {
        AnnotationFlags {
            clinvar:   true,
            gene_list: true,
            snp:       true,
        }
    }

    #[test]
    fn test_first_match_and_union_semantics() {
        let repo = repo();
        let notes = NoteVersionStore::new();
        let joiner = AnnotationJoiner::new(&repo, &notes);
        let out = joiner.annotate(vec![row(1, 100, Some("T"), NO_ID)], all_flags(), 0);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].rsid, "rs100");
        assert_eq!(out[0].clinvar.as_ref().unwrap().alleleid, 1);
        assert_eq!(out[0].genes.as_deref(), Some("GENE1;GENE2"));
    }

    #[test]
    fn test_source_id_wins_over_snp_lookup() {
        let repo = repo();
        let notes = NoteVersionStore::new();
        let joiner = AnnotationJoiner::new(&repo, &notes);
        let out = joiner.annotate(vec![row(1, 100, Some("T"), "rs999")], all_flags(), 0);
        assert_eq!(out[0].rsid, "rs999");
    }

    #[test]
    fn test_miss_fills_uniform_sentinels() {
        let repo = repo();
        let notes = NoteVersionStore::new();
        let joiner = AnnotationJoiner::new(&repo, &notes);
        let out = joiner.annotate(vec![row(22, 5, Some("G"), NO_ID)], all_flags(), 0);
        assert_eq!(out[0].rsid, MISS_SENTINEL);
        assert!(out[0].clinvar.is_none());
        assert!(out[0].genes.is_none());
        assert_eq!(
            out[0].annotation_values().len(),
            AnnotatedRow::annotation_columns().len()
        );
    }

    #[test]
    fn test_search_limit_bounds_clinvar_and_snp() {
        let repo = repo();
        let notes = NoteVersionStore::new();
        let joiner = AnnotationJoiner::new(&repo, &notes);
        let rows = vec![
            row(1, 100, Some("T"), NO_ID),
            row(1, 100, Some("T"), NO_ID),
        ];
        let out = joiner.annotate(rows, all_flags(), 1);
        assert!(out[0].clinvar.is_some());
        assert_eq!(out[0].rsid, "rs100");
        // beyond the limit: misses, but genes still join
        assert!(out[1].clinvar.is_none());
        assert_eq!(out[1].rsid, MISS_SENTINEL);
        assert_eq!(out[1].genes.as_deref(), Some("GENE1;GENE2"));
    }

    #[test]
    fn test_disabled_flags_skip_joins() {
        let repo = repo();
        let notes = NoteVersionStore::new();
        let joiner = AnnotationJoiner::new(&repo, &notes);
        let out = joiner.annotate(
            vec![row(1, 100, Some("T"), NO_ID)],
            AnnotationFlags::default(),
            0,
        );
        assert_eq!(out[0].rsid, MISS_SENTINEL);
        assert!(out[0].clinvar.is_none());
        assert!(out[0].genes.is_none());
    }

    #[test]
    fn test_attach_notes_by_locus() {
        let repo = repo();
        let notes = NoteVersionStore::new();
        notes
            .create_version(
                &crate::data_structs::note::NoteKey::new(1, 100, 100, "A", "T"),
                "seen before",
                "alice",
                None,
            )
            .unwrap();
        let joiner = AnnotationJoiner::new(&repo, &notes);
        let mut rows = vec![row(1, 100, Some("T"), NO_ID), row(1, 200, Some("C"), NO_ID)];
        joiner.attach_notes(&mut rows);
        assert_eq!(rows[0].note.chr_pos, "chr1:100-100");
        assert!(rows[0].note.note_history.contains("seen before"));
        assert_eq!(rows[1].note, NoteColumns::miss());
    }

    #[test]
    fn test_row_order_preserved() {
        let repo = repo();
        let notes = NoteVersionStore::new();
        let joiner = AnnotationJoiner::new(&repo, &notes);
        let rows: Vec<ExplodedRow> = (0..20)
            .map(|i| row(1, 100 + i as PosType, Some("T"), NO_ID))
            .collect();
        let out = joiner.annotate(rows, all_flags(), 0);
        let starts: Vec<PosType> = out.iter().map(|r| r.row.pos_start).collect();
        assert_eq!(starts, (100..120).collect::<Vec<PosType>>());
    }
}
