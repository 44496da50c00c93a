//! In-memory implementations of the boundary traits.
//!
//! Point lookups (SNP, ClinVar) go through hash indexes keyed by locus and
//! allele; gene overlap queries go through a per-chromosome interval index.
//! Catalogs are loaded once at construction and explicitly rebuilt via
//! `refresh` rather than hiding behind ambient global state.

use hashbrown::{HashMap, HashSet};
use itertools::Itertools;
use rust_lapper::{Interval, Lapper};

use crate::data_structs::annotation::{ClinvarRecord, GeneRecord, SnpRecord};
use crate::data_structs::coords::GenomicInterval;
use crate::data_structs::typedef::{ChromId, PosType};
use crate::data_structs::variant::VariantRecord;
use crate::repo::{AnnotationRepository, GeneCatalog, GeneSpan, VariantStore};

type LocusKey = (ChromId, PosType, PosType, String);
type GeneIv = Interval<PosType, usize>;

/// Variant store over a fixed record set.
pub struct InMemoryVariantStore {
    records: Vec<VariantRecord>,
    attrs:   Vec<String>,
}

impl InMemoryVariantStore {
    pub fn new(
        records: Vec<VariantRecord>,
        attrs: Vec<String>,
    ) -> Self {
        Self { records, attrs }
    }
}

impl VariantStore for InMemoryVariantStore {
    fn read(
        &self,
        _attrs: &[String],
        regions: &[String],
        samples: &[String],
    ) -> anyhow::Result<Vec<VariantRecord>> {
        let intervals: Vec<GenomicInterval> = regions
            .iter()
            .map(|r| r.parse())
            .collect::<anyhow::Result<_>>()?;
        let sample_set: HashSet<&str> = samples.iter().map(String::as_str).collect();

        let hits = self
            .records
            .iter()
            .filter(|rec| sample_set.is_empty() || sample_set.contains(rec.sample.as_str()))
            .filter(|rec| {
                let Ok(chrom) = rec.chrom()
                else {
                    return false;
                };
                let span = GenomicInterval::new(chrom, rec.pos_start, rec.pos_end);
                intervals.iter().any(|iv| iv.overlaps(&span))
            })
            .cloned()
            .collect();
        Ok(hits)
    }

    fn attributes(&self) -> Vec<String> {
        self.attrs.clone()
    }

    fn samples(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|rec| rec.sample.to_string())
            .unique()
            .collect()
    }
}

/// Gene catalog over a fixed span set, kept in (chrom, start, name) order
/// so lookups are independent of the caller's name ordering.
pub struct InMemoryGeneCatalog {
    spans: Vec<GeneSpan>,
}

impl InMemoryGeneCatalog {
    pub fn new(mut spans: Vec<GeneSpan>) -> Self {
        spans.sort_by(|a, b| {
            (a.chrom, a.start, a.stop, &a.name).cmp(&(b.chrom, b.start, b.stop, &b.name))
        });
        Self { spans }
    }
}

impl GeneCatalog for InMemoryGeneCatalog {
    fn lookup(
        &self,
        names: &HashSet<String>,
    ) -> anyhow::Result<Vec<GeneSpan>> {
        Ok(self
            .spans
            .iter()
            .filter(|span| names.contains(&span.name))
            .cloned()
            .collect())
    }
}

/// Annotation repository with hash indexes for point lookups and a
/// per-chromosome interval index for gene overlap.
pub struct InMemoryAnnotationRepository {
    snp_index:     HashMap<LocusKey, Vec<SnpRecord>>,
    clinvar_index: HashMap<LocusKey, Vec<ClinvarRecord>>,
    genes:         Vec<GeneRecord>,
    gene_index:    HashMap<ChromId, Lapper<PosType, usize>>,
}

impl InMemoryAnnotationRepository {
    pub fn new(
        snps: Vec<SnpRecord>,
        clinvars: Vec<ClinvarRecord>,
        genes: Vec<GeneRecord>,
    ) -> Self {
        let mut repo = Self {
            snp_index:     HashMap::new(),
            clinvar_index: HashMap::new(),
            genes:         Vec::new(),
            gene_index:    HashMap::new(),
        };
        repo.refresh(snps, clinvars, genes);
        repo
    }

    /// Rebuilds every index from fresh catalog dumps.
    pub fn refresh(
        &mut self,
        snps: Vec<SnpRecord>,
        clinvars: Vec<ClinvarRecord>,
        genes: Vec<GeneRecord>,
    ) {
        let mut snp_index: HashMap<LocusKey, Vec<SnpRecord>> = HashMap::new();
        for snp in snps {
            let key = (snp.chrom, snp.start, snp.stop, snp.alt.to_string());
            snp_index.entry(key).or_default().push(snp);
        }

        let mut clinvar_index: HashMap<LocusKey, Vec<ClinvarRecord>> = HashMap::new();
        for record in clinvars {
            let key = (
                record.chromosome,
                record.start,
                record.stop,
                record.alternateallelevcf.clone(),
            );
            clinvar_index.entry(key).or_default().push(record);
        }

        let mut per_chrom: HashMap<ChromId, Vec<GeneIv>> = HashMap::new();
        for (idx, gene) in genes.iter().enumerate() {
            per_chrom.entry(gene.chrom).or_default().push(Interval {
                // closed catalog coordinates, half-open index
                start: gene.start,
                stop:  gene.stop + 1,
                val:   idx,
            });
        }
        let gene_index = per_chrom
            .into_iter()
            .map(|(chrom, ivs)| (chrom, Lapper::new(ivs)))
            .collect();

        self.snp_index = snp_index;
        self.clinvar_index = clinvar_index;
        self.genes = genes;
        self.gene_index = gene_index;
    }
}

impl AnnotationRepository for InMemoryAnnotationRepository {
    fn find_snp(
        &self,
        chrom: ChromId,
        start: PosType,
        stop: PosType,
        allele: &str,
    ) -> anyhow::Result<Vec<SnpRecord>> {
        let key = (chrom, start, stop, allele.to_string());
        Ok(self.snp_index.get(&key).cloned().unwrap_or_default())
    }

    fn find_clinvar(
        &self,
        chrom: ChromId,
        start: PosType,
        stop: PosType,
        allele: &str,
    ) -> anyhow::Result<Vec<ClinvarRecord>> {
        let key = (chrom, start, stop, allele.to_string());
        Ok(self.clinvar_index.get(&key).cloned().unwrap_or_default())
    }

    fn find_genes_overlapping(
        &self,
        chrom: ChromId,
        start: PosType,
        stop: PosType,
    ) -> anyhow::Result<Vec<GeneRecord>> {
        let Some(lapper) = self.gene_index.get(&chrom)
        else {
            return Ok(Vec::new());
        };
        let hits = lapper
            .find(start, stop + 1)
            // containment, not mere overlap: the gene must cover the row
            .filter(|iv| {
                let gene = &self.genes[iv.val];
                gene.start <= start && gene.stop >= stop
            })
            .map(|iv| self.genes[iv.val].clone())
            .sorted_by_key(|gene| (gene.start, gene.stop))
            .collect();
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gene(
        chrom: ChromId,
        start: PosType,
        stop: PosType,
        name: &str,
    ) -> GeneRecord {
        GeneRecord {
            chrom,
            source: None,
            gene_type: None,
            start,
            stop,
            gene: name.to_string(),
            product: None,
        }
    }

    fn snp(
        chrom: ChromId,
        start: PosType,
        alt: &str,
        rsid: &str,
    ) -> SnpRecord {
        SnpRecord {
            rsid: rsid.into(),
            chrom,
            start,
            stop: start,
            r#ref: "A".into(),
            alt: alt.into(),
        }
    }

    #[test]
    fn test_snp_point_lookup() {
        let repo = InMemoryAnnotationRepository::new(
            vec![snp(1, 100, "T", "rs1"), snp(1, 100, "G", "rs2")],
            vec![],
            vec![],
        );
        let hits = repo.find_snp(1, 100, 100, "T").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].rsid.as_str(), "rs1");
        assert!(repo.find_snp(1, 100, 100, "C").unwrap().is_empty());
        assert!(repo.find_snp(2, 100, 100, "T").unwrap().is_empty());
    }

    #[test]
    fn test_gene_overlap_requires_containment() {
        let repo = InMemoryAnnotationRepository::new(
            vec![],
            vec![],
            vec![gene(1, 100, 200, "GENE1"), gene(1, 150, 160, "GENE2")],
        );
        // inside both
        let both = repo.find_genes_overlapping(1, 155, 156).unwrap();
        assert_eq!(both.len(), 2);
        // inside GENE1 only; GENE2 overlaps but does not contain
        let one = repo.find_genes_overlapping(1, 140, 170).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].gene, "GENE1");
        // different chromosome
        assert!(repo.find_genes_overlapping(2, 155, 156).unwrap().is_empty());
    }

    #[test]
    fn test_catalog_lookup_order_is_canonical() {
        let catalog = InMemoryGeneCatalog::new(vec![
            GeneSpan { chrom: 2, start: 50, stop: 60, name: "B".to_string() },
            GeneSpan { chrom: 1, start: 100, stop: 200, name: "A".to_string() },
            GeneSpan { chrom: 1, start: 10, stop: 20, name: "B".to_string() },
        ]);
        let names: HashSet<String> = ["A", "B"].iter().map(|s| s.to_string()).collect();
        let spans = catalog.lookup(&names).unwrap();
        let order: Vec<(ChromId, PosType)> =
            spans.iter().map(|s| (s.chrom, s.start)).collect();
        assert_eq!(order, vec![(1, 10), (1, 100), (2, 50)]);
    }
}
