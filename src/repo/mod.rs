//! Boundary traits for the external collaborators.
//!
//! The columnar variant store, the gene catalog, the annotation catalogs
//! and the note lookup are external systems; the pipeline only consumes
//! the read contracts defined here. [`memory`] provides in-memory
//! implementations backed by hash and interval indexes, used for embedding
//! and tests.

pub mod memory;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::data_structs::annotation::{ClinvarRecord, GeneRecord, SnpRecord};
use crate::data_structs::note::Note;
use crate::data_structs::typedef::{ChromId, PosType};
use crate::data_structs::variant::VariantRecord;

/// One gene catalog hit: a named span on a chromosome.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneSpan {
    pub chrom: ChromId,
    pub start: PosType,
    pub stop:  PosType,
    pub name:  String,
}

/// Read contract of the columnar variant store.
///
/// Regions use the `chrN:start-stop` grammar with inclusive 1-based
/// coordinates. A read failure is fatal to the whole request.
pub trait VariantStore {
    fn read(
        &self,
        attrs: &[String],
        regions: &[String],
        samples: &[String],
    ) -> anyhow::Result<Vec<VariantRecord>>;

    /// Attribute names the store can return, for the help payload.
    fn attributes(&self) -> Vec<String>;

    /// Sample names present in the store, for the help payload.
    fn samples(&self) -> Vec<String>;
}

/// Gene-name lookup against the gene catalog.
///
/// Implementations return spans in their own canonical order (not the
/// caller's name order), so downstream region merging is independent of how
/// the names were listed. Duplicate spans are allowed; unmatched names
/// simply contribute nothing.
pub trait GeneCatalog {
    fn lookup(
        &self,
        names: &HashSet<String>,
    ) -> anyhow::Result<Vec<GeneSpan>>;
}

/// Point and overlap lookups against the reference annotation catalogs.
///
/// Zero-or-more records per key; the joiner applies first-match (SNP,
/// ClinVar) or union (genes) semantics on top. Individual lookups may fail
/// transiently; the joiner treats that as a miss and keeps going.
pub trait AnnotationRepository: Sync {
    fn find_snp(
        &self,
        chrom: ChromId,
        start: PosType,
        stop: PosType,
        allele: &str,
    ) -> anyhow::Result<Vec<SnpRecord>>;

    fn find_clinvar(
        &self,
        chrom: ChromId,
        start: PosType,
        stop: PosType,
        allele: &str,
    ) -> anyhow::Result<Vec<ClinvarRecord>>;

    /// All gene records whose span contains `(start, stop)`.
    fn find_genes_overlapping(
        &self,
        chrom: ChromId,
        start: PosType,
        stop: PosType,
    ) -> anyhow::Result<Vec<GeneRecord>>;
}

/// Curator note lookup by variant locus.
pub trait NoteLookup: Sync {
    fn find_by_locus(
        &self,
        chrom: ChromId,
        start: PosType,
        stop: PosType,
        allele: &str,
    ) -> Option<Note>;
}
