//! Variant row records for each pipeline stage.

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::data_structs::annotation::{ClinvarRecord, MISS_SENTINEL};
use crate::data_structs::coords::chrom_from_name;
use crate::data_structs::typedef::{ChromId, FreqType, GenotypeCode, PosType, VpSmallStr};

/// Placeholder the variant store uses for an absent dbSNP id.
pub const NO_ID: &str = ".";

/// One raw call read from the variant store.
///
/// `alleles` is ordered with index 0 being the reference allele.
/// `allele_freq` is aligned to the non-reference alleles only (alt index 0 =
/// first alt), which is why frequency resolution subtracts one from the
/// genotype code while allele resolution does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantRecord {
    pub sample:      VpSmallStr,
    pub id:          VpSmallStr,
    pub alleles:     Vec<VpSmallStr>,
    pub genotype:    Vec<GenotypeCode>,
    pub contig:      VpSmallStr,
    pub pos_start:   PosType,
    pub pos_end:     PosType,
    pub allele_freq: Vec<FreqType>,
}

impl VariantRecord {
    /// Numeric chromosome id for the record's contig label.
    pub fn chrom(&self) -> anyhow::Result<ChromId> {
        chrom_from_name(self.contig.as_str())
    }

    /// Checks the structural invariant: every non-negative genotype code is
    /// a valid index into `alleles`. A violation means the source data is
    /// corrupt.
    pub fn validate(&self) -> anyhow::Result<()> {
        for &code in &self.genotype {
            if code >= 0 && code as usize >= self.alleles.len() {
                bail!(
                    "Genotype code {} out of range for {} alleles at {}:{}",
                    code,
                    self.alleles.len(),
                    self.contig,
                    self.pos_start
                );
            }
        }
        Ok(())
    }
}

/// Result of resolving one record's genotype codes against a value array.
///
/// `None` means no non-missing call was made (and no default was requested),
/// `One` a single distinct call, `Many` several distinct calls that the
/// exploder will fan out into separate rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Resolved<T> {
    None,
    One(T),
    Many(Vec<T>),
}

impl<T> Resolved<T> {
    /// Number of values a list-shaped resolution fans out to. Scalar shapes
    /// (`None`, `One`) report zero here; they broadcast instead.
    pub fn list_len(&self) -> Option<usize> {
        match self {
            Resolved::Many(values) => Some(values.len()),
            _ => None,
        }
    }

    /// Value at the fan-out index. Scalars broadcast to every index.
    pub fn get(
        &self,
        index: usize,
    ) -> Option<&T> {
        match self {
            Resolved::None => None,
            Resolved::One(value) => Some(value),
            Resolved::Many(values) => values.get(index),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Resolved::None)
    }

    pub fn map<U>(
        self,
        mut f: impl FnMut(T) -> U,
    ) -> Resolved<U> {
        match self {
            Resolved::None => Resolved::None,
            Resolved::One(value) => Resolved::One(f(value)),
            Resolved::Many(values) => Resolved::Many(values.into_iter().map(f).collect()),
        }
    }
}

/// Curator note columns attached to a row: note id, locus, ref→alt and the
/// rendered current-history line. Misses carry the uniform sentinel in all
/// four columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteColumns {
    pub note_id:      String,
    pub chr_pos:      String,
    pub ref_alt:      String,
    pub note_history: String,
}

impl NoteColumns {
    pub fn miss() -> Self {
        Self {
            note_id:      MISS_SENTINEL.to_string(),
            chr_pos:      MISS_SENTINEL.to_string(),
            ref_alt:      MISS_SENTINEL.to_string(),
            note_history: MISS_SENTINEL.to_string(),
        }
    }

    pub const COLUMNS: [&'static str; 4] = ["note_id", "chr_pos", "ref_alt", "note_history"];
}

impl Default for NoteColumns {
    fn default() -> Self {
        Self::miss()
    }
}

/// One (variant, resolved allele) pair produced by the exploder.
///
/// Scalar columns of the source record are copied unchanged; `allele` and
/// `allele_freq` hold the positionally zipped resolved values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplodedRow {
    pub sample:      VpSmallStr,
    pub id:          VpSmallStr,
    pub alleles:     Vec<VpSmallStr>,
    pub genotype:    Vec<GenotypeCode>,
    pub contig:      VpSmallStr,
    pub chrom:       ChromId,
    pub pos_start:   PosType,
    pub pos_end:     PosType,
    pub allele:      Option<VpSmallStr>,
    pub allele_freq: Option<FreqType>,
    pub note:        NoteColumns,
}

impl ExplodedRow {
    /// True when the call carries no alternate genotype at all: either every
    /// call is reference (0) or every call is missing (-1). Only the first
    /// two calls are considered; longer genotypes are truncated upstream.
    pub fn is_non_variant(&self) -> bool {
        let calls = &self.genotype[..self.genotype.len().min(2)];
        if calls.is_empty() {
            return true;
        }
        calls.iter().all(|&c| c == 0) || calls.iter().all(|&c| c == -1)
    }
}

/// Final output row: the exploded row plus the joined annotation columns.
///
/// `rsid`, `clinvar` and `genes` render to the uniform miss sentinel when no
/// catalog record matched, so hit and miss rows always have the same column
/// count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRow {
    pub row:     ExplodedRow,
    pub rsid:    String,
    pub clinvar: Option<ClinvarRecord>,
    pub genes:   Option<String>,
}

impl AnnotatedRow {
    /// Unannotated row: every appended annotation column is a miss.
    pub fn unannotated(row: ExplodedRow) -> Self {
        Self {
            row,
            rsid: MISS_SENTINEL.to_string(),
            clinvar: None,
            genes: None,
        }
    }

    /// Appended column names, in output order.
    pub fn annotation_columns() -> Vec<&'static str> {
        let mut cols = vec!["rsid"];
        cols.extend(ClinvarRecord::COLUMNS);
        cols.push("gene");
        cols
    }

    /// Appended column values, in output order. Misses render as the
    /// uniform sentinel so the schema is identical on hit or miss.
    pub fn annotation_values(&self) -> Vec<String> {
        let mut values = vec![self.rsid.clone()];
        match &self.clinvar {
            Some(record) => values.extend(record.to_columns()),
            None => values.extend(ClinvarRecord::miss_columns()),
        }
        values.push(
            self.genes
                .clone()
                .unwrap_or_else(|| MISS_SENTINEL.to_string()),
        );
        values
    }
}
