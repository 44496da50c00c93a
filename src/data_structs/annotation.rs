//! Reference catalog records: dbSNP, ClinVar and gene annotations.
//!
//! Field sets mirror the ingested catalog schemas exactly; the ClinVar
//! record carries the full variant_summary column set so annotated output
//! keeps every field a curator expects to see.

use serde::{Deserialize, Serialize};

use crate::data_structs::typedef::{ChromId, PosType, VpSmallStr};

/// Uniform sentinel rendered in place of every field of a missed lookup.
pub const MISS_SENTINEL: &str = "-";

/// One dbSNP catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnpRecord {
    pub rsid:  VpSmallStr,
    pub chrom: ChromId,
    pub start: PosType,
    pub stop:  PosType,
    pub r#ref: VpSmallStr,
    pub alt:   VpSmallStr,
}

/// One ClinVar variant_summary record.
///
/// Records are unique on `(alleleid, order)`. String fields keep whatever
/// the ingest produced; `referenceallelevcf`/`alternateallelevcf` may be
/// truncated for long indels but the locus is still captured by
/// `start`/`stop`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinvarRecord {
    pub id:                   i64,
    pub alleleid:             i64,
    pub r#type:               String,
    pub name:                 String,
    pub geneid:               i64,
    pub genesymbol:           String,
    pub hgnc_id:              String,
    pub clinicalsignificance: String,
    pub clinsigsimple:        i32,
    pub lastevaluated:        String,
    pub rsid:                 i64,
    pub nsvesv:               String,
    pub rcvaccession:         String,
    pub phenotypeids:         String,
    pub phenotypelist:        String,
    pub origin:               String,
    pub originsimple:         String,
    pub assembly:             String,
    pub chromosomeaccession:  String,
    pub chromosome:           ChromId,
    pub start:                PosType,
    pub stop:                 PosType,
    pub referenceallele:      String,
    pub alternateallele:      String,
    pub cytogenetic:          String,
    pub reviewstatus:         String,
    pub numbersubmitters:     i32,
    pub guidelines:           String,
    pub testedingtr:          String,
    pub otherids:             String,
    pub submittercategories:  i32,
    pub variationid:          i64,
    pub positionvcf:          PosType,
    pub referenceallelevcf:   String,
    pub alternateallelevcf:   String,
    pub order:                f64,
}

impl ClinvarRecord {
    pub const COLUMNS: [&'static str; 36] = [
        "id",
        "alleleid",
        "type",
        "name",
        "geneid",
        "genesymbol",
        "hgnc_id",
        "clinicalsignificance",
        "clinsigsimple",
        "lastevaluated",
        "rsid",
        "nsvesv",
        "rcvaccession",
        "phenotypeids",
        "phenotypelist",
        "origin",
        "originsimple",
        "assembly",
        "chromosomeaccession",
        "chromosome",
        "start",
        "stop",
        "referenceallele",
        "alternateallele",
        "cytogenetic",
        "reviewstatus",
        "numbersubmitters",
        "guidelines",
        "testedingtr",
        "otherids",
        "submittercategories",
        "variationid",
        "positionvcf",
        "referenceallelevcf",
        "alternateallelevcf",
        "order",
    ];

    /// Renders the record into output columns, aligned with [`Self::COLUMNS`].
    pub fn to_columns(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.alleleid.to_string(),
            self.r#type.clone(),
            self.name.clone(),
            self.geneid.to_string(),
            self.genesymbol.clone(),
            self.hgnc_id.clone(),
            self.clinicalsignificance.clone(),
            self.clinsigsimple.to_string(),
            self.lastevaluated.clone(),
            self.rsid.to_string(),
            self.nsvesv.clone(),
            self.rcvaccession.clone(),
            self.phenotypeids.clone(),
            self.phenotypelist.clone(),
            self.origin.clone(),
            self.originsimple.clone(),
            self.assembly.clone(),
            self.chromosomeaccession.clone(),
            self.chromosome.to_string(),
            self.start.to_string(),
            self.stop.to_string(),
            self.referenceallele.clone(),
            self.alternateallele.clone(),
            self.cytogenetic.clone(),
            self.reviewstatus.clone(),
            self.numbersubmitters.to_string(),
            self.guidelines.clone(),
            self.testedingtr.clone(),
            self.otherids.clone(),
            self.submittercategories.to_string(),
            self.variationid.to_string(),
            self.positionvcf.to_string(),
            self.referenceallelevcf.clone(),
            self.alternateallelevcf.clone(),
            self.order.to_string(),
        ]
    }

    /// One miss sentinel per schema column.
    pub fn miss_columns() -> Vec<String> {
        vec![MISS_SENTINEL.to_string(); Self::COLUMNS.len()]
    }
}

/// One gene catalog record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneRecord {
    pub chrom:     ChromId,
    pub source:    Option<String>,
    pub gene_type: Option<String>,
    pub start:     PosType,
    pub stop:      PosType,
    pub gene:      String,
    pub product:   Option<String>,
}
