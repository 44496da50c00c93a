use smallstr::SmallString;

pub const SMALLSTR_SIZE: usize = 20;

/// Inline string for allele and sample text. Most alleles are a handful of
/// bases, so this avoids a heap allocation per cell.
pub type VpSmallStr = SmallString<[u8; SMALLSTR_SIZE]>;

/// 1-based genomic position.
pub type PosType = u32;

/// Numeric chromosome id: 1-22, X = 23, Y = 24.
pub type ChromId = u8;

/// Per-call genotype code: -1 missing, 0 reference, n = allele index.
pub type GenotypeCode = i32;

/// Allele frequency.
pub type FreqType = f64;
