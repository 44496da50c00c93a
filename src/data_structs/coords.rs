//! Genomic coordinates.
//!
//! Intervals here are closed and 1-based, matching the variant store's
//! region grammar `chr(1-22|X|Y):start-stop`. Chromosomes are carried as
//! numeric ids (`chr1`..`chr22` → 1..22, `chrX` → 23, `chrY` → 24) so that
//! catalog keys sort and hash cheaply.

use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};

use crate::data_structs::typedef::{ChromId, PosType};

pub const CHR_X: ChromId = 23;
pub const CHR_Y: ChromId = 24;

/// Parses a chromosome label (`chr1`..`chr22`, `chrX`, `chrY`) into its
/// numeric id. The numeric aliases `chr23`/`chr24` are accepted for X/Y.
pub fn chrom_from_name(name: &str) -> anyhow::Result<ChromId> {
    let suffix = name
        .strip_prefix("chr")
        .ok_or_else(|| anyhow!("Chromosome label must start with 'chr': {}", name))?;
    match suffix {
        "X" => Ok(CHR_X),
        "Y" => Ok(CHR_Y),
        digits => {
            let id: ChromId = digits
                .parse()
                .map_err(|_| anyhow!("Unknown chromosome label: {}", name))?;
            if (1..=CHR_Y).contains(&id) {
                Ok(id)
            }
            else {
                bail!("Chromosome number out of range: {}", name)
            }
        },
    }
}

/// Formats a numeric chromosome id back into its `chrN` label.
pub fn chrom_to_name(chrom: ChromId) -> String {
    match chrom {
        CHR_X => "chrX".to_string(),
        CHR_Y => "chrY".to_string(),
        n => format!("chr{}", n),
    }
}

/// A closed, 1-based genomic interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenomicInterval {
    chrom: ChromId,
    start: PosType,
    stop:  PosType,
}

impl GenomicInterval {
    pub fn new(
        chrom: ChromId,
        start: PosType,
        stop: PosType,
    ) -> Self {
        assert!(
            start <= stop,
            "Interval start must not exceed stop ({} > {})",
            start,
            stop
        );
        Self { chrom, start, stop }
    }

    pub fn chrom(&self) -> ChromId {
        self.chrom
    }

    pub fn start(&self) -> PosType {
        self.start
    }

    pub fn stop(&self) -> PosType {
        self.stop
    }

    /// Absorbs another span on the same chromosome, extending the stop.
    pub fn extend_to(
        &mut self,
        stop: PosType,
    ) {
        self.stop = self.stop.max(stop);
    }

    /// True when this interval fully contains `(start, stop)`.
    pub fn contains_span(
        &self,
        start: PosType,
        stop: PosType,
    ) -> bool {
        self.start <= start && self.stop >= stop
    }

    /// True when the two intervals share at least one base. Touching
    /// endpoints count as overlap since intervals are closed.
    pub fn overlaps(
        &self,
        other: &Self,
    ) -> bool {
        self.chrom == other.chrom && self.start <= other.stop && other.start <= self.stop
    }
}

impl PartialOrd for GenomicInterval {
    fn partial_cmp(
        &self,
        other: &Self,
    ) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GenomicInterval {
    fn cmp(
        &self,
        other: &Self,
    ) -> Ordering {
        (self.chrom, self.start, self.stop).cmp(&(other.chrom, other.start, other.stop))
    }
}

impl Display for GenomicInterval {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{}:{}-{}", chrom_to_name(self.chrom), self.start, self.stop)
    }
}

impl FromStr for GenomicInterval {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chrom_str, span) = s
            .split_once(':')
            .ok_or_else(|| anyhow!("Region must look like chrN:start-stop: {}", s))?;
        let chrom = chrom_from_name(chrom_str)?;
        let (start_str, stop_str) = span
            .split_once('-')
            .ok_or_else(|| anyhow!("Region span must look like start-stop: {}", s))?;
        let start: PosType = start_str
            .parse()
            .map_err(|_| anyhow!("Invalid region start: {}", s))?;
        let stop: PosType = stop_str
            .parse()
            .map_err(|_| anyhow!("Invalid region stop: {}", s))?;
        if start > stop {
            bail!("Region start exceeds stop: {}", s);
        }
        Ok(Self::new(chrom, start, stop))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chrom_name_roundtrip() {
        assert_eq!(chrom_from_name("chr1").unwrap(), 1);
        assert_eq!(chrom_from_name("chr22").unwrap(), 22);
        assert_eq!(chrom_from_name("chrX").unwrap(), CHR_X);
        assert_eq!(chrom_from_name("chrY").unwrap(), CHR_Y);
        assert_eq!(chrom_to_name(23), "chrX");
        assert_eq!(chrom_to_name(7), "chr7");
    }

    #[test]
    fn test_chrom_name_rejects_garbage() {
        assert!(chrom_from_name("1").is_err());
        assert!(chrom_from_name("chrM").is_err());
        assert!(chrom_from_name("chr25").is_err());
        assert!(chrom_from_name("chr0").is_err());
        // numeric aliases for the sex chromosomes parse
        assert_eq!(chrom_from_name("chr23").unwrap(), CHR_X);
    }

    #[test]
    fn test_interval_parse_and_display() {
        let iv: GenomicInterval = "chr17:43124028-43124029".parse().unwrap();
        assert_eq!(iv.chrom(), 17);
        assert_eq!(iv.start(), 43124028);
        assert_eq!(iv.stop(), 43124029);
        assert_eq!(iv.to_string(), "chr17:43124028-43124029");

        let x: GenomicInterval = "chrX:154030912-154030912".parse().unwrap();
        assert_eq!(x.chrom(), CHR_X);
    }

    #[test]
    fn test_interval_parse_rejects_inverted_span() {
        assert!("chr1:200-100".parse::<GenomicInterval>().is_err());
        assert!("chr1:100".parse::<GenomicInterval>().is_err());
        assert!("1:100-200".parse::<GenomicInterval>().is_err());
    }

    #[test]
    fn test_interval_ordering() {
        let a = GenomicInterval::new(1, 100, 200);
        let b = GenomicInterval::new(1, 150, 160);
        let c = GenomicInterval::new(2, 10, 20);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_interval_overlap_touching() {
        let a = GenomicInterval::new(1, 100, 200);
        let b = GenomicInterval::new(1, 200, 300);
        let c = GenomicInterval::new(1, 201, 300);
        let d = GenomicInterval::new(2, 100, 200);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(!a.overlaps(&d));
    }
}
