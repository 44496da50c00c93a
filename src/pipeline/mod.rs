//! The variant resolution and annotation pipeline.
//!
//! Stages, in flow order: [`regions`] (gene names → merged intervals, when
//! genes were given), the external variant read, [`genotype`] (genotype
//! codes → resolved allele/frequency values), [`explode`] (multi-valued
//! rows → one row per value), [`annotate`] (catalog joins) and [`query`]
//! (orchestration of the whole flow plus warnings and limits).
//!
//! Resolution, explosion and merging are pure per row/batch; they hold no
//! shared state and preserve input row order.

pub mod annotate;
pub mod explode;
pub mod genotype;
pub mod query;
pub mod regions;
