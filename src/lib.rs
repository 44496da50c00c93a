//! # varprism
//!
//! `varprism` is a Rust library for turning raw multi-sample, multi-allelic
//! genomic variant records into annotated result tables, and for maintaining
//! a temporally versioned store of curator annotations ("notes") keyed to
//! specific variant loci.
//!
//! ## Key features
//!
//! * **Typed pipeline stages**: variant rows move through explicit record
//!   types ([`VariantRecord`] → [`ExplodedRow`] → [`AnnotatedRow`]) instead
//!   of label-indexed tables, so every stage has a static column contract.
//! * **Genotype resolution**: per-call genotype codes are resolved into the
//!   actual allele strings and allele frequencies ([`pipeline::genotype`]).
//! * **Multi-allelic explosion**: rows holding several resolved values are
//!   expanded into one row per value ([`pipeline::explode`]).
//! * **Gene region merging**: gene name sets become minimal covering genomic
//!   interval lists ([`pipeline::regions`]).
//! * **Annotation joins**: batched, first-match joins against SNP, ClinVar
//!   and gene catalogs with schema-uniform miss sentinels
//!   ([`pipeline::annotate`]).
//! * **Temporal notes**: an append-only version chain per note, with
//!   close-then-insert versioning that never mutates committed history
//!   ([`notes::NoteVersionStore`]).
//!
//! The external collaborators (the columnar variant store, the reference
//! catalogs, the note lookup) are consumed through the traits in [`repo`];
//! in-memory implementations backed by interval indexes are provided for
//! embedding and testing.
//!
//! Number of worker threads can be configured by setting the
//! `VARPRISM_NUM_THREADS` environment variable.
//!
//! ## Structure
//!
//! * [`data_structs`]: record types — genomic coordinates, variant rows,
//!   catalog records and notes.
//! * [`pipeline`]: the resolution → explosion → annotation pipeline and the
//!   query orchestration around it.
//! * [`notes`]: the temporal note version store.
//! * [`repo`]: boundary traits for the variant store and reference catalogs,
//!   plus in-memory implementations.
//! * [`request`]: validation of the raw request surface (regions, samples,
//!   genes, flags) and the query summary/help payloads.

pub mod data_structs;
pub mod notes;
pub mod pipeline;
pub mod prelude;
pub mod repo;
pub mod request;
pub mod utils;

#[allow(unused_imports)]
use prelude::*;
