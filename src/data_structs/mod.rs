//! Record types used throughout the crate.
//!
//! Every pipeline stage has an explicit typed record
//! ([`VariantRecord`](variant::VariantRecord) →
//! [`ExplodedRow`](variant::ExplodedRow) →
//! [`AnnotatedRow`](variant::AnnotatedRow)) instead of a label-indexed
//! table, so column contracts are checked at compile time.

pub mod annotation;
pub mod coords;
pub mod note;
pub mod typedef;
pub mod variant;
