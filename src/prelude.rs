pub use crate::data_structs::annotation::{
    ClinvarRecord,
    GeneRecord,
    SnpRecord,
    MISS_SENTINEL,
};
pub use crate::data_structs::coords::{
    chrom_from_name,
    chrom_to_name,
    GenomicInterval,
};
pub use crate::data_structs::note::{
    Note,
    NoteKey,
    NoteVersion,
};
pub use crate::data_structs::typedef::VpSmallStr;
pub use crate::data_structs::variant::{
    AnnotatedRow,
    ExplodedRow,
    NoteColumns,
    Resolved,
    VariantRecord,
};
pub use crate::notes::NoteVersionStore;
pub use crate::pipeline::annotate::{
    AnnotationFlags,
    AnnotationJoiner,
};
pub use crate::pipeline::explode::explode;
pub use crate::pipeline::genotype::resolve;
pub use crate::pipeline::query::{
    HelpPayload,
    QueryConfig,
    QueryEngine,
    QueryOutput,
    QueryTable,
};
pub use crate::pipeline::regions::genes_to_regions;
pub use crate::repo::{
    AnnotationRepository,
    GeneCatalog,
    GeneSpan,
    NoteLookup,
    VariantStore,
};
pub use crate::request::QueryRequest;
