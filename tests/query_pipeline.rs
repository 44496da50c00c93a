use rstest::{
    fixture,
    rstest,
};
use varprism::data_structs::annotation::{GeneRecord, SnpRecord, MISS_SENTINEL};
use varprism::data_structs::note::NoteKey;
use varprism::data_structs::variant::VariantRecord;
use varprism::notes::NoteVersionStore;
use varprism::pipeline::query::{
    QueryConfig,
    QueryEngine,
    QueryOutput,
};
use varprism::repo::memory::{
    InMemoryAnnotationRepository,
    InMemoryGeneCatalog,
    InMemoryVariantStore,
};
use varprism::repo::GeneSpan;
use varprism::request::{QueryRequest, DEFAULT_QUERY_ATTRS};

fn variant(
    sample: &str,
    contig: &str,
    pos: u32,
    alleles: &[&str],
    genotype: &[i32],
    freqs: &[f64],
) -> VariantRecord {
    VariantRecord {
        sample:      sample.into(),
        id:          ".".into(),
        alleles:     alleles.iter().map(|a| (*a).into()).collect(),
        genotype:    genotype.to_vec(),
        contig:      contig.into(),
        pos_start:   pos,
        pos_end:     pos,
        allele_freq: freqs.to_vec(),
    }
}

#[fixture]
fn store() -> InMemoryVariantStore {
    InMemoryVariantStore::new(
        vec![
            // heterozygous alt at chr1:100, annotated in every catalog
            variant("s1", "chr1", 100, &["A", "T"], &[0, 1], &[0.37]),
            // homozygous reference at chr1:120
            variant("s1", "chr1", 120, &["G", "C"], &[0, 0], &[0.10]),
            // multi-allelic call for the second sample
            variant("s2", "chr1", 100, &["A", "T", "G"], &[1, 2], &[0.37, 0.05]),
        ],
        DEFAULT_QUERY_ATTRS.iter().map(|a| a.to_string()).collect(),
    )
}

#[fixture]
fn catalog() -> InMemoryGeneCatalog {
    InMemoryGeneCatalog::new(vec![GeneSpan {
        chrom: 1,
        start: 50,
        stop:  150,
        name:  "GENE1".to_string(),
    }])
}

#[fixture]
fn repo() -> InMemoryAnnotationRepository {
    InMemoryAnnotationRepository::new(
        vec![SnpRecord {
            rsid:  "rs100".into(),
            chrom: 1,
            start: 100,
            stop:  100,
            r#ref: "A".into(),
            alt:   "T".into(),
        }],
        vec![],
        vec![GeneRecord {
            chrom:     1,
            source:    None,
            gene_type: None,
            start:     50,
            stop:      150,
            gene:      "GENE1".to_string(),
            product:   None,
        }],
    )
}

#[fixture]
fn notes() -> NoteVersionStore {
    let notes = NoteVersionStore::new();
    notes
        .create_version(
            &NoteKey::new(1, 100, 100, "A", "T"),
            "Known pathogenic founder variant",
            "curator1",
            None,
        )
        .expect("Failed to seed note store");
    notes
}

fn run(
    store: &InMemoryVariantStore,
    catalog: &InMemoryGeneCatalog,
    repo: &InMemoryAnnotationRepository,
    notes: &NoteVersionStore,
    request: &QueryRequest,
) -> QueryOutput {
    let _ = pretty_env_logger::try_init();
    QueryEngine::new(store, catalog, repo, notes)
        .run(request)
        .expect("Query failed")
}

#[rstest]
fn test_malformed_search_returns_help(
    store: InMemoryVariantStore,
    catalog: InMemoryGeneCatalog,
    repo: InMemoryAnnotationRepository,
    notes: NoteVersionStore,
) {
    let output = run(&store, &catalog, &repo, &notes, &QueryRequest::default());
    let QueryOutput::Help(help) = output
    else {
        panic!("Expected help payload");
    };
    assert!(help.attributes.contains(&"fmt_GT".to_string()));
    assert_eq!(help.samples, vec!["s1".to_string(), "s2".to_string()]);
}

#[rstest]
fn test_region_query_explodes_and_numbers_rows(
    store: InMemoryVariantStore,
    catalog: InMemoryGeneCatalog,
    repo: InMemoryAnnotationRepository,
    notes: NoteVersionStore,
) {
    let request = QueryRequest {
        regions: "chr1:1-1000".to_string(),
        samples: "s1,s2".to_string(),
        ..Default::default()
    };
    let output = run(&store, &catalog, &repo, &notes, &request);
    let QueryOutput::Table(table) = output
    else {
        panic!("Expected table");
    };
    // s1 het (1 row) + s1 hom-ref (1 row) + s2 multi-allelic (2 rows)
    assert_eq!(table.rows().len(), 4);
    let indices: Vec<usize> = table.numbered_rows().map(|(i, _)| i).collect();
    assert_eq!(indices, vec![1, 2, 3, 4]);
    // without clinvar/gene flags, every annotation column is a miss
    assert!(table
        .rows()
        .iter()
        .all(|row| row.rsid == MISS_SENTINEL && row.genes.is_none()));
    // notes attach regardless of annotation flags
    let noted: Vec<&str> = table
        .rows()
        .iter()
        .filter(|row| row.row.note.note_id != MISS_SENTINEL)
        .map(|row| row.row.sample.as_str())
        .collect();
    assert_eq!(noted, vec!["s1", "s2"]);
}

#[rstest]
fn test_clinvar_flag_joins_snp_and_hides_nonvariants(
    store: InMemoryVariantStore,
    catalog: InMemoryGeneCatalog,
    repo: InMemoryAnnotationRepository,
    notes: NoteVersionStore,
) {
    let request = QueryRequest {
        regions: "chr1:1-1000".to_string(),
        samples: "s1".to_string(),
        clinvar: true,
        ..Default::default()
    };
    let output = run(&store, &catalog, &repo, &notes, &request);
    let QueryOutput::Table(table) = output
    else {
        panic!("Expected table");
    };
    // the hom-ref row is filtered before annotation
    assert_eq!(table.rows().len(), 1);
    let row = &table.rows()[0];
    assert_eq!(row.rsid, "rs100");
    assert!(row.clinvar.is_none());
}

#[rstest]
fn test_gene_query_resolves_regions_and_joins_gene_names(
    store: InMemoryVariantStore,
    catalog: InMemoryGeneCatalog,
    repo: InMemoryAnnotationRepository,
    notes: NoteVersionStore,
) {
    let request = QueryRequest {
        samples: "s1".to_string(),
        genes: "GENE1".to_string(),
        gene_list: true,
        ..Default::default()
    };
    let output = run(&store, &catalog, &repo, &notes, &request);
    let QueryOutput::Table(table) = output
    else {
        panic!("Expected table");
    };
    // only chr1:100 falls inside GENE1's span; the hom-ref row at 120 is
    // inside the span too but filtered as a non-variant
    assert_eq!(table.rows().len(), 1);
    assert_eq!(table.rows()[0].genes.as_deref(), Some("GENE1"));
    assert_eq!(table.summary.regions, "chr1:50-150");
}

#[rstest]
fn test_unknown_gene_is_terminal(
    store: InMemoryVariantStore,
    catalog: InMemoryGeneCatalog,
    repo: InMemoryAnnotationRepository,
    notes: NoteVersionStore,
) {
    let request = QueryRequest {
        samples: "s1".to_string(),
        genes: "NOSUCHGENE".to_string(),
        ..Default::default()
    };
    let engine = QueryEngine::new(&store, &catalog, &repo, &notes);
    assert!(engine.run(&request).is_err());
}

#[rstest]
fn test_samples_only_uses_pathogenic_fallback(
    store: InMemoryVariantStore,
    catalog: InMemoryGeneCatalog,
    repo: InMemoryAnnotationRepository,
    notes: NoteVersionStore,
) {
    let request = QueryRequest {
        samples: "s1".to_string(),
        ..Default::default()
    };
    let output = run(&store, &catalog, &repo, &notes, &request);
    let QueryOutput::Table(table) = output
    else {
        panic!("Expected table");
    };
    assert!(table
        .warnings
        .iter()
        .any(|w| w.contains("pathogenic variants from clinvar was substituted")));
    assert_eq!(table.summary.regions.split(',').count(), 100);
}

#[rstest]
fn test_overall_limit_skips_annotation(
    store: InMemoryVariantStore,
    catalog: InMemoryGeneCatalog,
    repo: InMemoryAnnotationRepository,
    notes: NoteVersionStore,
) {
    let request = QueryRequest {
        regions: "chr1:1-1000".to_string(),
        samples: "s1,s2".to_string(),
        clinvar: true,
        ..Default::default()
    };
    let output = QueryEngine::new(&store, &catalog, &repo, &notes)
        .with_config(QueryConfig {
            overall_search_limit: 1,
            ..Default::default()
        })
        .run(&request)
        .expect("Query failed");
    let QueryOutput::Table(table) = output
    else {
        panic!("Expected table");
    };
    assert!(table
        .warnings
        .iter()
        .any(|w| w.contains("Not executing gene/snp/clinvar search")));
    assert!(table.rows().iter().all(|row| row.rsid == MISS_SENTINEL));
}
