//! Query orchestration: the full request → annotated table flow.
//!
//! Flow: plan the request (region/sample/gene validation, gene-to-region
//! resolution, pathogenic fallback) → variant store read → genotype
//! resolution → explosion → note attachment → optional non-variant filter →
//! overall cap check → catalog joins. Partial annotation failure never
//! discards the batch; only the initial variant read is fatal.

use std::time::Instant;

use anyhow::Context;
use log::{info, warn};
use serde::Serialize;

use crate::data_structs::variant::AnnotatedRow;
use crate::pipeline::annotate::{AnnotationFlags, AnnotationJoiner};
use crate::pipeline::explode::explode;
use crate::repo::{AnnotationRepository, GeneCatalog, NoteLookup, VariantStore};
use crate::request::{
    plan_request,
    translate_attr,
    QueryRequest,
    RequestPlan,
    DEFAULT_QUERY_ATTRS,
};

/// Engine-level tuning knobs. The limits bound worst-case latency
/// deterministically; they are guards, not correctness rules.
#[derive(Debug, Clone, Copy)]
pub struct QueryConfig {
    /// Nonzero: only this many rows get SNP/ClinVar lookups per batch.
    pub clinvar_search_limit: usize,
    /// Nonzero: batches larger than this skip annotation entirely.
    pub overall_search_limit: usize,
    /// Master switch for the dbSNP lookup.
    pub snp_search:           bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            clinvar_search_limit: 0,
            overall_search_limit: 1000,
            snp_search:           true,
        }
    }
}

/// Guidance returned for a malformed search: what can actually be queried.
#[derive(Debug, Clone, Serialize)]
pub struct HelpPayload {
    pub message:    String,
    pub attributes: Vec<String>,
    pub samples:    Vec<String>,
}

impl HelpPayload {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "attributes": self.attributes.join(","),
            "samples": self.samples.join(","),
            "message": self.message,
        })
    }
}

/// What was asked and how the run went, echoed back with the table.
#[derive(Debug, Clone, Serialize)]
pub struct QuerySummary {
    pub regions:    String,
    pub genes:      String,
    pub samples:    String,
    pub attributes: String,
    pub details:    String,
}

/// The annotated result table.
#[derive(Debug, Clone)]
pub struct QueryTable {
    rows:         Vec<AnnotatedRow>,
    pub summary:  QuerySummary,
    pub warnings: Vec<String>,
}

impl QueryTable {
    pub fn rows(&self) -> &[AnnotatedRow] {
        &self.rows
    }

    /// Rows with their presentation index, renumbered 1..N.
    pub fn numbered_rows(&self) -> impl Iterator<Item = (usize, &AnnotatedRow)> {
        self.rows.iter().enumerate().map(|(i, row)| (i + 1, row))
    }

    /// Output header: the requested attributes (with presentation renames)
    /// followed by every appended column.
    pub fn column_names() -> Vec<&'static str> {
        let mut columns: Vec<&'static str> = DEFAULT_QUERY_ATTRS
            .iter()
            .map(|attr| translate_attr(attr))
            .collect();
        columns.extend(["actual_allele", "lookedup_af"]);
        columns.extend(crate::data_structs::variant::NoteColumns::COLUMNS);
        columns.extend(AnnotatedRow::annotation_columns());
        columns
    }
}

/// A finished query: either the annotated table or the help payload for a
/// malformed search.
#[derive(Debug, Clone)]
pub enum QueryOutput {
    Table(QueryTable),
    Help(HelpPayload),
}

/// Ties the boundary collaborators together and runs requests end to end.
pub struct QueryEngine<'a> {
    store:   &'a dyn VariantStore,
    catalog: &'a dyn GeneCatalog,
    repo:    &'a dyn AnnotationRepository,
    notes:   &'a dyn NoteLookup,
    config:  QueryConfig,
}

impl<'a> QueryEngine<'a> {
    pub fn new(
        store: &'a dyn VariantStore,
        catalog: &'a dyn GeneCatalog,
        repo: &'a dyn AnnotationRepository,
        notes: &'a dyn NoteLookup,
    ) -> Self {
        Self {
            store,
            catalog,
            repo,
            notes,
            config: QueryConfig::default(),
        }
    }

    pub fn with_config(
        mut self,
        config: QueryConfig,
    ) -> Self {
        self.config = config;
        self
    }

    /// Runs one request end to end.
    ///
    /// Recoverable problems (malformed tokens, over-cap batches, per-key
    /// lookup failures) come back inside the output as help payloads or
    /// warnings; an `Err` means the request could not produce rows at all
    /// (terminal validation failure or a variant store read failure).
    pub fn run(
        &self,
        request: &QueryRequest,
    ) -> anyhow::Result<QueryOutput> {
        let started = Instant::now();

        let (regions, samples, mut warnings) =
            match plan_request(request, self.catalog)? {
                RequestPlan::Proceed {
                    regions,
                    samples,
                    warnings,
                } => (regions, samples, warnings),
                RequestPlan::Help { message } => {
                    warn!("{}", message);
                    return Ok(QueryOutput::Help(HelpPayload {
                        message,
                        attributes: self.store.attributes(),
                        samples: self.store.samples(),
                    }));
                },
            };

        let attrs: Vec<String> =
            DEFAULT_QUERY_ATTRS.iter().map(|a| a.to_string()).collect();
        let records = self
            .store
            .read(&attrs, &regions, &samples)
            .context("Variant store read failed")?;
        info!("{} records found.", records.len());

        let over_ploidy = records.iter().any(|rec| rec.genotype.len() > 2);

        let mut rows = explode(records)?;
        let joiner = AnnotationJoiner::new(self.repo, self.notes);
        joiner.attach_notes(&mut rows);

        let filter_requested =
            request.hide_nonvariants || request.clinvar || request.gene_list;
        if filter_requested {
            if over_ploidy {
                let message =
                    "fmt_GT had more than 2 strands. Truncating to 2 only.".to_string();
                warn!("{}", message);
                warnings.push(message);
            }
            rows.retain(|row| !row.is_non_variant());
        }

        let cap = self.config.overall_search_limit;
        let rows = if cap > 0 && rows.len() > cap {
            let message = format!(
                "More than {} records retrieved. Not executing gene/snp/clinvar search.",
                cap
            );
            warn!("{}", message);
            warnings.push(message);
            rows.into_iter().map(AnnotatedRow::unannotated).collect()
        }
        else if !rows.is_empty() && (request.clinvar || request.gene_list) {
            let flags = AnnotationFlags {
                clinvar:   request.clinvar,
                gene_list: request.gene_list,
                snp:       self.config.snp_search,
            };
            joiner.annotate(rows, flags, self.config.clinvar_search_limit)
        }
        else {
            rows.into_iter().map(AnnotatedRow::unannotated).collect()
        };

        let elapsed = started.elapsed().as_secs();
        let summary = QuerySummary {
            regions:    regions.join(","),
            genes:      request.genes.clone(),
            samples:    samples.join(","),
            attributes: attrs.join(","),
            details:    format!(
                "time={} secs | SNP search={} | Clinvar search={} | HideNonVariants={} | \
                 clinvar_limit={} | overall_limit={}",
                elapsed,
                self.config.snp_search,
                request.clinvar,
                request.hide_nonvariants,
                self.config.clinvar_search_limit,
                self.config.overall_search_limit,
            ),
        };

        Ok(QueryOutput::Table(QueryTable {
            rows,
            summary,
            warnings,
        }))
    }
}
