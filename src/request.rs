//! The consumed request surface: csv region/sample/gene tokens plus flags,
//! owned by the (excluded) web layer and validated here.
//!
//! Validation never panics on user input: malformed searches resolve to a
//! help payload or a terminal error with guidance, and a missing region set
//! with valid samples falls back to the built-in pathogenic locus list.

use hashbrown::HashSet;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::pipeline::regions::genes_to_regions;
use crate::repo::GeneCatalog;

/// Region token grammar: `chr(1-22|X|Y):start-stop`, 1-based inclusive.
static REGION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^chr([1-9]|1[0-9]|2[0-4]|X|Y):\d{1,9}-\d{1,9}$").unwrap());

/// Sample tokens are restricted to alphanumeric/hyphen so they can never
/// smuggle query syntax into downstream stores.
static ALPHANUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9-]+$").unwrap());

/// Fallback region list substituted when samples are given without regions
/// or genes: a curated set of known pathogenic ClinVar loci.
pub const PATHOGENIC_REGIONS: [&str; 100] = [
    "chr17:43124028-43124029",
    "chr13:32340301-32340301",
    "chr7:117559591-117559593",
    "chr13:20189547-20189547",
    "chr12:112477719-112477719",
    "chr16:8811153-8811153",
    "chr1:216247118-216247118",
    "chr11:66211206-66211206",
    "chr19:11116928-11116928",
    "chr15:89327201-89327201",
    "chrX:154030912-154030912",
    "chr10:110964362-110964362",
    "chr22:50627165-50627165",
    "chr18:51078306-51078306",
    "chr9:101427574-101427574",
    "chr13:51944145-51944145",
    "chr16:23636036-23636037",
    "chr11:6617154-6617154",
    "chr3:12604200-12604200",
    "chr10:87933147-87933147",
    "chr11:534289-534289",
    "chr16:3243447-3243447",
    "chr12:102840507-102840507",
    "chr17:7674220-7674220",
    "chr18:31592974-31592974",
    "chr11:108251026-108251027",
    "chr12:76347713-76347714",
    "chr7:92501562-92501562",
    "chr9:37783993-37783993",
    "chr14:23426833-23426833",
    "chr15:72346579-72346580",
    "chr11:5226774-5226774",
    "chr11:47337729-47337730",
    "chr4:1801837-1801837",
    "chr1:45331219-45331221",
    "chr12:32802557-32802557",
    "chr2:47803500-47803501",
    "chr11:64759751-64759751",
    "chr6:43007265-43007265",
    "chr5:112839515-112839519",
    "chr19:41970405-41970405",
    "chr15:66436843-66436843",
    "chr7:140801502-140801502",
    "chr3:81648854-81648854",
    "chr17:42903947-42903947",
    "chr2:26195184-26195184",
    "chr4:987858-987858",
    "chr17:7222272-7222272",
    "chr1:9726972-9726972",
    "chr7:5986933-5986934",
    "chr12:101753470-101753471",
    "chr6:32040110-32040110",
    "chr3:179234297-179234297",
    "chr2:47414421-47414421",
    "chr13:31269278-31269278",
    "chr10:121520163-121520163",
    "chr7:107683453-107683453",
    "chr6:136898213-136898213",
    "chr16:30737370-30737370",
    "chr16:16163078-16163078",
    "chr2:28776944-28776944",
    "chr3:37047632-37047634",
    "chr17:31214524-31214524",
    "chr15:80180230-80180230",
    "chr17:80118271-80118271",
    "chr15:42387803-42387803",
    "chr17:80212128-80212128",
    "chr15:23645746-23645747",
    "chr6:73644583-73644583",
    "chr19:18162974-18162974",
    "chrX:111685040-111685040",
    "chr2:39022774-39022774",
    "chr15:90761015-90761015",
    "chr18:23536736-23536736",
    "chr6:161785820-161785820",
    "chr17:50167653-50167653",
    "chr9:95172033-95172033",
    "chr2:61839695-61839695",
    "chr4:3493106-3493107",
    "chr9:34649032-34649032",
    "chr1:94029515-94029515",
    "chr17:6425781-6425781",
    "chr4:186274193-186274193",
    "chr2:73914835-73914835",
    "chr10:54317414-54317414",
    "chr19:35831056-35831056",
    "chr7:151576412-151576412",
    "chr17:35103298-35103298",
    "chr19:12649932-12649932",
    "chr19:50323685-50323685",
    "chr9:108899816-108899816",
    "chr11:17531408-17531409",
    "chr17:17216394-17216395",
    "chr17:3499000-3499000",
    "chr11:2167905-2167905",
    "chr10:100749771-100749772",
    "chrX:153932410-153932410",
    "chr14:28767732-28767733",
    "chr15:63060899-63060899",
    "chr4:15567676-15567676",
];

/// Attributes requested from the variant store by default.
pub const DEFAULT_QUERY_ATTRS: [&str; 8] = [
    "sample_name",
    "id",
    "alleles",
    "fmt_GT",
    "contig",
    "pos_start",
    "pos_end",
    "info_AF",
];

/// Presentation rename applied to the output header.
pub fn translate_attr(attr: &str) -> &str {
    match attr {
        "fmt_GT" => "Genotype",
        other => other,
    }
}

/// Raw request as received from the web layer: csv token strings plus
/// flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    pub regions:          String,
    pub samples:          String,
    pub genes:            String,
    pub clinvar:          bool,
    pub hide_nonvariants: bool,
    pub gene_list:        bool,
}

/// Where validation landed: run the pipeline, answer with the help table,
/// or stop with guidance.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestPlan {
    /// Regions to query, plus any warnings produced while planning (for
    /// example the pathogenic-fallback substitution notice).
    Proceed {
        regions:  Vec<String>,
        samples:  Vec<String>,
        warnings: Vec<String>,
    },
    /// Malformed search: answer with the valid attributes/samples.
    Help { message: String },
}

fn split_csv(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        Vec::new()
    }
    else {
        raw.split(',').map(str::to_string).collect()
    }
}

fn regions_valid(tokens: &[String]) -> bool {
    !tokens.is_empty() && tokens.iter().all(|t| REGION_REGEX.is_match(t))
}

fn samples_valid(tokens: &[String]) -> bool {
    !tokens.is_empty() && tokens.iter().all(|t| ALPHANUMERIC_REGEX.is_match(t))
}

fn genes_valid(tokens: &[String]) -> bool {
    !tokens.is_empty() && tokens.iter().all(|t| !t.is_empty())
}

/// Validates the raw request and decides how to proceed.
///
/// Branches, in order:
/// * valid genes + samples → resolve genes through the catalog; an empty
///   resolution is terminal (nothing to query);
/// * valid regions + samples → run as given;
/// * nothing valid at all → help payload;
/// * invalid samples → terminal error with guidance;
/// * valid samples without regions or genes → pathogenic fallback list,
///   with a warning.
pub fn plan_request<C: GeneCatalog + ?Sized>(
    request: &QueryRequest,
    catalog: &C,
) -> anyhow::Result<RequestPlan> {
    let regions = split_csv(&request.regions);
    let samples = split_csv(&request.samples);
    let genes = split_csv(&request.genes);

    let regions_ok = regions_valid(&regions);
    let samples_ok = samples_valid(&samples);
    let genes_ok = genes_valid(&genes);

    if genes_ok && samples_ok {
        let gene_set: HashSet<String> = genes.into_iter().collect();
        let resolved = genes_to_regions(catalog, &gene_set)?;
        if resolved.is_empty() {
            anyhow::bail!("Please specify samples and [regions or genes].");
        }
        let regions = resolved.iter().map(|iv| iv.to_string()).collect();
        return Ok(RequestPlan::Proceed {
            regions,
            samples,
            warnings: Vec::new(),
        });
    }
    if regions_ok && samples_ok {
        return Ok(RequestPlan::Proceed {
            regions,
            samples,
            warnings: Vec::new(),
        });
    }
    if !regions_ok && !samples_ok && !genes_ok {
        return Ok(RequestPlan::Help {
            message: "Malformed search. Returning the possible samples and attributes \
                      you may query. Please specify samples and [regions or genes]."
                .to_string(),
        });
    }
    if !samples_ok {
        anyhow::bail!("Please specify samples and [regions or genes].");
    }
    if !regions_ok && !genes_ok {
        return Ok(RequestPlan::Proceed {
            regions: PATHOGENIC_REGIONS.iter().map(|r| r.to_string()).collect(),
            samples,
            warnings: vec![
                "Region unspecified or invalid but samples specified, so a list of \
                 pathogenic variants from clinvar was substituted."
                    .to_string(),
            ],
        });
    }
    anyhow::bail!("Please specify samples and [regions or genes].");
}
