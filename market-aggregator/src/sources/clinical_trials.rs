use crate::config::ProviderConfig;
use crate::dates::normalize_date;
use crate::fetcher::Fetcher;
use crate::traits::SourceAdapter;
use crate::types::{Result, SearchResult, SourceKind};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

/// ClinicalTrials.gov v2 study search.
pub struct ClinicalTrialsSource {
    fetcher: Fetcher,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct StudiesResponse {
    #[serde(default)]
    studies: Vec<Study>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Study {
    #[serde(default)]
    protocol_section: ProtocolSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ProtocolSection {
    identification_module: IdentificationModule,
    description_module: Option<DescriptionModule>,
    status_module: Option<StatusModule>,
    design_module: Option<DesignModule>,
    sponsor_collaborators_module: Option<SponsorModule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct IdentificationModule {
    nct_id: String,
    brief_title: Option<String>,
    official_title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DescriptionModule {
    brief_summary: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusModule {
    overall_status: Option<String>,
    start_date_struct: Option<DateStruct>,
}

#[derive(Debug, Deserialize)]
struct DateStruct {
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DesignModule {
    #[serde(default)]
    phases: Vec<String>,
    enrollment_info: Option<EnrollmentInfo>,
}

#[derive(Debug, Deserialize)]
struct EnrollmentInfo {
    count: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SponsorModule {
    lead_sponsor: Option<Sponsor>,
}

#[derive(Debug, Deserialize)]
struct Sponsor {
    name: Option<String>,
}

/// "PHASE2", "EARLY_PHASE1" -> "Phase 2", "Early Phase 1"
fn format_phase(phase: &str) -> String {
    phase
        .split('_')
        .map(|word| {
            let lower = word.to_lowercase();
            let (letters, digits): (String, String) =
                lower.chars().partition(|c| !c.is_ascii_digit());
            let mut chars = letters.chars();
            let capitalized = match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            };
            if digits.is_empty() {
                capitalized
            } else {
                format!("{} {}", capitalized, digits)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_status(status: &str) -> String {
    let lower = status.replace('_', " ").to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

impl ClinicalTrialsSource {
    pub fn new(fetcher: Fetcher, providers: &ProviderConfig) -> Self {
        Self {
            fetcher,
            base_url: providers.clinical_trials_url.clone(),
        }
    }

    fn to_result(study: Study) -> SearchResult {
        let protocol = study.protocol_section;
        let nct_id = protocol.identification_module.nct_id;
        let title = protocol
            .identification_module
            .brief_title
            .or(protocol.identification_module.official_title)
            .unwrap_or_else(|| "Untitled study".to_string());

        let (status, start_date) = match protocol.status_module {
            Some(module) => (
                module.overall_status.as_deref().map(format_status),
                module.start_date_struct.and_then(|d| d.date),
            ),
            None => (None, None),
        };

        let (phase, enrollment) = match protocol.design_module {
            Some(module) => {
                let phases: Vec<String> = module.phases.iter().map(|p| format_phase(p)).collect();
                let phase = if phases.is_empty() { None } else { Some(phases.join(" / ")) };
                let enrollment = module
                    .enrollment_info
                    .and_then(|e| e.count)
                    .map(|c| c.to_string());
                (phase, enrollment)
            }
            None => (None, None),
        };

        let sponsor = protocol
            .sponsor_collaborators_module
            .and_then(|m| m.lead_sponsor)
            .and_then(|s| s.name);

        let url = format!("https://clinicaltrials.gov/study/{}", nct_id);

        SearchResult::new(SourceKind::Clinical, nct_id, title, url)
            .with_abstract(protocol.description_module.and_then(|d| d.brief_summary))
            .with_authors(sponsor)
            .with_date(Some(normalize_date(start_date.as_deref())))
            .with_trial_details(status, phase, enrollment)
    }
}

#[async_trait]
impl SourceAdapter for ClinicalTrialsSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Clinical
    }

    fn source_name(&self) -> String {
        "Clinical Trials".to_string()
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let request = self.fetcher.get(&self.base_url).query(&[
            ("query.term", query.to_string()),
            ("pageSize", max_results.clamp(1, 1000).to_string()),
            ("format", "json".to_string()),
        ]);

        let response: StudiesResponse = self.fetcher.fetch_json(request).await?;
        let results: Vec<SearchResult> = response
            .studies
            .into_iter()
            .filter(|s| !s.protocol_section.identification_module.nct_id.is_empty())
            .take(max_results)
            .map(Self::to_result)
            .collect();

        info!("Found {} clinical trials for '{}'", results.len(), query);
        Ok(results)
    }
}
