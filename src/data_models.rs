use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Work-experience buckets understood by the upstream search endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExperienceFilter {
    #[serde(rename = "noExperience")]
    NoExperience,
    #[serde(rename = "between1And3")]
    Between1And3,
    #[serde(rename = "between3And6")]
    Between3And6,
    #[serde(rename = "moreThan6")]
    MoreThan6,
}

impl ExperienceFilter {
    /// Value sent as the `experience` query parameter.
    pub fn as_api_value(&self) -> &'static str {
        match self {
            ExperienceFilter::NoExperience => "noExperience",
            ExperienceFilter::Between1And3 => "between1And3",
            ExperienceFilter::Between3And6 => "between3And6",
            ExperienceFilter::MoreThan6 => "moreThan6",
        }
    }
}

impl fmt::Display for ExperienceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_value())
    }
}

impl FromStr for ExperienceFilter {
    type Err = String;

    /// Accepts both the upstream identifiers and the short aliases used on the command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "noExperience" | "entry" => Ok(ExperienceFilter::NoExperience),
            "between1And3" | "1-3" => Ok(ExperienceFilter::Between1And3),
            "between3And6" | "3-6" => Ok(ExperienceFilter::Between3And6),
            "moreThan6" | "6+" => Ok(ExperienceFilter::MoreThan6),
            other => Err(format!(
                "unknown experience filter {other:?}, expected one of entry, 1-3, 3-6, 6+, none"
            )),
        }
    }
}

impl ExperienceFilter {
    /// Like `from_str`, but `none` means no filter at all.
    pub fn parse_optional(s: &str) -> Result<Option<Self>, String> {
        match s.trim() {
            "none" => Ok(None),
            other => other.parse().map(Some),
        }
    }
}

/// Parameters of one search. Immutable once built; the cache key is derived from it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    region_id: String,
    max_results: NonZeroU32,
    experience: Option<ExperienceFilter>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>, region_id: impl Into<String>, max_results: NonZeroU32) -> Self {
        SearchQuery {
            text: text.into(),
            region_id: region_id.into(),
            max_results,
            experience: None,
        }
    }

    pub fn with_experience(mut self, experience: Option<ExperienceFilter>) -> Self {
        self.experience = experience;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn region_id(&self) -> &str {
        &self.region_id
    }

    pub fn max_results(&self) -> NonZeroU32 {
        self.max_results
    }

    pub fn experience(&self) -> Option<ExperienceFilter> {
        self.experience
    }

    /// `text_region_maxResults_experience`, with `all` standing in for "no filter".
    /// Not collision free: queries that render to the same string share an entry.
    pub fn cache_key(&self) -> String {
        let experience = self
            .experience
            .map(|e| e.as_api_value())
            .unwrap_or("all");
        format!(
            "{}_{}_{}_{}",
            self.text.trim(),
            self.region_id.trim(),
            self.max_results,
            experience
        )
    }
}

// =============================================================================
// Upstream wire models
// =============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RawSalary {
    pub from: Option<f64>,
    pub to: Option<f64>,
    pub currency: Option<String>,
    pub gross: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RawEmployer {
    pub name: Option<String>,
    pub alternate_url: Option<String>,
}

/// `{ "name": ... }` objects, used upstream for experience and key skills.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NamedEntry {
    pub name: Option<String>,
}

/// One vacancy as returned by either the search or the detail endpoint.
/// Search items carry no key skills or description; the detail call fills those in.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RawListing {
    pub id: String,
    pub name: Option<String>,
    pub employer: Option<RawEmployer>,
    pub salary: Option<RawSalary>,
    pub experience: Option<NamedEntry>,
    #[serde(default)]
    pub key_skills: Vec<NamedEntry>,
    pub description: Option<String>,
}

impl RawListing {
    /// Combines a search item with its detail record. Detail fields win when present.
    pub fn merge_detail(self, detail: RawListing) -> RawListing {
        RawListing {
            id: self.id,
            name: detail.name.or(self.name),
            employer: detail.employer.or(self.employer),
            salary: detail.salary.or(self.salary),
            experience: detail.experience.or(self.experience),
            key_skills: detail.key_skills,
            description: detail.description.or(self.description),
        }
    }

    pub fn title(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn description_html(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn skill_names(&self) -> Vec<String> {
        self.key_skills
            .iter()
            .filter_map(|skill| skill.name.clone())
            .collect()
    }

    pub fn experience_label(&self) -> Option<&str> {
        self.experience
            .as_ref()
            .and_then(|e| e.name.as_deref())
            .map(str::trim)
            .filter(|label| !label.is_empty())
    }
}

/// Body of `GET /vacancies`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    #[serde(default)]
    pub items: Vec<RawListing>,
    #[serde(default)]
    pub found: u64,
}

// =============================================================================
// Normalized output
// =============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NormalizedListing {
    pub id: String,
    pub name: String,
    pub employer_name: Option<String>,
    pub employer_url: Option<String>,
    /// Net, in base currency.
    pub salary_from: Option<u64>,
    /// Net, in base currency.
    pub salary_to: Option<u64>,
    pub experience: Option<String>,
    pub skills: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct SalaryStats {
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub median: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct StatisticsBundle {
    pub total_found: u64,
    pub salary_stats: SalaryStats,
    pub experience_distribution: IndexMap<String, u64>,
    pub top_skills: IndexMap<String, u64>,
    pub skill_coverage: u64,
}

/// What a search returns and what the cache stores.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ResultBundle {
    pub listings: Vec<NormalizedListing>,
    pub statistics: StatisticsBundle,
}
