#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::{Value, json};
use vacancy_stats::client::{FetchError, VacancyApi};
use vacancy_stats::data_models::{RawListing, SearchPage, SearchQuery};

/// In-memory stand-in for the upstream API.
#[derive(Default)]
pub struct FakeApi {
    pub page: SearchPage,
    pub details: HashMap<String, RawListing>,
    pub failing_ids: HashSet<String>,
    pub detail_latency: HashMap<String, Duration>,
    pub fail_search: bool,
    pub search_calls: AtomicUsize,
    pub detail_calls: AtomicUsize,
}

impl FakeApi {
    /// Search items carry id, name and salary; details add skills and experience.
    pub fn with_vacancies(found: u64, details: Vec<Value>) -> Self {
        let mut api = FakeApi::default();
        api.page.found = found;
        for detail in details {
            let detail: RawListing = serde_json::from_value(detail).expect("valid vacancy json");
            let item = RawListing {
                id: detail.id.clone(),
                name: detail.name.clone(),
                salary: detail.salary.clone(),
                ..Default::default()
            };
            api.page.items.push(item);
            api.details.insert(detail.id.clone(), detail);
        }
        api
    }

    pub fn failing(mut self, ids: &[&str]) -> Self {
        self.failing_ids = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_latency(mut self, id: &str, latency: Duration) -> Self {
        self.detail_latency.insert(id.to_string(), latency);
        self
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }
}

impl VacancyApi for FakeApi {
    async fn search(&self, _query: &SearchQuery) -> Result<SearchPage, FetchError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_search {
            return Err(FetchError::Status {
                url: "fake://vacancies".to_string(),
                status: 503,
            });
        }
        Ok(self.page.clone())
    }

    async fn vacancy(&self, id: &str) -> Result<RawListing, FetchError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.detail_latency.get(id) {
            tokio::time::sleep(*latency).await;
        }
        if self.failing_ids.contains(id) {
            return Err(FetchError::Status {
                url: format!("fake://vacancies/{id}"),
                status: 404,
            });
        }
        self.details.get(id).cloned().ok_or_else(|| FetchError::Status {
            url: format!("fake://vacancies/{id}"),
            status: 404,
        })
    }
}

pub fn query(text: &str, max_results: u32) -> SearchQuery {
    SearchQuery::new(text, "113", NonZeroU32::new(max_results).expect("non-zero"))
}

pub fn vacancy(id: &str, name: &str, skills: &[&str]) -> Value {
    json!({
        "id": id,
        "name": name,
        "employer": { "name": format!("Employer {id}"), "alternate_url": format!("https://hh.ru/employer/{id}") },
        "experience": { "id": "between1And3", "name": "1–3 года" },
        "key_skills": skills.iter().map(|s| json!({ "name": s })).collect::<Vec<_>>(),
        "description": "<p>Работа в команде</p>"
    })
}

pub fn vacancy_with_salary(id: &str, name: &str, from: Option<u64>, to: Option<u64>, currency: &str, gross: bool) -> Value {
    let mut v = vacancy(id, name, &[]);
    v["salary"] = json!({ "from": from, "to": to, "currency": currency, "gross": gross });
    v
}
