use thiserror::Error;
use tracing::Instrument;

use crate::analyzer::SkillExtractor;
use crate::cache::CacheStore;
use crate::client::{FetchError, VacancyApi};
use crate::data_models::{NormalizedListing, RawListing, ResultBundle, SearchQuery};
use crate::fetcher::Fetcher;
use crate::salary::SalaryNormalizer;
use crate::stats;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("upstream search failed: {0}")]
    Upstream(#[from] FetchError),
}

/// Cache lookup, then fetch, normalize, aggregate and store on a miss.
pub struct Pipeline<C> {
    fetcher: Fetcher<C>,
    cache: CacheStore,
    normalizer: SalaryNormalizer,
    extractor: SkillExtractor,
}

impl<C: VacancyApi> Pipeline<C> {
    pub fn new(fetcher: Fetcher<C>, cache: CacheStore) -> Self {
        Self {
            fetcher,
            cache,
            normalizer: SalaryNormalizer::default(),
            extractor: SkillExtractor::default(),
        }
    }

    pub fn with_normalizer(mut self, normalizer: SalaryNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn with_extractor(mut self, extractor: SkillExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn fetcher(&self) -> &Fetcher<C> {
        &self.fetcher
    }

    /// Serves from cache when possible. Only a failed search request is an error;
    /// it is never cached.
    pub async fn search(&self, query: &SearchQuery) -> Result<ResultBundle, SearchError> {
        let span = tracing::info_span!("search", key = %query.cache_key());
        async {
            if let Some(bundle) = self.cache.get(query).await {
                return Ok(bundle);
            }
            self.run(query).await
        }
        .instrument(span)
        .await
    }

    /// Skips the cache lookup and replaces whatever entry exists.
    pub async fn refresh(&self, query: &SearchQuery) -> Result<ResultBundle, SearchError> {
        let span = tracing::info_span!("refresh", key = %query.cache_key());
        self.run(query).instrument(span).await
    }

    async fn run(&self, query: &SearchQuery) -> Result<ResultBundle, SearchError> {
        let page = self.fetcher.fetch(query).await?;

        let listings: Vec<NormalizedListing> = page
            .listings
            .into_iter()
            .map(|raw| self.normalize_listing(raw))
            .collect();
        let statistics = stats::aggregate(&listings, page.total_found);
        let bundle = ResultBundle {
            listings,
            statistics,
        };

        // caching is best effort, the caller still gets the bundle
        if let Err(e) = self.cache.put(query, &bundle).await {
            log::error!("failed to cache results for {}: {:#}", query.cache_key(), e);
        }

        log::info!(
            "returning {} vacancies ({} found upstream)",
            bundle.listings.len(),
            bundle.statistics.total_found
        );
        Ok(bundle)
    }

    pub fn normalize_listing(&self, raw: RawListing) -> NormalizedListing {
        let salary = self.normalizer.normalize(raw.salary.as_ref());
        let skills = self
            .extractor
            .extract(&raw.skill_names(), raw.title(), raw.description_html());
        let experience = raw.experience_label().map(str::to_string);
        let (employer_name, employer_url) = match raw.employer {
            Some(employer) => (employer.name, employer.alternate_url),
            None => (None, None),
        };

        NormalizedListing {
            id: raw.id,
            name: raw.name.unwrap_or_default(),
            employer_name,
            employer_url,
            salary_from: salary.from,
            salary_to: salary.to,
            experience,
            skills,
        }
    }
}
