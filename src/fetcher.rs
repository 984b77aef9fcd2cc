use std::collections::VecDeque;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Mutex;
use tokio::task::yield_now;
use tokio::time::sleep;

use crate::client::{FetchError, VacancyApi};
use crate::config::Config;
use crate::data_models::{RawListing, SearchQuery};

/// Listings of one search page, enriched with their detail records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedPage {
    pub listings: Vec<RawListing>,
    pub total_found: u64,
}

type Queue = Mutex<VecDeque<(usize, RawListing)>>;

/// Runs the search request, then one detail request per result.
///
/// Detail requests are spread over `workers` concurrent loops that pull from a
/// shared queue. Each loop waits `delay` between two of its own requests, so the
/// aggregate request rate stays bounded by `workers / delay`.
pub struct Fetcher<C> {
    client: C,
    workers: usize,
    delay: Duration,
}

impl<C: VacancyApi> Fetcher<C> {
    pub fn new(client: C, workers: usize, delay: Duration) -> Self {
        Self {
            client,
            workers: workers.max(1),
            delay,
        }
    }

    pub fn from_config(client: C, config: &Config) -> Self {
        Self::new(client, config.detail_workers, config.detail_delay)
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Fails only when the search request fails. A failed detail request drops
    /// that listing; the rest keep upstream order.
    pub async fn fetch(&self, query: &SearchQuery) -> Result<FetchedPage, FetchError> {
        let page = self.client.search(query).await?;
        let limit = query.max_results().get() as usize;
        let items: VecDeque<(usize, RawListing)> =
            page.items.into_iter().take(limit).enumerate().collect();
        let requested = items.len();

        log::info!(
            "search found {} vacancies, fetching details for {}",
            page.found,
            requested
        );

        let queue: Queue = Mutex::new(items);
        let workers = self.workers.min(requested.max(1));
        let mut fetched: Vec<(usize, RawListing)> =
            join_all((0..workers).map(|worker| self.drain(worker, &queue)))
                .await
                .into_iter()
                .flatten()
                .collect();
        fetched.sort_by_key(|(pos, _)| *pos);

        let dropped = requested - fetched.len();
        if dropped > 0 {
            log::warn!("dropped {dropped} of {requested} vacancies after failed detail requests");
        }

        Ok(FetchedPage {
            listings: fetched.into_iter().map(|(_, listing)| listing).collect(),
            total_found: page.found,
        })
    }

    async fn drain(&self, worker: usize, queue: &Queue) -> Vec<(usize, RawListing)> {
        let mut out = Vec::new();
        let mut first = true;
        loop {
            if !first {
                // idle workers claim queued items before this one starts waiting
                yield_now().await;
                if queue.lock().await.is_empty() {
                    break;
                }
                if !self.delay.is_zero() {
                    sleep(self.delay).await;
                }
            }

            let next = queue.lock().await.pop_front();
            let Some((pos, item)) = next else {
                break;
            };
            first = false;

            match self.client.vacancy(&item.id).await {
                Ok(detail) => out.push((pos, item.merge_detail(detail))),
                Err(e) => {
                    log::warn!("worker {worker}: dropping vacancy {}: {:#}", item.id, e);
                }
            }
        }
        out
    }
}
