pub mod analyzer;
pub mod cache;
pub mod client;
pub mod config;
pub mod currency;
pub mod data_models;
pub mod fetcher;
pub mod pipeline;
pub mod salary;
pub mod stats;

pub use cache::CacheStore;
pub use client::{FetchError, HhClient, VacancyApi};
pub use config::Config;
pub use data_models::{ExperienceFilter, ResultBundle, SearchQuery};
pub use fetcher::Fetcher;
pub use pipeline::{Pipeline, SearchError};
