mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FakeApi, query, vacancy, vacancy_with_salary};
use serde_json::json;
use vacancy_stats::analyzer::SkillExtractor;
use vacancy_stats::cache::CacheStore;
use vacancy_stats::fetcher::Fetcher;
use vacancy_stats::pipeline::{Pipeline, SearchError};
use vacancy_stats::stats::UNSPECIFIED_EXPERIENCE;

fn pipeline(api: &Arc<FakeApi>, cache_root: &std::path::Path) -> Pipeline<Arc<FakeApi>> {
    Pipeline::new(
        Fetcher::new(api.clone(), 1, Duration::ZERO),
        CacheStore::new(cache_root),
    )
}

fn salaried_vacancies() -> FakeApi {
    FakeApi::with_vacancies(
        57,
        vec![
            vacancy_with_salary("1", "Rust developer", Some(100000), Some(200000), "RUR", false),
            vacancy_with_salary("2", "Go developer", Some(300000), None, "RUR", false),
            vacancy_with_salary("3", "Python developer", None, Some(150000), "RUR", false),
            vacancy_with_salary("4", "Java developer", Some(900000), None, "RUR", false),
            vacancy_with_salary("5", "Kotlin developer", Some(50000), Some(60000), "RUR", false),
        ],
    )
}

#[tokio::test]
async fn test_partial_failure_statistics_cover_survivors_only() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(salaried_vacancies().failing(&["4", "5"]));

    let bundle = pipeline(&api, dir.path())
        .search(&query("developer", 5))
        .await
        .unwrap();

    let ids: Vec<&str> = bundle.listings.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);

    // pool: 100000, 200000, 300000, 150000
    let stats = bundle.statistics.salary_stats;
    assert_eq!(stats.min, 100000);
    assert_eq!(stats.max, 300000);
    assert_eq!(stats.mean, 187500.0);
    assert_eq!(stats.median, 200000);
    assert_eq!(bundle.statistics.total_found, 57);
    assert_eq!(bundle.statistics.experience_distribution.get("1–3 года"), Some(&3));
}

#[tokio::test]
async fn test_second_search_is_served_from_cache() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(salaried_vacancies());
    let pipeline = pipeline(&api, dir.path());
    let q = query("developer", 5);

    let first = pipeline.search(&q).await.unwrap();
    let second = pipeline.search(&q).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(api.search_calls(), 1);
    assert_eq!(api.detail_calls(), 5);
    assert_eq!(pipeline.cache().get(&q).await, Some(first));
}

#[tokio::test]
async fn test_refresh_bypasses_cache() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(salaried_vacancies());
    let pipeline = pipeline(&api, dir.path());
    let q = query("developer", 5);

    pipeline.search(&q).await.unwrap();
    pipeline.refresh(&q).await.unwrap();

    assert_eq!(api.search_calls(), 2);
}

#[tokio::test]
async fn test_upstream_failure_is_reported_and_not_cached() {
    let dir = tempfile::tempdir().unwrap();
    let mut api = salaried_vacancies();
    api.fail_search = true;
    let api = Arc::new(api);
    let pipeline = pipeline(&api, dir.path());
    let q = query("developer", 5);

    let err = pipeline.search(&q).await.unwrap_err();

    assert!(matches!(err, SearchError::Upstream(_)));
    assert!(err.to_string().contains("503"));
    assert_eq!(pipeline.cache().get(&q).await, None);
    assert!(!pipeline.cache().entry_path(&q).exists());
}

#[tokio::test]
async fn test_corrupt_cache_entry_falls_through_to_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(salaried_vacancies());
    let pipeline = pipeline(&api, dir.path());
    let q = query("developer", 5);
    std::fs::write(pipeline.cache().entry_path(&q), "{\"key\": 12").unwrap();

    let bundle = pipeline.search(&q).await.unwrap();

    assert_eq!(bundle.listings.len(), 5);
    assert_eq!(api.search_calls(), 1);
    assert_eq!(pipeline.cache().get(&q).await, Some(bundle));
}

#[tokio::test]
async fn test_cache_write_failure_still_returns_results() {
    let dir = tempfile::tempdir().unwrap();
    let not_a_dir = dir.path().join("occupied");
    std::fs::write(&not_a_dir, "file in the way").unwrap();
    let api = Arc::new(salaried_vacancies());

    let bundle = pipeline(&api, &not_a_dir)
        .search(&query("developer", 5))
        .await
        .unwrap();

    assert_eq!(bundle.listings.len(), 5);
}

#[tokio::test]
async fn test_listings_are_normalized() {
    let dir = tempfile::tempdir().unwrap();
    let mut gross_usd = vacancy_with_salary("10", "Backend (Python, Go)", Some(1000), None, "USD", true);
    gross_usd["experience"] = json!(null);
    let no_salary = vacancy("11", "Data engineer: Spark, Airflow", &["  SQL ", "", "Scala"]);
    let api = Arc::new(FakeApi::with_vacancies(2, vec![gross_usd, no_salary]));

    let bundle = pipeline(&api, dir.path())
        .search(&query("backend", 2))
        .await
        .unwrap();

    let first = &bundle.listings[0];
    assert_eq!(first.name, "Backend (Python, Go)");
    assert_eq!(first.salary_from, Some((0.87 * 1000.0 / 0.01264) as u64));
    assert_eq!(first.salary_to, None);
    assert_eq!(first.skills, vec!["Python", "Go"]);
    assert_eq!(first.experience, None);
    assert_eq!(first.employer_name.as_deref(), Some("Employer 10"));
    assert_eq!(first.employer_url.as_deref(), Some("https://hh.ru/employer/10"));

    let second = &bundle.listings[1];
    assert_eq!(second.salary_from, None);
    assert_eq!(second.salary_to, None);
    assert_eq!(second.skills, vec!["Scala", "Spark", "SQL"]);

    let stats = &bundle.statistics;
    assert_eq!(stats.experience_distribution.get(UNSPECIFIED_EXPERIENCE), Some(&1));
    assert_eq!(stats.skill_coverage, 2);
    assert_eq!(stats.top_skills.len(), 5);
}

#[tokio::test]
async fn test_structured_only_extractor_skips_title_mining() {
    let dir = tempfile::tempdir().unwrap();
    let api = Arc::new(FakeApi::with_vacancies(
        1,
        vec![vacancy("1", "Backend (Python, Go)", &["Rust"])],
    ));

    let bundle = pipeline(&api, dir.path())
        .with_extractor(SkillExtractor::structured_only())
        .search(&query("backend", 1))
        .await
        .unwrap();

    assert_eq!(bundle.listings[0].skills, vec!["Rust"]);
}
