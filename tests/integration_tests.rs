// Integration tests for Intern Match

use async_trait::async_trait;
use intern_match::core::{distance::haversine_distance, proximity_bonus, RecommendError, Recommender, TfidfVectorizer};
use intern_match::models::{
    CandidateProfile, Coordinates, EducationLevel, NearbyRecord, Posting, RankingLimits, Skills, WorkMode,
};
use intern_match::services::{CatalogError, CatalogFilter, CatalogStore, MemoryCatalog, NearbyQuery, StaticGeocoder};
use proptest::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const PARIS: Coordinates = Coordinates { latitude: 48.8566, longitude: 2.3522 };
const OSLO: Coordinates = Coordinates { latitude: 59.9139, longitude: 10.7522 };

fn vectorizer() -> Arc<TfidfVectorizer> {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/models/tfidf_vectorizer.v1.json");
    Arc::new(TfidfVectorizer::load(path).expect("vectorizer artifact should load"))
}

fn geocoder() -> Arc<StaticGeocoder> {
    Arc::new(
        StaticGeocoder::new()
            .with_place("Paris", PARIS)
            .with_place("Oslo", OSLO),
    )
}

fn posting(
    id: &str,
    title: &str,
    skills: &[&str],
    coords: Option<(f64, f64)>,
    mode: WorkMode,
) -> Posting {
    Posting {
        id: id.to_string(),
        title: title.to_string(),
        skills: Skills::List(skills.iter().map(|s| s.to_string()).collect()),
        sector: "technology".to_string(),
        min_education: EducationLevel::Bachelor,
        latitude: coords.map(|c| c.0),
        longitude: coords.map(|c| c.1),
        mode,
    }
}

fn profile(city: &str, radius: f64) -> CandidateProfile {
    CandidateProfile::new("python, data analysis", "technology", EducationLevel::Bachelor, city, radius)
}

/// Memory catalog that counts remote queries
struct CountingCatalog {
    inner: MemoryCatalog,
    find_calls: AtomicUsize,
}

impl CountingCatalog {
    fn new(postings: Vec<Posting>) -> Self {
        Self {
            inner: MemoryCatalog::new(postings),
            find_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CatalogStore for CountingCatalog {
    async fn aggregate_nearby(&self, query: &NearbyQuery) -> Result<Vec<NearbyRecord>, CatalogError> {
        self.inner.aggregate_nearby(query).await
    }

    async fn find(&self, filter: &CatalogFilter, limit: usize) -> Result<Vec<Posting>, CatalogError> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find(filter, limit).await
    }
}

fn recommender(catalog: Arc<dyn CatalogStore>) -> Recommender {
    Recommender::new(vectorizer(), catalog, geocoder(), RankingLimits::default())
}

#[tokio::test]
async fn test_scenario_nearby_ranked_by_overlap_and_distance() {
    let catalog = Arc::new(MemoryCatalog::new(vec![
        posting("c-low", "Marketing Intern", &["marketing", "design"], Some((49.20, 2.35)), WorkMode::InPerson),
        posting("a-best", "Data Analyst Intern", &["python", "data analysis"], Some((48.86, 2.34)), WorkMode::InPerson),
        posting("b-mid", "Developer Intern", &["python", "sql"], Some((48.95, 2.35)), WorkMode::InPerson),
    ]));

    let result = recommender(catalog).recommend(&profile("Paris", 150.0)).await.unwrap();

    assert_eq!(result.nearby_ids, vec!["a-best", "b-mid", "c-low"]);
    assert!(result.remote_ids.is_empty());
}

#[tokio::test]
async fn test_scenario_only_remote_matches() {
    let catalog = Arc::new(MemoryCatalog::new(vec![
        posting("r-low", "Sales Intern", &["sales", "excel"], None, WorkMode::Remote),
        posting("r-high", "Remote Data Intern", &["python", "data analysis"], None, WorkMode::Remote),
        posting("far", "Data Intern", &["python"], Some((45.76, 4.83)), WorkMode::InPerson),
    ]));

    let result = recommender(catalog).recommend(&profile("Paris", 150.0)).await.unwrap();

    assert!(result.nearby_ids.is_empty());
    assert_eq!(result.remote_ids, vec!["r-high", "r-low"]);
}

#[tokio::test]
async fn test_scenario_unresolvable_city() {
    let catalog = Arc::new(MemoryCatalog::new(vec![posting(
        "a",
        "Data Intern",
        &["python"],
        Some((48.86, 2.34)),
        WorkMode::InPerson,
    )]));

    let failure = recommender(catalog)
        .recommend(&profile("Nowhereville123", 150.0))
        .await
        .unwrap_err();

    assert!(matches!(failure.error, RecommendError::LocationNotFound { .. }));
    assert!(failure.partial.nearby_ids.is_empty());
    assert!(failure.partial.remote_ids.is_empty());
}

#[tokio::test]
async fn test_scenario_zero_radius() {
    let catalog = Arc::new(MemoryCatalog::new(vec![posting(
        "origin",
        "Data Intern",
        &["python"],
        Some((PARIS.latitude, PARIS.longitude)),
        WorkMode::InPerson,
    )]));

    let result = recommender(catalog).recommend(&profile("Paris", 0.0)).await.unwrap();

    assert_eq!(result.nearby_ids, vec!["origin"]);
    assert_eq!(proximity_bonus(0.0, 0.0), 1.0);
}

#[tokio::test]
async fn test_sector_and_education_filters() {
    let mut finance = posting("finance", "Data Intern", &["python"], Some((48.86, 2.34)), WorkMode::InPerson);
    finance.sector = "finance".to_string();
    let mut phd = posting("phd", "Data Intern", &["python"], Some((48.86, 2.34)), WorkMode::InPerson);
    phd.min_education = EducationLevel::Doctorate;
    let open = posting("open", "Data Intern", &["python"], Some((48.86, 2.34)), WorkMode::InPerson);

    let catalog = Arc::new(MemoryCatalog::new(vec![finance, phd, open]));
    let result = recommender(catalog).recommend(&profile("Paris", 150.0)).await.unwrap();

    assert_eq!(result.nearby_ids, vec!["open"]);
}

#[tokio::test]
async fn test_coarse_approximation_drops_east_west_neighbours() {
    // ~55 km east of Oslo on the sphere, but 111 km by the planar estimate
    let catalog = Arc::new(MemoryCatalog::new(vec![posting(
        "east",
        "Data Intern",
        &["python"],
        Some((OSLO.latitude, OSLO.longitude + 1.0)),
        WorkMode::InPerson,
    )]));

    let exact = haversine_distance(OSLO.latitude, OSLO.longitude, OSLO.latitude, OSLO.longitude + 1.0);
    assert!(exact < 60.0);

    let result = recommender(catalog).recommend(&profile("Oslo", 100.0)).await.unwrap();
    assert!(result.nearby_ids.is_empty());
}

#[tokio::test]
async fn test_remote_pass_only_when_nearby_scarce() {
    let nearby: Vec<Posting> = (0..5)
        .map(|i| {
            posting(
                &format!("n{}", i),
                "Data Intern",
                &["python"],
                Some((48.86 + i as f64 * 0.01, 2.35)),
                WorkMode::InPerson,
            )
        })
        .collect();
    let mut postings = nearby.clone();
    postings.push(posting("r", "Data Intern", &["python"], None, WorkMode::Remote));

    let full = Arc::new(CountingCatalog::new(postings.clone()));
    let result = recommender(full.clone()).recommend(&profile("Paris", 150.0)).await.unwrap();
    assert_eq!(result.nearby_ids.len(), 5);
    assert!(result.remote_ids.is_empty());
    assert_eq!(full.find_calls.load(Ordering::SeqCst), 0);

    postings.remove(0);
    let scarce = Arc::new(CountingCatalog::new(postings));
    let result = recommender(scarce.clone()).recommend(&profile("Paris", 150.0)).await.unwrap();
    assert_eq!(result.nearby_ids.len(), 4);
    assert_eq!(result.remote_ids, vec!["r"]);
    assert_eq!(scarce.find_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unlocated_postings_do_not_crowd_out_nearby() {
    let mut postings: Vec<Posting> = (0..500)
        .map(|i| posting(&format!("remote-{}", i), "Data Intern", &["python"], None, WorkMode::Remote))
        .collect();
    postings.push(posting("near", "Data Intern", &["python"], Some((48.86, 2.35)), WorkMode::InPerson));

    let result = recommender(Arc::new(MemoryCatalog::new(postings)))
        .recommend(&profile("Paris", 150.0))
        .await
        .unwrap();

    assert_eq!(result.nearby_ids, vec!["near"]);
    assert_eq!(result.remote_ids.len(), 5);
}

#[tokio::test]
async fn test_seed_catalog_end_to_end() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/data/postings.sample.json");
    let catalog = Arc::new(MemoryCatalog::from_seed_file(path).unwrap());
    assert_eq!(catalog.len(), 8);

    let result = recommender(catalog).recommend(&profile("Paris", 150.0)).await.unwrap();

    // Master-level ML posting and the Lyon posting are excluded
    assert_eq!(
        result.nearby_ids,
        vec!["6650a1f0c1a2b3c4d5e6f001", "6650a1f0c1a2b3c4d5e6f002"]
    );
    assert_eq!(result.remote_ids, vec!["6650a1f0c1a2b3c4d5e6f005"]);
}

fn offset_strategy() -> impl Strategy<Value = Vec<(f64, f64, u8)>> {
    prop::collection::vec((-2.0f64..2.0, -2.0f64..2.0, 0u8..3), 0..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: nearby results lie within the radius, both lists are capped,
    /// and the remote pass runs iff fewer than 5 nearby results
    #[test]
    fn prop_recommendation_invariants(offsets in offset_strategy(), radius in 1.0f64..300.0) {
        let postings: Vec<Posting> = offsets
            .iter()
            .enumerate()
            .map(|(i, (dlat, dlon, kind))| {
                let mode = if *kind == 0 { WorkMode::Remote } else { WorkMode::InPerson };
                let coords = if mode.is_remote() { None } else { Some((PARIS.latitude + dlat, PARIS.longitude + dlon)) };
                posting(&i.to_string(), "Data Intern", &["python", "sql"], coords, mode)
            })
            .collect();
        let by_id: std::collections::HashMap<String, Posting> =
            postings.iter().map(|p| (p.id.clone(), p.clone())).collect();

        let catalog = Arc::new(CountingCatalog::new(postings));
        let result = tokio_test::block_on(recommender(catalog.clone()).recommend(&profile("Paris", radius)))
            .unwrap();

        prop_assert!(result.nearby_ids.len() <= 5);
        prop_assert!(result.remote_ids.len() <= 5);

        for id in &result.nearby_ids {
            let p = &by_id[id];
            let d = haversine_distance(PARIS.latitude, PARIS.longitude, p.latitude.unwrap(), p.longitude.unwrap());
            prop_assert!(d <= radius, "posting {} at {} km outside {} km", id, d, radius);
        }
        for id in &result.remote_ids {
            prop_assert!(by_id[id].mode.is_remote());
        }

        let remote_ran = catalog.find_calls.load(Ordering::SeqCst) == 1;
        prop_assert_eq!(remote_ran, result.nearby_ids.len() < 5);
    }
}
