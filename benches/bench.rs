// Criterion benchmarks for Intern Match

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use intern_match::core::{
    distance::{haversine_distance, planar_distance},
    similarity::score_texts,
    Recommender, TfidfVectorizer,
};
use intern_match::models::{CandidateProfile, Coordinates, EducationLevel, Posting, RankingLimits, Skills, WorkMode};
use intern_match::services::{MemoryCatalog, StaticGeocoder};
use std::sync::Arc;

const SKILL_POOL: [&str; 8] = ["python", "sql", "data analysis", "java", "react", "marketing", "cloud", "statistics"];

fn load_vectorizer() -> TfidfVectorizer {
    TfidfVectorizer::load(concat!(env!("CARGO_MANIFEST_DIR"), "/models/tfidf_vectorizer.v1.json"))
        .expect("vectorizer artifact")
}

fn create_posting(id: usize, lat: f64, lon: f64) -> Posting {
    let remote = id % 4 == 0;
    Posting {
        id: format!("posting-{}", id),
        title: "Intern".to_string(),
        skills: Skills::List(vec![
            SKILL_POOL[id % SKILL_POOL.len()].to_string(),
            SKILL_POOL[(id / 3) % SKILL_POOL.len()].to_string(),
        ]),
        sector: "technology".to_string(),
        min_education: EducationLevel::Bachelor,
        latitude: if remote { None } else { Some(lat) },
        longitude: if remote { None } else { Some(lon) },
        mode: if remote { WorkMode::Remote } else { WorkMode::InPerson },
    }
}

fn bench_haversine_distance(c: &mut Criterion) {
    c.bench_function("haversine_distance", |b| {
        b.iter(|| {
            haversine_distance(
                black_box(48.8566),
                black_box(2.3522),
                black_box(48.8049),
                black_box(2.1204),
            )
        });
    });
}

fn bench_planar_distance(c: &mut Criterion) {
    c.bench_function("planar_distance", |b| {
        b.iter(|| {
            planar_distance(
                black_box(&Coordinates::new(48.8566, 2.3522)),
                black_box(&Coordinates::new(48.8049, 2.1204)),
            )
        });
    });
}

fn bench_similarity(c: &mut Criterion) {
    let vectorizer = load_vectorizer();
    let docs: Vec<String> = (0..100)
        .map(|i| format!("Intern {} {}", SKILL_POOL[i % 8], SKILL_POOL[(i + 3) % 8]))
        .collect();

    c.bench_function("score_texts_100_documents", |b| {
        b.iter(|| score_texts(&vectorizer, black_box("python, sql, data analysis"), black_box(&docs)))
    });
}

fn bench_recommend(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let vectorizer = Arc::new(load_vectorizer());
    let geocoder = Arc::new(StaticGeocoder::new().with_place("Paris", Coordinates::new(48.8566, 2.3522)));
    let profile = CandidateProfile::new("python, data analysis", "technology", EducationLevel::Bachelor, "Paris", 150.0);

    let mut group = c.benchmark_group("recommend");

    for posting_count in [10, 100, 500].iter() {
        let postings: Vec<Posting> = (0..*posting_count)
            .map(|i| {
                let lat_offset = (i as f64 * 0.003) % 1.5;
                let lon_offset = (i as f64 * 0.007) % 1.5;
                create_posting(i, 48.8566 + lat_offset, 2.3522 - lon_offset)
            })
            .collect();

        let recommender = Recommender::new(
            vectorizer.clone(),
            Arc::new(MemoryCatalog::new(postings)),
            geocoder.clone(),
            RankingLimits::default(),
        );

        group.bench_with_input(
            BenchmarkId::new("in_memory_catalog", posting_count),
            posting_count,
            |b, _| {
                b.iter(|| runtime.block_on(recommender.recommend(black_box(&profile))));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_haversine_distance,
    bench_planar_distance,
    bench_similarity,
    bench_recommend
);

criterion_main!(benches);
