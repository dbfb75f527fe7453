//! Benchmarks for corpus construction and search.
//!
//! Run with: `cargo bench -p course-similarity --bench pairwise_bench`

use course_similarity::{
    BuildControl, Corpus, CorpusStore, CourseId, PairwiseSimilarityIndex, RawCourseRow, SearchQuery,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

const DIM: usize = 384;

/// Deterministic L2-normalized embedding
fn seeded_embedding(seed: u64) -> Vec<f32> {
    let raw: Vec<f32> = (0..DIM)
        .map(|i| {
            let mut hasher = DefaultHasher::new();
            seed.hash(&mut hasher);
            i.hash(&mut hasher);
            ((hasher.finish() as f32 / u64::MAX as f32) * 2.0) - 1.0
        })
        .collect();
    let norm: f32 = raw.iter().map(|x| x * x).sum::<f32>().sqrt();
    raw.into_iter().map(|x| x / norm).collect()
}

fn rows(n: usize) -> Vec<RawCourseRow> {
    let departments = ["Computer Science", "Art", "History", "Biology", "Music"];
    let topics = [
        "introduction to algorithms and data structures",
        "studio drawing and figure painting",
        "modern european political history",
        "cell biology and genetics laboratory",
        "music theory and composition",
    ];
    (0..n)
        .map(|i| {
            RawCourseRow::builder(CourseId::from_row(i))
                .code(format!("C{:04}", i))
                .name(format!("Course {}", i))
                .description(topics[i % topics.len()])
                .department(departments[i % departments.len()])
                .embedding(seeded_embedding(i as u64))
                .build()
        })
        .collect()
}

fn bench_pairwise_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("pairwise_build");
    group.sample_size(10);

    for n in [100, 500, 1000] {
        let (store, _) = CorpusStore::load(rows(n));
        group.throughput(Throughput::Elements((n * (n - 1) / 2) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &store, |b, store| {
            b.iter(|| PairwiseSimilarityIndex::build(black_box(store)))
        });
    }

    group.finish();
}

fn bench_lexical_search(c: &mut Criterion) {
    let corpus = match Corpus::build(rows(1000), &BuildControl::new()) {
        Ok(corpus) => corpus,
        Err(e) => panic!("failed to build bench corpus: {}", e),
    };
    let query = SearchQuery::new("music composition and theory").with_top_k(10);

    c.bench_function("lexical_search_1000", |b| {
        b.iter(|| corpus.search(black_box(&query), None))
    });
}

criterion_group!(benches, bench_pairwise_build, bench_lexical_search);
criterion_main!(benches);
