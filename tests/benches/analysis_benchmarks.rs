//! # Analysis Benchmarks
//!
//! Whole-run throughput over synthetic networks of production shape: nine
//! authorities and relay counts from a test network up to the public
//! network's order of magnitude. The flag classification pass gets its own
//! benchmark because it dominates the per-relay work.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};

use ch_analysis::domain::flag_overlap;
use ch_analysis::{
    AnalysisConfig, AnalysisService, ConsensusHealthApi, FixedTimeSource,
    InMemoryDownloadStatistics,
};
use ch_tests::fixtures::{KNOWN_FLAGS, MILLIS_PER_DAY, NOW};
use shared_types::{
    ConsensusDocument, DocumentBatch, FetchOutcome, Fingerprint, NetworkDocument, StatusEntry,
    VoteDocument,
};

fn fingerprint(i: usize) -> Fingerprint {
    Fingerprint::new(format!("{i:040X}")).unwrap()
}

fn flags_for(i: usize) -> Vec<&'static str> {
    let mut flags = vec!["Running", "Valid"];
    if i % 2 == 0 {
        flags.push("Fast");
    }
    if i % 3 == 0 {
        flags.push("Guard");
    }
    if i % 5 == 0 {
        flags.push("Exit");
    }
    if i % 7 == 0 {
        flags.push("Stable");
    }
    flags
}

fn synthetic_consensus(relay_count: usize) -> ConsensusDocument {
    let mut builder = ConsensusDocument::builder(NOW - 10 * 60 * 1_000, 28)
        .known_flags(KNOWN_FLAGS)
        .client_versions(["0.4.8.10"])
        .server_versions(["0.4.8.10"])
        .param("circwindow", 1000);
    for i in 0..relay_count {
        builder = builder.status_entry(
            StatusEntry::new(fingerprint(i), format!("relay{i}"))
                .with_flags(flags_for(i).iter().copied()),
        );
    }
    builder.build().unwrap()
}

fn synthetic_vote(nickname: &str, relay_count: usize, salt: usize) -> VoteDocument {
    let mut builder = VoteDocument::builder(nickname, NOW + 180 * MILLIS_PER_DAY)
        .known_flags(KNOWN_FLAGS)
        .consensus_methods([26, 27, 28])
        .client_versions(["0.4.8.10"])
        .server_versions(["0.4.8.10"])
        .param("circwindow", 1000);
    for i in 0..relay_count {
        // A sprinkling of dropped flags keeps the classifier honest.
        let flags: Vec<&str> = flags_for(i)
            .into_iter()
            .filter(|flag| *flag != "Guard" || (i + salt) % 11 != 0)
            .collect();
        let mut entry = StatusEntry::new(fingerprint(i), format!("relay{i}"))
            .with_flags(flags.iter().copied());
        if i % 2 == 0 {
            entry = entry.with_measured_bandwidth(10_000 + i as u64);
        }
        builder = builder.status_entry(entry);
    }
    builder.build().unwrap()
}

fn synthetic_votes(authority_count: usize, relay_count: usize) -> BTreeMap<String, VoteDocument> {
    (0..authority_count)
        .map(|a| {
            let nickname = format!("auth{a}");
            let vote = synthetic_vote(&nickname, relay_count, a);
            (nickname, vote)
        })
        .collect()
}

fn synthetic_batch(relay_count: usize, authority_count: usize) -> DocumentBatch {
    let mut batch = DocumentBatch::new();
    batch.push_document(NetworkDocument::Consensus(synthetic_consensus(relay_count)));
    for (nickname, vote) in synthetic_votes(authority_count, relay_count) {
        batch.push_document(NetworkDocument::Vote(vote));
        batch.record_fetch(nickname, FetchOutcome::Delivered);
    }
    batch
}

fn bench_full_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("full-analysis");
    group.measurement_time(Duration::from_secs(10));

    let engine = AnalysisService::new(
        AnalysisConfig::default(),
        Arc::new(InMemoryDownloadStatistics::new()),
    )
    .with_time_source(Box::new(FixedTimeSource::new(NOW)));

    for relay_count in [100, 500, 1000] {
        let batch = synthetic_batch(relay_count, 9);
        group.throughput(Throughput::Elements(relay_count as u64));
        group.bench_with_input(
            BenchmarkId::new("analyze", relay_count),
            &batch,
            |b, batch| {
                b.iter_batched(
                    || batch.clone(),
                    |batch| black_box(engine.analyze(batch)),
                    BatchSize::SmallInput,
                )
            },
        );
    }

    group.finish();
}

fn bench_flag_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("flag-classification");

    for relay_count in [100, 500, 1000] {
        let consensus = synthetic_consensus(relay_count);
        let votes = synthetic_votes(9, relay_count);
        group.throughput(Throughput::Elements(relay_count as u64));
        group.bench_with_input(
            BenchmarkId::new("classify_network", relay_count),
            &(consensus, votes),
            |b, (consensus, votes)| {
                b.iter(|| flag_overlap::classify_network(black_box(consensus), black_box(votes)))
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_full_analysis, bench_flag_classification);
criterion_main!(benches);
