use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use wc26_pickem::bracket::build_bracket;
use wc26_pickem::config::ScoringConfig;
use wc26_pickem::fake_tournament::{FakeTournamentOptions, generate_snapshot};
use wc26_pickem::model::{Round, TournamentSnapshot};
use wc26_pickem::report::{ReportCache, evaluate};
use wc26_pickem::snapshot::SnapshotFingerprint;
use wc26_pickem::standings::standings_by_group;
use wc26_pickem::store::parse_group_picks_json;

fn big_snapshot() -> TournamentSnapshot {
    generate_snapshot(&FakeTournamentOptions {
        seed: 7,
        knockout_through: Some(Round::F),
        participants: 500,
        drafts: 50,
        ..FakeTournamentOptions::default()
    })
}

fn bench_standings(c: &mut Criterion) {
    let snapshot = big_snapshot();
    c.bench_function("standings_by_group", |b| {
        b.iter(|| {
            let standings = standings_by_group(black_box(&snapshot));
            black_box(standings.len());
        })
    });
}

fn bench_bracket(c: &mut Criterion) {
    let snapshot = big_snapshot();
    c.bench_function("build_bracket", |b| {
        b.iter(|| {
            let bracket = build_bracket(black_box(&snapshot.knockout_matches));
            black_box(bracket.champion().is_some());
        })
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let snapshot = big_snapshot();
    let config = ScoringConfig::default();
    c.bench_function("evaluate_500_participants", |b| {
        b.iter(|| {
            let report = evaluate(black_box(&snapshot), &config);
            black_box(report.leaderboard.len());
        })
    });
}

fn bench_cached_report(c: &mut Criterion) {
    let snapshot = big_snapshot();
    let config = ScoringConfig::default();
    let mut cache = ReportCache::new();
    c.bench_function("report_cache_hit", |b| {
        b.iter(|| {
            let report = cache.get_or_evaluate(black_box(&snapshot), &config).unwrap();
            black_box(report.leaderboard.len());
        })
    });
}

fn bench_fingerprint(c: &mut Criterion) {
    let snapshot = big_snapshot();
    c.bench_function("snapshot_fingerprint", |b| {
        b.iter(|| {
            let fp = SnapshotFingerprint::of(black_box(&snapshot)).unwrap();
            black_box(fp.short().len());
        })
    });
}

fn bench_group_picks_parse(c: &mut Criterion) {
    c.bench_function("group_picks_parse", |b| {
        b.iter(|| {
            let picks = parse_group_picks_json(black_box(GROUP_PICKS_JSON)).unwrap();
            black_box(picks.len());
        })
    });
}

criterion_group!(
    perf,
    bench_standings,
    bench_bracket,
    bench_evaluate,
    bench_cached_report,
    bench_fingerprint,
    bench_group_picks_parse
);
criterion_main!(perf);

static GROUP_PICKS_JSON: &str = include_str!("../tests/fixtures/group_picks.json");
