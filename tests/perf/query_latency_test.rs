use std::time::{Duration, Instant};

use crate::config::LookupConfig;
use crate::lookup::{Lookup, LookupEffect};
use crate::model::Record;
use crate::search::rank;

fn p95_ms(samples: &mut [f64]) -> f64 {
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let last = samples.len().saturating_sub(1);
    let idx = ((last as f64) * 0.95).round() as usize;
    samples[idx.min(last)]
}

#[test]
fn keystroke_burst_collapses_to_one_search() {
    let mut lookup = Lookup::new(LookupConfig::default());
    let t0 = Instant::now();

    let started = Instant::now();
    for i in 0..10_000u64 {
        let text = format!("acme {}", i % 97);
        lookup.update_query(&text, t0 + Duration::from_millis(i / 100));
    }
    let elapsed = started.elapsed();

    lookup.tick(t0 + Duration::from_secs(10));
    let searches = lookup
        .drain_effects()
        .into_iter()
        .filter(|effect| matches!(effect, LookupEffect::Search(_)))
        .count();

    assert_eq!(searches, 1);
    assert!(
        elapsed < Duration::from_secs(2),
        "10k keystrokes took {elapsed:?}"
    );
}

#[test]
fn ranking_p95_stays_interactive() {
    let records: Vec<Record> = (0..5_000)
        .map(|i| Record::new(&i.to_string(), &format!("Account_{i:05}")))
        .chain(std::iter::once(Record::new("q4", "Q4 Reseller")))
        .collect();

    let mut samples = Vec::with_capacity(40);
    for _ in 0..40 {
        let started = Instant::now();
        let ranked = rank(records.clone(), "q4 res", 5);
        samples.push(started.elapsed().as_secs_f64() * 1000.0);
        assert_eq!(ranked[0].id, "q4");
    }

    let p95 = p95_ms(&mut samples);
    assert!(p95 < 250.0, "ranking p95 was {p95:.2}ms");
}
