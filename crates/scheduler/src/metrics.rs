use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU64, Ordering};

use calmfeed_core_types::Verdict;

#[derive(Default)]
struct Counters {
    cycles: AtomicU64,
    extracted: AtomicU64,
    skipped: AtomicU64,
    dispatched: AtomicU64,
    allowed: AtomicU64,
    blocked: AtomicU64,
    scorer_failures: AtomicU64,
    apply_failures: AtomicU64,
}

static COUNTERS: Lazy<Counters> = Lazy::new(Counters::default);

fn add(counter: &AtomicU64, value: usize) {
    counter.fetch_add(value as u64, Ordering::Relaxed);
}

pub fn record_cycle(extracted: usize, skipped: usize) {
    add(&COUNTERS.cycles, 1);
    add(&COUNTERS.extracted, extracted);
    add(&COUNTERS.skipped, skipped);
}

pub fn record_dispatched() {
    add(&COUNTERS.dispatched, 1);
}

pub fn record_verdict(verdict: &Verdict) {
    if verdict.is_allow() {
        add(&COUNTERS.allowed, 1);
    } else {
        add(&COUNTERS.blocked, 1);
    }
    if !verdict.is_measured() {
        add(&COUNTERS.scorer_failures, 1);
    }
}

pub fn record_apply_failure() {
    add(&COUNTERS.apply_failures, 1);
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, Default)]
pub struct SchedulerMetricsSnapshot {
    pub cycles: u64,
    pub extracted: u64,
    pub skipped: u64,
    pub dispatched: u64,
    pub allowed: u64,
    pub blocked: u64,
    pub scorer_failures: u64,
    pub apply_failures: u64,
}

pub fn snapshot() -> SchedulerMetricsSnapshot {
    SchedulerMetricsSnapshot {
        cycles: COUNTERS.cycles.load(Ordering::Relaxed),
        extracted: COUNTERS.extracted.load(Ordering::Relaxed),
        skipped: COUNTERS.skipped.load(Ordering::Relaxed),
        dispatched: COUNTERS.dispatched.load(Ordering::Relaxed),
        allowed: COUNTERS.allowed.load(Ordering::Relaxed),
        blocked: COUNTERS.blocked.load(Ordering::Relaxed),
        scorer_failures: COUNTERS.scorer_failures.load(Ordering::Relaxed),
        apply_failures: COUNTERS.apply_failures.load(Ordering::Relaxed),
    }
}
