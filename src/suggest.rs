//! Feature suggestions driven by what the user keeps asking for.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum UsageKind {
    Percent,
    Convert,
    Sqrt,
    Power,
}

impl UsageKind {
    fn detect(lowered: &str) -> Vec<UsageKind> {
        let mut kinds = Vec::new();
        if lowered.contains("percent") || lowered.contains('%') {
            kinds.push(UsageKind::Percent);
        }
        if lowered.contains("convert") {
            kinds.push(UsageKind::Convert);
        }
        if lowered.contains("sqrt") || lowered.contains("square root") {
            kinds.push(UsageKind::Sqrt);
        }
        if lowered.contains("power") || lowered.contains('^') {
            kinds.push(UsageKind::Power);
        }
        kinds
    }
}

const MAX_SUGGESTIONS: usize = 3;
/// Queries after which saving favourites is suggested.
const FREQUENT_USE: u32 = 5;

/// Counts query categories across a session.
#[derive(Debug, Clone, Default)]
pub struct UsageTracker {
    counts: BTreeMap<UsageKind, u32>,
    total: u32,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, query: &str) {
        self.total += 1;
        for kind in UsageKind::detect(&query.to_lowercase()) {
            *self.counts.entry(kind).or_insert(0) += 1;
        }
    }

    pub fn count(&self, kind: UsageKind) -> u32 {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Up to three suggestions, most specific first.
    pub fn suggestions(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.count(UsageKind::Percent) > 0 {
            out.push("Add a percentage calculator widget");
        }
        if self.count(UsageKind::Convert) > 0 {
            out.push("Add a unit converter tool");
        }
        if self.count(UsageKind::Sqrt) > 0 || self.count(UsageKind::Power) > 0 {
            out.push("Add a graphing calculator");
        }
        if self.total > FREQUENT_USE {
            out.push("Save frequently used calculations");
        }
        out.truncate(MAX_SUGGESTIONS);
        out
    }
}
