//! Structured transition records from [`SpecGoalSearch`](crate::SpecGoalSearch).
//!
//! | tag | `a` | `b` |
//! |---|---|---|
//! | `spec.sample` | models sampled | models banned so far |
//! | `spec.search` | candidates reached | search rounds run |
//! | `spec.ban` | models banned so far | |
//! | `spec.verify.fail` | atoms in the failed candidate | models banned so far |
//! | `spec.superset` | supersets sampled | parent candidates |
//! | `spec.resample` | models banned so far | |
//! | `spec.solved` | actions in the path | |
//! | `spec.exhausted` | models banned so far | |

use std::borrow::Cow;

/// One orchestrator transition; `round` counts search rounds started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEvent {
    pub round: u64,
    pub tag: Cow<'static, str>,
    pub a: u64,
    pub b: u64,
}

impl TraceEvent {
    pub fn new(round: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            round,
            tag: tag.into(),
            a: 0,
            b: 0,
        }
    }

    pub fn with_a(mut self, a: u64) -> Self {
        self.a = a;
        self
    }

    pub fn with_b(mut self, b: u64) -> Self {
        self.b = b;
        self
    }
}

/// Receives every transition of one orchestrator run, in order.
pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

/// Discards events; used by [`find_spec_goal`](crate::find_spec_goal).
#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

/// Keeps every event so a run's transitions can be inspected afterwards.
#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl VecTraceSink {
    /// Tags in emission order, e.g. `["spec.sample", "spec.search", "spec.solved"]`.
    pub fn tags(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.tag.as_ref()).collect()
    }

    pub fn count(&self, tag: &str) -> usize {
        self.events.iter().filter(|e| e.tag == tag).count()
    }
}

impl TraceSink for VecTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_keeps_events_in_order() {
        let mut sink = VecTraceSink::default();
        sink.emit(TraceEvent::new(0, "spec.sample").with_a(2).with_b(0));
        sink.emit(TraceEvent::new(1, "spec.search").with_a(1).with_b(4));
        sink.emit(TraceEvent::new(1, "spec.ban").with_a(1));

        assert_eq!(sink.tags(), vec!["spec.sample", "spec.search", "spec.ban"]);
        assert_eq!(sink.count("spec.search"), 1);
        assert_eq!(sink.count("spec.solved"), 0);
        assert_eq!(sink.events[1], TraceEvent { round: 1, tag: "spec.search".into(), a: 1, b: 4 });
    }
}
