use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Identity of a traced point of interest: one method of one class.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TracepointId {
    pub class_name: String,
    pub method_name: String,
}

impl TracepointId {
    pub fn new(class_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
        }
    }
}

impl fmt::Display for TracepointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.class_name, self.method_name)
    }
}

/// Accumulated call statistics for one tracepoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallStats {
    pub call_count: u64,
    pub wall_time: Duration,
}

impl CallStats {
    pub fn new(call_count: u64, wall_time: Duration) -> Self {
        Self {
            call_count,
            wall_time,
        }
    }

    pub fn merge(&mut self, other: &CallStats) {
        self.call_count += other.call_count;
        self.wall_time += other.wall_time;
    }
}

/// Flattened per-tracepoint totals, as delivered to the UI sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracepointStats {
    pub tracepoint: TracepointId,
    pub stats: CallStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct CallTreeNode {
    stats: CallStats,
    children: BTreeMap<TracepointId, CallTreeNode>,
}

impl CallTreeNode {
    fn accumulate(&mut self, other: &CallTreeNode) {
        self.stats.merge(&other.stats);
        for (id, child) in &other.children {
            self.children.entry(id.clone()).or_default().accumulate(child);
        }
    }

    fn clear(&mut self) {
        self.stats = CallStats::default();
        for child in self.children.values_mut() {
            child.clear();
        }
    }

    fn flatten_into(&self, totals: &mut BTreeMap<TracepointId, CallStats>) {
        for (id, child) in &self.children {
            totals.entry(id.clone()).or_default().merge(&child.stats);
            child.flatten_into(totals);
        }
    }
}

/// The aggregate call tree for one tracing session.
///
/// Nodes key on tracepoint identity; edges represent caller→callee
/// accumulation. The same shape doubles as the delta batches produced by
/// instrumented execution since the last drain. Exclusively owned and
/// mutated by the session worker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallTree {
    root: CallTreeNode,
}

impl CallTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `stats` at the node reached by walking `path` from the root,
    /// creating intermediate nodes as needed. This is how delta producers
    /// (and test fixtures) build trees.
    pub fn record(&mut self, path: &[TracepointId], stats: CallStats) {
        let mut node = &mut self.root;
        for id in path {
            node = node.children.entry(id.clone()).or_default();
        }
        node.stats.merge(&stats);
    }

    /// Merge a delta batch into this tree.
    pub fn accumulate(&mut self, delta: &CallTree) {
        self.root.accumulate(&delta.root);
    }

    /// Zero every node's counts while keeping the tree shape.
    pub fn clear(&mut self) {
        self.root.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Per-tracepoint totals summed across every occurrence in the tree.
    /// The root is not a tracepoint and is excluded. Sorted by identity.
    pub fn flatten(&self) -> Vec<TracepointStats> {
        let mut totals = BTreeMap::new();
        self.root.flatten_into(&mut totals);
        totals
            .into_iter()
            .map(|(tracepoint, stats)| TracepointStats { tracepoint, stats })
            .collect()
    }
}
