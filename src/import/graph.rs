//! Phase 3: the per-batch dependency graph.
//!
//! Maps every record to the foreign identifiers it references. The graph
//! feeds conflict detection only; records may reference each other in
//! either file order, so nothing here implies ordering.

use std::collections::BTreeMap;

use crate::model::Reference;

use super::parse::ParsedRecord;

/// The reference edges of one import batch.
///
/// Edges are keyed by the record's input line, not its id: a batch can
/// carry the same id on several records (that is what duplicate conflicts
/// are for), and an id-keyed map would attribute one record's references
/// to all of them.
#[derive(Clone, Debug, Default)]
pub struct DependencyGraph {
    edges: BTreeMap<usize, Vec<Reference>>,
}

impl DependencyGraph {
    /// Builds the graph from the record kind table (see
    /// [`crate::model::Record::references`]).
    pub fn build(records: &[ParsedRecord]) -> Self {
        let mut edges = BTreeMap::new();
        for parsed in records {
            let refs = parsed.record.references();
            if !refs.is_empty() {
                edges.insert(parsed.line, refs);
            }
        }
        Self { edges }
    }

    /// The references of the record on one input line, empty if it has none.
    pub fn references(&self, line: usize) -> &[Reference] {
        self.edges.get(&line).map_or(&[], Vec::as_slice)
    }

    /// Number of records with at least one outgoing reference.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
