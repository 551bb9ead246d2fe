//! Declare-before-use reordering of procedure declarations.
//!
//! VHDL forbids calling a procedure that is declared later in the same
//! declarative region. This pass topologically sorts procedure
//! declarations along the call chains recorded during member
//! transformation, keeping the sort stable so unrelated procedures and all
//! non-procedure declarations retain their original relative positions.

use crate::decl::Declaration;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use silica_common::{InternalError, SilicaResult};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

/// The call relationships between generated procedures.
///
/// Maps each procedure name to the set of procedure names it invokes.
/// Registering a call also registers the callee, so every procedure that
/// takes part in any call chain has an entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallChainTable {
    calls: BTreeMap<String, BTreeSet<String>>,
}

impl CallChainTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `caller` invokes `callee`.
    pub fn add_call(&mut self, caller: impl Into<String>, callee: impl Into<String>) {
        let callee = callee.into();
        self.calls.entry(callee.clone()).or_default();
        self.calls.entry(caller.into()).or_default().insert(callee);
    }

    /// Whether the named procedure takes part in any call chain.
    pub fn contains(&self, name: &str) -> bool {
        self.calls.contains_key(name)
    }

    /// The procedures the named procedure invokes.
    pub fn callees(&self, name: &str) -> impl Iterator<Item = &str> {
        self.calls
            .get(name)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }
}

/// Reorders a declaration list so every procedure is declared before any
/// procedure that calls it.
///
/// Only procedure declarations with call-chain entries participate in the
/// sort; every other declaration keeps its position. Ties (procedures with
/// no dependency relation) preserve the original order, so the output is
/// reproducible. Mutually recursive procedures cannot be ordered and fail
/// with an [`InternalError`] naming the participants.
pub fn reorder_procedures(
    declarations: Vec<Declaration>,
    table: &CallChainTable,
) -> SilicaResult<Vec<Declaration>> {
    // The participating subsequence: procedure declarations known to the
    // call-chain table, in original order.
    let participating: Vec<usize> = declarations
        .iter()
        .enumerate()
        .filter(|(_, decl)| decl.is_procedure() && table.contains(decl.name()))
        .map(|(index, _)| index)
        .collect();

    let slot_of_name: BTreeMap<&str, usize> = participating
        .iter()
        .enumerate()
        .map(|(slot, &index)| (declarations[index].name(), slot))
        .collect();

    // Dependency graph over participating slots: an edge callee -> caller
    // means the callee must be emitted first.
    let mut graph: DiGraphMap<usize, ()> = DiGraphMap::new();
    for &slot in slot_of_name.values() {
        graph.add_node(slot);
    }
    for (&name, &caller_slot) in &slot_of_name {
        for callee in table.callees(name) {
            if let Some(&callee_slot) = slot_of_name.get(callee) {
                if callee_slot != caller_slot {
                    graph.add_edge(callee_slot, caller_slot, ());
                }
            }
        }
    }

    // Kahn's algorithm, always draining the smallest ready slot so ties
    // keep their original relative order.
    let mut indegree: BTreeMap<usize, usize> = slot_of_name
        .values()
        .map(|&slot| {
            (
                slot,
                graph.neighbors_directed(slot, Direction::Incoming).count(),
            )
        })
        .collect();
    let mut ready: BinaryHeap<Reverse<usize>> = indegree
        .iter()
        .filter(|(_, &count)| count == 0)
        .map(|(&slot, _)| Reverse(slot))
        .collect();
    let mut emit_order = Vec::with_capacity(participating.len());
    while let Some(Reverse(slot)) = ready.pop() {
        emit_order.push(slot);
        for successor in graph.neighbors_directed(slot, Direction::Outgoing) {
            let count = indegree.get_mut(&successor).unwrap();
            *count -= 1;
            if *count == 0 {
                ready.push(Reverse(successor));
            }
        }
    }

    if emit_order.len() < participating.len() {
        let emitted: BTreeSet<usize> = emit_order.iter().copied().collect();
        let cycle: Vec<&str> = participating
            .iter()
            .enumerate()
            .filter(|(slot, _)| !emitted.contains(slot))
            .map(|(_, &index)| declarations[index].name())
            .collect();
        return Err(InternalError::new(format!(
            "procedure call chain contains a cycle through: {}",
            cycle.join(", ")
        )));
    }

    // Write the sorted procedures back into the participating positions;
    // everything else stays where it was.
    let mut slots: Vec<Option<Declaration>> = declarations.into_iter().map(Some).collect();
    let mut sorted: Vec<Declaration> = emit_order
        .into_iter()
        .map(|slot| slots[participating[slot]].take().unwrap())
        .collect();
    sorted.reverse();
    let mut result = Vec::with_capacity(slots.len());
    for (index, slot) in slots.into_iter().enumerate() {
        match slot {
            Some(decl) => result.push(decl),
            None => {
                debug_assert!(participating.contains(&index));
                result.push(sorted.pop().unwrap());
            }
        }
    }
    Ok(result)
}
