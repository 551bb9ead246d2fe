//! Architecture components: synthesized state machines and logic blocks.

use crate::signals::ParameterSignal;
use serde::{Deserialize, Serialize};
use silica_vhdl::{Declaration, Process, Statement, VhdlType};
use std::collections::BTreeMap;

/// One synthesized hardware state machine or always-active logic block.
///
/// A component corresponds to one transformed source member (or to a piece
/// of generated plumbing such as an invocation proxy). It carries its
/// architecture-level declarations, its processes, any concurrent
/// assignments, its parameter signals, and the table of other members it
/// may invoke together with the maximum number of concurrent invocation
/// instances per member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureComponent {
    /// The component name (an indexed member name for state machines).
    pub name: String,
    /// Architecture-level declarations (signals, enum types, procedures).
    pub declarations: Vec<Declaration>,
    /// The component's processes.
    pub processes: Vec<Process>,
    /// Concurrent signal assignments outside any process (used by
    /// direct-wired proxies).
    pub concurrent: Vec<Statement>,
    /// The parameter signals this component declares.
    pub parameter_signals: Vec<ParameterSignal>,
    /// The type of the component's return value, if it produces one.
    pub return_type: Option<VhdlType>,
    /// Invoked member name → maximum concurrent invocation instances.
    ///
    /// Kept ordered so every pass over the component set iterates members
    /// deterministically.
    pub invoked_members: BTreeMap<String, u32>,
}

impl ArchitectureComponent {
    /// Creates an empty component with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declarations: Vec::new(),
            processes: Vec::new(),
            concurrent: Vec::new(),
            parameter_signals: Vec::new(),
            return_type: None,
            invoked_members: BTreeMap::new(),
        }
    }

    /// Records that this component invokes `member` with up to
    /// `instance_count` concurrent invocation instances.
    ///
    /// Repeated registrations keep the largest instance count seen.
    pub fn add_invoked_member(&mut self, member: impl Into<String>, instance_count: u32) {
        let entry = self.invoked_members.entry(member.into()).or_insert(0);
        *entry = (*entry).max(instance_count);
    }

    /// The component's own parameters (not the pass-through ones).
    pub fn own_parameters(&self) -> impl Iterator<Item = &ParameterSignal> {
        self.parameter_signals.iter().filter(|signal| signal.is_own)
    }
}
