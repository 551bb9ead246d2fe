//! The handshake signal naming contract.
//!
//! Callers, invocation proxies, and target components communicate only
//! through signals, so the signal names are the wire protocol. Component
//! side: each target instance of a member exposes `started`, `finished`,
//! per-parameter, and optional `return` signals under its indexed
//! component name. Call-site side: each (caller, member, invocation index)
//! triple exposes its own request/completion/parameter/return signals.

use serde::{Deserialize, Serialize};
use silica_vhdl::VhdlType;

/// The component name of one physical instance of a member's state machine.
pub fn indexed_component_name(member: &str, index: u32) -> String {
    format!("{member}.{index}")
}

/// The start signal of a target component instance, driven by its proxy.
pub fn started_signal_name(component: &str) -> String {
    format!("{component}.started")
}

/// The completion signal of a target component instance, driven by the
/// instance itself.
pub fn finished_signal_name(component: &str) -> String {
    format!("{component}.finished")
}

/// The return-value signal of a target component instance.
pub fn return_signal_name(component: &str) -> String {
    format!("{component}.return")
}

/// A parameter signal of a target component instance.
pub fn parameter_signal_name(component: &str, parameter: &str) -> String {
    format!("{component}.parameter.{parameter}")
}

/// The request signal a call site asserts to invoke a member, one per
/// invocation instance.
pub fn invocation_started_signal_name(caller: &str, member: &str, index: u32) -> String {
    format!("{caller}.{member}.{index}.invocation_started")
}

/// The completion signal the proxy asserts back toward a call site.
pub fn invocation_finished_signal_name(caller: &str, member: &str, index: u32) -> String {
    format!("{caller}.{member}.{index}.invocation_finished")
}

/// A call site's outgoing parameter signal for one invocation instance.
pub fn invocation_parameter_signal_name(
    caller: &str,
    member: &str,
    index: u32,
    parameter: &str,
) -> String {
    format!("{caller}.{member}.{index}.parameter.{parameter}")
}

/// The signal a call site receives the callee's return value on.
pub fn invocation_return_signal_name(caller: &str, member: &str, index: u32) -> String {
    format!("{caller}.{member}.{index}.invocation_return")
}

/// One parameter-passing signal declared by a component.
///
/// A component's *own* parameters (`is_own`) are the inputs of its state
/// machine; pass-through parameters carry an argument toward another
/// member the component invokes, tagged with the target member name and
/// the invocation instance index they belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSignal {
    /// The member this parameter belongs to (the component's own member
    /// for `is_own`, the invoked member otherwise).
    pub target_member_name: String,
    /// The source-level parameter name.
    pub parameter_name: String,
    /// The invocation instance index the signal belongs to.
    pub index: u32,
    /// Whether this is the component's own parameter rather than a
    /// pass-through toward an invoked member.
    pub is_own: bool,
    /// The hardware type of the carried value.
    pub ty: VhdlType,
}

impl ParameterSignal {
    /// The signal name within the owning component's namespace.
    pub fn signal_name(&self, owner: &str) -> String {
        if self.is_own {
            parameter_signal_name(owner, &self.parameter_name)
        } else {
            invocation_parameter_signal_name(
                owner,
                &self.target_member_name,
                self.index,
                &self.parameter_name,
            )
        }
    }
}
