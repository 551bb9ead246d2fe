//! Invocation-site collection and wiring strategy selection.

use silica_arch::signals::indexed_component_name;
use silica_arch::ArchitectureComponent;
use silica_config::SynthesisConfig;
use std::collections::BTreeMap;

/// One calling component's use of an invoked member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSite {
    /// The calling component's name.
    pub caller: String,
    /// The maximum number of concurrent invocation instances at this site.
    pub instance_count: u32,
}

/// Everything known about one invoked member across the component set.
#[derive(Debug, Clone)]
pub struct InvokedMember {
    /// The invoked member's name.
    pub member: String,
    /// All call sites, in component order.
    pub sites: Vec<InvocationSite>,
    /// The configured number of physical target instances.
    pub target_count: u32,
}

impl InvokedMember {
    /// All (caller, invocation-instance-index) pairs competing for the
    /// member's target instances, flattened in site order.
    pub fn invocation_pairs(&self) -> Vec<(&str, u32)> {
        self.sites
            .iter()
            .flat_map(|site| (0..site.instance_count).map(|index| (site.caller.as_str(), index)))
            .collect()
    }

    /// The total number of concurrent invocation instances.
    pub fn total_invocation_instances(&self) -> u32 {
        self.sites.iter().map(|site| site.instance_count).sum()
    }
}

/// Gathers every invoked member and its call sites from the complete
/// component set, with target instance counts from configuration.
///
/// Members are returned in name order; sites keep the order of the input
/// components, so the result is deterministic for one input.
pub fn collect_invoked_members(
    components: &[ArchitectureComponent],
    config: &SynthesisConfig,
) -> Vec<InvokedMember> {
    let mut members: BTreeMap<&str, InvokedMember> = BTreeMap::new();
    for component in components {
        for (member, &instance_count) in &component.invoked_members {
            members
                .entry(member.as_str())
                .or_insert_with(|| InvokedMember {
                    member: member.clone(),
                    sites: Vec::new(),
                    target_count: config.target_instance_count(member),
                })
                .sites
                .push(InvocationSite {
                    caller: component.name.clone(),
                    instance_count,
                });
        }
    }
    members.into_values().collect()
}

/// How an invoked member's call sites are wired to its target instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WiringStrategy {
    /// Static pairing: call site *i* connects to target instance *i* with
    /// no runtime selection logic.
    Direct,
    /// The general case: a generated three-state arbitration process.
    Arbitrated,
}

/// Chooses the wiring strategy for one invoked member.
///
/// Direct wiring applies when a static pairing exists: a single calling
/// component whose invocation instances fit the target pool (instance *i*
/// pairs with target *i*), or several callers that each invoke at most
/// once and fit the pool (caller *j* pairs with target *j*). A pairing
/// that would connect a caller to its own component also disqualifies
/// direct wiring, so the arbitration's self-invocation guard applies.
/// Every other topology falls back to arbitration; selection never fails.
pub fn select_strategy(member: &InvokedMember) -> WiringStrategy {
    if static_pairing(member).is_some() {
        WiringStrategy::Direct
    } else {
        WiringStrategy::Arbitrated
    }
}

/// The static (caller, invocation index, target index) pairing for a
/// directly wired member, or `None` when arbitration is required.
pub(crate) fn static_pairing(member: &InvokedMember) -> Option<Vec<(&str, u32, u32)>> {
    let pairing: Vec<(&str, u32, u32)> = if member.sites.len() == 1 {
        let site = &member.sites[0];
        if site.instance_count > member.target_count {
            return None;
        }
        (0..site.instance_count)
            .map(|index| (site.caller.as_str(), index, index))
            .collect()
    } else {
        if member.sites.len() as u32 > member.target_count
            || member.sites.iter().any(|site| site.instance_count != 1)
        {
            return None;
        }
        member
            .sites
            .iter()
            .enumerate()
            .map(|(target, site)| (site.caller.as_str(), 0, target as u32))
            .collect()
    };
    // A caller statically paired with itself would start its own
    // component; recursion needs the arbitrated scan's guard.
    let self_paired = pairing
        .iter()
        .any(|(caller, _, target)| *caller == indexed_component_name(&member.member, *target));
    if self_paired {
        None
    } else {
        Some(pairing)
    }
}
