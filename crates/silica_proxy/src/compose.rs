//! Assembly of the final hardware description.

use crate::external::build_external_invocation_proxy;
use crate::internal::build_invocation_proxies;
use silica_arch::{ArchitectureComponent, HardwareDescription, MemberIdTable};
use silica_common::SilicaResult;
use silica_config::SynthesisConfig;

/// Runs the composition passes over a complete component set and
/// assembles the final [`HardwareDescription`].
///
/// The transformed member components come first in the output, followed
/// by the internal invocation proxies and the external dispatcher, in the
/// order the downstream emission layer serializes them. Requires the
/// complete call graph: every per-member transformation must have
/// finished before this runs.
pub fn compose_hardware_description(
    components: &[ArchitectureComponent],
    entry_members: &[String],
    member_id_table: MemberIdTable,
    config: &SynthesisConfig,
) -> SilicaResult<HardwareDescription> {
    let mut all = components.to_vec();
    all.extend(build_invocation_proxies(components, config)?);
    all.push(build_external_invocation_proxy(
        entry_members,
        &member_id_table,
        config,
    )?);
    HardwareDescription::new(all, member_id_table)
}
