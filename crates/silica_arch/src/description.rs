//! The final hardware description artifact.

use crate::component::ArchitectureComponent;
use crate::member_id::MemberIdTable;
use serde::{Deserialize, Serialize};
use silica_common::{ContentHash, InternalError, SilicaResult};

/// The complete output of one hardware-generation run.
///
/// Holds the full component set (transformed members plus generated
/// proxies), the member ID table external callers dispatch through, and a
/// transformation ID derived from the component content. Downstream
/// consumers cache generated designs keyed on the transformation ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareDescription {
    /// All architecture components in emission order.
    pub components: Vec<ArchitectureComponent>,
    /// The member-name ↔ ID table for external dispatch.
    pub member_id_table: MemberIdTable,
    /// Content hash of the component set.
    pub transformation_id: ContentHash,
}

impl HardwareDescription {
    /// Assembles a description, deriving the transformation ID from the
    /// serialized component set.
    pub fn new(
        components: Vec<ArchitectureComponent>,
        member_id_table: MemberIdTable,
    ) -> SilicaResult<Self> {
        let serialized = serde_json::to_vec(&components)
            .map_err(|error| InternalError::new(format!("component set not hashable: {error}")))?;
        Ok(Self {
            components,
            member_id_table,
            transformation_id: ContentHash::from_bytes(&serialized),
        })
    }
}
