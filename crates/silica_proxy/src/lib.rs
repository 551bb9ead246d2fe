//! Invocation proxy builders: the state-machine composition layer.
//!
//! Independently synthesized per-member state machines communicate only
//! through started/finished/parameter signals. This crate wires N call
//! sites to M physical target instances per invoked member: statically
//! when the topology allows it, through a generated three-state
//! arbitration process otherwise. It also builds the external dispatcher
//! that maps a host-supplied member ID to the matching start/wait
//! sequence.
//!
//! The builders run as a single-pass synchronous transformation once the
//! complete component set is available; their output is additional
//! [`ArchitectureComponent`](silica_arch::ArchitectureComponent)s merged
//! into the same emission stream.

#![warn(missing_docs)]

pub mod compose;
pub mod external;
pub mod internal;
pub mod topology;

pub use compose::compose_hardware_description;
pub use external::{
    build_external_invocation_proxy, EXTERNAL_FINISHED_SIGNAL, EXTERNAL_MEMBER_ID_SIGNAL,
    EXTERNAL_PROXY_COMPONENT_NAME, EXTERNAL_STARTED_SIGNAL,
};
pub use internal::{
    build_invocation_proxies, internal_proxy_component_name, AFTER_FINISHED,
    RUNNING_STATES_COMPONENT_NAME, RUNNING_STATES_TYPE_NAME, WAITING_FOR_FINISHED,
    WAITING_FOR_STARTED,
};
pub use topology::{
    collect_invoked_members, select_strategy, InvocationSite, InvokedMember, WiringStrategy,
};
