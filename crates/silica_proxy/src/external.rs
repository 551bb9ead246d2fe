//! The external invocation proxy: host-side member dispatch.
//!
//! The host starts a hardware call by driving a member ID and a start
//! signal; the dispatcher starts instance 0 of the matching member's
//! state machine, waits for it, and reports completion. A single state
//! machine guards the dispatcher, so only one external invocation is ever
//! in flight.

use crate::internal::{
    AFTER_FINISHED, RUNNING_STATES_TYPE_NAME, WAITING_FOR_FINISHED, WAITING_FOR_STARTED,
};
use silica_arch::signals::{finished_signal_name, indexed_component_name, started_signal_name};
use silica_arch::{ArchitectureComponent, MemberIdTable};
use silica_common::SilicaResult;
use silica_config::SynthesisConfig;
use silica_vhdl::{CaseArm, Declaration, Expr, Process, Statement, VhdlType};

/// The component name of the external dispatcher.
pub const EXTERNAL_PROXY_COMPONENT_NAME: &str = "external_invocation_proxy";

/// The host-driven request signal.
pub const EXTERNAL_STARTED_SIGNAL: &str = "external.started";

/// The completion signal driven back toward the host.
pub const EXTERNAL_FINISHED_SIGNAL: &str = "external.finished";

/// The host-driven member ID signal.
pub const EXTERNAL_MEMBER_ID_SIGNAL: &str = "external.member_id";

/// The width of the member ID signal.
pub const MEMBER_ID_WIDTH: u32 = 32;

const RUNNING_STATE_VARIABLE: &str = "running_state";
const DISPATCHED_ID_VARIABLE: &str = "dispatched_member_id";

/// Builds the external dispatcher for the given hardware entry members.
///
/// Every entry member must be registered in the member ID table; an
/// unregistered member is a configuration bug and fails the build.
pub fn build_external_invocation_proxy(
    entry_members: &[String],
    table: &MemberIdTable,
    config: &SynthesisConfig,
) -> SilicaResult<ArchitectureComponent> {
    let mut component = ArchitectureComponent::new(EXTERNAL_PROXY_COMPONENT_NAME);
    component.declarations.push(Declaration::Signal {
        name: EXTERNAL_FINISHED_SIGNAL.to_string(),
        ty: VhdlType::StdLogic,
        default: Some(Expr::bit(false)),
    });

    let mut dispatch_arms = Vec::with_capacity(entry_members.len());
    let mut wait_arms = Vec::with_capacity(entry_members.len());
    for member in entry_members {
        let id = table.id_for(member)?;
        let instance = indexed_component_name(member, 0);
        component.declarations.push(Declaration::Signal {
            name: started_signal_name(&instance),
            ty: VhdlType::StdLogic,
            default: Some(Expr::bit(false)),
        });
        dispatch_arms.push(CaseArm {
            pattern: Expr::unsigned(u64::from(id), MEMBER_ID_WIDTH),
            body: Statement::Block(vec![
                Statement::assign_signal(
                    Expr::name(started_signal_name(&instance)),
                    Expr::bit(true),
                ),
                Statement::assign_variable(
                    Expr::name(DISPATCHED_ID_VARIABLE),
                    Expr::unsigned(u64::from(id), MEMBER_ID_WIDTH),
                ),
                Statement::assign_variable(
                    Expr::name(RUNNING_STATE_VARIABLE),
                    Expr::enum_variant(WAITING_FOR_FINISHED),
                ),
            ]),
        });
        wait_arms.push(CaseArm {
            pattern: Expr::unsigned(u64::from(id), MEMBER_ID_WIDTH),
            body: Statement::If {
                condition: Expr::equals(
                    Expr::name(finished_signal_name(&instance)),
                    Expr::bit(true),
                ),
                then_body: Box::new(Statement::Block(vec![
                    Statement::assign_signal(
                        Expr::name(started_signal_name(&instance)),
                        Expr::bit(false),
                    ),
                    Statement::assign_signal(
                        Expr::name(EXTERNAL_FINISHED_SIGNAL),
                        Expr::bit(true),
                    ),
                    Statement::assign_variable(
                        Expr::name(RUNNING_STATE_VARIABLE),
                        Expr::enum_variant(AFTER_FINISHED),
                    ),
                ])),
                else_body: None,
            },
        });
    }

    let mut process = Process::clocked(EXTERNAL_PROXY_COMPONENT_NAME, &config.device.clock_signal);
    process.declarations.push(Declaration::Variable {
        name: RUNNING_STATE_VARIABLE.to_string(),
        ty: VhdlType::Named(RUNNING_STATES_TYPE_NAME.to_string()),
        default: Some(Expr::enum_variant(WAITING_FOR_STARTED)),
    });
    process.declarations.push(Declaration::Variable {
        name: DISPATCHED_ID_VARIABLE.to_string(),
        ty: VhdlType::Unsigned(MEMBER_ID_WIDTH),
        default: Some(Expr::unsigned(0, MEMBER_ID_WIDTH)),
    });
    process.body.push(Statement::Case {
        subject: Expr::name(RUNNING_STATE_VARIABLE),
        arms: vec![
            CaseArm {
                pattern: Expr::enum_variant(WAITING_FOR_STARTED),
                body: Statement::If {
                    condition: Expr::equals(
                        Expr::name(EXTERNAL_STARTED_SIGNAL),
                        Expr::bit(true),
                    ),
                    then_body: Box::new(Statement::Case {
                        subject: Expr::name(EXTERNAL_MEMBER_ID_SIGNAL),
                        arms: dispatch_arms,
                        default: Some(Box::new(Statement::Null)),
                    }),
                    else_body: None,
                },
            },
            CaseArm {
                pattern: Expr::enum_variant(WAITING_FOR_FINISHED),
                body: Statement::Case {
                    subject: Expr::name(DISPATCHED_ID_VARIABLE),
                    arms: wait_arms,
                    default: Some(Box::new(Statement::Null)),
                },
            },
            CaseArm {
                pattern: Expr::enum_variant(AFTER_FINISHED),
                body: Statement::If {
                    condition: Expr::equals(
                        Expr::name(EXTERNAL_STARTED_SIGNAL),
                        Expr::bit(false),
                    ),
                    then_body: Box::new(Statement::Block(vec![
                        Statement::assign_signal(
                            Expr::name(EXTERNAL_FINISHED_SIGNAL),
                            Expr::bit(false),
                        ),
                        Statement::assign_variable(
                            Expr::name(RUNNING_STATE_VARIABLE),
                            Expr::enum_variant(WAITING_FOR_STARTED),
                        ),
                    ])),
                    else_body: None,
                },
            },
        ],
        default: None,
    });
    component.processes.push(process);
    Ok(component)
}
