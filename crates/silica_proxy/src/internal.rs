//! The internal invocation proxy builder.
//!
//! One proxy component is generated per invoked member. Directly wired
//! members get concurrent signal assignments only; arbitrated members get
//! a single clocked process holding one three-state machine per (caller,
//! invocation instance) pair, all competing for the member's target
//! instances. Only the proxy process drives a member's target start
//! signals, and same-cycle claims are tracked in process variables, so no
//! signal ever has two drivers.

use crate::topology::{collect_invoked_members, static_pairing, InvokedMember};
use silica_arch::signals::{
    finished_signal_name, indexed_component_name, invocation_finished_signal_name,
    invocation_parameter_signal_name, invocation_return_signal_name,
    invocation_started_signal_name, parameter_signal_name, return_signal_name,
    started_signal_name,
};
use silica_arch::ArchitectureComponent;
use silica_common::{InternalError, SilicaResult};
use silica_config::SynthesisConfig;
use silica_vhdl::{CaseArm, Declaration, Expr, Process, Statement, VhdlType};

/// The component carrying the shared running-states enumeration.
pub const RUNNING_STATES_COMPONENT_NAME: &str = "invocation_proxy.running_states";

/// The name of the shared running-states enumeration type.
pub const RUNNING_STATES_TYPE_NAME: &str = "invocation_running_states";

/// The idle state: waiting for a call site to assert its request signal.
pub const WAITING_FOR_STARTED: &str = "WaitingForStarted";

/// The active state: a target instance is claimed and running.
pub const WAITING_FOR_FINISHED: &str = "WaitingForFinished";

/// The handoff state: waiting for the call site to acknowledge completion.
pub const AFTER_FINISHED: &str = "AfterFinished";

/// The component name of the proxy generated for an invoked member.
pub fn internal_proxy_component_name(member: &str) -> String {
    format!("invocation_proxy.{member}")
}

fn running_state_variable(caller: &str, index: u32) -> String {
    format!("running_state.{caller}.{index}")
}

fn chosen_target_variable(caller: &str, index: u32) -> String {
    format!("chosen_target.{caller}.{index}")
}

fn target_busy_variable(target: u32) -> String {
    format!("target_busy.{target}")
}

fn target_just_finished_variable(target: u32) -> String {
    format!("target_just_finished.{target}")
}

/// The width of the chosen-target index variable.
fn index_width(target_count: u32) -> u32 {
    (32 - target_count.saturating_sub(1).leading_zeros()).max(1)
}

/// Builds every internal invocation proxy for the complete component set.
///
/// Returns the shared running-states declaration component followed by one
/// proxy component per invoked member, in member-name order. Fails when an
/// invoked member has no synthesized target component to read its
/// parameter list from.
pub fn build_invocation_proxies(
    components: &[ArchitectureComponent],
    config: &SynthesisConfig,
) -> SilicaResult<Vec<ArchitectureComponent>> {
    let members = collect_invoked_members(components, config);
    if members.is_empty() {
        return Ok(Vec::new());
    }
    let mut proxies = vec![running_states_component()];
    for member in &members {
        let target = find_target_component(components, &member.member)?;
        let proxy = match static_pairing(member) {
            Some(pairing) => build_direct_proxy(member, target, &pairing),
            None => build_arbitrated_proxy(member, target, &config.device.clock_signal),
        };
        proxies.push(proxy);
    }
    Ok(proxies)
}

/// The component declaring the shared running-states enumeration type.
fn running_states_component() -> ArchitectureComponent {
    let mut component = ArchitectureComponent::new(RUNNING_STATES_COMPONENT_NAME);
    component.declarations.push(Declaration::EnumType {
        name: RUNNING_STATES_TYPE_NAME.to_string(),
        variants: vec![
            WAITING_FOR_STARTED.to_string(),
            WAITING_FOR_FINISHED.to_string(),
            AFTER_FINISHED.to_string(),
        ],
    });
    component
}

/// Finds the instance-0 component of an invoked member, the source of its
/// parameter list and return type.
fn find_target_component<'a>(
    components: &'a [ArchitectureComponent],
    member: &str,
) -> SilicaResult<&'a ArchitectureComponent> {
    let name = indexed_component_name(member, 0);
    components
        .iter()
        .find(|component| component.name == name)
        .ok_or_else(|| {
            InternalError::new(format!(
                "invoked member '{member}' has no synthesized component '{name}'"
            ))
        })
}

/// Direct wiring: call site *i* is connected to target instance *i* with
/// concurrent assignments and no runtime selection logic.
fn build_direct_proxy(
    member: &InvokedMember,
    target: &ArchitectureComponent,
    pairing: &[(&str, u32, u32)],
) -> ArchitectureComponent {
    let mut component = ArchitectureComponent::new(internal_proxy_component_name(&member.member));
    for &(caller, index, target_index) in pairing {
        let instance = indexed_component_name(&member.member, target_index);
        declare_driven_signals(&mut component, member, target, caller, index, target_index);
        component.concurrent.push(Statement::assign_signal(
            Expr::name(started_signal_name(&instance)),
            Expr::name(invocation_started_signal_name(caller, &member.member, index)),
        ));
        for parameter in target.own_parameters() {
            component.concurrent.push(Statement::assign_signal(
                Expr::name(parameter_signal_name(&instance, &parameter.parameter_name)),
                Expr::name(invocation_parameter_signal_name(
                    caller,
                    &member.member,
                    index,
                    &parameter.parameter_name,
                )),
            ));
        }
        component.concurrent.push(Statement::assign_signal(
            Expr::name(invocation_finished_signal_name(caller, &member.member, index)),
            Expr::name(finished_signal_name(&instance)),
        ));
        if target.return_type.is_some() {
            component.concurrent.push(Statement::assign_signal(
                Expr::name(invocation_return_signal_name(caller, &member.member, index)),
                Expr::name(return_signal_name(&instance)),
            ));
        }
    }
    component
}

/// The general case: one clocked arbitration process with a three-state
/// machine per (caller, invocation instance) pair.
fn build_arbitrated_proxy(
    member: &InvokedMember,
    target: &ArchitectureComponent,
    clock: &str,
) -> ArchitectureComponent {
    let mut component = ArchitectureComponent::new(internal_proxy_component_name(&member.member));
    let width = index_width(member.target_count);
    let pairs = member.invocation_pairs();

    for target_index in 0..member.target_count {
        declare_target_signals(&mut component, member, target, target_index);
    }
    for &(caller, index) in &pairs {
        declare_call_site_signals(&mut component, member, target, caller, index);
    }

    let mut process = Process::clocked(component.name.clone(), clock);
    for target_index in 0..member.target_count {
        process.declarations.push(Declaration::Variable {
            name: target_busy_variable(target_index),
            ty: VhdlType::Boolean,
            default: Some(Expr::bool(false)),
        });
        process.declarations.push(Declaration::Variable {
            name: target_just_finished_variable(target_index),
            ty: VhdlType::Boolean,
            default: Some(Expr::bool(false)),
        });
    }
    for &(caller, index) in &pairs {
        process.declarations.push(Declaration::Variable {
            name: running_state_variable(caller, index),
            ty: VhdlType::Named(RUNNING_STATES_TYPE_NAME.to_string()),
            default: Some(Expr::enum_variant(WAITING_FOR_STARTED)),
        });
        process.declarations.push(Declaration::Variable {
            name: chosen_target_variable(caller, index),
            ty: VhdlType::Unsigned(width),
            default: Some(Expr::unsigned(0, width)),
        });
    }

    // The just-finished cool-down lasts exactly one cycle: cleared at the
    // top of the process, set by the completion handlers below.
    for target_index in 0..member.target_count {
        process.body.push(Statement::assign_variable(
            Expr::name(target_just_finished_variable(target_index)),
            Expr::bool(false),
        ));
    }
    for &(caller, index) in &pairs {
        process.body.push(Statement::Case {
            subject: Expr::name(running_state_variable(caller, index)),
            arms: vec![
                CaseArm {
                    pattern: Expr::enum_variant(WAITING_FOR_STARTED),
                    body: waiting_for_started_arm(member, target, caller, index, width),
                },
                CaseArm {
                    pattern: Expr::enum_variant(WAITING_FOR_FINISHED),
                    body: waiting_for_finished_arm(member, target, caller, index, width),
                },
                CaseArm {
                    pattern: Expr::enum_variant(AFTER_FINISHED),
                    body: after_finished_arm(member, caller, index),
                },
            ],
            default: None,
        });
    }
    component.processes.push(process);
    component
}

/// Declares the signals the proxy drives toward one target instance.
fn declare_target_signals(
    component: &mut ArchitectureComponent,
    member: &InvokedMember,
    target: &ArchitectureComponent,
    target_index: u32,
) {
    let instance = indexed_component_name(&member.member, target_index);
    component.declarations.push(Declaration::Signal {
        name: started_signal_name(&instance),
        ty: VhdlType::StdLogic,
        default: Some(Expr::bit(false)),
    });
    for parameter in target.own_parameters() {
        component.declarations.push(Declaration::Signal {
            name: parameter_signal_name(&instance, &parameter.parameter_name),
            ty: parameter.ty.clone(),
            default: None,
        });
    }
}

/// Declares the signals the proxy drives back toward one call site.
fn declare_call_site_signals(
    component: &mut ArchitectureComponent,
    member: &InvokedMember,
    target: &ArchitectureComponent,
    caller: &str,
    index: u32,
) {
    component.declarations.push(Declaration::Signal {
        name: invocation_finished_signal_name(caller, &member.member, index),
        ty: VhdlType::StdLogic,
        default: Some(Expr::bit(false)),
    });
    if let Some(return_type) = &target.return_type {
        component.declarations.push(Declaration::Signal {
            name: invocation_return_signal_name(caller, &member.member, index),
            ty: return_type.clone(),
            default: None,
        });
    }
}

/// Declares the driven signals for one statically wired pairing.
fn declare_driven_signals(
    component: &mut ArchitectureComponent,
    member: &InvokedMember,
    target: &ArchitectureComponent,
    caller: &str,
    index: u32,
    target_index: u32,
) {
    declare_target_signals(component, member, target, target_index);
    declare_call_site_signals(component, member, target, caller, index);
}

/// `WaitingForStarted`: on the call site's request, scan the target
/// instances in priority order and claim the first available one.
fn waiting_for_started_arm(
    member: &InvokedMember,
    target: &ArchitectureComponent,
    caller: &str,
    index: u32,
    width: u32,
) -> Statement {
    let mut scan = None;
    for target_index in (0..member.target_count).rev() {
        let instance = indexed_component_name(&member.member, target_index);
        // A component must never start itself: the candidate equal to the
        // caller is a no-op branch, so recursion waits for a distinct
        // instance.
        let claim = if caller == instance {
            Statement::Null
        } else {
            claim_target(member, target, caller, index, target_index, width)
        };
        let available = Expr::and(
            Expr::equals(
                Expr::name(target_busy_variable(target_index)),
                Expr::bool(false),
            ),
            Expr::equals(
                Expr::name(target_just_finished_variable(target_index)),
                Expr::bool(false),
            ),
        );
        scan = Some(Statement::If {
            condition: available,
            then_body: Box::new(claim),
            else_body: scan.map(Box::new),
        });
    }
    Statement::If {
        condition: Expr::equals(
            Expr::name(invocation_started_signal_name(caller, &member.member, index)),
            Expr::bit(true),
        ),
        then_body: Box::new(scan.unwrap_or(Statement::Null)),
        else_body: None,
    }
}

/// Claims one target instance: mark it busy, record the chosen index,
/// start it, copy the parameters across, and transition.
fn claim_target(
    member: &InvokedMember,
    target: &ArchitectureComponent,
    caller: &str,
    index: u32,
    target_index: u32,
    width: u32,
) -> Statement {
    let instance = indexed_component_name(&member.member, target_index);
    let mut statements = vec![
        Statement::assign_variable(
            Expr::name(target_busy_variable(target_index)),
            Expr::bool(true),
        ),
        Statement::assign_variable(
            Expr::name(chosen_target_variable(caller, index)),
            Expr::unsigned(u64::from(target_index), width),
        ),
        Statement::assign_signal(Expr::name(started_signal_name(&instance)), Expr::bit(true)),
    ];
    for parameter in target.own_parameters() {
        statements.push(Statement::assign_signal(
            Expr::name(parameter_signal_name(&instance, &parameter.parameter_name)),
            Expr::name(invocation_parameter_signal_name(
                caller,
                &member.member,
                index,
                &parameter.parameter_name,
            )),
        ));
    }
    statements.push(Statement::assign_variable(
        Expr::name(running_state_variable(caller, index)),
        Expr::enum_variant(WAITING_FOR_FINISHED),
    ));
    Statement::Block(statements)
}

/// `WaitingForFinished`: dispatch on the recorded target index and wait
/// for that instance's finished signal.
fn waiting_for_finished_arm(
    member: &InvokedMember,
    target: &ArchitectureComponent,
    caller: &str,
    index: u32,
    width: u32,
) -> Statement {
    let arms = (0..member.target_count)
        .map(|target_index| {
            let instance = indexed_component_name(&member.member, target_index);
            let mut statements = Vec::new();
            if target.return_type.is_some() {
                statements.push(Statement::assign_signal(
                    Expr::name(invocation_return_signal_name(caller, &member.member, index)),
                    Expr::name(return_signal_name(&instance)),
                ));
            }
            statements.extend([
                Statement::assign_signal(
                    Expr::name(started_signal_name(&instance)),
                    Expr::bit(false),
                ),
                Statement::assign_variable(
                    Expr::name(target_busy_variable(target_index)),
                    Expr::bool(false),
                ),
                Statement::assign_variable(
                    Expr::name(target_just_finished_variable(target_index)),
                    Expr::bool(true),
                ),
                Statement::assign_signal(
                    Expr::name(invocation_finished_signal_name(caller, &member.member, index)),
                    Expr::bit(true),
                ),
                Statement::assign_variable(
                    Expr::name(running_state_variable(caller, index)),
                    Expr::enum_variant(AFTER_FINISHED),
                ),
            ]);
            CaseArm {
                pattern: Expr::unsigned(u64::from(target_index), width),
                body: Statement::If {
                    condition: Expr::equals(
                        Expr::name(finished_signal_name(&instance)),
                        Expr::bit(true),
                    ),
                    then_body: Box::new(Statement::Block(statements)),
                    else_body: None,
                },
            }
        })
        .collect();
    Statement::Case {
        subject: Expr::name(chosen_target_variable(caller, index)),
        arms,
        default: Some(Box::new(Statement::Null)),
    }
}

/// `AfterFinished`: wait for the call site to deassert its request, then
/// complete the handshake.
fn after_finished_arm(member: &InvokedMember, caller: &str, index: u32) -> Statement {
    Statement::If {
        condition: Expr::equals(
            Expr::name(invocation_started_signal_name(caller, &member.member, index)),
            Expr::bit(false),
        ),
        then_body: Box::new(Statement::Block(vec![
            Statement::assign_signal(
                Expr::name(invocation_finished_signal_name(caller, &member.member, index)),
                Expr::bit(false),
            ),
            Statement::assign_variable(
                Expr::name(running_state_variable(caller, index)),
                Expr::enum_variant(WAITING_FOR_STARTED),
            ),
        ])),
        else_body: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use silica_arch::ParameterSignal;
    use silica_config::load_config_from_str;

    fn config(extra: &str) -> SynthesisConfig {
        let toml = format!(
            r#"
[project]
name = "sample"
version = "0.1.0"
{extra}
"#
        );
        load_config_from_str(&toml).unwrap()
    }

    fn target_component(member: &str) -> ArchitectureComponent {
        let mut component = ArchitectureComponent::new(indexed_component_name(member, 0));
        component.parameter_signals.push(ParameterSignal {
            target_member_name: member.to_string(),
            parameter_name: "input".to_string(),
            index: 0,
            is_own: true,
            ty: VhdlType::Unsigned(32),
        });
        component.return_type = Some(VhdlType::Unsigned(32));
        component
    }

    fn caller_component(name: &str, member: &str, count: u32) -> ArchitectureComponent {
        let mut component = ArchitectureComponent::new(name);
        component.add_invoked_member(member, count);
        component
    }

    fn proxy_for<'a>(
        proxies: &'a [ArchitectureComponent],
        member: &str,
    ) -> &'a ArchitectureComponent {
        let name = internal_proxy_component_name(member);
        proxies
            .iter()
            .find(|component| component.name == name)
            .expect("proxy component exists")
    }

    #[test]
    fn no_invocations_build_nothing() {
        let components = vec![target_component("Idle()")];
        let proxies = build_invocation_proxies(&components, &config("")).unwrap();
        assert!(proxies.is_empty());
    }

    #[test]
    fn running_states_component_is_emitted_once() {
        let components = vec![
            target_component("Callee()"),
            caller_component("A.0", "Callee()", 1),
        ];
        let proxies = build_invocation_proxies(&components, &config("")).unwrap();
        assert_eq!(proxies[0].name, RUNNING_STATES_COMPONENT_NAME);
        match &proxies[0].declarations[0] {
            Declaration::EnumType { name, variants } => {
                assert_eq!(name, RUNNING_STATES_TYPE_NAME);
                assert_eq!(
                    variants,
                    &[WAITING_FOR_STARTED, WAITING_FOR_FINISHED, AFTER_FINISHED]
                );
            }
            other => panic!("expected the running-states enum, got {other:?}"),
        }
    }

    #[test]
    fn single_caller_gets_direct_wiring() {
        let components = vec![
            target_component("Callee()"),
            caller_component("A.0", "Callee()", 1),
        ];
        let proxies = build_invocation_proxies(&components, &config("")).unwrap();
        let proxy = proxy_for(&proxies, "Callee()");
        // No runtime selection logic: no process at all, just wiring.
        assert!(proxy.processes.is_empty());
        // started, one parameter, finished, return.
        assert_eq!(proxy.concurrent.len(), 4);
        assert!(proxy.concurrent.iter().all(|statement| matches!(
            statement,
            Statement::Assign { .. }
        )));
    }

    #[test]
    fn competing_callers_get_an_arbitrated_process() {
        let components = vec![
            target_component("Callee()"),
            caller_component("A.0", "Callee()", 1),
            caller_component("B.0", "Callee()", 1),
        ];
        let proxies = build_invocation_proxies(&components, &config("")).unwrap();
        let proxy = proxy_for(&proxies, "Callee()");
        assert!(proxy.concurrent.is_empty());
        assert_eq!(proxy.processes.len(), 1);
        let process = &proxy.processes[0];
        // One state variable and one chosen-index variable per pair, plus
        // busy and just-finished per target.
        let variables: Vec<&str> = process
            .declarations
            .iter()
            .map(|declaration| declaration.name())
            .collect();
        assert!(variables.contains(&"running_state.A.0.0"));
        assert!(variables.contains(&"running_state.B.0.0"));
        assert!(variables.contains(&"chosen_target.A.0.0"));
        assert!(variables.contains(&"target_busy.0"));
        assert!(variables.contains(&"target_just_finished.0"));
        // One case statement per pair after the cool-down clears.
        let cases = process
            .body
            .iter()
            .filter(|statement| matches!(statement, Statement::Case { .. }))
            .count();
        assert_eq!(cases, 2);
    }

    #[test]
    fn multi_instance_caller_within_pool_is_direct() {
        let components = vec![
            target_component("Callee()"),
            caller_component("A.0", "Callee()", 2),
        ];
        let proxies = build_invocation_proxies(
            &components,
            &config("[members.\"Callee()\"]\ntarget_instance_count = 2\n"),
        )
        .unwrap();
        let proxy = proxy_for(&proxies, "Callee()");
        assert!(proxy.processes.is_empty());
        // Two pairings, four assignments each.
        assert_eq!(proxy.concurrent.len(), 8);
    }

    #[test]
    fn self_invocation_candidate_is_a_null_branch() {
        // The only caller is instance 0 of the invoked member itself.
        let mut target = target_component("Callee()");
        target.add_invoked_member("Callee()", 1);
        let components = vec![target];
        let proxies = build_invocation_proxies(&components, &config("")).unwrap();
        let proxy = proxy_for(&proxies, "Callee()");
        // Forced into arbitration, and the only candidate branch is Null.
        assert_eq!(proxy.processes.len(), 1);
        let body = &proxy.processes[0].body;
        let case = body
            .iter()
            .find_map(|statement| match statement {
                Statement::Case { arms, .. } => Some(arms),
                _ => None,
            })
            .expect("state machine case");
        let waiting = &case[0].body;
        match waiting {
            Statement::If { then_body, .. } => match then_body.as_ref() {
                Statement::If { then_body, .. } => {
                    assert_eq!(then_body.as_ref(), &Statement::Null);
                }
                other => panic!("expected the availability scan, got {other:?}"),
            },
            other => panic!("expected the request check, got {other:?}"),
        }
    }

    #[test]
    fn missing_target_component_is_an_error() {
        let components = vec![caller_component("A.0", "Ghost()", 1)];
        let err = build_invocation_proxies(&components, &config("")).unwrap_err();
        assert!(err.message.contains("Ghost()"));
    }

    #[test]
    fn index_widths() {
        assert_eq!(index_width(1), 1);
        assert_eq!(index_width(2), 1);
        assert_eq!(index_width(3), 2);
        assert_eq!(index_width(4), 2);
        assert_eq!(index_width(5), 3);
    }
}
