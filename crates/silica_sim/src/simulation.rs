//! Clock-stepped execution of generated processes.

use crate::value::Value;
use silica_common::{InternalError, SilicaResult};
use silica_vhdl::{AssignKind, BinaryOp, Declaration, Expr, Process, Statement};
use std::collections::HashMap;

/// A clock-stepped simulation of a set of generated processes.
///
/// All processes share one flat signal namespace. Within a cycle every
/// process runs once, in registration order: variable assignments are
/// visible immediately to later statements of the same process, while
/// signal assignments are collected and applied together at the end of the
/// cycle, so every process observes the same pre-cycle signal values.
#[derive(Debug, Default)]
pub struct Simulation {
    signals: HashMap<String, Value>,
    next_signals: HashMap<String, Value>,
    variables: HashMap<String, HashMap<String, Value>>,
    processes: Vec<Process>,
}

impl Simulation {
    /// Creates an empty simulation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initializes signals from architecture-level declarations.
    ///
    /// Signal declarations without a default are skipped; reading them
    /// before they are driven or set is an error.
    pub fn declare_signals(&mut self, declarations: &[Declaration]) {
        for declaration in declarations {
            if let Declaration::Signal {
                name,
                default: Some(default),
                ..
            } = declaration
            {
                if let Expr::Literal(literal) = default {
                    self.signals.insert(name.clone(), Value::from(literal));
                }
            }
        }
    }

    /// Registers a process and initializes its variables from their
    /// declared defaults.
    ///
    /// Process labels must be unique across the simulation.
    pub fn add_process(&mut self, process: Process) -> SilicaResult<()> {
        if self.variables.contains_key(&process.label) {
            return Err(InternalError::new(format!(
                "duplicate process label '{}'",
                process.label
            )));
        }
        let mut variables = HashMap::new();
        for declaration in &process.declarations {
            if let Declaration::Variable {
                name,
                default: Some(default),
                ..
            } = declaration
            {
                if let Expr::Literal(literal) = default {
                    variables.insert(name.clone(), Value::from(literal));
                }
            }
        }
        self.variables.insert(process.label.clone(), variables);
        self.processes.push(process);
        Ok(())
    }

    /// Overwrites a signal's current value (test stimulus).
    pub fn set_signal(&mut self, name: impl Into<String>, value: Value) {
        self.signals.insert(name.into(), value);
    }

    /// Reads a signal's current value.
    pub fn signal(&self, name: &str) -> SilicaResult<&Value> {
        self.signals
            .get(name)
            .ok_or_else(|| InternalError::new(format!("signal '{name}' was never set")))
    }

    /// Reads a signal as a bit, defaulting unset signals to false.
    pub fn signal_is_set(&self, name: &str) -> bool {
        matches!(
            self.signals.get(name),
            Some(Value::Bit(true)) | Some(Value::Bool(true))
        )
    }

    /// Reads a process variable's current value.
    pub fn variable(&self, process_label: &str, name: &str) -> SilicaResult<&Value> {
        self.variables
            .get(process_label)
            .and_then(|variables| variables.get(name))
            .ok_or_else(|| {
                InternalError::new(format!(
                    "variable '{name}' of process '{process_label}' was never set"
                ))
            })
    }

    /// Runs one clock cycle: every process once, then signal updates.
    pub fn step(&mut self) -> SilicaResult<()> {
        for process in &self.processes {
            let variables = self
                .variables
                .get_mut(&process.label)
                .expect("variables exist for every registered process");
            let mut context = ProcessContext {
                signals: &self.signals,
                next_signals: &mut self.next_signals,
                variables,
            };
            for statement in &process.body {
                context.execute(statement)?;
            }
        }
        for (name, value) in self.next_signals.drain() {
            self.signals.insert(name, value);
        }
        Ok(())
    }
}

/// The evaluation context of one process within one cycle.
struct ProcessContext<'a> {
    signals: &'a HashMap<String, Value>,
    next_signals: &'a mut HashMap<String, Value>,
    variables: &'a mut HashMap<String, Value>,
}

impl ProcessContext<'_> {
    fn execute(&mut self, statement: &Statement) -> SilicaResult<()> {
        match statement {
            Statement::Assign {
                kind,
                target,
                value,
            } => {
                let name = match target {
                    Expr::Name(name) => name.clone(),
                    other => {
                        return Err(InternalError::new(format!(
                            "unsupported assignment target {other:?}"
                        )))
                    }
                };
                let value = self.evaluate(value)?;
                match kind {
                    AssignKind::Signal => {
                        self.next_signals.insert(name, value);
                    }
                    AssignKind::Variable => {
                        self.variables.insert(name, value);
                    }
                }
                Ok(())
            }
            Statement::If {
                condition,
                then_body,
                else_body,
            } => {
                if self.evaluate(condition)?.truthy()? {
                    self.execute(then_body)
                } else if let Some(else_body) = else_body {
                    self.execute(else_body)
                } else {
                    Ok(())
                }
            }
            Statement::Case {
                subject,
                arms,
                default,
            } => {
                let subject = self.evaluate(subject)?;
                for arm in arms {
                    if self.evaluate(&arm.pattern)? == subject {
                        return self.execute(&arm.body);
                    }
                }
                if let Some(default) = default {
                    return self.execute(default);
                }
                Err(InternalError::new(format!(
                    "no case arm matched {subject:?}"
                )))
            }
            Statement::Block(statements) => {
                for statement in statements {
                    self.execute(statement)?;
                }
                Ok(())
            }
            Statement::Null => Ok(()),
        }
    }

    fn evaluate(&self, expr: &Expr) -> SilicaResult<Value> {
        match expr {
            Expr::Name(name) => self
                .variables
                .get(name)
                .or_else(|| self.signals.get(name))
                .cloned()
                .ok_or_else(|| InternalError::new(format!("'{name}' was never set"))),
            Expr::Indexed { base, index } => Err(InternalError::new(format!(
                "indexed reference {base}({index}) is not simulated"
            ))),
            Expr::Literal(literal) => Ok(Value::from(literal)),
            Expr::Binary { op, lhs, rhs } => {
                let lhs = self.evaluate(lhs)?;
                let rhs = self.evaluate(rhs)?;
                match op {
                    BinaryOp::Eq => Ok(Value::Bool(lhs == rhs)),
                    BinaryOp::Ne => Ok(Value::Bool(lhs != rhs)),
                    BinaryOp::And => Ok(Value::Bool(lhs.truthy()? && rhs.truthy()?)),
                    BinaryOp::Or => Ok(Value::Bool(lhs.truthy()? || rhs.truthy()?)),
                }
            }
        }
    }
}
