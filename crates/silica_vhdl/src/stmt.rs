//! Behavioral statements for generated process bodies.

use crate::expr::Expr;
use serde::{Deserialize, Serialize};

/// Whether an assignment targets a signal or a process-local variable.
///
/// The distinction is load-bearing for the generated arbitration logic:
/// variable assignments take effect immediately within the running process,
/// which is how same-cycle target claims are made visible to later
/// invocation handlers without multi-driven signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignKind {
    /// A signal assignment (`<=`), effective at the end of the cycle.
    Signal,
    /// A variable assignment (`:=`), effective immediately.
    Variable,
}

/// A case arm matching one pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseArm {
    /// The pattern expression to match against.
    pub pattern: Expr,
    /// The body to execute when matched.
    pub body: Statement,
}

/// A behavioral statement in generated hardware logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// A signal or variable assignment.
    Assign {
        /// Signal or variable semantics.
        kind: AssignKind,
        /// The target reference (a name or an indexed name).
        target: Expr,
        /// The assigned value.
        value: Expr,
    },
    /// An if-else statement.
    If {
        /// The condition expression.
        condition: Expr,
        /// The body when the condition holds.
        then_body: Box<Statement>,
        /// The optional body when it does not.
        else_body: Option<Box<Statement>>,
    },
    /// A case statement over an expression.
    Case {
        /// The subject expression being matched.
        subject: Expr,
        /// The match arms.
        arms: Vec<CaseArm>,
        /// The default arm, if any (`when others`).
        default: Option<Box<Statement>>,
    },
    /// A block of sequential statements.
    Block(Vec<Statement>),
    /// The VHDL `null` statement — an explicit no-op branch.
    Null,
}

impl Statement {
    /// A signal assignment.
    pub fn assign_signal(target: Expr, value: Expr) -> Self {
        Self::Assign {
            kind: AssignKind::Signal,
            target,
            value,
        }
    }

    /// A variable assignment.
    pub fn assign_variable(target: Expr, value: Expr) -> Self {
        Self::Assign {
            kind: AssignKind::Variable,
            target,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assign_kinds_differ() {
        let signal = Statement::assign_signal(Expr::name("s"), Expr::bit(true));
        let variable = Statement::assign_variable(Expr::name("s"), Expr::bit(true));
        assert_ne!(signal, variable);
    }

    #[test]
    fn if_statement_shape() {
        let stmt = Statement::If {
            condition: Expr::equals(Expr::name("go"), Expr::bit(true)),
            then_body: Box::new(Statement::Null),
            else_body: Some(Box::new(Statement::Null)),
        };
        if let Statement::If { else_body, .. } = &stmt {
            assert!(else_body.is_some());
        } else {
            panic!("expected If");
        }
    }

    #[test]
    fn case_statement_shape() {
        let stmt = Statement::Case {
            subject: Expr::name("state"),
            arms: vec![CaseArm {
                pattern: Expr::enum_variant("WaitingForStarted"),
                body: Statement::Null,
            }],
            default: Some(Box::new(Statement::Null)),
        };
        if let Statement::Case { arms, default, .. } = &stmt {
            assert_eq!(arms.len(), 1);
            assert!(default.is_some());
        } else {
            panic!("expected Case");
        }
    }

    #[test]
    fn serde_roundtrip() {
        let stmt = Statement::Block(vec![
            Statement::assign_signal(Expr::name("a"), Expr::bit(false)),
            Statement::Null,
        ]);
        let json = serde_json::to_string(&stmt).unwrap();
        let back: Statement = serde_json::from_str(&json).unwrap();
        assert_eq!(stmt, back);
    }
}
