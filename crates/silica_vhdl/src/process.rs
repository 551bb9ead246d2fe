//! Process definitions for generated clocked state machines.

use crate::decl::Declaration;
use crate::stmt::Statement;
use serde::{Deserialize, Serialize};

/// One generated hardware process.
///
/// A process is conceptually one always-running, clocked state machine.
/// Multiple processes execute logically in parallel and coordinate only
/// through signals; no signal may be driven by more than one process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    /// The process label.
    pub label: String,
    /// The sensitivity list (signal names).
    pub sensitivity: Vec<String>,
    /// Process-local declarations (variables).
    pub declarations: Vec<Declaration>,
    /// The body, executed once per activation.
    pub body: Vec<Statement>,
}

impl Process {
    /// Creates an empty clocked process with the given label, sensitive to
    /// the clock signal.
    pub fn clocked(label: impl Into<String>, clock: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            sensitivity: vec![clock.into()],
            declarations: Vec::new(),
            body: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clocked_process_sensitivity() {
        let process = Process::clocked("proxy", "clk");
        assert_eq!(process.label, "proxy");
        assert_eq!(process.sensitivity, vec!["clk".to_string()]);
        assert!(process.body.is_empty());
    }

    #[test]
    fn serde_roundtrip() {
        let mut process = Process::clocked("proxy", "clk");
        process.body.push(Statement::Null);
        let json = serde_json::to_string(&process).unwrap();
        let back: Process = serde_json::from_str(&json).unwrap();
        assert_eq!(process, back);
    }
}
