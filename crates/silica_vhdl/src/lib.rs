//! The VHDL element tree produced by the synthesis core.
//!
//! This crate defines the language-independent tree of expressions,
//! statements, declarations, and processes that the invocation proxy
//! builders construct. Rendering the tree to VHDL text is the concern of a
//! downstream emission layer; this crate governs the tree's construction,
//! plus the declare-before-use reordering of procedure declarations.

#![warn(missing_docs)]

pub mod decl;
pub mod expr;
pub mod process;
pub mod reorder;
pub mod stmt;

pub use decl::{Declaration, ParamDirection, ProcedureParam, VhdlType};
pub use expr::{BinaryOp, Expr, Literal};
pub use process::Process;
pub use reorder::{reorder_procedures, CallChainTable};
pub use stmt::{AssignKind, CaseArm, Statement};
