//! Declarations appearing in generated architectures and processes.

use crate::expr::Expr;
use crate::stmt::Statement;
use serde::{Deserialize, Serialize};

/// The type of a generated signal, variable, or parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VhdlType {
    /// A single `std_logic` bit.
    StdLogic,
    /// A `boolean`.
    Boolean,
    /// An `unsigned` vector of the given width.
    Unsigned(u32),
    /// A named type declared elsewhere (e.g. a running-states enumeration).
    Named(String),
}

/// The direction of a procedure parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamDirection {
    /// Read by the procedure.
    In,
    /// Written by the procedure.
    Out,
    /// Both read and written.
    InOut,
}

/// A formal parameter of a generated procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcedureParam {
    /// The parameter name.
    pub name: String,
    /// The parameter direction.
    pub direction: ParamDirection,
    /// The parameter type.
    pub ty: VhdlType,
}

/// A declaration in a generated architecture or process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Declaration {
    /// An architecture-level signal.
    Signal {
        /// The signal name.
        name: String,
        /// The signal type.
        ty: VhdlType,
        /// The optional initial value.
        default: Option<Expr>,
    },
    /// A process-local variable.
    Variable {
        /// The variable name.
        name: String,
        /// The variable type.
        ty: VhdlType,
        /// The optional initial value.
        default: Option<Expr>,
    },
    /// An enumeration type declaration.
    EnumType {
        /// The type name.
        name: String,
        /// The variants in declaration order.
        variants: Vec<String>,
    },
    /// A procedure declaration.
    ///
    /// Procedures are subject to VHDL's declare-before-use rule, which the
    /// [`reorder_procedures`](crate::reorder::reorder_procedures) pass
    /// enforces over whole declaration lists.
    Procedure {
        /// The procedure name.
        name: String,
        /// The formal parameters.
        parameters: Vec<ProcedureParam>,
        /// Local declarations.
        declarations: Vec<Declaration>,
        /// The procedure body.
        body: Vec<Statement>,
    },
}

impl Declaration {
    /// The declared name.
    pub fn name(&self) -> &str {
        match self {
            Self::Signal { name, .. }
            | Self::Variable { name, .. }
            | Self::EnumType { name, .. }
            | Self::Procedure { name, .. } => name,
        }
    }

    /// Whether this declaration is a procedure.
    pub fn is_procedure(&self) -> bool {
        matches!(self, Self::Procedure { .. })
    }
}
