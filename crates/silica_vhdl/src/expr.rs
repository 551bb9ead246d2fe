//! Expression trees for generated hardware logic.

use serde::{Deserialize, Serialize};

/// A binary operator appearing in generated conditions.
///
/// The proxy builders only ever emit comparisons and boolean connectives;
/// arithmetic in generated code is the business of the upstream member
/// transformation, not of the composition layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Equality (`=`).
    Eq,
    /// Inequality (`/=`).
    Ne,
    /// Boolean conjunction (`and`).
    And,
    /// Boolean disjunction (`or`).
    Or,
}

/// A literal constant value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// A single `std_logic` bit (`'0'` / `'1'`).
    Bit(bool),
    /// A `boolean` value (`false` / `true`).
    Bool(bool),
    /// An unsigned vector literal of a given width.
    Unsigned {
        /// The literal value.
        value: u64,
        /// The vector width in bits.
        width: u32,
    },
    /// A plain integer literal.
    Int(i64),
    /// A variant of a declared enumeration type.
    EnumVariant(String),
}

/// An expression in generated hardware logic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// A reference to a signal or variable by name.
    Name(String),
    /// An indexed reference (`base(index)`).
    Indexed {
        /// The signal or variable being indexed.
        base: String,
        /// The constant index.
        index: u32,
    },
    /// A literal constant.
    Literal(Literal),
    /// A binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// The left-hand side.
        lhs: Box<Expr>,
        /// The right-hand side.
        rhs: Box<Expr>,
    },
}

impl Expr {
    /// A name reference.
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// A `std_logic` bit literal.
    pub fn bit(value: bool) -> Self {
        Self::Literal(Literal::Bit(value))
    }

    /// A `boolean` literal.
    pub fn bool(value: bool) -> Self {
        Self::Literal(Literal::Bool(value))
    }

    /// An enumeration variant literal.
    pub fn enum_variant(name: impl Into<String>) -> Self {
        Self::Literal(Literal::EnumVariant(name.into()))
    }

    /// An unsigned vector literal.
    pub fn unsigned(value: u64, width: u32) -> Self {
        Self::Literal(Literal::Unsigned { value, width })
    }

    /// An equality comparison.
    pub fn equals(lhs: Expr, rhs: Expr) -> Self {
        Self::Binary {
            op: BinaryOp::Eq,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// A boolean conjunction.
    pub fn and(lhs: Expr, rhs: Expr) -> Self {
        Self::Binary {
            op: BinaryOp::And,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helper_constructors() {
        assert_eq!(Expr::name("clk"), Expr::Name("clk".to_string()));
        assert_eq!(Expr::bit(true), Expr::Literal(Literal::Bit(true)));
        assert_eq!(
            Expr::enum_variant("WaitingForStarted"),
            Expr::Literal(Literal::EnumVariant("WaitingForStarted".to_string()))
        );
    }

    #[test]
    fn comparison_shape() {
        let expr = Expr::equals(Expr::name("a.started"), Expr::bit(true));
        match expr {
            Expr::Binary { op, lhs, rhs } => {
                assert_eq!(op, BinaryOp::Eq);
                assert_eq!(*lhs, Expr::name("a.started"));
                assert_eq!(*rhs, Expr::bit(true));
            }
            other => panic!("expected Binary, got {other:?}"),
        }
    }

    #[test]
    fn serde_roundtrip() {
        let expr = Expr::and(
            Expr::equals(Expr::name("x"), Expr::bool(false)),
            Expr::Indexed {
                base: "busy".to_string(),
                index: 2,
            },
        );
        let json = serde_json::to_string(&expr).unwrap();
        let back: Expr = serde_json::from_str(&json).unwrap();
        assert_eq!(expr, back);
    }
}
