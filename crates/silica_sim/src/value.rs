//! Runtime values for simulated signals and variables.

use serde::{Deserialize, Serialize};
use silica_common::{InternalError, SilicaResult};
use silica_vhdl::Literal;

/// The runtime value of a signal or variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// A `std_logic` bit.
    Bit(bool),
    /// A `boolean`.
    Bool(bool),
    /// An unsigned vector value.
    Unsigned {
        /// The numeric value.
        value: u64,
        /// The vector width in bits.
        width: u32,
    },
    /// A plain integer.
    Int(i64),
    /// A variant of an enumeration type.
    Enum(String),
}

impl Value {
    /// Interprets the value as a condition.
    ///
    /// Only bits and booleans are valid conditions; anything else in
    /// condition position is a bug in the generated tree.
    pub fn truthy(&self) -> SilicaResult<bool> {
        match self {
            Value::Bit(bit) => Ok(*bit),
            Value::Bool(value) => Ok(*value),
            other => Err(InternalError::new(format!(
                "value {other:?} used as a condition"
            ))),
        }
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Bit(bit) => Value::Bit(*bit),
            Literal::Bool(value) => Value::Bool(*value),
            Literal::Unsigned { value, width } => Value::Unsigned {
                value: *value,
                width: *width,
            },
            Literal::Int(value) => Value::Int(*value),
            Literal::EnumVariant(name) => Value::Enum(name.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_and_bools_are_conditions() {
        assert!(Value::Bit(true).truthy().unwrap());
        assert!(!Value::Bool(false).truthy().unwrap());
    }

    #[test]
    fn other_values_are_not_conditions() {
        assert!(Value::Int(1).truthy().is_err());
        assert!(Value::Enum("Idle".to_string()).truthy().is_err());
    }

    #[test]
    fn literal_conversion() {
        assert_eq!(Value::from(&Literal::Bit(true)), Value::Bit(true));
        assert_eq!(
            Value::from(&Literal::EnumVariant("Busy".to_string())),
            Value::Enum("Busy".to_string())
        );
        assert_eq!(
            Value::from(&Literal::Unsigned { value: 5, width: 8 }),
            Value::Unsigned { value: 5, width: 8 }
        );
    }
}
