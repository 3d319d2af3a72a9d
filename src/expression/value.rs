//! Runtime values produced by selector expressions.

use std::fmt;

/// Outcome of a boolean-producing expression under three-valued logic.
///
/// `Unknown` is what a comparison against a missing or mistyped operand
/// yields; it is distinct from `False` and only `True` selects a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    pub fn is_true(self) -> bool {
        self == Truth::True
    }

    pub fn is_unknown(self) -> bool {
        self == Truth::Unknown
    }

    /// NOT table: TRUE and FALSE swap, UNKNOWN stays UNKNOWN.
    pub fn negate(self) -> Truth {
        match self {
            Truth::True => Truth::False,
            Truth::False => Truth::True,
            Truth::Unknown => Truth::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Truth::True => "TRUE",
            Truth::False => "FALSE",
            Truth::Unknown => "UNKNOWN",
        }
    }
}

impl From<bool> for Truth {
    fn from(value: bool) -> Self {
        if value {
            Truth::True
        } else {
            Truth::False
        }
    }
}

impl fmt::Display for Truth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A number of any of the supported widths, read uniformly as `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl NumericValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            NumericValue::Byte(n) => f64::from(n),
            NumericValue::Short(n) => f64::from(n),
            NumericValue::Int(n) => f64::from(n),
            NumericValue::Long(n) => n as f64,
            NumericValue::Float(n) => f64::from(n),
            NumericValue::Double(n) => n,
        }
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericValue::Byte(n) => write!(f, "{}", n),
            NumericValue::Short(n) => write!(f, "{}", n),
            NumericValue::Int(n) => write!(f, "{}", n),
            NumericValue::Long(n) => write!(f, "{}", n),
            NumericValue::Float(n) => write!(f, "{}", n),
            NumericValue::Double(n) => write!(f, "{}", n),
        }
    }
}

macro_rules! numeric_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for NumericValue {
                fn from(value: $ty) -> Self {
                    NumericValue::$variant(value)
                }
            }

            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(NumericValue::$variant(value))
                }
            }
        )*
    };
}

numeric_from!(
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
);

/// Dynamic value of an expression node or an identifier binding.
///
/// A missing value is represented by `Option::None` at the call sites, never
/// by a variant here.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Boolean(bool),
    Number(NumericValue),
    String(String),
    Truth(Truth),
}

impl Value {
    pub fn as_number(&self) -> Option<NumericValue> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Reads the value as an operand of AND/OR/NOT.
    pub fn to_truth(value: Option<&Value>) -> Truth {
        match value {
            Some(Value::Truth(t)) => *t,
            Some(Value::Boolean(b)) => Truth::from(*b),
            _ => Truth::Unknown,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Truth(_) => "truth",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<Truth> for Value {
    fn from(value: Truth) -> Self {
        Value::Truth(value)
    }
}

impl From<NumericValue> for Value {
    fn from(value: NumericValue) -> Self {
        Value::Number(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Truth(t) => write!(f, "{}", t),
        }
    }
}
