//! Selector expression tree definitions.

use crate::expression::eval::Mapping;
use crate::expression::like::LikePattern;
use crate::expression::operator::{ArithOp, CompareOp, ConditionalOp};
use crate::expression::{Identifier, Literal, SelectorError, SelectorResult, Value};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Static category of the value a node produces.
///
/// Only the parser looks at this, to pick between string, boolean and
/// numeric equality. Evaluation never consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprKind {
    Boolean,
    Numeric,
    String,
    /// Identifiers: the type is only known once a value is bound
    Any,
}

/// Right-hand side of IN, fixed when the node is built
#[derive(Debug, Clone, PartialEq)]
pub struct StringSet {
    /// Distinct members in first-seen order, for rendering
    members: Vec<String>,
    lookup: HashSet<String>,
}

impl StringSet {
    pub fn new<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut members = Vec::new();
        let mut lookup = HashSet::new();
        for item in items {
            let item = item.into();
            if lookup.insert(item.clone()) {
                members.push(item);
            }
        }
        Self { members, lookup }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.lookup.contains(value)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }
}

/// Expression tree node
///
/// Operator nodes own their operands. Leaves are shared `Arc`s handed out by
/// the intern tables, so a tree is cheap to clone and safe to evaluate from
/// many threads at once.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Arc<Literal>),

    Identifier(Arc<Identifier>),

    /// `+ - * /` over numbers
    Arith {
        op: ArithOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },

    /// Unary minus
    Negate { operand: Box<Expression> },

    /// `= > >= < <=` over numbers
    Compare {
        op: CompareOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },

    /// AND / OR with short-circuit evaluation
    Conditional {
        op: ConditionalOp,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },

    Not { operand: Box<Expression> },

    StringEq {
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },

    BoolEq {
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },

    /// `=` between operands whose types are only known once bound; the
    /// comparison is picked from the values at evaluation time
    ValueEq {
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },

    /// Inclusive range test
    Between {
        value: Box<Expression>,
        lower: Box<Expression>,
        upper: Box<Expression>,
    },

    In {
        operand: Box<Expression>,
        set: StringSet,
    },

    /// Pattern match; the pattern is compiled when the node is built
    Like {
        operand: Box<Expression>,
        pattern: LikePattern,
    },

    IsNull { operand: Box<Expression> },
}

impl Expression {
    /// Create an identifier reference
    pub fn identifier(name: &str) -> SelectorResult<Self> {
        Ok(Expression::Identifier(Identifier::intern(name)?))
    }

    /// Create a boolean literal from `TRUE`/`FALSE` text
    pub fn boolean(text: &str) -> SelectorResult<Self> {
        Ok(Expression::Literal(Literal::boolean(text)?))
    }

    /// Create an exact numeric literal
    pub fn long(text: &str) -> SelectorResult<Self> {
        Ok(Expression::Literal(Literal::long(text)?))
    }

    /// Create an approximate numeric literal
    pub fn double(text: &str) -> SelectorResult<Self> {
        Ok(Expression::Literal(Literal::double(text)?))
    }

    /// Create a string literal
    pub fn string(value: impl Into<String>) -> Self {
        Expression::Literal(Literal::string(value))
    }

    pub fn arith(op: ArithOp, lhs: Expression, rhs: Expression) -> Self {
        Expression::Arith {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn add(lhs: Expression, rhs: Expression) -> Self {
        Self::arith(ArithOp::Add, lhs, rhs)
    }

    pub fn sub(lhs: Expression, rhs: Expression) -> Self {
        Self::arith(ArithOp::Sub, lhs, rhs)
    }

    pub fn mul(lhs: Expression, rhs: Expression) -> Self {
        Self::arith(ArithOp::Mul, lhs, rhs)
    }

    pub fn div(lhs: Expression, rhs: Expression) -> Self {
        Self::arith(ArithOp::Div, lhs, rhs)
    }

    pub fn negate(operand: Expression) -> Self {
        Expression::Negate {
            operand: Box::new(operand),
        }
    }

    pub fn compare(op: CompareOp, lhs: Expression, rhs: Expression) -> Self {
        Expression::Compare {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn eq(lhs: Expression, rhs: Expression) -> Self {
        Self::compare(CompareOp::Eq, lhs, rhs)
    }

    pub fn gt(lhs: Expression, rhs: Expression) -> Self {
        Self::compare(CompareOp::Gt, lhs, rhs)
    }

    pub fn ge(lhs: Expression, rhs: Expression) -> Self {
        Self::compare(CompareOp::Ge, lhs, rhs)
    }

    pub fn lt(lhs: Expression, rhs: Expression) -> Self {
        Self::compare(CompareOp::Lt, lhs, rhs)
    }

    pub fn le(lhs: Expression, rhs: Expression) -> Self {
        Self::compare(CompareOp::Le, lhs, rhs)
    }

    pub fn and(lhs: Expression, rhs: Expression) -> Self {
        Expression::Conditional {
            op: ConditionalOp::And,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn or(lhs: Expression, rhs: Expression) -> Self {
        Expression::Conditional {
            op: ConditionalOp::Or,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn not(operand: Expression) -> Self {
        Expression::Not {
            operand: Box::new(operand),
        }
    }

    pub fn string_eq(lhs: Expression, rhs: Expression) -> Self {
        Expression::StringEq {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn bool_eq(lhs: Expression, rhs: Expression) -> Self {
        Expression::BoolEq {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn value_eq(lhs: Expression, rhs: Expression) -> Self {
        Expression::ValueEq {
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn between(value: Expression, lower: Expression, upper: Expression) -> Self {
        Expression::Between {
            value: Box::new(value),
            lower: Box::new(lower),
            upper: Box::new(upper),
        }
    }

    pub fn in_list<I, S>(operand: Expression, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Expression::In {
            operand: Box::new(operand),
            set: StringSet::new(items),
        }
    }

    /// Create a LIKE node.
    ///
    /// `pattern` and `escape` are evaluated once, here, against an empty
    /// mapping. They must therefore be literal-valued: a pattern that depends
    /// on an identifier is rejected rather than re-evaluated per message.
    pub fn like(
        operand: Expression,
        pattern: Expression,
        escape: Option<Expression>,
    ) -> SelectorResult<Self> {
        let empty = Mapping::new();

        let pattern_text = match pattern.eval(&empty) {
            Some(Value::String(s)) => s,
            _ => {
                return Err(SelectorError::InvalidLikePattern {
                    pattern: pattern.to_string(),
                    reason: "pattern must be a string constant".to_string(),
                })
            }
        };

        let escape = match escape {
            None => None,
            Some(expr) => match expr.eval(&empty) {
                Some(Value::String(s)) => Some(LikePattern::parse_escape(&s)?),
                _ => {
                    return Err(SelectorError::InvalidEscape {
                        escape: expr.to_string(),
                    })
                }
            },
        };

        Ok(Expression::Like {
            operand: Box::new(operand),
            pattern: LikePattern::compile(&pattern_text, escape)?,
        })
    }

    pub fn is_null(operand: Expression) -> Self {
        Expression::IsNull {
            operand: Box::new(operand),
        }
    }

    /// Category of the value this node produces
    pub fn kind(&self) -> ExprKind {
        match self {
            Expression::Literal(lit) => match lit.value() {
                Value::Boolean(_) | Value::Truth(_) => ExprKind::Boolean,
                Value::Number(_) => ExprKind::Numeric,
                Value::String(_) => ExprKind::String,
            },
            Expression::Identifier(_) => ExprKind::Any,
            Expression::Arith { .. } | Expression::Negate { .. } => ExprKind::Numeric,
            Expression::Compare { .. }
            | Expression::Conditional { .. }
            | Expression::Not { .. }
            | Expression::StringEq { .. }
            | Expression::BoolEq { .. }
            | Expression::ValueEq { .. }
            | Expression::Between { .. }
            | Expression::In { .. }
            | Expression::Like { .. }
            | Expression::IsNull { .. } => ExprKind::Boolean,
        }
    }

    /// Check if this expression references no identifiers
    pub fn is_constant(&self) -> bool {
        match self {
            Expression::Literal(_) => true,
            Expression::Identifier(_) => false,
            Expression::Arith { lhs, rhs, .. }
            | Expression::Compare { lhs, rhs, .. }
            | Expression::Conditional { lhs, rhs, .. }
            | Expression::StringEq { lhs, rhs }
            | Expression::BoolEq { lhs, rhs }
            | Expression::ValueEq { lhs, rhs } => lhs.is_constant() && rhs.is_constant(),
            Expression::Negate { operand }
            | Expression::Not { operand }
            | Expression::In { operand, .. }
            | Expression::Like { operand, .. }
            | Expression::IsNull { operand } => operand.is_constant(),
            Expression::Between {
                value,
                lower,
                upper,
            } => value.is_constant() && lower.is_constant() && upper.is_constant(),
        }
    }

    /// Collect the distinct identifiers the tree references, in the order
    /// they first appear.
    pub fn identifiers(&self) -> Vec<Arc<Identifier>> {
        let mut found: Vec<Arc<Identifier>> = Vec::new();
        self.collect_identifiers(&mut found);
        found
    }

    fn collect_identifiers(&self, found: &mut Vec<Arc<Identifier>>) {
        match self {
            Expression::Literal(_) => {}
            Expression::Identifier(id) => {
                if !found.iter().any(|f| Arc::ptr_eq(f, id)) {
                    found.push(Arc::clone(id));
                }
            }
            Expression::Arith { lhs, rhs, .. }
            | Expression::Compare { lhs, rhs, .. }
            | Expression::Conditional { lhs, rhs, .. }
            | Expression::StringEq { lhs, rhs }
            | Expression::BoolEq { lhs, rhs }
            | Expression::ValueEq { lhs, rhs } => {
                lhs.collect_identifiers(found);
                rhs.collect_identifiers(found);
            }
            Expression::Negate { operand }
            | Expression::Not { operand }
            | Expression::In { operand, .. }
            | Expression::Like { operand, .. }
            | Expression::IsNull { operand } => operand.collect_identifiers(found),
            Expression::Between {
                value,
                lower,
                upper,
            } => {
                value.collect_identifiers(found);
                lower.collect_identifiers(found);
                upper.collect_identifiers(found);
            }
        }
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    write!(f, "'{}'", s.replace('\'', "''"))
}

impl fmt::Display for Expression {
    /// Infix form, every operator node wrapped in parentheses. The output is
    /// valid selector text and parses back to an identical rendering.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(lit) => write!(f, "{}", lit),
            Expression::Identifier(id) => write!(f, "{}", id),
            Expression::Arith { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op.as_str(), rhs),
            // A bare `-5` reads back as one literal, so keep the operand apart
            Expression::Negate { operand } if matches!(**operand, Expression::Literal(_)) => {
                write!(f, "(-({}))", operand)
            }
            Expression::Negate { operand } => write!(f, "(-{})", operand),
            Expression::Compare { op, lhs, rhs } => {
                write!(f, "({} {} {})", lhs, op.as_str(), rhs)
            }
            Expression::Conditional { op, lhs, rhs } => {
                write!(f, "({} {} {})", lhs, op.as_str(), rhs)
            }
            Expression::Not { operand } => write!(f, "(NOT {})", operand),
            Expression::StringEq { lhs, rhs }
            | Expression::BoolEq { lhs, rhs }
            | Expression::ValueEq { lhs, rhs } => write!(f, "({} = {})", lhs, rhs),
            Expression::Between {
                value,
                lower,
                upper,
            } => write!(f, "({} BETWEEN {} AND {})", value, lower, upper),
            Expression::In { operand, set } => {
                write!(f, "({} IN (", operand)?;
                for (i, member) in set.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_quoted(f, member)?;
                }
                f.write_str("))")
            }
            Expression::Like { operand, pattern } => {
                write!(f, "({} LIKE ", operand)?;
                write_quoted(f, pattern.pattern())?;
                if let Some(escape) = pattern.escape() {
                    f.write_str(" ESCAPE ")?;
                    write_quoted(f, escape.encode_utf8(&mut [0u8; 4]))?;
                }
                f.write_str(")")
            }
            Expression::IsNull { operand } => write!(f, "({} IS NULL)", operand),
        }
    }
}
