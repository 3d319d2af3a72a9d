//! Expression evaluation.
//!
//! There are two ways to supply identifier values: an eager [`Mapping`], or
//! a pull-based [`ValueProvider`] that is asked for each identifier as the
//! walk reaches it, together with a caller-owned correlation token. Both
//! entry points drive the same interpreter through a private resolver.

use crate::expression::operator::ConditionalOp;
use crate::expression::{Expression, Identifier, Truth, Value};
use std::collections::HashMap;

/// Eagerly supplied identifier values, keyed by identifier name
pub type Mapping = HashMap<String, Value>;

/// Resolves identifiers on demand.
///
/// `correlation` is opaque to the evaluator and passed through unchanged on
/// every call, so one stateless provider can serve many messages. A provider
/// that blocks blocks the enclosing evaluation; no timeout is applied.
pub trait ValueProvider<C: ?Sized> {
    fn get_value(&self, identifier: &Identifier, correlation: &C) -> Option<Value>;
}

impl<C: ?Sized, F> ValueProvider<C> for F
where
    F: Fn(&Identifier, &C) -> Option<Value>,
{
    fn get_value(&self, identifier: &Identifier, correlation: &C) -> Option<Value> {
        self(identifier, correlation)
    }
}

trait Resolver {
    fn resolve(&self, identifier: &Identifier) -> Option<Value>;
}

struct MappingResolver<'a>(&'a Mapping);

impl Resolver for MappingResolver<'_> {
    fn resolve(&self, identifier: &Identifier) -> Option<Value> {
        self.0.get(identifier.name()).cloned()
    }
}

struct ProviderResolver<'a, P: ?Sized, C: ?Sized> {
    provider: &'a P,
    correlation: &'a C,
}

impl<P, C> Resolver for ProviderResolver<'_, P, C>
where
    P: ValueProvider<C> + ?Sized,
    C: ?Sized,
{
    fn resolve(&self, identifier: &Identifier) -> Option<Value> {
        self.provider.get_value(identifier, self.correlation)
    }
}

/// Comparison operand check: a missing value is UNKNOWN, a non-number FALSE.
/// An UNKNOWN operand (arithmetic over a missing value) counts as missing.
fn comparable(value: Option<Value>) -> Result<f64, Truth> {
    match value {
        None | Some(Value::Truth(Truth::Unknown)) => Err(Truth::Unknown),
        Some(Value::Number(n)) => Ok(n.as_f64()),
        Some(_) => Err(Truth::False),
    }
}

fn number(value: &Option<Value>) -> Option<f64> {
    value.as_ref().and_then(Value::as_number).map(|n| n.as_f64())
}

/// Boolean equality operand: a boolean value, or the outcome of a
/// predicate once it has settled on TRUE or FALSE
fn boolean(value: &Option<Value>) -> Option<bool> {
    match value {
        Some(Value::Boolean(b)) => Some(*b),
        Some(Value::Truth(Truth::True)) => Some(true),
        Some(Value::Truth(Truth::False)) => Some(false),
        _ => None,
    }
}

/// `=` over values whose types were not known when the tree was built.
/// Like-typed values compare by type; missing or UNKNOWN operands give
/// UNKNOWN; values of different types are never equal.
fn value_equality(lhs: Option<Value>, rhs: Option<Value>) -> Truth {
    match (&lhs, &rhs) {
        (None, _) | (_, None) => Truth::Unknown,
        (Some(Value::Truth(Truth::Unknown)), _) | (_, Some(Value::Truth(Truth::Unknown))) => {
            Truth::Unknown
        }
        (Some(Value::Number(a)), Some(Value::Number(b))) => Truth::from(a.as_f64() == b.as_f64()),
        (Some(Value::String(a)), Some(Value::String(b))) => Truth::from(a == b),
        _ => match (boolean(&lhs), boolean(&rhs)) {
            (Some(a), Some(b)) => Truth::from(a == b),
            _ => Truth::False,
        },
    }
}

fn truth(value: Truth) -> Option<Value> {
    Some(Value::Truth(value))
}

impl Expression {
    /// Evaluate against a mapping. A missing identifier evaluates to `None`.
    pub fn eval(&self, mapping: &Mapping) -> Option<Value> {
        self.eval_in(&MappingResolver(mapping))
    }

    /// Evaluate, pulling identifier values from `provider`.
    pub fn eval_with<P, C>(&self, provider: &P, correlation: &C) -> Option<Value>
    where
        P: ValueProvider<C> + ?Sized,
        C: ?Sized,
    {
        self.eval_in(&ProviderResolver {
            provider,
            correlation,
        })
    }

    /// Evaluate against a mapping and read the result as a truth value.
    pub fn evaluate(&self, mapping: &Mapping) -> Truth {
        Value::to_truth(self.eval(mapping).as_ref())
    }

    /// Evaluate through a provider and read the result as a truth value.
    pub fn evaluate_with<P, C>(&self, provider: &P, correlation: &C) -> Truth
    where
        P: ValueProvider<C> + ?Sized,
        C: ?Sized,
    {
        Value::to_truth(self.eval_with(provider, correlation).as_ref())
    }

    fn eval_in<R: Resolver + ?Sized>(&self, r: &R) -> Option<Value> {
        match self {
            Expression::Literal(lit) => Some(lit.value().clone()),

            Expression::Identifier(id) => r.resolve(id),

            Expression::Arith { op, lhs, rhs } => {
                let lhs = lhs.eval_in(r);
                let rhs = rhs.eval_in(r);
                match (number(&lhs), number(&rhs)) {
                    (Some(a), Some(b)) => Some(Value::from(op.compute(a, b))),
                    _ => truth(Truth::Unknown),
                }
            }

            Expression::Negate { operand } => match number(&operand.eval_in(r)) {
                Some(n) => Some(Value::from(-n)),
                None => truth(Truth::Unknown),
            },

            Expression::Compare { op, lhs, rhs } => {
                let a = match comparable(lhs.eval_in(r)) {
                    Ok(a) => a,
                    Err(t) => return truth(t),
                };
                let b = match comparable(rhs.eval_in(r)) {
                    Ok(b) => b,
                    Err(t) => return truth(t),
                };
                truth(Truth::from(op.compare(a, b)))
            }

            Expression::Conditional { op, lhs, rhs } => {
                let left = Value::to_truth(lhs.eval_in(r).as_ref());
                let result = match op {
                    ConditionalOp::And => {
                        if left != Truth::True {
                            left
                        } else {
                            Value::to_truth(rhs.eval_in(r).as_ref())
                        }
                    }
                    ConditionalOp::Or => {
                        if left == Truth::True {
                            Truth::True
                        } else {
                            match Value::to_truth(rhs.eval_in(r).as_ref()) {
                                Truth::True => Truth::True,
                                right if right.is_unknown() || left.is_unknown() => {
                                    Truth::Unknown
                                }
                                _ => Truth::False,
                            }
                        }
                    }
                };
                truth(result)
            }

            Expression::Not { operand } => {
                truth(Value::to_truth(operand.eval_in(r).as_ref()).negate())
            }

            Expression::StringEq { lhs, rhs } => match (lhs.eval_in(r), rhs.eval_in(r)) {
                (Some(Value::String(a)), Some(Value::String(b))) => truth(Truth::from(a == b)),
                _ => truth(Truth::Unknown),
            },

            Expression::BoolEq { lhs, rhs } => {
                let a = boolean(&lhs.eval_in(r));
                let b = boolean(&rhs.eval_in(r));
                match (a, b) {
                    (Some(a), Some(b)) => truth(Truth::from(a == b)),
                    _ => truth(Truth::Unknown),
                }
            }

            Expression::ValueEq { lhs, rhs } => {
                truth(value_equality(lhs.eval_in(r), rhs.eval_in(r)))
            }

            Expression::Between {
                value,
                lower,
                upper,
            } => {
                let v = number(&value.eval_in(r));
                let lo = number(&lower.eval_in(r));
                let hi = number(&upper.eval_in(r));
                match (v, lo, hi) {
                    (Some(v), Some(lo), Some(hi)) => truth(Truth::from(v >= lo && v <= hi)),
                    _ => truth(Truth::Unknown),
                }
            }

            Expression::In { operand, set } => match operand.eval_in(r) {
                Some(Value::String(s)) => truth(Truth::from(set.contains(&s))),
                _ => truth(Truth::Unknown),
            },

            Expression::Like { operand, pattern } => match operand.eval_in(r) {
                Some(Value::String(s)) => truth(Truth::from(pattern.is_match(&s))),
                _ => truth(Truth::Unknown),
            },

            Expression::IsNull { operand } => truth(Truth::from(operand.eval_in(r).is_none())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::NumericValue;
    use std::cell::Cell;

    fn ident(name: &str) -> Expression {
        Expression::identifier(name).unwrap()
    }

    fn long(text: &str) -> Expression {
        Expression::long(text).unwrap()
    }

    fn boolean(value: bool) -> Expression {
        Expression::boolean(if value { "TRUE" } else { "FALSE" }).unwrap()
    }

    /// A boolean-valued leaf for each truth value: UNKNOWN comes from a
    /// comparison against an unbound identifier.
    fn truth_expr(t: Truth) -> Expression {
        match t {
            Truth::True => boolean(true),
            Truth::False => boolean(false),
            Truth::Unknown => Expression::gt(ident("eval_test_unbound"), long("0")),
        }
    }

    fn mapping(pairs: &[(&str, Value)]) -> Mapping {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_literal_ignores_context() {
        let empty = Mapping::new();
        assert_eq!(
            long("42").eval(&empty),
            Some(Value::Number(NumericValue::Long(42)))
        );
        assert_eq!(
            Expression::string("x").eval(&mapping(&[("x", Value::from(1i32))])),
            Some(Value::from("x"))
        );
    }

    #[test]
    fn test_identifier_lookup() {
        let m = mapping(&[("weight", Value::from(2500i32))]);
        assert_eq!(ident("weight").eval(&m), Some(Value::from(2500i32)));
        assert_eq!(ident("color").eval(&m), None);
    }

    #[test]
    fn test_arithmetic() {
        let m = mapping(&[("a", Value::from(6i32)), ("s", Value::from("x"))]);
        let num = |e: Expression| e.eval(&m).and_then(|v| v.as_number()).map(|n| n.as_f64());

        assert_eq!(num(Expression::add(ident("a"), long("4"))), Some(10.0));
        assert_eq!(num(Expression::sub(ident("a"), long("4"))), Some(2.0));
        assert_eq!(num(Expression::mul(ident("a"), long("4"))), Some(24.0));
        assert_eq!(num(Expression::div(ident("a"), long("4"))), Some(1.5));
        assert_eq!(num(Expression::negate(ident("a"))), Some(-6.0));
        assert_eq!(
            num(Expression::div(ident("a"), long("0"))),
            Some(f64::INFINITY)
        );

        // Non-numeric or missing operands are UNKNOWN, never an error
        for expr in [
            Expression::add(ident("a"), ident("s")),
            Expression::add(ident("missing"), long("1")),
            Expression::negate(ident("s")),
        ] {
            assert_eq!(expr.eval(&m), Some(Value::Truth(Truth::Unknown)));
        }
    }

    #[test]
    fn test_comparison_null_vs_mistyped() {
        let m = mapping(&[("n", Value::from(5i64)), ("s", Value::from("5"))]);

        for op_expr in [
            Expression::eq as fn(Expression, Expression) -> Expression,
            Expression::gt,
            Expression::ge,
            Expression::lt,
            Expression::le,
        ] {
            // Missing operand on either side: UNKNOWN
            assert_eq!(op_expr(ident("missing"), long("1")).evaluate(&m), Truth::Unknown);
            assert_eq!(op_expr(long("1"), ident("missing")).evaluate(&m), Truth::Unknown);
            // Non-numeric operand on either side: FALSE
            assert_eq!(op_expr(ident("s"), long("1")).evaluate(&m), Truth::False);
            assert_eq!(op_expr(long("1"), ident("s")).evaluate(&m), Truth::False);
        }

        assert_eq!(Expression::eq(ident("n"), long("5")).evaluate(&m), Truth::True);
        assert_eq!(Expression::gt(ident("n"), long("5")).evaluate(&m), Truth::False);
        assert_eq!(Expression::ge(ident("n"), long("5")).evaluate(&m), Truth::True);
        assert_eq!(Expression::lt(ident("n"), long("6")).evaluate(&m), Truth::True);
        assert_eq!(Expression::le(ident("n"), long("4")).evaluate(&m), Truth::False);

        // Widths are compared as doubles
        let m = mapping(&[("b", Value::from(5i8)), ("f", Value::from(5.0f32))]);
        assert_eq!(Expression::eq(ident("b"), ident("f")).evaluate(&m), Truth::True);
    }

    #[test]
    fn test_and_or_tables() {
        use Truth::*;
        let empty = Mapping::new();
        let all = [True, False, Unknown];

        for l in all {
            for r in all {
                let and = Expression::and(truth_expr(l), truth_expr(r)).evaluate(&empty);
                let expected_and = match (l, r) {
                    (False, _) => False,
                    (Unknown, _) => Unknown,
                    (True, r) => r,
                };
                assert_eq!(and, expected_and, "{} AND {}", l, r);

                let or = Expression::or(truth_expr(l), truth_expr(r)).evaluate(&empty);
                let expected_or = match (l, r) {
                    (True, _) | (_, True) => True,
                    (Unknown, _) | (_, Unknown) => Unknown,
                    _ => False,
                };
                assert_eq!(or, expected_or, "{} OR {}", l, r);
            }
        }
    }

    #[test]
    fn test_not() {
        let empty = Mapping::new();
        for t in [Truth::True, Truth::False, Truth::Unknown] {
            assert_eq!(Expression::not(truth_expr(t)).evaluate(&empty), t.negate());
            assert_eq!(
                Expression::not(Expression::not(truth_expr(t))).evaluate(&empty),
                t
            );
        }
    }

    #[test]
    fn test_short_circuit_skips_provider_calls() {
        let calls = Cell::new(0);
        let provider = |id: &Identifier, _: &()| {
            calls.set(calls.get() + 1);
            match id.name() {
                "probe" => Some(Value::from(1i32)),
                _ => None,
            }
        };
        let probe = || Expression::eq(ident("probe"), long("1"));

        Expression::and(boolean(false), probe()).evaluate_with(&provider, &());
        assert_eq!(calls.get(), 0);

        Expression::and(truth_expr(Truth::Unknown), probe()).evaluate_with(&provider, &());
        // The UNKNOWN side itself asked the provider once
        assert_eq!(calls.get(), 1);

        calls.set(0);
        Expression::or(boolean(true), probe()).evaluate_with(&provider, &());
        assert_eq!(calls.get(), 0);

        assert_eq!(
            Expression::or(boolean(false), probe()).evaluate_with(&provider, &()),
            Truth::True
        );
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_comparison_skips_rhs_when_lhs_fails() {
        let calls = Cell::new(0);
        let provider = |id: &Identifier, _: &()| {
            calls.set(calls.get() + 1);
            match id.name() {
                "text" => Some(Value::from("abc")),
                _ => Some(Value::from(1i32)),
            }
        };
        let expr = Expression::gt(ident("text"), ident("other"));
        assert_eq!(expr.evaluate_with(&provider, &()), Truth::False);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_string_and_bool_equality() {
        let m = mapping(&[
            ("s", Value::from("car")),
            ("b", Value::from(true)),
            ("n", Value::from(1i32)),
        ]);
        assert_eq!(
            Expression::string_eq(ident("s"), Expression::string("car")).evaluate(&m),
            Truth::True
        );
        assert_eq!(
            Expression::string_eq(ident("s"), Expression::string("Car")).evaluate(&m),
            Truth::False
        );
        assert_eq!(
            Expression::string_eq(ident("n"), Expression::string("1")).evaluate(&m),
            Truth::Unknown
        );
        assert_eq!(
            Expression::string_eq(ident("missing"), Expression::string("x")).evaluate(&m),
            Truth::Unknown
        );

        assert_eq!(Expression::bool_eq(ident("b"), boolean(true)).evaluate(&m), Truth::True);
        assert_eq!(Expression::bool_eq(ident("b"), boolean(false)).evaluate(&m), Truth::False);
        assert_eq!(Expression::bool_eq(ident("s"), boolean(true)).evaluate(&m), Truth::Unknown);
    }

    #[test]
    fn test_between() {
        let between = |v: i64| {
            let m = mapping(&[("v", Value::from(v))]);
            Expression::between(ident("v"), long("1"), long("10")).evaluate(&m)
        };
        assert_eq!(between(5), Truth::True);
        assert_eq!(between(1), Truth::True);
        assert_eq!(between(10), Truth::True);
        assert_eq!(between(0), Truth::False);
        assert_eq!(between(15), Truth::False);

        let m = mapping(&[("s", Value::from("5"))]);
        assert_eq!(
            Expression::between(ident("s"), long("1"), long("10")).evaluate(&m),
            Truth::Unknown
        );
        assert_eq!(
            Expression::between(long("5"), long("1"), ident("missing")).evaluate(&m),
            Truth::Unknown
        );
    }

    #[test]
    fn test_in() {
        let expr = Expression::in_list(ident("v"), ["A", "B", "C"]);
        let eval = |v: Value| expr.evaluate(&mapping(&[("v", v)]));
        assert_eq!(eval(Value::from("B")), Truth::True);
        assert_eq!(eval(Value::from("D")), Truth::False);
        assert_eq!(eval(Value::from(2i32)), Truth::Unknown);
        assert_eq!(expr.evaluate(&Mapping::new()), Truth::Unknown);
    }

    #[test]
    fn test_like() {
        let like = |pattern: &str, escape: Option<&str>, input: &str| {
            Expression::like(
                ident("v"),
                Expression::string(pattern),
                escape.map(Expression::string),
            )
            .unwrap()
            .evaluate(&mapping(&[("v", Value::from(input))]))
        };
        assert_eq!(like("foo%", None, "foobar"), Truth::True);
        assert_eq!(like("foo%", None, "xfoobar"), Truth::False);
        assert_eq!(like("a_c", None, "abc"), Truth::True);
        assert_eq!(like("a_c", None, "ac"), Truth::False);
        assert_eq!(like("100\\%", Some("\\"), "100%"), Truth::True);
        assert_eq!(like("100\\%", Some("\\"), "100x"), Truth::False);

        let expr = Expression::like(ident("v"), Expression::string("%"), None).unwrap();
        assert_eq!(
            expr.evaluate(&mapping(&[("v", Value::from(3i32))])),
            Truth::Unknown
        );
    }

    #[test]
    fn test_is_null_is_total() {
        let m = mapping(&[("present", Value::from(false))]);
        assert_eq!(Expression::is_null(ident("missing")).evaluate(&m), Truth::True);
        assert_eq!(Expression::is_null(ident("present")).evaluate(&m), Truth::False);
        assert_eq!(
            Expression::not(Expression::is_null(ident("present"))).evaluate(&m),
            Truth::True
        );
    }

    #[test]
    fn test_provider_receives_correlation() {
        struct Record {
            id: u32,
        }
        let provider = |id: &Identifier, rec: &Record| match id.name() {
            "record_id" => Some(Value::from(rec.id as i64)),
            _ => None,
        };
        let expr = Expression::eq(ident("record_id"), long("7"));
        assert_eq!(expr.evaluate_with(&provider, &Record { id: 7 }), Truth::True);
        assert_eq!(expr.evaluate_with(&provider, &Record { id: 8 }), Truth::False);
    }

    #[test]
    fn test_both_modes_agree() {
        let expr = Expression::and(
            Expression::gt(Expression::mul(ident("x"), long("2")), long("5")),
            Expression::in_list(ident("y"), ["a", "b"]),
        );
        let m = mapping(&[("x", Value::from(3i32)), ("y", Value::from("b"))]);
        let provider = |id: &Identifier, m: &Mapping| m.get(id.name()).cloned();
        assert_eq!(expr.evaluate(&m), Truth::True);
        assert_eq!(expr.evaluate_with(&provider, &m), Truth::True);
    }

    #[test]
    fn test_bool_equality_over_predicates() {
        let m = mapping(&[("x", Value::from(5i32))]);
        let above = || Expression::gt(ident("x"), long("1"));

        assert_eq!(Expression::bool_eq(above(), boolean(true)).evaluate(&m), Truth::True);
        assert_eq!(Expression::bool_eq(above(), boolean(false)).evaluate(&m), Truth::False);
        assert_eq!(
            Expression::not(Expression::bool_eq(above(), boolean(false))).evaluate(&m),
            Truth::True
        );
        assert_eq!(
            Expression::bool_eq(truth_expr(Truth::Unknown), boolean(true)).evaluate(&m),
            Truth::Unknown
        );
    }

    #[test]
    fn test_value_equality_follows_bound_types() {
        let eq = || Expression::value_eq(ident("p"), ident("q"));
        let check = |p: Value, q: Value| eq().evaluate(&mapping(&[("p", p), ("q", q)]));

        assert_eq!(check(Value::from("car"), Value::from("car")), Truth::True);
        assert_eq!(check(Value::from("car"), Value::from("van")), Truth::False);
        assert_eq!(check(Value::from(true), Value::from(true)), Truth::True);
        assert_eq!(check(Value::from(true), Value::from(false)), Truth::False);
        assert_eq!(check(Value::from(3i32), Value::from(3.0f64)), Truth::True);
        assert_eq!(check(Value::from(3i32), Value::from(4i64)), Truth::False);
        assert_eq!(check(Value::from("3"), Value::from(3i32)), Truth::False);
        assert_eq!(check(Value::from(true), Value::from("true")), Truth::False);

        let only_p = mapping(&[("p", Value::from("car"))]);
        assert_eq!(eq().evaluate(&only_p), Truth::Unknown);
        assert_eq!(Expression::not(eq()).evaluate(&only_p), Truth::Unknown);
    }

    #[test]
    fn test_unknown_arithmetic_compares_as_missing() {
        let empty = Mapping::new();
        let sum = || Expression::add(ident("eval_test_absent"), long("1"));

        assert_eq!(Expression::gt(sum(), long("3")).evaluate(&empty), Truth::Unknown);
        assert_eq!(Expression::lt(long("3"), sum()).evaluate(&empty), Truth::Unknown);
        assert_eq!(
            Expression::not(Expression::gt(sum(), long("3"))).evaluate(&empty),
            Truth::Unknown
        );
        assert_eq!(
            Expression::between(sum(), long("0"), long("9")).evaluate(&empty),
            Truth::Unknown
        );

        // The arithmetic result is UNKNOWN rather than absent
        assert_eq!(Expression::is_null(sum()).evaluate(&empty), Truth::False);

        // A mistyped operand still makes the comparison FALSE
        let m = mapping(&[("s", Value::from("x"))]);
        assert_eq!(Expression::gt(ident("s"), long("3")).evaluate(&m), Truth::False);
    }
}
