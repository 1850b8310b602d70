//! Mutation operations: set, delete, add, subtract, math, push.
//!
//! Each one validates its input, reads the current value, computes the new
//! one and only then writes it back, so a failed call leaves the store
//! untouched. Marking the data dirty is the caller's job.

use crate::error::{Error, Result};
use crate::store::{check_key, Store};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;
use std::str::FromStr;

/// Arithmetic operator accepted by [`math`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MathOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
}

impl MathOp {
    /// The operator's symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            MathOp::Add => "+",
            MathOp::Sub => "-",
            MathOp::Mul => "*",
            MathOp::Div => "/",
            MathOp::Rem => "%",
        }
    }
}

impl FromStr for MathOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "+" => Ok(MathOp::Add),
            "-" => Ok(MathOp::Sub),
            "*" => Ok(MathOp::Mul),
            "/" => Ok(MathOp::Div),
            "%" => Ok(MathOp::Rem),
            "" => Err(Error::InvalidArgument("math operator is empty".into())),
            other => Err(Error::InvalidArgument(format!(
                "unknown math operator '{other}' (expected one of + - * / %)"
            ))),
        }
    }
}

impl fmt::Display for MathOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single mutation, as used in a transaction batch.
///
/// Serializes with a `type` tag so batches can be read straight from JSON:
///
/// ```
/// use json_vault::Operation;
///
/// let ops: Vec<Operation> = serde_json::from_str(r#"[
///     {"type": "set", "key": "hits", "value": 1},
///     {"type": "math", "key": "hits", "operator": "*", "value": 10}
/// ]"#).unwrap();
/// assert_eq!(ops[0], Operation::set("hits", 1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Operation {
    /// Overwrite `key` with `value`.
    Set {
        /// Target key.
        key: String,
        /// New value.
        value: Value,
    },
    /// Remove `key`; fails if it is absent.
    Delete {
        /// Target key.
        key: String,
    },
    /// Add `value` to the number at `key` (absent counts as 0).
    Add {
        /// Target key.
        key: String,
        /// Numeric delta.
        value: Value,
    },
    /// Subtract `value` from the number at `key` (absent counts as 0).
    Subtract {
        /// Target key.
        key: String,
        /// Numeric delta.
        value: Value,
    },
    /// Apply `operator` with `value` to the existing number at `key`.
    Math {
        /// Target key. Must exist.
        key: String,
        /// One of `+ - * / %`.
        operator: String,
        /// Numeric operand.
        value: Value,
    },
    /// Append `value` to the array at `key` (absent starts as `[]`).
    Push {
        /// Target key.
        key: String,
        /// Element to append.
        value: Value,
    },
}

impl Operation {
    /// `set` operation.
    pub fn set(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Operation::Set {
            key: key.into(),
            value: value.into(),
        }
    }

    /// `delete` operation.
    pub fn delete(key: impl Into<String>) -> Self {
        Operation::Delete { key: key.into() }
    }

    /// `add` operation.
    pub fn add(key: impl Into<String>, delta: impl Into<Value>) -> Self {
        Operation::Add {
            key: key.into(),
            value: delta.into(),
        }
    }

    /// `subtract` operation.
    pub fn subtract(key: impl Into<String>, delta: impl Into<Value>) -> Self {
        Operation::Subtract {
            key: key.into(),
            value: delta.into(),
        }
    }

    /// `math` operation.
    pub fn math(
        key: impl Into<String>,
        operator: impl Into<String>,
        operand: impl Into<Value>,
    ) -> Self {
        Operation::Math {
            key: key.into(),
            operator: operator.into(),
            value: operand.into(),
        }
    }

    /// `push` operation.
    pub fn push(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Operation::Push {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Key this operation targets.
    pub fn key(&self) -> &str {
        match self {
            Operation::Set { key, .. }
            | Operation::Delete { key }
            | Operation::Add { key, .. }
            | Operation::Subtract { key, .. }
            | Operation::Math { key, .. }
            | Operation::Push { key, .. } => key,
        }
    }

    /// Apply to `store`, returning the value now at the key (or, for delete,
    /// the value that was removed).
    pub fn apply(&self, store: &mut Store) -> Result<Value> {
        match self {
            Operation::Set { key, value } => set(store, key, value.clone()),
            Operation::Delete { key } => delete(store, key),
            Operation::Add { key, value } => add(store, key, value),
            Operation::Subtract { key, value } => subtract(store, key, value),
            Operation::Math {
                key,
                operator,
                value,
            } => math(store, key, operator, value),
            Operation::Push { key, value } => push(store, key, value.clone()).map(Value::Array),
        }
    }
}

/// Unconditional overwrite. Returns the stored value.
pub fn set(store: &mut Store, key: &str, value: Value) -> Result<Value> {
    check_key(key)?;
    store.set(key.to_owned(), value.clone())?;
    Ok(value)
}

/// Remove `key` and return what was there. Absent keys are [`Error::NotFound`].
pub fn delete(store: &mut Store, key: &str) -> Result<Value> {
    store
        .remove(key)?
        .ok_or_else(|| Error::NotFound(key.to_owned()))
}

/// `current + delta`, treating an absent key as 0.
pub fn add(store: &mut Store, key: &str, delta: &Value) -> Result<Value> {
    step(store, key, MathOp::Add, delta)
}

/// `current - delta`, treating an absent key as 0.
pub fn subtract(store: &mut Store, key: &str, delta: &Value) -> Result<Value> {
    step(store, key, MathOp::Sub, delta)
}

/// `current <operator> operand` on an existing key.
pub fn math(store: &mut Store, key: &str, operator: &str, operand: &Value) -> Result<Value> {
    check_key(key)?;
    let op: MathOp = operator.parse()?;
    let rhs = numeric_operand(operand)?;
    let current = store
        .get(key)?
        .ok_or_else(|| Error::NotFound(key.to_owned()))?;
    let lhs = coerce(key, Some(current))?;
    let result = arithmetic(&lhs, op, rhs)?;
    store.set(key.to_owned(), result.clone())?;
    Ok(result)
}

/// Append to the array at `key`, creating it if absent. Returns the array.
pub fn push(store: &mut Store, key: &str, value: Value) -> Result<Vec<Value>> {
    let mut items = match store.get(key)? {
        None => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => {
            return Err(Error::TypeMismatch(format!(
                "'{key}' holds {}, not an array",
                kind(other)
            )))
        }
    };
    items.push(value);
    store.set(key.to_owned(), Value::Array(items.clone()))?;
    Ok(items)
}

fn step(store: &mut Store, key: &str, op: MathOp, delta: &Value) -> Result<Value> {
    check_key(key)?;
    let rhs = numeric_operand(delta)?;
    let lhs = coerce(key, store.get(key)?)?;
    let result = arithmetic(&lhs, op, rhs)?;
    store.set(key.to_owned(), result.clone())?;
    Ok(result)
}

fn numeric_operand(value: &Value) -> Result<&Number> {
    match value {
        Value::Number(n) => Ok(n),
        other => Err(Error::InvalidArgument(format!(
            "expected a number, got {}",
            kind(other)
        ))),
    }
}

/// Read the stored value as a number. Absent and `null` are 0, booleans are
/// 0/1, strings must hold a decimal number. Arrays and objects can't be
/// coerced.
fn coerce(key: &str, current: Option<&Value>) -> Result<Number> {
    match current {
        None | Some(Value::Null) => Ok(Number::from(0)),
        Some(Value::Number(n)) => Ok(n.clone()),
        Some(Value::Bool(b)) => Ok(Number::from(u8::from(*b))),
        Some(Value::String(s)) => parse_number(s.trim()).ok_or_else(|| {
            Error::InvalidState(format!("'{key}' holds the non-numeric string {s:?}"))
        }),
        Some(other) => Err(Error::InvalidState(format!(
            "'{key}' holds {}, which is not numeric",
            kind(other)
        ))),
    }
}

fn parse_number(s: &str) -> Option<Number> {
    if s.is_empty() {
        return Some(Number::from(0));
    }
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Integer math when both sides are integers and the result is exact and in
/// range, float math otherwise.
fn arithmetic(lhs: &Number, op: MathOp, rhs: &Number) -> Result<Value> {
    if matches!(op, MathOp::Div | MathOp::Rem) && rhs.as_f64() == Some(0.0) {
        return Err(Error::DivisionByZero);
    }

    if let (Some(a), Some(b)) = (lhs.as_i64(), rhs.as_i64()) {
        let exact = match op {
            MathOp::Add => a.checked_add(b),
            MathOp::Sub => a.checked_sub(b),
            MathOp::Mul => a.checked_mul(b),
            MathOp::Div if a.checked_rem(b) == Some(0) => a.checked_div(b),
            MathOp::Div => None,
            MathOp::Rem => a.checked_rem(b),
        };
        if let Some(n) = exact {
            return Ok(Value::from(n));
        }
    }

    let a = lhs.as_f64().unwrap_or(f64::NAN);
    let b = rhs.as_f64().unwrap_or(f64::NAN);
    let r = match op {
        MathOp::Add => a + b,
        MathOp::Sub => a - b,
        MathOp::Mul => a * b,
        MathOp::Div => a / b,
        MathOp::Rem => a % b,
    };
    Number::from_f64(r)
        .map(Value::Number)
        .ok_or_else(|| Error::InvalidState(format!("{a} {op} {b} is not a finite number")))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
