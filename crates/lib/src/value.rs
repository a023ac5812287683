use std::borrow::Cow;
use std::cmp::Ordering;

/// The effective value of a cell.
///
/// Cells are stored as raw text; their type is derived per comparison by
/// trying each interpretation in order: signed integer, finite float, raw
/// string. `NaN` and the infinities are deliberately left as strings so that
/// every `Float` carries a finite payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    Int(i64),
    Float(f64),
    Str(Cow<'a, str>),
}

impl<'a> Value<'a> {
    /// Coerce a raw cell, borrowing it when it stays a string.
    pub fn coerce(cell: &'a str) -> Value<'a> {
        if let Ok(value) = cell.parse::<i64>() {
            return Value::Int(value);
        }
        if let Ok(value) = cell.parse::<f64>()
            && value.is_finite()
        {
            return Value::Float(value);
        }
        Value::Str(Cow::Borrowed(cell))
    }

    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::Int(value) => Value::Int(value),
            Value::Float(value) => Value::Float(value),
            Value::Str(value) => Value::Str(Cow::Owned(value.into_owned())),
        }
    }

    fn as_float(&self) -> Option<f64> {
        match *self {
            Value::Int(value) => Some(value as f64),
            Value::Float(value) => Some(value),
            Value::Str(_) => None,
        }
    }

    /// Compare two values of compatible kinds. `None` marks an incompatible
    /// pair (string against numeric), which every operator treats as a
    /// non-match instead of an error.
    fn compare(&self, other: &Value<'_>) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(left), Value::Int(right)) => Some(left.cmp(right)),
            (Value::Str(left), Value::Str(right)) => Some(left.as_ref().cmp(right.as_ref())),
            (left, right) => {
                let (left, right) = (left.as_float()?, right.as_float()?);
                // Both sides are finite, so a partial comparison always holds.
                left.partial_cmp(&right)
            }
        }
    }

    /// The total order used by ORDER BY: compatible kinds compare as usual,
    /// numerics sort before strings otherwise.
    pub fn total_cmp(&self, other: &Value<'_>) -> Ordering {
        self.compare(other)
            .unwrap_or_else(|| self.kind_rank().cmp(&other.kind_rank()))
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Int(_) | Value::Float(_) => 0,
            Value::Str(_) => 1,
        }
    }
}

/// The six comparison operators a WHERE clause can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}

impl CmpOp {
    pub fn from_symbol(symbol: &str) -> Option<CmpOp> {
        Some(match symbol {
            "<" => CmpOp::Lt,
            "<=" => CmpOp::Le,
            "=" => CmpOp::Eq,
            "!=" => CmpOp::Ne,
            ">=" => CmpOp::Ge,
            ">" => CmpOp::Gt,
            _ => return None,
        })
    }

    /// Evaluate the operator type-safely: an incompatible pair of operands
    /// yields `false` for every operator, `!=` included.
    pub fn eval(self, lhs: &Value<'_>, rhs: &Value<'_>) -> bool {
        let Some(ordering) = lhs.compare(rhs) else {
            return false;
        };
        match self {
            CmpOp::Lt => ordering == Ordering::Less,
            CmpOp::Le => ordering != Ordering::Greater,
            CmpOp::Eq => ordering == Ordering::Equal,
            CmpOp::Ne => ordering != Ordering::Equal,
            CmpOp::Ge => ordering != Ordering::Less,
            CmpOp::Gt => ordering == Ordering::Greater,
        }
    }
}
