use serde::Deserialize;
use serde_json::{Map, Value};

/// Comparison operators allowed in a leaf, in the order a node is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    In,
    Gte,
    Lte,
    Gt,
    Lt,
}

impl CompareOp {
    pub const ALL: [CompareOp; 6] = [
        CompareOp::Eq,
        CompareOp::In,
        CompareOp::Gte,
        CompareOp::Lte,
        CompareOp::Gt,
        CompareOp::Lt,
    ];

    pub fn key(self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::In => "in",
            CompareOp::Gte => "gte",
            CompareOp::Lte => "lte",
            CompareOp::Gt => "gt",
            CompareOp::Lt => "lt",
        }
    }
}

/// Parsed `when` clause.
///
/// Parsing never fails: a node with no recognizable shape becomes
/// [`Condition::Malformed`] and evaluates to `false`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub enum Condition {
    All(Vec<Condition>),
    Any(Vec<Condition>),
    Compare {
        op: CompareOp,
        key: String,
        value: Value,
    },
    Malformed(Value),
}

impl From<Value> for Condition {
    fn from(node: Value) -> Self {
        let Value::Object(map) = node else {
            return Condition::Malformed(node);
        };

        if let Some(Value::Array(children)) = map.get("all") {
            return Condition::All(children.iter().cloned().map(Condition::from).collect());
        }
        if let Some(Value::Array(children)) = map.get("any") {
            return Condition::Any(children.iter().cloned().map(Condition::from).collect());
        }

        for op in CompareOp::ALL {
            let Some(operand) = map.get(op.key()).filter(|v| is_truthy(v)) else {
                continue;
            };
            let leaf = match operand.as_array().map(Vec::as_slice) {
                Some([Value::String(key), value]) => Some((key.clone(), value.clone())),
                _ => None,
            };
            return match leaf {
                Some((key, value)) => Condition::Compare { op, key, value },
                None => Condition::Malformed(Value::Object(map)),
            };
        }

        Condition::Malformed(Value::Object(map))
    }
}

impl Condition {
    pub fn evaluate(&self, record: &Map<String, Value>) -> bool {
        match self {
            Condition::All(children) => children.iter().all(|c| c.evaluate(record)),
            Condition::Any(children) => children.iter().any(|c| c.evaluate(record)),
            Condition::Compare { op, key, value } => compare(*op, record.get(key), value),
            Condition::Malformed(_) => false,
        }
    }

    /// Number of malformed nodes anywhere in this tree.
    pub fn malformed_count(&self) -> usize {
        match self {
            Condition::All(children) | Condition::Any(children) => {
                children.iter().map(Condition::malformed_count).sum()
            }
            Condition::Compare { .. } => 0,
            Condition::Malformed(_) => 1,
        }
    }
}

fn compare(op: CompareOp, actual: Option<&Value>, expected: &Value) -> bool {
    match op {
        CompareOp::Eq => actual.is_some_and(|a| strict_eq(a, expected)),
        CompareOp::In => match (actual, expected) {
            (Some(a), Value::Array(members)) => members.iter().any(|m| strict_eq(a, m)),
            _ => false,
        },
        CompareOp::Gte | CompareOp::Lte | CompareOp::Gt | CompareOp::Lt => {
            let lhs = actual.map_or(f64::NAN, to_number);
            if !lhs.is_finite() {
                return false;
            }
            let rhs = to_number(expected);
            match op {
                CompareOp::Gte => lhs >= rhs,
                CompareOp::Lte => lhs <= rhs,
                CompareOp::Gt => lhs > rhs,
                _ => lhs < rhs,
            }
        }
    }
}

/// Equality without coercion. Numbers compare by value; arrays and objects
/// never compare equal.
fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::String(x), Value::String(y)) => x == y,
        _ => false,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Numeric coercion: `null` is 0, booleans are 0/1, strings are trimmed and
/// parsed (blank is 0), one-element arrays unwrap. Anything else is NaN.
fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(f64::NAN)
            }
        }
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [single] => to_number(single),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}
