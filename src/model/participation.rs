use serde_json::Value;

/// Whether the current identity has already voted on a given code.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Participation {
    /// No participation record exists.
    #[default]
    NotVoted,
    /// The backend returned this participation record.
    Voted(Value),
}

impl Participation {
    /// Interpret the backend's `result` field. The backend signals "no
    /// record" with any falsy value, not only `null`.
    pub fn from_result(result: Option<Value>) -> Self {
        match result {
            Some(record) if is_truthy(&record) => Self::Voted(record),
            _ => Self::NotVoted,
        }
    }

    pub fn has_voted(&self) -> bool {
        matches!(self, Self::Voted(_))
    }
}

/// JavaScript truthiness of a JSON value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
