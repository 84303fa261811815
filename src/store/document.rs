// src/store/document.rs
//
// Raw document model shared by every store adapter.
//
// RULES:
// - A missing field never satisfies a predicate
// - Numbers compare by value (1 == 1.0)
// - Range predicates only compare like with like (number/number, text/text)
// - created_at / updated_at belong to the store; caller-supplied values are ignored

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// Field map of a single document
pub type Fields = Map<String, Value>;

pub const CREATED_AT_FIELD: &str = "created_at";
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// A document exactly as the store returns it
#[derive(Debug, Clone, PartialEq)]
pub struct RawDocument {
    pub id: String,
    pub fields: Fields,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

/// A single backend filter clause
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Equals { field: String, value: Value },
    ArrayContainsAny { field: String, values: Vec<Value> },
    GreaterOrEqual { field: String, value: Value },
    LessOrEqual { field: String, value: Value },
}

impl Predicate {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn array_contains_any<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Predicate::ArrayContainsAny {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn greater_or_equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::GreaterOrEqual {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn less_or_equal(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Predicate::LessOrEqual {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Predicate::Equals { field, .. }
            | Predicate::ArrayContainsAny { field, .. }
            | Predicate::GreaterOrEqual { field, .. }
            | Predicate::LessOrEqual { field, .. } => field,
        }
    }

    /// Evaluates the clause against a document's fields
    pub fn matches(&self, fields: &Fields) -> bool {
        let Some(actual) = fields.get(self.field()) else {
            return false;
        };

        match self {
            Predicate::Equals { value, .. } => values_equal(actual, value),
            Predicate::ArrayContainsAny { values, .. } => match actual {
                Value::Array(items) => items
                    .iter()
                    .any(|item| values.iter().any(|v| values_equal(item, v))),
                _ => false,
            },
            Predicate::GreaterOrEqual { value, .. } => matches!(
                comparable_order(actual, value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Predicate::LessOrEqual { value, .. } => matches!(
                comparable_order(actual, value),
                Some(Ordering::Less | Ordering::Equal)
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

/// Everything a `list_records` call needs
#[derive(Debug, Clone, PartialEq)]
pub struct StoreQuery {
    pub collection: String,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
    pub predicates: Vec<Predicate>,
}

impl StoreQuery {
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            order_by: None,
            limit: None,
            predicates: Vec::new(),
        }
    }

    pub fn order_by(mut self, field: impl Into<String>, descending: bool) -> Self {
        self.order_by = Some(OrderBy {
            field: field.into(),
            descending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        self.predicates.iter().all(|p| p.matches(fields))
    }
}

/// Field-level write operation
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOp {
    Set(Value),
    /// Append each value not already present
    ArrayUnion(Vec<Value>),
    /// Drop every element equal to one of the values
    ArrayRemove(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    pub field: String,
    pub op: FieldOp,
}

impl FieldUpdate {
    pub fn set(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FieldOp::Set(value.into()),
        }
    }

    pub fn array_union(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            op: FieldOp::ArrayUnion(values),
        }
    }

    pub fn array_remove(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            field: field.into(),
            op: FieldOp::ArrayRemove(values),
        }
    }
}

// ============================================================================
// SHARED WRITE SEMANTICS
// ============================================================================

/// Timestamp format written by the store (fixed width, sorts lexically)
pub fn server_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn is_server_field(field: &str) -> bool {
    field == CREATED_AT_FIELD || field == UPDATED_AT_FIELD
}

/// Shallow merge of top-level fields
pub fn merge_fields(target: &mut Fields, incoming: Fields) {
    for (key, value) in incoming {
        if is_server_field(&key) {
            continue;
        }
        target.insert(key, value);
    }
}

/// Applies field operations in order.
/// A union or remove on a non-array field replaces it with an array.
pub fn apply_updates(target: &mut Fields, updates: &[FieldUpdate]) {
    for update in updates {
        if is_server_field(&update.field) {
            continue;
        }
        match &update.op {
            FieldOp::Set(value) => {
                target.insert(update.field.clone(), value.clone());
            }
            FieldOp::ArrayUnion(values) => {
                let mut items = take_array(target, &update.field);
                for value in values {
                    if !items.iter().any(|item| values_equal(item, value)) {
                        items.push(value.clone());
                    }
                }
                target.insert(update.field.clone(), Value::Array(items));
            }
            FieldOp::ArrayRemove(values) => {
                let mut items = take_array(target, &update.field);
                items.retain(|item| !values.iter().any(|v| values_equal(item, v)));
                target.insert(update.field.clone(), Value::Array(items));
            }
        }
    }
}

fn take_array(target: &mut Fields, field: &str) -> Vec<Value> {
    match target.remove(field) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

/// `created_at` of an existing document, or `now` for a new one
pub fn preserved_created_at(existing: Option<&Fields>, now: &str) -> String {
    existing
        .and_then(|doc| doc.get(CREATED_AT_FIELD))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| now.to_string())
}

/// Writes the store-owned timestamps
pub fn stamp_timestamps(target: &mut Fields, created_at: &str, updated_at: &str) {
    target.insert(CREATED_AT_FIELD.to_string(), Value::from(created_at));
    target.insert(UPDATED_AT_FIELD.to_string(), Value::from(updated_at));
}

// ============================================================================
// VALUE COMPARISON
// ============================================================================

pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Ordering for range predicates: only numbers with numbers, text with text
fn comparable_order(actual: &Value, bound: &Value) -> Option<Ordering> {
    match (actual, bound) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

/// Total order used for `order_by`: missing < null < bool < number < text
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}
