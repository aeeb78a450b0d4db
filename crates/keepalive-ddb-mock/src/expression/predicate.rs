//! Evaluation of parsed conditions and application of parsed updates.

use keepalive_ddb_model::{AttributeValue, Item};

/// One conjunct of a condition expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `attribute = :bind`.
    Equals {
        /// Attribute name.
        attribute: String,
        /// The resolved bind value.
        value: AttributeValue,
    },
    /// `attribute_exists(attribute)`.
    Exists(String),
    /// `attribute_not_exists(attribute)`.
    NotExists(String),
}

impl Predicate {
    /// Evaluates the predicate against `row`; an absent row is empty.
    #[must_use]
    pub fn accepts(&self, row: Option<&Item>) -> bool {
        let lookup = |name: &str| row.and_then(|r| r.get(name));
        match self {
            Self::Equals { attribute, value } => {
                lookup(attribute).is_some_and(|stored| values_equal(stored, value))
            }
            Self::Exists(attribute) => lookup(attribute).is_some(),
            Self::NotExists(attribute) => lookup(attribute).is_none(),
        }
    }
}

/// Returns `true` when every predicate accepts `row`.
#[must_use]
pub fn accepts_all(predicates: &[Predicate], row: Option<&Item>) -> bool {
    predicates.iter().all(|p| p.accepts(row))
}

/// One `attribute = :bind` assignment of a `SET` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Attribute name.
    pub attribute: String,
    /// The resolved bind value.
    pub value: AttributeValue,
}

/// Applies `assignments` to `row` in order.
pub fn apply_assignments(row: &mut Item, assignments: Vec<Assignment>) {
    for Assignment { attribute, value } in assignments {
        row.insert(attribute, value);
    }
}

/// Compares numbers numerically and everything else structurally.
fn values_equal(a: &AttributeValue, b: &AttributeValue) -> bool {
    match (a, b) {
        (AttributeValue::N(x), AttributeValue::N(y)) => numbers_equal(x, y),
        (AttributeValue::L(x), AttributeValue::L(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| values_equal(a, b))
        }
        (AttributeValue::M(x), AttributeValue::M(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, a)| y.get(k).is_some_and(|b| values_equal(a, b)))
        }
        _ => a == b,
    }
}

#[allow(clippy::float_cmp)]
fn numbers_equal(x: &str, y: &str) -> bool {
    if let (Ok(a), Ok(b)) = (x.trim().parse::<i128>(), y.trim().parse::<i128>()) {
        return a == b;
    }
    match (x.trim().parse::<f64>(), y.trim().parse::<f64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => x == y,
    }
}
