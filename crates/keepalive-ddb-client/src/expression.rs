//! Compiles structured write requests into DynamoDB expressions.
//!
//! Every write produces up to three artifacts: an update expression, a
//! condition expression and the bind-variable table both refer to. Bind names
//! are allocated per request: `:v1, :v2, ...` for update assignments and
//! `:c1, :c2, ...` for equality conditions. Key-existence guards
//! (`attribute_exists` / `attribute_not_exists`) are appended after the
//! caller's condition and joined with `AND`.
//!
//! Attribute names must be bare identifiers outside the reserved-word set and
//! the expression keywords; they are validated before anything is sent.

use keepalive_ddb_model::types::ExpressionAttributeValues;
use keepalive_ddb_model::reserved::EXPRESSION_KEYWORDS;
use keepalive_ddb_model::{
    is_expression_word, is_identifier, is_reserved_word, reserved_keyword_message,
};

use crate::codec::{self, CodecError};
use crate::value::{Record, Value};

/// A predicate a write must satisfy.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Every listed attribute must equal its value. Compiled in input order.
    Equals(Vec<(String, Value)>),
    /// A caller-written expression with its own bind variables.
    Expression {
        /// Expression text, used verbatim.
        expression: String,
        /// Bind variables referenced by `expression`, keyed with their
        /// leading `:`.
        values: Record,
    },
}

impl Condition {
    /// Builds an equality condition.
    pub fn equals<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Equals(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds a raw-expression condition.
    pub fn expression(expression: impl Into<String>, values: Record) -> Self {
        Self::Expression {
            expression: expression.into(),
            values,
        }
    }
}

/// Key-existence guard appended to a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyGuard<'a> {
    /// No guard.
    None,
    /// Row must exist (update, delete).
    Exists(&'a [String]),
    /// Row must not exist (create-style put).
    NotExists(&'a [String]),
}

/// Errors raised while compiling an expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpressionError {
    /// An attribute name is a reserved word.
    #[error("{}", reserved_keyword_message(.0))]
    ReservedKeyword(String),
    /// A caller bind variable clashes with a generated one.
    #[error("Invalid expression: duplicate bind variable {0}")]
    BindCollision(String),
    /// A caller bind variable does not start with `:`.
    #[error("Invalid expression: bind variable {0} must start with ':'")]
    InvalidBindName(String),
    /// An attribute name is empty.
    #[error("Invalid expression: attribute name must not be empty")]
    EmptyAttributeName,
    /// An attribute name is not a bare identifier or is an expression word.
    #[error("Invalid expression: attribute name {0} is not a plain identifier")]
    InvalidAttributeName(String),
    /// An update leaves nothing to set once key attributes are removed.
    #[error("Invalid UpdateExpression: no attributes to update outside the key")]
    EmptyUpdate,
    /// A value could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// A compiled condition expression and its bind variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledCondition {
    /// Condition expression, absent when there is nothing to check.
    pub expression: Option<String>,
    /// Bind variables referenced by `expression`.
    pub values: ExpressionAttributeValues,
}

/// A compiled update: `SET` expression, condition and shared bind table.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledUpdate {
    /// `SET a = :v1, b = :v2` expression.
    pub update_expression: String,
    /// Condition expression including the key-existence guard.
    pub condition_expression: Option<String>,
    /// Bind variables for both expressions.
    pub values: ExpressionAttributeValues,
}

/// Rejects attribute names that cannot appear bare in an expression: empty
/// names, reserved words, non-identifiers (`a.b`, `expire-time`) and
/// expression keywords or function names.
pub fn check_attribute_name(name: &str) -> Result<(), ExpressionError> {
    if name.is_empty() {
        return Err(ExpressionError::EmptyAttributeName);
    }
    if is_reserved_word(name) {
        return Err(ExpressionError::ReservedKeyword(name.to_owned()));
    }
    if !is_identifier(name) || is_expression_word(name) {
        return Err(ExpressionError::InvalidAttributeName(name.to_owned()));
    }
    Ok(())
}

/// Compiles an optional caller condition plus a key guard.
pub fn compile_condition(
    condition: Option<&Condition>,
    guard: KeyGuard<'_>,
) -> Result<CompiledCondition, ExpressionError> {
    let mut clauses = Vec::new();
    let mut values = ExpressionAttributeValues::new();
    let mut raw_clause = None;

    match condition {
        None => {}
        Some(Condition::Equals(pairs)) => {
            for (index, (name, value)) in pairs.iter().enumerate() {
                check_attribute_name(name)?;
                let bind = format!(":c{}", index + 1);
                clauses.push(format!("{name} = {bind}"));
                values.insert(bind, codec::encode_value(value)?);
            }
        }
        Some(Condition::Expression { expression, values: raw }) => {
            check_raw_expression(expression)?;
            for (bind, value) in raw {
                if !bind.starts_with(':') {
                    return Err(ExpressionError::InvalidBindName(bind.clone()));
                }
                values.insert(bind.clone(), codec::encode_value(value)?);
            }
            if !expression.trim().is_empty() {
                raw_clause = Some(clauses.len());
                clauses.push(expression.clone());
            }
        }
    }

    let (function, keys) = match guard {
        KeyGuard::None => ("", &[][..]),
        KeyGuard::Exists(keys) => ("attribute_exists", keys),
        KeyGuard::NotExists(keys) => ("attribute_not_exists", keys),
    };
    for key in keys {
        check_attribute_name(key)?;
        clauses.push(format!("{function}({key})"));
    }

    // AND binds tighter than OR: a raw clause joined with guards must stay one operand.
    if let Some(index) = raw_clause.filter(|_| clauses.len() > 1) {
        clauses[index] = format!("({})", clauses[index]);
    }

    Ok(CompiledCondition {
        expression: (!clauses.is_empty()).then(|| clauses.join(" AND ")),
        values,
    })
}

/// Compiles an update of `item` on the row identified by `key`.
///
/// Key attributes present in `item` are skipped; the row is guarded with
/// `attribute_exists` on every key attribute.
pub fn compile_update(
    key: &Record,
    item: &Record,
    condition: Option<&Condition>,
) -> Result<CompiledUpdate, ExpressionError> {
    let key_names: Vec<String> = key.keys().cloned().collect();
    let compiled = compile_condition(condition, KeyGuard::Exists(&key_names))?;
    let mut values = compiled.values;

    let mut assignments = Vec::new();
    for (name, value) in item.iter().filter(|(name, _)| !key.contains_key(*name)) {
        check_attribute_name(name)?;
        let bind = format!(":v{}", assignments.len() + 1);
        if values.contains_key(&bind) {
            return Err(ExpressionError::BindCollision(bind));
        }
        values.insert(bind.clone(), codec::encode_value(value)?);
        assignments.push(format!("{name} = {bind}"));
    }
    if assignments.is_empty() {
        return Err(ExpressionError::EmptyUpdate);
    }

    Ok(CompiledUpdate {
        update_expression: format!("SET {}", assignments.join(", ")),
        condition_expression: compiled.expression,
        values,
    })
}

/// Checks every bare identifier of a caller-written expression.
///
/// Bind variables (`:x`), name placeholders (`#x`), expression keywords and
/// function names (an identifier followed by `(`) are not attribute names and
/// are skipped.
pub fn check_raw_expression(expression: &str) -> Result<(), ExpressionError> {
    let bytes = expression.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        let b = bytes[pos];
        if b == b':' || b == b'#' {
            pos += 1;
            while pos < bytes.len() && is_ident_byte(bytes[pos]) {
                pos += 1;
            }
            continue;
        }
        if !(b.is_ascii_alphabetic() || b == b'_') {
            pos += 1;
            continue;
        }

        let start = pos;
        while pos < bytes.len() && is_ident_byte(bytes[pos]) {
            pos += 1;
        }
        let word = &expression[start..pos];

        let mut next = pos;
        while next < bytes.len() && bytes[next].is_ascii_whitespace() {
            next += 1;
        }
        let is_function = next < bytes.len() && bytes[next] == b'(';
        let is_keyword = EXPRESSION_KEYWORDS
            .iter()
            .any(|k| k.eq_ignore_ascii_case(word));
        if !is_function && !is_keyword {
            check_attribute_name(word)?;
        }
    }
    Ok(())
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
