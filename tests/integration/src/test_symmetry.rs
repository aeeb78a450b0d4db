//! The client's expression compiler and the engine's interpreter agree.
//!
//! Each case compiles a condition or update with the client, parses the
//! result with the engine and checks the outcome against stored rows.

#[cfg(test)]
mod tests {
    use keepalive_ddb_client::codec;
    use keepalive_ddb_client::expression::{
        self, Condition, ExpressionError as CompileError, KeyGuard,
    };
    use keepalive_ddb_client::{Record, Value, key, record};
    use keepalive_ddb_mock::expression::{
        ExpressionError as ParseError, accepts_all, apply_assignments, parse_condition,
        parse_update,
    };
    use keepalive_ddb_model::types::ExpressionAttributeValues;
    use keepalive_ddb_model::{AttributeValue, Item};

    fn item(record: &Record) -> Item {
        codec::encode(record).unwrap()
    }

    fn accepts(condition: &Condition, guard: KeyGuard<'_>, row: Option<&Record>) -> bool {
        let compiled = expression::compile_condition(Some(condition), guard).unwrap();
        let text = compiled.expression.unwrap();
        let predicates = parse_condition(&text, &compiled.values).unwrap();
        accepts_all(&predicates, row.map(item).as_ref())
    }

    #[test]
    fn test_should_agree_on_equality_conditions() {
        let stored = record([
            ("id", Value::from("a")),
            ("revision", Value::from(3)),
            ("label", Value::from("x")),
        ]);
        let matching = Condition::equals([("revision", Value::from(3)), ("label", Value::from("x"))]);
        let stale = Condition::equals([("revision", Value::from(2))]);
        let wrong_type = Condition::equals([("revision", Value::from("3"))]);

        assert!(accepts(&matching, KeyGuard::None, Some(&stored)));
        assert!(!accepts(&stale, KeyGuard::None, Some(&stored)));
        assert!(!accepts(&wrong_type, KeyGuard::None, Some(&stored)));
        assert!(!accepts(&matching, KeyGuard::None, None));
    }

    #[test]
    fn test_should_agree_on_key_guards() {
        let keys = ["id".to_owned()];
        let stored = record([("id", Value::from("a")), ("revision", Value::from(1))]);
        let condition = Condition::equals([("revision", 1)]);

        assert!(accepts(&condition, KeyGuard::Exists(&keys), Some(&stored)));
        assert!(!accepts(&condition, KeyGuard::Exists(&keys), None));
        assert!(!accepts(&condition, KeyGuard::NotExists(&keys), Some(&stored)));
    }

    #[test]
    fn test_should_agree_on_raw_expressions() {
        let condition = Condition::expression(
            "attribute_exists(id) AND score = :s",
            record([(":s", Value::from(1.5))]),
        );
        let stored = record([("id", Value::from("a")), ("score", Value::from(1.5))]);
        assert!(accepts(&condition, KeyGuard::None, Some(&stored)));
        assert!(!accepts(&condition, KeyGuard::None, None));

        let keys = ["id".to_owned()];
        let guarded = expression::compile_condition(Some(&condition), KeyGuard::Exists(&keys))
            .unwrap()
            .expression
            .unwrap();
        assert_eq!(guarded, "(attribute_exists(id) AND score = :s) AND attribute_exists(id)");
        assert!(accepts(&condition, KeyGuard::Exists(&keys), Some(&stored)));
        assert!(!accepts(&condition, KeyGuard::Exists(&keys), None));
    }

    #[test]
    fn test_should_apply_compiled_update() {
        let row_key = key("id", "a");
        let changes = record([
            ("id", Value::from("ignored")),
            ("score", Value::from(7)),
            ("label", Value::from("y")),
        ]);
        let compiled = expression::compile_update(&row_key, &changes, None).unwrap();

        let assignments = parse_update(&compiled.update_expression, &compiled.values).unwrap();
        let guard = parse_condition(
            compiled.condition_expression.as_deref().unwrap(),
            &compiled.values,
        )
        .unwrap();

        let mut stored = item(&record([("id", Value::from("a")), ("score", Value::from(1))]));
        assert!(accepts_all(&guard, Some(&stored)));
        apply_assignments(&mut stored, assignments);

        let updated = codec::decode(&stored).unwrap();
        assert_eq!(
            updated,
            record([
                ("id", Value::from("a")),
                ("score", Value::from(7)),
                ("label", Value::from("y")),
            ])
        );
    }

    #[test]
    fn test_should_reject_same_reserved_words() {
        let values = ExpressionAttributeValues::from([(
            ":v".to_owned(),
            AttributeValue::S("x".to_owned()),
        )]);
        for word in ["status", "NAME", "Counter", "open"] {
            let compiled = expression::check_attribute_name(word).unwrap_err();
            let parsed = parse_condition(&format!("{word} = :v"), &values).unwrap_err();
            assert_eq!(compiled, CompileError::ReservedKeyword(word.to_owned()));
            assert_eq!(parsed, ParseError::ReservedKeyword(word.to_owned()));
            assert_eq!(compiled.to_string(), parsed.to_string());
        }
        for word in ["revision", "score", "sessionId", "expireTime"] {
            assert!(expression::check_attribute_name(word).is_ok());
            assert!(parse_condition(&format!("{word} = :v"), &values).is_ok());
        }
    }

    #[test]
    fn test_should_reject_same_non_identifier_names() {
        let values = ExpressionAttributeValues::from([(
            ":v".to_owned(),
            AttributeValue::S("x".to_owned()),
        )]);
        for name in ["a.b", "expire-time", "begins_with", "contains", "Size", "remove"] {
            let condition = Condition::equals([(name, "x")]);
            assert!(
                expression::compile_condition(Some(&condition), KeyGuard::None).is_err(),
                "compiler accepted {name}"
            );
            assert!(
                parse_condition(&format!("{name} = :v"), &values).is_err(),
                "interpreter accepted {name}"
            );
        }
    }

    #[test]
    fn test_should_reject_reserved_word_inside_raw_expression() {
        let err = expression::check_raw_expression("attribute_exists(owner)").unwrap_err();
        assert_eq!(err, CompileError::ReservedKeyword("owner".to_owned()));
        let parsed = parse_condition("attribute_exists(owner)", &ExpressionAttributeValues::new());
        assert!(matches!(parsed, Err(ParseError::ReservedKeyword(_))));
    }
}
