//! All-or-nothing transactions against the in-memory engine.

#[cfg(test)]
mod tests {
    use keepalive_ddb_client::{
        Condition, DeleteRequest, PutRequest, StoreError, TransactItem, UpdateRequest, Value, key,
        record,
    };
    use keepalive_ddb_mock::KeySchema;

    use crate::{mock_client_with_table, test_table_name};

    fn create(table: &str, id: &str) -> TransactItem {
        PutRequest::new(table, record([("id", Value::from(id))]))
            .create_only(["id"])
            .into()
    }

    #[test]
    fn test_should_cancel_with_reason_per_item() {
        let table = test_table_name("tx-cancel");
        let (store, client) = mock_client_with_table(&table, KeySchema::hash("id"));
        client
            .put(&PutRequest::new(&table, record([("id", Value::from("b"))])))
            .unwrap();

        let err = client
            .transact_write(&[create(&table, "a"), create(&table, "b"), create(&table, "c")])
            .unwrap_err();

        let StoreError::TransactionCancelled { reasons } = err else {
            panic!("expected a cancelled transaction, got {err:?}");
        };
        let codes: Vec<_> = reasons.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["None", "ConditionalCheckFailed", "None"]);

        // Nothing from the cancelled transaction is visible.
        assert_eq!(store.row_count(&table), Some(1));
        assert_eq!(client.get(&table, &key("id", "a"), true).unwrap().value, None);
        assert_eq!(client.get(&table, &key("id", "c"), true).unwrap().value, None);
    }

    #[test]
    fn test_should_apply_mixed_transaction() {
        let table = test_table_name("tx-apply");
        let (store, client) = mock_client_with_table(&table, KeySchema::hash("id"));
        for id in ["keep", "gone"] {
            client
                .put(&PutRequest::new(
                    &table,
                    record([("id", Value::from(id)), ("revision", Value::from(1))]),
                ))
                .unwrap();
        }

        let items = [
            create(&table, "new"),
            UpdateRequest::new(&table, key("id", "keep"), record([("revision", Value::from(2))]))
                .with_condition(Condition::equals([("revision", 1)]))
                .into(),
            DeleteRequest::new(&table, key("id", "gone")).into(),
        ];
        let response = client.transact_write(&items).unwrap();
        assert_eq!(response.metadata.consumed_capacity, Some(3.0));

        assert_eq!(store.row_count(&table), Some(2));
        let kept = client.get(&table, &key("id", "keep"), true).unwrap().into_value().unwrap();
        assert_eq!(kept["revision"], Value::from(2));
        assert!(client.get(&table, &key("id", "new"), true).unwrap().value.is_some());
    }

    #[test]
    fn test_should_cancel_update_of_missing_row() {
        let table = test_table_name("tx-missing");
        let (store, client) = mock_client_with_table(&table, KeySchema::hash("id"));

        let items = [
            create(&table, "a"),
            UpdateRequest::new(&table, key("id", "ghost"), record([("score", Value::from(1))]))
                .into(),
        ];
        let err = client.transact_write(&items).unwrap_err();
        let StoreError::TransactionCancelled { reasons } = err else {
            panic!("expected a cancelled transaction, got {err:?}");
        };
        assert_eq!(reasons[1].code, "ConditionalCheckFailed");
        assert_eq!(store.row_count(&table), Some(0));
    }

    #[test]
    fn test_should_fail_whole_transaction_on_missing_table() {
        let table = test_table_name("tx-table");
        let (store, client) = mock_client_with_table(&table, KeySchema::hash("id"));

        let err = client
            .transact_write(&[create(&table, "a"), create("missing", "b")])
            .unwrap_err();
        assert!(matches!(err, StoreError::ResourceNotFound(_)), "got {err:?}");
        assert_eq!(store.row_count(&table), Some(0));
    }
}
