//! Store client operations against the in-memory engine.

#[cfg(test)]
mod tests {
    use keepalive_ddb_client::{
        Condition, DeleteRequest, PutRequest, StoreError, UpdateRequest, Value, key, record,
    };
    use keepalive_ddb_model::input::PutItemInput;
    use keepalive_ddb_mock::KeySchema;

    use crate::{mock_client_with_table, test_table_name};

    fn row(id: &str, revision: i64) -> keepalive_ddb_client::Record {
        record([("id", Value::from(id)), ("revision", Value::from(revision))])
    }

    #[test]
    fn test_should_put_get_and_delete_item() {
        let table = test_table_name("crud");
        let (store, client) = mock_client_with_table(&table, KeySchema::hash("id"));

        client.put(&PutRequest::new(&table, row("a", 1))).unwrap();
        let fetched = client.get(&table, &key("id", "a"), true).unwrap().into_value();
        assert_eq!(fetched, Some(row("a", 1)));

        assert!(client.delete(&DeleteRequest::new(&table, key("id", "a"))).unwrap().value);
        assert!(!client.delete(&DeleteRequest::new(&table, key("id", "a"))).unwrap().value);
        assert_eq!(client.get(&table, &key("id", "a"), true).unwrap().value, None);
        assert_eq!(store.row_count(&table), Some(0));
    }

    #[test]
    fn test_should_report_primary_key_violation_on_create_only_put() {
        let table = test_table_name("create");
        let (_, client) = mock_client_with_table(&table, KeySchema::hash("id"));
        let request = PutRequest::new(&table, row("a", 1)).create_only(["id"]);

        client.put(&request).unwrap();
        let err = client.put(&request).unwrap_err();
        assert!(matches!(err, StoreError::PrimaryKeyViolation(_)), "got {err:?}");
    }

    #[test]
    fn test_should_overwrite_with_plain_put() {
        let table = test_table_name("overwrite");
        let (store, client) = mock_client_with_table(&table, KeySchema::hash("id"));

        client.put(&PutRequest::new(&table, row("a", 1))).unwrap();
        client.put(&PutRequest::new(&table, row("a", 2))).unwrap();
        let fetched = client.get(&table, &key("id", "a"), false).unwrap().into_value();
        assert_eq!(fetched, Some(row("a", 2)));
        assert_eq!(store.row_count(&table), Some(1));
    }

    #[test]
    fn test_should_reject_stale_conditional_update() {
        let table = test_table_name("stale");
        let (store, client) = mock_client_with_table(&table, KeySchema::hash("id"));
        client.put(&PutRequest::new(&table, row("a", 1))).unwrap();

        // A concurrent writer bumps the revision between read and write.
        let hook_table = table.clone();
        store.on_next_write(&table, move |store| {
            let input: PutItemInput = PutRequest::new(&hook_table, row("a", 2))
                .to_input()
                .unwrap();
            store.handle_put_item(&input).unwrap();
        });

        let update = UpdateRequest::new(
            &table,
            key("id", "a"),
            record([("score", Value::from(10))]),
        )
        .with_condition(Condition::equals([("revision", 1)]));
        let err = client.update(&update).unwrap_err();
        assert!(matches!(err, StoreError::PreconditionFailed(_)), "got {err:?}");

        let stored = client.get(&table, &key("id", "a"), true).unwrap().into_value();
        assert_eq!(stored, Some(row("a", 2)));
    }

    #[test]
    fn test_should_update_existing_row_only() {
        let table = test_table_name("update");
        let (_, client) = mock_client_with_table(&table, KeySchema::hash("id"));
        client.put(&PutRequest::new(&table, row("a", 1))).unwrap();

        let update = |id: &str| {
            UpdateRequest::new(&table, key("id", id), record([("score", Value::from(5))]))
                .with_condition(Condition::equals([("revision", 1)]))
        };
        client.update(&update("a")).unwrap();
        let stored = client.get(&table, &key("id", "a"), true).unwrap().into_value().unwrap();
        assert_eq!(stored["score"], Value::from(5));
        assert_eq!(stored["revision"], Value::from(1));

        let err = client.update(&update("missing")).unwrap_err();
        assert!(matches!(err, StoreError::PreconditionFailed(_)), "got {err:?}");
    }

    #[test]
    fn test_should_query_partition_of_composite_table() {
        let table = test_table_name("query");
        let (_, client) = mock_client_with_table(&table, KeySchema::composite("pk", "sk"));
        for (pk, sk) in [("A", 1), ("A", 2), ("B", 1)] {
            let item = record([("pk", Value::from(pk)), ("sk", Value::from(sk))]);
            client.put(&PutRequest::new(&table, item)).unwrap();
        }

        let rows = client.query(&table, "pk", "A").unwrap().into_value();
        let sort_keys: Vec<_> = rows.iter().map(|r| r["sk"].as_i64()).collect();
        assert_eq!(sort_keys, vec![Some(1), Some(2)]);

        assert!(client.query(&table, "pk", "C").unwrap().value.is_empty());
        assert_eq!(client.scan(&table).unwrap().value.len(), 3);
    }

    #[test]
    fn test_should_reject_reserved_partition_attribute_in_query() {
        let table = test_table_name("reserved");
        let (_, client) = mock_client_with_table(&table, KeySchema::hash("id"));
        let err = client.query(&table, "name", "x").unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)), "got {err:?}");
    }

    #[test]
    fn test_should_batch_delete_many_rows() {
        let table = test_table_name("batch");
        let (store, client) = mock_client_with_table(&table, KeySchema::hash("id"));
        let keys: Vec<_> = (0..60).map(|i| key("id", format!("row-{i}"))).collect();
        for k in &keys {
            client.put(&PutRequest::new(&table, k.clone())).unwrap();
        }
        assert_eq!(store.row_count(&table), Some(60));

        client.batch_delete(&table, &keys[..55]).unwrap();
        assert_eq!(store.row_count(&table), Some(5));
    }

    #[test]
    fn test_should_report_capacity_in_metadata() {
        let table = test_table_name("capacity");
        let (_, client) = mock_client_with_table(&table, KeySchema::hash("id"));
        let response = client.put(&PutRequest::new(&table, row("a", 1))).unwrap();
        assert_eq!(response.metadata.consumed_capacity, Some(1.0));
        assert_eq!(response.metadata.throttle_retries, 0);
    }

    #[test]
    fn test_should_surface_missing_table() {
        let (_, client) = crate::mock_client();
        assert_eq!(client.get("missing", &key("id", "a"), true).unwrap().value, None);
        let err = client
            .put(&PutRequest::new("missing", row("a", 1)))
            .unwrap_err();
        assert!(matches!(err, StoreError::ResourceNotFound(_)), "got {err:?}");
    }
}
