//! Session repository lifecycle on the in-memory engine.

#[cfg(test)]
mod tests {
    use keepalive_ddb_client::{PutRequest, Value, record};
    use keepalive_ddb_mock::KeySchema;
    use keepalive_session::{DynamoSessionRepo, SESSION_TABLE, Session, SessionRepo};

    use crate::mock_client_with_table;

    fn session(id: &str, expire_time: i64) -> Session {
        Session {
            session_id: id.to_owned(),
            fcm_device_token: "device-token".to_owned(),
            interval_seconds: 120,
            expire_time,
        }
    }

    #[test]
    fn test_should_run_session_lifecycle() {
        let (store, client) =
            mock_client_with_table(SESSION_TABLE, KeySchema::hash(Session::ID_ATTRIBUTE));
        let repo = DynamoSessionRepo::new(client);

        assert!(repo.create_session(&session("s-1", 100)).unwrap());
        assert!(!repo.create_session(&session("s-1", 999)).unwrap());
        assert_eq!(repo.find_session("s-1").unwrap(), Some(session("s-1", 100)));

        assert!(repo.extend_session("s-1", 200).unwrap());
        assert_eq!(repo.find_session("s-1").unwrap(), Some(session("s-1", 200)));

        assert!(repo.delete_session("s-1").unwrap());
        assert_eq!(repo.find_session("s-1").unwrap(), None);
        assert!(!repo.extend_session("s-1", 300).unwrap());
        assert_eq!(store.row_count(SESSION_TABLE), Some(0));
    }

    #[test]
    fn test_should_read_session_written_by_raw_put() {
        let (_, client) =
            mock_client_with_table(SESSION_TABLE, KeySchema::hash(Session::ID_ATTRIBUTE));
        let raw = record([
            ("sessionId", Value::from("s-2")),
            ("fcmDeviceToken", Value::from("tok")),
            ("intervalSeconds", Value::from(30)),
            ("expireTime", Value::from(1_700_000_000_i64)),
        ]);
        client.put(&PutRequest::new(SESSION_TABLE, raw)).unwrap();

        let repo = DynamoSessionRepo::new(client);
        let found = repo.find_session("s-2").unwrap().unwrap();
        assert_eq!(found.fcm_device_token, "tok");
        assert_eq!(found.interval_seconds, 30);
        assert!(found.expires_at().is_some());
    }

    #[test]
    fn test_should_use_custom_table() {
        let (_, client) = mock_client_with_table("sessions-alt", KeySchema::hash("sessionId"));
        let repo = DynamoSessionRepo::with_table(client, "sessions-alt");
        assert!(repo.create_session(&session("s-3", 1)).unwrap());
        assert!(repo.find_session("s-3").unwrap().is_some());
    }
}
