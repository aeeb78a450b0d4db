//! Session repository against a live DynamoDB-compatible endpoint.
//!
//! Expects the `SSKeepaliveSession` table (hash key `sessionId`) to exist.

#[cfg(test)]
mod tests {
    use keepalive_session::{DynamoSessionRepo, Session, SessionRepo};

    use crate::live_client;

    #[test]
    #[ignore = "requires a running DynamoDB endpoint"]
    fn test_should_round_trip_session_against_live_endpoint() {
        let repo = DynamoSessionRepo::new(live_client().unwrap());
        let session = Session {
            session_id: format!("live-{}", uuid::Uuid::new_v4()),
            fcm_device_token: "live-token".to_owned(),
            interval_seconds: 60,
            expire_time: 4_102_444_800,
        };

        assert!(repo.create_session(&session).unwrap());
        assert!(!repo.create_session(&session).unwrap());
        assert!(repo.extend_session(&session.session_id, 4_102_444_900).unwrap());
        let found = repo.find_session(&session.session_id).unwrap().unwrap();
        assert_eq!(found.expire_time, 4_102_444_900);
        assert!(repo.delete_session(&session.session_id).unwrap());
    }
}
