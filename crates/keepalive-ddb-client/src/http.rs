//! Blocking HTTP transport speaking the DynamoDB JSON 1.0 protocol.
//!
//! Every operation is a `POST /` with an `X-Amz-Target` header naming the
//! operation and a JSON body. Errors come back as a non-2xx status with a body
//! such as:
//!
//! ```json
//! {"__type": "com.amazonaws.dynamodb.v20120810#ConditionalCheckFailedException",
//!  "message": "The conditional request failed"}
//! ```

use chrono::Utc;
use keepalive_ddb_model::input::{
    BatchWriteItemInput, DeleteItemInput, GetItemInput, PutItemInput, QueryInput, ScanInput,
    TransactWriteItemsInput, UpdateItemInput,
};
use keepalive_ddb_model::output::{
    BatchWriteItemOutput, DeleteItemOutput, GetItemOutput, PutItemOutput, QueryOutput, ScanOutput,
    TransactWriteItemsOutput, UpdateItemOutput,
};
use keepalive_ddb_model::{CancellationReason, ErrorCode, ServiceError, StoreOperation};
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::StoreConfig;
use crate::signing::{self, Credentials, SigningRequest};
use crate::transport::{Transport, TransportError};

const CONTENT_TYPE: &str = "application/x-amz-json-1.0";
const SERVICE: &str = "dynamodb";

/// Transport backed by a real (or emulated) DynamoDB endpoint.
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    url: Url,
    host: String,
    region: String,
    credentials: Option<Credentials>,
}

impl HttpTransport {
    /// Builds a transport from configuration.
    pub fn new(config: &StoreConfig) -> Result<Self, TransportError> {
        let url = Url::parse(&config.endpoint).map_err(|e| TransportError::Endpoint {
            endpoint: config.endpoint.clone(),
            reason: e.to_string(),
        })?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{host}:{port}"),
            (Some(host), None) => host.to_owned(),
            (None, _) => {
                return Err(TransportError::Endpoint {
                    endpoint: config.endpoint.clone(),
                    reason: "missing host".to_owned(),
                });
            }
        };
        let client = Client::builder().timeout(config.http_timeout()).build()?;
        Ok(Self {
            client,
            url,
            host,
            region: config.region.clone(),
            credentials: config.credentials(),
        })
    }

    fn call<I, O>(&self, operation: StoreOperation, input: &I) -> Result<O, TransportError>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        let body = serde_json::to_vec(input)?;
        let target = operation.target();
        let now = Utc::now();
        let amz_date = signing::amz_date(&now);

        let mut headers: Vec<(&str, &str)> = vec![
            ("content-type", CONTENT_TYPE),
            ("host", &self.host),
            ("x-amz-date", &amz_date),
            ("x-amz-target", &target),
        ];
        if let Some(token) = self
            .credentials
            .as_ref()
            .and_then(|c| c.session_token.as_deref())
        {
            headers.push(("x-amz-security-token", token));
        }
        let authorization = self.credentials.as_ref().map(|credentials| {
            signing::authorization_header(
                &SigningRequest {
                    method: "POST",
                    path: self.url.path(),
                    headers: &headers,
                    payload: &body,
                },
                credentials,
                &self.region,
                SERVICE,
                &now,
            )
        });

        let invocation_id = uuid::Uuid::new_v4().to_string();
        let mut request = self
            .client
            .post(self.url.clone())
            .header("amz-sdk-invocation-id", invocation_id.as_str());
        for (name, value) in &headers {
            // reqwest derives Host from the URL.
            if *name != "host" {
                request = request.header(*name, *value);
            }
        }
        if let Some(authorization) = authorization {
            request = request.header("authorization", authorization);
        }

        let response = request.body(body).send()?;
        let status = response.status();
        let bytes = response.bytes()?;
        debug!(
            %operation,
            status = status.as_u16(),
            invocation_id,
            "received response"
        );

        if status.is_success() {
            return Ok(serde_json::from_slice(&bytes)?);
        }
        Err(parse_error_body(status.as_u16(), &bytes))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
    #[serde(rename = "CancellationReasons", default)]
    cancellation_reasons: Vec<CancellationReason>,
}

/// Turns a non-2xx response into a [`TransportError`].
///
/// Bodies without a `__type` are reported as raw status errors.
fn parse_error_body(status: u16, body: &[u8]) -> TransportError {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody {
            error_type: Some(error_type),
            message,
            cancellation_reasons,
        }) => {
            let code = ErrorCode::from_name(&error_type);
            let mut error = match message {
                Some(message) => ServiceError::with_message(code, message),
                None => ServiceError::new(code),
            };
            error.cancellation_reasons = cancellation_reasons;
            TransportError::Service(error)
        }
        _ => TransportError::Status {
            status,
            body: String::from_utf8_lossy(body).into_owned(),
        },
    }
}

impl Transport for HttpTransport {
    fn get_item(&self, input: &GetItemInput) -> Result<GetItemOutput, TransportError> {
        self.call(StoreOperation::GetItem, input)
    }

    fn put_item(&self, input: &PutItemInput) -> Result<PutItemOutput, TransportError> {
        self.call(StoreOperation::PutItem, input)
    }

    fn update_item(&self, input: &UpdateItemInput) -> Result<UpdateItemOutput, TransportError> {
        self.call(StoreOperation::UpdateItem, input)
    }

    fn delete_item(&self, input: &DeleteItemInput) -> Result<DeleteItemOutput, TransportError> {
        self.call(StoreOperation::DeleteItem, input)
    }

    fn batch_write_item(
        &self,
        input: &BatchWriteItemInput,
    ) -> Result<BatchWriteItemOutput, TransportError> {
        self.call(StoreOperation::BatchWriteItem, input)
    }

    fn transact_write_items(
        &self,
        input: &TransactWriteItemsInput,
    ) -> Result<TransactWriteItemsOutput, TransportError> {
        self.call(StoreOperation::TransactWriteItems, input)
    }

    fn query(&self, input: &QueryInput) -> Result<QueryOutput, TransportError> {
        self.call(StoreOperation::Query, input)
    }

    fn scan(&self, input: &ScanInput) -> Result<ScanOutput, TransportError> {
        self.call(StoreOperation::Scan, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_service_error_body() {
        let body = br#"{"__type":"com.amazonaws.dynamodb.v20120810#ResourceNotFoundException","message":"Requested resource not found"}"#;
        let TransportError::Service(err) = parse_error_body(400, body) else {
            panic!("expected service error");
        };
        assert_eq!(err.code, ErrorCode::ResourceNotFoundException);
        assert_eq!(err.message, "Requested resource not found");
    }

    #[test]
    fn test_should_parse_cancellation_reasons() {
        let body = br#"{"__type":"com.amazonaws.dynamodb.v20120810#TransactionCanceledException","Message":"Transaction cancelled","CancellationReasons":[{"Code":"None"},{"Code":"ConditionalCheckFailed","Message":"The conditional request failed"},{"Code":"None"}]}"#;
        let TransportError::Service(err) = parse_error_body(400, body) else {
            panic!("expected service error");
        };
        assert_eq!(err.code, ErrorCode::TransactionCanceledException);
        let codes: Vec<&str> = err.cancellation_reasons.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, ["None", "ConditionalCheckFailed", "None"]);
    }

    #[test]
    fn test_should_report_unparsable_body_as_status() {
        let err = parse_error_body(503, b"<html>unavailable</html>");
        assert!(matches!(err, TransportError::Status { status: 503, .. }));
    }

    #[test]
    fn test_should_reject_endpoint_without_host() {
        let config = StoreConfig::builder().endpoint("unix:/tmp/socket".into()).build();
        assert!(matches!(
            HttpTransport::new(&config),
            Err(TransportError::Endpoint { .. })
        ));
    }

    #[test]
    fn test_should_include_port_in_host() {
        let config = StoreConfig::builder()
            .endpoint("http://localhost:4566".into())
            .build();
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.host, "localhost:4566");
    }
}
