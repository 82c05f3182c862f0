//! [`ObjectClient`] over the API server's REST interface.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Certificate, Identity, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, Operation};
use crate::resource::{
    namespace_definition, namespace_path, ObjectRef, ResourceKind, SchemaDefinition,
    DEFINITIONS_PATH, NAMESPACES_PATH,
};
use crate::traits::ObjectClient;

const MERGE_PATCH: &str = "application/merge-patch+json";

/// Talks to a Kubernetes-style API server.
#[derive(Clone, Debug)]
pub struct HttpObjectClient {
    http: reqwest::Client,
    server: String,
    token: Option<String>,
}

impl HttpObjectClient {
    /// Build a client from `config`, reading any TLS material it names.
    ///
    /// Fails with [`ClientError::Config`] before any request is made when the
    /// server URL is empty or TLS files cannot be loaded.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let server = config.server.trim_end_matches('/').to_string();
        if server.is_empty() {
            return Err(ClientError::Config("server is empty".into()));
        }

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.insecure_skip_tls_verify);

        if let Some(path) = &config.ca_file {
            let pem = std::fs::read(path)
                .map_err(|e| ClientError::Config(format!("reading {}: {e}", path.display())))?;
            let cert = Certificate::from_pem(&pem)
                .map_err(|e| ClientError::Config(format!("parsing {}: {e}", path.display())))?;
            builder = builder.add_root_certificate(cert);
        }

        match (&config.cert_file, &config.key_file) {
            (Some(cert_path), Some(key_path)) => {
                let mut pem = std::fs::read(cert_path).map_err(|e| {
                    ClientError::Config(format!("reading {}: {e}", cert_path.display()))
                })?;
                let key = std::fs::read(key_path).map_err(|e| {
                    ClientError::Config(format!("reading {}: {e}", key_path.display()))
                })?;
                pem.push(b'\n');
                pem.extend_from_slice(&key);
                let identity = Identity::from_pem(&pem)
                    .map_err(|e| ClientError::Config(format!("client identity: {e}")))?;
                builder = builder.identity(identity);
            }
            (None, None) => {}
            _ => {
                return Err(ClientError::Config(
                    "cert_file and key_file must be set together".into(),
                ));
            }
        }

        let http = builder
            .build()
            .map_err(|e| ClientError::Config(format!("building http client: {e}")))?;

        Ok(Self {
            http,
            server,
            token: config.token.clone(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.server, path));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send `request` and return the body of a successful response.
    ///
    /// Non-success responses are classified into [`ClientError`] here and
    /// nowhere else.
    async fn send(
        &self,
        operation: Operation,
        endpoint: &str,
        request: RequestBuilder,
    ) -> ClientResult<Vec<u8>> {
        let response = request.send().await.map_err(|e| ClientError::Transport {
            operation,
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::Transport {
                operation,
                endpoint: endpoint.to_string(),
                message: format!("reading body: {e}"),
            })?
            .to_vec();

        debug!(%operation, endpoint, status = status.as_u16(), "api request");

        if status.is_success() {
            Ok(body)
        } else {
            Err(classify(operation, endpoint, status, &body))
        }
    }
}

/// The API server's error body.
#[derive(Debug, Default, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Map a failed response onto [`ClientError`].
///
/// The `reason` of a `Status` body wins; the status code is only consulted
/// when the body carries no reason.
fn classify(operation: Operation, endpoint: &str, status: StatusCode, body: &[u8]) -> ClientError {
    let api_status: ApiStatus = serde_json::from_slice(body).unwrap_or_default();
    let resource = endpoint.to_string();

    match api_status.reason.as_deref() {
        Some("AlreadyExists") => return ClientError::AlreadyExists { resource },
        Some("NotFound") => return ClientError::NotFound { resource },
        Some(_) => {}
        None => match status {
            StatusCode::CONFLICT => return ClientError::AlreadyExists { resource },
            StatusCode::NOT_FOUND => return ClientError::NotFound { resource },
            _ => {}
        },
    }

    let message = api_status
        .message
        .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned());
    ClientError::Status {
        operation,
        endpoint: resource,
        code: status.as_u16(),
        message,
    }
}

#[async_trait]
impl ObjectClient for HttpObjectClient {
    async fn create_schema(&self, schema: &SchemaDefinition) -> ClientResult<()> {
        let request = self
            .request(reqwest::Method::POST, DEFINITIONS_PATH)
            .json(&schema.to_definition());
        self.send(Operation::CreateSchema, &schema.path(), request)
            .await
            .map(drop)
    }

    async fn schema_ready(&self, kind: &ResourceKind) -> ClientResult<bool> {
        let path = kind.cluster_path();
        let request = self.request(reqwest::Method::GET, &path);
        match self.send(Operation::SchemaReady, &path, request).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn create_namespace(&self, name: &str) -> ClientResult<()> {
        let request = self
            .request(reqwest::Method::POST, NAMESPACES_PATH)
            .json(&namespace_definition(name));
        self.send(Operation::CreateNamespace, &namespace_path(name), request)
            .await
            .map(drop)
    }

    async fn create_object(&self, object: &ObjectRef, body: &Value) -> ClientResult<()> {
        let request = self
            .request(reqwest::Method::POST, &object.collection_path())
            .json(body);
        self.send(Operation::CreateObject, &object.path(), request)
            .await
            .map(drop)
    }

    async fn get_object(&self, object: &ObjectRef) -> ClientResult<Value> {
        let path = object.path();
        let request = self.request(reqwest::Method::GET, &path);
        let body = self.send(Operation::GetObject, &path, request).await?;
        serde_json::from_slice(&body)
            .map_err(|e| ClientError::Serialization(format!("decoding {path}: {e}")))
    }

    async fn patch_object(&self, object: &ObjectRef, patch: &Value) -> ClientResult<()> {
        let path = object.path();
        let body = serde_json::to_vec(patch)
            .map_err(|e| ClientError::Serialization(format!("encoding patch: {e}")))?;
        let request = self
            .request(reqwest::Method::PATCH, &path)
            .header(CONTENT_TYPE, MERGE_PATCH)
            .body(body);
        self.send(Operation::PatchObject, &path, request)
            .await
            .map(drop)
    }

    async fn delete_object(&self, object: &ObjectRef) -> ClientResult<()> {
        let path = object.path();
        let request = self.request(reqwest::Method::DELETE, &path);
        self.send(Operation::DeleteObject, &path, request)
            .await
            .map(drop)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::body::Bytes;
    use axum::extract::State;
    use axum::http::{HeaderMap, Method, StatusCode as AxumStatus, Uri};
    use axum::response::{IntoResponse, Response};
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::merge::merge_patch;
    use crate::ErrorKind;

    /// A path-keyed stand-in for the API server.
    #[derive(Default)]
    struct FakeApi {
        objects: Mutex<HashMap<String, Value>>,
        authorization: Mutex<Option<String>>,
    }

    fn status(code: AxumStatus, reason: &str) -> Response {
        let body = json!({
            "kind": "Status",
            "status": "Failure",
            "reason": reason,
            "message": format!("{reason} (fake)"),
            "code": code.as_u16(),
        });
        (code, Json(body)).into_response()
    }

    async fn handle(
        State(api): State<Arc<FakeApi>>,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        let path = uri.path().to_string();
        *api.authorization.lock().unwrap() = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let mut objects = api.objects.lock().unwrap();

        match method {
            Method::POST => {
                let body: Value = serde_json::from_slice(&body).unwrap();
                let name = body["metadata"]["name"].as_str().unwrap_or_default();
                let key = format!("{path}/{name}");
                if objects.contains_key(&key) {
                    return status(AxumStatus::CONFLICT, "AlreadyExists");
                }
                objects.insert(key, body.clone());
                (AxumStatus::CREATED, Json(body)).into_response()
            }
            Method::GET => {
                if let Some(obj) = objects.get(&path) {
                    return Json(obj.clone()).into_response();
                }
                // /apis/<group>/<version>/<plural> is served once defined.
                let parts: Vec<&str> = path.trim_start_matches('/').split('/').collect();
                if let ["apis", group, _version, plural] = parts.as_slice() {
                    let definition = format!("{DEFINITIONS_PATH}/{plural}.{group}");
                    if objects.contains_key(&definition) {
                        return Json(json!({"items": []})).into_response();
                    }
                }
                status(AxumStatus::NOT_FOUND, "NotFound")
            }
            Method::PATCH => {
                let content_type = headers
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default();
                if content_type != MERGE_PATCH {
                    return status(AxumStatus::UNSUPPORTED_MEDIA_TYPE, "UnsupportedMediaType");
                }
                let patch: Value = serde_json::from_slice(&body).unwrap();
                match objects.get_mut(&path) {
                    Some(obj) => {
                        merge_patch(obj, &patch);
                        Json(obj.clone()).into_response()
                    }
                    None => status(AxumStatus::NOT_FOUND, "NotFound"),
                }
            }
            Method::DELETE => match objects.remove(&path) {
                Some(_) => Json(json!({"status": "Success"})).into_response(),
                None => status(AxumStatus::NOT_FOUND, "NotFound"),
            },
            _ => status(AxumStatus::METHOD_NOT_ALLOWED, "MethodNotAllowed"),
        }
    }

    async fn spawn_fake() -> (String, Arc<FakeApi>) {
        let api = Arc::new(FakeApi::default());
        let app = Router::new().fallback(handle).with_state(api.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), api)
    }

    fn client_for(server: &str, token: Option<&str>) -> HttpObjectClient {
        let config = ClientConfig {
            server: server.to_string(),
            token: token.map(str::to_string),
            timeout_secs: 5,
            ..ClientConfig::default()
        };
        HttpObjectClient::new(&config).unwrap()
    }

    fn test_object() -> ObjectRef {
        let kind = ResourceKind::from_schema_name("tpr-storage.giantswarm.io", "v1").unwrap();
        ObjectRef::new(kind, "giantswarm", "it")
    }

    #[tokio::test]
    async fn create_reports_already_exists() {
        let (server, _api) = spawn_fake().await;
        let client = client_for(&server, None);

        client.create_namespace("giantswarm").await.unwrap();
        let err = client.create_namespace("giantswarm").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[tokio::test]
    async fn schema_becomes_ready_once_defined() {
        let (server, _api) = spawn_fake().await;
        let client = client_for(&server, None);
        let obj = test_object();

        assert!(!client.schema_ready(&obj.kind).await.unwrap());
        let schema = SchemaDefinition::new(obj.kind.clone(), "test");
        client.create_schema(&schema).await.unwrap();
        assert!(client.schema_ready(&obj.kind).await.unwrap());
        assert!(client.create_schema(&schema).await.unwrap_err().is_already_exists());
    }

    #[tokio::test]
    async fn object_lifecycle_over_http() {
        let (server, api) = spawn_fake().await;
        let client = client_for(&server, Some("s3cret"));
        let obj = test_object();

        let body = json!({"metadata": {"name": "it"}, "data": {}});
        client.create_object(&obj, &body).await.unwrap();
        client
            .patch_object(&obj, &json!({"data": {"/a": "1", "/b": ""}}))
            .await
            .unwrap();
        client
            .patch_object(&obj, &json!({"data": {"/a": null}}))
            .await
            .unwrap();

        let got = client.get_object(&obj).await.unwrap();
        assert_eq!(got["data"], json!({"/b": ""}));
        assert_eq!(
            api.authorization.lock().unwrap().as_deref(),
            Some("Bearer s3cret")
        );

        client.delete_object(&obj).await.unwrap();
        assert!(client.get_object(&obj).await.unwrap_err().is_not_found());
        assert!(client.delete_object(&obj).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn unreachable_server_is_transport() {
        let client = client_for("http://127.0.0.1:9", None);
        let err = client.get_object(&test_object()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("get object"));
    }

    /// A server that accepts requests and answers none of them in time.
    async fn spawn_stalled() -> String {
        let app = Router::new().fallback(|| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            "late"
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn dropped_request_returns_promptly() {
        let server = spawn_stalled().await;
        let client = client_for(&server, None);

        let started = std::time::Instant::now();
        let result =
            tokio::time::timeout(Duration::from_millis(200), client.get_object(&test_object()))
                .await;
        let _elapsed: tokio::time::error::Elapsed = result.unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn request_timeout_is_transport() {
        let server = spawn_stalled().await;
        let config = ClientConfig {
            server,
            timeout_secs: 1,
            ..ClientConfig::default()
        };
        let client = HttpObjectClient::new(&config).unwrap();

        let err = client.get_object(&test_object()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn reason_wins_over_status_code() {
        let conflict = br#"{"kind":"Status","reason":"Conflict","message":"object was modified"}"#;
        let err = classify(Operation::PatchObject, "/x", StatusCode::CONFLICT, conflict);
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(err.to_string().contains("object was modified"));

        let exists = br#"{"kind":"Status","reason":"AlreadyExists"}"#;
        let err = classify(Operation::CreateObject, "/x", StatusCode::CONFLICT, exists);
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn status_code_used_without_reason() {
        let err = classify(Operation::GetObject, "/x", StatusCode::NOT_FOUND, b"gone");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = classify(Operation::CreateObject, "/x", StatusCode::CONFLICT, b"");
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        let err = classify(Operation::GetObject, "/x", StatusCode::FORBIDDEN, b"nope");
        match err {
            ClientError::Status { code, message, .. } => {
                assert_eq!(code, 403);
                assert_eq!(message, "nope");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn config_errors_before_any_request() {
        let config = ClientConfig {
            server: String::new(),
            ..ClientConfig::default()
        };
        assert_eq!(
            HttpObjectClient::new(&config).unwrap_err().kind(),
            ErrorKind::Configuration
        );

        let config = ClientConfig {
            cert_file: Some("/nonexistent/client.crt".into()),
            ..ClientConfig::default()
        };
        assert_eq!(
            HttpObjectClient::new(&config).unwrap_err().kind(),
            ErrorKind::Configuration
        );

        let config = ClientConfig {
            ca_file: Some("/nonexistent/ca.crt".into()),
            ..ClientConfig::default()
        };
        assert_eq!(
            HttpObjectClient::new(&config).unwrap_err().kind(),
            ErrorKind::Configuration
        );
    }
}
