//! HTTP client for the hosted auth and data API
//!
//! Talks to a Supabase-style backend: GoTrue auth endpoints under
//! `/auth/v1`, PostgREST collections under `/rest/v1`, plus the
//! application's own `/api/create-user` endpoint.

use super::error::{AuthError, PersistenceError};
use super::records::{
    FormationRecord, NewUserRecord, Session, SignUpResponse, UserId, UserProfile,
};
use super::traits::{IdentityProvider, PersistenceStore, UserDirectory};
use crate::config::BackendSettings;
use anyhow::Result;
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

/// Client for the hosted backend
pub struct SupabaseClient {
    http: reqwest::Client,
    settings: BackendSettings,
    /// Session of the signed-in user
    session: RwLock<Option<Session>>,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    identities: Option<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
struct AuthSession {
    access_token: String,
    user: AuthUser,
}

/// Sign-up returns a session when no confirmation is needed, the bare user otherwise
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpBody {
    Session(AuthSession),
    User(AuthUser),
}

#[derive(Debug, Deserialize)]
struct CreateUserBody {
    user: UserProfile,
}

impl SupabaseClient {
    /// Create a new client
    pub fn new(settings: BackendSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            http,
            settings,
            session: RwLock::new(None),
        })
    }

    fn auth_url(&self, path: &str) -> String {
        join_url(&self.settings.supabase_url, &format!("auth/v1/{path}"))
    }

    fn rest_url(&self, collection: &str) -> String {
        join_url(&self.settings.supabase_url, &format!("rest/v1/{collection}"))
    }

    fn api_url(&self, path: &str) -> String {
        join_url(&self.settings.api_base_url, path)
    }

    /// Attach the project key and the caller's bearer token
    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let token = match self.session.read().await.as_ref() {
            Some(session) => session.access_token.clone(),
            None => self.settings.anon_key.clone(),
        };
        request
            .header("apikey", &self.settings.anon_key)
            .bearer_auth(token)
    }

    async fn store_session(&self, session: Session) {
        *self.session.write().await = Some(session);
    }
}

/// Join a base URL and a path with exactly one slash between them
fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Pull a human readable message out of an error body
fn error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(|v| v.as_str()))
        .map(str::to_string)
}

async fn failure_message(response: Response) -> (StatusCode, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    (status, message)
}

fn into_session(auth: AuthSession, fallback_email: &str) -> Session {
    Session {
        email: auth
            .user
            .email
            .unwrap_or_else(|| fallback_email.to_string()),
        user_id: auth.user.id,
        access_token: auth.access_token,
    }
}

fn parse_sign_up(body: SignUpBody, email: &str) -> SignUpResponse {
    match body {
        SignUpBody::Session(auth) => {
            let already_registered = auth
                .user
                .identities
                .as_ref()
                .is_some_and(|ids| ids.is_empty());
            let user_id = auth.user.id.clone();
            SignUpResponse {
                user_id,
                session: Some(into_session(auth, email)),
                already_registered,
            }
        }
        SignUpBody::User(user) => SignUpResponse {
            already_registered: user.identities.as_ref().is_some_and(|ids| ids.is_empty()),
            user_id: user.id,
            session: None,
        },
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    async fn current_user_id(&self) -> Option<UserId> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.user_id.clone())
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResponse, AuthError> {
        let request = self
            .http
            .post(self.auth_url("signup"))
            .header("apikey", &self.settings.anon_key)
            .json(&json!({ "email": email, "password": password, "data": { "email": email } }));

        let response = request.send().await?;
        if !response.status().is_success() {
            let (_, message) = failure_message(response).await;
            return Err(AuthError::new(message));
        }

        let body: SignUpBody = response.json().await?;
        let parsed = parse_sign_up(body, email);
        if let Some(session) = &parsed.session {
            self.store_session(session.clone()).await;
        }
        Ok(parsed)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let response = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.settings.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            let (_, message) = failure_message(response).await;
            return Err(AuthError::new(message));
        }

        let auth: AuthSession = response.json().await?;
        let session = into_session(auth, email);
        self.store_session(session.clone()).await;
        Ok(session)
    }

    async fn delete_user(&self, user_id: &str) -> Result<(), AuthError> {
        let Some(service_key) = self.settings.service_role_key.as_deref() else {
            return Err(AuthError::new(format!(
                "No service role key configured, cannot remove user {user_id}"
            )));
        };

        let response = self
            .http
            .delete(self.auth_url(&format!("admin/users/{user_id}")))
            .header("apikey", service_key)
            .bearer_auth(service_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let (_, message) = failure_message(response).await;
            return Err(AuthError::new(message));
        }

        let mut session = self.session.write().await;
        if session.as_ref().is_some_and(|s| s.user_id == user_id) {
            *session = None;
        }
        Ok(())
    }

    async fn sign_out(&self) {
        let request = self.authorized(self.http.post(self.auth_url("logout"))).await;
        match request.send().await {
            Ok(response) if !response.status().is_success() => {
                tracing::warn!("Sign-out returned {}", response.status());
            }
            Err(err) => tracing::warn!("Sign-out request failed: {err}"),
            Ok(_) => {}
        }
        *self.session.write().await = None;
    }
}

#[async_trait]
impl PersistenceStore for SupabaseClient {
    async fn insert(
        &self,
        collection: &str,
        record: &FormationRecord,
    ) -> Result<FormationRecord, PersistenceError> {
        let request = self
            .authorized(self.http.post(self.rest_url(collection)))
            .await
            .header("Prefer", "return=representation")
            .json(record);

        let response = request.send().await?;
        if response.status() == StatusCode::CONFLICT {
            return Err(PersistenceError::Duplicate);
        }
        if !response.status().is_success() {
            let (status, message) = failure_message(response).await;
            return Err(PersistenceError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let rows: Vec<FormationRecord> = response.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| PersistenceError::Decode("insert returned no rows".to_string()))
    }
}

#[async_trait]
impl UserDirectory for SupabaseClient {
    async fn create_user(&self, user: &NewUserRecord) -> Result<UserProfile, PersistenceError> {
        let response = self
            .http
            .post(self.api_url("api/create-user"))
            .json(user)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, message) = failure_message(response).await;
            return Err(PersistenceError::Http {
                status: status.as_u16(),
                message,
            });
        }

        let body: CreateUserBody = response.json().await?;
        Ok(body.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings() -> BackendSettings {
        BackendSettings {
            supabase_url: "https://project.supabase.co/".to_string(),
            anon_key: "anon".to_string(),
            service_role_key: None,
            api_base_url: "http://localhost:3000".to_string(),
            request_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_join_url_normalizes_slashes() {
        assert_eq!(join_url("http://a/", "/b"), "http://a/b");
        assert_eq!(join_url("http://a", "b/c"), "http://a/b/c");
    }

    #[test]
    fn test_endpoint_urls() {
        let client = SupabaseClient::new(settings()).unwrap();
        assert_eq!(
            client.auth_url("signup"),
            "https://project.supabase.co/auth/v1/signup"
        );
        assert_eq!(
            client.rest_url("business_formations"),
            "https://project.supabase.co/rest/v1/business_formations"
        );
        assert_eq!(
            client.api_url("api/create-user"),
            "http://localhost:3000/api/create-user"
        );
    }

    #[test]
    fn test_error_message_prefers_known_keys() {
        assert_eq!(
            error_message(r#"{"msg": "Invalid login credentials"}"#).as_deref(),
            Some("Invalid login credentials")
        );
        assert_eq!(
            error_message(r#"{"error": "invalid_grant", "error_description": "Email not confirmed"}"#)
                .as_deref(),
            Some("Email not confirmed")
        );
        assert_eq!(
            error_message(r#"{"error": "Failed to create user profile"}"#).as_deref(),
            Some("Failed to create user profile")
        );
        assert!(error_message("not json").is_none());
        assert!(error_message(r#"{"code": 500}"#).is_none());
    }

    #[test]
    fn test_parse_sign_up_with_session() {
        let body: SignUpBody = serde_json::from_str(
            r#"{"access_token": "t", "token_type": "bearer",
                "user": {"id": "u-1", "email": "jane@x.com", "identities": [{"id": "i"}]}}"#,
        )
        .unwrap();
        let parsed = parse_sign_up(body, "jane@x.com");
        assert_eq!(parsed.user_id, "u-1");
        assert!(!parsed.already_registered);
        let session = parsed.session.unwrap();
        assert_eq!(session.access_token, "t");
        assert_eq!(session.email, "jane@x.com");
    }

    #[test]
    fn test_parse_sign_up_pending_confirmation() {
        let body: SignUpBody =
            serde_json::from_str(r#"{"id": "u-2", "identities": [{"id": "i"}]}"#).unwrap();
        let parsed = parse_sign_up(body, "jane@x.com");
        assert_eq!(parsed.user_id, "u-2");
        assert!(parsed.session.is_none());
        assert!(!parsed.already_registered);
    }

    #[test]
    fn test_parse_sign_up_existing_user() {
        let body: SignUpBody = serde_json::from_str(r#"{"id": "u-3", "identities": []}"#).unwrap();
        assert!(parse_sign_up(body, "jane@x.com").already_registered);
    }

    #[tokio::test]
    async fn test_no_user_before_sign_in() {
        let client = SupabaseClient::new(settings()).unwrap();
        assert!(client.current_user_id().await.is_none());
    }

    #[tokio::test]
    async fn test_stored_session_provides_user_id() {
        let client = SupabaseClient::new(settings()).unwrap();
        client
            .store_session(Session {
                user_id: "u-1".to_string(),
                email: "jane@x.com".to_string(),
                access_token: "t".to_string(),
            })
            .await;
        assert_eq!(client.current_user_id().await.as_deref(), Some("u-1"));
    }

    #[tokio::test]
    async fn test_delete_user_requires_service_key() {
        let client = SupabaseClient::new(settings()).unwrap();
        let err = client.delete_user("u-1").await.unwrap_err();
        assert!(err.message.contains("service role key"));
    }

    mod http {
        use super::*;
        use crate::state::FormValue;
        use uuid::Uuid;
        use wiremock::matchers::{body_json, header, method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        fn client_for(server: &MockServer) -> SupabaseClient {
            SupabaseClient::new(BackendSettings {
                supabase_url: server.uri(),
                anon_key: "anon".to_string(),
                service_role_key: Some("service".to_string()),
                api_base_url: server.uri(),
                request_timeout: Duration::from_secs(5),
            })
            .unwrap()
        }

        fn pending_record() -> FormationRecord {
            let value = FormValue {
                entity_name: "Acme LLC".to_string(),
                ..Default::default()
            };
            FormationRecord::pending(&value, "u-1".to_string(), Uuid::new_v4())
        }

        fn token_body() -> serde_json::Value {
            json!({
                "access_token": "t-123",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "r-456",
                "user": {
                    "id": "u-1",
                    "aud": "authenticated",
                    "email": "jane@x.com",
                    "identities": [{ "id": "u-1", "provider": "email" }]
                }
            })
        }

        #[tokio::test]
        async fn test_insert_asks_for_the_stored_row() {
            let server = MockServer::start().await;
            let record = pending_record();
            Mock::given(method("POST"))
                .and(path("/rest/v1/business_formations"))
                .and(header("Prefer", "return=representation"))
                .and(header("apikey", "anon"))
                .and(header("Authorization", "Bearer anon"))
                .respond_with(ResponseTemplate::new(201).set_body_json(json!([record])))
                .expect(1)
                .mount(&server)
                .await;

            let client = client_for(&server);
            let stored = client.insert("business_formations", &record).await.unwrap();
            assert_eq!(stored, record);
        }

        #[tokio::test]
        async fn test_insert_conflict_is_duplicate() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/rest/v1/business_formations"))
                .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                    "code": "23505",
                    "message": "duplicate key value violates unique constraint"
                })))
                .mount(&server)
                .await;

            let client = client_for(&server);
            let err = client
                .insert("business_formations", &pending_record())
                .await
                .unwrap_err();
            assert_eq!(err, PersistenceError::Duplicate);
        }

        #[tokio::test]
        async fn test_insert_without_rows_is_decode_error() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/rest/v1/business_formations"))
                .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
                .mount(&server)
                .await;

            let client = client_for(&server);
            let err = client
                .insert("business_formations", &pending_record())
                .await
                .unwrap_err();
            assert!(matches!(err, PersistenceError::Decode(_)), "{err:?}");
        }

        #[tokio::test]
        async fn test_insert_server_error_keeps_status_and_message() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/rest/v1/business_formations"))
                .respond_with(
                    ResponseTemplate::new(400)
                        .set_body_json(json!({ "message": "invalid input value for enum" })),
                )
                .mount(&server)
                .await;

            let client = client_for(&server);
            let err = client
                .insert("business_formations", &pending_record())
                .await
                .unwrap_err();
            assert_eq!(
                err,
                PersistenceError::Http {
                    status: 400,
                    message: "invalid input value for enum".to_string(),
                }
            );
        }

        #[tokio::test]
        async fn test_create_user_posts_profile() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/api/create-user"))
                .and(body_json(json!({
                    "id": "u-1",
                    "email": "jane@x.com",
                    "full_name": "Jane Doe"
                })))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "user": {
                        "id": "u-1",
                        "email": "jane@x.com",
                        "full_name": "Jane Doe",
                        "is_admin": false,
                        "created_at": "2024-05-01T12:00:00Z"
                    }
                })))
                .expect(1)
                .mount(&server)
                .await;

            let client = client_for(&server);
            let user = NewUserRecord {
                id: "u-1".to_string(),
                email: "jane@x.com".to_string(),
                full_name: "Jane Doe".to_string(),
            };
            let profile = client.create_user(&user).await.unwrap();
            assert_eq!(profile.id, "u-1");
            assert_eq!(profile.full_name.as_deref(), Some("Jane Doe"));
            assert!(!profile.is_admin);
        }

        #[tokio::test]
        async fn test_create_user_failure_maps_to_http_error() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/api/create-user"))
                .respond_with(
                    ResponseTemplate::new(500)
                        .set_body_json(json!({ "error": "Failed to create user profile" })),
                )
                .mount(&server)
                .await;

            let client = client_for(&server);
            let user = NewUserRecord {
                id: "u-1".to_string(),
                email: "jane@x.com".to_string(),
                full_name: "Jane Doe".to_string(),
            };
            let err = client.create_user(&user).await.unwrap_err();
            assert_eq!(
                err,
                PersistenceError::Http {
                    status: 500,
                    message: "Failed to create user profile".to_string(),
                }
            );
        }

        #[tokio::test]
        async fn test_sign_in_stores_session_and_authorizes_inserts() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/auth/v1/token"))
                .and(query_param("grant_type", "password"))
                .and(body_json(json!({ "email": "jane@x.com", "password": "password1" })))
                .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
                .expect(1)
                .mount(&server)
                .await;
            let record = pending_record();
            Mock::given(method("POST"))
                .and(path("/rest/v1/business_formations"))
                .and(header("Authorization", "Bearer t-123"))
                .respond_with(ResponseTemplate::new(201).set_body_json(json!([record])))
                .expect(1)
                .mount(&server)
                .await;

            let client = client_for(&server);
            let session = client.sign_in("jane@x.com", "password1").await.unwrap();
            assert_eq!(session.user_id, "u-1");
            assert_eq!(session.access_token, "t-123");
            assert_eq!(client.current_user_id().await.as_deref(), Some("u-1"));

            client.insert("business_formations", &record).await.unwrap();
        }

        #[tokio::test]
        async fn test_sign_in_failure_is_shown_verbatim() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/auth/v1/token"))
                .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                    "error": "invalid_grant",
                    "error_description": "Invalid login credentials"
                })))
                .mount(&server)
                .await;

            let client = client_for(&server);
            let err = client.sign_in("jane@x.com", "wrong").await.unwrap_err();
            assert_eq!(err.message, "Invalid login credentials");
            assert!(client.current_user_id().await.is_none());
        }

        #[tokio::test]
        async fn test_sign_up_with_session() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/auth/v1/signup"))
                .and(header("apikey", "anon"))
                .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
                .mount(&server)
                .await;

            let client = client_for(&server);
            let response = client.sign_up("jane@x.com", "password1").await.unwrap();
            assert_eq!(response.user_id, "u-1");
            assert!(response.session.is_some());
            assert_eq!(client.current_user_id().await.as_deref(), Some("u-1"));
        }

        #[tokio::test]
        async fn test_sign_up_awaiting_confirmation() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/auth/v1/signup"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "id": "u-2",
                    "aud": "authenticated",
                    "email": "jane@x.com",
                    "confirmation_sent_at": "2024-05-01T12:00:00Z",
                    "identities": [{ "id": "u-2", "provider": "email" }]
                })))
                .mount(&server)
                .await;

            let client = client_for(&server);
            let response = client.sign_up("jane@x.com", "password1").await.unwrap();
            assert_eq!(response.user_id, "u-2");
            assert!(response.session.is_none());
            assert!(!response.already_registered);
            assert!(client.current_user_id().await.is_none());
        }

        #[tokio::test]
        async fn test_delete_user_uses_service_key() {
            let server = MockServer::start().await;
            Mock::given(method("DELETE"))
                .and(path("/auth/v1/admin/users/u-1"))
                .and(header("Authorization", "Bearer service"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
                .expect(1)
                .mount(&server)
                .await;

            let client = client_for(&server);
            client.delete_user("u-1").await.unwrap();
        }
    }
}
