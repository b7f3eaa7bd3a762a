use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use serde_json::Value;
use thiserror::Error;

use crate::config::DirectoryConfig;
use crate::domain::identity::errors::DirectoryError;
use crate::domain::identity::models::Credential;
use crate::domain::identity::models::RawGroup;
use crate::domain::identity::models::UserAttributes;
use crate::domain::identity::ports::DirectoryClient;

const USER_MODEL: &str = "res.users";
const GROUP_MODEL: &str = "res.groups";

/// Failure of a single JSON-RPC round trip.
#[derive(Debug, Error)]
enum RpcError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote error: {0}")]
    Remote(String),

    #[error("unexpected response: {0}")]
    Malformed(String),
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'static str,
    params: RpcParams<'a>,
    id: u64,
}

#[derive(Debug, Serialize)]
struct RpcParams<'a> {
    service: &'a str,
    method: &'a str,
    args: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    message: String,
    #[serde(default)]
    data: Option<RpcErrorData>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorData {
    #[serde(default)]
    message: Option<String>,
}

/// Many2one field value: `[id, "display name"]` or `false`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Many2One {
    Set(i64, String),
    Unset(bool),
}

impl Default for Many2One {
    fn default() -> Self {
        Many2One::Unset(false)
    }
}

impl Many2One {
    fn into_pair(self) -> Option<(i64, String)> {
        match self {
            Many2One::Set(id, name) => Some((id, name)),
            Many2One::Unset(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    login: String,
    #[serde(default)]
    company_id: Many2One,
    #[serde(default)]
    groups_id: Vec<i64>,
}

#[derive(Debug, Deserialize)]
struct GroupRecord {
    name: String,
    #[serde(default)]
    category_id: Many2One,
}

/// User directory backed by the ERP's JSON-RPC endpoint.
///
/// Users log in against their own (or the configured) database; every
/// record lookup runs in the configured database as the service account, which is
/// re-authenticated on each call.
pub struct OdooDirectoryClient {
    http: reqwest::Client,
    endpoint: String,
    database: String,
    service_username: String,
    service_password: String,
    next_id: AtomicU64,
}

impl OdooDirectoryClient {
    pub fn new(config: &DirectoryConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(http: reqwest::Client, config: &DirectoryConfig) -> Self {
        Self {
            http,
            endpoint: format!("{}/jsonrpc", config.url.trim_end_matches('/')),
            database: config.database.clone(),
            service_username: config.service_username.clone(),
            service_password: config.service_password.clone(),
            next_id: AtomicU64::new(1),
        }
    }

    async fn call(&self, service: &str, method: &str, args: Value) -> Result<Value, RpcError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            method: "call",
            params: RpcParams {
                service,
                method,
                args,
            },
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RpcError::Transport(format!(
                "directory returned HTTP {}",
                response.status()
            )));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| RpcError::Malformed(e.to_string()))?;

        if let Some(error) = body.error {
            let detail = error
                .data
                .and_then(|d| d.message)
                .unwrap_or(error.message);
            return Err(RpcError::Remote(detail));
        }

        body.result
            .ok_or_else(|| RpcError::Malformed("response carries neither result nor error".to_string()))
    }

    /// `Some(uid)` on success, `None` when the directory rejects the credentials.
    async fn login(
        &self,
        database: &str,
        username: &str,
        password: &str,
    ) -> Result<Option<i64>, RpcError> {
        let result = self
            .call(
                "common",
                "authenticate",
                json!([database, username, password, {}]),
            )
            .await?;

        match result {
            Value::Bool(false) => Ok(None),
            Value::Number(n) => match n.as_i64() {
                Some(uid) if uid > 0 => Ok(Some(uid)),
                Some(_) => Ok(None),
                None => Err(RpcError::Malformed(format!("non-integer uid: {}", n))),
            },
            other => Err(RpcError::Malformed(format!("unexpected uid: {}", other))),
        }
    }

    async fn service_uid(&self) -> Result<i64, RpcError> {
        self.login(&self.database, &self.service_username, &self.service_password)
            .await?
            .ok_or_else(|| RpcError::Remote("service account rejected".to_string()))
    }

    async fn execute_kw<T: DeserializeOwned>(
        &self,
        model: &str,
        method: &str,
        args: Value,
    ) -> Result<T, RpcError> {
        let uid = self.service_uid().await?;

        let result = self
            .call(
                "object",
                "execute_kw",
                json!([self.database, uid, self.service_password, model, method, args]),
            )
            .await?;

        serde_json::from_value(result).map_err(|e| RpcError::Malformed(e.to_string()))
    }

    async fn read_user(&self, user_id: i64) -> Result<UserRecord, RpcError> {
        let records: Vec<UserRecord> = self
            .execute_kw(
                USER_MODEL,
                "read",
                json!([[user_id], ["login", "company_id", "groups_id"]]),
            )
            .await?;

        records
            .into_iter()
            .next()
            .ok_or_else(|| RpcError::Remote(format!("user {} not found", user_id)))
    }

    async fn read_groups(&self, group_ids: &[i64]) -> Result<Vec<RawGroup>, RpcError> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<GroupRecord> = self
            .execute_kw(GROUP_MODEL, "read", json!([group_ids, ["name", "category_id"]]))
            .await?;

        Ok(records
            .into_iter()
            .map(|group| RawGroup {
                name: group.name,
                category: group.category_id.into_pair().map(|(_, name)| name),
            })
            .collect())
    }
}

fn company_of(record: UserRecord, user_id: i64) -> Result<(String, String), RpcError> {
    record
        .company_id
        .into_pair()
        .map(|(id, name)| (id.to_string(), name))
        .ok_or_else(|| RpcError::Malformed(format!("user {} has no company", user_id)))
}

#[async_trait]
impl DirectoryClient for OdooDirectoryClient {
    async fn verify_credentials(&self, credential: &Credential) -> Result<i64, DirectoryError> {
        let database = credential
            .tenant_selector
            .as_deref()
            .unwrap_or(&self.database);

        self.login(database, &credential.username, &credential.secret)
            .await
            .map_err(|e| {
                tracing::error!(
                    username = %credential.username,
                    database = %database,
                    error = %e,
                    "Directory authentication failed"
                );
                DirectoryError::Authentication(e.to_string())
            })?
            .ok_or_else(|| {
                tracing::warn!(username = %credential.username, "Directory rejected credentials");
                DirectoryError::Authentication("invalid credentials".to_string())
            })
    }

    async fn fetch_user_attributes(&self, user_id: i64) -> Result<UserAttributes, DirectoryError> {
        let lookup_failed = |e: RpcError| {
            tracing::error!(user_id, error = %e, "Directory lookup failed");
            DirectoryError::Lookup(e.to_string())
        };

        let record = self
            .read_user(user_id)
            .await
            .map_err(lookup_failed)?;
        let login = record.login.clone();
        let group_ids = record.groups_id.clone();
        let (tenant_id, tenant_name) = company_of(record, user_id).map_err(lookup_failed)?;
        let raw_groups = self.read_groups(&group_ids).await.map_err(lookup_failed)?;

        Ok(UserAttributes {
            login,
            tenant_id,
            tenant_name,
            raw_groups,
        })
    }

    async fn user_exists(&self, user_id: i64) -> bool {
        let count: Result<i64, RpcError> = self
            .execute_kw(USER_MODEL, "search_count", json!([[["id", "=", user_id]]]))
            .await;

        match count {
            Ok(count) => count > 0,
            Err(e) => {
                tracing::error!(user_id, error = %e, "User existence check failed");
                false
            }
        }
    }
}
