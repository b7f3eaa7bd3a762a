#![allow(dead_code)]

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use auth::Identity;
use auth::TokenCodec;
use auth_gateway::config::DirectoryConfig;
use auth_gateway::domain::identity::cache::ValidationCache;
use auth_gateway::domain::identity::roles::RoleMappingTable;
use auth_gateway::domain::identity::roles::RoleResolver;
use auth_gateway::domain::identity::service::AuthService;
use auth_gateway::inbound::http::router::create_router;
use auth_gateway::outbound::clock::SystemClock;
use auth_gateway::outbound::directory::CachedDirectoryClient;
use auth_gateway::outbound::directory::OdooDirectoryClient;
use serde_json::json;
use serde_json::Value;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::Request;
use wiremock::Respond;
use wiremock::ResponseTemplate;

pub const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const ISSUER: &str = "neuroerp-auth";
pub const TOKEN_TTL_SECONDS: i64 = 3600;

pub const DATABASE: &str = "neuroerp";
pub const SERVICE_USERNAME: &str = "svc-auth";
pub const SERVICE_PASSWORD: &str = "svc-secret";
const SERVICE_UID: i64 = 1;

#[derive(Debug, Clone)]
pub struct FakeUser {
    pub id: i64,
    pub login: String,
    pub password: String,
    pub database: String,
    pub company: Option<(i64, String)>,
    pub group_ids: Vec<i64>,
}

#[derive(Debug, Clone)]
pub struct FakeGroup {
    pub name: String,
    pub category: Option<(i64, String)>,
}

/// In-memory stand-in for the ERP JSON-RPC endpoint.
#[derive(Debug, Clone, Default)]
pub struct FakeOdoo {
    users: Vec<FakeUser>,
    groups: HashMap<i64, FakeGroup>,
    failing_lookups: bool,
}

impl FakeOdoo {
    /// Directory with alice (sales admin) and carol in the default database,
    /// bob only in a second tenant database under carol's uid, and dora
    /// mirrored with the same uid in both.
    pub fn seeded() -> Self {
        Self::default()
            .with_group(10, "Administrator", Some((5, "Sales")))
            .with_group(11, "Internal User", Some((6, "User types")))
            .with_group(12, "Field Service", None)
            .with_user(FakeUser {
                id: 42,
                login: "alice".to_string(),
                password: "wonderland".to_string(),
                database: DATABASE.to_string(),
                company: Some((3, "Landhandel Nord".to_string())),
                group_ids: vec![10, 11, 12],
            })
            .with_user(FakeUser {
                id: 7,
                login: "bob".to_string(),
                password: "builder".to_string(),
                database: "tenant_sued".to_string(),
                company: Some((9, "Agrar Sued".to_string())),
                group_ids: vec![],
            })
            .with_user(FakeUser {
                id: 7,
                login: "carol".to_string(),
                password: "cheshire".to_string(),
                database: DATABASE.to_string(),
                company: Some((3, "Landhandel Nord".to_string())),
                group_ids: vec![10],
            })
            .with_user(FakeUser {
                id: 8,
                login: "dora".to_string(),
                password: "explorer".to_string(),
                database: "tenant_sued".to_string(),
                company: Some((9, "Agrar Sued".to_string())),
                group_ids: vec![],
            })
            .with_user(FakeUser {
                id: 8,
                login: "dora".to_string(),
                password: "explorer".to_string(),
                database: DATABASE.to_string(),
                company: Some((9, "Agrar Sued".to_string())),
                group_ids: vec![],
            })
    }

    pub fn with_user(mut self, user: FakeUser) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_group(mut self, id: i64, name: &str, category: Option<(i64, &str)>) -> Self {
        self.groups.insert(
            id,
            FakeGroup {
                name: name.to_string(),
                category: category.map(|(id, name)| (id, name.to_string())),
            },
        );
        self
    }

    /// Every `execute_kw` call answers with a server error.
    pub fn with_failing_lookups(mut self) -> Self {
        self.failing_lookups = true;
        self
    }

    pub async fn start(self) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/jsonrpc"))
            .respond_with(self)
            .mount(&server)
            .await;
        server
    }

    fn authenticate(&self, args: &[Value]) -> Value {
        let database = args[0].as_str().unwrap_or_default();
        let login = args[1].as_str().unwrap_or_default();
        let password = args[2].as_str().unwrap_or_default();

        if database == DATABASE && login == SERVICE_USERNAME && password == SERVICE_PASSWORD {
            return json!(SERVICE_UID);
        }

        self.users
            .iter()
            .find(|u| u.database == database && u.login == login && u.password == password)
            .map(|u| json!(u.id))
            .unwrap_or(json!(false))
    }

    fn execute_kw(&self, args: &[Value]) -> Result<Value, String> {
        if self.failing_lookups {
            return Err("AccessError: service account lacks read access".to_string());
        }
        if args[1] != json!(SERVICE_UID) || args[2] != json!(SERVICE_PASSWORD) {
            return Err("AccessDenied".to_string());
        }

        // Records are only visible inside the database the call names.
        let database = args[0].as_str().unwrap_or_default();
        let users = || self.users.iter().filter(move |u| u.database == database);

        let model = args[3].as_str().unwrap_or_default();
        let operation = args[4].as_str().unwrap_or_default();
        let call_args = args[5].as_array().cloned().unwrap_or_default();

        match (model, operation) {
            ("res.users", "read") => Ok(Value::Array(
                ids(&call_args[0])
                    .into_iter()
                    .filter_map(|id| users().find(|u| u.id == id))
                    .map(|u| {
                        json!({
                            "id": u.id,
                            "login": u.login,
                            "company_id": many2one(&u.company),
                            "groups_id": u.group_ids,
                        })
                    })
                    .collect(),
            )),
            ("res.groups", "read") => Ok(Value::Array(
                ids(&call_args[0])
                    .into_iter()
                    .filter_map(|id| self.groups.get(&id).map(|g| (id, g)))
                    .map(|(id, g)| {
                        json!({
                            "id": id,
                            "name": g.name,
                            "category_id": many2one(&g.category),
                        })
                    })
                    .collect(),
            )),
            ("res.users", "search_count") => {
                let user_id = call_args[0][0][2].as_i64().unwrap_or_default();
                Ok(json!(users().filter(|u| u.id == user_id).count()))
            }
            _ => Err(format!("unsupported call {}.{}", model, operation)),
        }
    }
}

impl Respond for FakeOdoo {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = match request.body_json() {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };
        let id = body["id"].clone();
        let params = &body["params"];
        let args = params["args"].as_array().cloned().unwrap_or_default();

        let outcome = match (params["service"].as_str(), params["method"].as_str()) {
            (Some("common"), Some("authenticate")) => Ok(self.authenticate(&args)),
            (Some("object"), Some("execute_kw")) => self.execute_kw(&args),
            _ => Err("unknown service".to_string()),
        };

        let payload = match outcome {
            Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
            Err(message) => json!({
                "jsonrpc": "2.0",
                "id": id,
                "error": {
                    "code": 200,
                    "message": "Odoo Server Error",
                    "data": { "message": message },
                },
            }),
        };

        ResponseTemplate::new(200).set_body_json(payload)
    }
}

fn ids(value: &Value) -> Vec<i64> {
    value
        .as_array()
        .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
        .unwrap_or_default()
}

fn many2one(value: &Option<(i64, String)>) -> Value {
    match value {
        Some((id, name)) => json!([id, name]),
        None => json!(false),
    }
}

pub fn directory_config(server: &MockServer) -> DirectoryConfig {
    DirectoryConfig {
        url: server.uri(),
        database: DATABASE.to_string(),
        service_username: SERVICE_USERNAME.to_string(),
        service_password: SERVICE_PASSWORD.to_string(),
    }
}

/// Test application that spawns a real server against a fake directory
pub struct TestApp {
    pub address: String,
    pub directory: MockServer,
    pub api_client: reqwest::Client,
    pub codec: TokenCodec,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(FakeOdoo::seeded()).await
    }

    pub async fn spawn_with(fake: FakeOdoo) -> Self {
        let directory = fake.start().await;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let odoo = Arc::new(OdooDirectoryClient::new(&directory_config(&directory)));
        let cached = Arc::new(CachedDirectoryClient::new(odoo, Duration::from_secs(300)));
        let roles = RoleResolver::new(RoleMappingTable::new([
            ("Sales / Administrator", "SALES_ADMIN"),
            ("User types / Internal User", "EMPLOYEE"),
        ]));

        let auth_service = Arc::new(AuthService::new(
            cached,
            Arc::new(SystemClock),
            Arc::new(TokenCodec::new(SECRET, ISSUER).unwrap()),
            Arc::new(roles),
            ValidationCache::new(Duration::from_secs(300), 1_000),
            TOKEN_TTL_SECONDS,
        ));

        let router = create_router(auth_service);

        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            directory,
            api_client: reqwest::Client::new(),
            codec: TokenCodec::new(SECRET, ISSUER).unwrap(),
        }
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Log alice in and return her token.
    pub async fn login_alice(&self) -> String {
        let response = self
            .post("/auth/login")
            .json(&json!({ "username": "alice", "password": "wonderland" }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: Value = response.json().await.expect("Failed to parse response");
        body["token"].as_str().unwrap().to_string()
    }

    /// Token signed with the gateway's key, issued `age` seconds ago.
    pub fn token_issued_ago(&self, age: i64) -> String {
        let now = chrono::Utc::now().timestamp();
        self.codec
            .issue(&alice(), TOKEN_TTL_SECONDS, now - age)
            .unwrap()
            .token
    }

    /// Number of JSON-RPC calls the fake directory has served.
    pub async fn directory_calls(&self) -> usize {
        self.directory
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }
}

pub fn alice() -> Identity {
    Identity {
        user_id: 42,
        username: "alice".to_string(),
        tenant_id: "3".to_string(),
        tenant_name: "Landhandel Nord".to_string(),
        roles: BTreeSet::from(["SALES_ADMIN".to_string(), "USER".to_string()]),
    }
}
