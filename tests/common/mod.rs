use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use labsys::labsys_auth::{
    CipherError, CredentialCipher, Disabled, Role, VerificationCodes, create_access_token,
};
use labsys::labsys_config::{CorsConfig, JwtConfig};
use labsys::labsys_core::PowerSet;
use labsys::labsys_core::password::hash_password_with_cost;
use labsys::labsys_db::{
    AdminRepository, MemoryAdminRepository, MemoryClassRepository, MemoryUserRepository,
};
use labsys::labsys_models::{Admin, AdminId, NewAdmin};
use labsys::modules::admins::AdminDirectory;
use labsys::modules::classes::ClassService;
use labsys::modules::users::UserService;
use labsys::router::init_router;
use labsys::state::AppState;

/// Passwords travel in the clear; a leading `!` marks undecryptable input.
pub struct PlainCipher;

impl CredentialCipher for PlainCipher {
    fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
        if ciphertext.starts_with('!') {
            return Err(CipherError::Key("undecryptable".to_string()));
        }
        Ok(ciphertext.to_string())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub admins: Arc<MemoryAdminRepository>,
    pub users: Arc<MemoryUserRepository>,
}

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret".to_string(),
        access_token_expiry: 600,
    }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with_codes(Arc::new(Disabled))
}

#[allow(dead_code)]
pub fn setup_test_app_with_codes(codes: Arc<dyn VerificationCodes>) -> TestApp {
    let admins = Arc::new(MemoryAdminRepository::new());
    let directory = AdminDirectory::new(
        admins.clone(),
        Arc::new(PlainCipher),
        codes,
        test_jwt_config(),
    )
    .with_bcrypt_cost(4);
    let class_repo = Arc::new(MemoryClassRepository::new());
    let classes = ClassService::new(class_repo.clone());
    let users = Arc::new(MemoryUserRepository::new());
    let user_service =
        UserService::new(users.clone(), class_repo, Arc::new(PlainCipher)).with_bcrypt_cost(4);

    let state = AppState::new(
        directory,
        classes,
        user_service,
        CorsConfig::from_list("http://localhost:3000"),
    );
    let router = init_router(state.clone(), None);

    TestApp {
        router,
        state,
        admins,
        users,
    }
}

#[allow(dead_code)]
pub async fn seed_admin(
    repo: &MemoryAdminRepository,
    nickname: &str,
    password: &str,
    power: i64,
    created_by: Option<AdminId>,
) -> Admin {
    repo.insert(NewAdmin {
        nickname: nickname.to_string(),
        password_hash: hash_password_with_cost(password, 4).unwrap(),
        power: PowerSet::from_raw(power).unwrap(),
        created_by,
    })
    .await
    .unwrap()
}

pub fn token_for(id: AdminId, role: Role) -> String {
    create_access_token(id, role, &test_jwt_config()).unwrap()
}

/// POSTs `body` as JSON and returns the status and the decoded envelope.
pub async fn post_json(
    router: &Router,
    uri: &str,
    token: Option<&str>,
    body: Value,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    (status, body)
}
