//! The admin directory: login, lookup, listing and creation of admin
//! accounts.
//!
//! Validation of a create request runs to completion before anything is
//! persisted; each failed check maps to one [`InvalidReason`].

use std::sync::{Arc, OnceLock};

use tracing::{debug, info, instrument};

use labsys_auth::{Challenge, CredentialCipher, Role, VerificationCodes, create_access_token};
use labsys_config::{CryptoConfig, JwtConfig};
use labsys_core::pagination::total_pages;
use labsys_core::password::hash_password_with_cost;
use labsys_core::patterns::{check_nickname, check_password_strength};
use labsys_core::{AppError, InvalidReason, PowerSet, verify_password};
use labsys_db::{AdminFilter, AdminRepository, RepoError};
use labsys_models::{
    Admin, AdminId, AdminListParams, AdminPage, CreateAdminDto, LoginRequest, LoginResponse,
    NewAdmin,
};

use crate::metrics::{track_admin_created, track_admin_login};

#[derive(Clone)]
pub struct AdminDirectory {
    repo: Arc<dyn AdminRepository>,
    cipher: Arc<dyn CredentialCipher>,
    codes: Arc<dyn VerificationCodes>,
    jwt_config: JwtConfig,
    bcrypt_cost: u32,
    /// Compared against when the nickname is unknown, so both failure paths
    /// pay one bcrypt verification.
    dummy_hash: Arc<OnceLock<String>>,
}

impl AdminDirectory {
    pub fn new(
        repo: Arc<dyn AdminRepository>,
        cipher: Arc<dyn CredentialCipher>,
        codes: Arc<dyn VerificationCodes>,
        jwt_config: JwtConfig,
    ) -> Self {
        Self {
            repo,
            cipher,
            codes,
            jwt_config,
            bcrypt_cost: CryptoConfig::DEFAULT_BCRYPT_COST,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self.dummy_hash = Arc::new(OnceLock::new());
        self
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        &self.jwt_config
    }

    pub fn issue_challenge(&self) -> Challenge {
        self.codes.issue()
    }

    /// Authenticates an admin and issues an access token.
    ///
    /// The nickname format is checked before anything else, so malformed
    /// input never reaches the repository. An unknown account and a wrong
    /// password both fail with `InvalidCredentials` after one bcrypt
    /// verification.
    #[instrument(skip_all, fields(user_name = %req.user_name))]
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, AppError> {
        check_nickname(&req.user_name).map_err(AppError::invalid_params)?;

        if !self.codes.verify(&req.key, req.v_code) {
            track_admin_login("bad_code");
            return Err(AppError::invalid_params(InvalidReason::BadVerificationCode));
        }

        let password = self.decrypt(&req.password)?;

        let Some(admin) = self
            .repo
            .find_by_nickname(&req.user_name)
            .await
            .map_err(AppError::system)?
        else {
            verify_password(&password, self.dummy_hash()?)?;
            track_admin_login("failure");
            return Err(AppError::invalid_credentials());
        };

        if !verify_password(&password, &admin.password_hash)? {
            track_admin_login("failure");
            return Err(AppError::invalid_credentials());
        }

        let token = create_access_token(admin.id, Role::Administrator, &self.jwt_config)?;
        track_admin_login("success");
        info!(admin_id = %admin.id, "Admin logged in");

        Ok(LoginResponse {
            token,
            id: admin.id,
            name: admin.nickname.clone(),
            powers: admin.power.matrix(),
        })
    }

    /// `None` when no account has this id.
    #[instrument(skip(self))]
    pub async fn query_by_id(&self, id: AdminId) -> Result<Option<Admin>, AppError> {
        self.repo.find_by_id(id).await.map_err(AppError::system)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, params: AdminListParams) -> Result<AdminPage, AppError> {
        let filter = AdminFilter {
            created_by: params.creator_filter(),
        };
        let pagination = params.pagination;

        let (items, total_count) = self
            .repo
            .find_page(filter, pagination.offset(), pagination.limit())
            .await
            .map_err(AppError::system)?;

        Ok(AdminPage {
            items,
            total_page: total_pages(total_count, pagination.page_size()),
            total_count,
        })
    }

    /// Creates an admin account on behalf of `creator`.
    ///
    /// Checks run in order: nickname format, power bits, password
    /// decryption, password strength. Nothing is stored unless all pass.
    #[instrument(skip(self, dto), fields(name = %dto.name, power = dto.power))]
    pub async fn create(&self, creator: AdminId, dto: CreateAdminDto) -> Result<Admin, AppError> {
        check_nickname(&dto.name).map_err(AppError::invalid_params)?;

        let power = PowerSet::from_raw(dto.power).map_err(|e| {
            debug!(error = %e, "rejected power value");
            AppError::invalid_params(InvalidReason::from(e))
        })?;

        let password = self.decrypt(&dto.password)?;
        check_password_strength(&password).map_err(AppError::invalid_params)?;

        let password_hash = hash_password_with_cost(&password, self.bcrypt_cost)?;

        let admin = self
            .repo
            .insert(NewAdmin {
                nickname: dto.name,
                password_hash,
                power,
                created_by: Some(creator),
            })
            .await
            .map_err(|e| match e {
                RepoError::Conflict => AppError::invalid_params(InvalidReason::NicknameTaken),
                other => AppError::system(other),
            })?;

        track_admin_created();
        info!(admin_id = %admin.id, created_by = %creator, "Admin created");

        Ok(admin)
    }

    fn dummy_hash(&self) -> Result<&str, AppError> {
        if let Some(hash) = self.dummy_hash.get() {
            return Ok(hash);
        }
        let hash = hash_password_with_cost("no-such-admin-0", self.bcrypt_cost)?;
        Ok(self.dummy_hash.get_or_init(|| hash))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, AppError> {
        self.cipher.decrypt(ciphertext).map_err(|e| {
            debug!(error = %e, "credential decryption failed");
            AppError::invalid_params(InvalidReason::UndecryptablePassword)
        })
    }
}

impl std::fmt::Debug for AdminDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminDirectory")
            .field("jwt_config", &"<redacted>")
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labsys_auth::{CipherError, Disabled, verify_token};
    use labsys_core::password::hash_password_with_cost;
    use labsys_core::{ErrorCode, PageParams, Power};
    use labsys_db::MemoryAdminRepository;

    /// Treats the ciphertext as the plain password; `!` marks garbage.
    struct PlainCipher;

    impl CredentialCipher for PlainCipher {
        fn decrypt(&self, ciphertext: &str) -> Result<String, CipherError> {
            if ciphertext.starts_with('!') {
                return Err(CipherError::Key("undecryptable".to_string()));
            }
            Ok(ciphertext.to_string())
        }
    }

    /// Accepts only code 424242.
    struct FixedCode;

    impl VerificationCodes for FixedCode {
        fn issue(&self) -> Challenge {
            Challenge {
                key: "fixed".to_string(),
                image: String::new(),
                expires_at: i64::MAX,
            }
        }

        fn verify(&self, _key: &str, code: u32) -> bool {
            code == 424242
        }
    }

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "service-test-secret".to_string(),
            access_token_expiry: 600,
        }
    }

    fn directory_with(
        repo: Arc<MemoryAdminRepository>,
        codes: Arc<dyn VerificationCodes>,
    ) -> AdminDirectory {
        AdminDirectory::new(repo, Arc::new(PlainCipher), codes, jwt_config()).with_bcrypt_cost(4)
    }

    async fn seed(repo: &MemoryAdminRepository, nickname: &str, password: &str, power: i64) -> Admin {
        repo.insert(NewAdmin {
            nickname: nickname.to_string(),
            password_hash: hash_password_with_cost(password, 4).unwrap(),
            power: PowerSet::from_raw(power).unwrap(),
            created_by: None,
        })
        .await
        .unwrap()
    }

    fn login_request(user_name: &str, password: &str, v_code: u32) -> LoginRequest {
        LoginRequest {
            user_name: user_name.to_string(),
            password: password.to_string(),
            key: "fixed".to_string(),
            v_code,
        }
    }

    #[tokio::test]
    async fn test_login_issues_token_with_matrix() {
        let repo = Arc::new(MemoryAdminRepository::new());
        let root = seed(&repo, "root", "passw0rd", 31).await;
        let directory = directory_with(repo, Arc::new(Disabled));

        let response = directory
            .login(login_request("root", "passw0rd", 0))
            .await
            .unwrap();

        assert_eq!(response.id, root.id);
        assert_eq!(response.powers.len(), Power::ALL.len());
        assert!(response.powers.iter().all(|p| p.own));

        let claims = verify_token(&response.token, &jwt_config()).unwrap();
        assert_eq!(claims.sub, root.id.into_inner());
        assert_eq!(claims.role(), Some(Role::Administrator));
    }

    #[tokio::test]
    async fn test_login_unknown_and_wrong_password_look_the_same() {
        let repo = Arc::new(MemoryAdminRepository::new());
        seed(&repo, "root", "passw0rd", 31).await;
        let directory = directory_with(repo, Arc::new(Disabled));

        let unknown = directory
            .login(login_request("ghost", "passw0rd", 0))
            .await
            .unwrap_err();
        let wrong = directory
            .login(login_request("root", "wrongpass1", 0))
            .await
            .unwrap_err();

        assert_eq!(unknown.code, ErrorCode::InvalidCredentials);
        assert_eq!(wrong.code, ErrorCode::InvalidCredentials);
        assert_eq!(unknown.error.to_string(), wrong.error.to_string());
    }

    #[tokio::test]
    async fn test_login_unknown_account_still_verifies_a_hash() {
        let repo = Arc::new(MemoryAdminRepository::new());
        let directory = directory_with(repo, Arc::new(Disabled));
        assert!(directory.dummy_hash.get().is_none());

        let err = directory
            .login(login_request("ghost", "passw0rd", 0))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCredentials);

        let dummy = directory.dummy_hash.get().unwrap();
        assert!(dummy.starts_with("$2b$04$"));
        assert!(!verify_password("passw0rd", dummy).unwrap());
    }

    #[tokio::test]
    async fn test_login_malformed_nickname_fails_first() {
        let repo = Arc::new(MemoryAdminRepository::new());
        let directory = directory_with(repo, Arc::new(FixedCode));

        // Wrong code and garbage password too: the nickname check wins
        let err = directory
            .login(login_request("1bad name", "!garbage", 1))
            .await
            .unwrap_err();
        assert_eq!(err.reason(), Some(InvalidReason::MalformedNickname));
    }

    #[tokio::test]
    async fn test_login_checks_verification_code() {
        let repo = Arc::new(MemoryAdminRepository::new());
        seed(&repo, "root", "passw0rd", 31).await;
        let directory = directory_with(repo, Arc::new(FixedCode));

        let err = directory
            .login(login_request("root", "passw0rd", 1))
            .await
            .unwrap_err();
        assert_eq!(err.reason(), Some(InvalidReason::BadVerificationCode));

        assert!(
            directory
                .login(login_request("root", "passw0rd", 424242))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_login_undecryptable_password() {
        let repo = Arc::new(MemoryAdminRepository::new());
        seed(&repo, "root", "passw0rd", 31).await;
        let directory = directory_with(repo, Arc::new(Disabled));

        let err = directory
            .login(login_request("root", "!garbage", 0))
            .await
            .unwrap_err();
        assert_eq!(err.reason(), Some(InvalidReason::UndecryptablePassword));
    }

    #[tokio::test]
    async fn test_query_by_id_missing_is_none() {
        let repo = Arc::new(MemoryAdminRepository::new());
        let directory = directory_with(repo, Arc::new(Disabled));
        assert!(directory.query_by_id(AdminId(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_persists_with_creator() {
        let repo = Arc::new(MemoryAdminRepository::new());
        let root = seed(&repo, "root", "passw0rd", 31).await;
        let directory = directory_with(repo.clone(), Arc::new(Disabled));

        let created = directory
            .create(
                root.id,
                CreateAdminDto {
                    name: "lab_admin".to_string(),
                    password: "s3cretpass".to_string(),
                    power: 3,
                },
            )
            .await
            .unwrap();

        assert_eq!(created.created_by, Some(root.id));
        assert!(created.power.own(Power::AdminManage));
        assert!(created.power.own(Power::TeacherManage));
        assert!(!created.power.own(Power::ClassManage));

        let stored = repo.find_by_nickname("lab_admin").await.unwrap().unwrap();
        assert!(verify_password("s3cretpass", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_create_rejections_store_nothing() {
        let repo = Arc::new(MemoryAdminRepository::new());
        let root = seed(&repo, "root", "passw0rd", 31).await;
        let directory = directory_with(repo.clone(), Arc::new(Disabled));

        let cases = [
            ("x", "s3cretpass", 1, InvalidReason::MalformedNickname),
            ("lab_admin", "s3cretpass", 32, InvalidReason::UnknownCapability),
            ("lab_admin", "s3cretpass", -1, InvalidReason::UnknownCapability),
            ("lab_admin", "!garbage", 1, InvalidReason::UndecryptablePassword),
            ("lab_admin", "short", 1, InvalidReason::WeakPassword),
            ("root", "s3cretpass", 1, InvalidReason::NicknameTaken),
        ];

        for (name, password, power, reason) in cases {
            let err = directory
                .create(
                    root.id,
                    CreateAdminDto {
                        name: name.to_string(),
                        password: password.to_string(),
                        power,
                    },
                )
                .await
                .unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidParams, "{name}/{power}");
            assert_eq!(err.reason(), Some(reason), "{name}/{power}");
        }

        let (_, total) = repo.find_page(AdminFilter::default(), 0, 100).await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn test_list_pages_and_counts() {
        let repo = Arc::new(MemoryAdminRepository::new());
        for i in 0..25 {
            seed(&repo, &format!("admin_{i:02}"), "passw0rd", 1).await;
        }
        let directory = directory_with(repo, Arc::new(Disabled));

        let page = directory
            .list(AdminListParams {
                created_by: None,
                pagination: PageParams::new(1, 10),
            })
            .await
            .unwrap();
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.total_count, 25);
        assert_eq!(page.total_page, 3);

        let last = directory
            .list(AdminListParams {
                created_by: None,
                pagination: PageParams::new(3, 10),
            })
            .await
            .unwrap();
        assert_eq!(last.items.len(), 5);
        assert_eq!(last.items[0].nickname, "admin_20");
    }
}
