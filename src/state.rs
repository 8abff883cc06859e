use std::sync::Arc;

use anyhow::{Context, anyhow};
use tracing::info;

use labsys_auth::{CredentialCipher, RsaCipher, SignedCodes};
use labsys_config::{CaptchaConfig, CorsConfig, CryptoConfig, DatabaseConfig, JwtConfig};
use labsys_db::{
    MIGRATOR, PgAdminRepository, PgClassRepository, PgUserRepository, init_db_pool,
};

use crate::modules::admins::service::AdminDirectory;
use crate::modules::classes::service::ClassService;
use crate::modules::users::service::UserService;

#[derive(Clone, Debug)]
pub struct AppState {
    pub admins: AdminDirectory,
    pub classes: ClassService,
    pub users: UserService,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(
        admins: AdminDirectory,
        classes: ClassService,
        users: UserService,
        cors_config: CorsConfig,
    ) -> Self {
        Self {
            admins,
            classes,
            users,
            cors_config,
        }
    }

    pub fn jwt_config(&self) -> &JwtConfig {
        self.admins.jwt_config()
    }

    /// Builds the state from environment variables, connecting to
    /// PostgreSQL and applying pending migrations.
    ///
    /// # Errors
    ///
    /// Fails when `DATABASE_URL` or the RSA private key is missing, or the
    /// database cannot be reached or migrated.
    pub async fn from_env() -> anyhow::Result<Self> {
        let database =
            DatabaseConfig::from_env().ok_or_else(|| anyhow!("DATABASE_URL must be set"))?;

        let crypto = CryptoConfig::from_env().context("failed to read RSA private key")?;
        let pem = crypto
            .rsa_private_key_pem
            .as_deref()
            .ok_or_else(|| anyhow!("RSA_PRIVATE_KEY_PATH or RSA_PRIVATE_KEY must be set"))?;
        let cipher: Arc<dyn CredentialCipher> =
            Arc::new(RsaCipher::from_pem(pem).context("failed to load RSA private key")?);

        let codes = SignedCodes::from_config(&CaptchaConfig::from_env());

        let pool = init_db_pool(&database)
            .await
            .context("failed to connect to database")?;
        MIGRATOR
            .run(&pool)
            .await
            .context("failed to run migrations")?;
        info!("Connected to PostgreSQL and applied migrations");

        let class_repo = Arc::new(PgClassRepository::new(pool.clone()));
        let admins = AdminDirectory::new(
            Arc::new(PgAdminRepository::new(pool.clone())),
            cipher.clone(),
            codes,
            JwtConfig::from_env(),
        )
        .with_bcrypt_cost(crypto.bcrypt_cost);
        let classes = ClassService::new(class_repo.clone());
        let users = UserService::new(Arc::new(PgUserRepository::new(pool)), class_repo, cipher)
            .with_bcrypt_cost(crypto.bcrypt_cost);

        Ok(Self::new(admins, classes, users, CorsConfig::from_env()))
    }
}
