//! # labsys CLI
//!
//! Administrative tasks that run outside the HTTP server.
//!
//! ```ignore
//! use labsys_cli::create_root_admin;
//!
//! let repo = PgAdminRepository::new(pool);
//! let admin = create_root_admin(&repo, "root", &password, 12).await?;
//! ```

use anyhow::{Context, anyhow};

use labsys_core::password::hash_password_with_cost;
use labsys_core::patterns::{check_nickname, check_password_strength};
use labsys_core::{Power, PowerSet};
use labsys_db::{AdminRepository, RepoError};
use labsys_models::{Admin, NewAdmin};

/// Inserts an admin that owns every power and has no creator.
///
/// The same nickname and password rules as the create endpoint apply.
pub async fn create_root_admin(
    repo: &dyn AdminRepository,
    name: &str,
    password: &str,
    bcrypt_cost: u32,
) -> anyhow::Result<Admin> {
    check_nickname(name)?;
    check_password_strength(password)?;

    let password_hash = hash_password_with_cost(password, bcrypt_cost)
        .map_err(|e| anyhow!("failed to hash password: {}", e.error))?;

    repo.insert(NewAdmin {
        nickname: name.to_string(),
        password_hash,
        power: PowerSet::ALL,
        created_by: None,
    })
    .await
    .map_err(|e| match e {
        RepoError::Conflict => anyhow!("an admin named '{name}' already exists"),
        other => anyhow::Error::new(other).context("failed to store admin"),
    })
}

/// The power catalog as an aligned table, in bit order.
pub fn powers_table() -> String {
    let mut out = format!("{:>4}  {}\n", "bit", "power");
    for power in Power::ALL {
        out.push_str(&format!("{:>4}  {}\n", power.bit(), power.name()));
    }
    out.push_str(&format!("{:>4}  {}\n", PowerSet::ALL.bits(), "all"));
    out
}

/// Reads the PEM key configured for the server and derives its public half.
pub fn public_key_pem() -> anyhow::Result<String> {
    let crypto = labsys_config::CryptoConfig::from_env().context("failed to read RSA key")?;
    let pem = crypto
        .rsa_private_key_pem
        .ok_or_else(|| anyhow!("RSA_PRIVATE_KEY_PATH or RSA_PRIVATE_KEY must be set"))?;
    let cipher = labsys_auth::RsaCipher::from_pem(&pem)?;
    Ok(cipher.public_key_pem()?)
}
