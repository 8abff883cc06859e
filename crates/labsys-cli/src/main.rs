use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

use labsys_cli::{create_root_admin, powers_table, public_key_pem};
use labsys_config::{CryptoConfig, DatabaseConfig};
use labsys_core::password::hash_password_with_cost;
use labsys_db::{MIGRATOR, PgAdminRepository, init_db_pool};

#[derive(Parser)]
#[command(name = "labsys-cli")]
#[command(about = "labsys CLI - Administrative tools for labsys", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an admin owning every power
    CreateRootAdmin {
        /// Nickname of the admin
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Print the power catalog with bit values
    Powers,
    /// Print a bcrypt hash of a password
    HashPassword {
        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Print the public key clients use to encrypt passwords
    PublicKey,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::CreateRootAdmin { name, password } => {
            handle_create_root_admin(name, password).await
        }
        Commands::Powers => {
            print!("{}", powers_table());
            Ok(())
        }
        Commands::HashPassword { password } => handle_hash_password(password),
        Commands::PublicKey => public_key_pem().map(|pem| print!("{pem}")),
    };

    if let Err(e) = result {
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn prompt_password(password: Option<String>) -> anyhow::Result<String> {
    match password {
        Some(password) => Ok(password),
        None => Ok(Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?),
    }
}

async fn handle_create_root_admin(
    name: Option<String>,
    password: Option<String>,
) -> anyhow::Result<()> {
    let name = match name {
        Some(name) => name,
        None => Input::new().with_prompt("Nickname").interact_text()?,
    };
    let password = prompt_password(password)?;

    let database =
        DatabaseConfig::from_env().ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let pool = init_db_pool(&database).await?;
    MIGRATOR.run(&pool).await?;

    let crypto = CryptoConfig::from_env()?;
    let repo = PgAdminRepository::new(pool);
    let admin = create_root_admin(&repo, &name, &password, crypto.bcrypt_cost).await?;

    println!("\n✅ Root admin created successfully!");
    println!("   Id: {}", admin.id);
    println!("   Name: {}", admin.nickname);
    Ok(())
}

fn handle_hash_password(password: Option<String>) -> anyhow::Result<()> {
    let password = prompt_password(password)?;
    let cost = CryptoConfig::from_env()?.bcrypt_cost;
    let hash = hash_password_with_cost(&password, cost)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {}", e.error))?;
    println!("{hash}");
    Ok(())
}
