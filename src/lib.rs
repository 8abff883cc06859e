//! # labsys API
//!
//! Administrative backend of the lab management system, built with Axum and
//! PostgreSQL. Admin accounts carry a set of *powers*, a compact bitset of
//! capabilities, which is checked on every privileged request and shown to
//! clients as a permissions matrix.
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── middleware/       # Claims extraction and power-gated extractors
//! ├── modules/          # Feature modules
//! │   ├── admins/      # Captcha, login, profile, listing and creation of admins
//! │   ├── classes/     # Class creation and listing
//! │   └── users/       # Teacher creation, user listing and deletion
//! ├── docs.rs           # OpenAPI document
//! ├── logging.rs        # Tracing setup and request logging
//! ├── metrics.rs        # Prometheus metrics
//! ├── router.rs         # Main application router
//! ├── state.rs          # Shared application state
//! └── validator.rs      # JSON body extractor
//! ```
//!
//! Each feature module has the same layout:
//!
//! - `controller.rs`: HTTP handlers
//! - `service.rs`: Business logic over a repository trait
//! - `router.rs`: Axum router configuration
//!
//! ## Powers
//!
//! | bit | power |
//! |-----|-------|
//! | 1   | admin management |
//! | 2   | teacher management |
//! | 4   | class management |
//! | 8   | user management |
//! | 16  | lab management |
//!
//! The first admin is created with every power through the CLI:
//!
//! ```bash
//! cargo run --bin labsys-cli -- create-root-admin --name root
//! ```
//!
//! ## Request flow
//!
//! 1. The client sends `Authorization: Bearer <token>` from `/api/admin/login`
//! 2. The extractor checks the token's role indicator is "administrator"
//! 3. Power-gated extractors look the caller up and check the required power
//! 4. The handler runs and answers with a `{error_code, message, data}` envelope
//!
//! ## API Documentation
//!
//! - Swagger UI: `http://localhost:3000/swagger-ui`
//! - Scalar: `http://localhost:3000/scalar`

pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod validator;

// Re-export workspace crates for convenience
pub use labsys_auth;
pub use labsys_config;
pub use labsys_core;
pub use labsys_db;
pub use labsys_models;
