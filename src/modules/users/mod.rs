pub mod controller;
pub mod router;
pub mod service;

pub use router::{init_teachers_router, init_users_router};
pub use service::UserService;
