pub mod controller;
pub mod router;
pub mod service;

pub use router::init_admins_router;
pub use service::AdminDirectory;
