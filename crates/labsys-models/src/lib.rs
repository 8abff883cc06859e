//! # labsys Models
//!
//! Domain models and DTOs for the labsys API.
//!
//! - [`ids`]: Strongly-typed integer ids
//! - [`admins`]: Admin accounts, login, listing and creation DTOs
//! - [`classes`]: Classes and their DTOs
//! - [`users`]: Teacher and student accounts, teacher creation, listing and
//!   deletion DTOs
//!
//! # Example
//!
//! ```ignore
//! use labsys_models::admins::{Admin, AdminItem};
//!
//! let item = AdminItem::from(&admin);
//! assert_eq!(item.power.len(), labsys_core::Power::ALL.len());
//! ```

pub mod admins;
pub mod classes;
pub mod ids;
pub mod users;

pub use admins::{
    Admin, AdminInfoResponse, AdminItem, AdminListParams, AdminListResponse, AdminPage,
    CreateAdminDto, LoginRequest, LoginResponse, NewAdmin,
};
pub use classes::{
    Class, ClassItem, ClassListParams, ClassListResponse, ClassPage, CreateClassDto, NewClass,
};
pub use ids::{AdminId, ClassId, UserId};
pub use users::{
    CreateTeacherDto, DeleteUsersDto, DeleteUsersResponse, NewUser, User, UserItem,
    UserListParams, UserListResponse, UserPage,
};
