pub mod admins;
pub mod classes;
pub mod users;
