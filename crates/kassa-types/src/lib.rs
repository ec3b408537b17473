pub mod api;
pub mod models;

pub use api::{NewProduct, NewUser, ProfileUpdate};
pub use models::{Product, User};
