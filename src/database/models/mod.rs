pub mod rating;
pub mod role;
pub mod store;
pub mod user;

pub use rating::{Rating, RatingWithUser};
pub use role::Role;
pub use store::Store;
pub use user::{PublicUser, User};
