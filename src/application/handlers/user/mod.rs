//! User account handlers.

mod find_user_by_email;
mod get_user;
mod register_user;
mod update_user_profile;

pub use find_user_by_email::{FindUserByEmailHandler, FindUserByEmailQuery};
pub use get_user::{GetUserHandler, GetUserQuery};
pub use register_user::{RegisterUserCommand, RegisterUserHandler, RegisterUserResult};
pub use update_user_profile::{UpdateUserProfileCommand, UpdateUserProfileHandler};
