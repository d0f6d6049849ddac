pub mod model;

pub use model::{EventFormat, UpdateUserRequest, User, UserPreferences};
