pub mod role;
pub mod user;
pub mod user_data;
pub mod watched_item;

pub use role::ServerRole;
pub use user::User;
pub use user_data::ItemUserData;
pub use watched_item::{ticks_to_duration, WatchedItem, TICKS_PER_SECOND};
