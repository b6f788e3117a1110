pub mod anime;
pub mod anime_list;
pub mod friendships;
pub mod recommendations;
pub mod users;

pub use anime::Anime;
pub use anime_list::{AnimeListEntry, ListStatus, Rating};
pub use friendships::{Friendship, FriendshipStatus, pair_key};
pub use recommendations::Recommendation;
pub use users::{User, UserPreferences};

pub type UserId = i32;
pub type AnimeId = i32;
