pub mod anime_list;
pub mod friendships;
pub mod recommendations;

pub use anime_list::{AnimeListItem, AnimeListService};
pub use friendships::{FriendRequestPolicy, FriendshipService};
pub use recommendations::RecommendationService;
