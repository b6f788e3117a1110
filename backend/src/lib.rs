pub mod constants;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod utils;

pub use db::connection::get_db_pool;
pub use handlers::{AppState, create_router};
pub use utils::config::Config;
