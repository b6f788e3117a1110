pub mod config;
pub mod logging;
pub mod pagination;

pub use config::Config;
pub use logging::init_logging;
