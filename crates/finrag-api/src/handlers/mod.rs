mod config;
mod health;
mod page;
mod sessions;

pub use config::get_config;
pub use health::health_check;
pub use page::index_page;
pub use sessions::{create_session, delete_session, get_session, submit_turn};
