mod chat;
mod sessions;

pub use chat::ChatService;
pub use sessions::{SessionEntry, SessionHandle, SessionStore};
