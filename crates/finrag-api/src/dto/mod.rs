mod request;
mod response;

pub use request::TurnRequest;
pub use response::*;
