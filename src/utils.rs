pub mod helpers;
pub mod logger;

pub use helpers::{generate_user_identifier, get_content_type};
pub use logger::init_tracing;
