mod auth;
mod base;
mod documents;

pub use base::GiniClient;
