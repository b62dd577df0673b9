pub mod credentials;
pub mod document;
pub mod extractions;
pub mod layout;
pub mod options;

pub use credentials::Credentials;
pub use document::{Document, DocumentSet, Links, Page, Progress, Timing};
pub use extractions::{Extraction, ExtractionBox, Extractions};
pub use layout::*;
pub use options::{ListOptions, SearchOptions, UploadOptions};
