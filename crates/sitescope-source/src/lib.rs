//! Adapters that feed site rows, metric history and picklists to the engine.

pub mod error;
pub mod file;
pub mod http;

pub use error::SourceError;
pub use file::FileSiteSource;
pub use http::HttpSiteSource;
