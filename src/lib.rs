// Watermark dataset generator library

pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod source;
pub mod watermark;

pub use config::DatasetConfig;
pub use error::{DatasetError, FetchError};
