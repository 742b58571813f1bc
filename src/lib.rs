// Core modules
pub mod error;
pub mod models;
pub mod output;
pub mod profile;
pub mod synthetic;
pub mod validation;

// Re-export commonly used types
pub use error::{Error, Result};
pub use models::*;
pub use profile::RunProfile;
pub use synthetic::{FixtureRunner, SeriesGenerator};
