//! Shared AWS plumbing - SDK configuration, credential checks and error mapping

mod error;
mod sdk;

pub use error::{build_error, map_sdk_error};
pub use sdk::{load_sdk_config, verify_credentials};
