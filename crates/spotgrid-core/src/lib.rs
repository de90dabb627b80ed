pub mod config;
pub mod error;
pub mod types;

pub use config::{AdviceRequest, RegionScoring, SpotgridConfig};
pub use error::{ValidationError, ValidationResult};
pub use types::*;
