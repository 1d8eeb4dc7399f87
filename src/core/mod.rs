pub mod raster;
pub mod validator;

pub use crate::domain::compare::{compare_addresses, MatchPolicy};
pub use crate::domain::context::RequestContext;
pub use crate::domain::model::{Address, PackageAddress, PromptResult, ValidationResult};
pub use crate::domain::ports::{PromptResponse, RawResponse, TrackingProvider, VisionModel};
pub use crate::utils::error::Result;
