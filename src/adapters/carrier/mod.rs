pub mod ups;

pub use ups::{TokenInfo, UpsClient};
