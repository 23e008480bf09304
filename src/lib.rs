pub mod abis;
pub mod config;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod utils;

pub use self::config::Settings;
pub use error::{InvalidPrice, PriceError, RegistryError};
pub use registry::{RouteConfig, RouteRegistry};
pub use resolver::{OnChainPoolReader, PriceResolver};
