mod registry;
mod route;

pub use registry::{RouteRegistry, RouteTable};
pub use route::{Hop, PoolRoute, PricingStrategy, RouteConfig};
