mod config;

pub use self::config::{LensSettings, RouteSettings, RpcSettings, Settings};
