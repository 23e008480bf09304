use std::time::Duration;

use alloy::primitives::Address;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::utils::PriceBounds;

/// JSON-RPC endpoint used for pool reads.
#[derive(Debug, Deserialize, Clone)]
pub struct RpcSettings {
    pub url: String,
    /// Timeout for a single batched RPC call
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

fn default_call_timeout_ms() -> u64 {
    30_000
}

impl RpcSettings {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

/// Price lens behaviour.
///
/// `native_asset` is the token every price is denominated in. `admin` is the
/// only identity allowed to change routes.
#[derive(Debug, Deserialize, Clone)]
pub struct LensSettings {
    pub native_asset: Address,
    pub admin: Address,
    /// Oldest external feed reading that is still trusted
    #[serde(default = "default_max_staleness_secs")]
    pub max_staleness_secs: u64,
    /// Deadline for a whole resolution, spanning both hops
    #[serde(default = "default_resolution_timeout_ms")]
    pub resolution_timeout_ms: u64,
    #[serde(default)]
    pub bounds: PriceBounds,
}

fn default_max_staleness_secs() -> u64 {
    3_600
}

fn default_resolution_timeout_ms() -> u64 {
    10_000
}

impl LensSettings {
    pub fn max_staleness(&self) -> Duration {
        Duration::from_secs(self.max_staleness_secs)
    }

    pub fn resolution_timeout(&self) -> Duration {
        Duration::from_millis(self.resolution_timeout_ms)
    }
}

/// One configured price route, in flat administrative form.
#[derive(Debug, Deserialize, Clone)]
pub struct RouteSettings {
    pub token: Address,
    /// Ignored when `use_external_source` is set
    #[serde(default)]
    pub pool: Address,
    #[serde(default)]
    pub reference_token: Option<Address>,
    #[serde(default)]
    pub token_is_base_side: bool,
    #[serde(default)]
    pub use_external_source: bool,
}

/// Root application configuration.
///
/// Loaded from `config.yaml` at startup, with `LENS__` prefixed environment
/// variables layered on top (e.g. `LENS__RPC__URL`).
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub rpc: RpcSettings,
    pub lens: LensSettings,
    #[serde(default)]
    pub routes: Vec<RouteSettings>,
    #[serde(default)]
    pub reference_tokens: Vec<Address>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_file("config")
    }

    /// Load settings from `path` (extension optional) plus environment overrides.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("LENS").separator("__"))
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        settings.validate()?;

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.lens.bounds.is_well_formed() {
            return Err(ConfigError::Message(
                "lens.bounds must satisfy 0 < min <= max".to_string(),
            ));
        }
        if self.routes.iter().any(|r| r.token == self.lens.native_asset) {
            return Err(ConfigError::Message(
                "the native asset cannot have a route".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    const YAML: &str = r#"
rpc:
  url: "http://localhost:8545"
lens:
  native_asset: "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"
  admin: "0x00000000000000000000000000000000000000ad"
  max_staleness_secs: 600
reference_tokens:
  - "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
routes:
  - token: "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
    pool: "0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640"
    token_is_base_side: true
  - token: "0x6b175474e89094c44da98b954eedeac495271d0f"
    pool: "0x5777d92f208679db4b9778590fa3cab3ac9e2168"
    reference_token: "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"
  - token: "0x514910771af9ca656af840dff83e8264ecf986ca"
    use_external_source: true
"#;

    fn parse(yaml: &str) -> Result<Settings, ConfigError> {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    #[test]
    fn test_parse_settings_with_defaults() {
        let settings = parse(YAML).unwrap();
        assert_eq!(settings.rpc.call_timeout(), Duration::from_secs(30));
        assert_eq!(settings.lens.max_staleness(), Duration::from_secs(600));
        assert_eq!(settings.lens.resolution_timeout(), Duration::from_secs(10));
        assert_eq!(settings.lens.bounds, PriceBounds::default());
        assert_eq!(settings.reference_tokens.len(), 1);
        assert_eq!(settings.routes.len(), 3);
    }

    #[test]
    fn test_route_flags() {
        let settings = parse(YAML).unwrap();
        assert!(settings.routes[0].token_is_base_side);
        assert!(settings.routes[0].reference_token.is_none());
        assert!(!settings.routes[1].token_is_base_side);
        assert!(settings.routes[1].reference_token.is_some());
        assert!(settings.routes[2].use_external_source);
        assert_eq!(settings.routes[2].pool, Address::ZERO);
    }

    #[test]
    fn test_native_asset_route_rejected() {
        let yaml = r#"
rpc:
  url: "http://localhost:8545"
lens:
  native_asset: "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"
  admin: "0x00000000000000000000000000000000000000ad"
routes:
  - token: "0xc02aaa39b223fe8d0a0e5c4f27ead9083c756cc2"
    pool: "0x88e6a0c2ddd26feeb64f039a2c41296fcb3f5640"
"#;
        assert!(parse(yaml).is_err());
    }
}
