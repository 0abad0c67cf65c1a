use crate::core::Airline;
use crate::utils::error::{Result, SearchError};
use crate::utils::validation::{validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Provider endpoints, loaded from a TOML file so deployments can point at
/// staging or production gateways without a rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    pub vietjet: SourceEndpoint,
    pub vietnam_airlines: SourceEndpoint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEndpoint {
    pub endpoint: String,
    pub timeout_seconds: Option<u64>,
    pub headers: Option<HashMap<String, String>>,
}

impl EndpointsConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: EndpointsConfig =
            toml::from_str(&raw).map_err(|e| SearchError::ConfigError {
                message: format!("Failed to parse {}: {}", path.display(), e),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn for_airline(&self, airline: Airline) -> &SourceEndpoint {
        match airline {
            Airline::VJ => &self.vietjet,
            Airline::VNA => &self.vietnam_airlines,
        }
    }
}

impl Validate for EndpointsConfig {
    fn validate(&self) -> Result<()> {
        validate_url("vietjet.endpoint", &self.vietjet.endpoint)?;
        validate_url("vietnam_airlines.endpoint", &self.vietnam_airlines.endpoint)?;
        Ok(())
    }
}
