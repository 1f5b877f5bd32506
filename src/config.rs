use crate::device::DeviceClass;
use crate::fleet::FleetSpec;
use crate::ip::{SubnetAssignment, SubnetLayout};
use crate::utils::ip_utils::{slash16, Ipv4Net, CLASS_PREFIX_LEN};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Log levels accepted in `general.log_level`
const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

/// Top-level fleet configuration that mirrors the YAML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    pub network: NetworkConfig,
    /// Requested device count per class; missing classes count as zero
    #[serde(default)]
    pub fleet: BTreeMap<DeviceClass, i64>,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(level) = &self.general.log_level {
            if !LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
                return Err(ValidationError::InvalidGeneral(format!(
                    "unknown log_level '{}', expected one of {}",
                    level,
                    LOG_LEVELS.join(", ")
                )));
            }
        }

        if self.network.address_space.prefix_len() > CLASS_PREFIX_LEN {
            return Err(ValidationError::InvalidNetwork(format!(
                "address_space {} is too small to hold a /24 subnet",
                self.network.address_space
            )));
        }

        if let Some(subnets) = &self.network.subnets {
            for (class, subnet) in subnets {
                if subnet.prefix.prefix_len() != CLASS_PREFIX_LEN {
                    return Err(ValidationError::InvalidNetwork(format!(
                        "subnet for {} must be a /24, got {}",
                        class, subnet.prefix
                    )));
                }
            }
        }

        // Negative counts pass here and are reported by the allocator.
        if !self.fleet.values().any(|count| *count != 0) {
            return Err(ValidationError::InvalidFleet(
                "fleet section requests no devices".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the allocator input from the fleet and network sections
    pub fn fleet_spec(&self) -> FleetSpec {
        self.fleet
            .iter()
            .fold(FleetSpec::new(self.network.address_space.trunc()), |spec, (class, count)| {
                spec.with_count(*class, *count)
            })
    }

    /// Build the subnet layout: defaults with any per-class overrides applied
    pub fn subnet_layout(&self) -> SubnetLayout {
        let mut layout = SubnetLayout::default();

        if let Some(operator_cidr) = self.network.operator_cidr {
            layout = layout.with_operator_cidr(operator_cidr.trunc());
        }

        if let Some(subnets) = &self.network.subnets {
            for (class, subnet) in subnets {
                let base_offset = subnet
                    .base_offset
                    .unwrap_or_else(|| layout.assignment(*class).base_offset);
                layout = layout.with_assignment(*class, SubnetAssignment::new(subnet.prefix.trunc(), base_offset));
            }
        }

        layout
    }

    /// Effective log level, `info` when unset
    pub fn log_level(&self) -> &str {
        self.general.log_level.as_deref().unwrap_or("info")
    }
}

/// General settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Virtual network settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Address space containing every class subnet, e.g. "10.0.0.0/16"
    pub address_space: Ipv4Net,
    /// Range allowed to SSH into the management subnet, e.g. a VPN gateway
    /// range. Must lie inside `address_space` and outside every class subnet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_cidr: Option<Ipv4Net>,
    /// Per-class subnet overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnets: Option<BTreeMap<DeviceClass, SubnetOverride>>,
}

/// Override of one class's subnet and, optionally, its base offset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubnetOverride {
    pub prefix: Ipv4Net,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_offset: Option<u8>,
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid network configuration: {0}")]
    InvalidNetwork(String),
    #[error("Invalid fleet configuration: {0}")]
    InvalidFleet(String),
}

/// Default implementations
impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            address_space: slash16(10, 0),
            operator_cidr: None,
            subnets: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let fleet = [
            (DeviceClass::ManagementHost, 1),
            (DeviceClass::Camera, 2),
            (DeviceClass::WirelessAccessPoint, 3),
            (DeviceClass::Printer, 2),
        ]
        .into_iter()
        .collect();

        Self {
            general: GeneralConfig::default(),
            network: NetworkConfig::default(),
            fleet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::ip_utils::{host_at, slash24};
    use std::net::Ipv4Addr;

    #[test]
    fn test_fleet_config_parsing() {
        let yaml = r#"
general:
  log_level: debug
network:
  address_space: "10.0.0.0/16"
  operator_cidr: "10.0.0.0/28"
fleet:
  management_host: 1
  camera: 2
  wireless_access_point: 3
  printer: 2
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.log_level(), "debug");

        let spec = config.fleet_spec();
        assert_eq!(spec.count(DeviceClass::WirelessAccessPoint), 3);
        assert_eq!(spec.address_space().to_string(), "10.0.0.0/16");

        let layout = config.subnet_layout();
        let operator: Ipv4Net = "10.0.0.0/28".parse().unwrap();
        assert_eq!(layout.operator_cidr(), Some(operator));
        assert_eq!(layout, SubnetLayout::default().with_operator_cidr(operator));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let yaml = r#"
network:
  address_space: "10.0.0.0/16"
fleet:
  management_host: 1
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.fleet_spec().count(DeviceClass::Camera), 0);
        assert_eq!(config.subnet_layout(), SubnetLayout::default());
    }

    #[test]
    fn test_unknown_class_rejected() {
        let yaml = r#"
network:
  address_space: "10.0.0.0/16"
fleet:
  management_host: 1
  smart_fridge: 4
"#;
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_bad_cidr_rejected_at_parse() {
        let yaml = r#"
network:
  address_space: "10.0.0.0"
fleet:
  management_host: 1
"#;
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_subnet_override() {
        let yaml = r#"
network:
  address_space: "10.0.0.0/16"
  subnets:
    camera:
      prefix: "10.0.20.0/24"
      base_offset: 50
    printer:
      prefix: "10.0.40.0/24"
fleet:
  management_host: 1
  camera: 1
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());

        let layout = config.subnet_layout();
        let camera = layout.assignment(DeviceClass::Camera);
        assert_eq!(host_at(&camera.subnet, 50), Some(Ipv4Addr::new(10, 0, 20, 50)));
        assert_eq!(camera.base_offset, 50);

        let printer = layout.assignment(DeviceClass::Printer);
        assert_eq!(printer.subnet.to_string(), "10.0.40.0/24");
        assert_eq!(printer.base_offset, 10);
    }

    #[test]
    fn test_validation_errors() {
        let yaml = r#"
general:
  log_level: chatty
network:
  address_space: "10.0.0.0/16"
fleet:
  management_host: 1
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ValidationError::InvalidGeneral(_)));

        let yaml = r#"
network:
  address_space: "10.0.0.0/16"
  subnets:
    camera:
      prefix: "10.0.20.0/25"
fleet:
  management_host: 1
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().unwrap_err().to_string().contains("/24"));

        let yaml = r#"
network:
  address_space: "10.0.0.0/28"
fleet:
  management_host: 1
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(config.validate(), Err(ValidationError::InvalidNetwork(_))));

        let yaml = r#"
network:
  address_space: "10.0.0.0/16"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(config.validate(), Err(ValidationError::InvalidFleet(_))));

        let yaml = r#"
network:
  address_space: "10.0.0.0/16"
fleet:
  management_host: 0
  camera: 0
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(config.validate(), Err(ValidationError::InvalidFleet(_))));
    }

    #[test]
    fn test_host_bits_are_cleared() {
        let yaml = r#"
network:
  address_space: "10.0.7.9/16"
  subnets:
    camera:
      prefix: "10.0.20.33/24"
fleet:
  management_host: 1
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.fleet_spec().address_space().to_string(), "10.0.0.0/16");
        assert_eq!(
            config.subnet_layout().assignment(DeviceClass::Camera).subnet,
            slash24(10, 0, 20)
        );
    }

    #[test]
    fn test_default_config_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.fleet, Config::default().fleet);
    }
}
