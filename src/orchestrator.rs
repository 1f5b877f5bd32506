//! Plan orchestrator.
//!
//! This module coordinates one planning run end to end: configuration to
//! allocator input, allocation, independent verification, rendering, and
//! finally writing the artifacts. Nothing is written unless every earlier
//! step succeeded.

use crate::config::Config;
use crate::fleet::FleetPlan;
use crate::ip::allocate;
use crate::plan::{build_inventory, build_manifest, connection_guide, DEFAULT_ADMIN_USER};
use crate::utils::validation::verify_plan;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

pub const INVENTORY_FILE: &str = "inventory.json";
pub const CONNECTIONS_FILE: &str = "connections.txt";

/// Serialization format of the provisioning manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifestFormat {
    #[default]
    Yaml,
    Json,
}

impl ManifestFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            ManifestFormat::Yaml => "provisioning.yaml",
            ManifestFormat::Json => "provisioning.json",
        }
    }
}

/// Paths of the files written by one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOutputs {
    pub manifest: PathBuf,
    pub inventory: PathBuf,
    pub connections: PathBuf,
}

/// Allocate and verify the plan described by a configuration
pub fn build_plan(config: &Config) -> Result<FleetPlan> {
    let spec = config.fleet_spec();
    let layout = config.subnet_layout();

    let plan = allocate(&spec, &layout).wrap_err("Fleet allocation failed; no infrastructure should be changed")?;
    verify_plan(&plan, &spec).wrap_err("Allocated plan failed verification")?;

    Ok(plan)
}

/// Render every artifact for a plan and write them into `output_dir`
pub fn write_plan(plan: &FleetPlan, output_dir: &Path, format: ManifestFormat) -> Result<PlanOutputs> {
    let manifest = build_manifest(plan);
    let inventory = build_inventory(plan, DEFAULT_ADMIN_USER);

    // Render everything before touching the file system.
    let manifest_text = match format {
        ManifestFormat::Yaml => serde_yaml::to_string(&manifest)?,
        ManifestFormat::Json => serde_json::to_string_pretty(&manifest)?,
    };
    let inventory_json = serde_json::to_string_pretty(&inventory)?;
    let guide = connection_guide(&inventory);

    fs::create_dir_all(output_dir)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", output_dir.display()))?;

    let outputs = PlanOutputs {
        manifest: output_dir.join(format.file_name()),
        inventory: output_dir.join(INVENTORY_FILE),
        connections: output_dir.join(CONNECTIONS_FILE),
    };

    for (path, content) in [
        (&outputs.manifest, &manifest_text),
        (&outputs.inventory, &inventory_json),
        (&outputs.connections, &guide),
    ] {
        fs::write(path, content).wrap_err_with(|| format!("Failed to write '{}'", path.display()))?;
        info!("Wrote {:?}", path);
    }

    Ok(outputs)
}

/// Run a full planning pass from configuration to files on disk
pub fn generate_plan_outputs(config: &Config, output_dir: &Path, format: ManifestFormat) -> Result<PlanOutputs> {
    let plan = build_plan(config)?;
    write_plan(&plan, output_dir, format)
}

/// One-line-per-class summary of a plan, for dry runs and logs
pub fn summarize(plan: &FleetPlan) -> String {
    let mut lines = vec![format!(
        "{} device(s) in {}, jump host {}",
        plan.len(),
        plan.address_space(),
        plan.jump_host()
    )];
    for (class, count) in plan.class_counts() {
        let mut members = plan.of_class(class);
        let first = members.next().map(|d| d.address);
        let last = members.last().map(|d| d.address).or(first);
        if let (Some(first), Some(last)) = (first, last) {
            lines.push(format!("  {:<22} {:>3}  {} - {}", class.to_string(), count, first, last));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceClass;
    use tempfile::tempdir;

    #[test]
    fn test_generate_writes_all_files() {
        let dir = tempdir().unwrap();
        let outputs = generate_plan_outputs(&Config::default(), dir.path(), ManifestFormat::Yaml).unwrap();

        assert!(outputs.manifest.ends_with("provisioning.yaml"));
        assert!(outputs.manifest.exists());
        assert!(outputs.inventory.exists());
        assert!(outputs.connections.exists());

        let inventory: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&outputs.inventory).unwrap()).unwrap();
        assert_eq!(inventory["jump_host"], "10.0.1.4");
        assert_eq!(inventory["devices"].as_array().unwrap().len(), 8);

        let jump_rules = &inventory["devices"][0]["rules"];
        assert_eq!(jump_rules[0]["source"], "10.0.1.4/32");
        assert_eq!(jump_rules[1]["source"], "10.0.1.0/24");
        assert_eq!(inventory["devices"][7]["rules"][0]["port"], 443);
    }

    #[test]
    fn test_json_manifest() {
        let dir = tempdir().unwrap();
        let outputs = generate_plan_outputs(&Config::default(), dir.path(), ManifestFormat::Json).unwrap();
        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&outputs.manifest).unwrap()).unwrap();
        assert_eq!(manifest["hosts"][1]["ip_address"], "10.0.2.10");
        assert_eq!(manifest["security_groups"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_failed_allocation_writes_nothing() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("plan");
        let mut config = Config::default();
        config.fleet.insert(DeviceClass::ManagementHost, 0);

        let err = generate_plan_outputs(&config, &out, ManifestFormat::Yaml).unwrap_err();
        assert!(format!("{:?}", err).contains("no management host"));
        assert!(!out.exists());
    }

    #[test]
    fn test_rerun_is_byte_identical() {
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        let a = generate_plan_outputs(&Config::default(), first.path(), ManifestFormat::Yaml).unwrap();
        let b = generate_plan_outputs(&Config::default(), second.path(), ManifestFormat::Yaml).unwrap();

        for (left, right) in [(a.manifest, b.manifest), (a.inventory, b.inventory), (a.connections, b.connections)] {
            assert_eq!(fs::read(left).unwrap(), fs::read(right).unwrap());
        }
    }

    #[test]
    fn test_summary() {
        let plan = build_plan(&Config::default()).unwrap();
        let summary = summarize(&plan);
        assert!(summary.starts_with("8 device(s) in 10.0.0.0/16, jump host 10.0.1.4"));
        assert!(summary.contains("10.0.3.10 - 10.0.3.12"));
        assert!(summary.contains("10.0.1.4 - 10.0.1.4"));
    }
}
