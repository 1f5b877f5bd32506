//! Provisioning manifest rendering.

use super::types::{HostRequest, ProvisioningManifest, SecurityGroup};
use crate::device::DeviceClass;
use crate::fleet::FleetPlan;

/// VM size hint per class.
pub fn size_hint(class: DeviceClass) -> &'static str {
    match class {
        DeviceClass::ManagementHost => "Standard_B2s",
        _ => "Standard_B1s",
    }
}

/// Turn a plan into compute requests plus one security group per subnet.
pub fn build_manifest(plan: &FleetPlan) -> ProvisioningManifest {
    let hosts = plan
        .instances()
        .iter()
        .map(|device| HostRequest {
            name: device.name.clone(),
            class: device.class,
            subnet: device.class.subnet_name(),
            ip_address: device.address,
            size: size_hint(device.class),
        })
        .collect();

    // Rules are identical across a class, so the first instance speaks for
    // the whole subnet.
    let security_groups = DeviceClass::ALL
        .into_iter()
        .filter_map(|class| plan.of_class(class).next())
        .map(|device| SecurityGroup {
            name: format!("{}-nsg", device.class.slug()),
            class: device.class,
            subnet: device.subnet,
            rules: device.rules.clone(),
        })
        .collect();

    ProvisioningManifest {
        address_space: *plan.address_space(),
        jump_host: plan.jump_host(),
        hosts,
        security_groups,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::FleetSpec;
    use crate::ip::allocate_default;

    #[test]
    fn test_one_group_per_active_subnet() {
        let spec = FleetSpec::default()
            .with_count(DeviceClass::ManagementHost, 1)
            .with_count(DeviceClass::Camera, 2)
            .with_count(DeviceClass::Printer, 2);
        let manifest = build_manifest(&allocate_default(&spec).unwrap());

        assert_eq!(manifest.hosts.len(), 5);
        let groups: Vec<&str> = manifest.security_groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(groups, vec!["mgmt-nsg", "camera-nsg", "printer-nsg"]);

        let camera = &manifest.hosts[1];
        assert_eq!(camera.name, "camera-000");
        assert_eq!(camera.subnet, "camera-subnet");
        assert_eq!(camera.size, "Standard_B1s");
        assert_eq!(manifest.hosts[0].size, "Standard_B2s");
    }

    #[test]
    fn test_manifest_yaml_is_stable() {
        let spec = FleetSpec::default()
            .with_count(DeviceClass::ManagementHost, 1)
            .with_count(DeviceClass::WirelessAccessPoint, 3);
        let render = || serde_yaml::to_string(&build_manifest(&allocate_default(&spec).unwrap())).unwrap();

        let yaml = render();
        assert_eq!(yaml, render());
        assert!(yaml.contains("10.0.3.12"));
        assert!(yaml.contains("10.0.1.4/32"));
    }
}
