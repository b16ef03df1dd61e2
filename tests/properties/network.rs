//! Property tests for network sizing.

use proptest::prelude::*;

use stackplan::config::{builtin, resolve, DeploymentContext, MAX_AVAILABILITY_ZONES};
use stackplan::domain::entities::{ResourceKind, SecretBundle, StackKind};
use stackplan::plan;

fn bundle() -> SecretBundle {
    let mut bundle = SecretBundle::new();
    bundle.insert("application", "secret_key", "k");
    bundle.insert("application", "required_setting", "r");
    bundle
}

fn network_counts(zones: u8, gateways: u8, high_availability: bool) -> (usize, usize, usize) {
    let mut document = builtin().unwrap();
    let spec = document.environments.get_mut("dev").unwrap();
    spec.network.availability_zones = zones;
    spec.network.nat.gateways = gateways;
    spec.network.nat.high_availability = high_availability;

    let env = resolve(&document, "dev", &DeploymentContext::default()).unwrap();
    let graph = plan(&env, &bundle()).unwrap();
    let network = graph
        .stacks
        .iter()
        .find(|s| s.kind == StackKind::Network)
        .unwrap();
    (
        env.network.zone_count(),
        network.count_kind(ResourceKind::NatGateway),
        network.count_kind(ResourceKind::Subnet),
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: NAT gateways never outnumber availability zones.
    #[test]
    fn property_nat_gateways_bounded_by_zones(
        zones in 1u8..=MAX_AVAILABILITY_ZONES,
        gateways in 0u8..=12,
    ) {
        let (zone_count, nats, _) = network_counts(zones, gateways, false);
        prop_assert!(nats <= zone_count);
        prop_assert_eq!(nats, usize::from(gateways).min(zone_count));
    }

    /// PROPERTY: High-availability NAT places exactly one gateway per zone.
    #[test]
    fn property_high_availability_nat_matches_zones(
        zones in 1u8..=MAX_AVAILABILITY_ZONES,
        gateways in 0u8..=12,
    ) {
        let (zone_count, nats, _) = network_counts(zones, gateways, true);
        prop_assert_eq!(nats, zone_count);
    }

    /// PROPERTY: Every zone gets one public and one private subnet.
    #[test]
    fn property_two_subnets_per_zone(
        zones in 1u8..=MAX_AVAILABILITY_ZONES,
        high_availability in any::<bool>(),
    ) {
        let (zone_count, _, subnets) = network_counts(zones, 1, high_availability);
        prop_assert_eq!(zone_count, usize::from(zones));
        prop_assert_eq!(subnets, 2 * zone_count);
    }
}
