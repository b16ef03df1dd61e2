//! Network stack planner
//!
//! One public and one private subnet per availability zone, NAT egress,
//! optional dual-stack addressing and flow logs, and the two security groups
//! the platform and application stacks attach to.

use crate::config::ResolvedEnvironment;
use crate::domain::entities::outputs::network as out;
use crate::domain::entities::{Property, Resource, ResourceKind, StackId, StackKind, StackPlan};
use crate::domain::value_objects::SubnetAllocator;
use crate::error::StackplanResult;

/// Web ports open on the load-balancer group
pub const WEB_PORTS: [u16; 2] = [80, 443];

/// Width of the auxiliary port range above the service port
pub const AUXILIARY_PORTS: u16 = 2;

pub const ANY_IPV4: &str = "0.0.0.0/0";
pub const ANY_IPV6: &str = "::/0";

pub fn plan_network(env: &ResolvedEnvironment, id: &StackId) -> StackplanResult<StackPlan> {
    let net = &env.network;
    let zones = net.zone_count();
    let mut plan = StackPlan::new(id.clone(), StackKind::Network);

    if let Some(flow) = &net.flow_logs {
        plan.add(
            Resource::new("flow-log-bucket", ResourceKind::FlowLogBucket)
                .with("encryption", "aes256")
                .with("public_access", "blocked")
                .with("versioning", true)
                .with("retention_days", flow.retention_days)
                .with_opt("cold_storage_after_days", flow.cold_storage_after_days)
                .with("retain_on_delete", env.durability.is_durable()),
        );
    }

    let mut network = Resource::new("network", ResourceKind::Network)
        .with("cidr", net.cidr.to_string())
        .with("dns_support", true)
        .with("dns_hostnames", true);
    if net.flow_logs.is_some() {
        network = network.depends_on("flow-log-bucket");
    }
    plan.add(network);

    plan.add(
        Resource::new("internet-gateway", ResourceKind::InternetGateway)
            .with("network", Property::id_of("network")),
    );

    if let Some(v6) = &net.ipv6_block {
        plan.add(
            Resource::new("ipv6-block", ResourceKind::Ipv6Block)
                .with("network", Property::id_of("network"))
                .with("cidr", v6.to_string()),
        );
    }

    let mut allocator = SubnetAllocator::new(net.cidr);
    let public_blocks = (0..zones)
        .map(|_| allocator.allocate(net.public_subnet_mask))
        .collect::<StackplanResult<Vec<_>>>()?;
    let private_blocks = (0..zones)
        .map(|_| allocator.allocate(net.private_subnet_mask))
        .collect::<StackplanResult<Vec<_>>>()?;

    let mut ipv6_subnets = Vec::new();
    for (i, (zone, block)) in net.availability_zones.iter().zip(&public_blocks).enumerate() {
        let subnet_id = format!("public-subnet-{}", i);
        let mut subnet = Resource::new(&subnet_id, ResourceKind::Subnet)
            .with("network", Property::id_of("network"))
            .with("zone", zone.as_str())
            .with("cidr", block.to_string())
            .with("tier", "public")
            .with("map_public_ip", true);
        if let Some(v6) = &net.ipv6_block {
            let slice = v6.subnet(64, i as u32)?;
            subnet = subnet
                .with("ipv6_cidr", slice.to_string())
                .with("assign_ipv6_on_creation", true)
                .depends_on("ipv6-block");
            ipv6_subnets.push(slice.to_string());
        }
        plan.add(subnet);

        plan.add(
            Resource::new(format!("public-default-route-{}", i), ResourceKind::Route)
                .with("subnet", Property::id_of(&subnet_id))
                .with("destination", ANY_IPV4)
                .with("gateway", Property::id_of("internet-gateway")),
        );
        if net.ipv6_block.is_some() {
            plan.add(
                Resource::new(format!("public-default-route-v6-{}", i), ResourceKind::Route)
                    .with("subnet", Property::id_of(&subnet_id))
                    .with("destination", ANY_IPV6)
                    .with("gateway", Property::id_of("internet-gateway")),
            );
        }
    }

    for n in 0..net.nat_gateways {
        plan.add(
            Resource::new(format!("nat-gateway-{}", n), ResourceKind::NatGateway)
                .with("subnet", Property::id_of(format!("public-subnet-{}", n)))
                .with("zone", net.availability_zones[n].as_str())
                .depends_on("internet-gateway"),
        );
    }

    for (i, (zone, block)) in net.availability_zones.iter().zip(&private_blocks).enumerate() {
        let subnet_id = format!("private-subnet-{}", i);
        plan.add(
            Resource::new(&subnet_id, ResourceKind::Subnet)
                .with("network", Property::id_of("network"))
                .with("zone", zone.as_str())
                .with("cidr", block.to_string())
                .with("tier", "private")
                .with("map_public_ip", false),
        );
        if net.nat_gateways > 0 {
            plan.add(
                Resource::new(format!("private-default-route-{}", i), ResourceKind::Route)
                    .with("subnet", Property::id_of(&subnet_id))
                    .with("destination", ANY_IPV4)
                    .with(
                        "nat_gateway",
                        Property::id_of(format!("nat-gateway-{}", i % net.nat_gateways)),
                    ),
            );
        }
    }

    if net.flow_logs.is_some() {
        let mut targets = vec![("flow-log-network".to_string(), "network".to_string())];
        for i in 0..zones {
            targets.push((
                format!("flow-log-public-subnet-{}", i),
                format!("public-subnet-{}", i),
            ));
            targets.push((
                format!("flow-log-private-subnet-{}", i),
                format!("private-subnet-{}", i),
            ));
        }
        for (log_id, target) in targets {
            plan.add(
                Resource::new(log_id, ResourceKind::FlowLog)
                    .with("target", Property::id_of(target))
                    .with("destination", Property::reference("flow-log-bucket", "arn"))
                    .with("traffic", "all"),
            );
        }
    }

    let mut lb_ingress = Vec::new();
    for port in WEB_PORTS {
        lb_ingress.push(ingress_from_cidr(port, ANY_IPV4));
        if net.ipv6_block.is_some() {
            lb_ingress.push(ingress_from_cidr(port, ANY_IPV6));
        }
    }
    plan.add(
        Resource::new("lb-security-group", ResourceKind::SecurityGroup)
            .with("network", Property::id_of("network"))
            .with("description", "load balancer")
            .with("ingress", Property::List(lb_ingress))
            .with("egress", "all"),
    );

    let port = env.container.port;
    plan.add(
        Resource::new("workload-security-group", ResourceKind::SecurityGroup)
            .with("network", Property::id_of("network"))
            .with("description", "workload")
            .with(
                "ingress",
                Property::List(vec![
                    ingress_from_group(port, port, "lb-security-group"),
                    ingress_from_group(port + 1, port + AUXILIARY_PORTS, "lb-security-group"),
                ]),
            )
            .with("egress", "all"),
    );

    plan.export(out::NETWORK_ID, Property::id_of("network"));
    plan.export(
        out::PUBLIC_SUBNET_IDS,
        Property::List(
            (0..zones)
                .map(|i| Property::id_of(format!("public-subnet-{}", i)))
                .collect(),
        ),
    );
    plan.export(
        out::PRIVATE_SUBNET_IDS,
        Property::List(
            (0..zones)
                .map(|i| Property::id_of(format!("private-subnet-{}", i)))
                .collect(),
        ),
    );
    plan.export(out::LB_SECURITY_GROUP_ID, Property::id_of("lb-security-group"));
    plan.export(
        out::WORKLOAD_SECURITY_GROUP_ID,
        Property::id_of("workload-security-group"),
    );
    plan.export(out::AVAILABILITY_ZONES, net.availability_zones.clone());
    if !ipv6_subnets.is_empty() {
        plan.export(out::IPV6_BLOCKS, ipv6_subnets);
    }
    if net.flow_logs.is_some() {
        plan.export(
            out::FLOW_LOG_BUCKET_ARN,
            Property::reference("flow-log-bucket", "arn"),
        );
    }

    Ok(plan)
}

fn ingress_from_cidr(port: u16, cidr: &str) -> Property {
    Property::map([
        ("protocol", Property::from("tcp")),
        ("from_port", Property::from(port)),
        ("to_port", Property::from(port)),
        ("source_cidr", Property::from(cidr)),
    ])
}

fn ingress_from_group(from: u16, to: u16, group: &str) -> Property {
    Property::map([
        ("protocol", Property::from("tcp")),
        ("from_port", Property::from(from)),
        ("to_port", Property::from(to)),
        ("source_group", Property::id_of(group)),
    ])
}
