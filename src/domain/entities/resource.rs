//! Resource entity - one declared infrastructure object
//!
//! A resource is a kind, a stack-unique id and a property map. Property values
//! are plain data except for three special forms:
//! - `Secret` - material that is never rendered (serializes as `***`)
//! - `Ref` - an attribute of a resource declared earlier in the same stack
//! - `Import` - a named export of another stack

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::domain::entities::StackId;

/// Kind of infrastructure object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Network,
    InternetGateway,
    Ipv6Block,
    Subnet,
    Route,
    NatGateway,
    FlowLogBucket,
    FlowLog,
    SecurityGroup,
    LogGroup,
    Cluster,
    Registry,
    LoadBalancer,
    Listener,
    ListenerRule,
    Certificate,
    WebAcl,
    WebAclAssociation,
    Secret,
    TaskDefinition,
    TargetGroup,
    Service,
    ScalableTarget,
    ScalingPolicy,
}

impl ResourceKind {
    /// Short prefix used when minting physical identifiers
    pub fn prefix(&self) -> &'static str {
        match self {
            ResourceKind::Network => "net",
            ResourceKind::InternetGateway => "igw",
            ResourceKind::Ipv6Block => "v6block",
            ResourceKind::Subnet => "subnet",
            ResourceKind::Route => "route",
            ResourceKind::NatGateway => "nat",
            ResourceKind::FlowLogBucket => "bucket",
            ResourceKind::FlowLog => "flowlog",
            ResourceKind::SecurityGroup => "sg",
            ResourceKind::LogGroup => "logs",
            ResourceKind::Cluster => "cluster",
            ResourceKind::Registry => "registry",
            ResourceKind::LoadBalancer => "lb",
            ResourceKind::Listener => "listener",
            ResourceKind::ListenerRule => "rule",
            ResourceKind::Certificate => "cert",
            ResourceKind::WebAcl => "acl",
            ResourceKind::WebAclAssociation => "aclassoc",
            ResourceKind::Secret => "secret",
            ResourceKind::TaskDefinition => "taskdef",
            ResourceKind::TargetGroup => "tg",
            ResourceKind::Service => "svc",
            ResourceKind::ScalableTarget => "scaling",
            ResourceKind::ScalingPolicy => "policy",
        }
    }
}

/// Property value of a resource or a stack export
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    Str(String),
    Int(i64),
    Bool(bool),
    List(Vec<Property>),
    Map(BTreeMap<String, Property>),
    /// Secret payload; never rendered
    Secret(String),
    /// Attribute of a resource in the same stack
    Ref { resource: String, attr: String },
    /// Named export of another stack
    Import { stack: StackId, output: String },
}

impl Property {
    pub fn reference(resource: impl Into<String>, attr: impl Into<String>) -> Self {
        Property::Ref {
            resource: resource.into(),
            attr: attr.into(),
        }
    }

    /// Shorthand for a reference to a resource's `id` attribute
    pub fn id_of(resource: impl Into<String>) -> Self {
        Self::reference(resource, "id")
    }

    pub fn import(stack: &StackId, output: impl Into<String>) -> Self {
        Property::Import {
            stack: stack.clone(),
            output: output.into(),
        }
    }

    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Property>,
        I: IntoIterator<Item = (K, V)>,
    {
        Property::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Property::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Property::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Property::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Property]> {
        match self {
            Property::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Property> {
        match self {
            Property::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// Visit this value and every nested value
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Property)) {
        visit(self);
        match self {
            Property::List(items) => items.iter().for_each(|p| p.walk(visit)),
            Property::Map(map) => map.values().for_each(|p| p.walk(visit)),
            _ => {}
        }
    }
}

impl Serialize for Property {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Property::Str(s) => serializer.serialize_str(s),
            Property::Int(i) => serializer.serialize_i64(*i),
            Property::Bool(b) => serializer.serialize_bool(*b),
            Property::List(items) => items.serialize(serializer),
            Property::Map(map) => map.serialize(serializer),
            Property::Secret(_) => serializer.serialize_str("***"),
            Property::Ref { resource, attr } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("ref", resource)?;
                map.serialize_entry("attr", attr)?;
                map.end()
            }
            Property::Import { stack, output } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("import", stack)?;
                map.serialize_entry("output", output)?;
                map.end()
            }
        }
    }
}

impl From<&str> for Property {
    fn from(s: &str) -> Self {
        Property::Str(s.to_string())
    }
}

impl From<String> for Property {
    fn from(s: String) -> Self {
        Property::Str(s)
    }
}

impl From<&String> for Property {
    fn from(s: &String) -> Self {
        Property::Str(s.clone())
    }
}

impl From<bool> for Property {
    fn from(b: bool) -> Self {
        Property::Bool(b)
    }
}

impl From<i64> for Property {
    fn from(i: i64) -> Self {
        Property::Int(i)
    }
}

impl From<u32> for Property {
    fn from(i: u32) -> Self {
        Property::Int(i64::from(i))
    }
}

impl From<u16> for Property {
    fn from(i: u16) -> Self {
        Property::Int(i64::from(i))
    }
}

impl From<u8> for Property {
    fn from(i: u8) -> Self {
        Property::Int(i64::from(i))
    }
}

impl<T: Into<Property>> From<Vec<T>> for Property {
    fn from(items: Vec<T>) -> Self {
        Property::List(items.into_iter().map(Into::into).collect())
    }
}

/// A declared resource inside a stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resource {
    pub id: String,
    pub kind: ResourceKind,
    pub properties: BTreeMap<String, Property>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl Resource {
    pub fn new(id: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            id: id.into(),
            kind,
            properties: BTreeMap::new(),
            depends_on: Vec::new(),
        }
    }

    /// Set a property (builder style)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Property>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Set a property only when a value is present
    pub fn with_opt<V: Into<Property>>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    /// Add an explicit ordering edge to another resource in the stack
    pub fn depends_on(mut self, resource: impl Into<String>) -> Self {
        let resource = resource.into();
        if !self.depends_on.contains(&resource) {
            self.depends_on.push(resource);
        }
        self
    }

    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.get(key)
    }

    /// Ids of same-stack resources this resource needs to exist first
    pub fn requires(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.depends_on.iter().map(String::as_str).collect();
        for value in self.properties.values() {
            value.walk(&mut |p| {
                if let Property::Ref { resource, .. } = p {
                    if !ids.contains(&resource.as_str()) {
                        ids.push(resource.as_str());
                    }
                }
            });
        }
        ids
    }

    /// Cross-stack imports referenced anywhere in the property tree
    pub fn imports(&self) -> Vec<(&StackId, &str)> {
        let mut found = Vec::new();
        for value in self.properties.values() {
            value.walk(&mut |p| {
                if let Property::Import { stack, output } = p {
                    found.push((stack, output.as_str()));
                }
            });
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_properties_and_dependencies() {
        let r = Resource::new("nat-gateway-0", ResourceKind::NatGateway)
            .with("subnet", Property::id_of("public-subnet-0"))
            .with("zone", "us-east-1a")
            .depends_on("internet-gateway")
            .depends_on("internet-gateway");

        assert_eq!(r.property("zone").and_then(Property::as_str), Some("us-east-1a"));
        assert_eq!(r.depends_on, vec!["internet-gateway"]);
        assert_eq!(r.requires(), vec!["internet-gateway", "public-subnet-0"]);
    }

    #[test]
    fn with_opt_skips_none() {
        let r = Resource::new("x", ResourceKind::Cluster).with_opt::<&str>("missing", None);
        assert!(r.properties.is_empty());
    }

    #[test]
    fn secret_values_never_serialize() {
        let r = Resource::new("app-secret", ResourceKind::Secret)
            .with("value", Property::Secret("hunter2".to_string()));
        let json = serde_json::to_string(&r).unwrap();
        assert!(!json.contains("hunter2"));
        assert!(json.contains("***"));
    }

    #[test]
    fn references_and_imports_serialize_as_objects() {
        let stack = StackId::from("webapp-dev-network");
        let r = Resource::new("service", ResourceKind::Service)
            .with("cluster", Property::reference("cluster", "name"))
            .with("subnets", Property::import(&stack, "private-subnet-ids"));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["properties"]["cluster"]["ref"], "cluster");
        assert_eq!(json["properties"]["cluster"]["attr"], "name");
        assert_eq!(json["properties"]["subnets"]["import"], "webapp-dev-network");
        assert_eq!(r.imports(), vec![(&stack, "private-subnet-ids")]);
    }

    #[test]
    fn nested_references_are_found() {
        let r = Resource::new("rule", ResourceKind::ListenerRule).with(
            "action",
            Property::map([("target_group", Property::id_of("target-group"))]),
        );
        assert_eq!(r.requires(), vec!["target-group"]);
    }
}
