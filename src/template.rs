// Copyright (c) 2025 - Cowboy AI, Inc.
//! Template Rendering
//!
//! Turns the intents of one unit into a CloudFormation-shaped JSON template.
//! Rendering is pure: the same intents always produce the same `Value`, and
//! because `serde_json` maps are ordered by key the serialized bytes are
//! stable too.
//!
//! Cross-unit references never appear as direct `Ref`s. The owning unit
//! publishes an output under [`export_name`] and the consuming unit reads it
//! back with `Fn::ImportValue`.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{
    export_name, FunctionDescriptor, InstanceDescriptor, LogicalId, NetworkDescriptor,
    NetworkRef, RoleDescriptor, TrafficRuleSet, UnitId, ValidationError,
};
use crate::errors::DeploymentResult;
use crate::intent::ResourceIntent;

pub const FORMAT_VERSION: &str = "2010-09-09";

/// Staging bucket the external tool uploads function artifacts to
pub const ASSET_BUCKET: &str = "cim-assets-${AWS::AccountId}-${AWS::Region}";

/// A local artifact the external tool must stage before deploying
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetEntry {
    pub id: String,
    pub source: String,
    pub packaging: String,
    pub object_key: String,
}

/// Environment entry that names something this deployment does not declare
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnresolvedReference {
    pub resource: String,
    pub variable: String,
    pub name: String,
    pub purpose: String,
}

/// Rendered template plus what the assembly needs to know about it
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTemplate {
    pub unit: UnitId,
    pub body: Value,
    pub assets: Vec<AssetEntry>,
    pub exports: BTreeSet<String>,
    pub imports: BTreeSet<String>,
    pub unresolved: Vec<UnresolvedReference>,
}

#[derive(Default)]
struct Builder {
    resources: Map<String, Value>,
    outputs: Map<String, Value>,
    parameters: Map<String, Value>,
    assets: Vec<AssetEntry>,
    exports: BTreeSet<String>,
    imports: BTreeSet<String>,
    unresolved: Vec<UnresolvedReference>,
}

impl Builder {
    fn resource(&mut self, id: impl Into<String>, value: Value) {
        self.resources.insert(id.into(), value);
    }

    fn export(&mut self, unit: &UnitId, id: &LogicalId, value: Value) {
        let name = export_name(unit, id);
        self.outputs.insert(
            format!("Export{}", id),
            json!({ "Value": value, "Export": { "Name": name } }),
        );
        self.exports.insert(name);
    }

    fn import(&mut self, network: &NetworkRef, id: &LogicalId) -> Value {
        let name = network.export_name(id);
        self.imports.insert(name.clone());
        json!({ "Fn::ImportValue": name })
    }
}

fn reference(id: impl AsRef<str>) -> Value {
    json!({ "Ref": id.as_ref() })
}

fn zone(index: u32) -> Value {
    json!({ "Fn::Select": [index, { "Fn::GetAZs": "" }] })
}

/// CloudFormation tag list, sorted by key, with an optional `Name` default
fn tag_list(tags: &BTreeMap<String, String>, name: Option<&str>) -> Value {
    let mut all = tags.clone();
    if let Some(name) = name {
        all.entry("Name".to_string())
            .or_insert_with(|| name.to_string());
    }
    Value::Array(
        all.into_iter()
            .map(|(k, v)| json!({ "Key": k, "Value": v }))
            .collect(),
    )
}

fn render_network(
    b: &mut Builder,
    unit: &UnitId,
    network: &NetworkDescriptor,
) -> DeploymentResult<()> {
    let vpc = &network.logical_id;
    let igw = vpc.child("IGW")?;
    let attachment = vpc.child("VPCGW")?;

    b.resource(
        vpc.as_str(),
        json!({
            "Type": "AWS::EC2::VPC",
            "Properties": {
                "CidrBlock": network.cidr.as_cidr(),
                "EnableDnsHostnames": network.enable_dns_hostnames,
                "EnableDnsSupport": network.enable_dns_support,
                "InstanceTenancy": "default",
                "Tags": tag_list(&network.tags, Some(&network.name)),
            }
        }),
    );

    for subnet in network.carve_subnets()? {
        let subnet_id = vpc.child(&subnet.name)?;
        let route_table = subnet_id.child("RouteTable")?;
        let association = subnet_id.child("RouteTableAssociation")?;
        let default_route = subnet_id.child("DefaultRoute")?;

        let mut subnet_tags = network.tags.clone();
        subnet_tags.insert("cim:subnet-name".to_string(), subnet.group.clone());
        subnet_tags.insert("cim:subnet-type".to_string(), subnet.subnet_type.to_string());
        let display = format!("{}/{}/{}", unit, network.name, subnet.name);

        b.resource(
            subnet_id.as_str(),
            json!({
                "Type": "AWS::EC2::Subnet",
                "Properties": {
                    "AvailabilityZone": zone(subnet.zone_index),
                    "CidrBlock": subnet.cidr.as_cidr(),
                    "MapPublicIpOnLaunch": subnet.subnet_type.maps_public_ip(),
                    "Tags": tag_list(&subnet_tags, Some(&display)),
                    "VpcId": reference(vpc),
                }
            }),
        );
        b.resource(
            route_table.as_str(),
            json!({
                "Type": "AWS::EC2::RouteTable",
                "Properties": {
                    "Tags": tag_list(&network.tags, Some(&display)),
                    "VpcId": reference(vpc),
                }
            }),
        );
        b.resource(
            association.as_str(),
            json!({
                "Type": "AWS::EC2::SubnetRouteTableAssociation",
                "Properties": {
                    "RouteTableId": reference(&route_table),
                    "SubnetId": reference(&subnet_id),
                }
            }),
        );
        b.resource(
            default_route.as_str(),
            json!({
                "Type": "AWS::EC2::Route",
                "Properties": {
                    "DestinationCidrBlock": "0.0.0.0/0",
                    "GatewayId": reference(&igw),
                    "RouteTableId": reference(&route_table),
                },
                "DependsOn": [attachment.as_str()],
            }),
        );

        b.export(unit, &subnet_id, reference(&subnet_id));
    }

    b.resource(
        igw.as_str(),
        json!({
            "Type": "AWS::EC2::InternetGateway",
            "Properties": { "Tags": tag_list(&network.tags, Some(&network.name)) }
        }),
    );
    b.resource(
        attachment.as_str(),
        json!({
            "Type": "AWS::EC2::VPCGatewayAttachment",
            "Properties": {
                "InternetGatewayId": reference(&igw),
                "VpcId": reference(vpc),
            }
        }),
    );

    b.export(unit, vpc, reference(vpc));
    Ok(())
}

fn render_role(b: &mut Builder, role: &RoleDescriptor) {
    let arns: Vec<Value> = role
        .managed_policies
        .iter()
        .map(|policy| {
            json!({
                "Fn::Join": ["", [
                    "arn:",
                    { "Ref": "AWS::Partition" },
                    format!(":iam::aws:policy/{}", policy.name()),
                ]]
            })
        })
        .collect();

    b.resource(
        role.logical_id.as_str(),
        json!({
            "Type": "AWS::IAM::Role",
            "Properties": {
                "AssumeRolePolicyDocument": {
                    "Statement": [{
                        "Action": "sts:AssumeRole",
                        "Effect": "Allow",
                        "Principal": { "Service": role.assumed_by.as_str() },
                    }],
                    "Version": "2012-10-17",
                },
                "ManagedPolicyArns": arns,
                "RoleName": role.name.as_str(),
                "Tags": tag_list(&role.tags, None),
            }
        }),
    );
}

fn render_rule_set(
    b: &mut Builder,
    unit: &UnitId,
    rule_set: &TrafficRuleSet,
    network: Option<&NetworkRef>,
) {
    let ingress: Vec<Value> = rule_set
        .ingress
        .iter()
        .map(|rule| {
            json!({
                "CidrIp": rule.peer.cidr(),
                "Description": rule.description(),
                "FromPort": rule.port,
                "IpProtocol": rule.protocol.as_str(),
                "ToPort": rule.port,
            })
        })
        .collect();

    let mut properties = json!({
        "GroupDescription": format!("{}/{}", unit, rule_set.name),
        "GroupName": rule_set.name.as_str(),
        "SecurityGroupIngress": ingress,
        "Tags": tag_list(&rule_set.tags, Some(rule_set.name.as_str())),
    });
    if rule_set.allow_all_outbound {
        properties["SecurityGroupEgress"] = json!([{
            "CidrIp": "0.0.0.0/0",
            "Description": "Allow all outbound traffic by default",
            "IpProtocol": "-1",
        }]);
    }
    if let Some(network) = network {
        properties["VpcId"] = b.import(network, &network.network_id);
    }

    b.resource(
        rule_set.logical_id.as_str(),
        json!({ "Type": "AWS::EC2::SecurityGroup", "Properties": properties }),
    );
}

fn render_instance(b: &mut Builder, instance: &InstanceDescriptor) -> DeploymentResult<()> {
    let profile = instance.logical_id.child("InstanceProfile")?;
    let image = instance.logical_id.child("ImageId")?;

    let subnets = instance
        .network
        .subnets_of(instance.subnet_selection.subnet_type);
    let placement = subnets
        .first()
        .ok_or_else(|| ValidationError::NoSubnetsSelected {
            instance: instance.name.to_string(),
            network: instance.network.network_id.to_string(),
            subnet_type: instance.subnet_selection.subnet_type.to_string(),
        })?;
    let subnet_id = b.import(&instance.network, &placement.logical_id);

    b.parameters.insert(
        image.to_string(),
        json!({
            "Type": "AWS::SSM::Parameter::Value<AWS::EC2::Image::Id>",
            "Default": instance.machine_image.parameter_name(),
        }),
    );

    b.resource(
        profile.as_str(),
        json!({
            "Type": "AWS::IAM::InstanceProfile",
            "Properties": { "Roles": [reference(&instance.role)] }
        }),
    );

    b.resource(
        instance.logical_id.as_str(),
        json!({
            "Type": "AWS::EC2::Instance",
            "Properties": {
                "AvailabilityZone": zone(placement.zone_index),
                "IamInstanceProfile": reference(&profile),
                "ImageId": reference(&image),
                "InstanceType": instance.instance_type.to_string(),
                "SecurityGroupIds": [{ "Fn::GetAtt": [instance.rule_set.as_str(), "GroupId"] }],
                "SubnetId": subnet_id,
                "Tags": tag_list(&instance.tags, Some(instance.name.as_str())),
                "UserData": { "Fn::Base64": instance.user_data.render() },
            },
            "DependsOn": [instance.role.as_str()],
        }),
    );
    Ok(())
}

fn render_function(b: &mut Builder, function: &FunctionDescriptor) {
    let variables: Map<String, Value> = function
        .environment
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.rendered().to_string())))
        .collect();

    b.resource(
        function.logical_id.as_str(),
        json!({
            "Type": "AWS::Lambda::Function",
            "Properties": {
                "Code": {
                    "S3Bucket": { "Fn::Sub": ASSET_BUCKET },
                    "S3Key": function.code.object_key(),
                },
                "Environment": { "Variables": variables },
                "FunctionName": function.name.as_str(),
                "Handler": function.handler,
                "MemorySize": function.memory_mb,
                "Role": { "Fn::GetAtt": [function.role.as_str(), "Arn"] },
                "Runtime": function.runtime.as_str(),
                "Tags": tag_list(&function.tags, None),
                "Timeout": function.timeout_secs,
            },
            "DependsOn": [function.role.as_str()],
        }),
    );

    b.assets.push(AssetEntry {
        id: function.code.fingerprint.clone(),
        source: function.code.path.display().to_string(),
        packaging: "zip".to_string(),
        object_key: function.code.object_key(),
    });

    for (variable, reference) in function.unresolved_references() {
        b.unresolved.push(UnresolvedReference {
            resource: function.logical_id.to_string(),
            variable: variable.to_string(),
            name: reference.name.clone(),
            purpose: reference.purpose.clone(),
        });
    }
}

/// Render every intent of `unit` into one template
pub fn render_unit(
    unit: &UnitId,
    description: &str,
    intents: &[ResourceIntent],
) -> DeploymentResult<RenderedTemplate> {
    let mut b = Builder::default();

    for intent in intents {
        match intent {
            ResourceIntent::Network(network) => render_network(&mut b, unit, network)?,
            ResourceIntent::Role(role) => render_role(&mut b, role),
            ResourceIntent::RuleSet(rule_set) => {
                let network = intents
                    .iter()
                    .filter_map(ResourceIntent::as_instance)
                    .find(|i| i.rule_set == rule_set.logical_id)
                    .map(|i| &i.network);
                render_rule_set(&mut b, unit, rule_set, network);
            }
            ResourceIntent::Instance(instance) => render_instance(&mut b, instance)?,
            ResourceIntent::Function(function) => render_function(&mut b, function),
        }
    }

    let mut body = json!({
        "AWSTemplateFormatVersion": FORMAT_VERSION,
        "Description": description,
        "Resources": Value::Object(b.resources),
    });
    if !b.parameters.is_empty() {
        body["Parameters"] = Value::Object(b.parameters);
    }
    if !b.outputs.is_empty() {
        body["Outputs"] = Value::Object(b.outputs);
    }

    b.assets.sort();
    b.unresolved.sort();

    Ok(RenderedTemplate {
        unit: unit.clone(),
        body,
        assets: b.assets,
        exports: b.exports,
        imports: b.imports,
        unresolved: b.unresolved,
    })
}
