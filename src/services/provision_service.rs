use std::io::Write;

use anyhow::Context;
use bytes::Bytes;
use rusoto_ec2::{AllocateAddressRequest, DescribeSubnetsRequest, ImportKeyPairRequest};

use crate::{
    config::Config,
    error::{ProvisionError, Result},
    models::cloud_instance::{CloudInstance, LaunchCloudInstance},
    models::network::{default_vpc_request, select_subnet, VPC_ADDRESS_DOMAIN},
    services::aws_service::Ec2Api,
    util::path::expand_home,
};

/// Everything a successful run created or looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    pub vpc_id: String,
    pub elastic_ip: String,
    pub key_name: String,
    pub instance: CloudInstance,
}

/// Runs the four steps in order and stops at the first failure. Nothing that
/// was created before the failure is released.
///
/// The VPC id and the Elastic IP are reported but not wired into the launch:
/// the address stays unassociated and the instance goes into whichever subnet
/// the account lists first.
pub async fn provision<W: Write>(
    client: &dyn Ec2Api,
    config: &Config,
    out: &mut W,
) -> anyhow::Result<ProvisionReport> {
    let vpc_id = get_default_vpc(client)
        .await
        .context("Failed to get default VPC")?;
    writeln!(out, "Using Default VPC ID: {}", vpc_id)?;

    let elastic_ip = allocate_elastic_ip(client)
        .await
        .context("Failed to allocate Elastic IP")?;
    writeln!(out, "Elastic IP: {}", elastic_ip)?;

    let key_name = import_key_pair_from_file(client, config)
        .await
        .context("Failed to create key pair from public key")?;
    writeln!(
        out,
        "Key pair '{}' created successfully from public key file.",
        key_name
    )?;
    writeln!(out, "Key pair created successfully.")?;

    let launch = prepare_launch(client, config)
        .await
        .context("Failed to create EC2 instance")?;
    writeln!(out, "Using subnet ID: {}", launch.subnet_id)?;

    let instance = run_instance(client, launch)
        .await
        .context("Failed to create EC2 instance")?;
    writeln!(out, "EC2 Instance ID: {}", instance.id)?;

    Ok(ProvisionReport {
        vpc_id,
        elastic_ip,
        key_name,
        instance,
    })
}

pub async fn get_default_vpc(client: &dyn Ec2Api) -> Result<String> {
    log::debug!("Looking up the default VPC");
    let result = client.describe_vpcs(default_vpc_request()).await?;

    let vpc = result
        .vpcs
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or(ProvisionError::NoDefaultVpc)?;

    vpc.vpc_id.ok_or(ProvisionError::MissingField {
        operation: "DescribeVpcs",
        field: "VpcId",
    })
}

pub async fn allocate_elastic_ip(client: &dyn Ec2Api) -> Result<String> {
    log::debug!("Allocating an Elastic IP in the {} domain", VPC_ADDRESS_DOMAIN);
    let request = AllocateAddressRequest {
        domain: Some(VPC_ADDRESS_DOMAIN.to_string()),
        ..Default::default()
    };

    let result = client.allocate_address(request).await?;
    if let Some(allocation_id) = &result.allocation_id {
        log::info!("Allocated address {}", allocation_id);
    }

    result.public_ip.ok_or(ProvisionError::MissingField {
        operation: "AllocateAddress",
        field: "PublicIp",
    })
}

/// Imports the configured public key file as a key pair and returns the key
/// pair name. The file content is sent as-is.
pub async fn import_key_pair_from_file(client: &dyn Ec2Api, config: &Config) -> Result<String> {
    let key_name = config.key_name()?;
    let path = expand_home(config.public_key_path()?)?;

    let material = tokio::fs::read(&path)
        .await
        .map_err(|source| ProvisionError::ReadPublicKey {
            path: path.clone(),
            source,
        })?;

    log::debug!("Importing key pair '{}' from {}", key_name, path.display());
    let request = ImportKeyPairRequest {
        key_name: key_name.to_string(),
        public_key_material: Bytes::from(material),
        ..Default::default()
    };

    let result = client.import_key_pair(request).await?;
    if let Some(fingerprint) = &result.key_fingerprint {
        log::info!("Key pair '{}' has fingerprint {}", key_name, fingerprint);
    }

    Ok(key_name.to_string())
}

/// Resolves the launch settings and picks the subnet: the preferred one if
/// it is listed, else the first subnet returned.
pub async fn prepare_launch(client: &dyn Ec2Api, config: &Config) -> Result<LaunchCloudInstance> {
    let image_id = config.ami_id()?;
    let instance_type = config.instance_type()?;
    let key_name = config.key_name()?;

    let subnet_ids: Vec<String> = client
        .describe_subnets(DescribeSubnetsRequest::default())
        .await?
        .subnets
        .unwrap_or_default()
        .into_iter()
        .filter_map(|subnet| subnet.subnet_id)
        .collect();

    let subnet_id = select_subnet(&subnet_ids, config.subnet_id())
        .ok_or(ProvisionError::NoSubnets)?
        .to_string();

    if let Some(preferred) = config.subnet_id() {
        if preferred != subnet_id {
            log::warn!(
                "Provided subnet ID {} is invalid. Using the first available subnet: {}",
                preferred,
                subnet_id
            );
        }
    }
    log::debug!("Selected subnet {}", subnet_id);

    Ok(LaunchCloudInstance {
        image_id: image_id.to_string(),
        instance_type: instance_type.to_string(),
        key_name: key_name.to_string(),
        subnet_id,
    })
}

/// Requests exactly one instance.
pub async fn run_instance(client: &dyn Ec2Api, launch: LaunchCloudInstance) -> Result<CloudInstance> {
    let subnet_id = launch.subnet_id.clone();
    let reservation = client.run_instances(launch.into_request()).await?;
    let instance = reservation
        .instances
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or(ProvisionError::NoInstances)?;

    let id = instance.instance_id.ok_or(ProvisionError::MissingField {
        operation: "RunInstances",
        field: "InstanceId",
    })?;

    Ok(CloudInstance { id, subnet_id })
}
