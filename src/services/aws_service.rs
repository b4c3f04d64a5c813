use std::str::FromStr;

use async_trait::async_trait;
use rusoto_core::{HttpClient, RusotoError};
use rusoto_credential::StaticProvider;
use rusoto_ec2::{
    AllocateAddressError, AllocateAddressRequest, AllocateAddressResult, DescribeSubnetsError,
    DescribeSubnetsRequest, DescribeSubnetsResult, DescribeVpcsError, DescribeVpcsRequest,
    DescribeVpcsResult, Ec2, Ec2Client, ImportKeyPairError, ImportKeyPairRequest,
    ImportKeyPairResult, Reservation, RunInstancesError, RunInstancesRequest,
};
use rusoto_signature::Region;

use crate::config::Config;
use crate::error::{ProvisionError, Result};

/// The EC2 calls the provisioning workflow makes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Ec2Api: Send + Sync {
    async fn describe_vpcs(
        &self,
        input: DescribeVpcsRequest,
    ) -> Result<DescribeVpcsResult, RusotoError<DescribeVpcsError>>;

    async fn allocate_address(
        &self,
        input: AllocateAddressRequest,
    ) -> Result<AllocateAddressResult, RusotoError<AllocateAddressError>>;

    async fn import_key_pair(
        &self,
        input: ImportKeyPairRequest,
    ) -> Result<ImportKeyPairResult, RusotoError<ImportKeyPairError>>;

    async fn describe_subnets(
        &self,
        input: DescribeSubnetsRequest,
    ) -> Result<DescribeSubnetsResult, RusotoError<DescribeSubnetsError>>;

    async fn run_instances(
        &self,
        input: RunInstancesRequest,
    ) -> Result<Reservation, RusotoError<RunInstancesError>>;
}

#[async_trait]
impl Ec2Api for Ec2Client {
    async fn describe_vpcs(
        &self,
        input: DescribeVpcsRequest,
    ) -> Result<DescribeVpcsResult, RusotoError<DescribeVpcsError>> {
        Ec2::describe_vpcs(self, input).await
    }

    async fn allocate_address(
        &self,
        input: AllocateAddressRequest,
    ) -> Result<AllocateAddressResult, RusotoError<AllocateAddressError>> {
        Ec2::allocate_address(self, input).await
    }

    async fn import_key_pair(
        &self,
        input: ImportKeyPairRequest,
    ) -> Result<ImportKeyPairResult, RusotoError<ImportKeyPairError>> {
        Ec2::import_key_pair(self, input).await
    }

    async fn describe_subnets(
        &self,
        input: DescribeSubnetsRequest,
    ) -> Result<DescribeSubnetsResult, RusotoError<DescribeSubnetsError>> {
        Ec2::describe_subnets(self, input).await
    }

    async fn run_instances(
        &self,
        input: RunInstancesRequest,
    ) -> Result<Reservation, RusotoError<RunInstancesError>> {
        Ec2::run_instances(self, input).await
    }
}

/// Parses a region name. Names rusoto does not know yet, such as
/// `il-central-1`, are accepted when they have the `<area>-<location>-<n>`
/// shape and are routed to the regional EC2 endpoint.
pub fn parse_region(region: &str) -> Result<Region> {
    match Region::from_str(region) {
        Ok(region) => Ok(region),
        Err(_) if is_region_name(region) => {
            log::debug!("Region {} is not built into rusoto, using its EC2 endpoint", region);
            Ok(Region::Custom {
                name: region.to_string(),
                endpoint: format!("https://ec2.{}.amazonaws.com", region),
            })
        }
        Err(err) => Err(ProvisionError::InvalidRegion {
            region: region.to_string(),
            message: err.to_string(),
        }),
    }
}

fn is_region_name(region: &str) -> bool {
    let parts: Vec<&str> = region.split('-').collect();
    let Some((number, words)) = parts.split_last() else {
        return false;
    };

    words.len() >= 2
        && words
            .iter()
            .all(|word| !word.is_empty() && word.chars().all(|c| c.is_ascii_lowercase()))
        && !number.is_empty()
        && number.chars().all(|c| c.is_ascii_digit())
}

/// Builds an EC2 client bound to the configured region, signing with the
/// configured credentials.
pub fn new_ec2_client(config: &Config) -> Result<Ec2Client> {
    let region = parse_region(config.region())?;
    let credentials = StaticProvider::new(
        config.access_key_id().to_string(),
        config.secret_access_key().to_string(),
        config.session_token().map(str::to_string),
        None,
    );
    let http_client = HttpClient::new().map_err(|err| ProvisionError::HttpClient(err.to_string()))?;

    log::debug!("Created EC2 client for region {}", region.name());

    Ok(Ec2Client::new_with(http_client, credentials, region))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::{config_from, full_env};
    use crate::config::AWS_REGION;

    #[test]
    fn test_parse_region() {
        assert_eq!(parse_region("eu-west-1").unwrap(), Region::EuWest1);
    }

    #[test]
    fn test_parse_region_missing_from_rusoto() {
        for name in ["il-central-1", "ca-west-1", "me-central-1", "us-gov-west-1"] {
            let region = parse_region(name).unwrap();
            assert_eq!(region.name(), name);
        }

        assert_eq!(
            parse_region("il-central-1").unwrap(),
            Region::Custom {
                name: "il-central-1".to_string(),
                endpoint: "https://ec2.il-central-1.amazonaws.com".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_invalid_region() {
        for name in ["us east 1", "central-1", "eu-west-", "eu--1", "eu-west-1a"] {
            let err = parse_region(name).unwrap_err();
            assert!(err.to_string().starts_with(&format!("invalid AWS region '{}'", name)));
        }
    }

    #[tokio::test]
    async fn test_new_ec2_client_for_newer_region() {
        let mut env = full_env();
        env.insert(AWS_REGION, "il-central-1".to_string());
        let config = config_from(&env).unwrap();

        assert!(new_ec2_client(&config).is_ok());
    }
}
