use std::path::PathBuf;

use rusoto_core::RusotoError;
use rusoto_ec2::{
    AllocateAddressError, DescribeSubnetsError, DescribeVpcsError, ImportKeyPairError,
    RunInstancesError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("{0} environment variable is not set")]
    MissingVar(&'static str),

    #[error("invalid AWS region '{region}': {message}")]
    InvalidRegion { region: String, message: String },

    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),

    #[error("failed to expand public key path: cannot determine home directory")]
    HomeDir,

    #[error("failed to read public key file {}: {source}", path.display())]
    ReadPublicKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no default VPC found")]
    NoDefaultVpc,

    #[error("no subnets found in the current VPC")]
    NoSubnets,

    #[error("no instances were created")]
    NoInstances,

    #[error("{field} missing from {operation} response")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    #[error(transparent)]
    DescribeVpcs(#[from] RusotoError<DescribeVpcsError>),

    #[error(transparent)]
    AllocateAddress(#[from] RusotoError<AllocateAddressError>),

    #[error("failed to import key pair: {0}")]
    ImportKeyPair(#[from] RusotoError<ImportKeyPairError>),

    #[error("failed to describe subnets: {0}")]
    DescribeSubnets(#[from] RusotoError<DescribeSubnetsError>),

    #[error(transparent)]
    RunInstances(#[from] RusotoError<RunInstancesError>),
}

pub type Result<T, E = ProvisionError> = std::result::Result<T, E>;
