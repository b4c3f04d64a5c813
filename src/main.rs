use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;

use crate::config::{load_env_file, Config, EnvSource, DEFAULT_ENV_FILE};
use crate::services::{aws_service::new_ec2_client, provision_service::provision};

mod config;
mod error;
mod models;
mod services;
mod util;

/// Provision a default-VPC Elastic IP, an imported SSH key pair and one EC2
/// instance, configured through environment variables.
#[derive(Debug, Parser)]
#[command(name = "ec2-provisioner", version)]
struct Args {
    /// Path to .env file
    #[arg(long = "env", value_name = "PATH", default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,
}

/// Accepts the single-dash `-env` spelling alongside `--env`.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some("-env") => OsString::from("--env"),
            Some(value) if value.starts_with("-env=") => OsString::from(format!("-{}", value)),
            _ => arg,
        })
        .collect()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse_from(normalize_args(std::env::args_os()));

    let source = load_env_file(&args.env_file);
    match &source {
        EnvSource::Unreadable { .. } => log::warn!("{}", source),
        _ => println!("{}", source),
    }

    let config = Config::from_env()?;
    log::debug!("Resolved configuration: {:?}", config);

    let client = new_ec2_client(&config)?;

    let mut stdout = std::io::stdout();
    let report = provision(&client, &config, &mut stdout).await?;
    log::info!(
        "Provisioned {} in {} (VPC {}, Elastic IP {}, key pair '{}')",
        report.instance.id,
        report.instance.subnet_id,
        report.vpc_id,
        report.elastic_ip,
        report.key_name
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::parse_from(normalize_args(args.iter().map(OsString::from)))
    }

    #[test]
    fn test_default_env_file() {
        assert_eq!(parse(&["ec2-provisioner"]).env_file, PathBuf::from(".env"));
    }

    #[test]
    fn test_go_style_env_flag() {
        let args = parse(&["ec2-provisioner", "-env", "conf/prod.env"]);
        assert_eq!(args.env_file, PathBuf::from("conf/prod.env"));

        let args = parse(&["ec2-provisioner", "-env=conf/dev.env"]);
        assert_eq!(args.env_file, PathBuf::from("conf/dev.env"));
    }

    #[test]
    fn test_long_env_flag() {
        let args = parse(&["ec2-provisioner", "--env", "other.env"]);
        assert_eq!(args.env_file, PathBuf::from("other.env"));
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        let result = Args::try_parse_from(normalize_args(
            ["ec2-provisioner", "--region", "us-east-1"].map(OsString::from),
        ));
        assert!(result.is_err());
    }
}
