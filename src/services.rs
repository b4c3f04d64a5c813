pub mod aws_service;
pub mod provision_service;
