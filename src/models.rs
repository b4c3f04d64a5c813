pub mod cloud_instance;
pub mod network;
