use rusoto_ec2::RunInstancesRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudInstance {
    pub id: String,
    pub subnet_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCloudInstance {
    pub image_id: String,
    pub instance_type: String,
    pub key_name: String,
    pub subnet_id: String,
}

impl LaunchCloudInstance {
    /// Exactly one instance is requested.
    pub fn into_request(self) -> RunInstancesRequest {
        RunInstancesRequest {
            image_id: Some(self.image_id),
            instance_type: Some(self.instance_type),
            key_name: Some(self.key_name),
            subnet_id: Some(self.subnet_id),
            min_count: 1,
            max_count: 1,
            ..Default::default()
        }
    }
}
