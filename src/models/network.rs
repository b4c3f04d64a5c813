use rusoto_ec2::{DescribeVpcsRequest, Filter};

/// Domain for Elastic IPs usable inside a VPC.
pub const VPC_ADDRESS_DOMAIN: &str = "vpc";

pub fn default_vpc_request() -> DescribeVpcsRequest {
    DescribeVpcsRequest {
        filters: Some(vec![Filter {
            name: Some("isDefault".to_string()),
            values: Some(vec!["true".to_string()]),
        }]),
        ..Default::default()
    }
}

/// Picks the subnet to launch into: the preferred one when the listing
/// contains it, otherwise the first listed subnet.
pub fn select_subnet<'a>(subnet_ids: &'a [String], preferred: Option<&str>) -> Option<&'a str> {
    if let Some(preferred) = preferred {
        if let Some(found) = subnet_ids.iter().find(|id| id.as_str() == preferred) {
            return Some(found.as_str());
        }
    }

    subnet_ids.first().map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subnets() -> Vec<String> {
        vec!["subnet-a".to_string(), "subnet-b".to_string()]
    }

    #[test]
    fn test_first_subnet_without_preference() {
        assert_eq!(select_subnet(&subnets(), None), Some("subnet-a"));
    }

    #[test]
    fn test_preferred_subnet_when_listed() {
        assert_eq!(select_subnet(&subnets(), Some("subnet-b")), Some("subnet-b"));
    }

    #[test]
    fn test_unknown_preference_falls_back_to_first() {
        assert_eq!(select_subnet(&subnets(), Some("subnet-z")), Some("subnet-a"));
    }

    #[test]
    fn test_no_subnets() {
        assert_eq!(select_subnet(&[], Some("subnet-a")), None);
    }

    #[test]
    fn test_default_vpc_filter() {
        let filters = default_vpc_request().filters.unwrap();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].name.as_deref(), Some("isDefault"));
        assert_eq!(filters[0].values, Some(vec!["true".to_string()]));
    }
}
