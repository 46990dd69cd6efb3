use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_sdk_dynamodb::config::Region;
use color_eyre::eyre::{Context, Result};

const FALLBACK_REGION: &str = "us-east-1";

/// Named AWS profiles the browser may run under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Profile {
    #[default]
    Dev,
    Prod,
}

impl Profile {
    pub fn name(&self) -> &'static str {
        match self {
            Profile::Dev => "dev",
            Profile::Prod => "prod",
        }
    }
}

/// Client for `profile`. An explicit `region` wins over the environment and
/// the profile, with `us-east-1` as the last resort.
pub async fn new_client(
    profile: Profile,
    region: Option<&str>,
    endpoint_url: Option<&str>,
) -> aws_sdk_dynamodb::Client {
    let region_provider = RegionProviderChain::first_try(region.map(|r| Region::new(r.to_owned())))
        .or_default_provider()
        .or_else(Region::new(FALLBACK_REGION));

    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .profile_name(profile.name())
        .region(region_provider);

    if let Some(url) = endpoint_url {
        loader = loader.endpoint_url(url);
    }

    let config = loader.load().await;
    tracing::debug!(
        profile = profile.name(),
        region = ?config.region(),
        endpoint_url,
        "aws config loaded"
    );
    aws_sdk_dynamodb::Client::new(&config)
}

pub async fn validate_connection(client: &aws_sdk_dynamodb::Client) -> Result<()> {
    client
        .list_tables()
        .limit(1)
        .send()
        .await
        .map(|_| ())
        .wrap_err("Failed to connect to DynamoDB")
}

#[cfg(test)]
mod tests {
    use clap::ValueEnum;

    use super::*;

    #[test]
    fn profiles_parse_from_cli_names() {
        assert_eq!(Profile::from_str("dev", false), Ok(Profile::Dev));
        assert_eq!(Profile::from_str("prod", false), Ok(Profile::Prod));
        assert!(Profile::from_str("staging", false).is_err());
        assert_eq!(Profile::default().name(), "dev");
    }
}
