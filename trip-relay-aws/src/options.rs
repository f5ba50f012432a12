use aws_config::{BehaviorVersion, Region, SdkConfig};

/// The region used when none is given.
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone)]
/// Where and how to reach AWS.
pub struct AwsOptions {
    region: String,
    endpoint_url: Option<String>,
}

impl Default for AwsOptions {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_owned(),
            endpoint_url: None,
        }
    }
}

impl AwsOptions {
    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn set_region<S: Into<String>>(&mut self, region: S) -> &mut Self {
        self.region = region.into();
        self
    }

    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    /// Send every request to this endpoint instead, e.g. a LocalStack container.
    pub fn set_endpoint_url<S: Into<String>>(&mut self, url: S) -> &mut Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Resolve credentials and build the shared SDK config. Credentials come from the default provider chain.
    pub async fn load(&self) -> SdkConfig {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(self.region.clone()));
        if let Some(url) = &self.endpoint_url {
            loader = loader.endpoint_url(url);
        }
        loader.load().await
    }
}
