use aws_config::{retry::RetryConfig, Region};
use aws_sdk_cloudwatchlogs as cloudwatchlogs;

pub struct LogClientBuilder {
    region: Option<String>,
    retry_config: RetryConfig,
}

impl LogClientBuilder {
    pub fn new() -> Self {
        LogClientBuilder {
            region: None,
            retry_config: RetryConfig::standard(),
        }
    }

    pub fn use_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    pub async fn build(&self) -> eyre::Result<cloudwatchlogs::Client> {
        let mut builder = aws_config::from_env().retry_config(self.retry_config.clone());

        if let Some(region) = &self.region {
            builder = builder.region(Region::new(region.clone()));
        }

        let config = builder.load().await;

        Ok(cloudwatchlogs::Client::new(&config))
    }
}
