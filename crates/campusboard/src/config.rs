use std::{env, time::Duration};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// DynamoDB table holding every record (default: "campusboard")
    /// Note: Only used when the `dynamodb` feature is enabled.
    #[allow(dead_code)]
    pub table_name: String,
    /// S3 bucket for attachment bytes (default: "campusboard-attachments")
    #[allow(dead_code)]
    pub s3_bucket: String,
    /// Endpoint override for DynamoDB and S3, e.g. a local emulator (default: unset)
    #[allow(dead_code)]
    pub aws_endpoint_url: Option<String>,
    /// Largest accepted attachment in bytes (default: 15 MiB)
    pub max_attachment_bytes: u64,
    /// Feed size when the caller gives no limit (default: 10)
    pub feed_default_limit: usize,
    /// Largest feed size a caller may ask for (default: 50)
    pub feed_max_limit: usize,
    /// Per-request timeout in seconds (default: 10)
    pub request_timeout_seconds: u64,
    /// Seed a few demo posts at startup (default: false)
    pub seed_demo_data: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DYNAMODB_TABLE_NAME` - Table name (default: "campusboard")
    /// - `S3_BUCKET` - Attachment bucket (default: "campusboard-attachments")
    /// - `AWS_ENDPOINT_URL` - Endpoint override (default: unset)
    /// - `MAX_ATTACHMENT_BYTES` - Attachment ceiling (default: 15728640)
    /// - `FEED_DEFAULT_LIMIT` - Default feed size (default: 10)
    /// - `FEED_MAX_LIMIT` - Maximum feed size (default: 50)
    /// - `REQUEST_TIMEOUT_SECONDS` - Request timeout (default: 10)
    /// - `SEED_DEMO_DATA` - Seed demo posts when set to anything but "0"/"false"
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            table_name: lookup("DYNAMODB_TABLE_NAME").unwrap_or_else(|| "campusboard".to_string()),
            s3_bucket: lookup("S3_BUCKET")
                .unwrap_or_else(|| "campusboard-attachments".to_string()),
            aws_endpoint_url: lookup("AWS_ENDPOINT_URL").filter(|v| !v.is_empty()),
            max_attachment_bytes: lookup("MAX_ATTACHMENT_BYTES")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(15 * 1024 * 1024),
            feed_default_limit: lookup("FEED_DEFAULT_LIMIT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(10),
            feed_max_limit: lookup("FEED_MAX_LIMIT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(50),
            request_timeout_seconds: lookup("REQUEST_TIMEOUT_SECONDS")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(10),
            seed_demo_data: lookup("SEED_DEMO_DATA")
                .map(|v| !matches!(v.trim(), "" | "0" | "false"))
                .unwrap_or(false),
        }
    }

    /// Get the request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
