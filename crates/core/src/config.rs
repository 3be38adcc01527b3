//! Account connection string parsing
//!
//! The account is passed explicitly (CLI flag or `BLOBSYNC_ACCOUNT`), never
//! looked up from an ambient configuration source. The connection string is a
//! semicolon-separated key/value list:
//!
//! ```text
//! endpoint=https://s3.example.com;region=us-east-1;access_key=AK...;secret_key=...
//! ```

use url::Url;

use crate::error::{Error, Result};

const DEFAULT_REGION: &str = "us-east-1";

/// Parsed object-store account credentials and endpoint
#[derive(Debug, Clone)]
pub struct AccountConfig {
    pub endpoint: String,
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

impl AccountConfig {
    /// Parse a connection string; any malformed or missing field is a fatal
    /// configuration error.
    pub fn parse(connection: &str) -> Result<Self> {
        let mut endpoint = None;
        let mut region = None;
        let mut access_key = None;
        let mut secret_key = None;

        for pair in connection.split(';').filter(|p| !p.trim().is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                Error::Config(format!("malformed connection string segment '{pair}'"))
            })?;
            let value = value.trim().to_string();
            match key.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value),
                "region" => region = Some(value),
                "access_key" | "accesskey" => access_key = Some(value),
                "secret_key" | "secretkey" => secret_key = Some(value),
                other => {
                    return Err(Error::Config(format!(
                        "unknown connection string field '{other}'"
                    )));
                }
            }
        }

        let endpoint =
            endpoint.ok_or_else(|| Error::Config("connection string missing 'endpoint'".into()))?;
        let url = Url::parse(&endpoint)
            .map_err(|e| Error::Config(format!("invalid endpoint '{endpoint}': {e}")))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::Config(format!(
                "endpoint must be http or https, got '{}'",
                url.scheme()
            )));
        }

        Ok(Self {
            endpoint,
            region: region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
            access_key: access_key
                .ok_or_else(|| Error::Config("connection string missing 'access_key'".into()))?,
            secret_key: secret_key
                .ok_or_else(|| Error::Config("connection string missing 'secret_key'".into()))?,
        })
    }
}
