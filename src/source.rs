//! Loading score sheets and rosters from a URL, an S3 object or a local file.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::fetch::{BasicClient, Fetched, fetch_text};

/// Where a document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Http(String),
    S3 { bucket: String, key: String },
    File(String),
}

impl Source {
    /// Classifies a source string: `http(s)://...`, `s3://bucket/key`, or a path.
    pub fn parse(source: &str) -> Result<Self> {
        if source.starts_with("http://") || source.starts_with("https://") {
            return Ok(Self::Http(source.to_string()));
        }

        if let Some(rest) = source.strip_prefix("s3://") {
            return match rest.split_once('/') {
                Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => Ok(Self::S3 {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                }),
                _ => bail!("S3 source must look like s3://bucket/key, got {source}"),
            };
        }

        Ok(Self::File(source.to_string()))
    }
}

/// Loads the document at `source` along with its last-modified time.
#[tracing::instrument]
pub async fn load(source: &str) -> Result<Fetched> {
    let fetched = match Source::parse(source)? {
        Source::Http(url) => fetch_text(&BasicClient::new()?, &url).await?,
        Source::S3 { bucket, key } => load_s3(&bucket, &key).await?,
        Source::File(path) => load_file(&path)?,
    };

    info!(
        bytes = fetched.body.len(),
        last_modified = ?fetched.last_modified,
        "Source loaded"
    );
    Ok(fetched)
}

fn load_file(path: &str) -> Result<Fetched> {
    let body =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    let last_modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::<Utc>::from);

    Ok(Fetched {
        body,
        last_modified,
    })
}

async fn load_s3(bucket: &str, key: &str) -> Result<Fetched> {
    let config = aws_config::load_from_env().await;
    let s3 = aws_sdk_s3::Client::new(&config);

    let object = s3
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .with_context(|| format!("Failed to get s3://{bucket}/{key}"))?;

    let last_modified = object
        .last_modified()
        .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos()));

    let bytes = object.body.collect().await?.into_bytes();
    let body = String::from_utf8(bytes.to_vec())
        .with_context(|| format!("s3://{bucket}/{key} is not valid UTF-8"))?;

    Ok(Fetched {
        body,
        last_modified,
    })
}
