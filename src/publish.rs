//! Uploading computed leaderboards to S3 for static hosting.

use anyhow::Result;
use aws_sdk_s3::primitives::ByteStream;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::io::Write;
use tracing::info;

/// Object key for the most recent leaderboard.
pub const LATEST_KEY: &str = "leaderboard/latest.json";

/// Serializes `value` to JSON, gzip-compressing it if `gzip` is set.
/// Returns the body together with the object key it belongs under.
pub fn encode_json(value: &impl Serialize, key: &str, gzip: bool) -> Result<(Vec<u8>, String)> {
    let json = serde_json::to_vec(value)?;

    if gzip {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json)?;
        Ok((encoder.finish()?, format!("{key}.gz")))
    } else {
        Ok((json, key.to_string()))
    }
}

/// Uploads `value` as JSON to `bucket` under `key` (plus `.gz` when compressed).
#[tracing::instrument(skip(client, value))]
pub async fn write_json_to_s3(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    value: &impl Serialize,
    gzip: bool,
) -> Result<()> {
    let (body, key) = encode_json(value, key, gzip)?;
    let bytes = body.len();

    let mut request = client
        .put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(body))
        .content_type("application/json");
    if gzip {
        request = request.content_encoding("gzip");
    }
    request.send().await?;

    info!(bucket, key = %key, bytes, "Uploaded to S3");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::GzDecoder;
    use std::io::Read;

    #[test]
    fn test_encode_plain() {
        let (body, key) = encode_json(&vec![1, 2, 3], LATEST_KEY, false).unwrap();
        assert_eq!(body, b"[1,2,3]");
        assert_eq!(key, "leaderboard/latest.json");
    }

    #[test]
    fn test_encode_gzip() {
        let (body, key) = encode_json(&vec![1, 2, 3], LATEST_KEY, true).unwrap();
        assert_eq!(key, "leaderboard/latest.json.gz");

        let mut decoded = String::new();
        GzDecoder::new(body.as_slice())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "[1,2,3]");
    }
}
