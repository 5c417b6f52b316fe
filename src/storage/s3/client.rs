//! S3 client module
//! Signed path-style requests against a single bucket.

use bytes::Bytes;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, DATE};
use reqwest::{Method, StatusCode};

use crate::error::{AppError, Result};
use crate::storage::s3::signer::Signer;

/// S3 client
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    endpoint: String,
    bucket: String,
    access_key: String,
    secret_key: String,
}

impl Client {
    /// Create a new S3 client
    ///
    /// # Arguments
    /// - endpoint: scheme://host:port of the S3-compatible service
    /// - bucket: bucket name
    /// - access_key / secret_key: credentials
    pub fn new(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            endpoint,
            bucket: bucket.into(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Canonicalized resource for the bucket itself
    pub fn bucket_resource(&self) -> String {
        format!("/{}", self.bucket)
    }

    /// Canonicalized resource for an object key
    pub fn object_resource(&self, key: &str) -> String {
        format!("/{}/{}", self.bucket, key.trim_start_matches('/'))
    }

    /// Full URL for a canonicalized resource
    pub fn url_for(&self, resource: &str) -> String {
        format!("{}{}", self.endpoint, resource)
    }

    fn date_header() -> String {
        Utc::now().format("%a, %d %b %Y %T GMT").to_string()
    }

    /// Date and Authorization headers for one request
    fn signed_headers(&self, method: &Method, content_type: &str, resource: &str) -> HeaderMap {
        let date = Self::date_header();
        let auth = Signer::new(method.as_str(), content_type, &date, resource)
            .authorization(&self.access_key, &self.secret_key);

        let mut headers = HeaderMap::new();
        headers.insert(DATE, HeaderValue::from_str(&date).unwrap());
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&auth).unwrap());
        if !content_type.is_empty() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_str(content_type).unwrap());
        }
        headers
    }

    /// Upload an object
    pub async fn put_object(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        let resource = self.object_resource(key);
        let headers = self.signed_headers(&Method::PUT, content_type, &resource);

        let resp = self
            .http
            .put(self.url_for(&resource))
            .headers(headers)
            .header(CONTENT_LENGTH, data.len())
            .body(data)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 put failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(AppError::Storage(format!(
                "S3 put returned {} for {}",
                resp.status(),
                key
            )));
        }

        tracing::debug!("Uploaded object {}", key);
        Ok(())
    }

    /// Fetch an object; the response body is consumed by the caller as a stream
    pub async fn get_object(&self, key: &str) -> Result<reqwest::Response> {
        let resource = self.object_resource(key);
        let headers = self.signed_headers(&Method::GET, "", &resource);

        let resp = self
            .http
            .get(self.url_for(&resource))
            .headers(headers)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 get failed: {}", e)))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("Blob not found: {}", key)));
        }
        if !resp.status().is_success() {
            return Err(AppError::Storage(format!(
                "S3 get returned {} for {}",
                resp.status(),
                key
            )));
        }

        Ok(resp)
    }

    /// Check whether an object exists
    pub async fn head_object(&self, key: &str) -> Result<bool> {
        let resource = self.object_resource(key);
        let headers = self.signed_headers(&Method::HEAD, "", &resource);

        let resp = self
            .http
            .head(self.url_for(&resource))
            .headers(headers)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 head failed: {}", e)))?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !resp.status().is_success() {
            return Err(AppError::Storage(format!(
                "S3 head returned {} for {}",
                resp.status(),
                key
            )));
        }

        Ok(true)
    }

    /// Create the bucket if it does not exist
    pub async fn ensure_bucket(&self) -> Result<()> {
        let resource = self.bucket_resource();
        let headers = self.signed_headers(&Method::HEAD, "", &resource);

        let resp = self
            .http
            .head(self.url_for(&resource))
            .headers(headers)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 bucket check failed: {}", e)))?;

        if resp.status().is_success() {
            tracing::debug!("Bucket {} already exists", self.bucket);
            return Ok(());
        }
        if resp.status() != StatusCode::NOT_FOUND {
            return Err(AppError::Storage(format!(
                "S3 bucket check returned {}",
                resp.status()
            )));
        }

        let headers = self.signed_headers(&Method::PUT, "", &resource);
        let resp = self
            .http
            .put(self.url_for(&resource))
            .headers(headers)
            .header(CONTENT_LENGTH, 0)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 bucket create failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(AppError::Storage(format!(
                "S3 bucket create returned {}",
                resp.status()
            )));
        }

        tracing::info!("Created bucket {}", self.bucket);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_paths() {
        let client = Client::new("http://minio:9000", "pdfs", "minioadmin", "minioadmin");
        assert_eq!(client.bucket_resource(), "/pdfs");
        assert_eq!(client.object_resource("a.pdf"), "/pdfs/a.pdf");
        assert_eq!(client.object_resource("/a.pdf"), "/pdfs/a.pdf");
    }

    #[test]
    fn test_url_building_trims_trailing_slash() {
        let client = Client::new("http://minio:9000/", "pdfs", "minioadmin", "minioadmin");
        assert_eq!(
            client.url_for(&client.object_resource("a.pdf")),
            "http://minio:9000/pdfs/a.pdf"
        );
    }
}
