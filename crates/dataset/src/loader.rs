//! Building datasets from raw CSV bytes, an HTTP(S) URL or a persisted [`DatasetSource`].

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chat_core::DatasetSource;
use reqwest::Client;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::DatasetError;
use crate::frame::Dataset;

/// Total request timeout when fetching a dataset over HTTP.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Loads datasets; holds one reusable HTTP client.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    client: Client,
}

impl DatasetLoader {
    pub fn new() -> Self {
        let client = match Client::builder().timeout(FETCH_TIMEOUT).build() {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Failed to build HTTP client with timeout, using defaults");
                Client::new()
            }
        };
        Self { client }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Parses CSV bytes; the first record is the header row.
    ///
    /// Short rows are padded with missing cells; a row longer than the header is an error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Dataset, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = result?;
            if record.len() > headers.len() {
                return Err(DatasetError::Malformed(format!(
                    "row {} has {} fields, header has {}",
                    index + 1,
                    record.len(),
                    headers.len()
                )));
            }
            rows.push(record.iter().map(String::from).collect::<Vec<String>>());
        }

        let dataset = Dataset::from_records(&headers, &rows)?;
        debug!(
            rows = dataset.row_count(),
            columns = dataset.column_count(),
            "Parsed CSV dataset"
        );
        Ok(dataset)
    }

    /// Fetches and parses a CSV over HTTP or HTTPS. Any status other than 200 is an error.
    pub async fn from_url(&self, url: &str) -> Result<Dataset, DatasetError> {
        let url = validate_url(url)?;
        info!(url = %url, "Fetching CSV dataset");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if status.as_u16() != 200 {
            warn!(url = %url, status = status.as_u16(), "CSV fetch returned non-200 status");
            return Err(DatasetError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        Self::from_bytes(&bytes)
    }

    /// Rebuilds a dataset from the reference stored in conversation metadata.
    pub async fn rehydrate(&self, source: &DatasetSource) -> Result<Dataset, DatasetError> {
        match source {
            DatasetSource::Url { url } => self.from_url(url).await,
            DatasetSource::Upload {
                filename,
                data_base64,
            } => {
                let bytes = BASE64
                    .decode(data_base64)
                    .map_err(|e| DatasetError::Encoding(format!("{}: {}", filename, e)))?;
                Self::from_bytes(&bytes)
            }
        }
    }
}

impl Default for DatasetLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Source reference for uploaded bytes.
pub fn upload_source(filename: &str, bytes: &[u8]) -> DatasetSource {
    DatasetSource::Upload {
        filename: filename.to_string(),
        data_base64: BASE64.encode(bytes),
    }
}

/// Parses `raw` and accepts only `http` and `https` URLs.
pub fn validate_url(raw: &str) -> Result<Url, DatasetError> {
    let url = Url::parse(raw).map_err(|e| DatasetError::InvalidUrl(format!("{}: {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DatasetError::UnsupportedScheme(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_schemes() {
        assert!(validate_url("https://example.com/data.csv").is_ok());
        assert!(validate_url("http://example.com/data.csv").is_ok());
        assert!(matches!(
            validate_url("ftp://example.com/data.csv"),
            Err(DatasetError::UnsupportedScheme(s)) if s == "ftp"
        ));
        assert!(matches!(
            validate_url("file:///etc/passwd"),
            Err(DatasetError::UnsupportedScheme(_))
        ));
        assert!(matches!(
            validate_url("not a url"),
            Err(DatasetError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_from_bytes_pads_short_rows() {
        let dataset = DatasetLoader::from_bytes(b"a,b\n1,x\n2\n").unwrap();
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.column("b").unwrap().null_count(), 1);
    }

    #[test]
    fn test_from_bytes_rejects_long_rows() {
        let err = DatasetLoader::from_bytes(b"a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(err, DatasetError::Malformed(_)));
    }

    #[test]
    fn test_from_bytes_empty_input() {
        assert!(matches!(
            DatasetLoader::from_bytes(b""),
            Err(DatasetError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_rehydrate_upload_round_trips_bytes() {
        let source = upload_source("people.csv", b"age,dept\n30,eng\n41,ops\n");
        let dataset = DatasetLoader::new().rehydrate(&source).await.unwrap();
        assert_eq!(dataset.row_count(), 2);
        assert_eq!(dataset.column_names(), vec!["age", "dept"]);
    }

    #[tokio::test]
    async fn test_rehydrate_rejects_bad_base64() {
        let source = DatasetSource::Upload {
            filename: "x.csv".to_string(),
            data_base64: "%%%".to_string(),
        };
        let err = DatasetLoader::new().rehydrate(&source).await.unwrap_err();
        assert!(matches!(err, DatasetError::Encoding(_)));
    }
}
