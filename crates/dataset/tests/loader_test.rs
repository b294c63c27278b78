//! Integration tests for fetching datasets over HTTP (mockito server).

use chat_core::DatasetSource;
use dataset::{DatasetError, DatasetLoader};

#[tokio::test]
async fn test_from_url_parses_csv_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/people.csv")
        .with_status(200)
        .with_header("content-type", "text/csv")
        .with_body("age,dept\n30,eng\n41,ops\n25,eng\n")
        .create_async()
        .await;

    let loader = DatasetLoader::new();
    let dataset = loader
        .from_url(&format!("{}/people.csv", server.url()))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(dataset.row_count(), 3);
    assert_eq!(dataset.column_names(), vec!["age", "dept"]);
}

#[tokio::test]
async fn test_from_url_non_200_is_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/missing.csv")
        .with_status(404)
        .create_async()
        .await;

    let err = DatasetLoader::new()
        .from_url(&format!("{}/missing.csv", server.url()))
        .await
        .unwrap_err();

    assert!(matches!(err, DatasetError::Status(404)));
    assert_eq!(err.to_string(), "Failed to fetch CSV: HTTP 404");
}

#[tokio::test]
async fn test_from_url_rejects_scheme_before_request() {
    let err = DatasetLoader::new()
        .from_url("ftp://example.com/data.csv")
        .await
        .unwrap_err();
    assert!(matches!(err, DatasetError::UnsupportedScheme(_)));
}

#[tokio::test]
async fn test_rehydrate_url_source() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/sales.csv")
        .with_status(200)
        .with_body("region,amount\nnorth,10\nsouth,12.5\n")
        .create_async()
        .await;

    let source = DatasetSource::Url {
        url: format!("{}/sales.csv", server.url()),
    };
    let dataset = DatasetLoader::new().rehydrate(&source).await.unwrap();
    assert_eq!(dataset.numeric_columns().len(), 1);
    assert_eq!(dataset.categorical_columns().len(), 1);
}
