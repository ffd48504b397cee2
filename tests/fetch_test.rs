//! Fetch and clean against a local stand-in for the history API.
use std::collections::HashMap;
use std::net::SocketAddr;

use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tokio_test::assert_ok;

use airquality_analytics::config::HistoryQuery;
use airquality_analytics::{cleaner, fetcher, Error};

async fn history(Query(params): Query<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    // ---
    if params.get("stationID").map(String::as_str) != Some("44t") {
        return (StatusCode::OK, Json(json!({"stations": []})));
    }
    assert_eq!(params["param"], "PM25,SO2,TEMP");
    assert_eq!(params["sdate"], "2024-01-01");

    let body = json!({
        "stations": [{
            "stationID": "44t",
            "data": [
                {"DATETIMEDATA": "2024-01-01 00:00:00", "PM25": 10.5, "SO2": null, "TEMP": 0},
                {"DATETIMEDATA": "2024-01-01 01:00:00", "PM25": null, "SO2": null, "TEMP": 27.25},
                {"DATETIMEDATA": "2024-01-01 02:00:00", "PM25": 11.75, "SO2": null, "TEMP": 0}
            ]
        }]
    });
    (StatusCode::OK, Json(body))
}

async fn spawn_api() -> SocketAddr {
    // ---
    let app = Router::new()
        .route("/history", get(history))
        .route("/broken", get(|| async { "not json" }))
        .route("/down", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn query(addr: SocketAddr, path: &str, station: &str) -> HistoryQuery {
    // ---
    HistoryQuery {
        api_url: format!("http://{addr}{path}"),
        station_id: station.into(),
        params: "PM25,SO2,TEMP".into(),
        data_type: "hr".into(),
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        start_time: "00".into(),
        end_time: "23".into(),
    }
}

#[tokio::test]
async fn fetch_then_clean_pipeline() {
    // ---
    let addr = spawn_api().await;
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("hatyai.csv");
    let cleaned = dir.path().join("cleaned_data.csv");
    let client = reqwest::Client::new();

    let rows = assert_ok!(
        fetcher::fetch_to_csv(&client, &query(addr, "/history", "44t"), "DATETIMEDATA", &raw).await
    );
    assert_eq!(rows, 3);
    assert_eq!(
        std::fs::read_to_string(&raw).unwrap(),
        "DATETIMEDATA,PM25,SO2,TEMP\n\
         2024-01-01 00:00:00,10.5,,0\n\
         2024-01-01 01:00:00,,,27.25\n\
         2024-01-01 02:00:00,11.75,,0\n"
    );

    let report = assert_ok!(cleaner::clean_file(&raw, &cleaned, "DATETIMEDATA", "TEMP"));
    assert_eq!(report.dropped_columns, vec!["SO2".to_string()]);
    assert_eq!(report.leading_zeros, 1);
    assert_eq!(
        std::fs::read_to_string(&cleaned).unwrap(),
        "DATETIMEDATA,PM25,TEMP\n\
         2024-01-01 00:00:00,10.5,0\n\
         2024-01-01 01:00:00,11.12,27.25\n\
         2024-01-01 02:00:00,11.75,27.25\n"
    );
}

#[tokio::test]
async fn fetch_overwrites_previous_file() {
    // ---
    let addr = spawn_api().await;
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("hatyai.csv");
    std::fs::write(&raw, "stale,content\n1,2\n3,4\n5,6\n7,8\n").unwrap();

    let client = reqwest::Client::new();
    fetcher::fetch_to_csv(&client, &query(addr, "/history", "44t"), "DATETIMEDATA", &raw)
        .await
        .unwrap();

    let text = std::fs::read_to_string(&raw).unwrap();
    assert!(text.starts_with("DATETIMEDATA,PM25,SO2,TEMP\n"));
    assert!(!text.contains("stale"));
}

#[tokio::test]
async fn fetch_without_station_data_fails() {
    // ---
    let addr = spawn_api().await;
    let client = reqwest::Client::new();

    let err = fetcher::fetch_history(&client, &query(addr, "/history", "99x"), "DATETIMEDATA")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingStationData(_)));
}

#[tokio::test]
async fn fetch_invalid_json_fails() {
    // ---
    let addr = spawn_api().await;
    let client = reqwest::Client::new();

    let err = fetcher::fetch_history(&client, &query(addr, "/broken", "44t"), "DATETIMEDATA")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidJson(..)));
}

#[tokio::test]
async fn fetch_http_error_status_fails() {
    // ---
    let addr = spawn_api().await;
    let client = reqwest::Client::new();

    let err = fetcher::fetch_history(&client, &query(addr, "/down", "44t"), "DATETIMEDATA")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE));
}

#[tokio::test]
async fn fetch_connection_refused_fails() {
    // ---
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = reqwest::Client::new();
    let err = fetcher::fetch_history(&client, &query(addr, "/history", "44t"), "DATETIMEDATA")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NetworkRequest(..)));
}
