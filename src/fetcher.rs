//! Fetch stage: one request to the air4thai history API.

use std::path::Path;

use serde_json::{Map, Value};

use crate::config::HistoryQuery;
use crate::error::{Error, Result};
use crate::models::Table;

// ---

impl HistoryQuery {
    // ---
    /// Query string pairs in the order the history endpoint documents them.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("stationID", self.station_id.clone()),
            ("param", self.params.clone()),
            ("type", self.data_type.clone()),
            ("sdate", self.start_date.format("%Y-%m-%d").to_string()),
            ("edate", self.end_date.format("%Y-%m-%d").to_string()),
            ("stime", self.start_time.clone()),
            ("etime", self.end_time.clone()),
        ]
    }
}

/// Issue the history request and return the first station's records as a
/// table.
///
/// No retry and no timeout: any failure is returned to the caller.
pub async fn fetch_history(
    client: &reqwest::Client,
    query: &HistoryQuery,
    timestamp_column: &str,
) -> Result<Table> {
    // ---
    let request = client
        .get(&query.api_url)
        .query(&query.query_pairs())
        .build()
        .map_err(|e| Error::NetworkRequest(query.api_url.clone(), e))?;
    let url = request.url().to_string();

    tracing::debug!("Fetching history from: {}", url);

    let response = client
        .execute(request)
        .await
        .map_err(|e| Error::NetworkRequest(url.clone(), e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpStatus { url, status });
    }

    let body = response
        .text()
        .await
        .map_err(|e| Error::NetworkRequest(url.clone(), e))?;
    let json: Value = serde_json::from_str(&body).map_err(|e| Error::InvalidJson(url.clone(), e))?;

    let records = station_records(json, &url)?;
    tracing::info!("Received {} records from {}", records.len(), url);

    Table::from_records(&records, timestamp_column)
}

/// Fetch and write the raw CSV, replacing any previous file. Returns the
/// number of rows written.
pub async fn fetch_to_csv(
    client: &reqwest::Client,
    query: &HistoryQuery,
    timestamp_column: &str,
    path: &Path,
) -> Result<usize> {
    // ---
    let table = fetch_history(client, query, timestamp_column).await?;
    table.write_csv(path)?;

    tracing::info!(
        "Wrote {} rows x {} columns to {}",
        table.len(),
        table.columns.len() + 1,
        path.display()
    );
    Ok(table.len())
}

/// Extract `stations[0].data` from the response body.
fn station_records(mut body: Value, url: &str) -> Result<Vec<Map<String, Value>>> {
    // ---
    let data = body
        .get_mut("stations")
        .and_then(|s| s.get_mut(0))
        .and_then(|s| s.get_mut("data"))
        .filter(|d| d.is_array())
        .map(Value::take)
        .ok_or_else(|| Error::MissingStationData(url.to_string()))?;

    serde_json::from_value(data).map_err(|e| Error::InvalidJson(url.to_string(), e))
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_query_pairs() {
        // ---
        let query = HistoryQuery {
            api_url: "http://localhost/history".into(),
            station_id: "44t".into(),
            params: "PM25,TEMP".into(),
            data_type: "hr".into(),
            start_date: NaiveDate::from_ymd_opt(2023, 12, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            start_time: "00".into(),
            end_time: "23".into(),
        };

        let pairs = query.query_pairs();
        assert_eq!(pairs[0], ("stationID", "44t".to_string()));
        assert_eq!(pairs[3], ("sdate", "2023-12-01".to_string()));
        assert_eq!(pairs[4], ("edate", "2024-03-10".to_string()));
        assert_eq!(pairs.len(), 7);
    }

    #[test]
    fn test_station_records_takes_first_station() {
        // ---
        let body = json!({
            "stations": [
                {"data": [{"DATETIMEDATA": "2024-01-01 00:00:00", "PM25": 1}]},
                {"data": []}
            ]
        });
        let records = station_records(body, "u").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["PM25"], 1);
    }

    #[test]
    fn test_station_records_missing_path() {
        // ---
        for body in [
            json!({}),
            json!({"stations": []}),
            json!({"stations": [{}]}),
            json!({"stations": [{"data": {}}]}),
        ] {
            let err = station_records(body, "u").unwrap_err();
            assert!(matches!(err, Error::MissingStationData(_)));
        }
    }

    #[test]
    fn test_station_records_rejects_non_object_rows() {
        // ---
        let err = station_records(json!({"stations": [{"data": [1, 2]}]}), "u").unwrap_err();
        assert!(matches!(err, Error::InvalidJson(..)));
    }
}
