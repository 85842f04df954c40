//! Naver DataLab search-trend client
//!
//! One POST per run covers every configured keyword group at daily
//! granularity and is flattened into [`DailyTrendRecord`] rows.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest_middleware::ClientWithMiddleware;
use tracing::{debug, error, info, warn};

use crate::config::{KeywordGroup, ResolvedCredentials};
use crate::error::TrendWeatherError;
use crate::models::DailyTrendRecord;

const DATALAB_SEARCH_URL: &str = "https://openapi.naver.com/v1/datalab/search";

/// Client for the Naver DataLab Search Trend API
pub struct TrendClient {
    client: ClientWithMiddleware,
    credentials: ResolvedCredentials,
    base_url: String,
}

impl TrendClient {
    pub fn new(client: ClientWithMiddleware, credentials: ResolvedCredentials) -> Self {
        Self {
            client,
            credentials,
            base_url: DATALAB_SEARCH_URL.to_string(),
        }
    }

    /// Override the endpoint, for tests against a local server
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch daily relative search interest for every keyword group in the
    /// inclusive date range, one record per (date, group)
    pub async fn fetch_daily(
        &self,
        keyword_groups: &[KeywordGroup],
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<DailyTrendRecord>> {
        info!(
            "Fetching daily search trends for {} keyword groups ({} - {})",
            keyword_groups.len(),
            start_date,
            end_date
        );

        let body = datalab::SearchRequest::new(keyword_groups, start_date, end_date);
        debug!("DataLab request URL: {}", self.base_url);

        let response = self
            .client
            .post(&self.base_url)
            .header("X-Naver-Client-Id", &self.credentials.client_id)
            .header("X-Naver-Client-Secret", &self.credentials.client_secret)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("DataLab request failed: {}", e);
                TrendWeatherError::api(format!("DataLab request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("DataLab request returned HTTP {}", status);
            return Err(TrendWeatherError::api(format!(
                "DataLab request failed with status: {} - {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            ))
            .into());
        }

        let search_response: datalab::SearchResponse = response
            .json()
            .await
            .with_context(|| "Failed to parse DataLab search response")
            .map_err(|e| {
                error!("Failed to parse DataLab response: {}", e);
                TrendWeatherError::api("Invalid trend data received from the DataLab API")
            })?;

        if search_response.results.is_empty() {
            warn!("DataLab returned no result series for the requested keyword groups");
        }

        let records = datalab::into_records(search_response)?;
        info!("Fetched {} trend rows", records.len());

        Ok(records)
    }
}

/// DataLab API request/response structures and conversion utilities
mod datalab {
    use super::{DailyTrendRecord, KeywordGroup, NaiveDate, Result, TrendWeatherError};
    use serde::{Deserialize, Serialize};

    /// Search-trend request body; `time_unit` is fixed to daily granularity
    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct SearchRequest {
        pub start_date: String,
        pub end_date: String,
        pub time_unit: &'static str,
        pub keyword_groups: Vec<RequestGroup>,
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestGroup {
        pub group_name: String,
        pub keywords: Vec<String>,
    }

    impl SearchRequest {
        pub fn new(
            keyword_groups: &[KeywordGroup],
            start_date: NaiveDate,
            end_date: NaiveDate,
        ) -> Self {
            Self {
                start_date: start_date.format("%Y-%m-%d").to_string(),
                end_date: end_date.format("%Y-%m-%d").to_string(),
                time_unit: "date",
                keyword_groups: keyword_groups
                    .iter()
                    .map(|group| RequestGroup {
                        group_name: group.name.clone(),
                        keywords: group.keywords.clone(),
                    })
                    .collect(),
            }
        }
    }

    /// Search-trend response from the DataLab API
    #[derive(Debug, Deserialize)]
    pub struct SearchResponse {
        #[serde(default)]
        pub results: Vec<GroupSeries>,
    }

    /// Daily interest series for one keyword group
    #[derive(Debug, Deserialize)]
    pub struct GroupSeries {
        pub title: String,
        #[serde(default)]
        pub data: Vec<DataPoint>,
    }

    #[derive(Debug, Deserialize)]
    pub struct DataPoint {
        pub period: String,
        pub ratio: f64,
    }

    /// Flatten the grouped series into one record per (date, group)
    pub fn into_records(response: SearchResponse) -> Result<Vec<DailyTrendRecord>> {
        let mut records = Vec::new();

        for group in response.results {
            for point in group.data {
                let date = NaiveDate::parse_from_str(&point.period, "%Y-%m-%d").map_err(|_| {
                    TrendWeatherError::api(format!(
                        "Invalid period '{}' in DataLab series '{}'",
                        point.period, group.title
                    ))
                })?;

                records.push(DailyTrendRecord {
                    date,
                    keyword: group.title.clone(),
                    interest: point.ratio,
                });
            }
        }

        Ok(records)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_request_body_uses_datalab_field_names() {
            let groups = vec![KeywordGroup {
                name: "골프 예약".to_string(),
                keywords: vec!["골프 예약".to_string(), "골프예약".to_string()],
            }];
            let request = SearchRequest::new(
                &groups,
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            );

            let json = serde_json::to_value(&request).unwrap();
            assert_eq!(json["startDate"], "2024-01-01");
            assert_eq!(json["endDate"], "2024-12-31");
            assert_eq!(json["timeUnit"], "date");
            assert_eq!(json["keywordGroups"][0]["groupName"], "골프 예약");
            assert_eq!(json["keywordGroups"][0]["keywords"][1], "골프예약");
        }

        #[test]
        fn test_into_records_flattens_groups() {
            let response: SearchResponse = serde_json::from_str(
                r#"{
                    "startDate": "2024-01-01",
                    "endDate": "2024-01-02",
                    "timeUnit": "date",
                    "results": [
                        {
                            "title": "골프장",
                            "keywords": ["골프장"],
                            "data": [
                                {"period": "2024-01-01", "ratio": 41.5},
                                {"period": "2024-01-02", "ratio": 44.0}
                            ]
                        },
                        {
                            "title": "라운딩",
                            "keywords": ["라운딩"],
                            "data": [
                                {"period": "2024-01-01", "ratio": 12.3}
                            ]
                        }
                    ]
                }"#,
            )
            .unwrap();

            let records = into_records(response).unwrap();
            assert_eq!(records.len(), 3);
            assert_eq!(records[0].keyword, "골프장");
            assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
            assert_eq!(records[0].interest, 41.5);
            assert_eq!(records[2].keyword, "라운딩");
        }

        #[test]
        fn test_into_records_rejects_bad_period() {
            let response = SearchResponse {
                results: vec![GroupSeries {
                    title: "골프장".to_string(),
                    data: vec![DataPoint {
                        period: "01/01/2024".to_string(),
                        ratio: 1.0,
                    }],
                }],
            };

            let result = into_records(response);
            assert!(result.is_err());
        }

        #[test]
        fn test_empty_results_is_not_an_error() {
            let response: SearchResponse = serde_json::from_str("{}").unwrap();
            let records = into_records(response).unwrap();
            assert!(records.is_empty());
        }
    }
}
