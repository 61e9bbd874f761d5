//! Receivables aging summary.
//!
//! The ERP exposes one endpoint, `/contas_receber/resumo`, returning per-bucket
//! title counts under Portuguese keys (`vencimento_hoje`, `atraso_30_60`, ...)
//! whose values may be numbers or numeric strings. This module normalizes that
//! payload into a fully-typed [`AgingSummary`] and owns the fixed presentation
//! order of the buckets, so every rendering layer shows the same priority
//! without re-deriving it.
//!
//! A summary is built fresh on every fetch and never cached or mutated;
//! consistency rules for the `total` field live in [`normalize_summary`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::api::{ApiClient, ApiError};

/// Aging summary endpoint on the primary API.
pub const RESUMO_PATH: &str = "/contas_receber/resumo";

/// Errors from the aging aggregator.
#[derive(Debug, Error)]
pub enum AgingError {
    /// A recognized bucket key is present but not coercible to a finite
    /// non-negative count.
    #[error("invalid aging data: {0}")]
    InvalidAgingData(String),

    /// The underlying fetch failed (transport, timeout, non-2xx). Never
    /// retried here; the front-end offers a manual retry.
    #[error("failed to fetch aging summary: {0}")]
    FetchFailed(#[from] ApiError),
}

/// The six aging buckets, ordered by display priority (most urgent first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AgingBucket {
    #[serde(rename = "overdue30to60")]
    Overdue30To60,
    OverdueWithin30,
    DueToday,
    DueWithin30,
    DueBeyond30,
    OverdueBeyond60,
}

/// Fixed presentation order, independent of the upstream payload's key order
/// and of the counts themselves.
pub const PRIORITY_ORDER: [AgingBucket; 6] = [
    AgingBucket::Overdue30To60,
    AgingBucket::OverdueWithin30,
    AgingBucket::DueToday,
    AgingBucket::DueWithin30,
    AgingBucket::DueBeyond30,
    AgingBucket::OverdueBeyond60,
];

impl AgingBucket {
    /// Key under which the upstream payload carries this bucket.
    pub fn wire_key(self) -> &'static str {
        match self {
            AgingBucket::Overdue30To60 => "atraso_30_60",
            AgingBucket::OverdueWithin30 => "atraso_ate_30",
            AgingBucket::DueToday => "vencimento_hoje",
            AgingBucket::DueWithin30 => "vence_ate_30",
            AgingBucket::DueBeyond30 => "vencimento_superior_30",
            AgingBucket::OverdueBeyond60 => "outro",
        }
    }

    /// Card title shown by the dashboard for this bucket.
    pub fn label(self) -> &'static str {
        match self {
            AgingBucket::Overdue30To60 => "Atraso entre 30 e 60 dias",
            AgingBucket::OverdueWithin30 => "Atraso até 30 dias",
            AgingBucket::DueToday => "Vencimento Hoje",
            AgingBucket::DueWithin30 => "Vence em até 30 dias",
            AgingBucket::DueBeyond30 => "Vencimento superior a 30 dias",
            AgingBucket::OverdueBeyond60 => "Atraso superior a 60 dias",
        }
    }
}

/// Normalized receivables aging counts. Constructed fresh per fetch, owned by
/// the requesting view, never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgingSummary {
    pub due_today: u64,
    pub due_within_30: u64,
    pub due_beyond_30: u64,
    pub overdue_within_30: u64,
    #[serde(rename = "overdue30to60")]
    pub overdue_30_to_60: u64,
    pub overdue_beyond_60: u64,
    pub total: u64,
}

impl AgingSummary {
    pub fn count(&self, bucket: AgingBucket) -> u64 {
        match bucket {
            AgingBucket::Overdue30To60 => self.overdue_30_to_60,
            AgingBucket::OverdueWithin30 => self.overdue_within_30,
            AgingBucket::DueToday => self.due_today,
            AgingBucket::DueWithin30 => self.due_within_30,
            AgingBucket::DueBeyond30 => self.due_beyond_30,
            AgingBucket::OverdueBeyond60 => self.overdue_beyond_60,
        }
    }

    /// Bucket count as a percentage of `total`. Yields 0.0 when the total is
    /// zero so the value stays representable in JSON.
    pub fn share_of_total(&self, bucket: AgingBucket) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(bucket) as f64 / self.total as f64 * 100.0
    }
}

/// Normalize the raw aging payload into an [`AgingSummary`].
///
/// Each of the six recognized bucket keys coerces to a count: non-negative
/// integers, floats with zero fraction, and trimmed numeric strings are
/// accepted; anything else that is present fails with
/// [`AgingError::InvalidAgingData`] naming the key. Missing keys and JSON
/// `null` read as 0. Unrecognized keys are ignored.
///
/// `total` is the sum of the six buckets unless the source supplied a
/// non-zero `total` of its own, which is kept verbatim. A bucket sum that
/// would overflow `u64` fails with [`AgingError::InvalidAgingData`].
pub fn normalize_summary(raw: &Map<String, Value>) -> Result<AgingSummary, AgingError> {
    let due_today = count_for(raw, AgingBucket::DueToday.wire_key())?;
    let due_within_30 = count_for(raw, AgingBucket::DueWithin30.wire_key())?;
    let due_beyond_30 = count_for(raw, AgingBucket::DueBeyond30.wire_key())?;
    let overdue_within_30 = count_for(raw, AgingBucket::OverdueWithin30.wire_key())?;
    let overdue_30_to_60 = count_for(raw, AgingBucket::Overdue30To60.wire_key())?;
    let overdue_beyond_60 = count_for(raw, AgingBucket::OverdueBeyond60.wire_key())?;

    let computed = [
        due_today,
        due_within_30,
        due_beyond_30,
        overdue_within_30,
        overdue_30_to_60,
        overdue_beyond_60,
    ]
    .iter()
    .try_fold(0u64, |sum, &count| sum.checked_add(count))
    .ok_or_else(|| {
        AgingError::InvalidAgingData("bucket counts overflow a 64-bit total".to_string())
    })?;

    // A non-zero supplied total wins even when it disagrees with the bucket
    // sum; whether it should be recomputed instead is an open product
    // question. Absent or zero totals use the computed sum.
    let total = match count_for(raw, "total")? {
        supplied if supplied != 0 => supplied,
        _ => computed,
    };

    Ok(AgingSummary {
        due_today,
        due_within_30,
        due_beyond_30,
        overdue_within_30,
        overdue_30_to_60,
        overdue_beyond_60,
        total,
    })
}

/// Fetch `/contas_receber/resumo` and normalize it. One outstanding request
/// per invocation, no retry, no caching.
pub async fn fetch_aging_summary(api: &ApiClient) -> Result<AgingSummary, AgingError> {
    let payload = api.get_value(RESUMO_PATH).await?;

    let raw = payload.as_object().ok_or_else(|| {
        AgingError::InvalidAgingData(format!("payload is not a JSON object: {payload}"))
    })?;

    normalize_summary(raw)
}

fn count_for(raw: &Map<String, Value>, key: &str) -> Result<u64, AgingError> {
    match raw.get(key) {
        None => Ok(0),
        Some(value) => Ok(coerce_count(key, value)?.unwrap_or(0)),
    }
}

/// Coerce one bucket value to a count. `null` reads as absent; numbers and
/// numeric strings must be finite, integral, and non-negative.
fn coerce_count(key: &str, value: &Value) -> Result<Option<u64>, AgingError> {
    let invalid = || {
        AgingError::InvalidAgingData(format!(
            "key \"{key}\" is not a non-negative count: {value}"
        ))
    };

    match value {
        Value::Null => Ok(None),
        Value::Number(n) => {
            if let Some(count) = n.as_u64() {
                return Ok(Some(count));
            }
            match n.as_f64() {
                Some(f) if f.is_finite() && f.fract() == 0.0 && f >= 0.0 && f <= u64::MAX as f64 => {
                    Ok(Some(f as u64))
                }
                _ => Err(invalid()),
            }
        }
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() && f.fract() == 0.0 && f >= 0.0 && f <= u64::MAX as f64 => {
                Ok(Some(f as u64))
            }
            _ => Err(invalid()),
        },
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn raw(value: Value) -> Map<String, Value> {
        value.as_object().expect("object fixture").clone()
    }

    #[test]
    fn test_total_computed_when_absent() {
        let summary = normalize_summary(&raw(json!({
            "vencimento_hoje": 5,
            "vence_ate_30": 10,
            "vencimento_superior_30": 2,
            "atraso_ate_30": 3,
            "atraso_30_60": 1,
            "outro": 0
        })))
        .expect("normalize");

        assert_eq!(summary.total, 21);
        assert_eq!(summary.due_today, 5);
        assert_eq!(summary.due_within_30, 10);
        assert_eq!(summary.due_beyond_30, 2);
        assert_eq!(summary.overdue_within_30, 3);
        assert_eq!(summary.overdue_30_to_60, 1);
        assert_eq!(summary.overdue_beyond_60, 0);
    }

    #[test]
    fn test_numeric_strings_coerce() {
        let summary = normalize_summary(&raw(json!({
            "vencimento_hoje": "5",
            "vence_ate_30": " 10 ",
            "atraso_30_60": "3.0"
        })))
        .expect("normalize");

        assert_eq!(summary.due_today, 5);
        assert_eq!(summary.due_within_30, 10);
        assert_eq!(summary.overdue_30_to_60, 3);
        assert_eq!(summary.total, 18);
    }

    #[test]
    fn test_garbage_string_fails_naming_the_key() {
        let err = normalize_summary(&raw(json!({ "atraso_30_60": "abc" })))
            .expect_err("should fail");

        assert!(matches!(err, AgingError::InvalidAgingData(_)));
        assert!(err.to_string().contains("atraso_30_60"));
    }

    #[test]
    fn test_missing_keys_default_to_zero() {
        let summary = normalize_summary(&raw(json!({ "vencimento_hoje": 4 }))).expect("normalize");

        assert_eq!(summary.due_today, 4);
        assert_eq!(summary.due_within_30, 0);
        assert_eq!(summary.overdue_beyond_60, 0);
        assert_eq!(summary.total, 4);
    }

    #[test]
    fn test_null_counts_as_missing() {
        let summary = normalize_summary(&raw(json!({
            "vencimento_hoje": null,
            "vence_ate_30": 7
        })))
        .expect("normalize");

        assert_eq!(summary.due_today, 0);
        assert_eq!(summary.total, 7);
    }

    #[test]
    fn test_integral_float_is_accepted() {
        let summary =
            normalize_summary(&raw(json!({ "vencimento_hoje": 5.0 }))).expect("normalize");
        assert_eq!(summary.due_today, 5);
    }

    #[test]
    fn test_negative_fractional_and_wrong_types_fail() {
        for payload in [
            json!({ "vencimento_hoje": -1 }),
            json!({ "vencimento_hoje": 2.5 }),
            json!({ "vencimento_hoje": "2.5" }),
            json!({ "vencimento_hoje": "-3" }),
            json!({ "vencimento_hoje": "" }),
            json!({ "vencimento_hoje": true }),
            json!({ "vencimento_hoje": [1] }),
            json!({ "vencimento_hoje": {} }),
        ] {
            let err = normalize_summary(&raw(payload)).expect_err("should fail");
            assert!(matches!(err, AgingError::InvalidAgingData(_)));
        }
    }

    #[test]
    fn test_bucket_sum_overflow_is_rejected() {
        // Each count passes coercion on its own; only the sum is out of range.
        let err = normalize_summary(&raw(json!({
            "vencimento_hoje": u64::MAX,
            "vence_ate_30": 1
        })))
        .expect_err("should fail");

        assert!(matches!(err, AgingError::InvalidAgingData(_)));
        assert!(err.to_string().contains("overflow"));
    }

    #[test]
    fn test_supplied_nonzero_total_wins_verbatim() {
        // Inconsistent on purpose: the buckets sum to 21 but the source says
        // 300. Current policy keeps the supplied value.
        let summary = normalize_summary(&raw(json!({
            "vencimento_hoje": 5,
            "vence_ate_30": 10,
            "vencimento_superior_30": 2,
            "atraso_ate_30": 3,
            "atraso_30_60": 1,
            "outro": 0,
            "total": 300
        })))
        .expect("normalize");

        assert_eq!(summary.total, 300);
    }

    #[test]
    fn test_supplied_zero_total_uses_computed_sum() {
        let with_zero = normalize_summary(&raw(json!({
            "vencimento_hoje": 5,
            "vence_ate_30": 10,
            "total": 0
        })))
        .expect("normalize");
        let without = normalize_summary(&raw(json!({
            "vencimento_hoje": 5,
            "vence_ate_30": 10
        })))
        .expect("normalize");

        assert_eq!(with_zero, without);
        assert_eq!(with_zero.total, 15);
    }

    #[test]
    fn test_supplied_total_as_string_coerces() {
        let summary = normalize_summary(&raw(json!({
            "vencimento_hoje": 5,
            "total": "40"
        })))
        .expect("normalize");

        assert_eq!(summary.total, 40);
    }

    #[test]
    fn test_unrecognized_keys_are_ignored() {
        let summary = normalize_summary(&raw(json!({
            "vencimento_hoje": 5,
            "alguma_coluna_nova": 99,
            "observacao": "texto livre"
        })))
        .expect("normalize");

        assert_eq!(summary.total, 5);
    }

    #[test]
    fn test_priority_order_is_fixed() {
        assert_eq!(
            PRIORITY_ORDER,
            [
                AgingBucket::Overdue30To60,
                AgingBucket::OverdueWithin30,
                AgingBucket::DueToday,
                AgingBucket::DueWithin30,
                AgingBucket::DueBeyond30,
                AgingBucket::OverdueBeyond60,
            ]
        );
    }

    #[test]
    fn test_wire_keys_round_trip_through_count() {
        let summary = normalize_summary(&raw(json!({
            "atraso_30_60": 1,
            "atraso_ate_30": 2,
            "vencimento_hoje": 3,
            "vence_ate_30": 4,
            "vencimento_superior_30": 5,
            "outro": 6
        })))
        .expect("normalize");

        let counts: Vec<u64> = PRIORITY_ORDER.iter().map(|b| summary.count(*b)).collect();
        assert_eq!(counts, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_bucket_labels() {
        assert_eq!(AgingBucket::Overdue30To60.label(), "Atraso entre 30 e 60 dias");
        assert_eq!(AgingBucket::OverdueBeyond60.label(), "Atraso superior a 60 dias");
        assert_eq!(AgingBucket::OverdueBeyond60.wire_key(), "outro");
    }

    #[test]
    fn test_share_of_total() {
        let summary = normalize_summary(&raw(json!({
            "vencimento_hoje": 25,
            "vence_ate_30": 75
        })))
        .expect("normalize");

        assert_eq!(summary.share_of_total(AgingBucket::DueToday), 25.0);
        assert_eq!(summary.share_of_total(AgingBucket::DueWithin30), 75.0);
        assert_eq!(summary.share_of_total(AgingBucket::Overdue30To60), 0.0);
    }

    #[test]
    fn test_share_of_total_zero_total_yields_zero() {
        let summary = normalize_summary(&raw(json!({}))).expect("normalize");

        for bucket in PRIORITY_ORDER {
            assert_eq!(summary.share_of_total(bucket), 0.0);
        }
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let summary = AgingSummary {
            due_today: 1,
            due_within_30: 2,
            due_beyond_30: 3,
            overdue_within_30: 4,
            overdue_30_to_60: 5,
            overdue_beyond_60: 6,
            total: 21,
        };

        let json = serde_json::to_value(&summary).expect("serialize");
        assert_eq!(json["dueToday"], 1);
        assert_eq!(json["dueWithin30"], 2);
        assert_eq!(json["dueBeyond30"], 3);
        assert_eq!(json["overdueWithin30"], 4);
        assert_eq!(json["overdue30to60"], 5);
        assert_eq!(json["overdueBeyond60"], 6);
        assert_eq!(json["total"], 21);
    }

    /// Serve exactly one canned HTTP response on a loopback port and return
    /// the base URL to point a client at.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");

        tokio::spawn(async move {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut buf = [0u8; 4096];
            let mut read = 0;
            while read < buf.len() {
                match socket.read(&mut buf[read..]).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        read += n;
                        if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });

        format!("http://{addr}")
    }

    fn client_for(base: String) -> ApiClient {
        let config = Config {
            api_base_url: base,
            ..Config::default()
        };
        ApiClient::from_config(&config).expect("client")
    }

    #[tokio::test]
    async fn test_fetch_normalizes_live_payload() {
        let base = serve_once(
            "200 OK",
            r#"{"vencimento_hoje":"4","vence_ate_30":10,"vencimento_superior_30":2.0,
               "atraso_ate_30":3,"atraso_30_60":1,"outro":0,"total":0}"#,
        )
        .await;

        let summary = fetch_aging_summary(&client_for(base)).await.expect("summary");

        assert_eq!(summary.due_today, 4);
        assert_eq!(summary.due_within_30, 10);
        assert_eq!(summary.total, 20);
    }

    #[tokio::test]
    async fn test_fetch_surfaces_server_error() {
        let base = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#).await;

        let err = fetch_aging_summary(&client_for(base))
            .await
            .expect_err("must fail");

        assert!(matches!(err, AgingError::FetchFailed(_)));
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_object_payload() {
        let base = serve_once("200 OK", "[1,2,3]").await;

        let err = fetch_aging_summary(&client_for(base))
            .await
            .expect_err("must fail");

        assert!(matches!(err, AgingError::InvalidAgingData(_)));
    }
}
