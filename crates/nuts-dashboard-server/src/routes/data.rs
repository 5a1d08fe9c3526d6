use actix_web::{web, HttpResponse};
use serde::Serialize;

use dashboard::{CountPerMoment, Fact, NodeApi};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DataResponse<'a> {
    pub title: &'a str,
    pub facts: &'a [Fact],
}

/// One point of the transactions-per-day chart.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct GraphRecord {
    /// Day start, Unix milliseconds
    pub x: i64,
    pub y: u64,
}

impl From<&CountPerMoment> for GraphRecord {
    fn from(count: &CountPerMoment) -> Self {
        Self {
            x: count.moment.timestamp_millis(),
            y: count.count,
        }
    }
}

/// GET /data - title and summary facts
pub async fn data<N: NodeApi + 'static>(
    state: web::Data<AppState<N>>,
) -> Result<HttpResponse, ApiError> {
    let facts = state.dashboard.facts().await.map_err(ApiError::Facts)?;
    Ok(HttpResponse::Ok().json(DataResponse {
        title: &state.config.title,
        facts: facts.value(),
    }))
}

/// GET /txs-over-time - transactions per day, oldest first
pub async fn txs_over_time<N: NodeApi + 'static>(
    state: web::Data<AppState<N>>,
) -> Result<HttpResponse, ApiError> {
    let series = state
        .dashboard
        .txs_over_time()
        .await
        .map_err(ApiError::TxsOverTime)?;
    let points: Vec<GraphRecord> = series.value().iter().map(GraphRecord::from).collect();
    Ok(HttpResponse::Ok().json(points))
}

pub fn configure<N: NodeApi + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/data", web::get().to(data::<N>))
        .route("/txs-over-time", web::get().to(txs_over_time::<N>));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn test_graph_record_uses_epoch_millis() {
        let count = CountPerMoment {
            moment: DateTime::from_timestamp(1_704_412_800, 0).unwrap(),
            count: 2,
        };
        assert_eq!(
            GraphRecord::from(&count),
            GraphRecord {
                x: 1_704_412_800_000,
                y: 2
            }
        );
    }

    #[test]
    fn test_data_response_shape() {
        let facts = vec![Fact {
            unit: "nodes".to_string(),
            value: 12,
        }];
        let json = serde_json::to_value(DataResponse {
            title: "Nuts",
            facts: &facts,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"title": "Nuts", "facts": [{"unit": "nodes", "value": 12}]})
        );
    }
}
