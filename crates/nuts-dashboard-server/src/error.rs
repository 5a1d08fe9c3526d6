use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use dashboard::DashboardError;

/// Failures surfaced to dashboard clients.
///
/// The cause is logged server-side; clients only see a generic message.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unable to load data")]
    Facts(#[source] DashboardError),

    #[error("unable to load txs-over-time data")]
    TxsOverTime(#[source] DashboardError),
}

impl ApiError {
    fn cause(&self) -> &DashboardError {
        match self {
            ApiError::Facts(e) | ApiError::TxsOverTime(e) => e,
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        let cause = self.cause();
        if cause.is_upstream_failure() {
            tracing::error!(error = %cause, "Nuts node unavailable: {}", self);
        } else {
            tracing::error!(error = %cause, "Nuts node returned unusable data: {}", self);
        }
        HttpResponse::InternalServerError().json(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    #[test]
    fn test_error_body_hides_cause() {
        let err = ApiError::TxsOverTime(DashboardError::UpstreamUnavailable(
            "connect to 10.0.0.3:8081 refused".into(),
        ));
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = resp.into_body().try_into_bytes().unwrap();
        assert_eq!(&body[..], br#""unable to load txs-over-time data""#);
    }

    #[test]
    fn test_facts_message() {
        let err = ApiError::Facts(DashboardError::MalformedResponse("eof".into()));
        assert_eq!(err.to_string(), "unable to load data");
    }
}
