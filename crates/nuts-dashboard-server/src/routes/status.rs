use actix_web::{web, HttpResponse};

/// GET /status - liveness probe
pub async fn status() -> HttpResponse {
    HttpResponse::Ok().content_type("text/plain").body("UP")
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/status", web::get().to(status));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_status_is_up() {
        let app = test::init_service(App::new().configure(configure)).await;
        let req = test::TestRequest::get().uri("/status").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        let body = test::read_body(resp).await;
        assert_eq!(&body[..], b"UP");
    }
}
