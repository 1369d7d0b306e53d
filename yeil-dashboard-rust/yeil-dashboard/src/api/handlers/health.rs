use crate::infrastructure::monitoring::manager::MonitoringManager;
use actix_web::web::Data;
use actix_web::{get, HttpResponse, Responder};
use std::sync::Arc;

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "message": "Yeil dashboard is running"
    }))
}

#[get("/metrics")]
async fn metrics(monitoring_manager: Data<Arc<MonitoringManager>>) -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(monitoring_manager.render_prometheus().await)
}

#[cfg(test)]
mod tests {
    use crate::api::tests::test_app;
    use crate::infrastructure::blockchain::fake::FakeYeilContract;
    use crate::infrastructure::config::LOCALHOST_CHAIN_ID;
    use actix_web::{http::StatusCode, test};
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_health_and_metrics() {
        let app = test::init_service(test_app(vec![Arc::new(FakeYeilContract::new(LOCALHOST_CHAIN_ID))])).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");

        test::call_service(&app, test::TestRequest::get().uri("/api/token").to_request()).await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let text = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
        assert!(text.contains("yeil_dashboard_contract_reads_total 1\n"));
        assert!(text.contains("yeil_dashboard_requests_total"));
    }
}
