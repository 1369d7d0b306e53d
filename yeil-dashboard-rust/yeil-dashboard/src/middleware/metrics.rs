use crate::infrastructure::monitoring::manager::MonitoringManager;
use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

/// Counts requests and response times into the `MonitoringManager`.
#[derive(Clone)]
pub struct MetricsMiddleware {
    monitoring_manager: Arc<MonitoringManager>,
}

impl MetricsMiddleware {
    pub fn new(monitoring_manager: Arc<MonitoringManager>) -> Self {
        Self { monitoring_manager }
    }
}

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = MetricsService<S, B>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsService {
            service: Rc::new(service),
            monitoring_manager: Arc::clone(&self.monitoring_manager),
            _phantom: PhantomData,
        }))
    }
}

pub struct MetricsService<S, B> {
    service: Rc<S>,
    monitoring_manager: Arc<MonitoringManager>,
    _phantom: PhantomData<B>,
}

impl<S, B> Service<ServiceRequest> for MetricsService<S, B>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let monitoring_manager = Arc::clone(&self.monitoring_manager);
        let start_time = Instant::now();

        Box::pin(async move {
            monitoring_manager.increment_metric("requests_total").await;

            let path = req.path().to_string();
            let method = req.method().to_string();

            let res = service.call(req).await;

            let response_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;
            monitoring_manager.record_response_time(response_time_ms).await;

            match res {
                Ok(res) => {
                    let status = res.status();
                    if status.is_success() || status.is_redirection() {
                        monitoring_manager.increment_metric("requests_successful").await;
                    } else {
                        monitoring_manager.increment_metric("requests_failed").await;
                    }
                    log::debug!("{method} {path} -> {status} in {response_time_ms:.1}ms");
                    Ok(res)
                }
                Err(e) => {
                    monitoring_manager.increment_metric("requests_failed").await;
                    log::error!("Request failed: {method} {path} - Error: {e} - Time: {response_time_ms:.1}ms");
                    Err(e)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App, HttpResponse};

    #[actix_web::test]
    async fn test_counts_successes_and_failures() {
        let monitoring = Arc::new(MonitoringManager::new());
        let app = test::init_service(
            App::new()
                .wrap(MetricsMiddleware::new(Arc::clone(&monitoring)))
                .route("/ok", web::get().to(HttpResponse::Ok))
                .route("/bad", web::get().to(HttpResponse::BadRequest)),
        )
        .await;

        test::call_service(&app, test::TestRequest::get().uri("/ok").to_request()).await;
        test::call_service(&app, test::TestRequest::get().uri("/bad").to_request()).await;
        test::call_service(&app, test::TestRequest::get().uri("/missing").to_request()).await;

        let metrics = monitoring.get_metrics().await;
        assert_eq!(metrics.requests_total, 3);
        assert_eq!(metrics.requests_successful, 1);
        assert_eq!(metrics.requests_failed, 2);
    }
}
