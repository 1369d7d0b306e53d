pub mod handlers;

pub use handlers::health::{health, metrics};
pub use handlers::pages::{about, dashboard, dashboard_write, landing};
pub use handlers::token::{
    get_allowance, get_balance, get_config, get_native_balance, get_networks, get_snapshot_balance,
    get_snapshot_supply, get_token, refresh_token,
};
pub use handlers::transaction::{approve, burn, get_transaction, list_transactions, mint, snapshot, transfer};

use actix_web::web;

/// Registers every route: pages and health checks at the root, JSON endpoints under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .service(metrics)
        .service(landing)
        .service(about)
        .service(dashboard)
        .service(dashboard_write)
        .service(
            web::scope("/api")
                .service(get_config)
                .service(get_networks)
                .service(get_token)
                .service(refresh_token)
                .service(get_balance)
                .service(get_native_balance)
                .service(get_snapshot_supply)
                .service(get_snapshot_balance)
                .service(get_allowance)
                .service(transfer)
                .service(mint)
                .service(burn)
                .service(snapshot)
                .service(approve)
                .service(list_transactions)
                .service(get_transaction),
        );
}

#[cfg(test)]
pub(crate) mod tests {
    use super::configure;
    use crate::app::token_service::tests::service_with_monitoring;
    use crate::infrastructure::blockchain::fake::FakeYeilContract;
    use crate::infrastructure::config::tests::test_config;
    use crate::infrastructure::config::ConfigManager;
    use crate::infrastructure::monitoring::manager::MonitoringManager;
    use crate::middleware::error_handling::{json_config, not_found};
    use crate::middleware::metrics::MetricsMiddleware;
    use actix_web::body::MessageBody;
    use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
    use actix_web::{web, App};
    use std::sync::Arc;

    pub(crate) fn test_app(
        fakes: Vec<Arc<FakeYeilContract>>,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let monitoring = Arc::new(MonitoringManager::new());
        let service = service_with_monitoring(fakes, Arc::clone(&monitoring));
        let config_manager = Arc::new(ConfigManager::with_config(test_config()));

        App::new()
            .wrap(MetricsMiddleware::new(Arc::clone(&monitoring)))
            .app_data(json_config())
            .app_data(web::Data::new(service))
            .app_data(web::Data::new(config_manager))
            .app_data(web::Data::new(monitoring))
            .configure(configure)
            .default_service(web::to(not_found))
    }
}
