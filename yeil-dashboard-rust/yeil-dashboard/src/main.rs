use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use yeil_dashboard::api;
use yeil_dashboard::app::token_service::TokenService;
use yeil_dashboard::app::transaction_tracker::TransactionTracker;
use yeil_dashboard::infrastructure::blockchain::manager::BlockchainManager;
use yeil_dashboard::infrastructure::config::ConfigManager;
use yeil_dashboard::infrastructure::logger::{LogConfig, Logger};
use yeil_dashboard::infrastructure::monitoring::manager::MonitoringManager;
use yeil_dashboard::middleware::{json_config, not_found, MetricsMiddleware};

fn startup_error(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config_manager = match ConfigManager::new() {
        Ok(manager) => Arc::new(manager),
        Err(e) => {
            // The logger is not up yet; the configured level is unknown.
            Logger::init("info");
            log::error!("❌ Failed to initialize configuration manager: {}", e);
            return Err(startup_error(format!("Configuration initialization failed: {e}")));
        }
    };
    let config = config_manager.get_config().await;

    Logger::init_with_config(LogConfig {
        level: config.log_level.clone(),
        log_directory: config.log_directory.clone(),
        enable_colors: config.environment != "production",
        ..LogConfig::default()
    });

    log::info!("🚀 Starting Yeil dashboard...");
    log::info!("✅ Configuration loaded successfully");

    log::info!("🔍 Validating configuration...");
    let validation_errors = config_manager.validate_config().await;
    if !validation_errors.is_empty() {
        log::error!("❌ Configuration validation failed: {}", validation_errors.join(", "));
        return Err(startup_error(format!(
            "Configuration validation failed: {}",
            validation_errors.join(", ")
        )));
    }
    log::info!("✅ Configuration validation passed");

    let blockchain_manager = match BlockchainManager::new(&config) {
        Ok(manager) => {
            log::info!("✅ Blockchain manager initialized successfully");
            Arc::new(manager)
        }
        Err(e) => {
            log::error!("❌ Failed to initialize blockchain manager: {}", e);
            return Err(startup_error(format!("Blockchain manager initialization failed: {e}")));
        }
    };

    for chain in blockchain_manager.chains() {
        match &chain.contract_address {
            Some(address) => log::info!("✅ Contract for chain {} ({}): {}", chain.chain_id, chain.name, address),
            None => log::warn!("⚠️  No contract address for chain {} ({})", chain.chain_id, chain.name),
        }
    }
    match blockchain_manager.signer_address() {
        Some(address) => log::info!("🔑 Signer {:?} loaded; writes enabled", address),
        None => log::warn!("⚠️  SIGNER_PRIVATE_KEY not set; the dashboard is read-only"),
    }

    let monitoring_manager = Arc::new(MonitoringManager::new());
    let tracker = Arc::new(TransactionTracker::new(config.max_tracked_transactions));
    let token_service = Arc::new(TokenService::new(
        Arc::clone(&blockchain_manager),
        tracker,
        Arc::clone(&monitoring_manager),
        config.default_chain_id,
    ));
    log::info!("✅ Token service initialized successfully");

    let port = config.port;
    log::info!("🌐 Starting Yeil dashboard on port {}", port);
    log::info!("📊 Environment: {}", config.environment);
    log::info!("🔗 Default chain: {}", config.default_chain_id);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            .wrap(actix_cors::Cors::permissive())
            .wrap(MetricsMiddleware::new(Arc::clone(&monitoring_manager)))
            .app_data(json_config())
            .app_data(web::Data::new(Arc::clone(&config_manager)))
            .app_data(web::Data::new(Arc::clone(&monitoring_manager)))
            .app_data(web::Data::new(Arc::clone(&token_service)))
            .configure(api::configure)
            .default_service(web::to(not_found))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
