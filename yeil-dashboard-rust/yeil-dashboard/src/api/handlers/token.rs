use crate::app::token_service::TokenService;
use crate::domain::error::DashboardError;
use crate::infrastructure::config::ConfigManager;
use actix_web::web::{Data, Path, Query};
use actix_web::{get, post, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct ChainQuery {
    pub chain_id: Option<u64>,
}

#[get("/config")]
async fn get_config(
    config_manager: Data<Arc<ConfigManager>>,
    service: Data<Arc<TokenService>>,
) -> HttpResponse {
    let signer = service.blockchain().signer_address().map(|a| format!("{a:?}"));
    HttpResponse::Ok().json(config_manager.get_public_summary(signer).await)
}

#[get("/networks")]
async fn get_networks(service: Data<Arc<TokenService>>) -> HttpResponse {
    let statuses = service.blockchain().get_network_status().await;
    HttpResponse::Ok().json(serde_json::json!({
        "networks": service.blockchain().chains(),
        "status": statuses,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[get("/token")]
async fn get_token(
    query: Query<ChainQuery>,
    service: Data<Arc<TokenService>>,
) -> Result<HttpResponse, DashboardError> {
    let chain_id = service.resolve_chain(query.chain_id);
    let info = service.token_info(chain_id).await?;
    Ok(HttpResponse::Ok().json(info))
}

#[post("/token/refresh")]
async fn refresh_token(
    query: Query<ChainQuery>,
    service: Data<Arc<TokenService>>,
) -> Result<HttpResponse, DashboardError> {
    let chain_id = service.resolve_chain(query.chain_id);
    let info = service.refresh_token_info(chain_id).await?;
    Ok(HttpResponse::Ok().json(info))
}

#[get("/balance/{address}")]
async fn get_balance(
    path: Path<String>,
    query: Query<ChainQuery>,
    service: Data<Arc<TokenService>>,
) -> Result<HttpResponse, DashboardError> {
    let chain_id = service.resolve_chain(query.chain_id);
    let balance = service.balance(chain_id, &path).await?;
    Ok(HttpResponse::Ok().json(balance))
}

#[get("/native-balance/{address}")]
async fn get_native_balance(
    path: Path<String>,
    query: Query<ChainQuery>,
    service: Data<Arc<TokenService>>,
) -> Result<HttpResponse, DashboardError> {
    let chain_id = service.resolve_chain(query.chain_id);
    let balance = service.native_balance(chain_id, &path).await?;
    Ok(HttpResponse::Ok().json(balance))
}

#[get("/snapshots/{id}/total-supply")]
async fn get_snapshot_supply(
    path: Path<String>,
    query: Query<ChainQuery>,
    service: Data<Arc<TokenService>>,
) -> Result<HttpResponse, DashboardError> {
    let chain_id = service.resolve_chain(query.chain_id);
    let supply = service.total_supply_at(chain_id, &path).await?;
    Ok(HttpResponse::Ok().json(supply))
}

#[get("/snapshots/{id}/balance/{address}")]
async fn get_snapshot_balance(
    path: Path<(String, String)>,
    query: Query<ChainQuery>,
    service: Data<Arc<TokenService>>,
) -> Result<HttpResponse, DashboardError> {
    let (snapshot_id, address) = path.into_inner();
    let chain_id = service.resolve_chain(query.chain_id);
    let balance = service.balance_at(chain_id, &address, &snapshot_id).await?;
    Ok(HttpResponse::Ok().json(balance))
}

#[get("/allowance/{owner}/{spender}")]
async fn get_allowance(
    path: Path<(String, String)>,
    query: Query<ChainQuery>,
    service: Data<Arc<TokenService>>,
) -> Result<HttpResponse, DashboardError> {
    let (owner, spender) = path.into_inner();
    let chain_id = service.resolve_chain(query.chain_id);
    let allowance = service.allowance(chain_id, &owner, &spender).await?;
    Ok(HttpResponse::Ok().json(allowance))
}
