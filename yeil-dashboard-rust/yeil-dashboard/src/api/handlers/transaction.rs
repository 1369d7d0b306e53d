use crate::app::token_service::TokenService;
use crate::domain::error::{DashboardError, ValidationError};
use crate::domain::transaction::WriteRequest;
use actix_web::web::{Bytes, Data, Json, Path, Query};
use actix_web::{get, post, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_LIST_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct TransferBody {
    pub chain_id: Option<u64>,
    pub to: String,
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct BurnBody {
    pub chain_id: Option<u64>,
    pub from: String,
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct ApproveBody {
    pub chain_id: Option<u64>,
    pub spender: String,
    pub amount: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SnapshotBody {
    pub chain_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct TransactionsQuery {
    pub chain_id: Option<u64>,
    pub limit: Option<usize>,
}

async fn accept(
    service: &Arc<TokenService>,
    chain_id: Option<u64>,
    request: WriteRequest,
) -> Result<HttpResponse, DashboardError> {
    let chain_id = service.resolve_chain(chain_id);
    let state = service.submit(chain_id, request).await?;
    Ok(HttpResponse::Accepted().json(state))
}

#[post("/transfer")]
async fn transfer(body: Json<TransferBody>, service: Data<Arc<TokenService>>) -> Result<HttpResponse, DashboardError> {
    let body = body.into_inner();
    accept(&service, body.chain_id, WriteRequest::Transfer { to: body.to, amount: body.amount }).await
}

#[post("/mint")]
async fn mint(body: Json<TransferBody>, service: Data<Arc<TokenService>>) -> Result<HttpResponse, DashboardError> {
    let body = body.into_inner();
    accept(&service, body.chain_id, WriteRequest::Mint { to: body.to, amount: body.amount }).await
}

#[post("/burn")]
async fn burn(body: Json<BurnBody>, service: Data<Arc<TokenService>>) -> Result<HttpResponse, DashboardError> {
    let body = body.into_inner();
    accept(&service, body.chain_id, WriteRequest::Burn { from: body.from, amount: body.amount }).await
}

#[post("/approve")]
async fn approve(body: Json<ApproveBody>, service: Data<Arc<TokenService>>) -> Result<HttpResponse, DashboardError> {
    let body = body.into_inner();
    accept(
        &service,
        body.chain_id,
        WriteRequest::Approve { spender: body.spender, amount: body.amount },
    )
    .await
}

/// An empty body snapshots the default chain. Anything else must be a
/// valid `SnapshotBody`, whatever the content type.
fn parse_snapshot_body(raw: &[u8]) -> Result<SnapshotBody, DashboardError> {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Ok(SnapshotBody::default());
    }
    serde_json::from_slice(raw).map_err(|e| DashboardError::Validation(ValidationError::InvalidJson(e.to_string())))
}

#[post("/snapshot")]
async fn snapshot(body: Bytes, service: Data<Arc<TokenService>>) -> Result<HttpResponse, DashboardError> {
    let body = parse_snapshot_body(&body)?;
    accept(&service, body.chain_id, WriteRequest::Snapshot).await
}

#[get("/transactions")]
async fn list_transactions(query: Query<TransactionsQuery>, service: Data<Arc<TokenService>>) -> HttpResponse {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let transactions = service.tracker().list(query.chain_id, limit).await;
    HttpResponse::Ok().json(serde_json::json!({
        "count": transactions.len(),
        "transactions": transactions,
    }))
}

#[get("/transactions/{id}")]
async fn get_transaction(path: Path<String>, service: Data<Arc<TokenService>>) -> Result<HttpResponse, DashboardError> {
    let id = path.into_inner();
    match service.tracker().get(&id).await {
        Some(state) => Ok(HttpResponse::Ok().json(state)),
        None => Err(DashboardError::NotFound(format!("transaction {id}"))),
    }
}
