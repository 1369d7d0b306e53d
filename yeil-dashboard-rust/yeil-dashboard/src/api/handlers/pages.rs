use crate::app::token_service::TokenService;
use crate::domain::error::DashboardError;
use crate::domain::token::TokenInfo;
use crate::domain::transaction::{TransactionPhase, TransactionState, WriteRequest};
use crate::infrastructure::config::ChainConfig;
use crate::utils::sanitizer::{escape_html, short_address};
use actix_web::http::{header, StatusCode};
use actix_web::web::{Data, Form, Path, Query};
use actix_web::{get, post, HttpResponse, ResponseError};
use serde::Deserialize;
use std::fmt::Write;
use std::sync::Arc;

const RECENT_TRANSACTIONS: usize = 10;

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;background:#0b1020;color:#e8ecf5}\
header,main,footer{max-width:960px;margin:0 auto;padding:1rem 1.5rem}\
nav a{color:#9fb4ff;margin-right:1rem;text-decoration:none}\
.card{background:#151b30;border-radius:12px;padding:1rem 1.5rem;margin:1rem 0}\
.ok{color:#5ee39a}.warn{color:#ffb454}.err{color:#ff6b6b}\
table{width:100%;border-collapse:collapse}td,th{padding:.4rem;text-align:left;border-bottom:1px solid #232a45}\
code{font-size:.9em}\
form{margin:.75rem 0}fieldset{border:1px solid #232a45;border-radius:8px}\
input{background:#0b1020;color:#e8ecf5;border:1px solid #39406a;border-radius:6px;padding:.3rem .5rem;margin:.2rem .5rem .2rem 0}\
button{background:#3b5bff;color:#fff;border:0;border-radius:6px;padding:.35rem .9rem}\
fieldset[disabled] button{background:#39406a}";

/// Dashboard write forms: action path, title and input fields.
const WRITE_FORMS: &[(&str, &str, &[(&str, &str)])] = &[
    ("transfer", "Transfer", &[("to", "Recipient address"), ("amount", "Amount")]),
    ("mint", "Mint", &[("to", "Recipient address"), ("amount", "Amount")]),
    ("burn", "Burn", &[("from", "Address to burn from"), ("amount", "Amount")]),
    ("approve", "Approve", &[("spender", "Spender address"), ("amount", "Amount")]),
    ("snapshot", "Take snapshot", &[]),
];

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub chain_id: Option<u64>,
    /// Transaction just submitted from one of the forms.
    pub tx: Option<String>,
    pub account: Option<String>,
    pub snapshot_id: Option<String>,
}

/// Fields of every dashboard write form. Missing inputs arrive as empty
/// strings and fail the same validation as the JSON endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct WriteForm {
    pub chain_id: Option<u64>,
    pub to: Option<String>,
    pub from: Option<String>,
    pub spender: Option<String>,
    pub amount: Option<String>,
}

impl WriteForm {
    fn into_request(self, action: &str) -> Result<WriteRequest, DashboardError> {
        let amount = self.amount.unwrap_or_default();
        Ok(match action {
            "transfer" => WriteRequest::Transfer { to: self.to.unwrap_or_default(), amount },
            "mint" => WriteRequest::Mint { to: self.to.unwrap_or_default(), amount },
            "burn" => WriteRequest::Burn { from: self.from.unwrap_or_default(), amount },
            "approve" => WriteRequest::Approve { spender: self.spender.unwrap_or_default(), amount },
            "snapshot" => WriteRequest::Snapshot,
            other => return Err(DashboardError::NotFound(format!("dashboard action {other}"))),
        })
    }
}

fn page(title: &str, body: &str) -> HttpResponse {
    page_with_status(StatusCode::OK, title, body)
}

fn page_with_status(status: StatusCode, title: &str, body: &str) -> HttpResponse {
    let html = format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<title>{title} | Yeil</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
<header><nav><a href=\"/\">Yeil</a><a href=\"/about\">About</a><a href=\"/dashboard\">Dashboard</a></nav></header>\n\
<main>\n{body}\n</main>\n<footer><small>Yeil v{version}</small></footer>\n</body>\n</html>\n",
        title = escape_html(title),
        version = env!("CARGO_PKG_VERSION"),
    );
    HttpResponse::build(status).content_type("text/html; charset=utf-8").body(html)
}

#[get("/")]
async fn landing() -> HttpResponse {
    page(
        "Real-world assets, on-chain",
        "<section class=\"card\">\
<h1>Yeil: a token backed by real-world asset reserves</h1>\
<p>Every Yeil in circulation is covered by verified off-chain collateral. \
The reserve value is attested on-chain through a proof-of-reserve feed, and \
the contract refuses to mint beyond what the reserves cover.</p>\
<p><a href=\"/dashboard\">Open the dashboard</a> to check supply and backing live, \
or read <a href=\"/about\">how the backing works</a>.</p>\
</section>\
<section class=\"card\"><h2>What you can do</h2><ul>\
<li>See total supply against verified reserves</li>\
<li>Transfer, mint and burn tokens with a connected signer</li>\
<li>Take balance snapshots and query them later</li>\
</ul></section>",
    )
}

#[get("/about")]
async fn about() -> HttpResponse {
    page(
        "About reserve backing",
        "<section class=\"card\">\
<h1>How reserve backing works</h1>\
<p><strong>Reserve-backing</strong> is the on-chain attestation that circulating token \
supply is covered by verified off-chain collateral value. An oracle publishes the \
audited reserve figure; the token contract reads it and reports whether total \
supply is fully backed.</p>\
<p><strong>Snapshots</strong> are on-chain checkpoints of balances and supply at a \
point in time. Each snapshot gets an increasing id and can be queried forever after, \
which makes them suitable for distributions and audits.</p>\
<p>All token state lives in the smart contract. This dashboard only reads it and \
forwards writes through the configured signer.</p>\
</section>",
    )
}

fn render_network_links(out: &mut String, chains: &[&ChainConfig], active: u64) {
    out.push_str("<nav class=\"card\">Network: ");
    for chain in chains {
        if chain.chain_id == active {
            let _ = write!(out, "<strong>{}</strong> ", escape_html(&chain.name));
        } else {
            let _ = write!(
                out,
                "<a href=\"/dashboard?chain_id={}\">{}</a> ",
                chain.chain_id,
                escape_html(&chain.name)
            );
        }
    }
    out.push_str("</nav>");
}

fn render_token(out: &mut String, info: &TokenInfo) {
    let symbol = escape_html(&info.symbol);
    let backing = if info.is_fully_backed {
        "<span class=\"ok\">Fully backed</span>"
    } else {
        "<span class=\"warn\">Not fully backed</span>"
    };
    let feed_address = format!("{:?}", info.proof_of_reserve_feed_address);
    let feed = match &info.proof_of_reserve_feed_url {
        Some(url) => format!(
            "<a href=\"{}\"><code>{}</code></a>",
            escape_html(url),
            short_address(&feed_address)
        ),
        None => format!("<code>{}</code>", short_address(&feed_address)),
    };

    let _ = write!(
        out,
        "<section class=\"card\"><h1>{name} ({symbol})</h1><table>\
<tr><th>Contract</th><td><code>{contract:?}</code></td></tr>\
<tr><th>Total supply</th><td>{supply} {symbol}</td></tr>\
<tr><th>Verified reserves</th><td>{reserves} {symbol}</td></tr>\
<tr><th>Backing</th><td>{backing}</td></tr>\
<tr><th>Proof-of-reserve feed</th><td>{feed}</td></tr>\
<tr><th>Decimals</th><td>{decimals}</td></tr>\
</table></section>",
        name = escape_html(&info.name),
        contract = info.contract_address,
        supply = escape_html(&info.total_supply_formatted),
        reserves = escape_html(&info.verified_reserves_formatted),
        decimals = info.decimals,
    );
}

fn status_html(tx: &TransactionState) -> String {
    match tx.phase() {
        TransactionPhase::Pending => "<span class=\"warn\">Pending</span>".to_string(),
        TransactionPhase::Confirming => "<span class=\"warn\">Confirming</span>".to_string(),
        TransactionPhase::Success => "<span class=\"ok\">Confirmed</span>".to_string(),
        TransactionPhase::Failed => format!(
            "<span class=\"err\">Failed: {}</span>",
            escape_html(tx.error.as_deref().unwrap_or_default())
        ),
    }
}

fn hash_html(tx: &TransactionState) -> String {
    match (&tx.hash, &tx.explorer_url) {
        (Some(hash), Some(url)) => format!(
            "<a href=\"{}\"><code>{}</code></a>",
            escape_html(url),
            short_address(&format!("{hash:?}"))
        ),
        (Some(hash), None) => format!("<code>{}</code>", short_address(&format!("{hash:?}"))),
        _ => "-".to_string(),
    }
}

fn render_submitted(out: &mut String, tx: &TransactionState) {
    let _ = write!(
        out,
        "<section class=\"card\"><p>Submitted {kind}: {status} {hash} \
<a href=\"/api/transactions/{id}\">Track</a></p></section>",
        kind = tx.kind,
        status = status_html(tx),
        hash = hash_html(tx),
        id = escape_html(&tx.id),
    );
}

fn render_transactions(out: &mut String, transactions: &[TransactionState]) {
    out.push_str("<section class=\"card\"><h2>Recent transactions</h2>");
    if transactions.is_empty() {
        out.push_str("<p>No transactions submitted yet.</p></section>");
        return;
    }
    out.push_str("<table><tr><th>Action</th><th>Amount</th><th>Status</th><th>Hash</th></tr>");
    for tx in transactions {
        let status = status_html(tx);
        let hash = hash_html(tx);
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            tx.kind,
            escape_html(tx.amount.as_deref().unwrap_or("-")),
            status,
            hash
        );
    }
    out.push_str("</table></section>");
}

async fn render_wallet(out: &mut String, service: &TokenService, chain_id: u64) {
    let Some(signer) = service.blockchain().signer_address() else {
        out.push_str(
            "<section class=\"card\"><h2>Wallet</h2>\
<p>No signer configured; the dashboard is read-only</p></section>",
        );
        return;
    };

    let address = format!("{signer:?}");
    let link = match service.blockchain().chain(chain_id).ok().and_then(|c| c.address_url(&address)) {
        Some(url) => format!("<a href=\"{}\"><code>{}</code></a>", escape_html(&url), address),
        None => format!("<code>{address}</code>"),
    };
    let token_balance = match service.balance(chain_id, &address).await {
        Ok(b) => format!("{} {}", escape_html(&b.balance_formatted), escape_html(&b.symbol)),
        Err(_) => "-".to_string(),
    };
    let native_balance = match service.native_balance(chain_id, &address).await {
        Ok(b) => format!("{} {}", escape_html(&b.balance_formatted), escape_html(&b.symbol)),
        Err(_) => "-".to_string(),
    };

    let _ = write!(
        out,
        "<section class=\"card\"><h2>Wallet</h2><table>\
<tr><th>Signer</th><td>{link} connected</td></tr>\
<tr><th>Your balance</th><td>{token_balance}</td></tr>\
<tr><th>Native balance</th><td>{native_balance}</td></tr>\
</table></section>"
    );
}

fn lookup_row(out: &mut String, label: &str, result: Result<String, DashboardError>) {
    let value = match result {
        Ok(value) => escape_html(&value),
        Err(e) => format!("<span class=\"err\">{}</span>", escape_html(&e.to_string())),
    };
    let _ = write!(out, "<tr><th>{}</th><td>{}</td></tr>", escape_html(label), value);
}

/// Balance lookup, optionally at a snapshot, plus snapshot total supply.
async fn render_lookups(
    out: &mut String,
    service: &TokenService,
    chain_id: u64,
    symbol: &str,
    query: &DashboardQuery,
) {
    let account = query.account.as_deref().map(str::trim).filter(|a| !a.is_empty());
    let snapshot_id = query.snapshot_id.as_deref().map(str::trim).filter(|s| !s.is_empty());

    let _ = write!(
        out,
        "<section class=\"card\"><h2>Balances and snapshots</h2>\
<form method=\"get\" action=\"/dashboard\">\
<input type=\"hidden\" name=\"chain_id\" value=\"{chain_id}\">\
<label>Account <input name=\"account\" placeholder=\"0x...\" value=\"{account}\"></label>\
<label>Snapshot id <input name=\"snapshot_id\" inputmode=\"numeric\" value=\"{snapshot}\"></label>\
<button type=\"submit\">Look up</button></form>",
        account = escape_html(account.unwrap_or_default()),
        snapshot = escape_html(snapshot_id.unwrap_or_default()),
    );

    let mut rows = String::new();
    match (account, snapshot_id) {
        (Some(account), None) => {
            let balance = service.balance(chain_id, account).await;
            lookup_row(
                &mut rows,
                &format!("Balance of {}", short_address(account)),
                balance.map(|b| format!("{} {symbol}", b.balance_formatted)),
            );
        }
        (account, Some(id)) => {
            let supply = service.total_supply_at(chain_id, id).await;
            lookup_row(
                &mut rows,
                &format!("Total supply at snapshot {id}"),
                supply.map(|s| format!("{} {symbol}", s.total_supply_formatted)),
            );
            if let Some(account) = account {
                let balance = service.balance_at(chain_id, account, id).await;
                lookup_row(
                    &mut rows,
                    &format!("Balance of {} at snapshot {id}", short_address(account)),
                    balance.map(|b| format!("{} {symbol}", b.balance_formatted)),
                );
            }
        }
        (None, None) => {}
    }
    if !rows.is_empty() {
        let _ = write!(out, "<table>{rows}</table>");
    }
    out.push_str("</section>");
}

fn render_write_forms(out: &mut String, chain_id: u64, symbol: &str, blocked: Option<&str>) {
    out.push_str("<section class=\"card\"><h2>Manage tokens</h2>");
    let disabled = match blocked {
        Some(reason) => {
            let _ = write!(out, "<p class=\"warn\">{}</p>", escape_html(reason));
            " disabled"
        }
        None => "",
    };

    for (action, title, fields) in WRITE_FORMS {
        let _ = write!(
            out,
            "<form method=\"post\" action=\"/dashboard/{action}\"><fieldset{disabled}>\
<legend>{title}</legend><input type=\"hidden\" name=\"chain_id\" value=\"{chain_id}\">"
        );
        for (name, label) in fields.iter() {
            let label = if *name == "amount" {
                format!("{label} ({})", escape_html(symbol))
            } else {
                label.to_string()
            };
            let _ = write!(out, "<label>{label} <input name=\"{name}\" required></label>");
        }
        let _ = write!(out, "<button type=\"submit\">{title}</button></fieldset></form>");
    }
    out.push_str("</section>");
}

async fn render_dashboard(service: &TokenService, query: &DashboardQuery, error: Option<&DashboardError>) -> String {
    let chain_id = service.resolve_chain(query.chain_id);
    let mut body = String::new();

    let chains = service.blockchain().chains();
    render_network_links(&mut body, &chains, chain_id);

    if let Some(e) = error {
        let _ = write!(
            body,
            "<section class=\"card err\"><h2>Transaction not submitted</h2><p>{}</p></section>",
            escape_html(&e.to_string())
        );
    }
    if let Some(id) = &query.tx {
        if let Some(state) = service.tracker().get(id).await {
            render_submitted(&mut body, &state);
        }
    }

    let info = match service.token_info(chain_id).await {
        Ok(info) => {
            render_token(&mut body, &info);
            Some(info)
        }
        Err(e) => {
            let _ = write!(
                body,
                "<section class=\"card err\"><h2>Token data unavailable</h2><p>{}</p></section>",
                escape_html(&e.to_string())
            );
            None
        }
    };

    render_wallet(&mut body, service, chain_id).await;

    if let Some(info) = &info {
        render_lookups(&mut body, service, chain_id, &info.symbol, query).await;

        let blocked = if service.blockchain().signer_address().is_none() {
            Some("Configure a signer to submit transactions")
        } else if service.write_in_progress(chain_id) {
            Some("A transaction is pending or confirming on this network")
        } else {
            None
        };
        render_write_forms(&mut body, chain_id, &info.symbol, blocked);
    }

    let transactions = service.tracker().list(Some(chain_id), RECENT_TRANSACTIONS).await;
    render_transactions(&mut body, &transactions);
    body
}

#[get("/dashboard")]
async fn dashboard(query: Query<DashboardQuery>, service: Data<Arc<TokenService>>) -> HttpResponse {
    let body = render_dashboard(&service, &query, None).await;
    page("Dashboard", &body)
}

/// Form-encoded counterpart of the JSON write endpoints. Success redirects
/// back to the dashboard with the new transaction; failure re-renders it
/// with the error.
#[post("/dashboard/{action}")]
async fn dashboard_write(
    path: Path<String>,
    form: Form<WriteForm>,
    service: Data<Arc<TokenService>>,
) -> HttpResponse {
    let form = form.into_inner();
    let chain_id = service.resolve_chain(form.chain_id);

    let submitted = match form.into_request(&path) {
        Ok(request) => service.submit(chain_id, request).await,
        Err(e) => Err(e),
    };

    match submitted {
        Ok(state) => HttpResponse::SeeOther()
            .insert_header((header::LOCATION, format!("/dashboard?chain_id={chain_id}&tx={}", state.id)))
            .finish(),
        Err(e) => {
            let query = DashboardQuery {
                chain_id: Some(chain_id),
                ..DashboardQuery::default()
            };
            let body = render_dashboard(&service, &query, Some(&e)).await;
            page_with_status(e.status_code(), "Dashboard", &body)
        }
    }
}
