// src/netsuite/client.rs

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    common::error::AppError,
    config::NetSuiteSettings,
    netsuite::auth::TokenProvider,
};

const SUITEQL_PATH: &str = "/services/rest/query/v1/suiteql";

// Uma página de resultados do endpoint SuiteQL.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuiteQlPage {
    #[serde(default)]
    items: Vec<Value>,
    #[serde(default)]
    has_more: bool,
    total_results: Option<u64>,
}

/// Cliente somente-leitura para o REST/SuiteQL do NetSuite.
#[derive(Clone)]
pub struct NetSuiteClient {
    http: reqwest::Client,
    base_url: String,
    page_size: usize,
    tokens: TokenProvider,
}

impl NetSuiteClient {
    pub fn new(settings: &NetSuiteSettings) -> Result<Self, AppError> {
        let http = reqwest::Client::builder().timeout(settings.timeout).build()?;
        let tokens = TokenProvider::new(settings.auth.clone(), &settings.base_url, http.clone());

        Ok(Self {
            http,
            base_url: settings.base_url.clone(),
            page_size: settings.page_size,
            tokens,
        })
    }

    /// Executa uma consulta SuiteQL, seguindo a paginação até o fim
    /// (ou até `max_records`, quando informado).
    pub async fn suiteql(&self, query: &str, max_records: Option<usize>) -> Result<Vec<Value>, AppError> {
        let url = format!("{}{}", self.base_url, SUITEQL_PATH);
        let mut rows: Vec<Value> = Vec::new();
        let mut offset = 0usize;

        loop {
            let token = self.tokens.bearer().await?;
            let response = self
                .http
                .post(&url)
                .query(&[("limit", self.page_size), ("offset", offset)])
                .bearer_auth(token)
                .header("Prefer", "transient")
                .json(&json!({ "q": query }))
                .send()
                .await?;

            let page: SuiteQlPage = match read_json(response).await {
                Ok(page) => page,
                Err(err @ AppError::NetSuiteUnauthorized(_)) => {
                    // Token recusado: o próximo pedido troca por um novo.
                    self.tokens.invalidate().await;
                    return Err(err);
                }
                Err(err) => return Err(err),
            };
            let fetched = page.items.len();
            tracing::debug!(
                "SuiteQL página offset={} itens={} total={:?} hasMore={}",
                offset,
                fetched,
                page.total_results,
                page.has_more
            );

            rows.extend(page.items);

            if let Some(max) = max_records {
                if rows.len() >= max {
                    rows.truncate(max);
                    break;
                }
            }
            // Página vazia com hasMore=true não deveria acontecer, mas evita loop infinito.
            if !page.has_more || fetched == 0 {
                break;
            }
            offset += fetched;
        }

        Ok(rows)
    }
}

// Converte a resposta em JSON ou no AppError adequado ao status HTTP.
async fn read_json<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_detail(&body).unwrap_or_else(|| body.chars().take(500).collect());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::NetSuiteUnauthorized(message)),
        StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => Err(AppError::NetSuiteTimeout),
        _ => Err(AppError::NetSuiteError {
            status: status.as_u16(),
            message,
        }),
    }
}

// O NetSuite devolve { "o:errorDetails": [ { "detail": "...", "o:errorCode": "..." } ] }
fn error_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let first = value.get("o:errorDetails")?.as_array()?.first()?;
    let detail = first.get("detail")?.as_str()?;

    Some(match first.get("o:errorCode").and_then(Value::as_str) {
        Some(code) => format!("{} ({})", detail, code),
        None => detail.to_string(),
    })
}
