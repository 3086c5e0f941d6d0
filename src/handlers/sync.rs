// src/handlers/sync.rs

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    models::sync::{EntityKind, SyncAllResult, SyncOptions, SyncResult, TableSyncStatus},
};

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SyncQuery {
    /// Máximo de registros lidos do NetSuite nesta execução
    #[validate(range(min = 1, max = 100000, message = "limit deve estar entre 1 e 100000"))]
    #[param(example = 500)]
    pub limit: Option<usize>,

    /// Só consulta e transforma, sem gravar
    #[serde(default, alias = "dryRun")]
    pub dry_run: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DryRunQuery {
    #[serde(default, alias = "dryRun")]
    pub dry_run: bool,
}

// Sucesso -> 200 com o resumo. Falha -> status do erro que derrubou o sync, com o resumo em `data`.
fn sync_response(result: SyncResult) -> Response {
    if result.success {
        return ApiResponse::ok(result.message.clone(), result).into_response();
    }

    let message = result.message.clone();
    let error = result.error.clone().unwrap_or_default();
    ApiResponse::failed(result.status, message, error, result).into_response()
}

// POST /api/netsuite/sync/all
#[utoipa::path(
    post,
    path = "/api/netsuite/sync/all",
    tag = "Sync",
    params(DryRunQuery),
    responses(
        (status = 200, description = "Todas as entidades sincronizadas", body = SyncAllResult),
        (status = 500, description = "Uma ou mais entidades falharam", body = SyncAllResult)
    )
)]
pub async fn sync_all(
    State(app_state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<DryRunQuery>, AppError>,
) -> Response {
    let summary = app_state.sync_service.sync_all(query.dry_run).await;

    if summary.success {
        let message = format!("{} entidades sincronizadas", summary.succeeded);
        return ApiResponse::ok(message, summary).into_response();
    }

    let message = format!("{} de {} entidades falharam", summary.failed, summary.results.len());
    let failed: Vec<&str> = summary
        .results
        .iter()
        .filter(|r| !r.success)
        .map(|r| r.entity.slug())
        .collect();
    let error = format!("falharam: {}", failed.join(", "));
    ApiResponse::failed(axum::http::StatusCode::INTERNAL_SERVER_ERROR, message, error, summary).into_response()
}

// GET /api/netsuite/sync/status
#[utoipa::path(
    get,
    path = "/api/netsuite/sync/status",
    tag = "Sync",
    responses(
        (status = 200, description = "Situação de todas as tabelas espelhadas", body = Vec<TableSyncStatus>),
        (status = 500, description = "Falha ao consultar o banco")
    )
)]
pub async fn sync_status_all(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let statuses = app_state.sync_service.status_all().await?;
    Ok(ApiResponse::ok("Situação das tabelas sincronizadas", statuses))
}

// POST /api/netsuite/sync/{entity}
#[utoipa::path(
    post,
    path = "/api/netsuite/sync/{entity}",
    tag = "Sync",
    params(
        ("entity" = EntityKind, Path, description = "Entidade. Ex: accounts, tax-codes"),
        SyncQuery
    ),
    responses(
        (status = 200, description = "Sync concluído", body = SyncResult),
        (status = 400, description = "Parâmetros inválidos"),
        (status = 401, description = "NetSuite recusou as credenciais", body = SyncResult),
        (status = 404, description = "Entidade desconhecida"),
        (status = 500, description = "Falha no sync", body = SyncResult),
        (status = 504, description = "NetSuite não respondeu a tempo", body = SyncResult)
    )
)]
pub async fn sync_entity(
    State(app_state): State<AppState>,
    WithRejection(Path(entity), _): WithRejection<Path<String>, AppError>,
    WithRejection(Query(query), _): WithRejection<Query<SyncQuery>, AppError>,
) -> Result<Response, AppError> {
    let kind: EntityKind = entity.parse()?;
    query.validate()?;

    let options = SyncOptions {
        limit: query.limit,
        dry_run: query.dry_run,
        internal_id: None,
    };
    let result = app_state.sync_service.sync(kind, &options).await;

    Ok(sync_response(result))
}

// POST /api/netsuite/sync/{entity}/{internal_id}
#[utoipa::path(
    post,
    path = "/api/netsuite/sync/{entity}/{internal_id}",
    tag = "Sync",
    params(
        ("entity" = EntityKind, Path, description = "Entidade. Ex: customers"),
        ("internal_id" = i64, Path, description = "Internal ID do registro no NetSuite"),
        DryRunQuery
    ),
    responses(
        (status = 200, description = "Registro sincronizado", body = SyncResult),
        (status = 400, description = "Internal ID inválido"),
        (status = 404, description = "Entidade ou registro não encontrado"),
        (status = 500, description = "Falha no sync", body = SyncResult)
    )
)]
pub async fn sync_record(
    State(app_state): State<AppState>,
    WithRejection(Path((entity, internal_id)), _): WithRejection<Path<(String, i64)>, AppError>,
    WithRejection(Query(query), _): WithRejection<Query<DryRunQuery>, AppError>,
) -> Result<Response, AppError> {
    let kind: EntityKind = entity.parse()?;
    // Ids negativos existem (registros de sistema), zero não.
    if internal_id == 0 {
        return Err(AppError::BadRequest("internal_id não pode ser zero".to_string()));
    }

    let options = SyncOptions {
        limit: None,
        dry_run: query.dry_run,
        internal_id: Some(internal_id),
    };
    let result = app_state.sync_service.sync(kind, &options).await;

    Ok(sync_response(result))
}

// GET /api/netsuite/sync/{entity}/status
#[utoipa::path(
    get,
    path = "/api/netsuite/sync/{entity}/status",
    tag = "Sync",
    params(
        ("entity" = EntityKind, Path, description = "Entidade. Ex: employees")
    ),
    responses(
        (status = 200, description = "Situação da tabela", body = TableSyncStatus),
        (status = 404, description = "Entidade desconhecida")
    )
)]
pub async fn entity_status(
    State(app_state): State<AppState>,
    WithRejection(Path(entity), _): WithRejection<Path<String>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let kind: EntityKind = entity.parse()?;
    let status = app_state.sync_service.status(kind).await?;

    Ok(ApiResponse::ok(format!("Situação de {}", kind), status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Uri;

    fn sync_query(uri: &str) -> SyncQuery {
        let uri: Uri = uri.parse().unwrap();
        Query::<SyncQuery>::try_from_uri(&uri).unwrap().0
    }

    fn dry_run_query(uri: &str) -> DryRunQuery {
        let uri: Uri = uri.parse().unwrap();
        Query::<DryRunQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn dry_run_is_read_in_snake_case() {
        let query = sync_query("/api/netsuite/sync/accounts?limit=10&dry_run=true");
        assert_eq!(query.limit, Some(10));
        assert!(query.dry_run);

        assert!(dry_run_query("/api/netsuite/sync/all?dry_run=true").dry_run);
    }

    #[test]
    fn camel_case_dry_run_still_accepted() {
        assert!(sync_query("/api/netsuite/sync/accounts?dryRun=true").dry_run);
        assert!(dry_run_query("/api/netsuite/sync/all?dryRun=true").dry_run);
    }

    #[test]
    fn dry_run_defaults_to_false() {
        let query = sync_query("/api/netsuite/sync/accounts");
        assert_eq!(query.limit, None);
        assert!(!query.dry_run);
    }
}
