// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "NetSuite Sync",
        description = "Espelha registros do NetSuite (SuiteQL) em tabelas do Postgres"
    ),
    paths(
        // --- Sync ---
        handlers::sync::sync_all,
        handlers::sync::sync_status_all,
        handlers::sync::sync_entity,
        handlers::sync::sync_record,
        handlers::sync::entity_status,
    ),
    components(
        schemas(
            models::sync::EntityKind,
            models::sync::SyncResult,
            models::sync::SyncAllResult,
            models::sync::SyncRun,
            models::sync::TableSyncStatus,
        )
    ),
    tags(
        (name = "Sync", description = "Sincronização NetSuite -> Postgres")
    )
)]
pub struct ApiDoc;
