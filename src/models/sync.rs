// src/models/sync.rs

use std::{fmt, str::FromStr};

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{query_builder::Separated, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{common::error::AppError, netsuite::Row};

// --- ENTIDADES ESPELHADAS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Accounts,
    Currencies,
    Customers,
    Departments,
    Employees,
    Vendors,
    TaxCodes,
    Terms,
    Locations,
    ShipMethods,
    WorkCenters,
}

impl EntityKind {
    /// Ordem do sync completo: primeiro o que os outros registros referenciam.
    pub const ALL: [EntityKind; 11] = [
        EntityKind::Currencies,
        EntityKind::Terms,
        EntityKind::Departments,
        EntityKind::Locations,
        EntityKind::Accounts,
        EntityKind::TaxCodes,
        EntityKind::ShipMethods,
        EntityKind::WorkCenters,
        EntityKind::Employees,
        EntityKind::Customers,
        EntityKind::Vendors,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            EntityKind::Accounts => "accounts",
            EntityKind::Currencies => "currencies",
            EntityKind::Customers => "customers",
            EntityKind::Departments => "departments",
            EntityKind::Employees => "employees",
            EntityKind::Vendors => "vendors",
            EntityKind::TaxCodes => "tax-codes",
            EntityKind::Terms => "terms",
            EntityKind::Locations => "locations",
            EntityKind::ShipMethods => "ship-methods",
            EntityKind::WorkCenters => "work-centers",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for EntityKind {
    type Err = AppError;

    // Aceita tanto "tax-codes" quanto "tax_codes".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == normalized)
            .ok_or_else(|| AppError::UnknownEntity(s.to_string()))
    }
}

/// Configuração de uma entidade sincronizada: consulta, transformação e destino.
pub trait SyncEntity: Sized + Send + Sync + 'static {
    const KIND: EntityKind;
    const TABLE: &'static str;
    const CONFLICT_COLUMN: &'static str = "netsuite_internal_id";
    /// Colunas gravadas, na mesma ordem de `push_binds`. As de auditoria
    /// (`sync_timestamp`, `updated_at`) são acrescentadas pelo repositório.
    const COLUMNS: &'static [&'static str];
    /// `SELECT ... FROM ...` sem cláusula WHERE.
    const SUITEQL: &'static str;
    const SUITEQL_FILTER: Option<&'static str> = None;

    fn from_row(row: &Row<'_>) -> Result<Self, AppError>;

    fn internal_id(&self) -> i64;

    fn push_binds<'qb, 'args>(&self, b: &mut Separated<'qb, 'args, Postgres, &'static str>)
    where
        'args: 'qb;
}

/// Monta a consulta SuiteQL da entidade, opcionalmente restrita a um único registro.
pub fn suiteql_for<E: SyncEntity>(internal_id: Option<i64>) -> String {
    let mut conditions: Vec<String> = Vec::new();
    if let Some(filter) = E::SUITEQL_FILTER {
        conditions.push(filter.to_string());
    }
    if let Some(id) = internal_id {
        conditions.push(format!("id = {}", id));
    }

    let mut query = E::SUITEQL.to_string();
    if !conditions.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&conditions.join(" AND "));
    }
    // Ordem estável para a paginação do SuiteQL.
    query.push_str(" ORDER BY id");
    query
}

// --- PARÂMETROS E RESULTADOS ---

#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub limit: Option<usize>,
    pub dry_run: bool,
    pub internal_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub success: bool,
    pub message: String,
    pub entity: EntityKind,
    pub table: String,
    pub records_fetched: usize,
    pub records_processed: usize,
    pub duration_ms: u64,
    pub synced_at: DateTime<Utc>,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    // Status HTTP que o handler deve usar quando o sync falha.
    #[serde(skip)]
    pub status: StatusCode,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncAllResult {
    pub success: bool,
    pub succeeded: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<SyncResult>,
}

// Linha do histórico (tabela netsuite_sync_runs)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncRun {
    pub id: Uuid,
    pub entity: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub success: bool,
    pub records_fetched: i64,
    pub records_processed: i64,
    pub message: String,
    pub error: Option<String>,
}

impl SyncRun {
    pub fn from_result(result: &SyncResult) -> Self {
        let elapsed = chrono::Duration::milliseconds(result.duration_ms as i64);
        Self {
            id: Uuid::new_v4(),
            entity: result.entity.slug().to_string(),
            started_at: result.synced_at,
            finished_at: result.synced_at + elapsed,
            success: result.success,
            records_fetched: result.records_fetched as i64,
            records_processed: result.records_processed as i64,
            message: result.message.clone(),
            error: result.error.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableSyncStatus {
    pub entity: EntityKind,
    pub table: String,
    pub record_count: i64,
    pub last_sync_timestamp: Option<DateTime<Utc>>,
    pub last_run: Option<SyncRun>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{finance::Currency, logistics::WorkCenter};

    #[test]
    fn entity_kind_parses_slugs() {
        assert_eq!("tax-codes".parse::<EntityKind>().unwrap(), EntityKind::TaxCodes);
        assert_eq!("Work_Centers".parse::<EntityKind>().unwrap(), EntityKind::WorkCenters);
        assert!(matches!("widgets".parse::<EntityKind>(), Err(AppError::UnknownEntity(_))));
    }

    #[test]
    fn all_kinds_are_listed_once() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.slug().parse::<EntityKind>().unwrap(), kind);
            assert_eq!(EntityKind::ALL.iter().filter(|k| **k == kind).count(), 1);
        }
    }

    #[test]
    fn entity_kind_serializes_as_slug() {
        assert_eq!(serde_json::to_value(EntityKind::ShipMethods).unwrap(), "ship-methods");
    }

    #[test]
    fn suiteql_without_filters_is_ordered() {
        assert_eq!(
            suiteql_for::<Currency>(None),
            format!("{} ORDER BY id", Currency::SUITEQL)
        );
    }

    #[test]
    fn suiteql_combines_fixed_filter_and_id() {
        let query = suiteql_for::<WorkCenter>(Some(42));
        assert!(query.ends_with("WHERE ismanufacturingworkcenter = 'T' AND id = 42 ORDER BY id"));
    }

    #[test]
    fn run_ledger_row_mirrors_result() {
        let synced_at = Utc::now();
        let result = SyncResult {
            success: false,
            message: "falhou".into(),
            entity: EntityKind::Terms,
            table: "netsuite_terms".into(),
            records_fetched: 10,
            records_processed: 0,
            duration_ms: 1500,
            synced_at,
            dry_run: false,
            error: Some("timeout".into()),
            status: StatusCode::GATEWAY_TIMEOUT,
        };

        let run = SyncRun::from_result(&result);
        assert_eq!(run.entity, "terms");
        assert_eq!(run.records_fetched, 10);
        assert_eq!(run.finished_at - run.started_at, chrono::Duration::milliseconds(1500));
        assert_eq!(run.error.as_deref(), Some("timeout"));

        let body = serde_json::to_value(&result).unwrap();
        assert_eq!(body["recordsFetched"], 10);
        assert!(body.get("status").is_none());
    }
}
