// src/services/sync_service.rs

use std::{collections::HashMap, time::Instant};

use async_trait::async_trait;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::{
    common::error::AppError,
    db::SyncRepository,
    models::{
        finance::{Account, Currency, TaxCode, Term},
        logistics::{ShipMethod, WorkCenter},
        organization::{Department, Employee, Location},
        parties::{Customer, Vendor},
        sync::{
            suiteql_for, EntityKind, SyncAllResult, SyncEntity, SyncOptions, SyncResult, SyncRun,
            TableSyncStatus,
        },
    },
    netsuite::{NetSuiteClient, Row},
};

// ---
// Pontas do pipeline: de onde vêm as linhas e para onde vão os registros.
// ---

#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch_rows(&self, query: &str, limit: Option<usize>) -> Result<Vec<Value>, AppError>;
}

#[async_trait]
pub trait RecordSink: Send + Sync {
    async fn upsert<E: SyncEntity>(&self, records: &[E], synced_at: DateTime<Utc>) -> Result<u64, AppError>;

    async fn record_run(&self, run: &SyncRun) -> Result<(), AppError>;

    async fn table_stats(&self, table: &str) -> Result<(i64, Option<DateTime<Utc>>), AppError>;

    async fn last_run(&self, entity: &str) -> Result<Option<SyncRun>, AppError>;
}

#[async_trait]
impl RecordSource for NetSuiteClient {
    async fn fetch_rows(&self, query: &str, limit: Option<usize>) -> Result<Vec<Value>, AppError> {
        self.suiteql(query, limit).await
    }
}

#[async_trait]
impl RecordSink for SyncRepository {
    async fn upsert<E: SyncEntity>(&self, records: &[E], synced_at: DateTime<Utc>) -> Result<u64, AppError> {
        SyncRepository::upsert(self, records, synced_at).await
    }

    async fn record_run(&self, run: &SyncRun) -> Result<(), AppError> {
        SyncRepository::record_run(self, run).await
    }

    async fn table_stats(&self, table: &str) -> Result<(i64, Option<DateTime<Utc>>), AppError> {
        SyncRepository::table_stats(self, table).await
    }

    async fn last_run(&self, entity: &str) -> Result<Option<SyncRun>, AppError> {
        SyncRepository::last_run(self, entity).await
    }
}

// ---
// O pipeline: consulta -> transformação -> upsert -> resumo
// ---

/// Sincroniza uma entidade. Nunca devolve `Err`: qualquer falha vira
/// `success: false` com a mensagem e o status HTTP correspondente.
pub async fn execute_sync<E, S, D>(source: &S, sink: &D, options: &SyncOptions) -> SyncResult
where
    E: SyncEntity,
    S: RecordSource,
    D: RecordSink,
{
    let started = Instant::now();
    let synced_at = Utc::now();

    let mut result = SyncResult {
        success: false,
        message: String::new(),
        entity: E::KIND,
        table: E::TABLE.to_string(),
        records_fetched: 0,
        records_processed: 0,
        duration_ms: 0,
        synced_at,
        dry_run: options.dry_run,
        error: None,
        status: StatusCode::OK,
    };

    tracing::info!("🔄 Iniciando sync de {} -> {}", E::KIND, E::TABLE);

    let outcome = run_pipeline::<E, S, D>(source, sink, options, synced_at, &mut result).await;
    result.duration_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Ok(()) => {
            result.success = true;
            result.message = if options.dry_run {
                format!(
                    "Simulação: {} registros de {} seriam sincronizados",
                    result.records_processed, E::KIND
                )
            } else {
                format!("{} registros de {} sincronizados", result.records_processed, E::KIND)
            };
            tracing::info!(
                "✅ Sync de {} concluído: {} lidos, {} gravados em {}ms",
                E::KIND,
                result.records_fetched,
                result.records_processed,
                result.duration_ms
            );
        }
        Err(err) => {
            result.message = format!("Falha ao sincronizar {}: {}", E::KIND, err.public_message());
            result.error = Some(err.to_string());
            result.status = err.status_code();
            tracing::error!("🔥 Sync de {} falhou após {}ms: {}", E::KIND, result.duration_ms, err);
        }
    }

    // O histórico é informativo: se falhar, só registramos no log.
    if !options.dry_run {
        if let Err(e) = sink.record_run(&SyncRun::from_result(&result)).await {
            tracing::warn!("Não foi possível registrar a execução do sync de {}: {}", E::KIND, e);
        }
    }

    result
}

async fn run_pipeline<E, S, D>(
    source: &S,
    sink: &D,
    options: &SyncOptions,
    synced_at: DateTime<Utc>,
    result: &mut SyncResult,
) -> Result<(), AppError>
where
    E: SyncEntity,
    S: RecordSource,
    D: RecordSink,
{
    // 1. Consulta
    let query = suiteql_for::<E>(options.internal_id);
    let rows = source.fetch_rows(&query, options.limit).await?;
    result.records_fetched = rows.len();

    if let (Some(id), true) = (options.internal_id, rows.is_empty()) {
        return Err(AppError::RecordNotFound {
            entity: E::KIND.to_string(),
            id,
        });
    }

    // 2. Transformação (uma linha ruim derruba a execução inteira)
    let records = rows
        .iter()
        .map(|value| Row::new(value).and_then(|row| E::from_row(&row)))
        .collect::<Result<Vec<E>, AppError>>()?;
    let records = dedupe_by_internal_id(records);

    // 3. Upsert
    if !options.dry_run {
        sink.upsert(&records, synced_at).await?;
    }
    result.records_processed = records.len();

    Ok(())
}

// Um único INSERT ... ON CONFLICT não pode atualizar a mesma linha duas vezes,
// então ids repetidos ficam só com a última ocorrência (na posição da primeira).
fn dedupe_by_internal_id<E: SyncEntity>(records: Vec<E>) -> Vec<E> {
    let mut positions: HashMap<i64, usize> = HashMap::with_capacity(records.len());
    let mut unique: Vec<E> = Vec::with_capacity(records.len());

    for record in records {
        let id = record.internal_id();
        match positions.get(&id) {
            Some(&index) => unique[index] = record,
            None => {
                positions.insert(id, unique.len());
                unique.push(record);
            }
        }
    }

    unique
}

/// Contagem de linhas, último sync_timestamp e última execução registrada.
pub async fn get_table_sync_status<E, D>(sink: &D) -> Result<TableSyncStatus, AppError>
where
    E: SyncEntity,
    D: RecordSink,
{
    let (record_count, last_sync_timestamp) = sink.table_stats(E::TABLE).await?;
    let last_run = sink.last_run(E::KIND.slug()).await?;

    Ok(TableSyncStatus {
        entity: E::KIND,
        table: E::TABLE.to_string(),
        record_count,
        last_sync_timestamp,
        last_run,
    })
}

// Liga o EntityKind (vindo da rota) ao tipo concreto da entidade.
macro_rules! with_entity {
    ($kind:expr, |$E:ident| $body:expr) => {
        match $kind {
            EntityKind::Accounts => { type $E = Account; $body }
            EntityKind::Currencies => { type $E = Currency; $body }
            EntityKind::Customers => { type $E = Customer; $body }
            EntityKind::Departments => { type $E = Department; $body }
            EntityKind::Employees => { type $E = Employee; $body }
            EntityKind::Vendors => { type $E = Vendor; $body }
            EntityKind::TaxCodes => { type $E = TaxCode; $body }
            EntityKind::Terms => { type $E = Term; $body }
            EntityKind::Locations => { type $E = Location; $body }
            EntityKind::ShipMethods => { type $E = ShipMethod; $body }
            EntityKind::WorkCenters => { type $E = WorkCenter; $body }
        }
    };
}

#[derive(Clone)]
pub struct SyncService {
    client: NetSuiteClient,
    repo: SyncRepository,
}

impl SyncService {
    pub fn new(client: NetSuiteClient, repo: SyncRepository) -> Self {
        Self { client, repo }
    }

    pub async fn sync(&self, kind: EntityKind, options: &SyncOptions) -> SyncResult {
        with_entity!(kind, |E| execute_sync::<E, _, _>(&self.client, &self.repo, options).await)
    }

    pub async fn status(&self, kind: EntityKind) -> Result<TableSyncStatus, AppError> {
        with_entity!(kind, |E| get_table_sync_status::<E, _>(&self.repo).await)
    }

    pub async fn sync_all(&self, dry_run: bool) -> SyncAllResult {
        sync_all_with(&self.client, &self.repo, dry_run).await
    }

    pub async fn status_all(&self) -> Result<Vec<TableSyncStatus>, AppError> {
        let mut statuses = Vec::with_capacity(EntityKind::ALL.len());
        for kind in EntityKind::ALL {
            statuses.push(self.status(kind).await?);
        }
        Ok(statuses)
    }
}

/// Roda todas as entidades em sequência, seguindo mesmo quando uma falha.
pub async fn sync_all_with<S, D>(source: &S, sink: &D, dry_run: bool) -> SyncAllResult
where
    S: RecordSource,
    D: RecordSink,
{
    let started = Instant::now();
    let options = SyncOptions {
        dry_run,
        ..SyncOptions::default()
    };

    let mut results = Vec::with_capacity(EntityKind::ALL.len());
    for kind in EntityKind::ALL {
        let result = with_entity!(kind, |E| execute_sync::<E, S, D>(source, sink, &options).await);
        results.push(result);
    }

    let succeeded = results.iter().filter(|r| r.success).count();
    let failed = results.len() - succeeded;
    tracing::info!("Sync completo: {} ok, {} com falha", succeeded, failed);

    SyncAllResult {
        success: failed == 0,
        succeeded,
        failed,
        duration_ms: started.elapsed().as_millis() as u64,
        results,
    }
}
