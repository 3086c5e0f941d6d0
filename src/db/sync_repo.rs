// src/db/sync_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::{
    common::error::AppError,
    models::sync::{SyncEntity, SyncRun},
};

// Colunas de auditoria gravadas em toda escrita, depois das colunas da entidade.
const AUDIT_COLUMNS: [&str; 2] = ["sync_timestamp", "updated_at"];

// Limite do protocolo do Postgres para parâmetros em um único statement.
const MAX_BIND_PARAMS: usize = 65535;

// Repositório genérico das tabelas espelhadas do NetSuite e do histórico de execuções.
#[derive(Clone)]
pub struct SyncRepository {
    pool: PgPool,
    batch_size: usize,
}

impl SyncRepository {
    pub fn new(pool: PgPool, batch_size: usize) -> Self {
        Self {
            pool,
            batch_size: batch_size.max(1),
        }
    }

    // Upsert em lotes dentro de uma única transação: ou grava tudo, ou nada.
    pub async fn upsert<E: SyncEntity>(&self, records: &[E], synced_at: DateTime<Utc>) -> Result<u64, AppError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut affected = 0u64;

        for chunk in records.chunks(rows_per_statement::<E>(self.batch_size)) {
            let mut query = build_upsert(chunk, synced_at);
            affected += query.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        Ok(affected)
    }

    // Quantidade de linhas e último sync_timestamp da tabela.
    pub async fn table_stats(&self, table: &str) -> Result<(i64, Option<DateTime<Utc>>), AppError> {
        // O nome da tabela vem sempre de uma constante de SyncEntity, nunca do usuário.
        let sql = format!("SELECT COUNT(*), MAX(sync_timestamp) FROM {}", table);
        let stats = sqlx::query_as::<_, (i64, Option<DateTime<Utc>>)>(&sql)
            .fetch_one(&self.pool)
            .await?;
        Ok(stats)
    }

    pub async fn record_run(&self, run: &SyncRun) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO netsuite_sync_runs
                (id, entity, started_at, finished_at, success, records_fetched, records_processed, message, error)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(run.id)
        .bind(&run.entity)
        .bind(run.started_at)
        .bind(run.finished_at)
        .bind(run.success)
        .bind(run.records_fetched)
        .bind(run.records_processed)
        .bind(&run.message)
        .bind(&run.error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn last_run(&self, entity: &str) -> Result<Option<SyncRun>, AppError> {
        let run = sqlx::query_as::<_, SyncRun>(
            r#"
            SELECT id, entity, started_at, finished_at, success, records_fetched, records_processed, message, error
            FROM netsuite_sync_runs
            WHERE entity = $1
            ORDER BY finished_at DESC
            LIMIT 1
            "#,
        )
        .bind(entity)
        .fetch_optional(&self.pool)
        .await?;
        Ok(run)
    }
}

// Linhas por INSERT: o lote configurado, limitado para não estourar os binds do Postgres.
fn rows_per_statement<E: SyncEntity>(batch_size: usize) -> usize {
    let binds_per_row = E::COLUMNS.len() + AUDIT_COLUMNS.len();
    batch_size.clamp(1, MAX_BIND_PARAMS / binds_per_row)
}

/// INSERT ... VALUES (...), (...) ON CONFLICT (chave) DO UPDATE SET col = EXCLUDED.col
pub fn build_upsert<'args, E: SyncEntity>(records: &[E], synced_at: DateTime<Utc>) -> QueryBuilder<'args, Postgres> {
    let columns: Vec<&str> = E::COLUMNS.iter().copied().chain(AUDIT_COLUMNS).collect();

    let mut query: QueryBuilder<'args, Postgres> = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) ",
        E::TABLE,
        columns.join(", ")
    ));

    query.push_values(records, |mut b, record| {
        record.push_binds(&mut b);
        b.push_bind(synced_at).push_bind(synced_at);
    });

    let updates: Vec<String> = columns
        .iter()
        .filter(|c| **c != E::CONFLICT_COLUMN)
        .map(|c| format!("{c} = EXCLUDED.{c}"))
        .collect();

    query.push(format!(
        " ON CONFLICT ({}) DO UPDATE SET {}",
        E::CONFLICT_COLUMN,
        updates.join(", ")
    ));

    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{finance::Currency, logistics::WorkCenter, organization::Employee};

    fn center(id: i64, name: &str) -> WorkCenter {
        WorkCenter {
            netsuite_internal_id: id,
            name: Some(name.to_string()),
            subsidiary_id: None,
            is_inactive: false,
        }
    }

    #[test]
    fn upsert_sql_targets_conflict_column() {
        let records = vec![center(1, "Corte"), center(2, "Solda")];
        let query = build_upsert(&records, Utc::now());

        assert_eq!(
            query.sql(),
            "INSERT INTO netsuite_work_centers \
             (netsuite_internal_id, name, subsidiary_id, is_inactive, sync_timestamp, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6), ($7, $8, $9, $10, $11, $12) \
             ON CONFLICT (netsuite_internal_id) DO UPDATE SET \
             name = EXCLUDED.name, subsidiary_id = EXCLUDED.subsidiary_id, is_inactive = EXCLUDED.is_inactive, \
             sync_timestamp = EXCLUDED.sync_timestamp, updated_at = EXCLUDED.updated_at"
        );
    }

    #[test]
    fn bind_count_matches_columns() {
        let records = vec![Currency {
            netsuite_internal_id: 1,
            name: Some("Real".into()),
            symbol: Some("BRL".into()),
            display_symbol: Some("R$".into()),
            exchange_rate: None,
            is_base_currency: true,
            is_inactive: false,
        }];
        let query = build_upsert(&records, Utc::now());

        let placeholders = query.sql().matches('$').count();
        assert_eq!(placeholders, Currency::COLUMNS.len() + AUDIT_COLUMNS.len());
    }

    #[test]
    fn large_batches_are_capped_by_bind_limit() {
        let rows = rows_per_statement::<Employee>(10_000);
        let binds_per_row = Employee::COLUMNS.len() + AUDIT_COLUMNS.len();

        assert!(rows < 10_000);
        assert!(rows * binds_per_row <= MAX_BIND_PARAMS);
        assert!((rows + 1) * binds_per_row > MAX_BIND_PARAMS);
    }

    #[test]
    fn small_batches_are_kept() {
        assert_eq!(rows_per_statement::<Currency>(500), 500);
        assert_eq!(rows_per_statement::<Currency>(0), 1);
    }
}
