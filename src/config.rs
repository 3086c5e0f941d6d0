// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::SyncRepository,
    netsuite::{NetSuiteAuth, NetSuiteClient},
    services::sync_service::SyncService,
};

// Configuração lida do ambiente (.env é opcional).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub db_max_connections: u32,
    pub server_addr: String,
    pub netsuite: NetSuiteSettings,
    pub sync_batch_size: usize,
}

#[derive(Debug, Clone)]
pub struct NetSuiteSettings {
    pub base_url: String,
    pub auth: NetSuiteAuth,
    pub timeout: Duration,
    pub page_size: usize,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    // Recebe a função de lookup para poder ser testado sem mexer no ambiente do processo.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL deve ser definida"))?;

        let db_max_connections = parse_or(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 5u32)?;
        let server_addr = get("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());

        let base_url = match (get("NETSUITE_BASE_URL"), get("NETSUITE_ACCOUNT_ID")) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, Some(account)) => base_url_for_account(&account),
            (None, None) => anyhow::bail!("NETSUITE_ACCOUNT_ID ou NETSUITE_BASE_URL deve ser definido"),
        };

        let auth = match get("NETSUITE_ACCESS_TOKEN") {
            Some(token) => NetSuiteAuth::AccessToken(token),
            None => {
                let client_id = get("NETSUITE_CLIENT_ID").ok_or_else(|| {
                    anyhow::anyhow!("Defina NETSUITE_ACCESS_TOKEN ou NETSUITE_CLIENT_ID/NETSUITE_CERTIFICATE_ID")
                })?;
                let certificate_id = get("NETSUITE_CERTIFICATE_ID")
                    .ok_or_else(|| anyhow::anyhow!("NETSUITE_CERTIFICATE_ID deve ser definido"))?;
                let private_key_pem = match (get("NETSUITE_PRIVATE_KEY"), get("NETSUITE_PRIVATE_KEY_PATH")) {
                    (Some(pem), _) => pem.replace("\\n", "\n"),
                    (None, Some(path)) => std::fs::read_to_string(&path).map_err(|e| {
                        anyhow::anyhow!("Falha ao ler a chave privada em {}: {}", path, e)
                    })?,
                    (None, None) => anyhow::bail!(
                        "NETSUITE_PRIVATE_KEY ou NETSUITE_PRIVATE_KEY_PATH deve ser definido"
                    ),
                };
                NetSuiteAuth::ClientCredentials {
                    client_id,
                    certificate_id,
                    private_key_pem,
                }
            }
        };

        let timeout_secs = parse_or(get("NETSUITE_TIMEOUT_SECS"), "NETSUITE_TIMEOUT_SECS", 60u64)?;
        let page_size = parse_or(get("NETSUITE_PAGE_SIZE"), "NETSUITE_PAGE_SIZE", 1000usize)?;
        if !(1..=1000).contains(&page_size) {
            anyhow::bail!("NETSUITE_PAGE_SIZE deve estar entre 1 e 1000");
        }

        let sync_batch_size = parse_or(get("SYNC_BATCH_SIZE"), "SYNC_BATCH_SIZE", 500usize)?;
        if sync_batch_size == 0 {
            anyhow::bail!("SYNC_BATCH_SIZE deve ser maior que zero");
        }

        Ok(Self {
            database_url,
            db_max_connections,
            server_addr,
            netsuite: NetSuiteSettings {
                base_url,
                auth,
                timeout: Duration::from_secs(timeout_secs),
                page_size,
            },
            sync_batch_size,
        })
    }
}

// "1234567_SB1" -> https://1234567-sb1.suitetalk.api.netsuite.com
pub fn base_url_for_account(account_id: &str) -> String {
    format!(
        "https://{}.suitetalk.api.netsuite.com",
        account_id.trim().to_lowercase().replace('_', "-")
    )
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} tem um valor inválido: '{}'", key, v)),
        None => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub sync_service: SyncService,
}

impl AppState {
    pub async fn new(settings: &Settings) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::with_pool(db_pool, settings)
    }

    // Monta o gráfico de dependências em cima de uma pool já criada.
    pub fn with_pool(db_pool: PgPool, settings: &Settings) -> anyhow::Result<Self> {
        let client = NetSuiteClient::new(&settings.netsuite)?;
        let repo = SyncRepository::new(db_pool.clone(), settings.sync_batch_size);
        let sync_service = SyncService::new(client, repo);

        Ok(Self {
            db_pool,
            sync_service,
        })
    }
}
