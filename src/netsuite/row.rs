// src/netsuite/row.rs

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::common::error::AppError;

/// Leitura tipada de uma linha devolvida pelo SuiteQL.
///
/// O SuiteQL serializa tudo como texto (`"42"`, `"T"`, `"7.25%"`) e simplesmente
/// omite as colunas nulas, então cada acessor trata "ausente" e "vazio" como `None`.
pub struct Row<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> Row<'a> {
    pub fn new(value: &'a Value) -> Result<Self, AppError> {
        value
            .as_object()
            .map(|fields| Self { fields })
            .ok_or_else(|| AppError::transform("<row>", "a linha do SuiteQL não é um objeto JSON"))
    }

    // Texto bruto da coluna, já sem espaços. Números viram texto.
    fn raw(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(if *b { "T" } else { "F" }.to_string()),
            _ => None,
        }
    }

    /// `id` é obrigatório: sem ele não existe chave para o upsert.
    pub fn internal_id(&self) -> Result<i64, AppError> {
        self.opt_i64("id")?
            .ok_or_else(|| AppError::transform("id", "coluna obrigatória ausente"))
    }

    pub fn opt_str(&self, key: &str) -> Option<String> {
        self.raw(key)
    }

    pub fn opt_i64(&self, key: &str) -> Result<Option<i64>, AppError> {
        self.raw(key)
            .map(|s| {
                s.parse::<i64>()
                    .map_err(|_| AppError::transform(key, format!("'{s}' não é um inteiro")))
            })
            .transpose()
    }

    pub fn opt_i32(&self, key: &str) -> Result<Option<i32>, AppError> {
        self.raw(key)
            .map(|s| {
                s.parse::<i32>()
                    .map_err(|_| AppError::transform(key, format!("'{s}' não é um inteiro")))
            })
            .transpose()
    }

    pub fn opt_decimal(&self, key: &str) -> Result<Option<Decimal>, AppError> {
        self.raw(key).map(|s| parse_decimal(key, &s)).transpose()
    }

    // "7.25%" -> 7.25
    pub fn opt_percent(&self, key: &str) -> Result<Option<Decimal>, AppError> {
        self.raw(key)
            .map(|s| parse_decimal(key, s.trim_end_matches('%').trim()))
            .transpose()
    }

    // Booleanos do NetSuite chegam como "T"/"F". Ausente conta como falso.
    pub fn flag(&self, key: &str) -> bool {
        matches!(
            self.raw(key).as_deref(),
            Some("T") | Some("t") | Some("true") | Some("Y")
        )
    }
}

fn parse_decimal(key: &str, s: &str) -> Result<Decimal, AppError> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| AppError::transform(key, format!("'{s}' não é um número decimal")))
}
