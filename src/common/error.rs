use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Erro único da aplicação. Cada variante sabe qual status HTTP devolver.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error("Entidade de sincronização desconhecida: {0}")]
    UnknownEntity(String),

    #[error("Registro {id} de {entity} não encontrado no NetSuite")]
    RecordNotFound { entity: String, id: i64 },

    #[error("O NetSuite recusou as credenciais: {0}")]
    NetSuiteUnauthorized(String),

    #[error("Tempo esgotado aguardando resposta do NetSuite")]
    NetSuiteTimeout,

    #[error("Erro do NetSuite (HTTP {status}): {message}")]
    NetSuiteError { status: u16, message: String },

    #[error("Falha na comunicação com o NetSuite: {0}")]
    NetSuiteRequest(String),

    #[error("Falha ao transformar o campo '{field}': {message}")]
    TransformError { field: String, message: String },

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),
}

// O reqwest não separa timeout em tipo próprio, então a conversão é manual.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::NetSuiteTimeout
        } else {
            AppError::NetSuiteRequest(err.to_string())
        }
    }
}

// Rejeições dos extractors do axum (ex.: `?limit=abc`) também saem no envelope JSON.
impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl AppError {
    pub fn transform(field: &str, message: impl Into<String>) -> Self {
        AppError::TransformError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NetSuiteUnauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::UnknownEntity(_) | AppError::RecordNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::NetSuiteTimeout => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Mensagem curta e segura para o cliente. Os detalhes ficam no `error`.
    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) | AppError::BadRequest(_) => "Um ou mais parâmetros são inválidos.",
            AppError::UnknownEntity(_) => "Entidade não encontrada.",
            AppError::RecordNotFound { .. } => "Registro não encontrado.",
            AppError::NetSuiteUnauthorized(_) => "Falha de autenticação no NetSuite.",
            AppError::NetSuiteTimeout => "O NetSuite não respondeu a tempo.",
            AppError::NetSuiteError { .. } | AppError::NetSuiteRequest(_) => "Falha ao consultar o NetSuite.",
            AppError::TransformError { .. } => "Falha ao transformar os dados do NetSuite.",
            AppError::DatabaseError(_) => "Falha ao gravar no banco de dados.",
            _ => "Ocorreu um erro inesperado.",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if let AppError::ValidationError(errors) = &self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                details.insert(field.to_string(), messages);
            }
            let body = Json(json!({
                "success": false,
                "message": self.public_message(),
                "error": "validation_failed",
                "details": details,
            }));
            return (status, body).into_response();
        }

        if status.is_server_error() {
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let body = Json(json!({
            "success": false,
            "message": self.public_message(),
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(AppError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::UnknownEntity("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::NetSuiteUnauthorized("INVALID_LOGIN".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::NetSuiteTimeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            AppError::NetSuiteError { status: 400, message: "bad query".into() }.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::transform("id", "missing").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn response_body_carries_envelope() {
        let response = AppError::UnknownEntity("widgets".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Entidade não encontrada.");
        assert!(body["error"].as_str().unwrap().contains("widgets"));
    }
}
