// src/common/response.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

// Envelope padrão das respostas de sucesso: { success, message, data }
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
            error: None,
            status: StatusCode::OK,
        }
    }

    // Usado quando a operação falhou mas ainda temos um resumo para devolver
    // (ex.: um sync que quebrou no meio do caminho).
    pub fn failed(status: StatusCode, message: impl Into<String>, error: impl Into<String>, data: T) -> Self {
        Self {
            success: false,
            message: message.into(),
            data,
            error: Some(error.into()),
            status,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_omits_error() {
        let body = serde_json::to_value(ApiResponse::ok("pronto", json!({ "n": 1 }))).unwrap();
        assert_eq!(body, json!({ "success": true, "message": "pronto", "data": { "n": 1 } }));
    }

    #[test]
    fn failed_envelope_keeps_status_out_of_body() {
        let resp = ApiResponse::failed(StatusCode::GATEWAY_TIMEOUT, "lento", "timeout", json!(null));
        assert_eq!(resp.status, StatusCode::GATEWAY_TIMEOUT);

        let body = serde_json::to_value(&resp).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "timeout");
        assert!(body.get("status").is_none());
    }
}
