use serde::{Deserialize, Serialize};

use crate::backend::LookupBackend;
use crate::contract::{WidgetRequest, WidgetResponse};
use crate::core_service::{LookupService, RecordCreator, ServiceError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    InvalidRequest,
    Store,
    Config,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransportResponse {
    Ok { response: WidgetResponse },
    Err { error: ErrorResponse },
}

pub fn handle_request<B>(service: &mut LookupService<B>, request: WidgetRequest) -> TransportResponse
where
    B: LookupBackend + RecordCreator,
{
    match service.handle(request) {
        Ok(response) => TransportResponse::Ok { response },
        Err(error) => TransportResponse::Err {
            error: map_service_error(error),
        },
    }
}

pub fn handle_json<B>(service: &mut LookupService<B>, payload: &str) -> String
where
    B: LookupBackend + RecordCreator,
{
    let response = match serde_json::from_str::<WidgetRequest>(payload) {
        Ok(request) => handle_request(service, request),
        Err(error) => TransportResponse::Err {
            error: ErrorResponse {
                code: ErrorCode::InvalidJson,
                message: error.to_string(),
            },
        },
    };

    serde_json::to_string(&response).unwrap_or_else(|_| {
        r#"{"status":"err","error":{"code":"invalid_request","message":"response encoding failed"}}"#
            .to_string()
    })
}

fn map_service_error(error: ServiceError) -> ErrorResponse {
    match error {
        ServiceError::InvalidRequest(message) => ErrorResponse {
            code: ErrorCode::InvalidRequest,
            message,
        },
        ServiceError::Store(error) => ErrorResponse {
            code: ErrorCode::Store,
            message: error.to_string(),
        },
        ServiceError::Config(error) => ErrorResponse {
            code: ErrorCode::Config,
            message: error.to_string(),
        },
    }
}
