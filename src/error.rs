use serde::{Deserialize, Serialize};
use std::fmt;

use crate::agent::AgentError;
use crate::graph::StoreError;

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

#[derive(Debug)]
pub enum ApiError {
    Store(String),
    Agent(String),
    BadRequest(String),
    ServiceUnavailable(String),
}

impl fmt::Display for ApiError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ApiError::Store(msg) => write!(f, "Graph store error: {msg}"),
            ApiError::Agent(msg) => write!(f, "Agent error: {msg}"),
            ApiError::BadRequest(msg) => write!(f, "Bad request: {msg}"),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {msg}"),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err.to_string())
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        ApiError::Agent(err.to_string())
    }
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(msg.into())
    }
}

#[cfg(feature = "server")]
impl actix_web::ResponseError for ApiError {
    fn error_response(&self) -> actix_web::HttpResponse {
        let (status_code, error_type, message) = match self {
            ApiError::Store(msg) => (502, "STORE_ERROR", msg.clone()),
            ApiError::Agent(msg) => (502, "AGENT_ERROR", msg.clone()),
            ApiError::BadRequest(msg) => (400, "BAD_REQUEST", msg.clone()),
            ApiError::ServiceUnavailable(msg) => (503, "SERVICE_UNAVAILABLE", msg.clone()),
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
            status_code,
        };

        let status =
            actix_web::http::StatusCode::from_u16(status_code).unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
        actix_web::HttpResponse::build(status).json(error_response)
    }
}
