use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::*;
use store_engine::{AccountApiError, CatalogApiError, ErrorKind, OrderFlowError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("The store is temporarily unavailable. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("{0}")]
    InsufficientStock(String),
    #[error("{0}")]
    Conflict(String),
    #[error("The server is busy. {0}")]
    ServiceBusy(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::CouldNotIssueToken(_) | AuthError::HashingError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::UNAUTHORIZED,
            },
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientStock(_) => StatusCode::CONFLICT,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BackendError(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::ServiceBusy(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Authorization header required")]
    MissingToken,
    #[error("Invalid authorization header format. Expected 'Bearer <token>'")]
    PoorlyFormattedToken,
    #[error("Invalid token. {0}")]
    ValidationError(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Could not issue an access token. {0}")]
    CouldNotIssueToken(String),
    #[error("Could not hash password. {0}")]
    HashingError(String),
    #[error("The bus webhook is not enabled")]
    WebhookDisabled,
    #[error("Invalid webhook token")]
    InvalidWebhookToken,
}

impl ServerError {
    /// Maps an engine failure onto the response the caller sees. Only infrastructure failures are logged as errors;
    /// everything else is an expected outcome of the request.
    fn from_engine(kind: ErrorKind, message: String) -> Self {
        match kind {
            ErrorKind::NotFound => Self::NoRecordFound(message),
            ErrorKind::InsufficientStock => Self::InsufficientStock(message),
            ErrorKind::InvalidInput => Self::InvalidInput(message),
            ErrorKind::Conflict => Self::Conflict(message),
            ErrorKind::TransientInfra => {
                error!("💻️ Backend failure while handling a request. {message}");
                Self::BackendError(message)
            },
        }
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        Self::from_engine(e.kind(), e.to_string())
    }
}

impl From<CatalogApiError> for ServerError {
    fn from(e: CatalogApiError) -> Self {
        Self::from_engine(e.kind(), e.to_string())
    }
}

impl From<AccountApiError> for ServerError {
    fn from(e: AccountApiError) -> Self {
        Self::from_engine(e.kind(), e.to_string())
    }
}
