use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::sync::Mutex;

use crate::blockchain::{Block, Blockchain, ChainViolation, ProductFacts};
use crate::error::LedgerError;

/// Shared application state: the ledger behind a single-writer lock.
pub struct AppState {
    pub blockchain: Mutex<Blockchain>,
    /// Re-read the store before answering authenticity queries.
    pub reload_before_lookup: bool,
}

impl AppState {
    pub fn new(blockchain: Blockchain, reload_before_lookup: bool) -> Self {
        Self {
            blockchain: Mutex::new(blockchain),
            reload_before_lookup,
        }
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub length: usize,
    pub difficulty: u32,
    pub chain: &'a [Block],
}

#[derive(Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub length: usize,
    pub difficulty: u32,
    pub violation: Option<ChainViolation>,
}

#[derive(Serialize)]
pub struct NewBlockResponse {
    pub message: &'static str,
    pub block: Block,
}

#[derive(Serialize)]
pub struct DifficultyResponse {
    pub difficulty: u32,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub height: usize,
    pub difficulty: u32,
    pub min_difficulty: u32,
    pub target_interval_millis: i64,
    pub last_interval_millis: Option<i64>,
}

/* ---------- Verify API Models ---------- */

/// `{"authentic": false}` or `{"authentic": true, "dataSeedId": ..., ...}`.
#[derive(Serialize)]
pub struct VerifyResponse {
    pub authentic: bool,
    #[serde(flatten)]
    pub facts: Option<ProductFacts>,
}

impl From<Option<ProductFacts>> for VerifyResponse {
    fn from(facts: Option<ProductFacts>) -> Self {
        Self {
            authentic: facts.is_some(),
            facts,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ResponseError for LedgerError {
    fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::InvalidRecord { .. } => StatusCode::BAD_REQUEST,
            LedgerError::DuplicateRecord { .. } => StatusCode::CONFLICT,
            LedgerError::MiningAborted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            LedgerError::ValidationFailure(_)
            | LedgerError::NonceExhausted { .. }
            | LedgerError::PersistenceUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
