use actix_web::{HttpResponse, Responder, ResponseError, get, post, web};
use log::{info, warn};

use super::models::{
    AppState, ChainResponse, DifficultyResponse, ErrorResponse, NewBlockResponse,
    ValidateResponse,
};
use crate::blockchain::{ProductRecord, Validity};
use crate::error::LedgerError;

/// Get the full blockchain.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let bc = state.blockchain.lock().expect("mutex poisoned");
    let resp = ChainResponse {
        length: bc.len(),
        difficulty: bc.difficulty(),
        chain: bc.blocks(),
    };
    HttpResponse::Ok().json(resp)
}

#[get("/block/{index}/")]
pub async fn get_block(state: web::Data<AppState>, path: web::Path<(usize,)>) -> impl Responder {
    let index = path.into_inner().0;
    let bc = state.blockchain.lock().expect("mutex poisoned");
    match bc.block(index) {
        Some(block) => HttpResponse::Ok().json(block),
        None => HttpResponse::NotFound().json(ErrorResponse {
            error: format!("no block at index {index}"),
        }),
    }
}

/// Validate the whole chain.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let bc = state.blockchain.lock().expect("mutex poisoned");
    let validity = bc.validate();
    HttpResponse::Ok().json(ValidateResponse {
        valid: validity.is_valid(),
        length: bc.len(),
        difficulty: bc.difficulty(),
        violation: validity.violation(),
    })
}

/// Record a product:
/// - Refuse to extend a chain that no longer validates
/// - Mine PoW on the blocking pool while holding the ledger lock
/// - Persist, append, retarget and announce (all inside `append`)
#[post("/block/")]
pub async fn add_block(
    state: web::Data<AppState>,
    req: web::Json<ProductRecord>,
) -> impl Responder {
    let record = req.into_inner();
    let shared = state.clone();

    let mined = web::block(move || {
        let mut bc = shared.blockchain.lock().expect("mutex poisoned");
        if let Validity::Invalid(violation) = bc.validate() {
            return Err(LedgerError::ValidationFailure(violation));
        }
        bc.append(record).cloned()
    })
    .await;

    match mined {
        Ok(Ok(block)) => {
            info!("API - block #{} recorded (qrCodeId={})", block.index, block.qr_code_id);
            HttpResponse::Ok().json(NewBlockResponse {
                message: "New block added to the blockchain",
                block,
            })
        }
        Ok(Err(e)) => {
            warn!("API - block rejected: {e}");
            e.error_response()
        }
        Err(e) => HttpResponse::InternalServerError().json(ErrorResponse {
            error: e.to_string(),
        }),
    }
}

/// Get current PoW difficulty.
#[get("/difficulty/")]
pub async fn get_difficulty(state: web::Data<AppState>) -> impl Responder {
    let bc = state.blockchain.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(DifficultyResponse {
        difficulty: bc.difficulty(),
    })
}
