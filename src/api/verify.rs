use actix_web::{HttpResponse, Responder, ResponseError, get, web};
use log::debug;

use super::models::{AppState, VerifyResponse};

/// Is this QR code genuine? Unknown codes answer `{"authentic": false}`.
#[get("/verify/{qr_code_id}/")]
pub async fn verify_product(
    state: web::Data<AppState>,
    path: web::Path<(String,)>,
) -> impl Responder {
    let qr_code_id = path.into_inner().0;
    let mut bc = state.blockchain.lock().expect("mutex poisoned");

    if state.reload_before_lookup {
        if let Err(e) = bc.reload() {
            return e.error_response();
        }
    }

    let facts = bc.lookup_by_qr_code(&qr_code_id);
    debug!("VERIFY - {qr_code_id}: authentic={}", facts.is_some());
    HttpResponse::Ok().json(VerifyResponse::from(facts))
}
