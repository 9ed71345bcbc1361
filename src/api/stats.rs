use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, StatsResponse};

#[get("/stats/")]
pub async fn get_stats(state: web::Data<AppState>) -> impl Responder {
    let bc = state.blockchain.lock().expect("mutex poisoned");
    let blocks = bc.blocks();

    // last interval
    let last_interval_millis = match blocks {
        [.., older, newer] => Some(newer.timestamp.saturating_sub(older.timestamp)),
        _ => None,
    };

    HttpResponse::Ok().json(StatsResponse {
        height: bc.len(),
        difficulty: bc.difficulty(),
        min_difficulty: bc.config().min_difficulty,
        target_interval_millis: bc.config().target_interval_millis,
        last_interval_millis,
    })
}
