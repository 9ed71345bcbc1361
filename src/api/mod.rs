mod chain;
mod health;
pub mod models;
mod stats;
mod verify;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(chain::get_chain)
            .service(chain::get_block)
            .service(chain::add_block)
            .service(chain::validate_chain)
            .service(chain::get_difficulty)
            .service(stats::get_stats)
            .service(verify::verify_product),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{Block, Blockchain, CancelToken, ProductRecord};
    use crate::clock::SystemClock;
    use crate::config::ChainConfig;
    use crate::network::LogBroadcaster;
    use crate::storage::{BlockStore, MemoryStore};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    fn state_with(store: MemoryStore, reload_before_lookup: bool) -> web::Data<AppState> {
        let config = ChainConfig {
            initial_difficulty: 1,
            min_difficulty: 1,
            target_interval_millis: 30_000,
        };
        let bc = Blockchain::open(
            config,
            Box::new(store),
            Box::new(LogBroadcaster::default()),
            Box::new(SystemClock),
        )
        .unwrap();
        web::Data::new(AppState::new(bc, reload_before_lookup))
    }

    fn product(seed: &str, qr: &str) -> Value {
        json!({
            "dataSeedId": seed,
            "qrCodeId": qr,
            "priceId": "P1",
            "companyName": "Acme",
        })
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).configure(init_routes)).await
        };
    }

    #[actix_web::test]
    async fn record_then_verify() {
        let state = state_with(MemoryStore::new(), false);
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/block/")
            .set_json(product("S1", "Q1"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["block"]["index"], 1);
        assert_eq!(body["block"]["qrCodeId"], "Q1");
        assert!(body["block"]["hash"].as_str().unwrap().starts_with('0'));

        let req = test::TestRequest::get()
            .uri("/api/v1/verify/Q1/")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            json!({
                "authentic": true,
                "dataSeedId": "S1",
                "priceId": "P1",
                "companyName": "Acme",
            })
        );

        let req = test::TestRequest::get()
            .uri("/api/v1/verify/Q2/")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({ "authentic": false }));
    }

    #[actix_web::test]
    async fn missing_fact_is_a_bad_request() {
        let state = state_with(MemoryStore::new(), false);
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/block/")
            .set_json(json!({ "dataSeedId": "S1", "priceId": "P1", "companyName": "Acme" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("qrCodeId"));

        assert_eq!(state.blockchain.lock().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn duplicate_code_is_a_conflict() {
        let state = state_with(MemoryStore::new(), false);
        let app = app!(state);

        for (seed, expected) in [("S1", StatusCode::OK), ("S2", StatusCode::CONFLICT)] {
            let req = test::TestRequest::post()
                .uri("/api/v1/block/")
                .set_json(product(seed, "Q1"))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), expected);
        }
    }

    #[actix_web::test]
    async fn chain_block_and_validate_views() {
        let state = state_with(MemoryStore::new(), false);
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/block/")
            .set_json(product("S1", "Q1"))
            .to_request();
        test::call_service(&app, req).await;

        let req = test::TestRequest::get().uri("/api/v1/chain/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["length"], 2);
        assert_eq!(body["difficulty"], 2);
        assert_eq!(body["chain"][1]["precedingHash"], body["chain"][0]["hash"]);

        let req = test::TestRequest::get().uri("/api/v1/block/1/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["dataSeedId"], "S1");

        let req = test::TestRequest::get().uri("/api/v1/block/7/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/api/v1/validate/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["valid"], true);
        assert_eq!(body["violation"], Value::Null);

        let req = test::TestRequest::get().uri("/api/v1/stats/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["height"], 2);
        assert_eq!(body["target_interval_millis"], 30_000);
        assert!(body["last_interval_millis"].is_i64());

        let req = test::TestRequest::get().uri("/api/v1/difficulty/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["difficulty"], 2);
    }

    #[actix_web::test]
    async fn verify_reloads_when_configured() {
        let store = MemoryStore::new();
        let state = state_with(store.clone(), true);
        let app = app!(state);

        // Another writer appends to the shared store behind the node's back.
        let genesis = store.load().unwrap().remove(0);
        let mut block = Block::new(
            1,
            genesis.hash.clone(),
            genesis.timestamp,
            ProductRecord::new("S7", "Q7", "P7", "Elsewhere"),
        );
        block.mine(1, &CancelToken::new()).unwrap();
        store.clone().save(&block).unwrap();

        let req = test::TestRequest::get()
            .uri("/api/v1/verify/Q7/")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["authentic"], true);
        assert_eq!(body["companyName"], "Elsewhere");
    }

    #[actix_web::test]
    async fn stats_interval_saturates_on_extreme_timestamps() {
        let store = MemoryStore::with_blocks(vec![Block::genesis(i64::MIN)]);
        let state = state_with(store, false);
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/block/")
            .set_json(product("S1", "Q1"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::get().uri("/api/v1/stats/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["last_interval_millis"], i64::MAX);
    }

    #[actix_web::test]
    async fn health_is_up() {
        let state = state_with(MemoryStore::new(), false);
        let app = app!(state);
        let req = test::TestRequest::get().uri("/api/v1/health/").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}
