use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::pricing::{PricingService, PricingServiceError};
use crate::marketplace::Marketplace;
use crate::pricing::{CalculationInput, FeeOverrides, Quote};
use crate::rules::MarketplaceRules;
use crate::store::{CalculationId, CalculationRepository, RuleStore, StoreError};

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub input: CalculationInput,
    #[serde(default)]
    pub overrides: FeeOverrides,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    pub marketplace: Marketplace,
    #[serde(flatten)]
    pub quote: Quote,
    /// Categories the selected marketplace offers, for category-based schedules.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SaveCalculationRequest {
    pub name: String,
    pub input: CalculationInput,
}

/// Router exposing quotes, rule management and saved calculations.
pub fn pricing_router<R, C>(service: Arc<PricingService<R, C>>) -> Router
where
    R: RuleStore + 'static,
    C: CalculationRepository + 'static,
{
    Router::new()
        .route("/api/v1/quote", post(quote_handler::<R, C>))
        .route("/api/v1/quote/compare", post(compare_handler::<R, C>))
        .route(
            "/api/v1/rules",
            get(rules_handler::<R, C>)
                .put(save_rules_handler::<R, C>)
                .delete(reset_rules_handler::<R, C>),
        )
        .route(
            "/api/v1/rules/:marketplace/categories",
            get(categories_handler::<R, C>),
        )
        .route(
            "/api/v1/calculations",
            get(list_calculations_handler::<R, C>).post(save_calculation_handler::<R, C>),
        )
        .route(
            "/api/v1/calculations/:id",
            get(calculation_handler::<R, C>).delete(delete_calculation_handler::<R, C>),
        )
        .with_state(service)
}

fn error_response(error: PricingServiceError) -> Response {
    let status = match &error {
        PricingServiceError::CalculationNotFound(_) => StatusCode::NOT_FOUND,
        PricingServiceError::Store(StoreError::EmptyName) => StatusCode::UNPROCESSABLE_ENTITY,
        PricingServiceError::Store(StoreError::InvalidRules(validation)) => {
            let payload = json!({
                "error": validation.to_string(),
                "issues": validation.issues,
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
        }
        PricingServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn quote_handler<R, C>(
    State(service): State<Arc<PricingService<R, C>>>,
    Json(request): Json<QuoteRequest>,
) -> Response
where
    R: RuleStore + 'static,
    C: CalculationRepository + 'static,
{
    let marketplace = request.input.marketplace;
    let (quote, categories) =
        match service.quote_with_categories(&request.input, &request.overrides) {
            Ok(snapshot) => snapshot,
            Err(error) => return error_response(error),
        };

    let body = QuoteResponse {
        marketplace,
        quote,
        categories,
    };
    (StatusCode::OK, Json(body)).into_response()
}

pub(crate) async fn compare_handler<R, C>(
    State(service): State<Arc<PricingService<R, C>>>,
    Json(input): Json<CalculationInput>,
) -> Response
where
    R: RuleStore + 'static,
    C: CalculationRepository + 'static,
{
    match service.compare(&input) {
        Ok(quotes) => (StatusCode::OK, Json(quotes)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn rules_handler<R, C>(
    State(service): State<Arc<PricingService<R, C>>>,
) -> Response
where
    R: RuleStore + 'static,
    C: CalculationRepository + 'static,
{
    match service.rules() {
        Ok(rules) => (StatusCode::OK, Json(rules)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_rules_handler<R, C>(
    State(service): State<Arc<PricingService<R, C>>>,
    Json(rules): Json<MarketplaceRules>,
) -> Response
where
    R: RuleStore + 'static,
    C: CalculationRepository + 'static,
{
    match service.save_rules(&rules) {
        Ok(()) => (StatusCode::OK, Json(rules)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn reset_rules_handler<R, C>(
    State(service): State<Arc<PricingService<R, C>>>,
) -> Response
where
    R: RuleStore + 'static,
    C: CalculationRepository + 'static,
{
    match service.reset_rules() {
        Ok(rules) => (StatusCode::OK, Json(rules)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn categories_handler<R, C>(
    State(service): State<Arc<PricingService<R, C>>>,
    Path(marketplace): Path<String>,
) -> Response
where
    R: RuleStore + 'static,
    C: CalculationRepository + 'static,
{
    let marketplace = match marketplace.parse::<Marketplace>() {
        Ok(marketplace) => marketplace,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::NOT_FOUND, Json(payload)).into_response();
        }
    };

    match service.categories(marketplace) {
        Ok(categories) => {
            let payload = json!({
                "marketplace": marketplace,
                "categories": categories,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_calculations_handler<R, C>(
    State(service): State<Arc<PricingService<R, C>>>,
) -> Response
where
    R: RuleStore + 'static,
    C: CalculationRepository + 'static,
{
    match service.calculations() {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_calculation_handler<R, C>(
    State(service): State<Arc<PricingService<R, C>>>,
    Json(request): Json<SaveCalculationRequest>,
) -> Response
where
    R: RuleStore + 'static,
    C: CalculationRepository + 'static,
{
    match service.save_calculation(&request.name, request.input) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn calculation_handler<R, C>(
    State(service): State<Arc<PricingService<R, C>>>,
    Path(id): Path<String>,
) -> Response
where
    R: RuleStore + 'static,
    C: CalculationRepository + 'static,
{
    match service.calculation(&CalculationId(id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_calculation_handler<R, C>(
    State(service): State<Arc<PricingService<R, C>>>,
    Path(id): Path<String>,
) -> Response
where
    R: RuleStore + 'static,
    C: CalculationRepository + 'static,
{
    match service.delete_calculation(&CalculationId(id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryCalculationRepository, InMemoryRuleStore};
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    type MemoryService = PricingService<InMemoryRuleStore, InMemoryCalculationRepository>;

    fn service() -> Arc<MemoryService> {
        Arc::new(PricingService::new(
            Arc::new(InMemoryRuleStore::default()),
            Arc::new(InMemoryCalculationRepository::default()),
        ))
    }

    async fn read_json_body(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    #[tokio::test]
    async fn quote_route_returns_result_and_default_fees() {
        let router = pricing_router(service());
        let request = json_request(
            "POST",
            "/api/v1/quote",
            json!({
                "input": { "sellingPrice": "29", "marketplace": "Mercado Livre" },
                "overrides": { "commissionRate": null, "fixedFee": null }
            }),
        );

        let response = router.oneshot(request).await.expect("router responds");
        assert_eq!(response.status(), StatusCode::OK);

        let body = read_json_body(response).await;
        assert_eq!(body["marketplace"], "Mercado Livre");
        let fee = body["result"]["marketplaceFee"].as_f64().expect("fee");
        assert!((fee - 9.73).abs() < 1e-9);
        assert_eq!(body["defaultFees"]["fixedFee"], 6.25);
        assert_eq!(body["defaultFees"]["source"], "schedule");
        assert!(body.get("categories").is_none());
    }

    #[tokio::test]
    async fn quote_handler_lists_categories_for_amazon() {
        let request = QuoteRequest {
            input: CalculationInput {
                selling_price: "80".to_string(),
                marketplace: Marketplace::Amazon,
                ..CalculationInput::default()
            },
            overrides: FeeOverrides::none(),
        };

        let response = quote_handler::<InMemoryRuleStore, InMemoryCalculationRepository>(
            State(service()),
            Json(request),
        )
        .await;

        let body = read_json_body(response).await;
        let categories = body["categories"].as_array().expect("categories listed");
        assert!(categories.iter().any(|c| c == "Comidas e Bebidas"));
    }

    struct UnavailableRules;

    impl RuleStore for UnavailableRules {
        fn load(&self) -> Result<MarketplaceRules, StoreError> {
            Err(StoreError::Unavailable("rules offline".to_string()))
        }

        fn save(&self, _rules: &MarketplaceRules) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("rules offline".to_string()))
        }

        fn reset(&self) -> Result<MarketplaceRules, StoreError> {
            Err(StoreError::Unavailable("rules offline".to_string()))
        }
    }

    #[tokio::test]
    async fn quote_surfaces_rule_store_failures() {
        let service = Arc::new(PricingService::new(
            Arc::new(UnavailableRules),
            Arc::new(InMemoryCalculationRepository::default()),
        ));
        let request = QuoteRequest {
            input: CalculationInput {
                selling_price: "80".to_string(),
                marketplace: Marketplace::B2w,
                ..CalculationInput::default()
            },
            overrides: FeeOverrides::none(),
        };

        let response = quote_handler(State(service), Json(request)).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = read_json_body(response).await;
        assert!(body["error"].as_str().expect("message").contains("rules offline"));
    }

    #[tokio::test]
    async fn invalid_rules_are_unprocessable_with_issues() {
        let mut rules = serde_json::to_value(MarketplaceRules::default()).expect("encodes");
        rules["Magalu"]["commissionRate"] = json!(1.5);

        let response = pricing_router(service())
            .oneshot(json_request("PUT", "/api/v1/rules", rules))
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = read_json_body(response).await;
        assert_eq!(body["issues"][0]["marketplace"], "Magalu");
    }

    #[tokio::test]
    async fn unknown_marketplace_categories_are_not_found() {
        let response = pricing_router(service())
            .oneshot(
                Request::get("/api/v1/rules/ebay/categories")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn calculations_can_be_saved_and_deleted() {
        let service = service();
        let response = pricing_router(service.clone())
            .oneshot(json_request(
                "POST",
                "/api/v1/calculations",
                json!({ "name": "Garrafa Térmica", "input": { "sellingPrice": "59.9" } }),
            ))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::CREATED);
        let saved = read_json_body(response).await;
        let id = saved["id"].as_str().expect("id assigned").to_string();

        let response = pricing_router(service.clone())
            .oneshot(
                Request::delete(format!("/api/v1/calculations/{id}"))
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(service.calculations().expect("lists").is_empty());
    }

    #[tokio::test]
    async fn blank_calculation_name_is_unprocessable() {
        let response = pricing_router(service())
            .oneshot(json_request(
                "POST",
                "/api/v1/calculations",
                json!({ "name": " ", "input": {} }),
            ))
            .await
            .expect("router responds");
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
