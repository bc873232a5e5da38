use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{
        CreateOrderRequest, OrderCreatedResponse, OrderDetailResponse, OrderSummaryResponse,
    },
    error::{AppError, AppResult, ErrorBody},
    middleware::{auth::AuthUser, json::AppJson},
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/my", get(my_orders))
        .route("/{id}", get(get_order))
}

#[utoipa::path(
    post,
    path = "/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order placed", body = OrderCreatedResponse),
        (status = 400, description = "Empty cart, invalid product or payment details", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(payload): AppJson<CreateOrderRequest>,
) -> AppResult<Json<OrderCreatedResponse>> {
    let order = order_service::place_order(
        &state,
        user.user_id,
        &payload.cart_lines(),
        &payload.payment_input(),
    )
    .await?;
    Ok(Json(OrderCreatedResponse::from(&order)))
}

#[utoipa::path(
    get,
    path = "/orders/my",
    responses(
        (status = 200, description = "Current user's orders, newest first", body = Vec<OrderSummaryResponse>),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn my_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<OrderSummaryResponse>>> {
    let orders = order_service::list_orders(&state, user.user_id).await?;
    Ok(Json(orders.into_iter().map(OrderSummaryResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with its lines", body = OrderDetailResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderDetailResponse>> {
    // A malformed id cannot name an order the caller owns.
    let id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound)?;
    let order = order_service::get_order(&state, user.user_id, id).await?;
    Ok(Json(OrderDetailResponse::from(&order)))
}
