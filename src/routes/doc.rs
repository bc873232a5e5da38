use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{LoginRequest, LoginResponse, MeResponse, PublicUser, RegisterRequest, RegisterResponse},
        orders::{
            CreateOrderRequest, OrderCreatedResponse, OrderDetailResponse, OrderItemRequest,
            OrderLineResponse, OrderSummaryResponse,
        },
    },
    error::ErrorBody,
    models::{PaymentMethod, Role},
    routes::{auth, health, orders},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::me,
        orders::create_order,
        orders::my_orders,
        orders::get_order
    ),
    components(
        schemas(
            Role,
            PaymentMethod,
            ErrorBody,
            RegisterRequest,
            RegisterResponse,
            LoginRequest,
            LoginResponse,
            PublicUser,
            MeResponse,
            OrderItemRequest,
            CreateOrderRequest,
            OrderCreatedResponse,
            OrderSummaryResponse,
            OrderLineResponse,
            OrderDetailResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and token introspection"),
        (name = "Orders", description = "Order placement and history"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
