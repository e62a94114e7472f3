//! OpenAPI document aggregating every REST endpoint.

use utoipa::OpenApi;

use crate::inbound::http::{auth, health, messages, orders, products, schemas};

/// Public OpenAPI surface used by Swagger UI and tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Sakura Carts API",
        description = "Storefront REST API: catalogue, orders, messaging."
    ),
    paths(
        auth::login,
        auth::logout,
        auth::me,
        products::list_products,
        products::list_categories,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        orders::place_order,
        orders::list_orders,
        orders::my_orders,
        orders::export_orders,
        orders::get_order,
        orders::update_order_status,
        orders::toggle_order_archive,
        orders::update_order_shipping,
        orders::delete_order,
        messages::submit_message,
        messages::list_messages,
        messages::unread_count,
        messages::my_messages,
        messages::toggle_read,
        messages::update_message_status,
        messages::toggle_message_archive,
        messages::admin_reply,
        messages::user_reply,
        messages::delete_message,
        messages::delete_my_message,
        health::ready,
        health::live,
    ),
    components(schemas(
        schemas::ErrorSchema,
        schemas::ErrorCodeSchema,
        auth::LoginRequestBody,
        auth::AccountBody,
        products::ProductBody,
        products::ProductPageBody,
        products::CreateProductBody,
        products::UpdateProductBody,
        orders::CartLineBody,
        orders::ShippingInfoBody,
        orders::CreateOrderBody,
        orders::LineItemBody,
        orders::OrderBody,
        orders::OrderPageBody,
        orders::UpdateStatusBody,
        orders::UpdateShippingBody,
        messages::SubmitMessageBody,
        messages::ReplyBody,
        messages::MessageBody,
        messages::ReplyRequestBody,
        messages::UpdateMessageStatusBody,
        messages::UnreadCountBody,
    )),
    tags(
        (name = "auth", description = "Login and session identity"),
        (name = "products", description = "Catalogue browsing and administration"),
        (name = "orders", description = "Checkout, fulfilment and export"),
        (name = "messages", description = "Contact, request and order threads"),
        (name = "health", description = "Probes")
    )
)]
pub struct ApiDoc;
