//! Order handlers.
//!
//! ```text
//! POST   /api/v1/orders
//! GET    /api/v1/orders              (admin)
//! GET    /api/v1/orders/my-orders
//! GET    /api/v1/orders/export      (admin)
//! GET    /api/v1/orders/{id}
//! PATCH  /api/v1/orders/{id}/status  (admin)
//! PATCH  /api/v1/orders/{id}/archive (admin)
//! PUT    /api/v1/orders/{id}         (admin)
//! DELETE /api/v1/orders/{id}         (admin)
//! ```
//!
//! `export` and `my-orders` are registered before `{id}` so the literal
//! segments are not swallowed by the id matcher.

use actix_web::http::header;
use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use pagination::{PageEnvelope, PageRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::order::{
    CartLine, LineItem, Order, ShippingInfo, ShippingInfoUpdate,
};
use crate::domain::ports::{OrderPageFilter, PlaceOrderRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_order_status, parse_uuid};

/// Default admin listing page size.
const DEFAULT_PER_PAGE: u32 = 20;

/// One cart line in a checkout request.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLineBody {
    /// Product to purchase.
    #[schema(format = "uuid")]
    pub product_id: String,
    /// Units requested.
    pub quantity: u32,
}

/// Shipping details in a checkout request.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfoBody {
    /// Recipient full name.
    pub full_name: String,
    /// Contact email for carrier updates.
    pub email: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Postal code.
    pub postal_code: String,
    /// Country.
    pub country: String,
}

impl From<ShippingInfoBody> for ShippingInfo {
    fn from(body: ShippingInfoBody) -> Self {
        Self {
            full_name: body.full_name,
            email: body.email,
            address: body.address,
            city: body.city,
            postal_code: body.postal_code,
            country: body.country,
        }
    }
}

impl From<ShippingInfo> for ShippingInfoBody {
    fn from(info: ShippingInfo) -> Self {
        Self {
            full_name: info.full_name,
            email: info.email,
            address: info.address,
            city: info.city,
            postal_code: info.postal_code,
            country: info.country,
        }
    }
}

/// Checkout request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderBody {
    /// Cart lines; duplicates are processed independently.
    pub items: Vec<CartLineBody>,
    /// Destination details.
    pub shipping_info: ShippingInfoBody,
}

/// One priced line item on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItemBody {
    /// Product this line was priced from.
    #[schema(format = "uuid")]
    pub product_id: String,
    /// Product name at placement time.
    pub name: String,
    /// Unit price in minor units (cents) at placement time.
    pub price_cents: i64,
    /// Units purchased.
    pub quantity: u32,
    /// Product image reference at placement time.
    pub image: String,
}

impl From<LineItem> for LineItemBody {
    fn from(item: LineItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            name: item.name,
            price_cents: item.price.cents(),
            quantity: item.quantity,
            image: item.image,
        }
    }
}

/// One order on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderBody {
    /// Stable identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// Account that placed the order.
    #[schema(format = "uuid")]
    pub account_id: String,
    /// Priced line items.
    pub items: Vec<LineItemBody>,
    /// Destination details.
    pub shipping_info: ShippingInfoBody,
    /// Exact total in minor units (cents), fixed at creation.
    pub total_amount_cents: i64,
    /// Fulfilment status.
    pub status: String,
    /// Hidden from default admin listings when true.
    pub archived: bool,
    /// Placement timestamp.
    #[schema(format = "date-time")]
    pub created_at: String,
}

impl From<Order> for OrderBody {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            account_id: order.account_id.to_string(),
            items: order.items.into_iter().map(LineItemBody::from).collect(),
            shipping_info: ShippingInfoBody::from(order.shipping_info),
            total_amount_cents: order.total_amount.cents(),
            status: order.status.as_str().to_owned(),
            archived: order.archived,
            created_at: order.created_at.to_rfc3339(),
        }
    }
}

/// One page of orders.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderPageBody {
    /// Orders on this page, newest first.
    pub items: Vec<OrderBody>,
    /// 1-based page index.
    pub page: u32,
    /// Total page count.
    pub pages: u64,
    /// Total matching orders.
    pub total: u64,
}

impl From<PageEnvelope<Order>> for OrderPageBody {
    fn from(envelope: PageEnvelope<Order>) -> Self {
        let envelope = envelope.map(OrderBody::from);
        Self {
            items: envelope.items,
            page: envelope.page,
            pages: envelope.pages,
            total: envelope.total,
        }
    }
}

/// Query parameters accepted by the admin order listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
    /// Restrict to one status.
    pub status: Option<String>,
    /// List archived orders instead of live ones.
    pub archived: Option<bool>,
    /// 1-based page.
    pub page: Option<u32>,
    /// Page size, up to 100.
    pub per_page: Option<u32>,
}

/// Status transition request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateStatusBody {
    /// Target status: pending, processing, shipped, delivered or cancelled.
    pub status: String,
}

/// Partial shipping edit request body.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShippingBody {
    /// Replacement recipient name.
    pub full_name: Option<String>,
    /// Replacement contact email.
    pub email: Option<String>,
    /// Replacement street address.
    pub address: Option<String>,
    /// Replacement city.
    pub city: Option<String>,
    /// Replacement postal code.
    pub postal_code: Option<String>,
    /// Replacement country.
    pub country: Option<String>,
}

impl From<UpdateShippingBody> for ShippingInfoUpdate {
    fn from(body: UpdateShippingBody) -> Self {
        Self {
            full_name: body.full_name,
            email: body.email,
            address: body.address,
            city: body.city,
            postal_code: body.postal_code,
            country: body.country,
        }
    }
}

fn parse_cart(items: Vec<CartLineBody>) -> Result<Vec<CartLine>, Error> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, line)| {
            let product_id =
                parse_uuid(&line.product_id, FieldName::new("items.productId")).map_err(
                    |parse_error| {
                        parse_error.with_details(json!({
                            "field": "items",
                            "index": index,
                            "code": "invalid_uuid",
                        }))
                    },
                )?;
            Ok(CartLine {
                product_id,
                quantity: line.quantity,
            })
        })
        .collect()
}

fn parse_shipping(body: ShippingInfoBody) -> Result<ShippingInfo, Error> {
    ShippingInfo::from(body)
        .validated()
        .map_err(|invalid| {
            Error::invalid_request(invalid.to_string())
                .with_details(json!({ "field": "shippingInfo", "code": "missing_field" }))
        })
}

/// Place an order: the checkout workflow.
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    request_body = CreateOrderBody,
    responses(
        (status = 201, description = "Order placed", body = OrderBody),
        (status = 400, description = "Empty cart or insufficient stock", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown product", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "placeOrder"
)]
#[post("/orders")]
pub async fn place_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateOrderBody>,
) -> ApiResult<HttpResponse> {
    let account = state.require_user(&session).await?;
    let body = payload.into_inner();
    let lines = parse_cart(body.items)?;
    let shipping_info = parse_shipping(body.shipping_info)?;
    let order = state
        .orders
        .place_order(PlaceOrderRequest {
            account,
            lines,
            shipping_info,
        })
        .await?;
    Ok(HttpResponse::Created().json(OrderBody::from(order)))
}

/// List orders for the admin console.
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    params(
        ("status" = Option<String>, Query, description = "Restrict to one status"),
        ("archived" = Option<bool>, Query, description = "List archived orders (default false)"),
        ("page" = Option<u32>, Query, description = "1-based page"),
        ("perPage" = Option<u32>, Query, description = "Page size, up to 100")
    ),
    responses(
        (status = 200, description = "One order page", body = OrderPageBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "listOrders"
)]
#[get("/orders")]
pub async fn list_orders(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<OrderListQuery>,
) -> ApiResult<web::Json<OrderPageBody>> {
    state.require_admin(&session).await?;
    let query = query.into_inner();
    let filter = OrderPageFilter {
        status: query
            .status
            .as_deref()
            .map(|raw| parse_order_status(raw, FieldName::new("status")))
            .transpose()?,
        archived: query.archived.unwrap_or(false),
    };
    let page = PageRequest::from_query(query.page, query.per_page, DEFAULT_PER_PAGE)
        .map_err(|window_error| {
            Error::invalid_request(window_error.to_string())
                .with_details(json!({ "field": "page", "code": "invalid_page" }))
        })?;
    let envelope = state.orders_query.page(&filter, &page).await?;
    Ok(web::Json(OrderPageBody::from(envelope)))
}

/// The caller's own orders, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/orders/my-orders",
    responses(
        (status = 200, description = "The caller's orders", body = [OrderBody]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "listMyOrders"
)]
#[get("/orders/my-orders")]
pub async fn my_orders(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<OrderBody>>> {
    let account = state.require_user(&session).await?;
    let orders = state.orders_query.orders_for_account(&account).await?;
    Ok(web::Json(orders.into_iter().map(OrderBody::from).collect()))
}

/// Download every archived order as a JSON attachment.
#[utoipa::path(
    get,
    path = "/api/v1/orders/export",
    responses(
        (status = 200, description = "Archived orders as a JSON file", body = [OrderBody]),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "exportArchivedOrders"
)]
#[get("/orders/export")]
pub async fn export_orders(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    state.require_admin(&session).await?;
    let orders: Vec<OrderBody> = state
        .orders_query
        .export_archived()
        .await?
        .into_iter()
        .map(OrderBody::from)
        .collect();
    let body = serde_json::to_vec_pretty(&orders)
        .map_err(|serialise_error| Error::internal(serialise_error.to_string()))?;
    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .insert_header((
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"archived-orders.json\"",
        ))
        .body(body))
}

/// Fetch one order (owner or admin).
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "The order", body = OrderBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown order", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{id}")]
pub async fn get_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrderBody>> {
    let account = state.require_user(&session).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let order = state.orders_query.get_order(&id, &account).await?;
    Ok(web::Json(OrderBody::from(order)))
}

/// Transition an order's status (admin). A changed status appends the
/// canned reply to the order thread; a same-status call is a no-op.
#[utoipa::path(
    patch,
    path = "/api/v1/orders/{id}/status",
    params(("id" = String, Path, description = "Order id")),
    request_body = UpdateStatusBody,
    responses(
        (status = 200, description = "Order updated", body = OrderBody),
        (status = 400, description = "Invalid status", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown order", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "updateOrderStatus"
)]
#[patch("/orders/{id}/status")]
pub async fn update_order_status(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateStatusBody>,
) -> ApiResult<web::Json<OrderBody>> {
    state.require_admin(&session).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let status = parse_order_status(&payload.status, FieldName::new("status"))?;
    let order = state.orders.update_status(&id, status).await?;
    Ok(web::Json(OrderBody::from(order)))
}

/// Toggle an order's archived flag (admin).
#[utoipa::path(
    patch,
    path = "/api/v1/orders/{id}/archive",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order updated", body = OrderBody),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown order", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "toggleOrderArchive"
)]
#[patch("/orders/{id}/archive")]
pub async fn toggle_order_archive(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<OrderBody>> {
    state.require_admin(&session).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let order = state.orders.toggle_archive(&id).await?;
    Ok(web::Json(OrderBody::from(order)))
}

/// Merge a partial shipping edit into an order (admin).
#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    request_body = UpdateShippingBody,
    responses(
        (status = 200, description = "Order updated", body = OrderBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown order", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "updateOrderShipping"
)]
#[put("/orders/{id}")]
pub async fn update_order_shipping(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateShippingBody>,
) -> ApiResult<web::Json<OrderBody>> {
    state.require_admin(&session).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let order = state
        .orders
        .update_shipping(&id, ShippingInfoUpdate::from(payload.into_inner()))
        .await?;
    Ok(web::Json(OrderBody::from(order)))
}

/// Hard-delete an order (admin). Stock is not restored.
#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    params(("id" = String, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown order", body = ErrorSchema)
    ),
    tags = ["orders"],
    operation_id = "deleteOrder"
)]
#[delete("/orders/{id}")]
pub async fn delete_order(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.require_admin(&session).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    state.orders.delete_order(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}
