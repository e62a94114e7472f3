//! Product catalogue handlers.
//!
//! ```text
//! GET    /api/v1/products
//! GET    /api/v1/products/categories
//! GET    /api/v1/products/{id}
//! POST   /api/v1/products            (admin)
//! PUT    /api/v1/products/{id}       (admin)
//! DELETE /api/v1/products/{id}       (admin)
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::{PageEnvelope, PageRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::catalog::{Category, Product, ProductDraft, ProductUpdate};
use crate::domain::ports::{ProductPageFilter, ProductPageRequest, ProductSort};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_amount, parse_category, parse_uuid};

/// Default shop page size.
const DEFAULT_PER_PAGE: u32 = 12;

/// Query parameters accepted by the catalogue listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
    /// Restrict to one category (wire form, e.g. `Beverages`).
    pub category: Option<String>,
    /// Case-insensitive name substring.
    pub search: Option<String>,
    /// Only featured products when true.
    pub featured: Option<bool>,
    /// `newest`, `price_asc`, `price_desc` or `name`.
    pub sort: Option<String>,
    /// 1-based page.
    pub page: Option<u32>,
    /// Page size, up to 100.
    pub per_page: Option<u32>,
}

/// One product on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductBody {
    /// Stable identifier.
    #[schema(format = "uuid")]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Marketing description.
    pub description: String,
    /// Unit price in minor units (cents).
    pub price_cents: i64,
    /// File-store reference for the image.
    pub image: String,
    /// Shop category (display form).
    pub category: String,
    /// Units available for sale.
    pub stock: i32,
    /// Whether the product is featured.
    pub featured: bool,
    /// Creation timestamp.
    #[schema(format = "date-time")]
    pub created_at: String,
    /// Last modification timestamp.
    #[schema(format = "date-time")]
    pub updated_at: String,
}

impl From<Product> for ProductBody {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name,
            description: product.description,
            price_cents: product.price.cents(),
            image: product.image,
            category: product.category.as_str().to_owned(),
            stock: product.stock,
            featured: product.featured,
            created_at: product.created_at.to_rfc3339(),
            updated_at: product.updated_at.to_rfc3339(),
        }
    }
}

/// One page of products.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPageBody {
    /// Products on this page.
    pub items: Vec<ProductBody>,
    /// 1-based page index.
    pub page: u32,
    /// Total page count.
    pub pages: u64,
    /// Total matching products.
    pub total: u64,
}

impl From<PageEnvelope<Product>> for ProductPageBody {
    fn from(envelope: PageEnvelope<Product>) -> Self {
        let envelope = envelope.map(ProductBody::from);
        Self {
            items: envelope.items,
            page: envelope.page,
            pages: envelope.pages,
            total: envelope.total,
        }
    }
}

/// Request body for creating a product.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductBody {
    /// Display name.
    pub name: String,
    /// Marketing description.
    pub description: String,
    /// Unit price in minor units (cents).
    pub price_cents: i64,
    /// File-store reference for the image.
    pub image: String,
    /// Shop category (display form).
    pub category: String,
    /// Initial stock level.
    pub stock: i32,
    /// Featured flag.
    #[serde(default)]
    pub featured: bool,
}

/// Request body for a partial product update.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductBody {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement price in cents.
    pub price_cents: Option<i64>,
    /// Replacement image reference.
    pub image: Option<String>,
    /// Replacement category.
    pub category: Option<String>,
    /// Replacement stock level.
    pub stock: Option<i32>,
    /// Replacement featured flag.
    pub featured: Option<bool>,
}

fn parse_sort(raw: Option<&str>) -> Result<ProductSort, Error> {
    match raw {
        None | Some("newest") => Ok(ProductSort::Newest),
        Some("price_asc") => Ok(ProductSort::PriceAsc),
        Some("price_desc") => Ok(ProductSort::PriceDesc),
        Some("name") => Ok(ProductSort::Name),
        Some(other) => Err(Error::invalid_request(
            "sort must be one of: newest, price_asc, price_desc, name",
        )
        .with_details(json!({ "field": "sort", "value": other, "code": "invalid_enum" }))),
    }
}

fn parse_page(page: Option<u32>, per_page: Option<u32>, default: u32) -> Result<PageRequest, Error> {
    PageRequest::from_query(page, per_page, default).map_err(|window_error| {
        Error::invalid_request(window_error.to_string())
            .with_details(json!({ "field": "page", "code": "invalid_page" }))
    })
}

/// Browse the catalogue.
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(
        ("category" = Option<String>, Query, description = "Restrict to one category"),
        ("search" = Option<String>, Query, description = "Name substring filter"),
        ("featured" = Option<bool>, Query, description = "Only featured products"),
        ("sort" = Option<String>, Query, description = "newest, price_asc, price_desc or name"),
        ("page" = Option<u32>, Query, description = "1-based page"),
        ("perPage" = Option<u32>, Query, description = "Page size, up to 100")
    ),
    responses(
        (status = 200, description = "One catalogue page", body = ProductPageBody),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "listProducts",
    security([])
)]
#[get("/products")]
pub async fn list_products(
    state: web::Data<HttpState>,
    query: web::Query<ProductListQuery>,
) -> ApiResult<web::Json<ProductPageBody>> {
    let query = query.into_inner();
    let category = query
        .category
        .as_deref()
        .map(|raw| parse_category(raw, FieldName::new("category")))
        .transpose()?;
    let filter = ProductPageFilter {
        category,
        search: query.search.clone(),
        featured_only: query.featured.unwrap_or(false),
        sort: parse_sort(query.sort.as_deref())?,
    };
    let page = parse_page(query.page, query.per_page, DEFAULT_PER_PAGE)?;
    let envelope = state
        .catalog
        .list_products(&ProductPageRequest { filter, page })
        .await?;
    Ok(web::Json(ProductPageBody::from(envelope)))
}

/// The fixed category list, in display order.
#[utoipa::path(
    get,
    path = "/api/v1/products/categories",
    responses(
        (status = 200, description = "Category names", body = [String])
    ),
    tags = ["products"],
    operation_id = "listCategories",
    security([])
)]
#[get("/products/categories")]
pub async fn list_categories() -> web::Json<Vec<&'static str>> {
    web::Json(Category::ALL.iter().map(|category| category.as_str()).collect())
}

/// Fetch one product.
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 200, description = "The product", body = ProductBody),
        (status = 400, description = "Invalid id", body = ErrorSchema),
        (status = 404, description = "Unknown product", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "getProduct",
    security([])
)]
#[get("/products/{id}")]
pub async fn get_product(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProductBody>> {
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let product = state.catalog.get_product(&id).await?;
    Ok(web::Json(ProductBody::from(product)))
}

/// Create a product (admin).
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductBody,
    responses(
        (status = 201, description = "Product created", body = ProductBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "createProduct"
)]
#[post("/products")]
pub async fn create_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateProductBody>,
) -> ApiResult<HttpResponse> {
    state.require_admin(&session).await?;
    let body = payload.into_inner();
    let draft = ProductDraft::new(
        &body.name,
        &body.description,
        parse_amount(body.price_cents, FieldName::new("priceCents"))?,
        &body.image,
        parse_category(&body.category, FieldName::new("category"))?,
        body.stock,
        body.featured,
    )
    .map_err(|invalid| Error::invalid_request(invalid.to_string()))?;
    let product = state.catalog_admin.create_product(draft).await?;
    Ok(HttpResponse::Created().json(ProductBody::from(product)))
}

/// Partially update a product (admin).
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    request_body = UpdateProductBody,
    responses(
        (status = 200, description = "Product updated", body = ProductBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown product", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "updateProduct"
)]
#[put("/products/{id}")]
pub async fn update_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateProductBody>,
) -> ApiResult<web::Json<ProductBody>> {
    state.require_admin(&session).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    let body = payload.into_inner();
    let update = ProductUpdate {
        name: body.name,
        description: body.description,
        price: body
            .price_cents
            .map(|cents| parse_amount(cents, FieldName::new("priceCents")))
            .transpose()?,
        image: body.image,
        category: body
            .category
            .as_deref()
            .map(|raw| parse_category(raw, FieldName::new("category")))
            .transpose()?,
        stock: body.stock,
        featured: body.featured,
    };
    let product = state.catalog_admin.update_product(&id, update).await?;
    Ok(web::Json(ProductBody::from(product)))
}

/// Delete a product and its stored image (admin).
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = String, Path, description = "Product id")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Unknown product", body = ErrorSchema)
    ),
    tags = ["products"],
    operation_id = "deleteProduct"
)]
#[delete("/products/{id}")]
pub async fn delete_product(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    state.require_admin(&session).await?;
    let id = parse_uuid(&path.into_inner(), FieldName::new("id"))?;
    state.catalog_admin.delete_product(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}
