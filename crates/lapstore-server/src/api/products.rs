//! Product catalog handlers.
//!
//! Reads are public. Writes take `multipart/form-data`: one `product` part
//! holding the JSON fields and any number of `images` file parts, appended to
//! the gallery in the order sent.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use lapstore_admin::EditSession;
use lapstore_core::{
    Availability, Condition, DetailedSpecs, FormAction, FreeGift, GalleryImage, ImageFile,
    LaptopCondition, Product, ProductType,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_catalog_error, normalize_limit, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ProductQuery {
    #[serde(rename = "type")]
    pub product_type: Option<ProductType>,
    pub featured: Option<bool>,
    pub limit: Option<i64>,
}

/// JSON body of the `product` multipart part.
#[derive(Debug, Deserialize)]
pub(super) struct ProductInput {
    pub name: String,
    pub specs: String,
    pub price: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    #[serde(default)]
    pub original_price: Option<String>,
    #[serde(default)]
    pub discount: Option<Decimal>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub condition: Option<Condition>,
    #[serde(default)]
    pub warranty: Option<String>,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub detailed_specs: Option<DetailedSpecs>,
    #[serde(default)]
    pub laptop_condition: Option<LaptopCondition>,
    #[serde(default)]
    pub free_gifts: Vec<FreeGift>,
    /// Stored image URLs to keep on update. Absent keeps them all.
    #[serde(default)]
    pub images: Option<Vec<String>>,
    /// Position of the primary image in the final gallery.
    #[serde(default)]
    pub primary_index: Option<usize>,
}

struct ProductUpload {
    input: ProductInput,
    files: Vec<ImageFile>,
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ApiResponse<Vec<Product>>>, ApiError> {
    let products = state
        .catalog
        .list_products()
        .await
        .map_err(|e| map_catalog_error(req_id.0.clone(), &e))?;

    let data = products
        .into_iter()
        .filter(|p| match query.product_type {
            Some(ty) => p.product_type() == ty,
            None => true,
        })
        .filter(|p| match query.featured {
            Some(featured) => p.fields.featured == featured,
            None => true,
        })
        .take(normalize_limit(query.limit))
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let product = state
        .catalog
        .get_product(id)
        .await
        .map_err(|e| map_catalog_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: product,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), ApiError> {
    let upload = read_upload(&req_id.0, multipart).await?;
    let mut session = state.catalog.create_session();
    let product = submit(&req_id.0, &state, &mut session, upload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: product,
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn update_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let upload = read_upload(&req_id.0, multipart).await?;
    let mut session = state
        .catalog
        .edit_session(id)
        .await
        .map_err(|e| map_catalog_error(req_id.0.clone(), &e))?;
    let product = submit(&req_id.0, &state, &mut session, upload).await?;

    Ok(Json(ApiResponse {
        data: product,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn delete_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .catalog
        .delete_product(id)
        .await
        .map_err(|e| map_catalog_error(req_id.0, &e))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn submit(
    req_id: &str,
    state: &AppState,
    session: &mut EditSession,
    upload: ProductUpload,
) -> Result<Product, ApiError> {
    let ProductUpload { input, files } = upload;
    let primary_index = input.primary_index;

    if let Some(keep) = &input.images {
        let dropped: Vec<usize> = session
            .form()
            .gallery()
            .entries()
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| match entry {
                GalleryImage::Stored(url) if !keep.contains(url) => Some(i),
                _ => None,
            })
            .collect();
        for index in dropped.into_iter().rev() {
            session.dispatch(FormAction::RemoveImage(index));
        }
    }

    let existing_gifts: Vec<String> = session
        .form()
        .free_gifts()
        .iter()
        .map(|g| g.id.clone())
        .collect();
    for id in existing_gifts {
        session.dispatch(FormAction::RemoveGift(id));
    }

    for action in input_actions(input) {
        session.dispatch(action);
    }
    if !files.is_empty() {
        session.dispatch(FormAction::AddImages(files));
    }
    if let Some(index) = primary_index {
        session.dispatch(FormAction::SetPrimaryImage(index));
    }

    let rejections = session.form().image_errors();
    if !rejections.is_empty() {
        let message = rejections
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        let details = serde_json::to_value(rejections).unwrap_or_default();
        return Err(ApiError::new(req_id, "image_rejected", message).with_details(details));
    }

    session
        .submit(&state.catalog)
        .await
        .map_err(|e| map_catalog_error(req_id.to_owned(), &e))
}

/// Form actions that set every field to the value in `input`.
fn input_actions(input: ProductInput) -> Vec<FormAction> {
    let mut actions = vec![
        FormAction::SetType(input.product_type),
        FormAction::SetName(input.name),
        FormAction::SetSpecs(input.specs),
        FormAction::SetPrice(input.price),
        FormAction::SetOriginalPrice(input.original_price.unwrap_or_default()),
        FormAction::SetDiscount(input.discount.map(|d| d.to_string()).unwrap_or_default()),
        FormAction::SetCategory(input.category.unwrap_or_default()),
        FormAction::SetCondition(input.condition),
        FormAction::SetWarranty(input.warranty.unwrap_or_default()),
        FormAction::SetAvailability(input.availability),
        FormAction::SetFeatured(input.featured),
        FormAction::SetDetailedSpecs(input.detailed_specs.unwrap_or_default()),
    ];

    match input.laptop_condition {
        Some(condition) => {
            actions.push(FormAction::SetOverallCondition(condition.overall));
            actions.push(FormAction::SetConditionDetails(condition.details));
        }
        None => actions.push(FormAction::ClearLaptopCondition),
    }

    actions.extend(input.free_gifts.into_iter().map(FormAction::AddCustomGift));
    actions
}

async fn read_upload(req_id: &str, mut multipart: Multipart) -> Result<ProductUpload, ApiError> {
    let bad_request = |message: String| ApiError::new(req_id, "bad_request", message);

    let mut input = None;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("product") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("could not read product part: {e}")))?;
                let parsed: ProductInput = serde_json::from_slice(&bytes).map_err(|e| {
                    ApiError::new(req_id, "validation_error", format!("invalid product: {e}"))
                })?;
                input = Some(parsed);
            }
            Some("images") => {
                let file_name = field.file_name().unwrap_or("image").to_owned();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("could not read {file_name}: {e}")))?;
                // Browsers send an empty part when no file was chosen.
                if bytes.is_empty() {
                    continue;
                }
                files.push(ImageFile::new(file_name, content_type, bytes.to_vec()));
            }
            other => {
                tracing::debug!(field = ?other, "ignoring unknown multipart field");
            }
        }
    }

    let input = input.ok_or_else(|| bad_request("missing 'product' part".to_owned()))?;
    Ok(ProductUpload { input, files })
}
