//! Item API Handlers

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};

use crate::api::form::FormData;
use crate::core::ServerState;
use crate::db::models::{CategoryQuantity, Item, ItemCreate, ItemUpdate};
use crate::db::repository::ItemRepository;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, validate_amount, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResponse, AppResult, ok, ok_with_message};

fn validate_quantity(quantity: Option<i64>) -> AppResult<()> {
    if let Some(q) = quantity
        && q < 0
    {
        return Err(AppError::validation("quantity must not be negative"));
    }
    Ok(())
}

/// Store the uploaded image, if any, and return its URL
async fn store_image(state: &ServerState, form: &mut FormData) -> AppResult<Option<String>> {
    match form.take_image() {
        Some(file) => Ok(Some(
            state.images.save(file.file_name.as_deref(), file.data).await?,
        )),
        None => Ok(form.text("image")),
    }
}

/// GET /items - 获取所有商品
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<Item>>>> {
    let repo = ItemRepository::new(state.get_db());
    let items = repo.find_all().await?;
    Ok(ok(items))
}

/// GET /items/:id - 获取单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<Item>>> {
    let repo = ItemRepository::new(state.get_db());
    let item = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Item {} not found", id)))?;
    Ok(ok(item))
}

/// POST /items - 创建商品
pub async fn create(
    State(state): State<ServerState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<AppResponse<Item>>)> {
    let mut form = FormData::from_multipart(multipart).await?;

    let name = form.required("name")?;
    validate_required_text(&name, "name", MAX_NAME_LEN)?;
    let description = form.text("description");
    validate_optional_text(&description, "description", MAX_NOTE_LEN)?;
    let category = form.text("category");
    validate_optional_text(&category, "category", MAX_NAME_LEN)?;
    let price = form
        .parse::<f64>("price")?
        .ok_or_else(|| AppError::validation("price is required"))?;
    validate_amount(price, "price")?;
    let quantity = form.parse::<i64>("quantity")?;
    validate_quantity(quantity)?;

    let image = store_image(&state, &mut form).await?;

    let repo = ItemRepository::new(state.get_db());
    let item = repo
        .create(ItemCreate {
            name,
            description: description.unwrap_or_default(),
            price,
            category: category.unwrap_or_default(),
            quantity: quantity.unwrap_or(0),
            image,
        })
        .await?;

    tracing::info!(item = %item.name, "Item created");
    Ok((StatusCode::CREATED, ok_with_message(item, "Item created")))
}

/// PUT /items/:id - 更新商品 (仅更新表单中出现的字段)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> AppResult<Json<AppResponse<Item>>> {
    let mut form = FormData::from_multipart(multipart).await?;

    let changes = ItemUpdate {
        name: form.text("name"),
        description: form.text("description"),
        price: form.parse::<f64>("price")?,
        category: form.text("category"),
        quantity: form.parse::<i64>("quantity")?,
        image: store_image(&state, &mut form).await?,
    };

    if let Some(name) = &changes.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&changes.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&changes.category, "category", MAX_NAME_LEN)?;
    if let Some(price) = changes.price {
        validate_amount(price, "price")?;
    }
    validate_quantity(changes.quantity)?;
    if changes.is_empty() {
        return Err(AppError::validation("No fields to update"));
    }

    let repo = ItemRepository::new(state.get_db());
    let item = repo.update(&id, changes).await?;
    Ok(ok_with_message(item, "Item updated"))
}

/// DELETE /items/:id - 删除商品
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<AppResponse<String>>> {
    let repo = ItemRepository::new(state.get_db());
    repo.delete(&id).await?;
    tracing::info!(item_id = %id, "Item deleted");
    Ok(ok_with_message(id, "Item deleted"))
}

/// GET /items-by-category - 按分类汇总库存
pub async fn by_category(
    State(state): State<ServerState>,
) -> AppResult<Json<AppResponse<Vec<CategoryQuantity>>>> {
    let repo = ItemRepository::new(state.get_db());
    Ok(ok(repo.quantity_by_category().await?))
}
