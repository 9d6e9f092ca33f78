//! Item Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{CategoryQuantity, Item, ItemCreate, ItemUpdate};
use crate::utils::time::now_millis;
use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "items";

/// MERGE document: the caller's changes plus the modification time
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemPatch {
    #[serde(flatten)]
    changes: ItemUpdate,
    updated_at: i64,
}

#[derive(Clone)]
pub struct ItemRepository {
    base: BaseRepository,
}

impl ItemRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all items
    pub async fn find_all(&self) -> RepoResult<Vec<Item>> {
        let items: Vec<Item> = self
            .base
            .db()
            .query("SELECT * FROM items ORDER BY category, name")
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Find item by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Item>> {
        let thing = parse_record_id(TABLE, id)?;
        let item: Option<Item> = self.base.db().select(thing).await?;
        Ok(item)
    }

    /// Create a new item
    pub async fn create(&self, data: ItemCreate) -> RepoResult<Item> {
        let now = now_millis();
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE items SET
                    name = $name,
                    description = $description,
                    price = $price,
                    category = $category,
                    quantity = $quantity,
                    image = $image,
                    createdAt = $now,
                    updatedAt = $now
                RETURN AFTER"#,
            )
            .bind(("name", data.name))
            .bind(("description", data.description))
            .bind(("price", data.price))
            .bind(("category", data.category))
            .bind(("quantity", data.quantity))
            .bind(("image", data.image))
            .bind(("now", now))
            .await?;

        let created: Option<Item> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create item".to_string()))
    }

    /// Update an item
    pub async fn update(&self, id: &str, data: ItemUpdate) -> RepoResult<Item> {
        let thing = parse_record_id(TABLE, id)?;
        let patch = ItemPatch {
            changes: data,
            updated_at: now_millis(),
        };

        let mut result = self
            .base
            .db()
            .query("UPDATE $thing MERGE $data RETURN AFTER")
            .bind(("thing", thing))
            .bind(("data", patch))
            .await?;

        result
            .take::<Option<Item>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Item {} not found", id)))
    }

    /// Hard delete an item
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let thing = parse_record_id(TABLE, id)?;
        let deleted: Option<Item> = self.base.db().delete(thing).await?;
        deleted
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(format!("Item {} not found", id)))
    }

    /// Total stock per category
    pub async fn quantity_by_category(&self) -> RepoResult<Vec<CategoryQuantity>> {
        let rows: Vec<CategoryQuantity> = self
            .base
            .db()
            .query(
                "SELECT category, math::sum(quantity) AS totalQuantity \
                 FROM items GROUP BY category ORDER BY category",
            )
            .await?
            .take(0)?;
        Ok(rows)
    }
}
