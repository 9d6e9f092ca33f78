//! User Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{AuthType, User};
use crate::utils::time::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "users";

/// Field values for a new customer account (password already hashed)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub hash_pass: Option<String>,
    pub auth_type: AuthType,
    pub image: Option<String>,
}

/// Field changes for a customer account (password already hashed)
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub hash_pass: Option<String>,
    pub auth_type: Option<AuthType>,
    pub image: Option<String>,
}

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM users ORDER BY createdAt DESC")
            .await?
            .take(0)?;
        Ok(users)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let thing = parse_record_id(TABLE, id)?;
        let user: Option<User> = self.base.db().select(thing).await?;
        Ok(user)
    }

    pub async fn create(&self, data: NewUser) -> RepoResult<User> {
        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE users SET
                    name = $name,
                    email = $email,
                    hashPass = $hash_pass,
                    authType = $auth_type,
                    image = $image,
                    createdAt = $now
                RETURN AFTER"#,
            )
            .bind(("name", data.name))
            .bind(("email", data.email))
            .bind(("hash_pass", data.hash_pass))
            .bind(("auth_type", data.auth_type))
            .bind(("image", data.image))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<User> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Update a user; absent fields keep their stored value
    pub async fn update(&self, id: &str, data: UserChanges) -> RepoResult<User> {
        let thing = parse_record_id(TABLE, id)?;

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    name = $name OR name,
                    email = $email OR email,
                    hashPass = $hash_pass OR hashPass,
                    authType = IF $has_auth_type THEN $auth_type ELSE authType END,
                    image = $image OR image
                RETURN AFTER"#,
            )
            .bind(("thing", thing))
            .bind(("name", data.name))
            .bind(("email", data.email))
            .bind(("hash_pass", data.hash_pass))
            .bind(("has_auth_type", data.auth_type.is_some()))
            .bind(("auth_type", data.auth_type))
            .bind(("image", data.image))
            .await?;

        result
            .take::<Option<User>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Hard delete a user
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let thing = parse_record_id(TABLE, id)?;
        let deleted: Option<User> = self.base.db().delete(thing).await?;
        deleted
            .map(|_| ())
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }
}
