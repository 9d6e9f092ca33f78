//! Admin Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Admin, AuthType};
use crate::utils::time::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "admins";

#[derive(Clone)]
pub struct AdminRepository {
    base: BaseRepository,
}

impl AdminRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find admin by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Admin>> {
        let thing = parse_record_id(TABLE, id)?;
        let admin: Option<Admin> = self.base.db().select(thing).await?;
        Ok(admin)
    }

    /// Find admin by email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<Admin>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM admins WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?;
        let admins: Vec<Admin> = result.take(0)?;
        Ok(admins.into_iter().next())
    }

    /// Login lookup: the identifier is matched against name first, then email
    pub async fn find_by_login(&self, identifier: &str) -> RepoResult<Option<Admin>> {
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM admins WHERE name = $identifier OR email = $identifier \
                 ORDER BY createdAt LIMIT 1",
            )
            .bind(("identifier", identifier.to_string()))
            .await?;
        let admins: Vec<Admin> = result.take(0)?;
        Ok(admins.into_iter().next())
    }

    /// Create a new admin with an already hashed password
    pub async fn create(&self, name: String, email: String, hash_pass: String) -> RepoResult<Admin> {
        if self.find_by_email(&email).await?.is_some() {
            return Err(RepoError::Duplicate(format!("Admin '{}' already exists", email)));
        }

        let mut result = self
            .base
            .db()
            .query(
                r#"CREATE admins SET
                    name = $name,
                    email = $email,
                    hashPass = $hash_pass,
                    authType = $auth_type,
                    createdAt = $now
                RETURN AFTER"#,
            )
            .bind(("name", name))
            .bind(("email", email))
            .bind(("hash_pass", hash_pass))
            .bind(("auth_type", AuthType::Local))
            .bind(("now", now_millis()))
            .await?;

        let created: Option<Admin> = result.take(0)?;
        created.ok_or_else(|| RepoError::Database("Failed to create admin".to_string()))
    }
}
