//! User repository implementation with soft delete support.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{NewUser, User};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Query methods only see active rows (`is_deleted = false`).
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find active user by username
    async fn find_active_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// List active users, first name descending
    async fn list_active(&self) -> AppResult<Vec<User>>;

    /// List active users holding a role (case-insensitive)
    async fn list_by_role(&self, role: &str) -> AppResult<Vec<User>>;

    /// Insert a new enabled user with an already hashed password
    async fn create(&self, new_user: NewUser, password_hash: String) -> AppResult<User>;

    /// Persist every column of an existing user
    async fn save(&self, user: User) -> AppResult<User>;

    /// Permanently delete user from database (hard delete)
    async fn hard_delete(&self, id: i64) -> AppResult<()>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_active_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::UserName.eq(username))
            .filter(user::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?;

        Ok(result.map(User::from))
    }

    async fn list_active(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(user::Column::IsDeleted.eq(false))
            .order_by_desc(user::Column::FirstName)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn list_by_role(&self, role: &str) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col((UserEntity, user::Column::Role))))
                    .eq(role.to_lowercase()),
            )
            .filter(user::Column::IsDeleted.eq(false))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn create(&self, new_user: NewUser, password_hash: String) -> AppResult<User> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            user_name: Set(new_user.username),
            password_hash: Set(password_hash),
            phone: Set(new_user.phone),
            enabled: Set(true),
            is_deleted: Set(false),
            role: Set(new_user.role.to_string()),
            gender: Set(new_user.gender.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let model = active_model.insert(&self.db).await?;
        Ok(User::from(model))
    }

    async fn save(&self, user: User) -> AppResult<User> {
        let model = ActiveModel::from(user).update(&self.db).await?;
        Ok(User::from(model))
    }

    async fn hard_delete(&self, id: i64) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("User"));
        }

        Ok(())
    }
}
