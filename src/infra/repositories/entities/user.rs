//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Gender, Role, User};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub user_name: String,
    pub password_hash: String,
    pub phone: String,
    pub enabled: bool,
    pub is_deleted: bool,
    /// Role description, e.g. "Manager"
    pub role: String,
    pub gender: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for User {
    fn from(model: Model) -> Self {
        User {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            username: model.user_name,
            password_hash: model.password_hash,
            phone: model.phone,
            enabled: model.enabled,
            is_deleted: model.is_deleted,
            role: Role::from(model.role),
            gender: Gender::from(model.gender.as_str()),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Full-row active model from a domain entity, every column marked as set.
impl From<User> for ActiveModel {
    fn from(user: User) -> Self {
        use sea_orm::Set;

        ActiveModel {
            id: Set(user.id),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            user_name: Set(user.username),
            password_hash: Set(user.password_hash),
            phone: Set(user.phone),
            enabled: Set(user.enabled),
            is_deleted: Set(user.is_deleted),
            role: Set(user.role.to_string()),
            gender: Set(user.gender.as_str().to_string()),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
    }
}
