//! User service - Handles user-related business logic.
//!
//! Deletion is guarded by the [`DeletionPolicy`] and mirrored to the
//! identity provider; local writes are compensated when the mirror fails.

use async_trait::async_trait;
use std::sync::Arc;

use super::eligibility::{DeletionPolicy, Eligibility};
use super::IdentityProvider;
use crate::domain::{validate_phone, NewUser, Password, User, UserChanges};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// User service trait for dependency injection.
///
/// Every operation only sees active (non-deleted) users.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get active user by username
    async fn find_by_username(&self, username: &str) -> AppResult<User>;

    /// List active users, first name descending
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// List active users holding a role (case-insensitive)
    async fn list_by_role(&self, role: &str) -> AppResult<Vec<User>>;

    /// Create an enabled user and mirror it to the identity provider
    async fn create_user(&self, new_user: NewUser) -> AppResult<User>;

    /// Replace the profile of the active user named in `changes`
    async fn update_user(&self, changes: UserChanges) -> AppResult<User>;

    /// Soft delete the user if its role rules allow it.
    ///
    /// Fails with `Conflict` when an active user already holds the
    /// `<username>-<id>` name the deleted row would take.
    async fn delete_user(&self, username: &str) -> AppResult<()>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
    policy: DeletionPolicy,
    identity: Arc<dyn IdentityProvider>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>, policy: DeletionPolicy, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            uow,
            policy,
            identity,
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn find_by_username(&self, username: &str) -> AppResult<User> {
        self.uow
            .users()
            .find_active_by_username(username)
            .await?
            .ok_or_not_found("User")
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.uow.users().list_active().await
    }

    async fn list_by_role(&self, role: &str) -> AppResult<Vec<User>> {
        self.uow.users().list_by_role(role).await
    }

    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        validate_phone(&new_user.phone)?;

        let users = self.uow.users();
        if users
            .find_active_by_username(&new_user.username)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("User"));
        }

        let password = new_user.password.clone();
        let password_hash = Password::new(&password)?.into_string();
        let created = users.create(new_user, password_hash).await?;

        if let Err(e) = self.identity.create_account(&created, &password).await {
            tracing::error!(
                username = %created.username,
                error = %e,
                "Identity provider rejected new account, removing local user"
            );
            if let Err(cleanup_err) = users.hard_delete(created.id).await {
                tracing::error!(
                    user_id = created.id,
                    error = %cleanup_err,
                    "Failed to remove local user after identity provider failure"
                );
            }
            return Err(e);
        }

        tracing::info!(user_id = created.id, username = %created.username, role = %created.role, "User created");
        Ok(created)
    }

    async fn update_user(&self, changes: UserChanges) -> AppResult<User> {
        validate_phone(&changes.phone)?;

        let users = self.uow.users();
        let mut user = users
            .find_active_by_username(&changes.username)
            .await?
            .ok_or_not_found("User")?;

        let password = Password::for_update(&user.password_hash, changes.password.as_deref())?;
        user.apply(&changes);
        user.password_hash = password.into_string();

        users.save(user).await
    }

    async fn delete_user(&self, username: &str) -> AppResult<()> {
        let users = self.uow.users();
        let user = users
            .find_active_by_username(username)
            .await?
            .ok_or_not_found("User")?;

        if let Eligibility::Blocked(reason) = self.policy.evaluate(&user).await? {
            tracing::info!(username, role = %user.role, %reason, "User deletion refused");
            return Err(AppError::IneligibleDeletion);
        }

        let tombstone = user.tombstone_username();
        if users.find_active_by_username(&tombstone).await?.is_some() {
            tracing::warn!(username, %tombstone, "Tombstone username is held by an active user");
            return Err(AppError::conflict(format!("User {}", tombstone)));
        }

        let original = user.clone();
        let mut deleted = user;
        deleted.soft_delete();
        users.save(deleted).await?;

        if let Err(e) = self.identity.remove_account(&original.username).await {
            tracing::error!(username, error = %e, "Identity provider removal failed, restoring user");
            if let Err(restore_err) = users.save(original).await {
                tracing::error!(
                    username,
                    error = %restore_err,
                    "Failed to restore user; local store and identity provider have diverged"
                );
            }
            return Err(e);
        }

        tracing::info!(username, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Gender, Role};
    use crate::errors::USER_NOT_DELETABLE_MESSAGE;
    use crate::infra::MockUserRepository;
    use crate::services::eligibility::{MockEmployeeTasks, MockManagerProjects, MockRoleDirectory};
    use crate::services::identity::MockIdentityProvider;
    use crate::services::test_support::{project, task, user, MockUow};
    use mockall::predicate::eq;
    use tokio_test::{assert_err, assert_ok};

    struct Collaborators {
        projects: MockManagerProjects,
        tasks: MockEmployeeTasks,
        directory: MockRoleDirectory,
        identity: MockIdentityProvider,
    }

    impl Collaborators {
        fn new() -> Self {
            Self {
                projects: MockManagerProjects::new(),
                tasks: MockEmployeeTasks::new(),
                directory: MockRoleDirectory::new(),
                identity: MockIdentityProvider::new(),
            }
        }

        fn build(self, users: MockUserRepository) -> UserManager<MockUow> {
            let policy = DeletionPolicy::new(
                Arc::new(self.projects),
                Arc::new(self.tasks),
                Arc::new(self.directory),
            );
            UserManager::new(MockUow::with_users(users), policy, Arc::new(self.identity))
        }
    }

    /// Repository holding exactly one active user.
    fn users_finding(found: User) -> MockUserRepository {
        let mut users = MockUserRepository::new();
        let username = found.username.clone();
        let other = found.username.clone();
        users
            .expect_find_active_by_username()
            .withf(move |name: &str| name == username)
            .returning(move |_| Ok(Some(found.clone())));
        users
            .expect_find_active_by_username()
            .withf(move |name: &str| name != other)
            .returning(|_| Ok(None));
        users
    }

    fn new_user(username: &str, password: &str) -> NewUser {
        NewUser {
            first_name: "Harold".to_string(),
            last_name: "Finch".to_string(),
            username: username.to_string(),
            password: password.to_string(),
            phone: "5551234567".to_string(),
            role: Role::Manager,
            gender: Gender::Male,
        }
    }

    #[tokio::test]
    async fn test_delete_manager_without_open_projects() {
        let mut users = users_finding(user(2, "ozzy", Role::Manager));
        users
            .expect_save()
            .withf(|saved: &User| saved.username == "ozzy-2" && saved.is_deleted && saved.id == 2)
            .times(1)
            .returning(|saved| Ok(saved));

        let mut deps = Collaborators::new();
        deps.projects
            .expect_non_completed_for_manager()
            .returning(|_| Ok(vec![]));
        deps.identity
            .expect_remove_account()
            .withf(|username: &str| username == "ozzy")
            .times(1)
            .returning(|_| Ok(()));

        let service = deps.build(users);

        assert_ok!(service.delete_user("ozzy").await);
    }

    #[tokio::test]
    async fn test_delete_refused_when_tombstone_name_is_taken() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_active_by_username()
            .returning(|name| {
                Ok(match name {
                    "ozzy" => Some(user(2, "ozzy", Role::Manager)),
                    "ozzy-2" => Some(user(9, "ozzy-2", Role::Employee)),
                    _ => None,
                })
            });
        users.expect_save().times(0);

        let mut deps = Collaborators::new();
        deps.projects
            .expect_non_completed_for_manager()
            .returning(|_| Ok(vec![]));
        deps.identity.expect_remove_account().times(0);

        let service = deps.build(users);
        let err = service.delete_user("ozzy").await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(err.to_string(), "User ozzy-2 already exists");
    }

    #[tokio::test]
    async fn test_delete_manager_with_open_projects_is_refused() {
        // No save expectation: any write would panic
        let users = users_finding(user(2, "ozzy", Role::Manager));

        let mut deps = Collaborators::new();
        deps.projects
            .expect_non_completed_for_manager()
            .returning(|_| Ok(vec![project(1, "PR001", 2), project(2, "PR002", 2)]));
        deps.identity.expect_remove_account().times(0);

        let service = deps.build(users);
        let err = service.delete_user("ozzy").await.unwrap_err();

        assert!(matches!(err, AppError::IneligibleDeletion));
        assert_eq!(err.to_string(), USER_NOT_DELETABLE_MESSAGE);
    }

    #[tokio::test]
    async fn test_delete_last_admin_is_refused() {
        let users = users_finding(user(1, "admin1", Role::Admin));

        let mut deps = Collaborators::new();
        deps.directory
            .expect_list_by_role()
            .returning(|_| Ok(vec![user(1, "admin1", Role::Admin)]));
        deps.identity.expect_remove_account().times(0);

        let service = deps.build(users);

        let err = service.delete_user("admin1").await.unwrap_err();
        assert_eq!(err.to_string(), "User can not be deleted");
    }

    #[tokio::test]
    async fn test_delete_admin_with_peer() {
        let mut users = users_finding(user(1, "admin1", Role::Admin));
        users
            .expect_save()
            .withf(|saved: &User| saved.username == "admin1-1")
            .times(1)
            .returning(|saved| Ok(saved));

        let mut deps = Collaborators::new();
        deps.directory.expect_list_by_role().returning(|_| {
            Ok(vec![
                user(1, "admin1", Role::Admin),
                user(4, "admin2", Role::Admin),
            ])
        });
        deps.identity
            .expect_remove_account()
            .times(1)
            .returning(|_| Ok(()));

        let service = deps.build(users);

        assert_ok!(service.delete_user("admin1").await);
    }

    #[tokio::test]
    async fn test_delete_employee_with_open_tasks_is_refused() {
        let users = users_finding(user(3, "mike", Role::Employee));

        let mut deps = Collaborators::new();
        deps.tasks
            .expect_non_completed_for_employee()
            .returning(|_| Ok(vec![task(1, 1, 3), task(2, 1, 3)]));

        let service = deps.build(users);

        assert!(matches!(
            service.delete_user("mike").await,
            Err(AppError::IneligibleDeletion)
        ));
    }

    #[tokio::test]
    async fn test_delete_employee_without_open_tasks() {
        let mut users = users_finding(user(3, "mike", Role::Employee));
        users
            .expect_save()
            .withf(|saved: &User| saved.username == "mike-3" && saved.is_deleted)
            .times(1)
            .returning(|saved| Ok(saved));

        let mut deps = Collaborators::new();
        deps.tasks
            .expect_non_completed_for_employee()
            .returning(|_| Ok(vec![]));
        deps.identity
            .expect_remove_account()
            .withf(|username: &str| username == "mike")
            .times(1)
            .returning(|_| Ok(()));

        let service = deps.build(users);

        assert_ok!(service.delete_user("mike").await);
    }

    #[tokio::test]
    async fn test_delete_unknown_user_is_not_found() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_active_by_username()
            .returning(|_| Ok(None));

        let service = Collaborators::new().build(users);
        let err = service.delete_user("ghost").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound(ref entity) if entity == "User"));
    }

    #[tokio::test]
    async fn test_delete_restores_user_when_identity_provider_fails() {
        let mut users = users_finding(user(2, "ozzy", Role::Manager));
        let mut seq = mockall::Sequence::new();
        users
            .expect_save()
            .withf(|saved: &User| saved.is_deleted)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|saved| Ok(saved));
        users
            .expect_save()
            .withf(|saved: &User| !saved.is_deleted && saved.username == "ozzy")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|saved| Ok(saved));

        let mut deps = Collaborators::new();
        deps.projects
            .expect_non_completed_for_manager()
            .returning(|_| Ok(vec![]));
        deps.identity
            .expect_remove_account()
            .returning(|_| Err(AppError::identity_provider("HTTP 503")));

        let service = deps.build(users);
        let err = service.delete_user("ozzy").await.unwrap_err();

        assert!(matches!(err, AppError::IdentityProvider(_)));
    }

    #[tokio::test]
    async fn test_create_hashes_password_and_mirrors_account() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_active_by_username()
            .returning(|_| Ok(None));
        users
            .expect_create()
            .withf(|_new: &NewUser, hash: &String| {
                Password::from_hash(hash.clone()).verify("Abc12345")
            })
            .times(1)
            .returning(|new, hash| {
                let mut created = user(7, &new.username, new.role.clone());
                created.password_hash = hash;
                Ok(created)
            });

        let mut deps = Collaborators::new();
        deps.identity
            .expect_create_account()
            .withf(|created: &User, password: &str| {
                created.username == "harold@manager.com" && password == "Abc12345"
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let service = deps.build(users);
        let created = service
            .create_user(new_user("harold@manager.com", "Abc12345"))
            .await
            .unwrap();

        assert!(created.enabled);
        assert_ne!(created.password_hash, "Abc12345");
    }

    #[tokio::test]
    async fn test_create_duplicate_username_conflicts() {
        let users = users_finding(user(2, "ozzy", Role::Manager));
        let service = Collaborators::new().build(users);

        let err = service
            .create_user(new_user("ozzy", "Abc12345"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_removes_local_user_when_mirror_fails() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_active_by_username()
            .returning(|_| Ok(None));
        users
            .expect_create()
            .returning(|new, hash| {
                let mut created = user(7, &new.username, new.role.clone());
                created.password_hash = hash;
                Ok(created)
            });
        users
            .expect_hard_delete()
            .with(eq(7))
            .times(1)
            .returning(|_| Ok(()));

        let mut deps = Collaborators::new();
        deps.identity
            .expect_create_account()
            .returning(|_, _| Err(AppError::identity_provider("HTTP 409")));

        let service = deps.build(users);

        assert_err!(service.create_user(new_user("harold", "Abc12345")).await);
    }

    #[tokio::test]
    async fn test_update_with_echoed_hash_keeps_password() {
        let stored = Password::new("Original123").unwrap().into_string();
        let mut existing = user(2, "ozzy", Role::Manager);
        existing.password_hash = stored.clone();

        let mut users = users_finding(existing);
        let expected = stored.clone();
        users
            .expect_save()
            .withf(move |saved: &User| saved.password_hash == expected && saved.first_name == "John")
            .times(1)
            .returning(|saved| Ok(saved));

        let service = Collaborators::new().build(users);
        let updated = service
            .update_user(UserChanges {
                username: "ozzy".to_string(),
                first_name: "John".to_string(),
                last_name: "Osbourne".to_string(),
                password: Some(stored),
                phone: "5551234567".to_string(),
                role: Role::Manager,
                gender: Gender::Male,
                enabled: None,
            })
            .await
            .unwrap();

        assert!(Password::from_hash(updated.password_hash).verify("Original123"));
    }

    #[tokio::test]
    async fn test_update_with_new_password_rehashes() {
        let mut users = users_finding(user(2, "ozzy", Role::Manager));
        users
            .expect_save()
            .times(1)
            .returning(|saved| Ok(saved));

        let service = Collaborators::new().build(users);
        let updated = service
            .update_user(UserChanges {
                username: "ozzy".to_string(),
                first_name: "Ozzy".to_string(),
                last_name: "Osbourne".to_string(),
                password: Some("Changed456!".to_string()),
                phone: "5551234567".to_string(),
                role: Role::Manager,
                gender: Gender::Male,
                enabled: Some(false),
            })
            .await
            .unwrap();

        assert!(Password::from_hash(updated.password_hash).verify("Changed456!"));
        assert!(!updated.enabled);
        assert_eq!(updated.id, 2);
    }
}
