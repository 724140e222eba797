//! User lifecycle tests against in-memory stores.

use std::pin::Pin;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use ticketing_api::domain::{
    Gender, NewUser, Project, ProjectData, Role, Status, Task, TaskData, User,
};
use ticketing_api::errors::{AppError, AppResult};
use ticketing_api::infra::{
    ProjectRepository, TaskRepository, TransactionContext, UnitOfWork, UserRepository,
};
use ticketing_api::services::{DeletionPolicy, IdentityProvider, UserManager, UserService};

#[derive(Default)]
struct InMemoryUsers {
    rows: Mutex<Vec<User>>,
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_active_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username && !u.is_deleted)
            .cloned())
    }

    async fn list_active(&self) -> AppResult<Vec<User>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|u| !u.is_deleted)
            .cloned()
            .collect())
    }

    async fn list_by_role(&self, role: &str) -> AppResult<Vec<User>> {
        let role = Role::from(role);
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|u| !u.is_deleted && u.role == role)
            .cloned()
            .collect())
    }

    async fn create(&self, new_user: NewUser, password_hash: String) -> AppResult<User> {
        let mut rows = self.rows.lock().unwrap();
        let user = User {
            id: rows.len() as i64 + 1,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            username: new_user.username,
            password_hash,
            phone: new_user.phone,
            enabled: true,
            is_deleted: false,
            role: new_user.role,
            gender: new_user.gender,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        rows.push(user.clone());
        Ok(user)
    }

    async fn save(&self, user: User) -> AppResult<User> {
        let mut rows = self.rows.lock().unwrap();
        let slot = rows
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| AppError::not_found("User"))?;
        *slot = user.clone();
        Ok(user)
    }

    async fn hard_delete(&self, id: i64) -> AppResult<()> {
        self.rows.lock().unwrap().retain(|u| u.id != id);
        Ok(())
    }
}

#[derive(Default)]
struct InMemoryProjects {
    rows: Mutex<Vec<Project>>,
}

#[async_trait]
impl ProjectRepository for InMemoryProjects {
    async fn find_active_by_code(&self, code: &str) -> AppResult<Option<Project>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.code == code && !p.is_deleted)
            .cloned())
    }

    async fn list_active(&self) -> AppResult<Vec<Project>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|p| !p.is_deleted)
            .cloned()
            .collect())
    }

    async fn list_by_manager(&self, manager_id: i64) -> AppResult<Vec<Project>> {
        Ok(self
            .list_active()
            .await?
            .into_iter()
            .filter(|p| p.manager_id == manager_id)
            .collect())
    }

    async fn list_non_completed_by_manager(&self, manager_id: i64) -> AppResult<Vec<Project>> {
        Ok(self
            .list_by_manager(manager_id)
            .await?
            .into_iter()
            .filter(|p| p.status != Status::Complete)
            .collect())
    }

    async fn create(&self, data: ProjectData) -> AppResult<Project> {
        let mut rows = self.rows.lock().unwrap();
        let project = Project {
            id: rows.len() as i64 + 1,
            code: data.code,
            name: data.name,
            manager_id: data.manager_id,
            start_date: data.start_date,
            end_date: data.end_date,
            detail: data.detail,
            status: Status::Open,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        rows.push(project.clone());
        Ok(project)
    }

    async fn save(&self, project: Project) -> AppResult<Project> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(slot) = rows.iter_mut().find(|p| p.id == project.id) {
            *slot = project.clone();
        }
        Ok(project)
    }
}

#[derive(Default)]
struct InMemoryTasks {
    rows: Mutex<Vec<Task>>,
}

impl InMemoryTasks {
    fn for_employee(&self, employee_id: i64, complete: bool) -> Vec<Task> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|t| {
                !t.is_deleted
                    && t.employee_id == employee_id
                    && (t.status == Status::Complete) == complete
            })
            .cloned()
            .collect()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTasks {
    async fn find_active_by_id(&self, id: i64) -> AppResult<Option<Task>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id && !t.is_deleted)
            .cloned())
    }

    async fn list_active(&self) -> AppResult<Vec<Task>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|t| !t.is_deleted)
            .cloned()
            .collect())
    }

    async fn list_non_completed_by_employee(&self, employee_id: i64) -> AppResult<Vec<Task>> {
        Ok(self.for_employee(employee_id, false))
    }

    async fn list_completed_by_employee(&self, employee_id: i64) -> AppResult<Vec<Task>> {
        Ok(self.for_employee(employee_id, true))
    }

    async fn count_by_project(&self, project_id: i64) -> AppResult<(u64, u64)> {
        let rows = self.rows.lock().unwrap();
        let of_project = rows
            .iter()
            .filter(|t| !t.is_deleted && t.project_id == project_id);
        let completed = of_project
            .clone()
            .filter(|t| t.status == Status::Complete)
            .count() as u64;
        Ok((completed, of_project.count() as u64 - completed))
    }

    async fn create(&self, data: TaskData) -> AppResult<Task> {
        let mut rows = self.rows.lock().unwrap();
        let task = Task {
            id: rows.len() as i64 + 1,
            project_id: data.project_id,
            employee_id: data.employee_id,
            subject: data.subject,
            detail: data.detail,
            status: Status::Open,
            assigned_date: data.assigned_date,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        rows.push(task.clone());
        Ok(task)
    }

    async fn save(&self, task: Task) -> AppResult<Task> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(slot) = rows.iter_mut().find(|t| t.id == task.id) {
            *slot = task.clone();
        }
        Ok(task)
    }
}

#[derive(Default)]
struct InMemoryUow {
    users: Arc<InMemoryUsers>,
    projects: Arc<InMemoryProjects>,
    tasks: Arc<InMemoryTasks>,
}

#[async_trait]
impl UnitOfWork for InMemoryUow {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn projects(&self) -> Arc<dyn ProjectRepository> {
        self.projects.clone()
    }

    fn tasks(&self) -> Arc<dyn TaskRepository> {
        self.tasks.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(
                TransactionContext<'a>,
            )
                -> Pin<Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>>
            + Send,
        T: Send,
    {
        Err(AppError::internal("no transactions in memory"))
    }
}

/// Identity provider that records every account it holds.
#[derive(Default)]
struct RecordingIdentity {
    accounts: Mutex<Vec<String>>,
}

#[async_trait]
impl IdentityProvider for RecordingIdentity {
    async fn create_account(&self, user: &User, _password: &str) -> AppResult<()> {
        self.accounts.lock().unwrap().push(user.username.clone());
        Ok(())
    }

    async fn remove_account(&self, username: &str) -> AppResult<()> {
        self.accounts.lock().unwrap().retain(|a| a != username);
        Ok(())
    }
}

struct Harness {
    uow: Arc<InMemoryUow>,
    identity: Arc<RecordingIdentity>,
    service: UserManager<InMemoryUow>,
}

fn harness() -> Harness {
    let uow = Arc::new(InMemoryUow::default());
    let identity = Arc::new(RecordingIdentity::default());
    let service = UserManager::new(
        uow.clone(),
        DeletionPolicy::from_uow(uow.clone()),
        identity.clone(),
    );
    Harness {
        uow,
        identity,
        service,
    }
}

fn new_user(username: &str, role: Role) -> NewUser {
    NewUser {
        first_name: "Test".to_string(),
        last_name: "Person".to_string(),
        username: username.to_string(),
        password: "Abc12345".to_string(),
        phone: "5551234567".to_string(),
        role,
        gender: Gender::Female,
    }
}

fn project_for(manager_id: i64) -> ProjectData {
    ProjectData {
        code: "PR001".to_string(),
        name: "API Project".to_string(),
        manager_id,
        start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        detail: "Build the API".to_string(),
    }
}

#[tokio::test]
async fn test_deleted_username_is_free_for_reuse() {
    let h = harness();
    h.service
        .create_user(new_user("admin@site.com", Role::Admin))
        .await
        .unwrap();
    let mike = h
        .service
        .create_user(new_user("mike@site.com", Role::Employee))
        .await
        .unwrap();

    h.service.delete_user("mike@site.com").await.unwrap();

    assert!(matches!(
        h.service.find_by_username("mike@site.com").await,
        Err(AppError::NotFound(_))
    ));
    let stored = h
        .uow
        .users
        .rows
        .lock()
        .unwrap()
        .iter()
        .find(|u| u.id == mike.id)
        .cloned()
        .unwrap();
    assert!(stored.is_deleted);
    assert_eq!(stored.username, format!("mike@site.com-{}", mike.id));
    assert!(!h
        .identity
        .accounts
        .lock()
        .unwrap()
        .contains(&"mike@site.com".to_string()));

    let again = h
        .service
        .create_user(new_user("mike@site.com", Role::Employee))
        .await
        .unwrap();
    assert_ne!(again.id, mike.id);
}

#[tokio::test]
async fn test_second_delete_reports_not_found() {
    let h = harness();
    h.service
        .create_user(new_user("mike@site.com", Role::Employee))
        .await
        .unwrap();

    h.service.delete_user("mike@site.com").await.unwrap();

    assert!(matches!(
        h.service.delete_user("mike@site.com").await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_manager_blocked_until_project_complete() {
    let h = harness();
    let manager = h
        .service
        .create_user(new_user("ozzy@site.com", Role::Manager))
        .await
        .unwrap();
    let mut project = h.uow.projects.create(project_for(manager.id)).await.unwrap();

    assert!(matches!(
        h.service.delete_user("ozzy@site.com").await,
        Err(AppError::IneligibleDeletion)
    ));
    assert!(h.service.find_by_username("ozzy@site.com").await.is_ok());

    project.complete();
    h.uow.projects.save(project).await.unwrap();

    assert!(h.service.delete_user("ozzy@site.com").await.is_ok());
}

#[tokio::test]
async fn test_employee_blocked_by_open_task() {
    let h = harness();
    let employee = h
        .service
        .create_user(new_user("mike@site.com", Role::Employee))
        .await
        .unwrap();
    h.uow
        .tasks
        .create(TaskData {
            project_id: 1,
            employee_id: employee.id,
            subject: "Write docs".to_string(),
            detail: "README".to_string(),
            assigned_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        })
        .await
        .unwrap();

    let err = h.service.delete_user("mike@site.com").await.unwrap_err();

    assert_eq!(err.to_string(), "User can not be deleted");
}

#[tokio::test]
async fn test_last_admin_cannot_be_deleted() {
    let h = harness();
    h.service
        .create_user(new_user("first@site.com", Role::Admin))
        .await
        .unwrap();
    h.service
        .create_user(new_user("second@site.com", Role::Admin))
        .await
        .unwrap();

    assert!(h.service.delete_user("first@site.com").await.is_ok());
    assert!(matches!(
        h.service.delete_user("second@site.com").await,
        Err(AppError::IneligibleDeletion)
    ));
}

#[tokio::test]
async fn test_other_role_is_always_deletable() {
    let h = harness();
    h.service
        .create_user(new_user("aud@site.com", Role::Other("Auditor".to_string())))
        .await
        .unwrap();

    assert!(h.service.delete_user("aud@site.com").await.is_ok());
    assert!(h.service.list_users().await.unwrap().is_empty());
}
