//! Deletion eligibility - decides whether a user may be soft-deleted.
//!
//! The rule depends on the user's role:
//! - Manager: no non-completed projects assigned.
//! - Employee: no non-completed tasks assigned.
//! - Admin: at least one other active admin remains.
//! - any other role: always deletable.
//!
//! The policy reads through narrow query traits. The project and task
//! managers implement the first two, so the user service sees them only
//! through these seams.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::domain::{Project, Role, Task, User};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;
use crate::services::{ProjectManager, TaskManager};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Projects assigned to a manager that are not complete.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ManagerProjects: Send + Sync {
    async fn non_completed_for_manager(&self, manager: &User) -> AppResult<Vec<Project>>;
}

/// Tasks assigned to an employee that are not complete.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EmployeeTasks: Send + Sync {
    async fn non_completed_for_employee(&self, employee: &User) -> AppResult<Vec<Task>>;
}

/// Active users by role, matched case-insensitively.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoleDirectory: Send + Sync {
    async fn list_by_role(&self, role: &Role) -> AppResult<Vec<User>>;
}

/// Why a deletion was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    OpenProjects(usize),
    OpenTasks(usize),
    LastAdmin,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::OpenProjects(n) => write!(f, "{} non-completed project(s)", n),
            BlockReason::OpenTasks(n) => write!(f, "{} non-completed task(s)", n),
            BlockReason::LastAdmin => f.write_str("last remaining admin"),
        }
    }
}

/// Outcome of an eligibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Allowed,
    Blocked(BlockReason),
}

impl Eligibility {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Eligibility::Allowed)
    }
}

/// Role-specific deletion rules. Side-effect free.
#[derive(Clone)]
pub struct DeletionPolicy {
    projects: Arc<dyn ManagerProjects>,
    tasks: Arc<dyn EmployeeTasks>,
    directory: Arc<dyn RoleDirectory>,
}

impl DeletionPolicy {
    pub fn new(
        projects: Arc<dyn ManagerProjects>,
        tasks: Arc<dyn EmployeeTasks>,
        directory: Arc<dyn RoleDirectory>,
    ) -> Self {
        Self {
            projects,
            tasks,
            directory,
        }
    }

    /// Build a policy backed by the project and task managers and the user
    /// store of the given Unit of Work.
    pub fn from_uow<U: UnitOfWork + 'static>(uow: Arc<U>) -> Self {
        Self::new(
            Arc::new(ProjectManager::new(uow.clone())),
            Arc::new(TaskManager::new(uow.clone())),
            Arc::new(UserDirectory { uow }),
        )
    }

    /// Evaluate whether `user` may be deleted right now.
    ///
    /// The admin count includes `user`, so a lone admin is blocked.
    /// Nothing is locked between this check and the delete that follows.
    pub async fn evaluate(&self, user: &User) -> AppResult<Eligibility> {
        let eligibility = match &user.role {
            Role::Manager => {
                let open = self.projects.non_completed_for_manager(user).await?.len();
                if open == 0 {
                    Eligibility::Allowed
                } else {
                    Eligibility::Blocked(BlockReason::OpenProjects(open))
                }
            }
            Role::Employee => {
                let open = self.tasks.non_completed_for_employee(user).await?.len();
                if open == 0 {
                    Eligibility::Allowed
                } else {
                    Eligibility::Blocked(BlockReason::OpenTasks(open))
                }
            }
            Role::Admin => {
                let admins = self.directory.list_by_role(&Role::Admin).await?.len();
                if admins > 1 {
                    Eligibility::Allowed
                } else {
                    Eligibility::Blocked(BlockReason::LastAdmin)
                }
            }
            Role::Other(_) => Eligibility::Allowed,
        };

        Ok(eligibility)
    }

    pub async fn can_delete(&self, user: &User) -> AppResult<bool> {
        Ok(self.evaluate(user).await?.is_allowed())
    }
}

/// Role lookups over the user store.
pub struct UserDirectory<U: UnitOfWork> {
    uow: Arc<U>,
}

#[async_trait]
impl<U: UnitOfWork> RoleDirectory for UserDirectory<U> {
    async fn list_by_role(&self, role: &Role) -> AppResult<Vec<User>> {
        self.uow.users().list_by_role(role.description()).await
    }
}
