//! Access decision engine.
//!
//! Decides, for a `(user, application)` pair, whether access is permitted,
//! and computes the visible application set for the portal. Pure read-side:
//! every decision is recomputed per request, because grants can change
//! between requests and no staleness window is acceptable for an
//! access-control check.

use crate::error::OAuthError;
use std::collections::HashSet;
use tessera_db::models::{AccessGrant, Application, User};
use tessera_db::DbPool;
use uuid::Uuid;

/// Read-side access decision service.
#[derive(Debug, Clone)]
pub struct AccessService {
    pool: DbPool,
}

impl AccessService {
    /// Create a new access service.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Whether the user may see/use the application.
    ///
    /// True when the application is active AND any of the independent,
    /// additive grant sources applies:
    /// - the application is public,
    /// - the user's department is in `allowed_departments`,
    /// - a direct per-user grant exists,
    /// - any group containing the user holds a grant.
    pub async fn is_authorized(
        &self,
        user: &User,
        application: &Application,
    ) -> Result<bool, OAuthError> {
        if !application.is_active() {
            return Ok(false);
        }

        if application.is_public {
            return Ok(true);
        }

        if Self::department_allows(application, user) {
            return Ok(true);
        }

        let granted = AccessGrant::exists_for_user(&self.pool, application.id, user.id).await?;
        Ok(granted)
    }

    /// Active applications visible to the user, in portal order
    /// (`sort_order`, then name).
    pub async fn list_visible_applications(
        &self,
        user: &User,
    ) -> Result<Vec<Application>, OAuthError> {
        let applications = Application::list(&self.pool).await?;
        let granted_ids = self.granted_application_ids(user.id).await?;

        Ok(applications
            .into_iter()
            .filter(|app| {
                app.is_active()
                    && (app.is_public
                        || Self::department_allows(app, user)
                        || granted_ids.contains(&app.id))
            })
            .collect())
    }

    /// Department-based grant source: an application may name departments
    /// whose members get access without an explicit grant.
    fn department_allows(application: &Application, user: &User) -> bool {
        if application.allowed_departments.is_empty() {
            return false;
        }
        user.department
            .as_deref()
            .map(|d| application.allowed_departments.iter().any(|a| a == d))
            .unwrap_or(false)
    }

    /// All application ids reachable by the user's direct and group
    /// grants, in one query.
    async fn granted_application_ids(&self, user_id: Uuid) -> Result<HashSet<Uuid>, OAuthError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r"
            SELECT DISTINCT application_id FROM application_access
            WHERE user_id = $1
               OR group_id IN (SELECT group_id FROM user_group_members WHERE user_id = $1)
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }
}
