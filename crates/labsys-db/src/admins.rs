use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::instrument;

use labsys_core::PowerSet;
use labsys_models::{Admin, AdminId, NewAdmin};

use crate::RepoError;

/// Narrows an admin listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminFilter {
    pub created_by: Option<AdminId>,
}

/// Storage of admin accounts.
///
/// Listings are ordered by id, ascending.
#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn find_by_id(&self, id: AdminId) -> Result<Option<Admin>, RepoError>;

    async fn find_by_nickname(&self, nickname: &str) -> Result<Option<Admin>, RepoError>;

    /// One page of matching accounts plus the total number of matches.
    async fn find_page(
        &self,
        filter: AdminFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Admin>, i64), RepoError>;

    /// Fails with [`RepoError::Conflict`] when the nickname is taken.
    async fn insert(&self, admin: NewAdmin) -> Result<Admin, RepoError>;
}

#[derive(Debug, sqlx::FromRow)]
struct AdminRow {
    id: AdminId,
    nickname: String,
    password_hash: String,
    power: i64,
    created_by: Option<AdminId>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdminRow> for Admin {
    type Error = RepoError;

    fn try_from(row: AdminRow) -> Result<Self, Self::Error> {
        let power = PowerSet::from_raw(row.power)
            .map_err(|e| RepoError::Corrupt(format!("admin {}: {e}", row.id)))?;
        Ok(Admin {
            id: row.id,
            nickname: row.nickname,
            password_hash: row.password_hash,
            power,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}

const ADMIN_COLUMNS: &str = "id, nickname, password_hash, power, created_by, created_at";

#[derive(Debug, Clone)]
pub struct PgAdminRepository {
    db: PgPool,
}

impl PgAdminRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AdminRepository for PgAdminRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: AdminId) -> Result<Option<Admin>, RepoError> {
        let row = sqlx::query_as::<_, AdminRow>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        row.map(Admin::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_nickname(&self, nickname: &str) -> Result<Option<Admin>, RepoError> {
        let row = sqlx::query_as::<_, AdminRow>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE nickname = $1"
        ))
        .bind(nickname)
        .fetch_optional(&self.db)
        .await?;

        row.map(Admin::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_page(
        &self,
        filter: AdminFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Admin>, i64), RepoError> {
        let rows = sqlx::query_as::<_, AdminRow>(&format!(
            r#"
            SELECT {ADMIN_COLUMNS}
            FROM admins
            WHERE ($1::BIGINT IS NULL OR created_by = $1)
            ORDER BY id ASC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(filter.created_by)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM admins WHERE ($1::BIGINT IS NULL OR created_by = $1)",
        )
        .bind(filter.created_by)
        .fetch_one(&self.db)
        .await?;

        let admins = rows
            .into_iter()
            .map(Admin::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((admins, total))
    }

    #[instrument(skip(self, admin), fields(nickname = %admin.nickname))]
    async fn insert(&self, admin: NewAdmin) -> Result<Admin, RepoError> {
        let row = sqlx::query_as::<_, AdminRow>(&format!(
            r#"
            INSERT INTO admins (nickname, password_hash, power, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING {ADMIN_COLUMNS}
            "#
        ))
        .bind(&admin.nickname)
        .bind(&admin.password_hash)
        .bind(admin.power.to_raw())
        .bind(admin.created_by)
        .fetch_one(&self.db)
        .await
        .map_err(RepoError::from_insert)?;

        Admin::try_from(row)
    }
}

/// In-process store for tests.
#[derive(Debug, Default)]
pub struct MemoryAdminRepository {
    admins: RwLock<Vec<Admin>>,
}

impl MemoryAdminRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AdminRepository for MemoryAdminRepository {
    async fn find_by_id(&self, id: AdminId) -> Result<Option<Admin>, RepoError> {
        let admins = self.admins.read().await;
        Ok(admins.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_nickname(&self, nickname: &str) -> Result<Option<Admin>, RepoError> {
        let admins = self.admins.read().await;
        Ok(admins.iter().find(|a| a.nickname == nickname).cloned())
    }

    async fn find_page(
        &self,
        filter: AdminFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Admin>, i64), RepoError> {
        let admins = self.admins.read().await;
        let matching: Vec<&Admin> = admins
            .iter()
            .filter(|a| filter.created_by.is_none() || a.created_by == filter.created_by)
            .collect();

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();

        Ok((page, total))
    }

    async fn insert(&self, admin: NewAdmin) -> Result<Admin, RepoError> {
        let mut admins = self.admins.write().await;
        if admins.iter().any(|a| a.nickname == admin.nickname) {
            return Err(RepoError::Conflict);
        }

        let id = AdminId(admins.last().map_or(1, |a| a.id.0 + 1));
        let stored = Admin {
            id,
            nickname: admin.nickname,
            password_hash: admin.password_hash,
            power: admin.power,
            created_by: admin.created_by,
            created_at: Utc::now(),
        };
        admins.push(stored.clone());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_admin(nickname: &str, created_by: Option<AdminId>) -> NewAdmin {
        NewAdmin {
            nickname: nickname.to_string(),
            password_hash: "hash".to_string(),
            power: PowerSet::from_raw(1).unwrap(),
            created_by,
        }
    }

    #[tokio::test]
    async fn test_memory_insert_assigns_sequential_ids() {
        let repo = MemoryAdminRepository::new();
        let root = repo.insert(new_admin("root", None)).await.unwrap();
        let second = repo.insert(new_admin("second", Some(root.id))).await.unwrap();
        assert_eq!(root.id, AdminId(1));
        assert_eq!(second.id, AdminId(2));
        assert_eq!(second.created_by, Some(AdminId(1)));
    }

    #[tokio::test]
    async fn test_memory_duplicate_nickname_conflicts() {
        let repo = MemoryAdminRepository::new();
        repo.insert(new_admin("root", None)).await.unwrap();
        let err = repo.insert(new_admin("root", None)).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict));
    }

    #[tokio::test]
    async fn test_memory_lookups() {
        let repo = MemoryAdminRepository::new();
        let root = repo.insert(new_admin("root", None)).await.unwrap();

        assert_eq!(repo.find_by_id(root.id).await.unwrap().unwrap().nickname, "root");
        assert!(repo.find_by_id(AdminId(99)).await.unwrap().is_none());
        assert!(repo.find_by_nickname("root").await.unwrap().is_some());
        assert!(repo.find_by_nickname("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_page_and_filter() {
        let repo = MemoryAdminRepository::new();
        let root = repo.insert(new_admin("root", None)).await.unwrap();
        for i in 0..12 {
            repo.insert(new_admin(&format!("admin_{i:02}"), Some(root.id)))
                .await
                .unwrap();
        }

        let (page, total) = repo.find_page(AdminFilter::default(), 10, 10).await.unwrap();
        assert_eq!(total, 13);
        assert_eq!(page.len(), 3);
        assert_eq!(page[0].id, AdminId(11));

        let filter = AdminFilter {
            created_by: Some(root.id),
        };
        let (page, total) = repo.find_page(filter, 0, 5).await.unwrap();
        assert_eq!(total, 12);
        assert_eq!(page.len(), 5);
        assert!(page.iter().all(|a| a.created_by == Some(root.id)));

        let (page, total) = repo.find_page(AdminFilter::default(), 100, 10).await.unwrap();
        assert_eq!(total, 13);
        assert!(page.is_empty());
    }
}
