//! Teacher creation and the user roster: listing and bulk deletion of
//! teacher and student accounts.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use labsys_auth::CredentialCipher;
use labsys_config::CryptoConfig;
use labsys_core::pagination::total_pages;
use labsys_core::patterns::{
    check_class_no, check_password_strength, check_real_name, check_user_no,
};
use labsys_core::{AppError, InvalidReason, hash_password_with_cost};
use labsys_db::{ClassRepository, RepoError, UserRepository};
use labsys_models::{AdminId, CreateTeacherDto, NewUser, User, UserId, UserListParams, UserPage};

use crate::metrics::{track_teacher_created, track_users_deleted};

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    classes: Arc<dyn ClassRepository>,
    cipher: Arc<dyn CredentialCipher>,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        classes: Arc<dyn ClassRepository>,
        cipher: Arc<dyn CredentialCipher>,
    ) -> Self {
        Self {
            users,
            classes,
            cipher,
            bcrypt_cost: CryptoConfig::DEFAULT_BCRYPT_COST,
        }
    }

    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Creates a teacher account on behalf of `creator`.
    ///
    /// Checks run in order: user number, real name, password decryption,
    /// password strength, then the class, which must already exist when
    /// given. Nothing is stored unless all pass.
    #[instrument(skip(self, dto), fields(user_no = %dto.user_no))]
    pub async fn create_teacher(
        &self,
        creator: AdminId,
        dto: CreateTeacherDto,
    ) -> Result<User, AppError> {
        check_user_no(&dto.user_no).map_err(AppError::invalid_params)?;
        check_real_name(&dto.real_name).map_err(AppError::invalid_params)?;

        let password = self.cipher.decrypt(&dto.password).map_err(|e| {
            debug!(error = %e, "credential decryption failed");
            AppError::invalid_params(InvalidReason::UndecryptablePassword)
        })?;
        check_password_strength(&password).map_err(AppError::invalid_params)?;

        let class_no = match dto.class_no() {
            Some(class_no) => {
                check_class_no(class_no).map_err(AppError::invalid_params)?;
                let class = self
                    .classes
                    .find_by_class_no(class_no)
                    .await
                    .map_err(AppError::system)?
                    .ok_or_else(|| AppError::invalid_params(InvalidReason::UnknownClass))?;
                Some(class.class_no)
            }
            None => None,
        };

        let password_hash = hash_password_with_cost(&password, self.bcrypt_cost)?;

        let user = self
            .users
            .insert(NewUser {
                user_no: dto.user_no,
                real_name: dto.real_name,
                password_hash,
                class_no,
                created_by: creator,
            })
            .await
            .map_err(|e| match e {
                RepoError::Conflict => AppError::invalid_params(InvalidReason::UserNoTaken),
                other => AppError::system(other),
            })?;

        track_teacher_created();
        info!(user_id = %user.id, created_by = %creator, "Teacher created");

        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, params: UserListParams) -> Result<UserPage, AppError> {
        let pagination = params.pagination;
        let (items, total_count) = self
            .users
            .find_page(pagination.offset(), pagination.limit())
            .await
            .map_err(AppError::system)?;

        Ok(UserPage {
            items,
            total_page: total_pages(total_count, pagination.page_size()),
            total_count,
        })
    }

    /// Deletes the listed accounts. Unknown ids are skipped; the result is
    /// the number of accounts removed.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn delete(&self, caller: AdminId, ids: &[UserId]) -> Result<u64, AppError> {
        let deleted = self
            .users
            .delete_many(ids)
            .await
            .map_err(AppError::system)?;

        track_users_deleted(deleted);
        info!(deleted, requested = ids.len(), by = %caller, "Users deleted");

        Ok(deleted)
    }
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService")
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish_non_exhaustive()
    }
}
