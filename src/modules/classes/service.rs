use std::sync::Arc;

use tracing::{info, instrument};

use labsys_core::pagination::total_pages;
use labsys_core::patterns::check_class_no;
use labsys_core::{AppError, InvalidReason};
use labsys_db::{ClassRepository, RepoError};
use labsys_models::{AdminId, Class, ClassListParams, ClassPage, CreateClassDto, NewClass};

use crate::metrics::track_class_created;

#[derive(Clone)]
pub struct ClassService {
    repo: Arc<dyn ClassRepository>,
}

impl ClassService {
    pub fn new(repo: Arc<dyn ClassRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, dto), fields(class_no = %dto.class_no))]
    pub async fn create(&self, creator: AdminId, dto: CreateClassDto) -> Result<Class, AppError> {
        check_class_no(&dto.class_no).map_err(AppError::invalid_params)?;

        let class = self
            .repo
            .insert(NewClass {
                class_no: dto.class_no,
                created_by: creator,
            })
            .await
            .map_err(|e| match e {
                RepoError::Conflict => AppError::invalid_params(InvalidReason::ClassNoTaken),
                other => AppError::system(other),
            })?;

        track_class_created();
        info!(class_id = %class.id, created_by = %creator, "Class created");

        Ok(class)
    }

    #[instrument(skip(self))]
    pub async fn list(&self, params: ClassListParams) -> Result<ClassPage, AppError> {
        let pagination = params.pagination;
        let (items, total_count) = self
            .repo
            .find_page(pagination.offset(), pagination.limit())
            .await
            .map_err(AppError::system)?;

        Ok(ClassPage {
            items,
            total_page: total_pages(total_count, pagination.page_size()),
            total_count,
        })
    }
}

impl std::fmt::Debug for ClassService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassService").finish_non_exhaustive()
    }
}
