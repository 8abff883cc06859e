use chrono::{DateTime, Utc};
use labsys_core::PageParams;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{AdminId, ClassId};

#[derive(Debug, Clone, Serialize)]
pub struct Class {
    pub id: ClassId,
    pub class_no: String,
    pub created_by: AdminId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewClass {
    pub class_no: String,
    pub created_by: AdminId,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClassDto {
    #[schema(example = "CS-2024")]
    pub class_no: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ClassListParams {
    #[serde(flatten)]
    pub pagination: PageParams,
}

#[derive(Debug, Clone)]
pub struct ClassPage {
    pub items: Vec<Class>,
    pub total_page: i64,
    pub total_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassItem {
    pub id: ClassId,
    pub class_no: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Class> for ClassItem {
    fn from(class: &Class) -> Self {
        Self {
            id: class.id,
            class_no: class.class_no.clone(),
            created_at: class.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassListResponse {
    pub list: Vec<ClassItem>,
    pub total_page: i64,
    pub total_count: i64,
}

impl From<ClassPage> for ClassListResponse {
    fn from(page: ClassPage) -> Self {
        Self {
            list: page.items.iter().map(ClassItem::from).collect(),
            total_page: page.total_page,
            total_count: page.total_count,
        }
    }
}
