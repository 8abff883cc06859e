//! Teacher and student accounts and the DTOs of the `/api/teacher` and
//! `/api/user` endpoints.

use chrono::{DateTime, Utc};
use labsys_core::PageParams;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::{AdminId, UserId};

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub user_no: String,
    pub real_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Number of the class the user belongs to
    pub class_no: Option<String>,
    /// The admin who created the account
    pub created_by: AdminId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_no: String,
    pub real_name: String,
    pub password_hash: String,
    pub class_no: Option<String>,
    pub created_by: AdminId,
}

/// Create-teacher form. `password` is RSA encrypted like on admin login.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateTeacherDto {
    #[schema(example = "T2024001")]
    pub user_no: String,
    #[schema(example = "Ada Lovelace")]
    pub real_name: String,
    pub password: String,
    /// Class number, empty or missing for none
    #[serde(default)]
    #[schema(example = "CS-2024")]
    pub class: String,
}

impl CreateTeacherDto {
    pub fn class_no(&self) -> Option<&str> {
        Some(self.class.trim()).filter(|class| !class.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UserListParams {
    #[serde(flatten)]
    pub pagination: PageParams,
}

#[derive(Debug, Clone)]
pub struct UserPage {
    pub items: Vec<User>,
    pub total_page: i64,
    pub total_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserItem {
    pub id: UserId,
    pub user_no: String,
    pub real_name: String,
    pub class: Option<String>,
    pub created_by: AdminId,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserItem {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            user_no: user.user_no.clone(),
            real_name: user.real_name.clone(),
            class: user.class_no.clone(),
            created_by: user.created_by,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub list: Vec<UserItem>,
    pub total_page: i64,
    pub total_count: i64,
}

impl From<UserPage> for UserListResponse {
    fn from(page: UserPage) -> Self {
        Self {
            list: page.items.iter().map(UserItem::from).collect(),
            total_page: page.total_page,
            total_count: page.total_count,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct DeleteUsersDto {
    #[validate(length(min = 1, max = 100, message = "ids must list 1-100 users"))]
    pub ids: Vec<UserId>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteUsersResponse {
    /// Accounts actually removed; unknown ids are skipped
    pub deleted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: UserId(3),
            user_no: "T2024001".to_string(),
            real_name: "Ada Lovelace".to_string(),
            password_hash: "$2b$04$hash".to_string(),
            class_no: Some("CS-2024".to_string()),
            created_by: AdminId(1),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_never_serializes_password_hash() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_item_renames_class() {
        let json = serde_json::to_value(UserItem::from(&sample_user())).unwrap();
        assert_eq!(json["class"], "CS-2024");
        assert_eq!(json["user_no"], "T2024001");
        assert_eq!(json["created_by"], 1);
    }

    #[test]
    fn test_teacher_class_is_optional() {
        let dto: CreateTeacherDto = serde_json::from_str(
            r#"{"user_no":"T001","real_name":"Ada","password":"x"}"#,
        )
        .unwrap();
        assert_eq!(dto.class_no(), None);

        let dto: CreateTeacherDto = serde_json::from_str(
            r#"{"user_no":"T001","real_name":"Ada","password":"x","class":"  "}"#,
        )
        .unwrap();
        assert_eq!(dto.class_no(), None);

        let dto: CreateTeacherDto = serde_json::from_str(
            r#"{"user_no":"T001","real_name":"Ada","password":"x","class":"CS-2024"}"#,
        )
        .unwrap();
        assert_eq!(dto.class_no(), Some("CS-2024"));
    }

    #[test]
    fn test_delete_ids_bounds() {
        let empty = DeleteUsersDto { ids: vec![] };
        assert!(empty.validate().is_err());

        let too_many = DeleteUsersDto {
            ids: (1..=101).map(UserId).collect(),
        };
        assert!(too_many.validate().is_err());

        let ok: DeleteUsersDto = serde_json::from_str(r#"{"ids":[3,4]}"#).unwrap();
        assert!(ok.validate().is_ok());
        assert_eq!(ok.ids, vec![UserId(3), UserId(4)]);
    }
}
