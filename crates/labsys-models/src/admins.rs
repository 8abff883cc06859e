//! Admin accounts and the DTOs of the `/api/admin` endpoints.

use chrono::{DateTime, Utc};
use labsys_core::{PageParams, PowerOwner, PowerSet};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::ids::AdminId;

/// A stored admin account.
#[derive(Debug, Clone, Serialize)]
pub struct Admin {
    pub id: AdminId,
    pub nickname: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub power: PowerSet,
    /// The admin who created this account; `None` for the bootstrap root
    pub created_by: Option<AdminId>,
    pub created_at: DateTime<Utc>,
}

/// An account ready to be inserted. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub nickname: String,
    pub password_hash: String,
    pub power: PowerSet,
    pub created_by: Option<AdminId>,
}

/// Login form. `password` is RSA encrypted and base64 encoded; `key` and
/// `v_code` answer the challenge from `/api/admin/captcha`.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "root")]
    pub user_name: String,
    #[validate(length(min = 1))]
    pub password: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    #[schema(example = 123456)]
    pub v_code: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub id: AdminId,
    pub name: String,
    pub powers: Vec<PowerOwner>,
}

/// Profile of the calling admin with the full permissions matrix.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminInfoResponse {
    pub id: AdminId,
    pub name: String,
    pub powers: Vec<PowerOwner>,
}

impl From<&Admin> for AdminInfoResponse {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            name: admin.nickname.clone(),
            powers: admin.power.matrix(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct AdminListParams {
    /// Only list accounts created by this admin (0 or missing lists all)
    #[serde(default)]
    pub created_by: Option<AdminId>,
    #[serde(flatten)]
    pub pagination: PageParams,
}

impl AdminListParams {
    /// The creator filter, with the legacy `0` meaning "no filter".
    pub fn creator_filter(&self) -> Option<AdminId> {
        self.created_by.filter(|id| id.0 != 0)
    }
}

/// One page of admins as returned by the directory.
#[derive(Debug, Clone)]
pub struct AdminPage {
    pub items: Vec<Admin>,
    pub total_page: i64,
    pub total_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminItem {
    pub id: AdminId,
    pub name: String,
    /// Permissions matrix of the account
    pub power: Vec<PowerOwner>,
    pub created_by: Option<AdminId>,
    pub created_at: DateTime<Utc>,
}

impl From<&Admin> for AdminItem {
    fn from(admin: &Admin) -> Self {
        Self {
            id: admin.id,
            name: admin.nickname.clone(),
            power: admin.power.matrix(),
            created_by: admin.created_by,
            created_at: admin.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminListResponse {
    pub list: Vec<AdminItem>,
    pub total_page: i64,
    pub total_count: i64,
}

impl From<AdminPage> for AdminListResponse {
    fn from(page: AdminPage) -> Self {
        Self {
            list: page.items.iter().map(AdminItem::from).collect(),
            total_page: page.total_page,
            total_count: page.total_count,
        }
    }
}

/// Create-admin form. `password` is RSA encrypted like on login and `power`
/// is the raw capability bitset.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAdminDto {
    #[schema(example = "lab_admin")]
    pub name: String,
    pub password: String,
    #[schema(example = 5)]
    pub power: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use labsys_core::Power;

    fn sample_admin() -> Admin {
        Admin {
            id: AdminId(2),
            nickname: "lab_admin".to_string(),
            password_hash: "$2b$04$hash".to_string(),
            power: PowerSet::from_raw(5).unwrap(),
            created_by: Some(AdminId(1)),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_admin_never_serializes_password_hash() {
        let json = serde_json::to_value(sample_admin()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["power"], 5);
    }

    #[test]
    fn test_item_carries_full_matrix() {
        let item = AdminItem::from(&sample_admin());
        assert_eq!(item.power.len(), Power::ALL.len());
        let owned: Vec<&str> = item
            .power
            .iter()
            .filter(|p| p.own)
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(owned, vec!["admin management", "class management"]);
        assert_eq!(item.created_by, Some(AdminId(1)));
    }

    #[test]
    fn test_list_params_flatten_pagination() {
        let params: AdminListParams =
            serde_json::from_str(r#"{"created_by":1,"page":2,"page_size":5}"#).unwrap();
        assert_eq!(params.creator_filter(), Some(AdminId(1)));
        assert_eq!(params.pagination.offset(), 5);
    }

    #[test]
    fn test_list_params_zero_creator_is_no_filter() {
        let params: AdminListParams = serde_json::from_str(r#"{"created_by":0}"#).unwrap();
        assert_eq!(params.creator_filter(), None);

        let params: AdminListParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.creator_filter(), None);
        assert_eq!(params.pagination.page(), 1);
    }

    #[test]
    fn test_login_request_defaults_challenge_fields() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"user_name":"root","password":"abc"}"#).unwrap();
        assert_eq!(req.key, "");
        assert_eq!(req.v_code, 0);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_login_request_requires_password() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"user_name":"root","password":""}"#).unwrap();
        assert!(req.validate().is_err());
    }
}
