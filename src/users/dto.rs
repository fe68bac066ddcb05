use serde::{Deserialize, Serialize};

use crate::users::{
    repo_types::{User, UserCounts},
    validation::PageRequest,
};

/// Raw `GET /users` query; values are validated by the service, not serde.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub current_page: i64,
    pub per_page: i64,
    pub total: i64,
    pub last_page: i64,
    pub from: Option<i64>, // 1-based index of the first item on this page
    pub to: Option<i64>,
}

impl PaginationMeta {
    pub fn new(request: PageRequest, total: i64, items_on_page: usize) -> Self {
        let last_page = ((total + request.per_page - 1) / request.per_page).max(1);
        let (from, to) = if items_on_page == 0 {
            (None, None)
        } else {
            let first = request.offset() + 1;
            (Some(first), Some(first + items_on_page as i64 - 1))
        };
        Self {
            current_page: request.page,
            per_page: request.per_page,
            total,
            last_page,
            from,
            to,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub data: Vec<User>,
    pub pagination: PaginationMeta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserCountResponse {
    pub total_users: i64,
    pub verified_users: i64,
    pub unverified_users: i64,
    pub verification_rate: f64,
}

impl From<UserCounts> for UserCountResponse {
    fn from(c: UserCounts) -> Self {
        let verification_rate = if c.total > 0 {
            let pct = c.verified as f64 / c.total as f64 * 100.0;
            (pct * 100.0).round() / 100.0
        } else {
            0.0
        };
        Self {
            total_users: c.total,
            verified_users: c.verified,
            unverified_users: c.total - c.verified,
            verification_rate,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// Body for create and update.
#[derive(Debug, Serialize)]
pub struct UserMessageResponse {
    pub message: &'static str,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UserDeletedResponse {
    pub message: &'static str,
    pub remaining_users: i64,
}
