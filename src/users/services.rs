use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::{
    config::EmailRulesConfig,
    error::{ApiError, ValidationErrors},
    users::{
        dto::{
            ListQuery, PaginationMeta, UserCountResponse, UserDeletedResponse, UserListResponse,
            UserMessageResponse, UserResponse,
        },
        email::DomainResolver,
        messages,
        password::hash_password,
        repo::UserStore,
        repo_types::{NewUser, User, UserChanges},
        validation::{self, FieldRules, RuleContext},
    },
};

/// Request-level operations over the user store.
pub struct UserService {
    store: Arc<dyn UserStore>,
    resolver: Arc<dyn DomainResolver>,
    email_rules: EmailRulesConfig,
}

impl UserService {
    pub fn new(
        store: Arc<dyn UserStore>,
        resolver: Arc<dyn DomainResolver>,
        email_rules: EmailRulesConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            email_rules,
        }
    }

    fn rule_context(&self) -> RuleContext<'_> {
        RuleContext {
            store: self.store.as_ref(),
            resolver: self.resolver.as_ref(),
        }
    }

    pub async fn list(&self, query: &ListQuery) -> Result<UserListResponse, ApiError> {
        let request = validation::page_request(query.page.as_deref(), query.per_page.as_deref())
            .map_err(ApiError::Validation)?;

        let total = self.store.counts().await?.total;
        let data = self.store.page(request.per_page, request.offset()).await?;
        let pagination = PaginationMeta::new(request, total, data.len());
        Ok(UserListResponse { data, pagination })
    }

    pub async fn count(&self) -> Result<UserCountResponse, ApiError> {
        let counts = self.store.counts().await?;
        Ok(counts.into())
    }

    pub async fn create(&self, input: &Map<String, Value>) -> Result<UserMessageResponse, ApiError> {
        let ctx = self.rule_context();
        let mut errors = ValidationErrors::new();

        let name = FieldRules::name()
            .apply(field(input, "name"), &ctx, &mut errors)
            .await?;
        let email = FieldRules::email(self.email_rules, None)
            .apply(field(input, "email"), &ctx, &mut errors)
            .await?;
        let password = FieldRules::password()
            .apply(field(input, "password"), &ctx, &mut errors)
            .await?;

        let (Some(name), Some(email), Some(password)) = (name, email, password) else {
            warn!(fields = ?errors.fields().collect::<Vec<_>>(), "create rejected");
            return Err(ApiError::Validation(errors));
        };

        let new_user = NewUser {
            name: name.trim().to_string(),
            email: email.to_lowercase(),
            password_hash: hash_password(&password)?,
        };
        let user = self.store.insert(new_user).await?;

        info!(user_id = user.id, email = %user.email, "user created");
        Ok(UserMessageResponse {
            message: messages::USER_CREATED,
            user,
        })
    }

    pub async fn show(&self, id: &str) -> Result<UserResponse, ApiError> {
        let user = self.existing(id).await?;
        Ok(UserResponse { user })
    }

    /// Applies only the fields present in `input`.
    pub async fn update(
        &self,
        id: &str,
        input: &Map<String, Value>,
    ) -> Result<UserMessageResponse, ApiError> {
        let current = self.existing(id).await?;
        let ctx = self.rule_context();
        let mut errors = ValidationErrors::new();
        let mut changes = UserChanges::default();

        if let Some(raw) = input.get("name") {
            changes.name = FieldRules::name()
                .apply(raw, &ctx, &mut errors)
                .await?
                .map(|n| n.trim().to_string());
        }
        if let Some(raw) = input.get("email") {
            changes.email = FieldRules::email(self.email_rules, Some(current.id))
                .apply(raw, &ctx, &mut errors)
                .await?
                .map(|e| e.to_lowercase());
        }
        if let Some(raw) = input.get("password") {
            if let Some(plain) = FieldRules::password().apply(raw, &ctx, &mut errors).await? {
                changes.password_hash = Some(hash_password(&plain)?);
            }
        }

        if !errors.is_empty() {
            warn!(user_id = current.id, fields = ?errors.fields().collect::<Vec<_>>(), "update rejected");
            return Err(ApiError::Validation(errors));
        }

        let user = if changes.is_empty() {
            current
        } else {
            self.store
                .update(current.id, changes)
                .await?
                .ok_or(ApiError::NotFound)?
        };

        info!(user_id = user.id, "user updated");
        Ok(UserMessageResponse {
            message: messages::USER_UPDATED,
            user,
        })
    }

    pub async fn destroy(&self, id: &str) -> Result<UserDeletedResponse, ApiError> {
        let user = self.existing(id).await?;
        if !self.store.delete(user.id).await? {
            return Err(ApiError::NotFound);
        }
        let remaining_users = self.store.counts().await?.total;

        info!(user_id = user.id, remaining_users, "user deleted");
        Ok(UserDeletedResponse {
            message: messages::USER_DELETED,
            remaining_users,
        })
    }

    async fn existing(&self, raw_id: &str) -> Result<User, ApiError> {
        let id = validation::parse_id(raw_id).map_err(ApiError::Validation)?;
        self.store.find(id).await?.ok_or(ApiError::NotFound)
    }
}

static MISSING: Value = Value::Null;

/// Absent keys read as `null`, which the `required` check rejects.
fn field<'a>(input: &'a Map<String, Value>, key: &str) -> &'a Value {
    input.get(key).unwrap_or(&MISSING)
}
