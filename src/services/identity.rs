use crate::api::error::AppError;
use crate::config::AppConfig;
use crate::entities::users::{self, Role};
use crate::entities::prelude::*;
use crate::models::{AuthenticationResponse, IdentityError, UserDto};
use crate::utils::auth::create_jwt;
use crate::utils::pagination::PageWindow;
use argon2::{
    Argon2,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;
use validator::ValidateEmail;

const MIN_PASSWORD_LENGTH: usize = 6;

/// User store: registration, credential checks, the admin role and token
/// issuance.
pub struct IdentityService {
    db: DatabaseConnection,
    jwt_secret: String,
    token_lifetime: chrono::Duration,
}

/// Emails are matched case-insensitively.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Every password rule the candidate breaks, in a fixed order.
pub fn password_errors(password: &str) -> Vec<IdentityError> {
    let mut errors = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(IdentityError::new(
            "PasswordTooShort",
            format!("Passwords must be at least {MIN_PASSWORD_LENGTH} characters."),
        ));
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        errors.push(IdentityError::new(
            "PasswordRequiresNonAlphanumeric",
            "Passwords must have at least one non alphanumeric character.",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(IdentityError::new(
            "PasswordRequiresDigit",
            "Passwords must have at least one digit ('0'-'9').",
        ));
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        errors.push(IdentityError::new(
            "PasswordRequiresLower",
            "Passwords must have at least one lowercase ('a'-'z').",
        ));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        errors.push(IdentityError::new(
            "PasswordRequiresUpper",
            "Passwords must have at least one uppercase ('A'-'Z').",
        ));
    }

    errors
}

impl IdentityService {
    pub fn new(db: DatabaseConnection, config: &AppConfig) -> Self {
        Self {
            db,
            jwt_secret: config.jwt_secret.clone(),
            token_lifetime: chrono::Duration::days(config.token_lifetime_days),
        }
    }

    /// Registers a user with the email as user name. All rule violations
    /// are reported together.
    pub async fn create_user(&self, email: &str, password: &str) -> Result<users::Model, AppError> {
        let email = normalize_email(email);
        let mut errors = Vec::new();

        if !email.validate_email() {
            errors.push(IdentityError::new(
                "InvalidEmail",
                format!("Email '{}' is invalid.", email),
            ));
        } else if self.find_by_email(&email).await?.is_some() {
            errors.push(IdentityError::new(
                "DuplicateUserName",
                format!("Username '{}' is already taken.", email),
            ));
        }
        errors.extend(password_errors(password));

        if !errors.is_empty() {
            return Err(AppError::Identity(errors));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(e.to_string()))?
            .to_string();

        let user = users::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            email: Set(email),
            password_hash: Set(password_hash),
            role: Set(Role::User),
            created_at: Set(Some(Utc::now())),
        }
        .insert(&self.db)
        .await?;

        tracing::info!("👤 Registered user {}", user.id);
        Ok(user)
    }

    /// The user when the password matches; `None` for an unknown email or
    /// a wrong password alike.
    pub async fn check_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<users::Model>, AppError> {
        let Some(user) = self.find_by_email(email).await? else {
            return Ok(None);
        };

        let parsed_hash = argon2::PasswordHash::new(&user.password_hash)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(Some(user)),
            Err(_) => Ok(None),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<users::Model>, AppError> {
        Ok(Users::find()
            .filter(users::Column::Email.eq(normalize_email(email)))
            .one(&self.db)
            .await?)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<users::Model>, AppError> {
        Ok(Users::find_by_id(id.to_owned()).one(&self.db).await?)
    }

    /// Grants or revokes the admin role. Returns `false` when the user was
    /// already in the requested state.
    pub async fn set_admin(&self, id: &str, admin: bool) -> Result<bool, AppError> {
        let user = self.find_by_id(id).await?.ok_or(AppError::NotFound)?;

        if user.is_admin() == admin {
            return Ok(false);
        }

        let mut active = user.into_active_model();
        active.role = Set(if admin { Role::Admin } else { Role::User });
        active.update(&self.db).await?;

        tracing::info!("🔑 Admin role for {} set to {}", id, admin);
        Ok(true)
    }

    /// Page of users ordered by email, plus the unpaginated count.
    pub async fn list_users(&self, window: PageWindow) -> Result<(u64, Vec<UserDto>), AppError> {
        let paginator = Users::find()
            .order_by_asc(users::Column::Email)
            .paginate(&self.db, window.records_per_page);

        let total = paginator.num_items().await?;
        let users = paginator
            .fetch_page(window.page_index)
            .await?
            .into_iter()
            .map(UserDto::from)
            .collect();

        Ok((total, users))
    }

    pub fn issue_token(&self, user: &users::Model) -> Result<AuthenticationResponse, AppError> {
        let role = user.is_admin().then_some(Role::Admin);
        let issued = create_jwt(&user.email, role, &self.jwt_secret, self.token_lifetime)?;

        Ok(AuthenticationResponse {
            token: issued.token,
            expiration: issued.expiration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(password: &str) -> Vec<String> {
        password_errors(password)
            .into_iter()
            .map(|e| e.code)
            .collect()
    }

    #[test]
    fn test_strong_password_passes() {
        assert!(password_errors("Passw0rd!").is_empty());
    }

    #[test]
    fn test_each_password_rule() {
        assert_eq!(codes("Aa1!"), vec!["PasswordTooShort"]);
        assert_eq!(codes("Passw0rd"), vec!["PasswordRequiresNonAlphanumeric"]);
        assert_eq!(codes("Password!"), vec!["PasswordRequiresDigit"]);
        assert_eq!(codes("PASSW0RD!"), vec!["PasswordRequiresLower"]);
        assert_eq!(codes("passw0rd!"), vec!["PasswordRequiresUpper"]);
    }

    #[test]
    fn test_all_failures_reported_together() {
        assert_eq!(password_errors("abc").len(), 4);
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }
}
