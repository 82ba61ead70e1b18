use crate::{
    config::jwt::JwtConfig,
    error::{AppError, AppResult},
    models::{user, User, UserModel},
    utils::{encode_access_token, verify_password},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

pub struct AuthService {
    db: DatabaseConnection,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, jwt: JwtConfig) -> Self {
        Self { db, jwt }
    }

    /// Check an email/password pair against the stored bcrypt hash.
    pub async fn validate(&self, email: &str, password: &str) -> AppResult<UserModel> {
        let user = User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password)? {
            return Err(AppError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Login user
    /// Returns (user_model, access_token)
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(UserModel, String)> {
        let user = self.validate(email, password).await?;
        let token = self.issue_token(&user)?;

        tracing::debug!(user_id = user.id, "login succeeded");
        Ok((user, token))
    }

    pub fn issue_token(&self, user: &UserModel) -> AppResult<String> {
        let token = encode_access_token(&self.jwt, user.id, &user.email)?;
        Ok(token)
    }
}
