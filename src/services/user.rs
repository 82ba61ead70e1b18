use crate::{
    config::auth::AuthConfig,
    error::{AppError, AppResult},
    models::{comment, like, topic, user, Comment, Gender, Like, Topic, TopicModel, User, UserModel},
    utils::{hash_password, verify_password},
};
use sea_orm::{
    sea_query::{Expr, Func, SimpleExpr},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    ModelTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};

/// Number of users returned by the top-commenters listing.
pub const TOP_COMMENTERS_LIMIT: u64 = 5;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Gender,
}

/// Partial profile update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<Gender>,
}

#[derive(Debug, Clone, FromQueryResult)]
pub struct CommenterRow {
    pub id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    pub comment_count: i64,
}

pub struct UserService {
    db: DatabaseConnection,
    config: AuthConfig,
}

impl UserService {
    pub fn new(db: DatabaseConnection, config: AuthConfig) -> Self {
        Self { db, config }
    }

    pub async fn create(&self, data: NewUser) -> AppResult<UserModel> {
        if self.find_by_email(&data.email).await?.is_some() {
            return Err(AppError::Validation(
                "User with that email already exist".to_string(),
            ));
        }

        let password_hash = hash_password(&data.password, self.config.bcrypt_cost)?;
        let now = chrono::Utc::now().naive_utc();

        let new_user = user::ActiveModel {
            email: sea_orm::ActiveValue::Set(data.email),
            password: sea_orm::ActiveValue::Set(password_hash),
            first_name: sea_orm::ActiveValue::Set(data.first_name),
            last_name: sea_orm::ActiveValue::Set(data.last_name),
            gender: sea_orm::ActiveValue::Set(data.gender),
            avatar_url: sea_orm::ActiveValue::Set(Some(random_avatar_url()?)),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let user = new_user.insert(&self.db).await?;
        tracing::info!(user_id = user.id, "user registered");
        Ok(user)
    }

    pub async fn update(&self, id: i32, data: ProfileUpdate) -> AppResult<UserModel> {
        if let Some(email) = &data.email {
            let taken = User::find()
                .filter(user::Column::Email.eq(email.as_str()))
                .filter(user::Column::Id.ne(id))
                .one(&self.db)
                .await?;
            if taken.is_some() {
                return Err(AppError::Validation(
                    "User already exists with that email".to_string(),
                ));
            }
        }

        let existing = self.get_by_id(id).await?;
        let now = chrono::Utc::now().naive_utc();

        let mut active: user::ActiveModel = existing.into();
        if let Some(email) = data.email {
            active.email = sea_orm::ActiveValue::Set(email);
        }
        if let Some(first_name) = data.first_name {
            active.first_name = sea_orm::ActiveValue::Set(Some(first_name));
        }
        if let Some(last_name) = data.last_name {
            active.last_name = sea_orm::ActiveValue::Set(Some(last_name));
        }
        if let Some(gender) = data.gender {
            active.gender = sea_orm::ActiveValue::Set(gender);
        }
        active.updated_at = sea_orm::ActiveValue::Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// The old password must verify before the confirmation is even looked at.
    pub async fn change_password(
        &self,
        id: i32,
        old_password: Option<&str>,
        new_password: &str,
        confirm_password: &str,
    ) -> AppResult<()> {
        let me = self.get_by_id(id).await?;

        if !verify_password(old_password.unwrap_or_default(), &me.password)? {
            return Err(AppError::InvalidCredentials);
        }

        if new_password != confirm_password {
            return Err(AppError::Validation(
                "Confirmation password does not match".to_string(),
            ));
        }

        let password_hash = hash_password(new_password, self.config.bcrypt_cost)?;
        let now = chrono::Utc::now().naive_utc();

        let mut active: user::ActiveModel = me.into();
        active.password = sea_orm::ActiveValue::Set(password_hash);
        active.updated_at = sea_orm::ActiveValue::Set(now);
        active.update(&self.db).await?;

        tracing::info!(user_id = id, "password changed");
        Ok(())
    }

    pub async fn top_commenters(&self) -> AppResult<Vec<CommenterRow>> {
        let comment_count: SimpleExpr = Func::count(Expr::col((Comment, comment::Column::Id))).into();

        let rows = User::find()
            .select_only()
            .columns([
                user::Column::Id,
                user::Column::FirstName,
                user::Column::LastName,
                user::Column::AvatarUrl,
            ])
            .column_as(comment_count.clone(), "comment_count")
            .join(JoinType::LeftJoin, user::Relation::Comment.def())
            .group_by(user::Column::Id)
            .group_by(user::Column::FirstName)
            .group_by(user::Column::LastName)
            .group_by(user::Column::AvatarUrl)
            .order_by_desc(comment_count)
            .order_by_asc(user::Column::Id)
            .limit(TOP_COMMENTERS_LIMIT)
            .into_model::<CommenterRow>()
            .all(&self.db)
            .await?;
        Ok(rows)
    }

    pub async fn list(&self) -> AppResult<Vec<UserModel>> {
        let users = User::find()
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await?;
        Ok(users)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<UserModel> {
        User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn get_with_topics(&self, id: i32) -> AppResult<(UserModel, Vec<TopicModel>)> {
        let user = self.get_by_id(id).await?;
        let topics = user
            .find_related(Topic)
            .order_by_desc(topic::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok((user, topics))
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<UserModel>> {
        let user = User::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(user)
    }

    /// Remove an account with everything it authored, atomically.
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;

        Like::delete_many()
            .filter(like::Column::UserId.eq(id))
            .exec(&txn)
            .await
            .map_err(AppError::persistence("Error while deleting user"))?;
        Comment::delete_many()
            .filter(comment::Column::AuthorId.eq(id))
            .exec(&txn)
            .await
            .map_err(AppError::persistence("Error while deleting user"))?;
        Topic::delete_many()
            .filter(topic::Column::PostedById.eq(id))
            .exec(&txn)
            .await
            .map_err(AppError::persistence("Error while deleting user"))?;
        let result = User::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(AppError::persistence("Error while deleting user"))?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Err(AppError::NotFound);
        }

        txn.commit().await?;
        tracing::info!(user_id = id, "user deleted");
        Ok(())
    }
}

fn random_avatar_url() -> anyhow::Result<String> {
    let mut buf = [0u8; 2];
    getrandom::getrandom(&mut buf).map_err(|e| anyhow::anyhow!("Failed to pick avatar: {e}"))?;
    Ok(avatar_url(u16::from_le_bytes(buf)))
}

fn avatar_url(seed: u16) -> String {
    format!("https://robohash.org/{}.png?set=set3", seed % 1000)
}
