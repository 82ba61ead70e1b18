pub mod comment;
pub mod like;
pub mod topic;
pub mod user;

pub use comment::{Entity as Comment, Model as CommentModel};
pub use like::{Entity as Like, LikeStatus, LikeType, Model as LikeModel};
pub use topic::{Category, Entity as Topic, Model as TopicModel};
pub use user::{Entity as User, Gender, Model as UserModel};
