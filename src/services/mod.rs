pub mod auth;
pub mod comment;
pub mod like;
pub mod topic;
pub mod user;
