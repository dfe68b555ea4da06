//! # services
//!
//! Application services orchestrating the storage ports: article search
//! and lifecycle, hashtag parsing with reference-counted cleanup, comment
//! tree assembly, user accounts, and the pagination bar math.

pub mod article;
pub mod comment;
pub mod hashtag;
pub mod pagination;
pub mod user_account;

pub use article::ArticleService;
pub use comment::{assemble_tree, CommentNode, CommentService};
pub use hashtag::HashtagService;
pub use pagination::bar_numbers;
pub use user_account::UserAccountService;
