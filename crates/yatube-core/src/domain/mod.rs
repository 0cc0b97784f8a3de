//! Domain entities - the core business objects.

mod group;
mod page;
mod post;
mod user;

pub use group::{Group, NewGroup};
pub use page::{Page, PageRequest};
pub use post::{NewPost, Post, PostDraft, PostFilter};
pub use user::{NewAccount, NewUser, User};
