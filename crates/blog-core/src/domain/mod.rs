//! Domain entities - the core business objects.

mod blog;
mod entry;
mod tag;
mod user;

pub use blog::Blog;
pub use entry::Entry;
pub use tag::Tag;
pub use user::User;
