//! Database entities

pub mod comment;
pub mod discussion;
pub mod team;
pub mod user;

pub use comment::Entity as Comment;
pub use discussion::Entity as Discussion;
pub use team::Entity as Team;
pub use user::Entity as User;

pub mod prelude {
    pub use super::comment::Entity as Comment;
    pub use super::discussion::Entity as Discussion;
    pub use super::team::Entity as Team;
    pub use super::user::Entity as User;
}
