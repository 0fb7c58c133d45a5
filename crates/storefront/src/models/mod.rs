//! Domain models for the storefront.
//!
//! These are validated domain types, separate from the database row types in
//! [`crate::db`] and from the wire types owned by the route handlers.

pub mod item;
pub mod order;
pub mod session;
pub mod user;

pub use item::{Item, NewItem};
pub use order::{OrderHistory, OrderHistoryLine, OrderLineRequest};
pub use session::{CurrentUser, IssuedSession};
pub use user::User;
