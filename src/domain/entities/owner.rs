//! Link owner as seen by the engine.
//!
//! Registration and credentials live outside the engine; only the id and
//! the notification address are read.

use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Owner {
    pub id: Uuid,
    pub email: String,
}
