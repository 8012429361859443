//! Core domain entities.
//!
//! - [`Link`] - A short-code mapping owned by a user
//! - [`Click`] - An enriched redirect event
//! - [`Domain`] - A host name serving short links
//! - [`Owner`] - The id and email of a link owner
//!
//! Creation inputs use separate `New*` structs; partial updates use
//! [`LinkPatch`].

pub mod click;
pub mod domain;
pub mod link;
pub mod owner;

pub use click::{Click, NewClick};
pub use domain::Domain;
pub use link::{Link, LinkPatch, NewLink};
pub use owner::Owner;
