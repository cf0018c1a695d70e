//! Domain types and models

pub mod credentials;
pub mod entity;
pub mod pager;
pub mod params;

pub use credentials::Credentials;
pub use entity::{Entity, RESERVED_FIELDS};
pub use pager::Pager;
pub use params::{ParamValue, QueryParams};
