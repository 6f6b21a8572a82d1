//! gallery-tags: Tag catalog, session shuffle, and cascading facet filter.
//!
//! Media items carry tags; every tag belongs to exactly one category and
//! categories are ordered into levels. Filtering walks the levels in order so
//! that the choices offered at a level reflect the selections made above it.

pub mod tag;
pub mod item;
pub mod catalog;
pub mod normalize;
pub mod shuffle;
pub mod cascade;
pub mod suggest;
pub mod error;

pub use tag::*;
pub use item::*;
pub use catalog::*;
pub use normalize::*;
pub use shuffle::*;
pub use cascade::*;
pub use suggest::*;
pub use error::*;
