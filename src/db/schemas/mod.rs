//! Document schemas

pub mod breed;
pub mod metadata;

pub use breed::{BreedDoc, Range, Temperament, UnitRange, DOG_COLLECTION};
pub use metadata::Metadata;
