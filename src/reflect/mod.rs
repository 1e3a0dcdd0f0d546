//! Entity metadata: field tokens, member capture, outlines and beans.

mod bean;
pub mod capture;
mod entity;
mod outline;

pub use bean::Bean;
pub use capture::{accessor_name, capture};
pub use entity::{Accessor, Entity, Field, FieldKind, FieldType};
pub use outline::{EntityNames, Member, Outline, OutlineRegistry, Property};

#[cfg(test)]
mod tests;
