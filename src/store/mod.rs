/// Persistence layer: entities, generic repository and unit of work
///
/// Entities share an embedded `Stamps` struct instead of a base-class
/// hierarchy; repositories stage mutations in memory and the unit of work
/// commits them in a single transaction.
pub mod entity;
pub mod repository;
pub mod unit_of_work;

pub use entity::{Entity, Hashtag, Platform, Post, Profile, Stamps, Wall};
pub use repository::Repository;
pub use unit_of_work::UnitOfWork;
