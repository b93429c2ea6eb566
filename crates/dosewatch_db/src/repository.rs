//! Repository factory trait
//!
//! Each repository trait in [`crate::repositories`] has an SQL implementation
//! built from a [`crate::DbClient`]; factories hide that wiring from callers.

/// A trait for database repository factories, generic over the repository type
/// and the configuration it is built from.
pub trait RepositoryFactory<R, C> {
    fn create_repository(&self, config: C) -> R;
}
