//! Data access, one submodule per aggregate.
//!
//! Every function takes the connection it should run on; obtain one from a
//! [`crate::db::SessionFactory`]. Lookups that find nothing return `Ok(None)`
//! or an empty `Vec`. Database errors, constraint violations included, are
//! passed through unchanged.

mod entries;
mod exercises;
mod metrics;
mod reports;
mod users;
mod workouts;

pub use entries::*;
pub use exercises::*;
pub use metrics::*;
pub use reports::*;
pub use users::*;
pub use workouts::*;

/// Diesel refuses to build an `UPDATE` whose changeset has no fields set.
fn is_empty_changeset(err: &diesel::result::Error) -> bool {
    matches!(
        err,
        diesel::result::Error::QueryBuilderError(e) if e.is::<diesel::result::EmptyChangeset>()
    )
}
