//! Style and review workflows, generic over the store traits so handlers
//! stay thin and the rules can be exercised without PostgreSQL.

pub mod review;
pub mod style;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;
