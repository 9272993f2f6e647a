//! Identifier allocation for the in-process stores.
//!
//! The smallest positive integer not currently assigned is handed out, so
//! identifiers freed by removal are reused before the range grows. Callers
//! must hold the store's exclusive lock across allocation and insertion.

use crate::user::UserId;

/// Return the smallest identifier >= 1 not present in `ids`.
///
/// Identifiers below 1 are ignored. Duplicates in the input are tolerated.
pub fn first_vacant_id<I>(ids: I) -> UserId
where
    I: IntoIterator<Item = UserId>,
{
    let mut taken: Vec<i64> = ids
        .into_iter()
        .map(UserId::get)
        .filter(|id| *id >= 1)
        .collect();
    taken.sort_unstable();
    taken.dedup();

    for (position, id) in taken.iter().enumerate() {
        let expected = position as i64 + 1;
        if *id != expected {
            return UserId::new(expected);
        }
    }
    UserId::new(taken.len() as i64 + 1)
}
