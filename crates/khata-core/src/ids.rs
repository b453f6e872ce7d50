//! Identifier allocation

use crate::models::HasId;
use crate::store::{StoreError, StoreResult};

/// Next id for a collection: one past the current maximum, or 1 when empty.
/// Fails once the maximum is `i64::MAX`.
///
/// Not safe against callers racing on the same snapshot; see `LocalStore`.
pub fn next_id<T: HasId>(existing: &[T]) -> StoreResult<i64> {
    match existing.iter().map(HasId::id).max() {
        None => Ok(1),
        Some(max) => max.checked_add(1).ok_or(StoreError::IdExhausted { max }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Person;

    fn person(id: i64) -> Person {
        Person { id, name: format!("p{}", id) }
    }

    #[test]
    fn test_empty_collection_starts_at_one() {
        let empty: Vec<Person> = Vec::new();
        assert_eq!(next_id(&empty), Ok(1));
    }

    #[test]
    fn test_uses_maximum_not_length() {
        assert_eq!(next_id(&[person(1), person(3)]), Ok(4));
        assert_eq!(next_id(&[person(7), person(2)]), Ok(8));
    }

    #[test]
    fn test_exceeds_every_existing_id() {
        let people: Vec<Person> = [5, 1, 9, 4].into_iter().map(person).collect();
        let id = next_id(&people).unwrap();
        assert!(people.iter().all(|p| p.id < id));
    }

    #[test]
    fn test_maximum_id_is_an_error() {
        let people = vec![person(3), person(i64::MAX)];
        assert_eq!(next_id(&people), Err(StoreError::IdExhausted { max: i64::MAX }));
    }
}
