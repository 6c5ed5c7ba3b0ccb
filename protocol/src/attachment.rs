// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Keyed Attachments
//!
//! An [`Attachments`] table lets one object own other objects of arbitrary
//! type, each stored under an [`ObjectId`] key. A vault uses it to hold its
//! minting authority under the identity of its metadata record, so the
//! metadata is the only key that reaches it.
//!
//! Lookups are typed: asking for a key with the wrong type behaves exactly
//! like asking for a key that is not there. Slots are write-once; an
//! occupied key cannot be reassigned.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::object::ObjectId;

/// Errors raised by attachment operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachmentError {
    /// The key already holds a value.
    #[error("attachment slot {0} is already occupied")]
    AlreadyAttached(ObjectId),
}

/// A write-once, heterogeneous map from [`ObjectId`] to owned values.
#[derive(Default)]
pub struct Attachments {
    slots: HashMap<ObjectId, Box<dyn Any + Send + Sync>>,
}

impl Attachments {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }

    /// Creates a table holding exactly one value.
    pub fn single<V>(key: ObjectId, value: V) -> Self
    where
        V: Any + Send + Sync,
    {
        let mut slots: HashMap<ObjectId, Box<dyn Any + Send + Sync>> = HashMap::with_capacity(1);
        slots.insert(key, Box::new(value));
        Self { slots }
    }

    /// Stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// [`AttachmentError::AlreadyAttached`] if `key` is occupied (by a value
    /// of any type). The table is unchanged and `value` is dropped.
    pub fn attach<V>(&mut self, key: ObjectId, value: V) -> Result<(), AttachmentError>
    where
        V: Any + Send + Sync,
    {
        if self.slots.contains_key(&key) {
            return Err(AttachmentError::AlreadyAttached(key));
        }
        self.slots.insert(key, Box::new(value));
        Ok(())
    }

    /// Borrows the value under `key` if it exists and is a `V`.
    pub fn borrow<V: Any>(&self, key: &ObjectId) -> Option<&V> {
        self.slots.get(key).and_then(|slot| slot.downcast_ref::<V>())
    }

    /// Mutably borrows the value under `key` if it exists and is a `V`.
    pub fn borrow_mut<V: Any>(&mut self, key: &ObjectId) -> Option<&mut V> {
        self.slots
            .get_mut(key)
            .and_then(|slot| slot.downcast_mut::<V>())
    }

    /// Returns `true` if `key` holds a value of type `V`.
    pub fn exists_with_type<V: Any>(&self, key: &ObjectId) -> bool {
        self.slots
            .get(key)
            .is_some_and(|slot| (**slot).type_id() == TypeId::of::<V>())
    }

    /// Returns `true` if `key` holds anything at all.
    pub fn contains(&self, key: &ObjectId) -> bool {
        self.slots.contains_key(key)
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Debug for Attachments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachments")
            .field("keys", &self.slots.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Badge(u32);

    #[test]
    fn attach_then_borrow() {
        let mut table = Attachments::new();
        let key = ObjectId::fresh();
        table.attach(key, Badge(7)).unwrap();

        assert_eq!(table.borrow::<Badge>(&key), Some(&Badge(7)));
        assert!(table.exists_with_type::<Badge>(&key));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn borrow_mut_mutates_in_place() {
        let mut table = Attachments::new();
        let key = ObjectId::fresh();
        table.attach(key, Badge(1)).unwrap();

        table.borrow_mut::<Badge>(&key).unwrap().0 = 99;
        assert_eq!(table.borrow::<Badge>(&key), Some(&Badge(99)));
    }

    #[test]
    fn wrong_type_is_not_found() {
        let mut table = Attachments::new();
        let key = ObjectId::fresh();
        table.attach(key, Badge(1)).unwrap();

        assert!(table.borrow::<String>(&key).is_none());
        assert!(table.borrow_mut::<u64>(&key).is_none());
        assert!(!table.exists_with_type::<String>(&key));
        assert!(table.contains(&key));
    }

    #[test]
    fn missing_key_is_not_found() {
        let table = Attachments::new();
        let key = ObjectId::fresh();
        assert!(table.borrow::<Badge>(&key).is_none());
        assert!(!table.exists_with_type::<Badge>(&key));
        assert!(table.is_empty());
    }

    #[test]
    fn single_holds_one_slot() {
        let key = ObjectId::fresh();
        let mut table = Attachments::single(key, Badge(3));
        assert_eq!(table.len(), 1);
        assert_eq!(table.borrow::<Badge>(&key), Some(&Badge(3)));
        assert!(table.attach(key, Badge(4)).is_err());
    }

    #[test]
    fn slots_are_write_once() {
        let mut table = Attachments::new();
        let key = ObjectId::fresh();
        table.attach(key, Badge(1)).unwrap();

        let err = table.attach(key, String::from("squatter")).unwrap_err();
        assert_eq!(err, AttachmentError::AlreadyAttached(key));
        assert_eq!(table.borrow::<Badge>(&key), Some(&Badge(1)));
    }
}
