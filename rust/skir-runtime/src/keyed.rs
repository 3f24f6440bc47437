//! Arrays with lookup by key.
//!
//! A `[User|user_id]` field becomes `KeyedItems<User, UserById>`, where
//! `UserById` is a generated [`KeyExtractor`]. On the wire the container is a
//! plain array; the key only matters in memory, where [`KeyedItems`] keeps a
//! lazily built hash index from key to position.

use crate::binary::{BinaryReader, BinaryWriter};
use crate::error::DecodeError;
use crate::reflection::descriptor::{RecordCollector, TypeSignature};
use crate::reflection::visit::{Visitor, VisitorMut};
use crate::value::{JsonFlavor, SkirType};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Index;

/// Extracts the key of an item. Generated per keyed-array declaration.
pub trait KeyExtractor<T>: Send + Sync + 'static {
    type Key: Eq + Hash + Clone + Send + Sync;

    /// Dotted field path, e.g. `"user_id"` or `"owner.id"`.
    const KEY_PATH: &'static str;

    fn key(item: &T) -> Self::Key;
}

pub struct KeyedItems<T, K: KeyExtractor<T>> {
    items: Vec<T>,
    index: OnceCell<HashMap<K::Key, usize>>,
    _key: PhantomData<fn() -> K>,
}

impl<T, K: KeyExtractor<T>> KeyedItems<T, K> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            index: OnceCell::new(),
            _key: PhantomData,
        }
    }

    /// Appends `item`. If another item has the same key, lookups now return
    /// the new one.
    pub fn push_back(&mut self, item: T) {
        let position = self.items.len();
        if let Some(index) = self.index.get_mut() {
            index.insert(K::key(&item), position);
        }
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&T> {
        self.items.get(position)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// Mutable access may change keys, so it drops the index.
    pub fn get_mut(&mut self, position: usize) -> Option<&mut T> {
        self.index.take();
        self.items.get_mut(position)
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.index.take();
        self.items.iter_mut()
    }

    fn index(&self) -> &HashMap<K::Key, usize> {
        self.index.get_or_init(|| {
            // Later items overwrite earlier ones: last wins.
            self.items
                .iter()
                .enumerate()
                .map(|(position, item)| (K::key(item), position))
                .collect()
        })
    }

    /// The last item with `key`, if any.
    pub fn find_or_null(&self, key: &K::Key) -> Option<&T> {
        self.index().get(key).map(|position| &self.items[*position])
    }
}

impl<T: Default + Clone, K: KeyExtractor<T>> KeyedItems<T, K> {
    /// The last item with `key`, or an owned zero value.
    pub fn find_or_default(&self, key: &K::Key) -> Cow<'_, T> {
        match self.find_or_null(key) {
            Some(item) => Cow::Borrowed(item),
            None => Cow::Owned(T::default()),
        }
    }
}

impl<T, K: KeyExtractor<T>> Default for KeyedItems<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone, K: KeyExtractor<T>> Clone for KeyedItems<T, K> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            index: self.index.clone(),
            _key: PhantomData,
        }
    }
}

impl<T: fmt::Debug, K: KeyExtractor<T>> fmt::Debug for KeyedItems<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

impl<T: PartialEq, K: KeyExtractor<T>> PartialEq for KeyedItems<T, K> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: Eq, K: KeyExtractor<T>> Eq for KeyedItems<T, K> {}

impl<T, K: KeyExtractor<T>> Index<usize> for KeyedItems<T, K> {
    type Output = T;

    fn index(&self, position: usize) -> &T {
        &self.items[position]
    }
}

impl<T, K: KeyExtractor<T>> From<Vec<T>> for KeyedItems<T, K> {
    fn from(items: Vec<T>) -> Self {
        Self {
            items,
            index: OnceCell::new(),
            _key: PhantomData,
        }
    }
}

impl<T, K: KeyExtractor<T>> FromIterator<T> for KeyedItems<T, K> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a, T, K: KeyExtractor<T>> IntoIterator for &'a KeyedItems<T, K> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T: SkirType, K: KeyExtractor<T>> SkirType for KeyedItems<T, K> {
    fn type_signature() -> TypeSignature {
        TypeSignature::array(T::type_signature(), Some(K::KEY_PATH))
    }
    fn collect_records(records: &mut RecordCollector) {
        T::collect_records(records);
    }
    fn is_default(&self) -> bool {
        self.items.is_empty()
    }
    fn value_eq(&self, other: &Self) -> bool {
        self.items.value_eq(&other.items)
    }
    fn value_hash(&self, state: &mut dyn Hasher) {
        self.items.value_hash(state);
    }
    fn to_json(&self, flavor: JsonFlavor) -> Value {
        self.items.to_json(flavor)
    }
    fn from_json(json: &Value) -> Result<Self, DecodeError> {
        Vec::<T>::from_json(json).map(Self::from)
    }
    fn write_binary(&self, out: &mut BinaryWriter) {
        self.items.write_binary(out);
    }
    fn read_binary(input: &mut BinaryReader<'_>) -> Result<Self, DecodeError> {
        Vec::<T>::read_binary(input).map(Self::from)
    }
    fn accept(&self, visitor: &mut dyn Visitor) {
        self.items.accept(visitor);
    }
    fn accept_mut(&mut self, visitor: &mut dyn VisitorMut) {
        self.index.take();
        self.items.accept_mut(visitor);
    }
}
