//! Deduplicated, append-only value pools.

use std::borrow::Borrow;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::PoolKind;
use crate::{Error, Result};

/// An append-only table of unique values addressed by index.
///
/// Interning a value that is already present returns the existing index.
/// Tables decoded from a file are taken as-is; if such a table happens to
/// contain duplicates, every position stays addressable and lookups by value
/// return the first occurrence.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    kind: PoolKind,
    items: Vec<T>,
    index: FxHashMap<T, u32>,
}

/// Pool of strings, used for both object names and string values.
pub type StringPool = Pool<String>;

/// Pool of path data blobs.
pub type BlobPool = Pool<Vec<u8>>;

impl<T: Eq + Hash + Clone> Pool<T> {
    /// Create an empty pool.
    pub fn new(kind: PoolKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    /// Build a pool from decoded entries, keeping their positions.
    pub fn from_entries(kind: PoolKind, items: Vec<T>) -> Self {
        let mut index = FxHashMap::default();
        for (i, item) in items.iter().enumerate() {
            index.entry(item.clone()).or_insert(i as u32);
        }
        Self { kind, items, index }
    }

    /// Intern a value, returning its index.
    pub fn intern<Q>(&mut self, value: &Q) -> u32
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = T> + ?Sized,
    {
        if let Some(&i) = self.index.get(value) {
            return i;
        }
        let i = self.items.len() as u32;
        let owned = value.to_owned();
        self.index.insert(owned.clone(), i);
        self.items.push(owned);
        i
    }

    /// Index of a value, if present.
    pub fn find<Q>(&self, value: &Q) -> Option<u32>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(value).copied()
    }

    /// Get an entry by index.
    pub fn get(&self, index: u32) -> Option<&T> {
        self.items.get(index as usize)
    }

    /// Get an entry by index, failing with an out-of-range error.
    pub fn resolve(&self, index: u32) -> Result<&T> {
        self.get(index).ok_or(Error::OutOfRange {
            kind: self.kind,
            index,
            len: self.items.len(),
        })
    }

    /// Fail unless `index` addresses an entry.
    pub fn check(&self, index: u32) -> Result<()> {
        self.resolve(index).map(|_| ())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}
