use rustc_hash::FxHashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::Id;

/// Typed position of an entity inside its owning [`Collection`].
///
/// An `Idx` is a non-owning back-reference: it stays valid after other
/// entities are removed, and resolves to `None` once its own target is gone.
pub struct Idx<T> {
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Idx<T> {
    fn new(index: usize) -> Self {
        Self {
            index: index as u32,
            _marker: PhantomData,
        }
    }

    pub fn get(self) -> usize {
        self.index as usize
    }
}

impl<T> Clone for Idx<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Idx<T> {}

impl<T> PartialEq for Idx<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Idx<T> {}

impl<T> PartialOrd for Idx<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Idx<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

impl<T> Hash for Idx<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Idx<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Idx({})", self.index)
    }
}

/// Entities stored in a [`Collection`] expose their identifier.
pub trait Identified {
    fn id(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("identifier '{0}' already present")]
pub struct DuplicateId(pub Id);

/// Arena of entities addressed by [`Idx`] and looked up by identifier.
///
/// Removal leaves a vacant slot so that indices held by other entities never
/// shift onto a different entity.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<Option<T>>,
    ids: FxHashMap<Id, Idx<T>>,
    len: usize,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            ids: FxHashMap::default(),
            len: 0,
        }
    }
}

impl<T: Identified> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, item: T) -> Result<Idx<T>, DuplicateId> {
        let id = Id::from(item.id());
        if self.ids.contains_key(&id) {
            return Err(DuplicateId(id));
        }
        let idx = Idx::new(self.items.len());
        self.items.push(Some(item));
        self.ids.insert(id, idx);
        self.len += 1;
        Ok(idx)
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.ids.contains_key(id)
    }

    pub fn idx(&self, id: &str) -> Option<Idx<T>> {
        self.ids.get(id).copied()
    }

    pub fn get(&self, idx: Idx<T>) -> Option<&T> {
        self.items.get(idx.get()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, idx: Idx<T>) -> Option<&mut T> {
        self.items.get_mut(idx.get()).and_then(Option::as_mut)
    }

    pub fn get_by_id(&self, id: &str) -> Option<&T> {
        self.idx(id).and_then(|idx| self.get(idx))
    }

    pub fn get_by_id_mut(&mut self, id: &str) -> Option<&mut T> {
        let idx = self.idx(id)?;
        self.get_mut(idx)
    }

    pub fn remove(&mut self, idx: Idx<T>) -> Option<T> {
        let item = self.items.get_mut(idx.get()).and_then(Option::take)?;
        self.ids.remove(item.id());
        self.len -= 1;
        Some(item)
    }

    pub fn remove_by_id(&mut self, id: &str) -> Option<T> {
        let idx = self.idx(id)?;
        self.remove(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Idx<T>, &T)> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| item.as_ref().map(|item| (Idx::new(index), item)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Idx<T>, &mut T)> {
        self.items
            .iter_mut()
            .enumerate()
            .filter_map(|(index, item)| item.as_mut().map(|item| (Idx::new(index), item)))
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter_map(Option::as_ref)
    }

    /// Removes every entity for which `keep` returns false and returns them.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<T>
    where
        F: FnMut(Idx<T>, &T) -> bool,
    {
        let mut removed = Vec::new();
        for index in 0..self.items.len() {
            let idx = Idx::new(index);
            let drop = matches!(&self.items[index], Some(item) if !keep(idx, item));
            if drop {
                if let Some(item) = self.remove(idx) {
                    removed.push(item);
                }
            }
        }
        removed
    }
}
