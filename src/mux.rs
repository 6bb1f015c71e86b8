//! Fan-out over a list of values.
//!
//! A [`Multiplex`] applies an operation to every element and wraps the
//! results, so chains like
//! `blob.mp_split(..)?.truncate(..)?.split(..)?.flatten()` read left to right.

use crate::address::{Address, Locator};
use crate::blob::Blob;
use crate::error::Result;
use crate::split::Split;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Multiplex<T> {
    items: Vec<T>,
}

impl<T> Multiplex<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Multiplex<U> {
        Multiplex::new(self.items.iter().map(f).collect())
    }

    /// Like [`Multiplex::map`], stopping at the first error.
    pub fn try_map<U>(&self, f: impl FnMut(&T) -> Result<U>) -> Result<Multiplex<U>> {
        Ok(Multiplex::new(self.items.iter().map(f).collect::<Result<_>>()?))
    }
}

impl Multiplex<Blob> {
    pub fn split(&self, split: &Split) -> Result<Multiplex<Vec<Blob>>> {
        self.try_map(|b| b.split(split))
    }

    pub fn offset(&self, locator: impl Into<Locator>) -> Result<Multiplex<Blob>> {
        let locator = locator.into();
        self.try_map(|b| b.offset(locator.clone()))
    }

    pub fn truncate(&self, locator: impl Into<Locator>) -> Result<Multiplex<Blob>> {
        let locator = locator.into();
        self.try_map(|b| b.truncate(locator.clone()))
    }

    pub fn xor(&self, other: &Blob) -> Multiplex<Blob> {
        self.map(|b| b.xor(other))
    }

    pub fn rol(&self, amount: Address) -> Multiplex<Blob> {
        self.map(|b| b.rol(amount))
    }

    pub fn size_bits(&self) -> Multiplex<usize> {
        self.map(Blob::size_bits)
    }
}

impl<T> Multiplex<Vec<T>> {
    pub fn flatten(self) -> Multiplex<T> {
        Multiplex::new(self.items.into_iter().flatten().collect())
    }
}

impl<T> FromIterator<T> for Multiplex<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for Multiplex<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Multiplex<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Blob {
    /// [`Blob::split`], wrapped for fan-out.
    pub fn mp_split(&self, split: &Split) -> Result<Multiplex<Blob>> {
        Ok(Multiplex::new(self.split(split)?))
    }
}
