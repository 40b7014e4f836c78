//! Growable array charged against an [`Arena`] budget.

use std::mem;

use crate::arena::Arena;
use crate::error::Result;

/// Contiguous sequence of elements with doubling growth.
///
/// Capacity is reserved up front and every grow charges the arena before any
/// element moves, so a failed push leaves the array exactly as it was.
#[derive(Debug)]
pub struct GrowableArray<'a, T> {
    arena: &'a Arena,
    capacity: usize,
    elts: Vec<T>,
}

impl<'a, T> GrowableArray<'a, T> {
    /// Create an array with room for `capacity` elements.
    pub fn create(arena: &'a Arena, capacity: usize) -> Result<Self> {
        let capacity = capacity.max(1);
        arena.charge(capacity * mem::size_of::<T>())?;
        Ok(Self {
            arena,
            capacity,
            elts: Vec::with_capacity(capacity),
        })
    }

    /// Append one element, growing to twice the current capacity when full.
    pub fn push(&mut self, value: T) -> Result<&mut T> {
        if self.elts.len() == self.capacity {
            self.grow(1)?;
        }
        self.elts.push(value);
        let last = self.elts.len() - 1;
        Ok(&mut self.elts[last])
    }

    /// Append a run of elements, growing to `2 * max(n, capacity)` if they
    /// do not fit. Returns the newly written slots.
    pub fn push_n(&mut self, values: &[T]) -> Result<&mut [T]>
    where
        T: Clone,
    {
        if self.elts.len() + values.len() > self.capacity {
            self.grow(values.len())?;
        }
        let start = self.elts.len();
        self.elts.extend_from_slice(values);
        Ok(&mut self.elts[start..])
    }

    fn grow(&mut self, demand: usize) -> Result<()> {
        let new_capacity = 2 * demand.max(self.capacity);
        // Charge the fresh buffer first; the old one's charge stays with the
        // arena until the arena itself is released.
        self.arena.charge(new_capacity * mem::size_of::<T>())?;
        let mut grown = Vec::with_capacity(new_capacity);
        grown.append(&mut self.elts);
        self.elts = grown;
        self.capacity = new_capacity;
        Ok(())
    }

    /// Release the array and refund its current buffer charge.
    ///
    /// Purely an accounting optimization: dropping the array instead leaves
    /// the charge until the arena goes away, which is equally valid.
    pub fn destroy(self) {
        self.arena.refund(self.capacity * mem::size_of::<T>());
    }

    /// Give up the arena accounting and keep the elements.
    pub fn into_vec(self) -> Vec<T> {
        self.elts
    }

    pub fn len(&self) -> usize {
        self.elts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elts.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.elts.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.elts.get_mut(index)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.elts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elts.iter()
    }
}
