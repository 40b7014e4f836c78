//! Segmented append-only list.
//!
//! Elements are stored in fixed-capacity segments that are never resized or
//! compacted, so an element's address never changes once pushed. Callers may
//! hold references across later pushes (re-borrowed through the list) and
//! hand out indices that stay valid for the list's lifetime.

use std::mem;

use crate::arena::Arena;
use crate::error::Result;

#[derive(Debug)]
pub struct SegmentedList<'a, T> {
    arena: &'a Arena,
    segment_capacity: usize,
    // Each segment is pre-allocated at `segment_capacity` and filled in
    // order; only the last segment is ever partially full.
    segments: Vec<Vec<T>>,
    len: usize,
}

impl<'a, T> SegmentedList<'a, T> {
    /// Create a list whose segments hold `segment_capacity` elements each.
    pub fn new(arena: &'a Arena, segment_capacity: usize) -> Result<Self> {
        let segment_capacity = segment_capacity.max(1);
        arena.charge(segment_capacity * mem::size_of::<T>())?;
        Ok(Self {
            arena,
            segment_capacity,
            segments: vec![Vec::with_capacity(segment_capacity)],
            len: 0,
        })
    }

    /// Append an element, chaining a fresh segment when the current one is
    /// full. Existing elements never move.
    pub fn push(&mut self, value: T) -> Result<&mut T> {
        let need_segment = match self.segments.last() {
            Some(segment) => segment.len() == self.segment_capacity,
            None => true,
        };
        if need_segment {
            self.arena
                .charge(self.segment_capacity * mem::size_of::<T>())?;
            self.segments.push(Vec::with_capacity(self.segment_capacity));
        }
        let current = self.segments.len() - 1;
        let segment = &mut self.segments[current];
        segment.push(value);
        self.len += 1;
        let last = segment.len() - 1;
        Ok(&mut segment[last])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.segments
            .get(index / self.segment_capacity)?
            .get(index % self.segment_capacity)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.segments
            .get_mut(index / self.segment_capacity)?
            .get_mut(index % self.segment_capacity)
    }

    /// Iterate each segment's elements in append order, then the next
    /// segment, until the chain ends.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.segments.iter().flatten()
    }
}

impl<'a, T> IntoIterator for SegmentedList<'a, T> {
    type Item = T;
    type IntoIter = std::iter::Flatten<std::vec::IntoIter<Vec<T>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.into_iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_iterate_across_segments() {
        let arena = Arena::unbounded();
        let mut list = SegmentedList::new(&arena, 4).unwrap();
        for i in 0..11u32 {
            list.push(i).unwrap();
        }
        assert_eq!(list.len(), 11);
        let collected: Vec<u32> = list.iter().copied().collect();
        assert_eq!(collected, (0..11).collect::<Vec<u32>>());
    }

    #[test]
    fn test_element_addresses_survive_later_pushes() {
        let arena = Arena::unbounded();
        let mut list = SegmentedList::new(&arena, 4).unwrap();
        let mut addresses = Vec::new();
        for i in 0..13u64 {
            let slot = list.push(i).unwrap();
            addresses.push(slot as *const u64 as usize);
        }
        for (i, &addr) in addresses.iter().enumerate() {
            let current = list.get(i).map(|v| v as *const u64 as usize);
            assert_eq!(current, Some(addr), "element {} moved", i);
        }
    }

    #[test]
    fn test_get_mut_updates_in_place() {
        let arena = Arena::unbounded();
        let mut list = SegmentedList::new(&arena, 2).unwrap();
        for i in 0..5i32 {
            list.push(i).unwrap();
        }
        *list.get_mut(3).unwrap() = 30;
        assert_eq!(list.get(3), Some(&30));
        assert_eq!(list.get(5), None);
    }

    #[test]
    fn test_into_iter_preserves_order() {
        let arena = Arena::unbounded();
        let mut list = SegmentedList::new(&arena, 3).unwrap();
        for s in ["a", "b", "c", "d"] {
            list.push(s.to_string()).unwrap();
        }
        let collected: Vec<String> = list.into_iter().collect();
        assert_eq!(collected, ["a", "b", "c", "d"]);
    }

    #[test]
    fn test_new_segment_charge_failure_keeps_list_valid() {
        let arena = Arena::new(2 * mem::size_of::<u64>());
        let mut list = SegmentedList::new(&arena, 2).unwrap();
        list.push(1u64).unwrap();
        list.push(2u64).unwrap();
        assert!(list.push(3u64).is_err());
        assert_eq!(list.len(), 2);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), [1, 2]);
    }
}
