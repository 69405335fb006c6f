use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A generational handle to a value stored in an [`Arena`].
///
/// Compact u32 index + generation. A handle whose slot has been freed (and possibly
/// reused) no longer resolves, so staleness is detected instead of dereferenced.
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// Create a handle from raw parts (mainly for testing).
    pub fn from_raw(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// The slot index of this handle.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The generation of this handle (incremented on slot reuse).
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({}v{})", self.index, self.generation)
    }
}

impl<T> fmt::Display for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Stores values in recycled slots with generational tracking.
pub struct Arena<T> {
    generations: Vec<u32>,
    values: Vec<Option<T>>,
    free_list: Vec<u32>,
    len: usize,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            generations: Vec::new(),
            values: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Insert a value, reusing a freed slot if available.
    pub fn insert(&mut self, value: T) -> Handle<T> {
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            self.values[index as usize] = Some(value);
            Handle::from_raw(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.values.push(Some(value));
            Handle::from_raw(index, 0)
        }
    }

    /// Remove the value behind a handle. Returns `None` if the handle is stale.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        if !self.contains(handle) {
            return None;
        }
        let idx = handle.index as usize;
        let value = self.values[idx].take();
        self.generations[idx] += 1;
        self.free_list.push(handle.index);
        self.len -= 1;
        value
    }

    /// Check if a handle still refers to a live value.
    pub fn contains(&self, handle: Handle<T>) -> bool {
        let idx = handle.index as usize;
        idx < self.values.len()
            && self.values[idx].is_some()
            && self.generations[idx] == handle.generation
    }

    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        if !self.contains(handle) {
            return None;
        }
        self.values[handle.index as usize].as_ref()
    }

    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        if !self.contains(handle) {
            return None;
        }
        self.values[handle.index as usize].as_mut()
    }

    /// Number of live values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no live values.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena").field("len", &self.len).finish()
    }
}
