//! # Handles
//!
//! Opaque handles and the arena-style tables that own what they name.
//!
//! Handles come from a single monotonic counter shared by a registry and
//! all of its contexts, so a handle is never reused and never names two
//! objects. A component handle presented to the wrong context is simply
//! absent from that context's table.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// HANDLE TYPES
// =============================================================================

/// Opaque handle naming a [`crate::Context`].
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContextHandle(u64);

/// Opaque handle naming a [`crate::ConnectedComponent`].
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentHandle(u64);

macro_rules! raw_handle {
    ($name:ident) => {
        impl $name {
            /// Wraps a raw handle value received from a client.
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// Returns the raw value handed to clients.
            pub const fn raw(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:#x}", self.0)
            }
        }
    };
}

raw_handle!(ContextHandle);
raw_handle!(ComponentHandle);

/// Monotonic source of raw handle values. Zero is never produced.
#[derive(Debug)]
pub struct HandleMint {
    next: AtomicU64,
}

impl HandleMint {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Returns a value never returned before by this mint.
    pub fn mint(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for HandleMint {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// HANDLE TABLE
// =============================================================================

/// Dense storage of owned values addressed by handle.
///
/// Values live in a slot vector; an ordered index maps each handle to its
/// slot. Freed slots are recycled, handles are not. Iteration follows
/// ascending handle order, which is creation order.
#[derive(Debug)]
pub struct HandleTable<H, T> {
    index: BTreeMap<H, usize>,
    slots: Vec<Option<T>>,
    free: Vec<usize>,
}

impl<H: Ord + Copy, T> HandleTable<H, T> {
    pub fn new() -> Self {
        Self {
            index: BTreeMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Stores `value` under `handle`, returning any value it replaces.
    pub fn insert(&mut self, handle: H, value: T) -> Option<T> {
        if let Some(&slot) = self.index.get(&handle) {
            return self.slots[slot].replace(value);
        }
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(value);
                slot
            }
            None => {
                self.slots.push(Some(value));
                self.slots.len() - 1
            }
        };
        self.index.insert(handle, slot);
        None
    }

    pub fn get(&self, handle: H) -> Option<&T> {
        self.index
            .get(&handle)
            .and_then(|&slot| self.slots[slot].as_ref())
    }

    pub fn contains(&self, handle: H) -> bool {
        self.index.contains_key(&handle)
    }

    /// Removes and returns the value stored under `handle`.
    pub fn remove(&mut self, handle: H) -> Option<T> {
        let slot = self.index.remove(&handle)?;
        self.free.push(slot);
        self.slots[slot].take()
    }

    /// Removes every value, returning them in handle order.
    pub fn drain(&mut self) -> Vec<T> {
        let index = std::mem::take(&mut self.index);
        let drained = index
            .into_values()
            .filter_map(|slot| self.slots[slot].take())
            .collect();
        self.slots.clear();
        self.free.clear();
        drained
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterates over `(handle, value)` pairs in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (H, &T)> + '_ {
        self.index
            .iter()
            .filter_map(|(&handle, &slot)| self.slots[slot].as_ref().map(|v| (handle, v)))
    }
}

impl<H: Ord + Copy, T> Default for HandleTable<H, T> {
    fn default() -> Self {
        Self::new()
    }
}
