// Copyright 2025 the Plinth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyed callback registries.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

/// Token returned by [`CallbackSet::add`], used to remove the callback later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CallbackKey(u64);

/// An ordered set of callbacks invoked with a shared argument.
///
/// Callbacks run in registration order. Adding the same closure twice
/// registers it twice; each registration gets its own key.
pub struct CallbackSet<A: ?Sized> {
    next_key: u64,
    /// A callback returning `false` is dropped after that call.
    entries: Vec<(CallbackKey, Box<dyn FnMut(&A) -> bool>)>,
}

impl<A: ?Sized> CallbackSet<A> {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_key: 0,
            entries: Vec::new(),
        }
    }

    /// Registers a callback.
    pub fn add(&mut self, mut callback: impl FnMut(&A) + 'static) -> CallbackKey {
        self.add_while(move |args| {
            callback(args);
            true
        })
    }

    /// Registers a callback that stays registered for as long as it returns
    /// `true`.
    pub fn add_while(&mut self, callback: impl FnMut(&A) -> bool + 'static) -> CallbackKey {
        let key = CallbackKey(self.next_key);
        self.next_key += 1;
        self.entries.push((key, Box::new(callback)));
        key
    }

    /// Removes a callback. Returns `false` if the key was not registered.
    pub fn remove(&mut self, key: CallbackKey) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| *k != key);
        self.entries.len() != before
    }

    /// Invokes every callback with `args`.
    pub fn call_callbacks(&mut self, args: &A) {
        self.entries.retain_mut(|(_, callback)| callback(args));
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every callback.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<A: ?Sized> Default for CallbackSet<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> fmt::Debug for CallbackSet<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackSet")
            .field("len", &self.entries.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;

    use super::*;

    #[test]
    fn calls_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut set = CallbackSet::<u32>::new();
        let a = Rc::clone(&seen);
        set.add(move |v| a.borrow_mut().push(("a", *v)));
        let b = Rc::clone(&seen);
        set.add(move |v| b.borrow_mut().push(("b", *v)));

        set.call_callbacks(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn removed_callbacks_stop_firing() {
        let count = Rc::new(RefCell::new(0));
        let mut set = CallbackSet::<()>::new();
        let c = Rc::clone(&count);
        let key = set.add(move |()| *c.borrow_mut() += 1);

        set.call_callbacks(&());
        assert!(set.remove(key));
        assert!(!set.remove(key), "second removal is a no-op");
        set.call_callbacks(&());

        assert_eq!(*count.borrow(), 1);
        assert!(set.is_empty());
    }

    #[test]
    fn callbacks_can_drop_themselves() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut set = CallbackSet::<u32>::new();
        let s = Rc::clone(&seen);
        set.add_while(move |v| {
            s.borrow_mut().push(*v);
            *v < 2
        });

        for v in 1..=3 {
            set.call_callbacks(&v);
        }
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert!(set.is_empty());
    }
}
