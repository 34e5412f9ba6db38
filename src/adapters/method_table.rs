//! Per-method slots for engines that only route on the path.

use crate::fixtures::Method;

/// One slot per HTTP method, indexed without hashing.
#[derive(Debug)]
pub struct MethodTable<T> {
    slots: [Option<T>; Method::COUNT],
}

impl<T> MethodTable<T> {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }

    pub fn get(&self, method: Method) -> Option<&T> {
        self.slots[method.index()].as_ref()
    }

    pub fn get_or_insert_with(&mut self, method: Method, init: impl FnOnce() -> T) -> &mut T {
        self.slots[method.index()].get_or_insert_with(init)
    }

    /// Populated slots with their method.
    pub fn iter(&self) -> impl Iterator<Item = (Method, &T)> {
        Method::ALL
            .iter()
            .filter_map(|&method| self.get(method).map(|value| (method, value)))
    }
}

impl<T> Default for MethodTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
