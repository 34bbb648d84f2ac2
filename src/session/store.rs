//! A small observable value. Writes go through `set` and every
//! listener runs synchronously after the new value is in place.

use std::fmt;

pub type Listener<T> = Box<dyn Fn(&T) + Send + Sync>;

pub struct Store<T> {
    value: T,
    listeners: Vec<Listener<T>>,
}

impl<T: Clone> Store<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            listeners: Vec::new(),
        }
    }

    pub fn get(&self) -> T {
        self.value.clone()
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        for listener in &self.listeners {
            listener(&self.value);
        }
    }

    pub fn subscribe(&mut self, listener: impl Fn(&T) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }
}

impl<T: Clone + Default> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Store")
            .field("value", &self.value)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
