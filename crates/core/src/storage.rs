use std::{
    marker::PhantomData,
    ops::{Index, IndexMut},
};

/// Types that map densely onto `usize` and can therefore key a [`KeyedVec`].
pub trait Indexer {
    fn index(&self) -> usize;
}

/// A vector indexed by a typed key rather than by `usize`.
pub struct KeyedVec<Key, Value> {
    key: PhantomData<Key>,
    values: Vec<Value>,
}

impl<Key, Value> KeyedVec<Key, Value> {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> + '_ {
        self.values.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Value> + '_ {
        self.values.iter_mut()
    }
}

impl<Key: Indexer, Value: Default> KeyedVec<Key, Value> {
    /// Make sure `key` can be used to index this vector. New slots get the default value.
    pub fn grow_to(&mut self, key: Key) {
        let minimum_len = key.index() + 1;
        if self.values.len() < minimum_len {
            self.values.resize_with(minimum_len, Value::default);
        }
    }
}

impl<Key, Value> Default for KeyedVec<Key, Value> {
    fn default() -> Self {
        KeyedVec {
            key: PhantomData,
            values: vec![],
        }
    }
}

impl<Key, Value> FromIterator<Value> for KeyedVec<Key, Value> {
    /// The i-th value is stored under the key with index i.
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        KeyedVec {
            key: PhantomData,
            values: iter.into_iter().collect(),
        }
    }
}

impl<Key: Indexer, Value> Index<Key> for KeyedVec<Key, Value> {
    type Output = Value;

    fn index(&self, key: Key) -> &Self::Output {
        &self.values[key.index()]
    }
}

impl<Key: Indexer, Value> IndexMut<Key> for KeyedVec<Key, Value> {
    fn index_mut(&mut self, key: Key) -> &mut Self::Output {
        &mut self.values[key.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    impl Indexer for usize {
        fn index(&self) -> usize {
            *self
        }
    }

    #[test]
    fn growing_fills_with_defaults_and_never_shrinks() {
        let mut values: KeyedVec<usize, u32> = KeyedVec::default();
        values.grow_to(3);
        values[2] = 7;

        values.grow_to(1);

        assert_eq!(4, values.len());
        assert_eq!(vec![0, 0, 7, 0], values.iter().copied().collect::<Vec<_>>());
    }
}
