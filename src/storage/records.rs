// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Generic record store for the clinical collections.
//!
//! The clinic CRUD surface is not this service's concern; it only needs
//! by-id lookup, filtered lookup, insert, update and delete to resolve
//! ownership and scope listings.

use std::collections::HashMap;

use super::{StoreError, StoreResult};

/// A row with a stable string id.
pub trait Record: Clone {
    /// Name used in not-found errors.
    const KIND: &'static str;

    fn id(&self) -> &str;
}

/// Record store contract.
pub trait RecordStore<T: Record> {
    fn get(&self, id: &str) -> StoreResult<T>;

    fn filter<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool;

    /// Conflict if the id is already present.
    fn insert(&mut self, record: T) -> StoreResult<T>;

    /// Replace the row with the same id.
    fn update(&mut self, record: T) -> StoreResult<T>;

    fn remove(&mut self, id: &str) -> StoreResult<T>;

    fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        self.filter(predicate).len()
    }
}

/// HashMap-backed table.
#[derive(Debug)]
pub struct Table<T> {
    rows: HashMap<String, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }
}

impl<T: Record> Table<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rows.contains_key(id)
    }

    /// Borrowing iterator, unordered.
    pub fn rows(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }
}

impl<T: Record> RecordStore<T> for Table<T> {
    fn get(&self, id: &str) -> StoreResult<T> {
        self.rows
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(T::KIND, id))
    }

    fn filter<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        let mut rows: Vec<T> = self.rows.values().filter(|r| predicate(r)).cloned().collect();
        rows.sort_by(|a, b| a.id().cmp(b.id()));
        rows
    }

    fn insert(&mut self, record: T) -> StoreResult<T> {
        if self.rows.contains_key(record.id()) {
            return Err(StoreError::Conflict(format!(
                "{} {} already exists",
                T::KIND,
                record.id()
            )));
        }
        self.rows.insert(record.id().to_string(), record.clone());
        Ok(record)
    }

    fn update(&mut self, record: T) -> StoreResult<T> {
        match self.rows.get_mut(record.id()) {
            Some(row) => {
                *row = record.clone();
                Ok(record)
            }
            None => Err(StoreError::not_found(T::KIND, record.id())),
        }
    }

    fn remove(&mut self, id: &str) -> StoreResult<T> {
        self.rows
            .remove(id)
            .ok_or_else(|| StoreError::not_found(T::KIND, id))
    }

    fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        self.rows.values().filter(|r| predicate(r)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: String,
        n: u32,
    }

    impl Record for Row {
        const KIND: &'static str = "Row";
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn row(id: &str, n: u32) -> Row {
        Row { id: id.into(), n }
    }

    #[test]
    fn crud_cycle() {
        let mut table = Table::new();
        table.insert(row("a", 1)).unwrap();
        table.insert(row("b", 2)).unwrap();
        assert!(matches!(table.insert(row("a", 9)), Err(StoreError::Conflict(_))));

        assert_eq!(table.get("a").unwrap().n, 1);
        table.update(row("a", 5)).unwrap();
        assert_eq!(table.get("a").unwrap().n, 5);
        assert!(matches!(table.update(row("z", 0)), Err(StoreError::NotFound { .. })));

        assert_eq!(table.filter(|r| r.n > 1).len(), 2);
        assert_eq!(table.count(|r| r.n == 2), 1);

        table.remove("a").unwrap();
        assert!(!table.contains("a"));
        assert_eq!(
            table.get("a"),
            Err(StoreError::NotFound { resource: "Row", id: "a".into() })
        );
    }

    #[test]
    fn filter_is_ordered_by_id() {
        let mut table = Table::new();
        for id in ["c", "a", "b"] {
            table.insert(row(id, 0)).unwrap();
        }
        let ids: Vec<String> = table.filter(|_| true).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }
}
