//! Per-context string dictionaries.
//!
//! The dictionaries are never transmitted. Both sides assign indices in the
//! order strings are first seen, so they stay isomorphic as long as writes and
//! reads are issued in the same sequence.

use std::collections::HashMap;

use crate::error::{MarshalError, Result};

/// Write-side dictionary: string to index.
#[derive(Debug, Default)]
pub struct WriteDictionary {
    indices: HashMap<String, i32>,
}

impl WriteDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index previously assigned to `s`, if any.
    pub fn index_of(&self, s: &str) -> Option<i32> {
        self.indices.get(s).copied()
    }

    /// Assign the next index to a string not yet in the dictionary.
    pub fn insert(&mut self, s: &str) -> Result<i32> {
        let next = next_index(self.indices.len())?;
        self.indices.insert(s.to_owned(), next);
        Ok(next)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Read-side dictionary: index to string, filled in read order.
#[derive(Debug, Default)]
pub struct ReadDictionary {
    strings: Vec<String>,
}

impl ReadDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// String introduced at `index`.
    pub fn get(&self, index: i32) -> Result<&str> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.strings.get(i))
            .map(String::as_str)
            .ok_or(MarshalError::UnknownSharedString(index))
    }

    /// Record a newly introduced string at the next index.
    pub fn push(&mut self, s: String) -> Result<i32> {
        let next = next_index(self.strings.len())?;
        self.strings.push(s);
        Ok(next)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

fn next_index(len: usize) -> Result<i32> {
    match i32::try_from(len) {
        Ok(next) if next < i32::MAX => Ok(next),
        _ => Err(MarshalError::TooManyStrings),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_assigned_in_order() {
        let mut dict = WriteDictionary::new();
        assert!(dict.is_empty());

        assert_eq!(dict.insert("a").unwrap(), 0);
        assert_eq!(dict.insert("b").unwrap(), 1);
        assert_eq!(dict.index_of("a"), Some(0));
        assert_eq!(dict.index_of("b"), Some(1));
        assert_eq!(dict.index_of("c"), None);
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn read_side_mirrors_write_side() {
        let mut write = WriteDictionary::new();
        let mut read = ReadDictionary::new();

        for s in ["alpha", "beta", "gamma"] {
            let w = write.insert(s).unwrap();
            let r = read.push(s.to_owned()).unwrap();
            assert_eq!(w, r);
        }

        assert_eq!(read.get(1).unwrap(), "beta");
        assert_eq!(read.len(), write.len());
    }

    #[test]
    fn unknown_index_is_an_error() {
        let mut read = ReadDictionary::new();
        read.push("only".to_owned()).unwrap();

        assert!(matches!(
            read.get(1),
            Err(MarshalError::UnknownSharedString(1))
        ));
        assert!(matches!(
            read.get(-5),
            Err(MarshalError::UnknownSharedString(-5))
        ));
    }

    #[test]
    fn exhaustion_is_reported() {
        assert_eq!(next_index(0).unwrap(), 0);
        assert_eq!(next_index(i32::MAX as usize - 1).unwrap(), i32::MAX - 1);
        assert!(matches!(
            next_index(i32::MAX as usize),
            Err(MarshalError::TooManyStrings)
        ));
    }
}
