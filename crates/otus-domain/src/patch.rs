//! Tri-state field updates
//!
//! A partial update must distinguish "leave unchanged" from "clear". `Patch`
//! makes the three cases explicit:
//!
//! | JSON            | Patch          | effect         |
//! |-----------------|----------------|----------------|
//! | field missing   | `Absent`       | unchanged      |
//! | `null`          | `Null`         | cleared        |
//! | value           | `Value(v)`     | set to `v`     |
//!
//! Fields of this type need `#[serde(default)]` so that a missing key
//! deserialises to `Absent`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn is_present(&self) -> bool {
        !self.is_absent()
    }

    pub fn as_ref(&self) -> Patch<&T> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(v),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Patch<U> {
        match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(f(v)),
        }
    }

    /// Fallible map, used to validate raw input before any I/O
    pub fn try_map<U, E, F: FnOnce(T) -> Result<U, E>>(self, f: F) -> Result<Patch<U>, E> {
        Ok(match self {
            Patch::Absent => Patch::Absent,
            Patch::Null => Patch::Null,
            Patch::Value(v) => Patch::Value(f(v)?),
        })
    }

    /// The value a slot holding `current` has after this patch
    pub fn resolve(self, current: Option<T>) -> Option<T> {
        match self {
            Patch::Absent => current,
            Patch::Null => None,
            Patch::Value(v) => Some(v),
        }
    }

    /// `None` = absent, `Some(None)` = clear, `Some(Some(v))` = set
    pub fn into_option(self) -> Option<Option<T>> {
        match self {
            Patch::Absent => None,
            Patch::Null => Some(None),
            Patch::Value(v) => Some(Some(v)),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        }
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Value(v) => serializer.serialize_some(v),
            Patch::Absent | Patch::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Update {
        #[serde(default)]
        description: Patch<String>,
    }

    #[test]
    fn test_missing_field_is_absent() {
        let update: Update = serde_json::from_str("{}").unwrap();
        assert_eq!(update.description, Patch::Absent);
    }

    #[test]
    fn test_null_field_clears() {
        let update: Update = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(update.description, Patch::Null);
    }

    #[test]
    fn test_value_field_sets() {
        let update: Update = serde_json::from_str(r#"{"description": "x"}"#).unwrap();
        assert_eq!(update.description, Patch::Value("x".to_string()));
    }

    #[test]
    fn test_resolve() {
        assert_eq!(Patch::Absent.resolve(Some(1)), Some(1));
        assert_eq!(Patch::<i32>::Null.resolve(Some(1)), None);
        assert_eq!(Patch::Value(2).resolve(Some(1)), Some(2));
    }

    #[test]
    fn test_try_map_propagates_error() {
        let patch: Patch<&str> = Patch::Value("x");
        let result: Result<Patch<i32>, String> = patch.try_map(|_| Err("bad".to_string()));
        assert_eq!(result, Err("bad".to_string()));
        let absent: Patch<&str> = Patch::Absent;
        assert_eq!(absent.try_map(|_| Err::<i32, _>("bad")), Ok(Patch::Absent));
    }
}
