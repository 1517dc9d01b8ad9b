use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::errors::RecordError;

/// One source row addressed by column name.
///
/// Values are trimmed on construction and blank cells become `None`, so
/// callers never have to tell an empty string apart from a missing value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    columns: Vec<String>,
    values: Vec<Option<String>>,
    index: HashMap<String, usize>,
}

impl SourceRecord {
    pub fn new<C, V>(columns: C, values: V) -> Result<Self, RecordError>
    where
        C: IntoIterator,
        C::Item: Into<String>,
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let values: Vec<Option<String>> = values
            .into_iter()
            .map(|value| normalize(value.as_ref()))
            .collect();

        if columns.len() != values.len() {
            return Err(RecordError::LengthMismatch {
                columns: columns.len(),
                values: values.len(),
            });
        }

        let mut index = HashMap::with_capacity(columns.len());
        for (position, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), position).is_some() {
                return Err(RecordError::DuplicateColumn { name: name.clone() });
            }
        }

        Ok(Self {
            columns,
            values,
            index,
        })
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let (columns, values): (Vec<&str>, Vec<&str>) = pairs.into_iter().unzip();
        Self::new(columns, values)
    }

    /// Value of `name`, or `None` when the column is absent or blank.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.index
            .get(name)
            .and_then(|&position| self.values[position].as_deref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.columns
            .iter()
            .zip(self.values.iter())
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|err| format!("<unserializable: {err}>"))
    }
}

impl Serialize for SourceRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
