//! Ordered bind-parameter set.
//!
//! Names are stored without the dialect prefix. Generated names have the form
//! `<property>_<n>`, where `n` is the number of parameters already bound, so two
//! comparisons against the same property never share a name. A property starting with
//! a digit gets a `p` prefix so the name still reads as a placeholder (`1st` binds as
//! `p1st_0`).

use sea_query::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, Value)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value for `property` under a freshly generated name and return that name.
    pub fn bind(&mut self, property: &str, value: Value) -> String {
        let mut name: String = property
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        if name.starts_with(|c: char| c.is_ascii_digit()) {
            name.insert(0, 'p');
        }
        name.push('_');
        name.push_str(&self.entries.len().to_string());
        self.entries.push((name.clone(), value));
        name
    }

    /// Bind under an explicit name, replacing any value already bound to it.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl IntoIterator for Parameters {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
