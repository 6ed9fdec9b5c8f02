use fnv::FnvBuildHasher;
use std::{
    collections::HashMap,
    ops::{Index, IndexMut},
};

/// A named section of a CiA 306 file
///
/// The section keeps its keys in the order in which they were first seen.
/// Keys are compared case-insensitively; setting an existing key replaces its
/// value but keeps the original position and spelling of the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    // key/value pairs in insertion order
    entries: Vec<(String, String)>,
    // mapping from the lowercased key to the position in entries
    map: HashMap<String, usize, FnvBuildHasher>,
}

/// An ordered collection of sections
///
/// A `SectionMap` stores sections in the order in which they were first seen and
/// allows fast case-insensitive access to a section by its name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap {
    // storage for sections
    sections: Vec<Section>,
    // mapping from the lowercased section name to the position in the sections vector
    map: HashMap<String, usize, FnvBuildHasher>,
}

impl Section {
    /// create a new, empty section
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
            map: HashMap::default(),
        }
    }

    /// get the name of the section, as it was spelled when the section was created
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// get the value of a key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        let pos = self.map.get(&key.to_ascii_lowercase())?;
        Some(&self.entries[*pos].1)
    }

    /// Checks if the section contains the given key
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.map.contains_key(&key.to_ascii_lowercase())
    }

    /// set the value of a key
    ///
    /// If the key already exists its value is replaced; the last write wins.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        let lowercase = key.to_ascii_lowercase();
        if let Some(pos) = self.map.get(&lowercase) {
            self.entries[*pos].1 = value;
        } else {
            self.map.insert(lowercase, self.entries.len());
            self.entries.push((key, value));
        }
    }

    /// remove a key from the section and return its value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.map.remove(&key.to_ascii_lowercase())?;
        let (_, value) = self.entries.remove(pos);
        // every key behind the removed one moved down by one position
        for idx in self.map.values_mut() {
            if *idx > pos {
                *idx -= 1;
            }
        }
        Some(value)
    }

    /// Returns an iterator over the key/value pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of keys in the section
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if the section has no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SectionMap {
    /// create a new, empty `SectionMap`
    #[must_use]
    pub fn new() -> Self {
        Self {
            sections: Vec::new(),
            map: HashMap::default(),
        }
    }

    /// get a section by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Section> {
        let pos = self.map.get(&name.to_ascii_lowercase())?;
        Some(&self.sections[*pos])
    }

    /// get a mutable reference to a section by name
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Section> {
        let pos = self.map.get(&name.to_ascii_lowercase())?;
        Some(&mut self.sections[*pos])
    }

    /// get the position of a section by name
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.map.get(&name.to_ascii_lowercase()).copied()
    }

    /// Checks if the `SectionMap` contains a section with the given name
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(&name.to_ascii_lowercase())
    }

    /// get a section by name, creating it at the end of the map if it does not exist yet
    pub fn get_or_insert(&mut self, name: &str) -> &mut Section {
        let lowercase = name.to_ascii_lowercase();
        let pos = match self.map.get(&lowercase) {
            Some(pos) => *pos,
            None => {
                let pos = self.sections.len();
                self.map.insert(lowercase, pos);
                self.sections.push(Section::new(name));
                pos
            }
        };
        &mut self.sections[pos]
    }

    /// add a section to the map
    ///
    /// If a section with the same name already exists, the keys of the new
    /// section are merged into it and the existing section keeps its position.
    pub fn push(&mut self, section: Section) {
        let lowercase = section.name.to_ascii_lowercase();
        if let Some(pos) = self.map.get(&lowercase) {
            let existing = &mut self.sections[*pos];
            for (key, value) in section.entries {
                existing.insert(key, value);
            }
        } else {
            self.map.insert(lowercase, self.sections.len());
            self.sections.push(section);
        }
    }

    /// remove a section from the map by name and return it
    pub fn remove(&mut self, name: &str) -> Option<Section> {
        let pos = self.map.remove(&name.to_ascii_lowercase())?;
        let section = self.sections.remove(pos);
        for idx in self.map.values_mut() {
            if *idx > pos {
                *idx -= 1;
            }
        }
        Some(section)
    }

    /// Returns an iterator over the sections in the order in which they were first seen
    pub fn iter(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Returns an iterator over the section names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(Section::name)
    }

    /// Returns the number of sections
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Checks if the `SectionMap` is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Index<usize> for SectionMap {
    type Output = Section;

    fn index(&self, index: usize) -> &Self::Output {
        &self.sections[index]
    }
}

impl IndexMut<usize> for SectionMap {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.sections[index]
    }
}

impl<'a> IntoIterator for &'a SectionMap {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}

impl FromIterator<Section> for SectionMap {
    fn from_iter<I: IntoIterator<Item = Section>>(iter: I) -> Self {
        let mut map = SectionMap::new();
        for section in iter {
            map.push(section);
        }
        map
    }
}
