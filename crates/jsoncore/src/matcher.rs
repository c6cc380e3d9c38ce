//! Matching property names against a vocabulary fixed in advance.
//!
//! A [`NameMatcher`] is built once, for example per record type, and maps
//! each name to its position in the vocabulary. Lookups work directly on the
//! quads of the input bytes, so a parser can resolve a field without
//! decoding or allocating the name.
//!
//! ```rust
//! use jsoncore::{NameMatch, NameMatcher};
//!
//! let matcher = NameMatcher::from_names(&["id", "name", "tags"]);
//! assert_eq!(matcher.match_name("name"), NameMatch::Index(1));
//! assert_eq!(matcher.match_name("other"), NameMatch::UnknownName);
//! ```

use crate::sym::{Quads, calc_hash, pack_quads, quads::pack_into};

/// Outcome of matching the next token against a vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameMatch {
    /// The name at this index of the vocabulary.
    Index(usize),
    /// The current object ended instead.
    EndObject,
    /// A property name outside the vocabulary.
    UnknownName,
    /// A token that is neither a name nor an end of object.
    OddToken,
}

impl NameMatch {
    #[must_use]
    pub fn index(self) -> Option<usize> {
        match self {
            NameMatch::Index(ix) => Some(ix),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    hash: u32,
    byte_len: u32,
    quad_start: u32,
    quad_len: u32,
    index: u32,
}

/// Open-addressed lookup from names to vocabulary indices.
#[derive(Debug, Clone)]
struct QuadTable {
    mask: usize,
    /// Primary slots followed by half as many secondary slots.
    slots: Vec<Option<Entry>>,
    spill: Vec<Entry>,
    quads: Vec<u32>,
}

fn primary_size(n: usize) -> usize {
    match n {
        0..=5 => 8,
        6..=11 => 16,
        12..=23 => 32,
        _ => {
            let needed = n + (n >> 2) + (n >> 4);
            needed.next_power_of_two().max(64)
        }
    }
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

impl QuadTable {
    fn build<'a>(names: impl Iterator<Item = (usize, &'a str)> + Clone) -> Self {
        let cap = primary_size(names.clone().count());
        let mut table = Self {
            mask: cap - 1,
            slots: vec![None; cap + (cap >> 1)],
            spill: Vec::new(),
            quads: Vec::new(),
        };
        for (index, name) in names {
            let quads = pack_quads(name.as_bytes());
            if table.find(&quads, name.len()).is_some() {
                // Duplicates keep the first index.
                continue;
            }
            let hash = calc_hash(0, &quads);
            let entry = Entry {
                hash,
                byte_len: to_u32(name.len()),
                quad_start: to_u32(table.quads.len()),
                quad_len: to_u32(quads.len()),
                index: to_u32(index),
            };
            table.quads.extend_from_slice(&quads);
            let ix = hash as usize & table.mask;
            let ix2 = cap + (ix >> 1);
            if table.slots[ix].is_none() {
                table.slots[ix] = Some(entry);
            } else if table.slots[ix2].is_none() {
                table.slots[ix2] = Some(entry);
            } else {
                table.spill.push(entry);
            }
        }
        table
    }

    fn matches(&self, entry: &Entry, hash: u32, quads: &[u32], byte_len: u32) -> bool {
        if entry.hash != hash || entry.byte_len != byte_len {
            return false;
        }
        let start = entry.quad_start as usize;
        self.quads.get(start..start + entry.quad_len as usize) == Some(quads)
    }

    fn find(&self, quads: &[u32], byte_len: usize) -> Option<usize> {
        let byte_len = to_u32(byte_len);
        let hash = calc_hash(0, quads);
        let ix = hash as usize & self.mask;
        let primary = self.slots[ix].as_ref()?;
        if self.matches(primary, hash, quads, byte_len) {
            return Some(primary.index as usize);
        }
        let ix2 = self.mask + 1 + (ix >> 1);
        let secondary = self.slots[ix2].as_ref()?;
        if self.matches(secondary, hash, quads, byte_len) {
            return Some(secondary.index as usize);
        }
        self.spill
            .iter()
            .find(|e| self.matches(e, hash, quads, byte_len))
            .map(|e| e.index as usize)
    }
}

/// Byte length implied by the null padding of the last quad.
fn padded_len(quads: &[u32]) -> usize {
    match quads.split_last() {
        None => 0,
        Some((last, rest)) => rest.len() * 4 + 4 - (last.trailing_zeros() / 8) as usize,
    }
}

/// An immutable matcher over a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    names: Vec<Option<String>>,
    table: QuadTable,
    folded: Option<QuadTable>,
}

impl NameMatcher {
    /// Builds a matcher. `None` entries are skipped but keep their index, so
    /// indices line up with the caller's field list. With
    /// `case_insensitive`, [`match_any_name`](Self::match_any_name) also
    /// accepts names that differ only in case.
    #[must_use]
    pub fn construct<S: AsRef<str>>(names: &[Option<S>], case_insensitive: bool) -> Self {
        let names: Vec<Option<String>> = names
            .iter()
            .map(|n| n.as_ref().map(|s| s.as_ref().to_owned()))
            .collect();
        let present = names
            .iter()
            .enumerate()
            .filter_map(|(ix, n)| n.as_deref().map(|s| (ix, s)));
        let table = QuadTable::build(present.clone());
        let folded = case_insensitive.then(|| {
            let lowered: Vec<(usize, String)> = present.map(|(ix, s)| (ix, s.to_lowercase())).collect();
            QuadTable::build(lowered.iter().map(|(ix, s)| (*ix, s.as_str())))
        });
        Self {
            names,
            table,
            folded,
        }
    }

    /// Case-sensitive matcher over `names`.
    #[must_use]
    pub fn from_names(names: &[&str]) -> Self {
        let names: Vec<Option<&str>> = names.iter().copied().map(Some).collect();
        Self::construct(&names, false)
    }

    /// The vocabulary as given, including skipped entries.
    #[must_use]
    pub fn names(&self) -> &[Option<String>] {
        &self.names
    }

    /// The name at `index`.
    #[must_use]
    pub fn name_lookup(&self, index: usize) -> Option<&str> {
        self.names.get(index)?.as_deref()
    }

    #[must_use]
    pub fn match_name(&self, name: &str) -> NameMatch {
        let mut quads = Quads::new();
        pack_into(name.as_bytes(), &mut quads);
        self.match_by_quads(&quads, name.len())
    }

    /// Matches exactly, then by lower-cased form if the matcher was built
    /// case-insensitively.
    #[must_use]
    pub fn match_any_name(&self, name: &str) -> NameMatch {
        let exact = self.match_name(name);
        match (&self.folded, exact) {
            (Some(folded), NameMatch::UnknownName) => {
                let lowered = name.to_lowercase();
                to_match(folded.find(&pack_quads(lowered.as_bytes()), lowered.len()))
            }
            _ => exact,
        }
    }

    /// Matches a name of up to 4 bytes without NUL padding bytes.
    #[must_use]
    pub fn match_by_quad(&self, q1: u32) -> NameMatch {
        let quads = [q1];
        self.match_by_quads(&quads, padded_len(&quads))
    }

    /// Matches a name of 5 to 8 bytes.
    #[must_use]
    pub fn match_by_quad2(&self, q1: u32, q2: u32) -> NameMatch {
        let quads = [q1, q2];
        self.match_by_quads(&quads, padded_len(&quads))
    }

    /// Matches a name of 9 to 12 bytes.
    #[must_use]
    pub fn match_by_quad3(&self, q1: u32, q2: u32, q3: u32) -> NameMatch {
        let quads = [q1, q2, q3];
        self.match_by_quads(&quads, padded_len(&quads))
    }

    /// Matches the name of `byte_len` bytes packing to `quads`. A zero
    /// length matches the empty name whatever the quads hold.
    #[must_use]
    pub fn match_by_quads(&self, quads: &[u32], byte_len: usize) -> NameMatch {
        if byte_len == 0 || quads.is_empty() {
            return to_match(self.empty_name_index());
        }
        to_match(self.table.find(quads, byte_len))
    }

    fn empty_name_index(&self) -> Option<usize> {
        self.names.iter().position(|n| n.as_deref() == Some(""))
    }
}

fn to_match(index: Option<usize>) -> NameMatch {
    index.map_or(NameMatch::UnknownName, NameMatch::Index)
}
