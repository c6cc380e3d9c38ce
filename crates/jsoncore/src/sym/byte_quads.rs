//! Canonicalization of property names keyed by their UTF-8 bytes.
//!
//! Names are looked up by their quads (see [`super::quads`]) so a parser can
//! find a known name straight from input bytes without decoding or
//! allocating. The table is a flat array of four-word slots divided into
//! four regions:
//!
//! | region    | share of slots | addressed by                          |
//! |-----------|----------------|---------------------------------------|
//! | primary   | 1/2            | `hash & (primary - 1)`                |
//! | secondary | 1/4            | `primary_index >> 1`                  |
//! | tertiary  | 1/8            | buckets of 4, 8 or 16 slots           |
//! | spillover | 1/8            | linear, in insertion order            |
//!
//! A slot holding a name of up to 12 bytes stores `[q1, q2, q3, byte_len]`
//! inline. Longer names store `[hash, offset, quad_len, byte_len]` and keep
//! their quads in a separate append-only area. A zero length marks an empty
//! slot; the empty name never enters the table.
//!
//! One [`CanonicalizerRoot`] is shared by every parser a factory creates.
//! Each parser works on a child that starts out aliasing the root's current
//! snapshot and copies it on the first insertion. When the parser closes,
//! the child's larger table replaces the root's, unless another child merged
//! first.

use core::fmt;
use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;

use super::{intern, quads::quad_count};
use crate::error::{ErrorKind, JsonError, Result};

/// Initial slot capacity.
pub const DEFAULT_CAPACITY: usize = 64;

/// Largest primary region; growth past it clears the table instead.
pub const MAX_PRIMARY: usize = 1 << 16;

/// A child holding more entries than this resets the root rather than
/// publishing its table.
pub const MAX_ENTRIES_FOR_REUSE: usize = 6000;

/// Past this primary size an exhausted spillover region is treated as a
/// collision attack when the guard is enabled.
const MIN_PRIMARY_FOR_DOS_CHECK: usize = 1024;

const MULT: u32 = 33;
const MULT2: u32 = 65599;
const MULT3: u32 = 31;

static EMPTY_NAME: LazyLock<Arc<str>> = LazyLock::new(|| Arc::from(""));

/// Behavior switches for a child table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolFlags {
    /// Store names so later lookups share them.
    pub canonicalize: bool,
    /// Route newly added names through the global intern cache.
    pub intern: bool,
    /// Fail instead of growing when collisions exhaust the spillover region.
    pub fail_on_hash_overflow: bool,
}

impl Default for SymbolFlags {
    fn default() -> Self {
        Self {
            canonicalize: true,
            intern: false,
            fail_on_hash_overflow: true,
        }
    }
}

/// One generation of table contents. Cloning is cheap: the arrays are
/// reference counted and copied only when a holder writes to them.
#[derive(Clone)]
pub(crate) struct TableInfo {
    capacity: usize,
    count: usize,
    tertiary_shift: u32,
    spillover_end: usize,
    hash_area: Arc<Vec<u32>>,
    names: Arc<Vec<Option<Arc<str>>>>,
    long_quads: Arc<Vec<u32>>,
}

/// Bucket size exponent for the tertiary region.
fn tertiary_shift(primary: usize) -> u32 {
    match primary >> 2 {
        0..64 => 2,
        64..=256 => 3,
        _ => 4,
    }
}

impl TableInfo {
    fn empty(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two() && capacity >= 16);
        let mut table = Self {
            capacity,
            count: 0,
            tertiary_shift: tertiary_shift(capacity >> 1),
            spillover_end: 0,
            hash_area: Arc::new(vec![0; capacity * 4]),
            names: Arc::new(vec![None; capacity]),
            long_quads: Arc::new(Vec::new()),
        };
        table.spillover_end = table.spillover_start();
        table
    }

    #[inline]
    fn primary(&self) -> usize {
        self.capacity >> 1
    }

    #[inline]
    fn secondary_start(&self) -> usize {
        self.primary()
    }

    #[inline]
    fn tertiary_start(&self) -> usize {
        self.primary() + (self.capacity >> 2)
    }

    #[inline]
    fn spillover_start(&self) -> usize {
        self.tertiary_start() + (self.capacity >> 3)
    }

    #[inline]
    fn slot(&self, ix: usize) -> &[u32] {
        &self.hash_area[ix * 4..ix * 4 + 4]
    }

    #[inline]
    fn is_free(&self, ix: usize) -> bool {
        self.hash_area[ix * 4 + 3] == 0
    }

    fn tertiary_bucket(&self, primary_ix: usize) -> core::ops::Range<usize> {
        let shift = self.tertiary_shift;
        let start = self.tertiary_start() + ((primary_ix >> (shift + 2)) << shift);
        start..start + (1 << shift)
    }

    /// Walks the collision chain for `hash`, stopping at the first free slot
    /// in the hashed regions.
    fn probe(&self, hash: u32, mut is_match: impl FnMut(&[u32]) -> bool) -> Option<usize> {
        let ix = hash as usize & (self.primary() - 1);
        if self.is_free(ix) {
            return None;
        }
        if is_match(self.slot(ix)) {
            return Some(ix);
        }
        let ix2 = self.secondary_start() + (ix >> 1);
        if self.is_free(ix2) {
            return None;
        }
        if is_match(self.slot(ix2)) {
            return Some(ix2);
        }
        for ix3 in self.tertiary_bucket(ix) {
            if self.is_free(ix3) {
                return None;
            }
            if is_match(self.slot(ix3)) {
                return Some(ix3);
            }
        }
        (self.spillover_start()..self.spillover_end).find(|&ix4| is_match(self.slot(ix4)))
    }

    /// The slot a new entry with `hash` goes into, or `None` when the
    /// spillover region is full.
    fn free_slot(&self, hash: u32) -> Option<usize> {
        let ix = hash as usize & (self.primary() - 1);
        if self.is_free(ix) {
            return Some(ix);
        }
        let ix2 = self.secondary_start() + (ix >> 1);
        if self.is_free(ix2) {
            return Some(ix2);
        }
        if let Some(ix3) = self.tertiary_bucket(ix).find(|&ix3| self.is_free(ix3)) {
            return Some(ix3);
        }
        (self.spillover_end < self.capacity).then_some(self.spillover_end)
    }

    fn find(&self, hash: u32, quads: &[u32], byte_len: u32) -> Option<Arc<str>> {
        let ix = if quads.len() <= 3 {
            let q = short_quads(quads);
            self.probe(hash, |slot| {
                slot[3] == byte_len && slot[0] == q[0] && slot[1] == q[1] && slot[2] == q[2]
            })
        } else {
            self.probe(hash, |slot| {
                slot[3] == byte_len && slot[0] == hash && self.long_matches(slot, quads)
            })
        }?;
        self.names[ix].clone()
    }

    fn long_matches(&self, slot: &[u32], quads: &[u32]) -> bool {
        let offset = slot[1] as usize;
        let len = slot[2] as usize;
        len == quads.len() && self.long_quads.get(offset..offset + len) == Some(quads)
    }

    /// Writes an entry into the free slot `ix`.
    fn put(&mut self, ix: usize, hash: u32, quads: &[u32], byte_len: u32, name: Arc<str>) {
        let words = if quads.len() <= 3 {
            let q = short_quads(quads);
            [q[0], q[1], q[2], byte_len]
        } else {
            let long_quads = Arc::make_mut(&mut self.long_quads);
            let offset = long_quads.len();
            long_quads.extend_from_slice(quads);
            [hash, word(offset), word(quads.len()), byte_len]
        };
        Arc::make_mut(&mut self.hash_area)[ix * 4..ix * 4 + 4].copy_from_slice(&words);
        Arc::make_mut(&mut self.names)[ix] = Some(name);
        if ix == self.spillover_end {
            self.spillover_end += 1;
        }
        self.count += 1;
    }

    fn spillover_count(&self) -> usize {
        self.spillover_end - self.spillover_start()
    }

    fn needs_rehash(&self) -> bool {
        let primary = self.primary();
        self.count > primary >> 1
            && (self.spillover_count() > (self.count + 1) >> 7 || self.count * 5 > primary * 4)
    }

    fn occupied(&self, range: core::ops::Range<usize>) -> usize {
        range.filter(|&ix| !self.is_free(ix)).count()
    }
}

#[inline]
fn short_quads(quads: &[u32]) -> [u32; 3] {
    let mut q = [0u32; 3];
    q[..quads.len()].copy_from_slice(quads);
    q
}

/// Slot words are `u32`; offsets and lengths are bounded by the table's
/// maximum size and the name length constraint.
#[inline]
fn word(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn calc_hash_1(seed: u32, q1: u32) -> u32 {
    let mut hash = q1 ^ seed;
    hash = hash.wrapping_add(hash >> 16);
    hash ^= hash << 3;
    hash = hash.wrapping_add(hash >> 12);
    hash
}

fn calc_hash_2(seed: u32, q1: u32, q2: u32) -> u32 {
    let mut hash = q1;
    hash = hash.wrapping_add(hash >> 15);
    hash ^= hash >> 9;
    hash = hash.wrapping_add(q2.wrapping_mul(MULT));
    hash ^= seed;
    hash = hash.wrapping_add(hash >> 16);
    hash ^= hash >> 4;
    hash = hash.wrapping_add(hash << 3);
    hash
}

fn calc_hash_3(seed: u32, q1: u32, q2: u32, q3: u32) -> u32 {
    let mut hash = q1 ^ seed;
    hash = hash.wrapping_add(hash >> 9);
    hash = hash.wrapping_mul(MULT3);
    hash = hash.wrapping_add(q2);
    hash = hash.wrapping_mul(MULT);
    hash = hash.wrapping_add(hash >> 15);
    hash ^= q3;
    hash = hash.wrapping_add(hash >> 4);
    hash = hash.wrapping_add(hash >> 15);
    hash ^= hash << 9;
    hash
}

fn calc_hash_n(seed: u32, quads: &[u32]) -> u32 {
    let mut hash = quads[0] ^ seed;
    hash = hash.wrapping_add(hash >> 9);
    hash = hash.wrapping_add(quads[1]);
    hash = hash.wrapping_add(hash >> 15);
    hash = hash.wrapping_mul(MULT);
    hash ^= quads[2];
    hash = hash.wrapping_add(hash >> 4);
    for &q in &quads[3..] {
        hash = hash.wrapping_add(q ^ (q >> 21));
    }
    hash = hash.wrapping_mul(MULT2);
    hash = hash.wrapping_add(hash >> 19);
    hash ^= hash << 5;
    hash
}

/// Hash of a quad sequence; never 0.
pub(crate) fn calc_hash(seed: u32, quads: &[u32]) -> u32 {
    let hash = match *quads {
        [] => seed,
        [q1] => calc_hash_1(seed, q1),
        [q1, q2] => calc_hash_2(seed, q1, q2),
        [q1, q2, q3] => calc_hash_3(seed, q1, q2, q3),
        _ => calc_hash_n(seed, quads),
    };
    if hash == 0 { 1 } else { hash }
}

/// The shared, long-lived symbol table owned by a factory.
pub struct CanonicalizerRoot {
    seed: u32,
    state: ArcSwap<TableInfo>,
}

impl CanonicalizerRoot {
    /// A root with a random hash seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// A root with a fixed hash seed, for reproducible layouts.
    #[must_use]
    pub fn with_seed(seed: u32) -> Self {
        Self {
            seed,
            state: ArcSwap::from_pointee(TableInfo::empty(DEFAULT_CAPACITY)),
        }
    }

    /// Creates a per-parse child over the current snapshot.
    #[must_use]
    pub fn make_child(self: &Arc<Self>, flags: SymbolFlags) -> ByteQuadsCanonicalizer {
        let base = self.state.load_full();
        ByteQuadsCanonicalizer {
            root: Some(Arc::clone(self)),
            seed: self.seed,
            flags,
            table: (*base).clone(),
            base,
            shared: true,
            dirty: false,
            released: false,
        }
    }

    /// Number of names in the current snapshot.
    #[must_use]
    pub fn size(&self) -> usize {
        self.state.load().count
    }

    /// Slot capacity of the current snapshot.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.state.load().capacity
    }

    #[must_use]
    pub fn hash_seed(&self) -> u32 {
        self.seed
    }

    /// Publishes a child's table if the root is still the snapshot the child
    /// started from.
    fn merge(&self, base: &Arc<TableInfo>, child: TableInfo) {
        let current_count = self.state.load().count;
        if child.count <= current_count {
            return;
        }
        let replacement = if child.count > MAX_ENTRIES_FOR_REUSE {
            tracing::debug!(
                entries = child.count,
                "symbol table too large to share, resetting root"
            );
            TableInfo::empty(DEFAULT_CAPACITY)
        } else {
            child
        };
        let entries = replacement.count;
        let previous = self.state.compare_and_swap(base, Arc::new(replacement));
        if Arc::ptr_eq(&previous, base) {
            tracing::debug!(entries, "merged child symbols into root");
        } else {
            tracing::debug!(entries, "root changed concurrently, discarding child symbols");
        }
    }
}

impl Default for CanonicalizerRoot {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CanonicalizerRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.load();
        f.debug_struct("CanonicalizerRoot")
            .field("size", &state.count)
            .field("capacity", &state.capacity)
            .finish_non_exhaustive()
    }
}

/// A per-parse symbol table.
///
/// Lookups never allocate. Insertions copy the shared arrays once, then
/// mutate the private copy; [`release`](Self::release) offers the result
/// back to the root.
pub struct ByteQuadsCanonicalizer {
    root: Option<Arc<CanonicalizerRoot>>,
    seed: u32,
    flags: SymbolFlags,
    table: TableInfo,
    /// The snapshot this child was created from.
    base: Arc<TableInfo>,
    shared: bool,
    dirty: bool,
    released: bool,
}

impl ByteQuadsCanonicalizer {
    /// A new shared root with a random seed.
    #[must_use]
    pub fn create_root() -> Arc<CanonicalizerRoot> {
        Arc::new(CanonicalizerRoot::new())
    }

    /// A new shared root with a fixed seed.
    #[must_use]
    pub fn create_root_with_seed(seed: u32) -> Arc<CanonicalizerRoot> {
        Arc::new(CanonicalizerRoot::with_seed(seed))
    }

    /// A table with no root, for callers that canonicalize within a single
    /// document only.
    #[must_use]
    pub fn standalone(seed: u32, flags: SymbolFlags) -> Self {
        Self {
            root: None,
            seed,
            flags,
            table: TableInfo::empty(DEFAULT_CAPACITY),
            base: Arc::new(TableInfo::empty(DEFAULT_CAPACITY)),
            shared: false,
            dirty: false,
            released: false,
        }
    }

    #[must_use]
    pub fn find_name_1(&self, q1: u32, byte_len: usize) -> Option<Arc<str>> {
        self.find_name(&[q1], byte_len)
    }

    #[must_use]
    pub fn find_name_2(&self, q1: u32, q2: u32, byte_len: usize) -> Option<Arc<str>> {
        self.find_name(&[q1, q2], byte_len)
    }

    #[must_use]
    pub fn find_name_3(&self, q1: u32, q2: u32, q3: u32, byte_len: usize) -> Option<Arc<str>> {
        self.find_name(&[q1, q2, q3], byte_len)
    }

    /// Looks up the name whose UTF-8 encoding is `byte_len` bytes packing to
    /// `quads`.
    #[must_use]
    pub fn find_name(&self, quads: &[u32], byte_len: usize) -> Option<Arc<str>> {
        if byte_len == 0 {
            return Some(EMPTY_NAME.clone());
        }
        if quads.len() != quad_count(byte_len) {
            return None;
        }
        let hash = calc_hash(self.seed, quads);
        self.table.find(hash, quads, word(byte_len))
    }

    /// Adds `name`, whose quads are `quads`, returning the canonical
    /// instance.
    ///
    /// # Errors
    ///
    /// A constraint error when collisions exhaust the table and the overflow
    /// guard is enabled; an internal error if a rehash loses entries.
    pub fn add_name(&mut self, name: &str, quads: &[u32]) -> Result<Arc<str>> {
        if name.is_empty() {
            return Ok(EMPTY_NAME.clone());
        }
        debug_assert_eq!(quads.len(), quad_count(name.len()));
        if self.flags.canonicalize {
            if let Some(existing) = self.find_name(quads, name.len()) {
                return Ok(existing);
            }
        }
        let symbol: Arc<str> = if self.flags.intern {
            intern::intern(name)
        } else {
            Arc::from(name)
        };
        if !self.flags.canonicalize {
            return Ok(symbol);
        }

        self.verify_sharing();
        let hash = calc_hash(self.seed, quads);
        let ix = loop {
            if let Some(ix) = self.table.free_slot(hash) {
                break ix;
            }
            self.handle_spillover_full()?;
        };
        self.table
            .put(ix, hash, quads, word(name.len()), symbol.clone());
        self.dirty = true;
        if self.table.needs_rehash() {
            self.rehash()?;
        }
        Ok(symbol)
    }

    /// Convenience wrapper packing `name` itself.
    ///
    /// # Errors
    ///
    /// As [`add_name`](Self::add_name).
    pub fn add_str(&mut self, name: &str) -> Result<Arc<str>> {
        let quads = super::quads::pack_quads(name.as_bytes());
        self.add_name(name, &quads)
    }

    /// Copies the arrays aliased with the root before the first write.
    fn verify_sharing(&mut self) {
        if self.shared {
            Arc::make_mut(&mut self.table.hash_area);
            Arc::make_mut(&mut self.table.names);
            Arc::make_mut(&mut self.table.long_quads);
            self.shared = false;
        }
    }

    fn handle_spillover_full(&mut self) -> Result<()> {
        let primary = self.table.primary();
        if primary > MIN_PRIMARY_FOR_DOS_CHECK && self.flags.fail_on_hash_overflow {
            tracing::debug!(
                entries = self.table.count,
                capacity = self.table.capacity,
                "symbol table spillover full"
            );
            return Err(JsonError::constraint(format!(
                "spill-over slots in symbol table with {} entries, hash area of {} slots, \
                 are full (all {} used); suspect a DoS attack based on hash collisions \
                 (disable the check with `fail_on_symbol_hash_overflow`)",
                self.table.count,
                self.table.capacity,
                self.table.spillover_count()
            )));
        }
        self.rehash()
    }

    /// Doubles the capacity and re-inserts every entry, or clears the table
    /// when it is already at the maximum size.
    fn rehash(&mut self) -> Result<()> {
        let old = &self.table;
        let new_capacity = old.capacity << 1;
        if new_capacity >> 1 > MAX_PRIMARY {
            tracing::debug!(
                entries = old.count,
                capacity = old.capacity,
                "symbol table at maximum size, clearing"
            );
            self.table = TableInfo::empty(old.capacity);
            self.dirty = true;
            return Ok(());
        }

        let mut table = TableInfo::empty(new_capacity);
        for ix in 0..old.capacity {
            if old.is_free(ix) {
                continue;
            }
            let Some(name) = old.names[ix].clone() else {
                continue;
            };
            let slot = old.slot(ix);
            let byte_len = slot[3];
            let (hash, quads): (u32, &[u32]) = if byte_len <= 12 {
                let quads = &slot[..quad_count(byte_len as usize)];
                (calc_hash(self.seed, quads), quads)
            } else {
                let offset = slot[1] as usize;
                let len = slot[2] as usize;
                (slot[0], &old.long_quads[offset..offset + len])
            };
            let new_ix = table
                .free_slot(hash)
                .ok_or_else(|| {
                    JsonError::new(ErrorKind::Internal("symbol table rehash ran out of slots"))
                })?;
            table.put(new_ix, hash, quads, byte_len, name);
        }
        if table.count != old.count {
            return Err(JsonError::new(ErrorKind::Internal(
                "symbol table rehash lost entries",
            )));
        }
        tracing::trace!(
            entries = table.count,
            capacity = table.capacity,
            "symbol table rehashed"
        );
        self.table = table;
        self.dirty = true;
        Ok(())
    }

    /// Offers this table to the root. Only the first call has any effect.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if !self.dirty || !self.flags.canonicalize {
            return;
        }
        if let Some(root) = &self.root {
            root.merge(&self.base, self.table.clone());
        }
    }

    /// Number of names stored.
    #[must_use]
    pub fn size(&self) -> usize {
        self.table.count
    }

    /// Total slot capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.table.capacity
    }

    /// Number of primary slots.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.table.primary()
    }

    #[must_use]
    pub fn primary_count(&self) -> usize {
        self.table.occupied(0..self.table.secondary_start())
    }

    #[must_use]
    pub fn secondary_count(&self) -> usize {
        self.table
            .occupied(self.table.secondary_start()..self.table.tertiary_start())
    }

    #[must_use]
    pub fn tertiary_count(&self) -> usize {
        self.table
            .occupied(self.table.tertiary_start()..self.table.spillover_start())
    }

    #[must_use]
    pub fn spillover_count(&self) -> usize {
        self.table.spillover_count()
    }

    /// Sum of the per-region counts; equals [`size`](Self::size).
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.primary_count() + self.secondary_count() + self.tertiary_count() + self.spillover_count()
    }

    /// Quads stored for names longer than 12 bytes.
    #[must_use]
    pub fn long_quad_count(&self) -> usize {
        self.table.long_quads.len()
    }

    #[must_use]
    pub fn is_canonicalizing(&self) -> bool {
        self.flags.canonicalize
    }

    /// Whether the arrays are still aliased with the root snapshot.
    #[must_use]
    pub fn is_shared(&self) -> bool {
        self.shared
    }

    #[must_use]
    pub fn hash_seed(&self) -> u32 {
        self.seed
    }

    /// The hash used for `quads` in this table.
    #[must_use]
    pub fn calc_hash(&self, quads: &[u32]) -> u32 {
        calc_hash(self.seed, quads)
    }
}

impl Drop for ByteQuadsCanonicalizer {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for ByteQuadsCanonicalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteQuadsCanonicalizer")
            .field("size", &self.size())
            .field("capacity", &self.capacity())
            .field("primary", &self.primary_count())
            .field("secondary", &self.secondary_count())
            .field("tertiary", &self.tertiary_count())
            .field("spillover", &self.spillover_count())
            .field("long_quads", &self.long_quad_count())
            .finish()
    }
}
