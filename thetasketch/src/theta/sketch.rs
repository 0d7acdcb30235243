// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Theta sketch implementation
//!
//! This module provides ThetaSketch, the mutable sketch that items are fed into.

use std::hash::Hash;

use crate::codec::Family;
use crate::codec::SketchBytes;
use crate::codec::SketchMemory;
use crate::codec::SketchSlice;
use crate::common::NumStdDev;
use crate::common::ResizeFactor;
use crate::common::canonical_double;
use crate::error::Error;
use crate::hash::DEFAULT_UPDATE_SEED;
use crate::hash::compute_seed_hash;
use crate::theta::CompactThetaSketch;
use crate::theta::ThetaSketchView;
use crate::theta::hash_space;
use crate::theta::hash_table::DEFAULT_LG_K;
use crate::theta::hash_table::MAX_LG_K;
use crate::theta::hash_table::MAX_THETA;
use crate::theta::hash_table::MIN_LG_K;
use crate::theta::hash_table::ThetaHashTable;
use crate::theta::serialization::*;

/// Mutable theta sketch for building from input data
///
/// # Examples
///
/// ```
/// # use thetasketch::theta::ThetaSketch;
/// let mut sketch = ThetaSketch::builder().lg_k(12).build();
/// for i in 0..100 {
///     sketch.update(i);
/// }
/// assert_eq!(sketch.estimate(), 100.0);
/// ```
#[derive(Debug, Clone)]
pub struct ThetaSketch {
    table: ThetaHashTable,
}

impl ThetaSketch {
    /// Create a new builder for ThetaSketch
    ///
    /// # Examples
    ///
    /// ```
    /// # use thetasketch::theta::ThetaSketch;
    /// let sketch = ThetaSketch::builder().lg_k(12).build();
    /// assert_eq!(sketch.lg_k(), 12);
    /// ```
    pub fn builder() -> ThetaSketchBuilder {
        ThetaSketchBuilder::default()
    }

    /// Update the sketch with a hashable value.
    ///
    /// For `f32`/`f64` values, use `update_f32`/`update_f64` instead.
    ///
    /// # Examples
    ///
    /// ```
    /// # use thetasketch::theta::ThetaSketch;
    /// let mut sketch = ThetaSketch::builder().build();
    /// sketch.update("apple");
    /// assert!(sketch.estimate() >= 1.0);
    /// ```
    pub fn update<T: Hash>(&mut self, value: T) {
        let hash = self.table.hash(value);
        self.hash_update(hash);
    }

    /// Inserts a hash computed elsewhere with the same seed, bypassing the hash function.
    ///
    /// Hashes outside `(0, MAX_THETA]` are ignored and leave the sketch untouched. Returns true if
    /// the hash was retained as a new entry.
    pub(crate) fn hash_update(&mut self, hash: u64) -> bool {
        self.table.try_insert_hash(hash)
    }

    /// Update the sketch with a f64 value.
    ///
    /// # Examples
    ///
    /// ```
    /// # use thetasketch::theta::ThetaSketch;
    /// let mut sketch = ThetaSketch::builder().build();
    /// sketch.update_f64(1.0);
    /// assert!(sketch.estimate() >= 1.0);
    /// ```
    pub fn update_f64(&mut self, value: f64) {
        // Canonicalize double for compatibility with Java
        let canonical = canonical_double(value);
        self.update(canonical);
    }

    /// Update the sketch with a f32 value.
    ///
    /// # Examples
    ///
    /// ```
    /// # use thetasketch::theta::ThetaSketch;
    /// let mut sketch = ThetaSketch::builder().build();
    /// sketch.update_f32(1.0);
    /// assert!(sketch.estimate() >= 1.0);
    /// ```
    pub fn update_f32(&mut self, value: f32) {
        self.update_f64(value as f64);
    }

    /// Return cardinality estimate
    ///
    /// # Examples
    ///
    /// ```
    /// # use thetasketch::theta::ThetaSketch;
    /// # let mut sketch = ThetaSketch::builder().build();
    /// # sketch.update("apple");
    /// assert!(sketch.estimate() >= 1.0);
    /// ```
    pub fn estimate(&self) -> f64 {
        ThetaSketchView::estimate(self)
    }

    /// Return theta as a fraction (0.0 to 1.0)
    pub fn theta(&self) -> f64 {
        ThetaSketchView::theta(self)
    }

    /// Return theta as u64
    ///
    /// An empty sketch reports `MAX_THETA` whatever its sampling probability.
    pub fn theta64(&self) -> u64 {
        if self.table.is_empty() {
            MAX_THETA
        } else {
            self.table.theta()
        }
    }

    /// Check if sketch is empty
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Check if sketch is in estimation mode
    pub fn is_estimation_mode(&self) -> bool {
        ThetaSketchView::is_estimation_mode(self)
    }

    /// Return number of retained entries
    pub fn num_retained(&self) -> usize {
        self.table.num_retained()
    }

    /// Return lg_k
    pub fn lg_k(&self) -> u8 {
        self.table.lg_nom_size()
    }

    /// Trim the sketch to nominal size k
    pub fn trim(&mut self) {
        self.table.trim();
    }

    /// Reset the sketch to empty state
    pub fn reset(&mut self) {
        self.table.reset();
    }

    /// Return iterator over hash values
    ///
    /// # Examples
    ///
    /// ```
    /// # use thetasketch::theta::ThetaSketch;
    /// # let mut sketch = ThetaSketch::builder().build();
    /// # sketch.update("apple");
    /// let mut iter = sketch.iter();
    /// assert!(iter.next().is_some());
    /// ```
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.table.iter()
    }

    /// Returns the approximate lower error bound given the specified number of Standard Deviations.
    ///
    /// # Arguments
    ///
    /// * `num_std_dev` - The number of standard deviations for confidence bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use thetasketch::common::NumStdDev;
    /// use thetasketch::theta::ThetaSketch;
    ///
    /// let mut sketch = ThetaSketch::builder().lg_k(12).build();
    /// for i in 0..10000 {
    ///     sketch.update(i);
    /// }
    ///
    /// let estimate = sketch.estimate();
    /// let lower_bound = sketch.lower_bound(NumStdDev::Two);
    /// let upper_bound = sketch.upper_bound(NumStdDev::Two);
    ///
    /// assert!(lower_bound <= estimate);
    /// assert!(estimate <= upper_bound);
    /// ```
    pub fn lower_bound(&self, num_std_dev: NumStdDev) -> f64 {
        ThetaSketchView::lower_bound(self, num_std_dev)
    }

    /// Returns the approximate upper error bound given the specified number of Standard Deviations.
    pub fn upper_bound(&self, num_std_dev: NumStdDev) -> f64 {
        ThetaSketchView::upper_bound(self, num_std_dev)
    }

    /// Returns an immutable snapshot of the sketch.
    ///
    /// # Examples
    ///
    /// ```
    /// # use thetasketch::theta::ThetaSketch;
    /// let mut sketch = ThetaSketch::builder().build();
    /// sketch.update("apple");
    /// sketch.update("banana");
    /// let compact = sketch.compact(true);
    /// assert!(compact.is_ordered());
    /// assert_eq!(compact.estimate(), sketch.estimate());
    /// ```
    pub fn compact(&self, ordered: bool) -> CompactThetaSketch {
        let theta = self.theta64();
        let entries = self.table.entries();
        let count = hash_space::count_less_than_theta(entries, theta);
        CompactThetaSketch::from_parts(
            hash_space::compact_cache(entries, count, theta, ordered),
            theta,
            self.table.seed_hash(),
            ordered,
            self.is_empty(),
        )
    }

    pub(crate) fn table(&self) -> &ThetaHashTable {
        &self.table
    }

    /// Serialize the sketch to bytes in compact format.
    ///
    /// The serialized format is compatible with Java and C++ DataSketches
    /// implementations.
    ///
    /// # Examples
    ///
    /// ```
    /// # use thetasketch::theta::ThetaSketch;
    /// let mut sketch = ThetaSketch::builder().build();
    /// sketch.update("apple");
    /// let bytes = sketch.serialize();
    /// let restored = ThetaSketch::deserialize(&bytes).unwrap();
    /// assert_eq!(sketch.estimate(), restored.estimate());
    /// ```
    pub fn serialize(&self) -> Vec<u8> {
        self.compact(true).write_compact(self.lg_k(), SERIAL_VERSION)
    }

    /// Serialize the whole hash table, so that the sketch can be restored and updated further
    /// with the same state.
    ///
    /// # Examples
    ///
    /// ```
    /// # use thetasketch::theta::ThetaSketch;
    /// let mut sketch = ThetaSketch::builder().lg_k(5).sampling_probability(0.5).build();
    /// for i in 0..100 {
    ///     sketch.update(i);
    /// }
    /// let bytes = sketch.serialize_updatable();
    /// let mut restored = ThetaSketch::deserialize(&bytes).unwrap();
    /// assert_eq!(sketch.estimate(), restored.estimate());
    /// restored.update(100);
    /// ```
    pub fn serialize_updatable(&self) -> Vec<u8> {
        self.write_updatable(PREAMBLE_LONGS_ESTIMATION, Family::QUICKSELECT)
    }

    /// Writes the hash table image with the given preamble size and family.
    ///
    /// The union layout reserves a fourth preamble long; it is filled with the table theta and
    /// left for the caller to overwrite.
    pub(crate) fn write_updatable(&self, preamble_longs: u8, family: Family) -> Vec<u8> {
        let table = &self.table;
        let entries = table.entries();
        let mut bytes = SketchBytes::with_capacity(
            (preamble_longs as usize + entries.len()) * HASH_SIZE_BYTES,
        );

        bytes.write_u8(preamble_byte(
            preamble_longs,
            table.resize_factor().lg_value(),
        ));
        bytes.write_u8(SERIAL_VERSION);
        bytes.write_u8(family.id);
        bytes.write_u8(table.lg_nom_size());
        bytes.write_u8(table.lg_cur_size());
        bytes.write_u8(if table.is_empty() { FLAG_EMPTY } else { 0 });
        bytes.write_u16_le(table.seed_hash());
        bytes.write_u32_le(table.num_retained() as u32);
        bytes.write_f32_le(table.sampling_probability());
        bytes.write_u64_le(table.theta());
        if preamble_longs >= PREAMBLE_LONGS_UNION {
            bytes.write_u64_le(table.theta());
        }
        for &entry in entries {
            bytes.write_u64_le(entry);
        }
        bytes.into_bytes()
    }

    /// Deserialize a sketch from bytes.
    ///
    /// Uses the default seed (9001). For sketches created with a different seed,
    /// use [`deserialize_with_seed`](Self::deserialize_with_seed).
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are invalid or corrupted.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        Self::deserialize_with_seed(bytes, DEFAULT_UPDATE_SEED)
    }

    /// Deserialize a sketch from bytes with a specific seed.
    ///
    /// Accepts both the updatable image written by
    /// [`serialize_updatable`](Self::serialize_updatable) and compact sketches that record a
    /// valid lg_k, such as the output of [`serialize`](Self::serialize).
    ///
    /// # Arguments
    ///
    /// * `bytes` - The serialized sketch bytes
    /// * `seed` - The seed used during sketch creation
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The bytes are too short
    /// - The format is invalid (wrong family ID, unsupported version, lg_k out of range)
    /// - The seed hash doesn't match
    pub fn deserialize_with_seed(bytes: &[u8], seed: u64) -> Result<Self, Error> {
        let mem = SketchMemory::new(bytes);
        let family_id = mem
            .get_u8(FAMILY_BYTE)
            .map_err(|err| err.with_context("field", "family_id"))?;
        if family_id == Family::COMPACT.id {
            Self::heapify_compact(mem, seed)
        } else {
            let (sketch, _) = Self::heapify_updatable(bytes, seed, Family::QUICKSELECT)?;
            Ok(sketch)
        }
    }

    fn heapify_compact(mem: SketchMemory<'_>, seed: u64) -> Result<Self, Error> {
        let lg_k = mem.get_u8(LG_K_BYTE)?;
        check_lg_k(lg_k)?;
        let layout = CompactLayout::read(mem, seed)?;

        let mut table = ThetaHashTable::new(lg_k, ResizeFactor::X8, 1.0, seed);
        table.set_theta(layout.theta);
        for hash in layout.entries(mem.as_slice()) {
            table.try_insert_hash(hash);
        }
        table.set_empty(layout.is_empty);
        Ok(ThetaSketch { table })
    }

    /// Restores a hash table image written by [`write_updatable`](Self::write_updatable).
    ///
    /// Returns the union theta as well when `family` is the union family.
    pub(crate) fn heapify_updatable(
        bytes: &[u8],
        seed: u64,
        family: Family,
    ) -> Result<(Self, Option<u64>), Error> {
        fn make_error(tag: &'static str) -> impl FnOnce(std::io::Error) -> Error {
            move |err| Error::insufficient_data(tag).set_source(err)
        }

        let mut cursor = SketchSlice::new(bytes);
        let first_byte = cursor.read_u8().map_err(make_error("preamble_longs"))?;
        let serial_version = cursor.read_u8().map_err(make_error("serial_version"))?;
        let family_id = cursor.read_u8().map_err(make_error("family_id"))?;
        let lg_k = cursor.read_u8().map_err(make_error("lg_k"))?;
        let lg_arr = cursor.read_u8().map_err(make_error("lg_arr"))?;
        let flags = cursor.read_u8().map_err(make_error("flags"))?;
        let seed_hash = cursor.read_u16_le().map_err(make_error("seed_hash"))?;

        family.validate_id(family_id)?;
        if serial_version != SERIAL_VERSION {
            return Err(Error::unsupported_serial_version(serial_version));
        }
        let preamble_longs = first_byte & PREAMBLE_LONGS_MASK;
        if preamble_longs != family.min_pre_longs {
            return Err(Error::deserial(format!(
                "{family} image must have {} preamble longs, got {preamble_longs}",
                family.min_pre_longs
            )));
        }
        check_lg_k(lg_k)?;
        if !(MIN_LG_K..=lg_k + 1).contains(&lg_arr) {
            return Err(Error::deserial(format!(
                "lg_arr {lg_arr} is out of range [{MIN_LG_K}, {}]",
                lg_k + 1
            )));
        }
        let expected_seed_hash = compute_seed_hash(seed);
        if seed_hash != expected_seed_hash {
            return Err(Error::incompatible_seed(expected_seed_hash, seed_hash));
        }

        let num_retained = cursor.read_u32_le().map_err(make_error("num_retained"))? as usize;
        let p = cursor.read_f32_le().map_err(make_error("p"))?;
        let theta = cursor.read_u64_le().map_err(make_error("theta"))?;
        if !(p > 0.0 && p <= 1.0) {
            return Err(Error::deserial(format!(
                "sampling probability must be in (0.0, 1.0], got {p}"
            )));
        }
        if theta == 0 || theta > MAX_THETA {
            return Err(Error::deserial(format!(
                "theta must be in (0, {MAX_THETA}], got {theta}"
            )));
        }
        let union_theta = if preamble_longs >= PREAMBLE_LONGS_UNION {
            Some(cursor.read_u64_le().map_err(make_error("union_theta"))?)
        } else {
            None
        };

        let mut table = ThetaHashTable::from_raw_parts(
            lg_arr,
            lg_k,
            ResizeFactor::from_lg_value(first_byte >> LG_RESIZE_FACTOR_SHIFT),
            p,
            theta,
            seed,
            flags & FLAG_EMPTY != 0,
        );
        for _ in 0..(1usize << lg_arr) {
            let hash = cursor.read_u64_le().map_err(make_error("entries"))?;
            if hash != 0 {
                table.try_insert_hash(hash);
            }
        }
        if table.num_retained() != num_retained {
            return Err(Error::deserial(format!(
                "expected {num_retained} retained entries below theta, found {}",
                table.num_retained()
            )));
        }
        Ok((ThetaSketch { table }, union_theta))
    }
}

fn check_lg_k(lg_k: u8) -> Result<(), Error> {
    if (MIN_LG_K..=MAX_LG_K).contains(&lg_k) {
        Ok(())
    } else {
        Err(Error::deserial(format!(
            "lg_k {lg_k} is out of range [{MIN_LG_K}, {MAX_LG_K}]"
        )))
    }
}

impl ThetaSketchView for ThetaSketch {
    fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn theta64(&self) -> u64 {
        ThetaSketch::theta64(self)
    }

    fn seed_hash(&self) -> u16 {
        self.table.seed_hash()
    }

    fn is_ordered(&self) -> bool {
        false
    }

    fn num_retained(&self) -> usize {
        self.table.num_retained()
    }

    fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.table.iter()
    }
}

/// Builder for ThetaSketch
#[derive(Debug, Clone)]
pub struct ThetaSketchBuilder {
    lg_k: u8,
    resize_factor: ResizeFactor,
    sampling_probability: f32,
    seed: u64,
}

impl Default for ThetaSketchBuilder {
    fn default() -> Self {
        Self {
            lg_k: DEFAULT_LG_K,
            resize_factor: ResizeFactor::X8,
            sampling_probability: 1.0,
            seed: DEFAULT_UPDATE_SEED,
        }
    }
}

impl ThetaSketchBuilder {
    /// Set lg_k (log2 of nominal size k).
    ///
    /// # Panics
    ///
    /// If lg_k is not in range [5, 26]
    ///
    /// # Examples
    ///
    /// ```
    /// # use thetasketch::theta::ThetaSketch;
    /// let sketch = ThetaSketch::builder().lg_k(12).build();
    /// assert_eq!(sketch.lg_k(), 12);
    /// ```
    pub fn lg_k(mut self, lg_k: u8) -> Self {
        assert!(
            (MIN_LG_K..=MAX_LG_K).contains(&lg_k),
            "lg_k must be in [{}, {}], got {}",
            MIN_LG_K,
            MAX_LG_K,
            lg_k
        );
        self.lg_k = lg_k;
        self
    }

    /// Set resize factor.
    pub fn resize_factor(mut self, factor: ResizeFactor) -> Self {
        self.resize_factor = factor;
        self
    }

    /// Set sampling probability p.
    ///
    /// The sampling probability controls the fraction of hashed values that are retained.
    /// Must be greater than 0 to ensure valid theta values for bound calculations.
    ///
    /// # Panics
    ///
    /// Panics if p is not in range (0.0, 1.0]
    ///
    /// # Examples
    ///
    /// ```
    /// # use thetasketch::theta::ThetaSketch;
    /// let _sketch = ThetaSketch::builder().sampling_probability(0.5).build();
    /// ```
    pub fn sampling_probability(mut self, probability: f32) -> Self {
        assert!(
            (0.0..=1.0).contains(&probability) && probability > 0.0,
            "sampling_probability must be in (0.0, 1.0], got {probability}"
        );
        self.sampling_probability = probability;
        self
    }

    /// Set hash seed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use thetasketch::theta::ThetaSketch;
    /// let _sketch = ThetaSketch::builder().seed(7).build();
    /// ```
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Build the ThetaSketch.
    ///
    /// # Examples
    ///
    /// ```
    /// # use thetasketch::theta::ThetaSketch;
    /// let sketch = ThetaSketch::builder().lg_k(10).build();
    /// assert_eq!(sketch.lg_k(), 10);
    /// ```
    pub fn build(self) -> ThetaSketch {
        let table = ThetaHashTable::new(
            self.lg_k,
            self.resize_factor,
            self.sampling_probability,
            self.seed,
        );

        ThetaSketch { table }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_hash_update_rejects_out_of_domain() {
        let mut sketch = ThetaSketch::builder().build();
        assert!(!sketch.hash_update(0));
        assert!(!sketch.hash_update(MAX_THETA + 1));
        assert!(sketch.is_empty());

        assert!(sketch.hash_update(42));
        assert!(!sketch.hash_update(42));
        assert!(!sketch.is_empty());
        assert_eq!(sketch.iter().collect::<Vec<_>>(), vec![42]);
    }

    #[test]
    fn test_update_and_hash_update_agree() {
        let mut by_value = ThetaSketch::builder().build();
        let mut by_hash = ThetaSketch::builder().build();
        for i in 0..100u64 {
            by_value.update(i);
            by_hash.hash_update(by_hash.table().hash(i));
        }
        let mut a: Vec<u64> = by_value.iter().collect();
        let mut b: Vec<u64> = by_hash.iter().collect();
        a.sort_unstable();
        b.sort_unstable();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_sampled_sketch_reports_max_theta() {
        let sketch = ThetaSketch::builder().sampling_probability(0.1).build();
        assert!(sketch.is_empty());
        assert_eq!(sketch.theta64(), MAX_THETA);
        assert!(!sketch.is_estimation_mode());
        assert!(sketch.table().theta() < MAX_THETA);
    }

    #[test]
    fn test_compact_unordered_keeps_entries() {
        let mut sketch = ThetaSketch::builder().lg_k(5).build();
        for i in 0..1000 {
            sketch.update(i);
        }
        let compact = sketch.compact(false);
        assert!(!compact.is_ordered());
        assert_eq!(compact.num_retained(), sketch.num_retained());
        assert_eq!(compact.theta64(), sketch.theta64());
        let ordered = sketch.compact(true);
        let mut entries: Vec<u64> = compact.iter().collect();
        entries.sort_unstable();
        assert_eq!(entries, ordered.iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_updatable_round_trip_keeps_table() {
        let mut sketch = ThetaSketch::builder()
            .lg_k(6)
            .resize_factor(ResizeFactor::X2)
            .sampling_probability(0.75)
            .build();
        for i in 0..500 {
            sketch.update(i);
        }
        let bytes = sketch.serialize_updatable();
        let restored = ThetaSketch::deserialize(&bytes).unwrap();
        assert_eq!(restored.table().entries(), sketch.table().entries());
        assert_eq!(restored.table().resize_factor(), ResizeFactor::X2);
        assert_eq!(restored.table().sampling_probability(), 0.75);
        assert_eq!(restored.theta64(), sketch.theta64());
        assert_eq!(restored.lg_k(), 6);
    }

    #[test]
    fn test_updatable_round_trip_empty_sampled() {
        let sketch = ThetaSketch::builder().sampling_probability(0.5).build();
        let mut restored = ThetaSketch::deserialize(&sketch.serialize_updatable()).unwrap();
        assert!(restored.is_empty());
        assert_eq!(restored.table().theta(), sketch.table().theta());

        restored.reset();
        assert_eq!(restored.table().theta(), sketch.table().theta());
    }

    #[test]
    fn test_deserialize_rejects_union_image() {
        let sketch = ThetaSketch::builder().build();
        let bytes = sketch.write_updatable(PREAMBLE_LONGS_UNION, Family::UNION);
        let err = ThetaSketch::deserialize(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleFamily);
    }

    #[test]
    fn test_deserialize_truncated_updatable() {
        let mut sketch = ThetaSketch::builder().lg_k(5).build();
        sketch.update(1);
        let bytes = sketch.serialize_updatable();
        let err = ThetaSketch::deserialize(&bytes[..bytes.len() - 8]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedBuffer);
    }

    #[test]
    fn test_deserialize_compact_without_lg_k() {
        let mut sketch = ThetaSketch::builder().build();
        sketch.update(1);
        let bytes = sketch.compact(true).serialize();
        let err = ThetaSketch::deserialize(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }
}
