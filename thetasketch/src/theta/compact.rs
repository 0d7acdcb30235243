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

//! Compact Theta sketch implementation
//!
//! A CompactThetaSketch is an immutable snapshot of a Theta sketch.
//! It stores only the essential data needed for estimation and set operations:
//! - Theta value (sampling threshold)
//! - Retained hash values, sorted or not
//! - Seed hash for validation
//!
//! This format is compatible with the Apache DataSketches "compact" format
//! used by Java, C++, and Python implementations.

use crate::codec::Family;
use crate::codec::SketchBytes;
use crate::codec::SketchMemory;
use crate::codec::SketchMemoryMut;
use crate::common::NumStdDev;
use crate::error::Error;
use crate::hash::DEFAULT_UPDATE_SEED;
use crate::theta::ThetaSketchView;
use crate::theta::hash_table::MAX_THETA;
use crate::theta::serialization::*;

/// A compact, immutable Theta sketch.
///
/// It contains the retained hash values and can be used for:
/// - Cardinality estimation
/// - Set operations (union, intersection, difference)
/// - Serialization to/from bytes
///
/// Unlike [`ThetaSketch`](super::ThetaSketch), this sketch cannot be updated
/// with new values.
///
/// # Example
///
/// ```
/// use thetasketch::theta::CompactThetaSketch;
/// use thetasketch::theta::ThetaSketch;
///
/// let mut sketch = ThetaSketch::builder().build();
/// sketch.update("apple");
/// sketch.update("banana");
///
/// // Convert to compact form for serialization
/// let compact = sketch.compact(true);
/// let bytes = compact.serialize();
///
/// // Deserialize
/// let restored = CompactThetaSketch::deserialize(&bytes).unwrap();
/// assert_eq!(compact.estimate(), restored.estimate());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CompactThetaSketch {
    theta: u64,
    entries: Vec<u64>,
    seed_hash: u16,
    is_ordered: bool,
    is_empty: bool,
}

impl CompactThetaSketch {
    pub(crate) fn from_parts(
        entries: Vec<u64>,
        theta: u64,
        seed_hash: u16,
        is_ordered: bool,
        is_empty: bool,
    ) -> Self {
        debug_assert!(!is_ordered || entries.is_sorted());
        Self {
            theta,
            entries,
            seed_hash,
            is_ordered,
            is_empty,
        }
    }

    /// Check if the sketch is empty (no values have been added)
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    /// Get the cardinality estimate
    ///
    /// Returns the estimated number of distinct values that were inserted
    /// into the original sketch.
    pub fn estimate(&self) -> f64 {
        ThetaSketchView::estimate(self)
    }

    /// Returns the approximate lower error bound given the specified number of Standard Deviations.
    pub fn lower_bound(&self, num_std_dev: NumStdDev) -> f64 {
        ThetaSketchView::lower_bound(self, num_std_dev)
    }

    /// Returns the approximate upper error bound given the specified number of Standard Deviations.
    pub fn upper_bound(&self, num_std_dev: NumStdDev) -> f64 {
        ThetaSketchView::upper_bound(self, num_std_dev)
    }

    /// Return theta as a fraction (0.0 to 1.0)
    pub fn theta(&self) -> f64 {
        ThetaSketchView::theta(self)
    }

    /// Return theta as u64
    pub fn theta64(&self) -> u64 {
        self.theta
    }

    /// Check if sketch is in estimation mode
    pub fn is_estimation_mode(&self) -> bool {
        ThetaSketchView::is_estimation_mode(self)
    }

    /// Return number of retained entries
    pub fn num_retained(&self) -> usize {
        self.entries.len()
    }

    /// Return true if the retained hash values are sorted in ascending order
    pub fn is_ordered(&self) -> bool {
        self.is_ordered
    }

    /// Return iterator over hash values
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().copied()
    }

    /// Get the seed hash
    pub fn seed_hash(&self) -> u16 {
        self.seed_hash
    }

    /// Serialize the compact sketch to bytes in the current serial version (3).
    ///
    /// # Example
    ///
    /// ```
    /// use thetasketch::theta::ThetaSketch;
    ///
    /// let mut sketch = ThetaSketch::builder().build();
    /// sketch.update("test");
    /// let compact = sketch.compact(true);
    /// let bytes = compact.serialize();
    /// assert_eq!(bytes.len(), 24);
    /// ```
    pub fn serialize(&self) -> Vec<u8> {
        self.write_compact(0, SERIAL_VERSION)
    }

    /// Serialize the compact sketch to bytes in the given serial version.
    ///
    /// Serial versions 1 and 2 are always ordered. Serial version 1 has no seed hash and cannot
    /// tell an empty sketch from one that retained nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the serial version is not 1, 2 or 3, or if serial version 1 is asked
    /// for a non-empty sketch that retained nothing below a sampled theta, which it would
    /// decode as empty.
    ///
    /// # Example
    ///
    /// ```
    /// use thetasketch::theta::CompactThetaSketch;
    /// use thetasketch::theta::ThetaSketch;
    ///
    /// let mut sketch = ThetaSketch::builder().build();
    /// for i in 0..10 {
    ///     sketch.update(i);
    /// }
    /// let bytes = sketch.compact(false).serialize_version(2).unwrap();
    /// let restored = CompactThetaSketch::deserialize(&bytes).unwrap();
    /// assert_eq!(restored.estimate(), 10.0);
    /// assert!(restored.is_ordered());
    /// ```
    pub fn serialize_version(&self, serial_version: u8) -> Result<Vec<u8>, Error> {
        match serial_version {
            SERIAL_VERSION_1 => {
                if !self.is_empty && self.entries.is_empty() && self.theta < MAX_THETA {
                    return Err(Error::invalid_argument(
                        "serial version 1 cannot hold a non-empty sketch without entries",
                    ));
                }
                Ok(self.write_v1(0))
            }
            SERIAL_VERSION_2 | SERIAL_VERSION => Ok(self.write_compact(0, serial_version)),
            _ => Err(Error::unsupported_serial_version(serial_version)),
        }
    }

    /// Serialize the compact sketch into a caller provided buffer.
    ///
    /// Returns the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns an error if `dst` is too small to hold the serialized sketch.
    pub fn serialize_into(&self, dst: &mut [u8]) -> Result<usize, Error> {
        let bytes = self.serialize();
        SketchMemoryMut::new(dst)
            .put_slice(0, &bytes)
            .map_err(|err| err.with_context("required", bytes.len()))?;
        Ok(bytes.len())
    }

    /// Writes serial version 2 or 3, recording `lg_k` in the preamble.
    pub(crate) fn write_compact(&self, lg_k: u8, serial_version: u8) -> Vec<u8> {
        debug_assert!(serial_version == SERIAL_VERSION_2 || serial_version == SERIAL_VERSION);
        let num_entries = self.entries.len();
        let preamble_longs = if self.is_empty && self.theta == MAX_THETA {
            PREAMBLE_LONGS_EMPTY
        } else if self.theta < MAX_THETA || num_entries == 0 {
            PREAMBLE_LONGS_ESTIMATION
        } else {
            PREAMBLE_LONGS_EXACT
        };
        // serial version 2 only knows ordered sketches
        let ordered = self.is_ordered || serial_version == SERIAL_VERSION_2;

        let preamble_bytes = (preamble_longs as usize) * HASH_SIZE_BYTES;
        let mut bytes = SketchBytes::with_capacity(preamble_bytes + num_entries * HASH_SIZE_BYTES);

        bytes.write_u8(preamble_longs);
        bytes.write_u8(serial_version);
        bytes.write_u8(Family::COMPACT.id);
        bytes.write_u8(lg_k);
        bytes.write_u8(0);
        let mut flags = FLAG_READ_ONLY | FLAG_COMPACT;
        if ordered {
            flags |= FLAG_ORDERED;
        }
        if self.is_empty {
            flags |= FLAG_EMPTY;
        }
        bytes.write_u8(flags);
        bytes.write_u16_le(self.seed_hash);

        if preamble_longs >= PREAMBLE_LONGS_EXACT {
            bytes.write_u32_le(num_entries as u32);
            bytes.write_f32_le(1.0);
        }
        if preamble_longs >= PREAMBLE_LONGS_ESTIMATION {
            bytes.write_u64_le(self.theta);
        }
        self.write_entries(&mut bytes, ordered);
        bytes.into_bytes()
    }

    /// Writes serial version 1: three preamble longs, no seed hash, sorted entries.
    pub(crate) fn write_v1(&self, lg_k: u8) -> Vec<u8> {
        let num_entries = self.entries.len();
        let mut bytes = SketchBytes::with_capacity(
            (PREAMBLE_LONGS_ESTIMATION as usize + num_entries) * HASH_SIZE_BYTES,
        );
        bytes.write_u8(PREAMBLE_LONGS_ESTIMATION);
        bytes.write_u8(SERIAL_VERSION_1);
        bytes.write_u8(Family::COMPACT.id);
        bytes.write_u8(lg_k);
        bytes.write_u8(0);
        bytes.write_u8(FLAG_READ_ONLY | FLAG_COMPACT | FLAG_ORDERED);
        bytes.write_u16_le(0);
        bytes.write_u32_le(num_entries as u32);
        bytes.write_u32_le(0);
        if self.is_empty {
            bytes.write_u64_le(MAX_THETA);
        } else {
            bytes.write_u64_le(self.theta);
        }
        self.write_entries(&mut bytes, true);
        bytes.into_bytes()
    }

    fn write_entries(&self, bytes: &mut SketchBytes, ordered: bool) {
        if ordered && !self.is_ordered {
            let mut sorted = self.entries.clone();
            sorted.sort_unstable();
            sorted.iter().for_each(|&hash| bytes.write_u64_le(hash));
        } else {
            self.entries.iter().for_each(|&hash| bytes.write_u64_le(hash));
        }
    }

    /// Deserialize a compact sketch from bytes
    ///
    /// Uses the default seed for validation.
    ///
    /// # Example
    ///
    /// ```
    /// use thetasketch::theta::CompactThetaSketch;
    /// use thetasketch::theta::ThetaSketch;
    ///
    /// let mut sketch = ThetaSketch::builder().build();
    /// sketch.update("test");
    /// let compact = sketch.compact(true);
    /// let bytes = compact.serialize();
    ///
    /// let restored = CompactThetaSketch::deserialize(&bytes).unwrap();
    /// assert_eq!(compact.estimate(), restored.estimate());
    /// ```
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        Self::deserialize_with_seed(bytes, DEFAULT_UPDATE_SEED)
    }

    /// Deserialize a compact sketch from bytes with a specific seed
    ///
    /// Serial versions 1, 2 and 3 are supported. A buffer too short to hold a preamble is an
    /// empty sketch.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The buffer is shorter than the entries it declares
    /// - The family ID is not the compact family
    /// - The serial version is unsupported
    /// - The seed hash doesn't match
    pub fn deserialize_with_seed(bytes: &[u8], seed: u64) -> Result<Self, Error> {
        let layout = CompactLayout::read(SketchMemory::new(bytes), seed)?;
        Ok(Self {
            theta: layout.theta,
            entries: layout.entries(bytes).collect(),
            seed_hash: layout.seed_hash,
            is_ordered: layout.is_ordered,
            is_empty: layout.is_empty,
        })
    }
}

impl ThetaSketchView for CompactThetaSketch {
    fn is_empty(&self) -> bool {
        self.is_empty
    }

    fn theta64(&self) -> u64 {
        self.theta
    }

    fn seed_hash(&self) -> u16 {
        self.seed_hash
    }

    fn is_ordered(&self) -> bool {
        self.is_ordered
    }

    fn num_retained(&self) -> usize {
        self.entries.len()
    }

    fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::hash::compute_seed_hash;

    fn sketch(entries: Vec<u64>, theta: u64, ordered: bool) -> CompactThetaSketch {
        CompactThetaSketch::from_parts(
            entries,
            theta,
            compute_seed_hash(DEFAULT_UPDATE_SEED),
            ordered,
            false,
        )
    }

    fn empty() -> CompactThetaSketch {
        CompactThetaSketch::from_parts(
            Vec::new(),
            MAX_THETA,
            compute_seed_hash(DEFAULT_UPDATE_SEED),
            true,
            true,
        )
    }

    #[test]
    fn test_empty_compact_sketch() {
        let sketch = empty();
        assert!(sketch.is_empty());
        assert_eq!(sketch.estimate(), 0.0);
        assert_eq!(sketch.num_retained(), 0);
        assert!(!sketch.is_estimation_mode());
        assert_eq!(sketch.lower_bound(NumStdDev::Two), 0.0);
        assert_eq!(sketch.upper_bound(NumStdDev::Two), 0.0);
    }

    #[test]
    fn test_compact_sketch_with_entries() {
        let sketch = sketch(vec![100, 200, 300], MAX_THETA, true);
        assert!(!sketch.is_empty());
        assert_eq!(sketch.num_retained(), 3);
        assert_eq!(sketch.estimate(), 3.0);
        assert!(!sketch.is_estimation_mode());
        assert_eq!(sketch.lower_bound(NumStdDev::One), 3.0);
    }

    #[test]
    fn test_compact_sketch_estimation_mode() {
        let sketch = sketch(vec![100, 200, 300], MAX_THETA / 2, true);
        assert!(sketch.is_estimation_mode());
        assert!((sketch.estimate() - 6.0).abs() < 1e-9);
        assert!(sketch.lower_bound(NumStdDev::Two) <= sketch.estimate());
        assert!(sketch.upper_bound(NumStdDev::Two) >= sketch.estimate());
    }

    #[test]
    fn test_serialized_sizes() {
        assert_eq!(empty().serialize().len(), 8);
        assert_eq!(sketch(vec![1, 2], MAX_THETA, true).serialize().len(), 32);
        assert_eq!(sketch(vec![1, 2], 100, true).serialize().len(), 40);
        // a non-empty sketch without entries keeps its theta
        assert_eq!(sketch(vec![], MAX_THETA, true).serialize().len(), 24);
    }

    #[test]
    fn test_serialize_deserialize_empty() {
        let sketch = empty();
        let restored = CompactThetaSketch::deserialize(&sketch.serialize()).unwrap();
        assert_eq!(sketch, restored);
    }

    #[test]
    fn test_serialize_deserialize_exact_mode() {
        let sketch = sketch(vec![100, 200, 300, 400, 500], MAX_THETA, true);
        let restored = CompactThetaSketch::deserialize(&sketch.serialize()).unwrap();
        assert_eq!(sketch, restored);
    }

    #[test]
    fn test_serialize_deserialize_unordered() {
        let sketch = sketch(vec![300, 100, 200], MAX_THETA / 2, false);
        let restored = CompactThetaSketch::deserialize(&sketch.serialize()).unwrap();
        assert!(!restored.is_ordered());
        assert_eq!(sketch, restored);

        // older serial versions are always ordered
        for version in [1, 2] {
            let bytes = sketch.serialize_version(version).unwrap();
            let restored = CompactThetaSketch::deserialize(&bytes).unwrap();
            assert!(restored.is_ordered());
            assert_eq!(restored.iter().collect::<Vec<_>>(), vec![100, 200, 300]);
            assert_eq!(restored.theta64(), sketch.theta64());
        }
    }

    #[test]
    fn test_serialize_version_1_empty() {
        let bytes = empty().serialize_version(1).unwrap();
        assert_eq!(bytes.len(), 24);
        assert!(CompactThetaSketch::deserialize(&bytes).unwrap().is_empty());
    }

    #[test]
    fn test_serialize_version_1_rejects_sampled_without_entries() {
        let sketch = sketch(vec![], MAX_THETA / 2, true);
        let err = sketch.serialize_version(1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        for version in [2, 3] {
            let bytes = sketch.serialize_version(version).unwrap();
            let restored = CompactThetaSketch::deserialize(&bytes).unwrap();
            assert!(!restored.is_empty());
            assert_eq!(restored.theta64(), MAX_THETA / 2);
        }
    }

    #[test]
    fn test_serialize_unsupported_version() {
        let err = empty().serialize_version(4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedSerialVersion);
        assert!(empty().serialize_version(0).is_err());
    }

    #[test]
    fn test_serialize_into() {
        let sketch = sketch(vec![1, 2, 3], MAX_THETA, true);
        let mut buf = [0u8; 64];
        let written = sketch.serialize_into(&mut buf).unwrap();
        assert_eq!(written, 40);
        assert_eq!(&buf[..written], sketch.serialize().as_slice());

        let mut small = [0u8; 16];
        let err = sketch.serialize_into(&mut small).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedBuffer);
    }

    #[test]
    fn test_deserialize_invalid_family() {
        let mut bytes = sketch(vec![1], MAX_THETA, true).serialize();
        bytes[2] = Family::QUICKSELECT.id;
        let err = CompactThetaSketch::deserialize(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleFamily);
    }

    #[test]
    fn test_deserialize_invalid_seed() {
        let bytes = sketch(vec![1], MAX_THETA, true).serialize();
        let err = CompactThetaSketch::deserialize_with_seed(&bytes, 123).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleSeed);
    }

    #[test]
    fn test_deserialize_zero_theta() {
        let mut bytes = sketch(vec![], 100, true).serialize();
        bytes[16..24].copy_from_slice(&0u64.to_le_bytes());
        let err = CompactThetaSketch::deserialize(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }
}
