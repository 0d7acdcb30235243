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

//! Theta intersection

use tracing::trace;

use crate::common::ResizeFactor;
use crate::error::Error;
use crate::hash::DEFAULT_UPDATE_SEED;
use crate::hash::compute_seed_hash;
use crate::theta::CompactThetaSketch;
use crate::theta::ThetaSketchView;
use crate::theta::WrappedCompactSketch;
use crate::theta::hash_table::MAX_THETA;
use crate::theta::hash_table::REBUILD_THRESHOLD;
use crate::theta::hash_table::ThetaHashTable;

/// Stateful intersection operator for Theta sketches.
///
/// The intersection starts from the universal set and every update keeps only the hashes it
/// shares with the incoming sketch. Before the first [`update`](Self::update) there is no
/// result; use [`has_result`](Self::has_result) to check.
///
/// # Examples
///
/// ```
/// # use thetasketch::theta::ThetaIntersection;
/// # use thetasketch::theta::ThetaSketch;
/// let mut a = ThetaSketch::builder().build();
/// let mut b = ThetaSketch::builder().build();
/// for i in 0..10 {
///     a.update(i);
///     b.update(i + 5);
/// }
/// let mut intersection = ThetaIntersection::new_with_default_seed();
/// intersection.update(&a).unwrap();
/// intersection.update(&b.compact(true)).unwrap();
/// assert_eq!(intersection.result().estimate(), 5.0);
/// ```
#[derive(Debug, Clone)]
pub struct ThetaIntersection {
    seed: u64,
    seed_hash: u16,
    // None until the first update: the universal set.
    table: Option<ThetaHashTable>,
    // Set once an empty operand was seen.
    absorbed_empty: bool,
}

impl ThetaIntersection {
    /// Creates a new intersection operator for the given `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            seed_hash: compute_seed_hash(seed),
            table: None,
            absorbed_empty: false,
        }
    }

    /// Creates a new intersection operator with the default seed.
    pub fn new_with_default_seed() -> Self {
        Self::new(DEFAULT_UPDATE_SEED)
    }

    /// Intersects the current state with the given sketch.
    ///
    /// An empty sketch, or `None`, makes the intersection empty for good. An intersection that
    /// is merely out of common hashes keeps lowering its theta with every later sketch.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleSeed`](crate::error::ErrorKind::IncompatibleSeed) if a non-empty
    /// sketch was built with a different seed, and
    /// [`InvalidData`](crate::error::ErrorKind::InvalidData) if the sketch repeats a hash. The
    /// intersection is left unchanged on error.
    pub fn update<S: ThetaSketchView + ?Sized>(&mut self, sketch: &S) -> Result<(), Error> {
        if !sketch.is_empty() && sketch.seed_hash() != self.seed_hash {
            return Err(Error::incompatible_seed(self.seed_hash, sketch.seed_hash()));
        }
        if self.absorbed_empty {
            return Ok(());
        }
        if sketch.is_empty() {
            self.table = Some(self.table_from_matches(Vec::new(), MAX_THETA)?);
            self.absorbed_empty = true;
            return Ok(());
        }

        let (theta, current) = match &self.table {
            Some(table) => (table.theta().min(sketch.theta64()), Some(table)),
            None => (sketch.theta64(), None),
        };
        let ordered = sketch.is_ordered();
        let mut matches = Vec::new();
        for hash in sketch.iter() {
            if hash == 0 || hash >= theta {
                if ordered && hash != 0 {
                    break;
                }
                continue;
            }
            match current {
                None => matches.push(hash),
                Some(table) if table.num_retained() > 0 && table.contains_hash(hash) => {
                    matches.push(hash)
                }
                Some(_) => {}
            }
        }

        self.table = Some(self.table_from_matches(matches, theta)?);
        Ok(())
    }

    /// Intersects the current state with a serialized compact sketch, read in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be decoded as a compact sketch, or for the same
    /// reasons as [`update`](Self::update).
    pub fn update_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let wrapped = WrappedCompactSketch::wrap_with_seed(bytes, self.seed)?;
        trace!(
            len = bytes.len(),
            retained = wrapped.num_retained(),
            theta = wrapped.theta64(),
            "folding serialized sketch into intersection"
        );
        self.update(&wrapped)
    }

    fn table_from_matches(&self, matches: Vec<u64>, theta: u64) -> Result<ThetaHashTable, Error> {
        if matches.is_empty() {
            // Nothing retained at full theta means nothing was in common at all.
            return Ok(ThetaHashTable::from_raw_parts(
                0,
                0,
                ResizeFactor::X1,
                1.0,
                theta,
                self.seed,
                theta == MAX_THETA,
            ));
        }

        let lg_size =
            ThetaHashTable::lg_size_from_count_for_rebuild(matches.len(), REBUILD_THRESHOLD);
        let mut table = ThetaHashTable::from_raw_parts(
            lg_size,
            lg_size - 1,
            ResizeFactor::X1,
            1.0,
            theta,
            self.seed,
            false,
        );
        for hash in matches {
            if !table.try_insert_hash(hash) {
                return Err(Error::deserial(format!(
                    "duplicate hash {hash} in input sketch, possibly corrupted"
                )));
            }
        }
        Ok(table)
    }

    /// Returns whether this operator has received at least one update.
    pub fn has_result(&self) -> bool {
        self.table.is_some()
    }

    /// Returns the intersection result as a compact theta sketch (ordered).
    ///
    /// # Panics
    ///
    /// Panics if called before the first [`update`](Self::update).
    pub fn result(&self) -> CompactThetaSketch {
        self.result_with_ordered(true)
    }

    /// Returns the intersection result as a compact theta sketch.
    ///
    /// # Panics
    ///
    /// Panics if called before the first [`update`](Self::update).
    pub fn result_with_ordered(&self, ordered: bool) -> CompactThetaSketch {
        let Some(table) = &self.table else {
            panic!("ThetaIntersection::result() called before first update()");
        };
        let mut hashes: Vec<u64> = table.iter().collect();
        if ordered {
            hashes.sort_unstable();
        }
        CompactThetaSketch::from_parts(
            hashes,
            table.theta(),
            self.seed_hash,
            ordered,
            table.is_empty(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::theta::ThetaSketch;

    fn sketch(lg_k: u8, range: std::ops::Range<u64>) -> ThetaSketch {
        let mut sketch = ThetaSketch::builder().lg_k(lg_k).build();
        for i in range {
            sketch.update(i);
        }
        sketch
    }

    #[test]
    fn test_no_result_before_update() {
        let intersection = ThetaIntersection::new_with_default_seed();
        assert!(!intersection.has_result());
    }

    #[test]
    #[should_panic(expected = "called before first update")]
    fn test_result_before_update_panics() {
        ThetaIntersection::new_with_default_seed().result();
    }

    #[test]
    fn test_single_operand_is_copied() {
        let a = sketch(5, 0..1000);
        let mut intersection = ThetaIntersection::new_with_default_seed();
        intersection.update(&a).unwrap();
        assert_eq!(intersection.result(), a.compact(true));
    }

    #[test]
    fn test_empty_operand_is_terminal() {
        let mut intersection = ThetaIntersection::new_with_default_seed();
        intersection.update(&sketch(12, 0..10)).unwrap();
        intersection.update(&None::<ThetaSketch>).unwrap();
        assert!(intersection.result().is_empty());

        intersection.update(&sketch(12, 0..10)).unwrap();
        let result = intersection.result();
        assert!(result.is_empty());
        assert_eq!(result.theta64(), MAX_THETA);
    }

    #[test]
    fn test_disjoint_exact_is_empty() {
        let mut intersection = ThetaIntersection::new_with_default_seed();
        intersection.update(&sketch(12, 0..10)).unwrap();
        intersection.update(&sketch(12, 10..20)).unwrap();
        let result = intersection.result();
        assert!(result.is_empty());
        assert_eq!(result.num_retained(), 0);
    }

    #[test]
    fn test_disjoint_exact_still_lowers_theta() {
        let estimation = sketch(5, 0..1000);
        let mut intersection = ThetaIntersection::new_with_default_seed();
        intersection.update(&sketch(12, 0..10)).unwrap();
        intersection.update(&sketch(12, 10..20)).unwrap();
        assert!(intersection.result().is_empty());

        intersection.update(&estimation).unwrap();
        let result = intersection.result();
        assert_eq!(result.theta64(), estimation.theta64());
        assert!(!result.is_empty());
        assert_eq!(result.num_retained(), 0);
        assert_eq!(result.estimate(), 0.0);
    }

    #[test]
    fn test_disjoint_estimation_is_not_empty() {
        let mut intersection = ThetaIntersection::new_with_default_seed();
        intersection.update(&sketch(5, 0..1000)).unwrap();
        intersection.update(&sketch(5, 1000..2000)).unwrap();
        let result = intersection.result();
        assert!(!result.is_empty());
        assert_eq!(result.num_retained(), 0);
        assert!(result.theta64() < MAX_THETA);
        assert_eq!(result.estimate(), 0.0);
    }

    #[test]
    fn test_theta_is_minimum_of_operands() {
        let a = sketch(5, 0..1000);
        let b = sketch(6, 0..1000);
        let mut intersection = ThetaIntersection::new_with_default_seed();
        intersection.update(&b).unwrap();
        intersection.update(&a.compact(false)).unwrap();
        let result = intersection.result();
        assert_eq!(result.theta64(), a.theta64().min(b.theta64()));
        assert!(result.iter().all(|hash| hash < result.theta64()));
    }

    #[test]
    fn test_seed_mismatch() {
        let mut other = ThetaSketch::builder().seed(1).build();
        other.update(1);
        let mut intersection = ThetaIntersection::new_with_default_seed();
        let err = intersection.update(&other).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompatibleSeed);
        assert!(!intersection.has_result());
    }

    #[test]
    fn test_update_bytes() {
        let mut intersection = ThetaIntersection::new_with_default_seed();
        intersection
            .update_bytes(&sketch(12, 0..100).compact(true).serialize())
            .unwrap();
        intersection
            .update_bytes(&sketch(12, 50..150).compact(false).serialize())
            .unwrap();
        assert_eq!(intersection.result().estimate(), 50.0);
    }
}
