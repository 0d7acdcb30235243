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

//! Theta set difference (A and not B)

use crate::common::ResizeFactor;
use crate::error::Error;
use crate::hash::DEFAULT_UPDATE_SEED;
use crate::hash::compute_seed_hash;
use crate::theta::CompactThetaSketch;
use crate::theta::ThetaSketchView;
use crate::theta::hash_table::MAX_THETA;
use crate::theta::hash_table::REBUILD_THRESHOLD;
use crate::theta::hash_table::ThetaHashTable;

/// Set difference operator for Theta sketches.
///
/// The operator holds no state besides the seed: every call to
/// [`compute`](Self::compute) is independent.
///
/// # Examples
///
/// ```
/// # use thetasketch::theta::ThetaAnotB;
/// # use thetasketch::theta::ThetaSketch;
/// let mut a = ThetaSketch::builder().build();
/// let mut b = ThetaSketch::builder().build();
/// for i in 0..10 {
///     a.update(i);
///     b.update(i + 5);
/// }
/// let a_not_b = ThetaAnotB::new_with_default_seed();
/// let result = a_not_b.compute(&a, &b).unwrap();
/// assert_eq!(result.estimate(), 5.0);
/// ```
#[derive(Debug, Clone)]
pub struct ThetaAnotB {
    seed: u64,
    seed_hash: u16,
}

impl ThetaAnotB {
    /// Creates a new set difference operator for the given `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            seed_hash: compute_seed_hash(seed),
        }
    }

    /// Creates a new set difference operator with the default seed.
    pub fn new_with_default_seed() -> Self {
        Self::new(DEFAULT_UPDATE_SEED)
    }

    /// Computes the hashes of `a` that are not in `b`, with entries sorted.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleSeed`](crate::error::ErrorKind::IncompatibleSeed) if a non-empty
    /// operand was built with a different seed.
    pub fn compute<A, B>(&self, a: &A, b: &B) -> Result<CompactThetaSketch, Error>
    where
        A: ThetaSketchView + ?Sized,
        B: ThetaSketchView + ?Sized,
    {
        self.compute_with_ordered(a, b, true)
    }

    /// Computes the hashes of `a` that are not in `b`.
    ///
    /// If `a` is empty the result is empty, whatever `b` is. If `b` is empty the result holds
    /// the entries of `a`.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleSeed`](crate::error::ErrorKind::IncompatibleSeed) if a non-empty
    /// operand was built with a different seed.
    pub fn compute_with_ordered<A, B>(
        &self,
        a: &A,
        b: &B,
        ordered: bool,
    ) -> Result<CompactThetaSketch, Error>
    where
        A: ThetaSketchView + ?Sized,
        B: ThetaSketchView + ?Sized,
    {
        if a.is_empty() {
            return Ok(CompactThetaSketch::from_parts(
                Vec::new(),
                MAX_THETA,
                self.seed_hash,
                true,
                true,
            ));
        }
        self.check_seed_hash(a.seed_hash())?;

        let mut theta = a.theta64();
        let mut excluded = None;
        if !b.is_empty() {
            self.check_seed_hash(b.seed_hash())?;
            theta = theta.min(b.theta64());
            if b.num_retained() > 0 {
                excluded = Some(self.index(b, theta));
            }
        }

        let a_ordered = a.is_ordered();
        let mut entries = Vec::with_capacity(a.num_retained());
        for hash in a.iter() {
            if hash == 0 || hash >= theta {
                if a_ordered && hash != 0 {
                    break;
                }
                continue;
            }
            if excluded
                .as_ref()
                .is_some_and(|table: &ThetaHashTable| table.contains_hash(hash))
            {
                continue;
            }
            entries.push(hash);
        }
        if ordered && !a_ordered {
            entries.sort_unstable();
        }

        let is_empty = entries.is_empty() && theta == MAX_THETA;
        Ok(CompactThetaSketch::from_parts(
            entries,
            theta,
            self.seed_hash,
            ordered || a_ordered,
            is_empty,
        ))
    }

    fn check_seed_hash(&self, actual: u16) -> Result<(), Error> {
        if actual != self.seed_hash {
            return Err(Error::incompatible_seed(self.seed_hash, actual));
        }
        Ok(())
    }

    // Membership table over the hashes of `b` below theta.
    fn index<B: ThetaSketchView + ?Sized>(&self, b: &B, theta: u64) -> ThetaHashTable {
        let lg_size =
            ThetaHashTable::lg_size_from_count_for_rebuild(b.num_retained(), REBUILD_THRESHOLD);
        let mut table = ThetaHashTable::from_raw_parts(
            lg_size,
            lg_size - 1,
            ResizeFactor::X1,
            1.0,
            theta,
            self.seed,
            false,
        );
        let b_ordered = b.is_ordered();
        for hash in b.iter() {
            if b_ordered && hash >= theta {
                break;
            }
            table.try_insert_hash(hash);
        }
        table
    }
}
