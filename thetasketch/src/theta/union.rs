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

//! Theta union

use std::hash::Hash;

use tracing::trace;

use crate::codec::Family;
use crate::codec::SketchMemoryMut;
use crate::common::ResizeFactor;
use crate::error::Error;
use crate::hash::DEFAULT_UPDATE_SEED;
use crate::theta::CompactThetaSketch;
use crate::theta::ThetaSketch;
use crate::theta::ThetaSketchBuilder;
use crate::theta::ThetaSketchView;
use crate::theta::WrappedCompactSketch;
use crate::theta::hash_space;
use crate::theta::hash_table::MAX_THETA;
use crate::theta::serialization::PREAMBLE_LONGS_UNION;
use crate::theta::serialization::UNION_THETA_LONG;

/// Stateful union operator for Theta sketches.
///
/// Incoming hashes are folded into an internal updatable sketch, the gadget, while the union
/// theta tracks the smallest theta seen across all inputs. Computing a result does not modify
/// the union, so more sketches can be added afterwards.
///
/// # Examples
///
/// ```
/// # use thetasketch::theta::ThetaSketch;
/// # use thetasketch::theta::ThetaUnion;
/// let mut a = ThetaSketch::builder().build();
/// let mut b = ThetaSketch::builder().build();
/// for i in 0..10 {
///     a.update(i);
///     b.update(i + 5);
/// }
/// let mut union = ThetaUnion::builder().build();
/// union.update(&a).unwrap();
/// union.update(&b).unwrap();
/// assert_eq!(union.result().estimate(), 15.0);
/// ```
#[derive(Debug, Clone)]
pub struct ThetaUnion {
    gadget: ThetaSketch,
    union_theta: u64,
}

impl ThetaUnion {
    /// Create a new builder for ThetaUnion
    pub fn builder() -> ThetaUnionBuilder {
        ThetaUnionBuilder::default()
    }

    fn with_gadget(gadget: ThetaSketch) -> Self {
        let union_theta = gadget.table().theta();
        Self {
            gadget,
            union_theta,
        }
    }

    /// Adds a sketch to the union.
    ///
    /// `None` and empty sketches contribute nothing. Ordered inputs are scanned until the first
    /// hash at or above the union theta; unordered ones are scanned in full.
    ///
    /// # Errors
    ///
    /// Returns [`IncompatibleSeed`](crate::error::ErrorKind::IncompatibleSeed) if the sketch was
    /// built with a different seed. The union is left unchanged in that case.
    pub fn update<S: ThetaSketchView + ?Sized>(&mut self, sketch: &S) -> Result<(), Error> {
        if sketch.is_empty() {
            return Ok(());
        }

        let seed_hash = self.gadget.table().seed_hash();
        if sketch.seed_hash() != seed_hash {
            return Err(Error::incompatible_seed(seed_hash, sketch.seed_hash()));
        }

        self.union_theta = self.union_theta.min(sketch.theta64());
        if sketch.is_ordered() {
            for hash in sketch.iter() {
                if hash >= self.union_theta {
                    break;
                }
                self.gadget.hash_update(hash);
            }
        } else {
            for hash in sketch.iter() {
                if hash_space::continue_condition(self.union_theta, hash) {
                    continue;
                }
                self.gadget.hash_update(hash);
            }
        }
        self.union_theta = self.union_theta.min(self.gadget.table().theta());
        Ok(())
    }

    /// Adds a serialized compact sketch to the union, reading its entries in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes cannot be decoded as a compact sketch or carry a different
    /// seed hash.
    pub fn update_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        let wrapped = WrappedCompactSketch::wrap_with_seed(bytes, self.gadget.table().hash_seed())?;
        trace!(
            len = bytes.len(),
            retained = wrapped.num_retained(),
            theta = wrapped.theta64(),
            "folding serialized sketch into union"
        );
        self.update(&wrapped)
    }

    /// Adds a single item to the union.
    pub fn update_item<T: Hash>(&mut self, value: T) {
        self.gadget.update(value);
    }

    /// Adds a single f64 item to the union.
    pub fn update_f64(&mut self, value: f64) {
        self.gadget.update_f64(value);
    }

    /// Returns the union of all sketches added so far, with entries sorted.
    pub fn result(&self) -> CompactThetaSketch {
        self.result_with_ordered(true)
    }

    /// Returns the union of all sketches added so far.
    ///
    /// # Examples
    ///
    /// ```
    /// # use thetasketch::theta::ThetaSketch;
    /// # use thetasketch::theta::ThetaUnion;
    /// let mut sketch = ThetaSketch::builder().lg_k(5).build();
    /// for i in 0..1000 {
    ///     sketch.update(i);
    /// }
    /// let mut union = ThetaUnion::builder().lg_k(5).build();
    /// union.update(&sketch).unwrap();
    /// let result = union.result_with_ordered(false);
    /// assert!(!result.is_ordered());
    /// assert!(result.num_retained() <= 32);
    /// ```
    pub fn result_with_ordered(&self, ordered: bool) -> CompactThetaSketch {
        let table = self.gadget.table();
        let k = 1usize << table.lg_nom_size();

        let mut theta = table.theta().min(self.union_theta);
        if table.num_retained() > k {
            let mut entries: Vec<u64> = table.iter().collect();
            let Ok(kth) = hash_space::quick_select(&mut entries, k) else {
                unreachable!("more than k entries are retained");
            };
            theta = theta.min(kth);
        }

        let entries = table.entries();
        let count = hash_space::count_less_than_theta(entries, theta);
        let p = table.sampling_probability() as f64;
        let theta_fraction = theta as f64 / MAX_THETA as f64;
        let is_empty = table.is_empty() && p >= theta_fraction && count == 0;
        CompactThetaSketch::from_parts(
            hash_space::compact_cache(entries, count, theta, ordered),
            theta,
            table.seed_hash(),
            ordered,
            is_empty,
        )
    }

    /// Computes the result and also writes its compact serialization into `dst`.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedBuffer`](crate::error::ErrorKind::MalformedBuffer) if `dst` is too
    /// small for the result.
    pub fn result_into(&self, ordered: bool, dst: &mut [u8]) -> Result<CompactThetaSketch, Error> {
        let result = self.result_with_ordered(ordered);
        result.serialize_into(dst)?;
        Ok(result)
    }

    /// Resets the union to the state it was built in.
    pub fn reset(&mut self) {
        self.gadget.reset();
        self.union_theta = self.gadget.table().theta();
    }

    /// Serializes the union so that it can be restored and updated further.
    ///
    /// The layout is the updatable sketch image with a fourth preamble long carrying the union
    /// theta.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = self
            .gadget
            .write_updatable(PREAMBLE_LONGS_UNION, Family::UNION);
        SketchMemoryMut::new(&mut bytes)
            .put_u64_le(UNION_THETA_LONG, self.union_theta)
            .expect("union image always holds four preamble longs");
        bytes
    }

    /// Deserializes a union written with the default seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid union image.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        Self::deserialize_with_seed(bytes, DEFAULT_UPDATE_SEED)
    }

    /// Deserializes a union written with the given seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the family is not a union, the seed hash does not match, or the
    /// image is truncated or inconsistent.
    pub fn deserialize_with_seed(bytes: &[u8], seed: u64) -> Result<Self, Error> {
        let (gadget, union_theta) = ThetaSketch::heapify_updatable(bytes, seed, Family::UNION)?;
        let union_theta = union_theta.ok_or_else(|| Error::insufficient_data("union_theta"))?;
        if union_theta == 0 || union_theta > MAX_THETA {
            return Err(Error::deserial(format!(
                "union theta must be in (0, {MAX_THETA}], got {union_theta}"
            )));
        }
        Ok(Self {
            gadget,
            union_theta,
        })
    }
}

/// Builder for ThetaUnion
///
/// Accepts the same settings as [`ThetaSketchBuilder`], which are applied to the internal
/// gadget sketch.
#[derive(Debug, Clone, Default)]
pub struct ThetaUnionBuilder {
    gadget: ThetaSketchBuilder,
}

impl ThetaUnionBuilder {
    /// Set lg_k (log2 of nominal size k).
    ///
    /// # Panics
    ///
    /// If lg_k is not in range [5, 26]
    pub fn lg_k(mut self, lg_k: u8) -> Self {
        self.gadget = self.gadget.lg_k(lg_k);
        self
    }

    /// Set resize factor.
    pub fn resize_factor(mut self, factor: ResizeFactor) -> Self {
        self.gadget = self.gadget.resize_factor(factor);
        self
    }

    /// Set sampling probability p.
    ///
    /// # Panics
    ///
    /// Panics if p is not in range (0.0, 1.0]
    pub fn sampling_probability(mut self, probability: f32) -> Self {
        self.gadget = self.gadget.sampling_probability(probability);
        self
    }

    /// Set hash seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.gadget = self.gadget.seed(seed);
        self
    }

    /// Build the ThetaUnion.
    pub fn build(self) -> ThetaUnion {
        ThetaUnion::with_gadget(self.gadget.build())
    }
}
