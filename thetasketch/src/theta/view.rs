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

use crate::common::NumStdDev;
use crate::common::binomial_bounds;
use crate::theta::hash_table::MAX_THETA;

/// Read-only access to the state every theta sketch shares.
///
/// The set operations are generic over this trait, so they accept updatable sketches, compact
/// sketches, sketches wrapped over serialized bytes, references to any of those, and `Option`s
/// where `None` stands for the empty set.
pub trait ThetaSketchView {
    /// Returns true if the sketch represents the empty set.
    ///
    /// A sketch that received data but retained nothing because of sampling is not empty.
    fn is_empty(&self) -> bool;

    /// Returns the sampling threshold as a 64-bit integer in `(0, MAX_THETA]`.
    fn theta64(&self) -> u64;

    /// Returns the 16-bit fingerprint of the seed the hashes were computed with.
    fn seed_hash(&self) -> u16;

    /// Returns true if [`iter`](Self::iter) yields hashes in ascending order.
    fn is_ordered(&self) -> bool;

    /// Returns the number of retained hashes.
    fn num_retained(&self) -> usize;

    /// Returns an iterator over the retained hashes, each in `(0, theta64)`.
    fn iter(&self) -> impl Iterator<Item = u64> + '_;

    /// Returns theta as a fraction in `(0.0, 1.0]`.
    fn theta(&self) -> f64 {
        self.theta64() as f64 / MAX_THETA as f64
    }

    /// Returns true if the sketch retains a sample instead of every distinct hash.
    fn is_estimation_mode(&self) -> bool {
        self.theta64() < MAX_THETA && !self.is_empty()
    }

    /// Returns the estimated number of distinct items.
    fn estimate(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.num_retained() as f64 / self.theta()
    }

    /// Returns the approximate lower error bound given the specified number of standard
    /// deviations.
    fn lower_bound(&self, num_std_dev: NumStdDev) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        if !self.is_estimation_mode() {
            return self.num_retained() as f64;
        }
        binomial_bounds::lower_bound(self.num_retained() as u64, self.theta(), num_std_dev)
            .expect("theta should always be valid")
    }

    /// Returns the approximate upper error bound given the specified number of standard
    /// deviations.
    fn upper_bound(&self, num_std_dev: NumStdDev) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        if !self.is_estimation_mode() {
            return self.num_retained() as f64;
        }
        binomial_bounds::upper_bound(
            self.num_retained() as u64,
            self.theta(),
            num_std_dev,
            self.is_empty(),
        )
        .expect("theta should always be valid")
    }
}

impl<S: ThetaSketchView + ?Sized> ThetaSketchView for &S {
    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn theta64(&self) -> u64 {
        (**self).theta64()
    }

    fn seed_hash(&self) -> u16 {
        (**self).seed_hash()
    }

    fn is_ordered(&self) -> bool {
        (**self).is_ordered()
    }

    fn num_retained(&self) -> usize {
        (**self).num_retained()
    }

    fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        (**self).iter()
    }
}

/// `None` is the empty set: theta at max, nothing retained, compatible with every seed.
impl<S: ThetaSketchView> ThetaSketchView for Option<S> {
    fn is_empty(&self) -> bool {
        self.as_ref().is_none_or(|s| s.is_empty())
    }

    fn theta64(&self) -> u64 {
        self.as_ref().map_or(MAX_THETA, |s| s.theta64())
    }

    fn seed_hash(&self) -> u16 {
        self.as_ref().map_or(0, |s| s.seed_hash())
    }

    fn is_ordered(&self) -> bool {
        self.as_ref().is_none_or(|s| s.is_ordered())
    }

    fn num_retained(&self) -> usize {
        self.as_ref().map_or(0, |s| s.num_retained())
    }

    fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.as_ref().into_iter().flat_map(|s| s.iter())
    }
}
