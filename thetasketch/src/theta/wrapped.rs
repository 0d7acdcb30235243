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

//! Read-only view of a serialized compact theta sketch

use crate::codec::SketchMemory;
use crate::common::NumStdDev;
use crate::error::Error;
use crate::hash::DEFAULT_UPDATE_SEED;
use crate::theta::CompactThetaSketch;
use crate::theta::ThetaSketchView;
use crate::theta::serialization::CompactLayout;

/// A compact theta sketch read in place from its serialized form.
///
/// Wrapping only decodes and validates the preamble; the entries are read from the borrowed
/// buffer on each iteration. Serial versions 1, 2 and 3 are accepted.
///
/// # Examples
///
/// ```
/// # use thetasketch::theta::ThetaSketch;
/// # use thetasketch::theta::WrappedCompactSketch;
/// let mut sketch = ThetaSketch::builder().build();
/// for i in 0..10 {
///     sketch.update(i);
/// }
/// let bytes = sketch.compact(true).serialize();
/// let wrapped = WrappedCompactSketch::wrap(&bytes).unwrap();
/// assert_eq!(wrapped.estimate(), 10.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct WrappedCompactSketch<'a> {
    bytes: &'a [u8],
    layout: CompactLayout,
}

impl<'a> WrappedCompactSketch<'a> {
    /// Wraps bytes produced with the default seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the preamble is invalid or the buffer is shorter than it declares.
    pub fn wrap(bytes: &'a [u8]) -> Result<Self, Error> {
        Self::wrap_with_seed(bytes, DEFAULT_UPDATE_SEED)
    }

    /// Wraps bytes produced with the given seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the preamble is invalid, the seed hash does not match, or the buffer
    /// is shorter than it declares.
    pub fn wrap_with_seed(bytes: &'a [u8], seed: u64) -> Result<Self, Error> {
        let layout = CompactLayout::read(SketchMemory::new(bytes), seed)?;
        Ok(Self { bytes, layout })
    }

    /// Copies the wrapped sketch onto the heap.
    pub fn to_compact(&self) -> CompactThetaSketch {
        CompactThetaSketch::from_parts(
            self.layout.entries(self.bytes).collect(),
            self.layout.theta,
            self.layout.seed_hash,
            self.layout.is_ordered,
            self.layout.is_empty,
        )
    }

    /// Return cardinality estimate
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
        self.layout.theta
    }

    /// Check if sketch is empty
    pub fn is_empty(&self) -> bool {
        self.layout.is_empty
    }

    /// Check if the entries are sorted in ascending order
    pub fn is_ordered(&self) -> bool {
        self.layout.is_ordered
    }

    /// Return number of retained entries
    pub fn num_retained(&self) -> usize {
        self.layout.num_entries
    }

    /// Iterate over the retained hashes, read from the wrapped buffer
    pub fn iter(&self) -> impl Iterator<Item = u64> + 'a {
        self.layout.entries(self.bytes)
    }
}

impl ThetaSketchView for WrappedCompactSketch<'_> {
    fn is_empty(&self) -> bool {
        self.layout.is_empty
    }

    fn theta64(&self) -> u64 {
        self.layout.theta
    }

    fn seed_hash(&self) -> u16 {
        self.layout.seed_hash
    }

    fn is_ordered(&self) -> bool {
        self.layout.is_ordered
    }

    fn num_retained(&self) -> usize {
        self.layout.num_entries
    }

    fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.layout.entries(self.bytes)
    }
}
