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

use std::hash::Hash;

use tracing::debug;

use crate::common::ResizeFactor;
use crate::hash::MurmurHash3X64128;
use crate::hash::compute_seed_hash;
use crate::theta::hash_space;

/// Maximum theta value (signed max for compatibility with Java)
pub const MAX_THETA: u64 = i64::MAX as u64;

/// Minimum log2 of K
pub const MIN_LG_K: u8 = 5;

/// Maximum log2 of K
pub const MAX_LG_K: u8 = 26;

/// Default log2 of K
pub const DEFAULT_LG_K: u8 = 12;

/// Resize threshold (0.5 = 50% load factor)
const RESIZE_THRESHOLD: f64 = 0.5;

/// Rebuild threshold (15/16 = 93.75% load factor)
pub(crate) const REBUILD_THRESHOLD: f64 = 15.0 / 16.0;

/// Stride hash bits (7 bits for stride calculation)
const STRIDE_HASH_BITS: u8 = 7;

/// Stride mask
const STRIDE_MASK: u64 = (1 << STRIDE_HASH_BITS) - 1;

/// Open addressing hash table holding the retained hashes of a theta sketch.
///
/// It maintains an array capacity max to 2^lg_max_size:
/// * Before it reaches the max capacity, it will extend the array based on resize_factor.
/// * After it reaches the capacity bigger than 2^lg_nom_size, every time the number of entries
///   exceeds the threshold, it will rebuild the table: only keep the min 2^lg_nom_size entries and
///   update the theta to the k-th smallest entry.
#[derive(Debug, Clone)]
pub(crate) struct ThetaHashTable {
    lg_cur_size: u8,
    lg_nom_size: u8,
    lg_max_size: u8,
    resize_factor: ResizeFactor,
    sampling_probability: f32,
    hash_seed: u64,

    // Logical emptiness of the source set. This can be false even when `num_retained` is 0 (e.g.
    // all updates screened by theta).
    is_empty: bool,

    theta: u64,

    // Slots of the table; zero marks an unused slot.
    entries: Vec<u64>,

    num_retained: usize,
}

impl ThetaHashTable {
    pub fn new(
        lg_nom_size: u8,
        resize_factor: ResizeFactor,
        sampling_probability: f32,
        hash_seed: u64,
    ) -> Self {
        let lg_max_size = lg_nom_size + 1;
        let lg_cur_size = starting_sub_multiple(lg_max_size, MIN_LG_K, resize_factor.lg_value());
        Self::from_raw_parts(
            lg_cur_size,
            lg_nom_size,
            resize_factor,
            sampling_probability,
            starting_theta_from_sampling_probability(sampling_probability),
            hash_seed,
            true,
        )
    }

    /// Create an empty table with explicit state.
    ///
    /// A `lg_cur_size` of zero creates a table without slots, which set operations use to
    /// represent a result with no entries.
    ///
    /// # Panics
    ///
    /// Panics if `lg_cur_size > lg_nom_size + 1`.
    pub fn from_raw_parts(
        lg_cur_size: u8,
        lg_nom_size: u8,
        resize_factor: ResizeFactor,
        sampling_probability: f32,
        theta: u64,
        hash_seed: u64,
        is_empty: bool,
    ) -> Self {
        let lg_max_size = lg_nom_size + 1;
        assert!(
            lg_cur_size <= lg_max_size,
            "lg_cur_size must be <= lg_nom_size + 1, got lg_cur_size={lg_cur_size}, lg_nom_size={lg_nom_size}"
        );
        let size = if lg_cur_size > 0 { 1 << lg_cur_size } else { 0 };
        Self {
            lg_cur_size,
            lg_nom_size,
            lg_max_size,
            resize_factor,
            sampling_probability,
            hash_seed,
            is_empty,
            theta,
            entries: vec![0u64; size],
            num_retained: 0,
        }
    }

    /// Hash a value with the table seed and return the hash.
    pub fn hash<T: Hash>(&self, value: T) -> u64 {
        let mut hasher = MurmurHash3X64128::with_seed(self.hash_seed);
        value.hash(&mut hasher);
        let (h1, _) = hasher.finish128();
        h1 >> 1 // To make it compatible with Java version
    }

    /// Find index in a given entries.
    ///
    /// Returns the index of the slot holding `key`, or of the empty slot where it would be
    /// inserted. Returns None if the table has no slots or is full without `key`.
    fn find_in_entries(entries: &[u64], key: u64, lg_size: u8) -> Option<usize> {
        if entries.is_empty() {
            return None;
        }

        let mask = entries.len() - 1;
        let stride = get_stride(key, lg_size);
        let mut index = (key as usize) & mask;
        let loop_index = index;

        loop {
            let probe = entries[index];
            if probe == 0 || probe == key {
                return Some(index);
            }
            index = (index + stride) & mask;
            if index == loop_index {
                return None;
            }
        }
    }

    /// Returns true if `hash` is stored in the table.
    pub fn contains_hash(&self, hash: u64) -> bool {
        match Self::find_in_entries(&self.entries, hash, self.lg_cur_size) {
            Some(index) => hash != 0 && self.entries[index] == hash,
            None => false,
        }
    }

    /// Inserts a pre-hashed value into the table.
    ///
    /// Hashes outside the valid domain `(0, MAX_THETA]` are rejected without touching the table.
    /// Any other hash marks the source set as non-empty, and is stored if it is below theta.
    ///
    /// Returns true if the value was inserted (new), false otherwise.
    pub fn try_insert_hash(&mut self, hash: u64) -> bool {
        if hash == 0 || hash > MAX_THETA {
            return false;
        }
        self.is_empty = false;

        if hash >= self.theta {
            return false;
        }

        let Some(index) = Self::find_in_entries(&self.entries, hash, self.lg_cur_size) else {
            unreachable!(
                "Resize or rebuild should be called to make sure it always can find the entry."
            );
        };

        // Already exists
        if self.entries[index] == hash {
            return false;
        }

        self.entries[index] = hash;
        self.num_retained += 1;

        if self.num_retained > self.get_capacity() {
            if self.lg_cur_size <= self.lg_nom_size {
                self.resize();
            } else {
                self.rebuild();
            }
        }
        true
    }

    /// Get capacity threshold
    fn get_capacity(&self) -> usize {
        let fraction = if self.lg_cur_size <= self.lg_nom_size {
            RESIZE_THRESHOLD
        } else {
            REBUILD_THRESHOLD
        };
        (fraction * self.entries.len() as f64) as usize
    }

    fn resize(&mut self) {
        let new_lg_size = std::cmp::min(
            self.lg_cur_size + self.resize_factor.lg_value(),
            self.lg_max_size,
        );
        debug!(
            from = self.lg_cur_size,
            to = new_lg_size,
            retained = self.num_retained,
            "resizing theta hash table"
        );

        let mut new_entries = vec![0u64; 1 << new_lg_size];
        for &entry in self.entries.iter().filter(|&&e| e != 0) {
            let Some(idx) = Self::find_in_entries(&new_entries, entry, new_lg_size) else {
                unreachable!("a grown table always has a free slot for every entry");
            };
            new_entries[idx] = entry;
        }

        self.entries = new_entries;
        self.lg_cur_size = new_lg_size;
    }

    /// Rebuild the hash table:
    /// The number of entries will be reduced to the nominal size k.
    fn rebuild(&mut self) {
        // Select the k-th smallest entry as new theta and keep the lesser entries.
        self.entries.retain(|&e| e != 0);
        let k = 1usize << self.lg_nom_size;
        let Ok(kth) = hash_space::quick_select(&mut self.entries, k) else {
            unreachable!("rebuild is only called with more than k entries retained");
        };
        debug!(
            retained = self.num_retained,
            k,
            old_theta = self.theta,
            new_theta = kth,
            "rebuilding theta hash table"
        );
        self.theta = kth;

        let mut new_entries = vec![0u64; 1 << self.lg_cur_size];
        for &entry in &self.entries[..k] {
            let Some(idx) = Self::find_in_entries(&new_entries, entry, self.lg_cur_size) else {
                unreachable!("a table of 2k slots always has a free slot for k entries");
            };
            new_entries[idx] = entry;
        }

        self.num_retained = k;
        self.entries = new_entries;
    }

    /// Trim the table to nominal size k
    pub fn trim(&mut self) {
        if self.num_retained > (1 << self.lg_nom_size) {
            self.rebuild();
        }
    }

    /// Reset the table to empty state
    pub fn reset(&mut self) {
        let init_lg_cur = starting_sub_multiple(
            self.lg_nom_size + 1,
            MIN_LG_K,
            self.resize_factor.lg_value(),
        );

        if self.entries.len() != 1 << init_lg_cur {
            self.entries.resize(1 << init_lg_cur, 0);
        }
        self.entries.fill(0);
        self.num_retained = 0;
        self.theta = starting_theta_from_sampling_probability(self.sampling_probability);
        self.is_empty = true;
        self.lg_cur_size = init_lg_cur;
    }

    pub fn num_retained(&self) -> usize {
        self.num_retained
    }

    pub fn theta(&self) -> u64 {
        self.theta
    }

    pub fn set_theta(&mut self, theta: u64) {
        self.theta = theta;
    }

    /// Check if emptiness of the source set
    pub fn is_empty(&self) -> bool {
        self.is_empty
    }

    pub fn set_empty(&mut self, is_empty: bool) {
        self.is_empty = is_empty;
    }

    /// Get iterator over entries
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.iter().copied().filter(|&e| e != 0)
    }

    /// Returns the raw slots of the table, unused slots included.
    pub fn entries(&self) -> &[u64] {
        &self.entries
    }

    pub fn lg_nom_size(&self) -> u8 {
        self.lg_nom_size
    }

    pub fn lg_cur_size(&self) -> u8 {
        self.lg_cur_size
    }

    pub fn resize_factor(&self) -> ResizeFactor {
        self.resize_factor
    }

    pub fn sampling_probability(&self) -> f32 {
        self.sampling_probability
    }

    pub fn hash_seed(&self) -> u64 {
        self.hash_seed
    }

    /// Get the hash of the seed that was used to hash the input.
    pub fn seed_hash(&self) -> u16 {
        compute_seed_hash(self.hash_seed)
    }

    /// Returns the smallest lg size of a table that holds `count` entries without exceeding
    /// `load_factor`.
    pub fn lg_size_from_count_for_rebuild(count: usize, load_factor: f64) -> u8 {
        let lg = count.next_power_of_two().trailing_zeros() as u8;
        if count > ((1usize << lg) as f64 * load_factor) as usize {
            lg + 1
        } else {
            lg
        }
    }
}

/// Get stride for hash table probing
fn get_stride(key: u64, lg_size: u8) -> usize {
    (2 * ((key >> lg_size) & STRIDE_MASK) + 1) as usize
}

/// Compute initial lg_size for hash table based on target lg_size, minimum lg_size, and resize
/// factor. Make sure `lg_target = lg_init + n * lg_resize_factor`, where `n` is an integer and
/// `lg_init >= lg_min`
fn starting_sub_multiple(lg_target: u8, lg_min: u8, lg_resize_factor: u8) -> u8 {
    if lg_target <= lg_min {
        lg_min
    } else if lg_resize_factor == 0 {
        lg_target
    } else {
        ((lg_target - lg_min) % lg_resize_factor) + lg_min
    }
}

/// Compute initial theta for hash table based on sampling probability.
pub(crate) fn starting_theta_from_sampling_probability(sampling_probability: f32) -> u64 {
    if sampling_probability < 1.0 {
        (MAX_THETA as f64 * sampling_probability as f64) as u64
    } else {
        MAX_THETA
    }
}
