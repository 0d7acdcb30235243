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

mod murmurhash;

pub(crate) use self::murmurhash::MurmurHash3X64128;

/// The default seed used to hash items into theta sketches.
///
/// Sketches can only be combined when they were built with the same seed, so a change of seed
/// makes every previously serialized sketch incompatible.
pub(crate) const DEFAULT_UPDATE_SEED: u64 = 9001;

/// Computes the 16-bit seed hash from the given long seed.
///
/// # Panics
///
/// Panics if the computed seed hash is zero, since zero marks the absence of a seed hash in
/// serial version 1 buffers.
pub(crate) fn compute_seed_hash(seed: u64) -> u16 {
    use std::hash::Hasher;

    let mut hasher = MurmurHash3X64128::with_seed(0);
    hasher.write(&seed.to_le_bytes());
    let (h1, _) = hasher.finish128();
    let seed_hash = (h1 & 0xffff) as u16;
    assert_ne!(seed_hash, 0, "seed {seed} produces a zero seed hash");
    seed_hash
}
