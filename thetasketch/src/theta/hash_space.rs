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

//! Pure helpers over the 64-bit hash domain shared by the sketches and set operations.

use crate::error::Error;

/// Returns true if `hash` must be skipped when scanning a cache against `theta`: either an
/// unused slot of a hash table or a hash outside the retained range.
#[inline]
pub(crate) fn continue_condition(theta: u64, hash: u64) -> bool {
    hash == 0 || hash >= theta
}

/// Counts the entries that would be retained under `theta`.
pub(crate) fn count_less_than_theta(entries: &[u64], theta: u64) -> usize {
    entries
        .iter()
        .filter(|&&hash| !continue_condition(theta, hash))
        .count()
}

/// Returns the `k`-th smallest (0-based) value of `entries`.
///
/// The slice is partially reordered: on return every value before index `k` is smaller than the
/// selected one.
pub(crate) fn quick_select(entries: &mut [u64], k: usize) -> Result<u64, Error> {
    if k >= entries.len() {
        return Err(Error::invalid_argument(format!(
            "cannot select index {k} from {} entries",
            entries.len()
        )));
    }
    let (_, kth, _) = entries.select_nth_unstable(k);
    Ok(*kth)
}

/// Copies the `count` entries retained under `theta` out of a cache that may contain unused
/// slots, sorting them if `ordered` is set.
pub(crate) fn compact_cache(entries: &[u64], count: usize, theta: u64, ordered: bool) -> Vec<u64> {
    let mut compact = Vec::with_capacity(count);
    compact.extend(
        entries
            .iter()
            .copied()
            .filter(|&hash| !continue_condition(theta, hash)),
    );
    debug_assert_eq!(compact.len(), count);
    if ordered {
        compact.sort_unstable();
    }
    compact
}
