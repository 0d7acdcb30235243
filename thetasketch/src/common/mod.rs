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

//! Common types and numeric helpers shared across the theta sketch modules.

mod num_std_dev;
mod resize;

pub use self::num_std_dev::NumStdDev;
pub use self::resize::ResizeFactor;

pub(crate) mod binomial_bounds;

/// Maps a double to the bit pattern used when hashing it, so that `-0.0` and `0.0` hash
/// identically and every NaN collapses to a single value.
pub(crate) fn canonical_double(value: f64) -> u64 {
    if value.is_nan() {
        // the canonical quiet NaN of the JVM
        0x7ff8000000000000u64
    } else {
        // -0.0 + 0.0 == +0.0 under the default rounding mode
        (value + 0.0).to_bits()
    }
}
