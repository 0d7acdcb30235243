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

//! # Theta Sketches
//!
//! Theta sketches estimate the number of distinct items in a stream using a bounded amount of
//! memory. Unlike most distinct counters, independently built theta sketches can be combined
//! with set operations: [`theta::ThetaUnion`], [`theta::ThetaIntersection`] and
//! [`theta::ThetaAnotB`].
//!
//! The binary formats are compatible with the Apache DataSketches compact and updatable theta
//! sketch layouts, serial versions 1 through 3.
//!
//! # Example
//!
//! ```
//! use thetasketch::theta::ThetaSketch;
//! use thetasketch::theta::ThetaUnion;
//!
//! let mut a = ThetaSketch::builder().lg_k(10).build();
//! let mut b = ThetaSketch::builder().lg_k(10).build();
//! for i in 0..100u64 {
//!     a.update(i);
//!     b.update(i + 50);
//! }
//!
//! let mut union = ThetaUnion::builder().lg_k(10).build();
//! union.update(&a).unwrap();
//! union.update(&b.compact(true)).unwrap();
//! assert_eq!(union.result().estimate(), 150.0);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]

pub(crate) mod codec;
pub mod common;
pub mod error;
pub(crate) mod hash;
pub mod theta;

pub use self::codec::Family;
