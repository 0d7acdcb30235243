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

//! Theta sketches and their set operations.
//!
//! [`ThetaSketch`] is the mutable, single-writer sketch that items are fed into. Snapshots are
//! taken as [`CompactThetaSketch`], or read in place from serialized bytes with
//! [`WrappedCompactSketch`]. Any of them can be combined with [`ThetaUnion`],
//! [`ThetaIntersection`] and [`ThetaAnotB`], which accept anything implementing
//! [`ThetaSketchView`].

mod a_not_b;
mod compact;
mod hash_space;
mod hash_table;
mod intersection;
mod serialization;
mod sketch;
mod union;
mod view;
mod wrapped;

pub use self::a_not_b::ThetaAnotB;
pub use self::compact::CompactThetaSketch;
pub use self::hash_table::DEFAULT_LG_K;
pub use self::hash_table::MAX_LG_K;
pub use self::hash_table::MAX_THETA;
pub use self::hash_table::MIN_LG_K;
pub use self::intersection::ThetaIntersection;
pub use self::sketch::ThetaSketch;
pub use self::sketch::ThetaSketchBuilder;
pub use self::union::ThetaUnion;
pub use self::union::ThetaUnionBuilder;
pub use self::view::ThetaSketchView;
pub use self::wrapped::WrappedCompactSketch;
