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


//! Serialization tests for ThetaSketch and CompactThetaSketch

use googletest::assert_that;
use googletest::prelude::contains_substring;
use thetasketch::error::ErrorKind;
use thetasketch::theta::CompactThetaSketch;
use thetasketch::theta::ThetaSketch;
use thetasketch::theta::ThetaUnion;

fn sketch(lg_k: u8, n: u64) -> ThetaSketch {
    let mut sketch = ThetaSketch::builder().lg_k(lg_k).build();
    for i in 0..n {
        sketch.update(i);
    }
    sketch
}

#[test]
fn test_serialize_empty() {
    let sketch = ThetaSketch::builder().lg_k(12).build();
    let bytes = sketch.serialize();

    assert_eq!(bytes.len(), 8, "empty sketch should be 8 bytes");
    assert_eq!(bytes[0], 1, "preamble longs should be 1 for empty");
    assert_eq!(bytes[1], 3, "serial version should be 3");
    assert_eq!(bytes[2], 3, "family should be compact");
    assert_eq!(bytes[3], 12, "lg_k should be 12");

    let restored = ThetaSketch::deserialize(&bytes).unwrap();
    assert!(restored.is_empty());
    assert_eq!(restored.estimate(), 0.0);
    assert_eq!(restored.lg_k(), 12);
}

#[test]
fn test_serialize_single_item() {
    let mut sketch = ThetaSketch::builder().lg_k(12).build();
    sketch.update("apple");

    let bytes = sketch.serialize();
    assert_eq!(bytes.len(), 24, "single item sketch should be 24 bytes");
    assert_eq!(bytes[0], 2, "preamble longs should be 2 for exact mode");

    let restored = ThetaSketch::deserialize(&bytes).unwrap();
    assert!(!restored.is_empty());
    assert_eq!(restored.estimate(), 1.0);
    assert_eq!(restored.num_retained(), 1);
}

#[test]
fn test_serialize_exact_mode() {
    let mut sketch = ThetaSketch::builder().lg_k(12).build();
    for i in 0..100 {
        sketch.update(format!("item_{i}"));
    }
    assert!(!sketch.is_estimation_mode());

    let bytes = sketch.serialize();
    assert_eq!(bytes.len(), 16 + 100 * 8);
    assert_eq!(bytes[0], 2);

    let restored = ThetaSketch::deserialize(&bytes).unwrap();
    assert_eq!(restored.estimate(), sketch.estimate());
    assert_eq!(restored.num_retained(), sketch.num_retained());
    assert!(!restored.is_estimation_mode());
}

#[test]
fn test_serialize_estimation_mode() {
    let sketch = sketch(10, 10000);
    assert!(sketch.is_estimation_mode());

    let bytes = sketch.serialize();
    assert_eq!(bytes.len(), 24 + sketch.num_retained() * 8);
    assert_eq!(bytes[0], 3);

    let restored = ThetaSketch::deserialize(&bytes).unwrap();
    assert_eq!(restored.estimate(), sketch.estimate());
    assert_eq!(restored.num_retained(), sketch.num_retained());
    assert_eq!(restored.theta64(), sketch.theta64());
    assert!(restored.is_estimation_mode());
}

#[test]
fn test_round_trip_various_lg_k() {
    for lg_k in [5, 8, 10, 12, 14, 16] {
        let mut sketch = ThetaSketch::builder().lg_k(lg_k).build();
        for i in 0..500 {
            sketch.update(format!("lg_k_{lg_k}_item_{i}"));
        }

        let restored = ThetaSketch::deserialize(&sketch.serialize()).unwrap();
        assert_eq!(restored.lg_k(), lg_k, "lg_k mismatch for lg_k={lg_k}");
        assert_eq!(restored.estimate(), sketch.estimate(), "lg_k={lg_k}");
        assert_eq!(restored.num_retained(), sketch.num_retained(), "lg_k={lg_k}");
    }
}

#[test]
fn test_round_trip_all_serial_versions() {
    let mut sampled = ThetaSketch::builder().sampling_probability(0.001).build();
    sampled.update(1);
    assert!(!sampled.is_empty());
    assert_eq!(sampled.num_retained(), 0);

    let cases = [
        ThetaSketch::builder().build(),
        sketch(12, 1),
        sketch(12, 100),
        sketch(6, 5000),
        sampled,
    ];
    for sketch in cases {
        for ordered in [true, false] {
            let compact = sketch.compact(ordered);
            for version in [1, 2, 3] {
                let bytes = match compact.serialize_version(version) {
                    Ok(bytes) => bytes,
                    Err(err) => {
                        // version 1 would read a non-empty sketch without entries as empty
                        assert_eq!(version, 1);
                        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
                        assert!(!compact.is_empty());
                        assert_eq!(compact.num_retained(), 0);
                        continue;
                    }
                };
                assert_eq!(bytes[1], version);
                let restored = CompactThetaSketch::deserialize(&bytes).unwrap();
                assert_eq!(restored.estimate(), compact.estimate(), "v{version}");
                assert_eq!(restored.theta64(), compact.theta64(), "v{version}");
                assert_eq!(restored.num_retained(), compact.num_retained());

                let mut expected: Vec<u64> = compact.iter().collect();
                let mut actual: Vec<u64> = restored.iter().collect();
                expected.sort_unstable();
                actual.sort_unstable();
                assert_eq!(actual, expected, "v{version}");
            }
        }
    }
}

#[test]
fn test_updatable_round_trip_continues_updating() {
    let mut sketch = sketch(7, 3000);
    let mut restored = ThetaSketch::deserialize(&sketch.serialize_updatable()).unwrap();
    assert_eq!(restored.estimate(), sketch.estimate());

    for i in 3000..6000 {
        sketch.update(i);
        restored.update(i);
    }
    assert_eq!(restored.estimate(), sketch.estimate());
    assert_eq!(restored.theta64(), sketch.theta64());
}

#[test]
fn test_union_round_trip() {
    let mut union = ThetaUnion::builder().lg_k(6).build();
    union.update(&sketch(6, 2000)).unwrap();
    union.update_item("extra");

    let bytes = union.serialize();
    let restored = ThetaUnion::deserialize(&bytes).unwrap();
    assert_eq!(restored.result(), union.result());
}

#[test]
fn test_deserialize_invalid_data() {
    let err = ThetaSketch::deserialize(&[1, 2, 3]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedBuffer);

    let bad_family = [1, 3, 99, 12, 12, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    let err = ThetaSketch::deserialize(&bad_family).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleFamily);

    let err = CompactThetaSketch::deserialize(&bad_family).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleFamily);
}

#[test]
fn test_deserialize_unsupported_version() {
    let mut bytes = sketch(12, 10).compact(true).serialize();
    bytes[1] = 4;
    let err = CompactThetaSketch::deserialize(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedSerialVersion);
}

#[test]
fn test_deserialize_truncated_entries() {
    let bytes = sketch(12, 10).compact(true).serialize();
    let err = CompactThetaSketch::deserialize(&bytes[..bytes.len() - 4]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedBuffer);
}

#[test]
fn test_serialize_with_custom_seed() {
    let custom_seed = 12345u64;
    let mut sketch = ThetaSketch::builder().lg_k(10).seed(custom_seed).build();
    sketch.update("test");

    let bytes = sketch.serialize();
    let err = ThetaSketch::deserialize(&bytes).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleSeed);
    assert_that!(err.message(), contains_substring("incompatible seed hash"));

    let restored = ThetaSketch::deserialize_with_seed(&bytes, custom_seed).unwrap();
    assert_eq!(restored.estimate(), sketch.estimate());

    let err = ThetaSketch::deserialize(&sketch.serialize_updatable()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IncompatibleSeed);
}

#[test]
fn test_version_1_does_not_check_seed() {
    let mut sketch = ThetaSketch::builder().seed(12345).build();
    sketch.update("test");
    let bytes = sketch.compact(true).serialize_version(1).unwrap();

    let restored = CompactThetaSketch::deserialize(&bytes).unwrap();
    assert_eq!(restored.estimate(), 1.0);
}

#[test]
fn test_serialized_entries_are_sorted() {
    let bytes = sketch(12, 10).serialize();

    let entries: Vec<u64> = bytes[16..]
        .chunks_exact(8)
        .map(|chunk| u64::from_le_bytes(chunk.try_into().unwrap()))
        .collect();
    assert_eq!(entries.len(), 10);
    assert!(entries.is_sorted(), "serialized entries should be sorted");
}
