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


use googletest::assert_that;
use googletest::prelude::ge;
use googletest::prelude::le;
use googletest::prelude::near;
use thetasketch::common::NumStdDev;
use thetasketch::common::ResizeFactor;
use thetasketch::theta::ThetaSketch;

#[test]
fn test_basic_update() {
    let mut sketch = ThetaSketch::builder().lg_k(12).build();
    assert!(sketch.is_empty());
    assert_eq!(sketch.estimate(), 0.0);

    sketch.update("value1");
    assert!(!sketch.is_empty());
    assert_eq!(sketch.estimate(), 1.0);

    sketch.update("value2");
    assert_eq!(sketch.estimate(), 2.0);
}

#[test]
fn test_update_various_types() {
    let mut sketch = ThetaSketch::builder().lg_k(12).build();

    sketch.update("string");
    sketch.update(42i64);
    sketch.update(42u64);
    sketch.update_f64(3.15);
    sketch.update_f64(3.15);
    sketch.update_f32(3.15);
    sketch.update_f32(3.15);
    sketch.update([1u8, 2, 3]);

    assert!(!sketch.is_empty());
    assert_eq!(sketch.estimate(), 5.0);
}

#[test]
fn test_canonical_doubles() {
    let mut sketch = ThetaSketch::builder().build();
    sketch.update_f64(0.0);
    sketch.update_f64(-0.0);
    sketch.update_f64(f64::NAN);
    sketch.update_f64(-f64::NAN);
    assert_eq!(sketch.estimate(), 2.0);
}

#[test]
fn test_duplicate_updates() {
    let mut sketch = ThetaSketch::builder().lg_k(12).build();
    for _ in 0..100 {
        sketch.update("same_value");
    }
    assert_eq!(sketch.estimate(), 1.0);
}

#[test]
fn test_theta_reduction() {
    let mut sketch = ThetaSketch::builder().lg_k(5).build();
    assert!(!sketch.is_estimation_mode());

    for i in 0..1000 {
        sketch.update(format!("value_{i}"));
    }

    assert!(sketch.is_estimation_mode());
    assert!(sketch.theta() < 1.0);
    assert!(sketch.iter().all(|hash| hash < sketch.theta64()));
}

#[test]
fn test_trim() {
    let mut sketch = ThetaSketch::builder().lg_k(5).build();
    for i in 0..1000 {
        sketch.update(format!("value_{i}"));
    }

    let before_trim = sketch.num_retained();
    let theta_before = sketch.theta64();
    sketch.trim();

    assert!(sketch.num_retained() <= before_trim);
    assert_eq!(sketch.num_retained(), 32);
    assert!(sketch.theta64() <= theta_before);
}

#[test]
fn test_reset() {
    let mut sketch = ThetaSketch::builder().lg_k(5).build();
    for i in 0..1000 {
        sketch.update(format!("value_{i}"));
    }
    assert!(sketch.is_estimation_mode());
    assert!(sketch.num_retained() > 32);

    sketch.reset();
    assert!(sketch.is_empty());
    assert_eq!(sketch.estimate(), 0.0);
    assert_eq!(sketch.theta(), 1.0);
    assert_eq!(sketch.num_retained(), 0);
    assert!(!sketch.is_estimation_mode());
    assert_eq!(sketch.lower_bound(NumStdDev::One), 0.0);
    assert_eq!(sketch.upper_bound(NumStdDev::One), 0.0);
}

#[test]
fn test_resize_factors_agree() {
    let mut estimates = vec![];
    for factor in [
        ResizeFactor::X1,
        ResizeFactor::X2,
        ResizeFactor::X4,
        ResizeFactor::X8,
    ] {
        let mut sketch = ThetaSketch::builder()
            .lg_k(10)
            .resize_factor(factor)
            .build();
        for i in 0..500 {
            sketch.update(i);
        }
        estimates.push(sketch.estimate());
    }
    assert_eq!(estimates, vec![500.0; 4]);
}

#[test]
fn test_iterator() {
    let mut sketch = ThetaSketch::builder().lg_k(12).build();
    sketch.update("value1");
    sketch.update("value2");
    sketch.update("value3");

    assert_eq!(sketch.iter().count(), sketch.num_retained());
}

#[test]
fn test_bounds_empty_sketch() {
    let sketch = ThetaSketch::builder().lg_k(12).build();
    assert!(sketch.is_empty());
    assert!(!sketch.is_estimation_mode());
    assert_eq!(sketch.theta(), 1.0);
    assert_eq!(sketch.estimate(), 0.0);
    for nsd in [NumStdDev::One, NumStdDev::Two, NumStdDev::Three] {
        assert_eq!(sketch.lower_bound(nsd), 0.0);
        assert_eq!(sketch.upper_bound(nsd), 0.0);
    }
}

#[test]
fn test_bounds_exact_mode() {
    let mut sketch = ThetaSketch::builder().lg_k(12).build();
    for i in 0..2000 {
        sketch.update(i);
    }
    assert!(!sketch.is_estimation_mode());
    assert_eq!(sketch.theta(), 1.0);
    assert_eq!(sketch.estimate(), 2000.0);
    assert_eq!(sketch.lower_bound(NumStdDev::One), 2000.0);
    assert_eq!(sketch.upper_bound(NumStdDev::One), 2000.0);
}

#[test]
fn test_bounds_estimation_mode() {
    let mut sketch = ThetaSketch::builder().lg_k(12).build();
    let n = 10000;
    for i in 0..n {
        sketch.update(i);
    }
    assert!(sketch.is_estimation_mode());

    let estimate = sketch.estimate();
    assert_that!(estimate, near(n as f64, n as f64 * 0.02));

    let lb1 = sketch.lower_bound(NumStdDev::One);
    let ub1 = sketch.upper_bound(NumStdDev::One);
    let lb2 = sketch.lower_bound(NumStdDev::Two);
    let ub2 = sketch.upper_bound(NumStdDev::Two);
    let lb3 = sketch.lower_bound(NumStdDev::Three);
    let ub3 = sketch.upper_bound(NumStdDev::Three);

    assert!(lb1 < estimate && estimate < ub1);
    assert!(lb3 < lb2 && lb2 < lb1);
    assert!(ub1 < ub2 && ub2 < ub3);
}

#[test]
fn test_bounds_with_sampling() {
    let mut sketch = ThetaSketch::builder()
        .lg_k(12)
        .sampling_probability(0.5)
        .build();
    for i in 0..1000 {
        sketch.update(i);
    }

    assert!(sketch.is_estimation_mode());
    assert_that!(sketch.theta(), near(0.5, 1e-6));
    assert_that!(sketch.estimate(), ge(sketch.lower_bound(NumStdDev::Two)));
    assert_that!(sketch.estimate(), le(sketch.upper_bound(NumStdDev::Two)));
}

#[test]
fn test_bounds_empty_sampled_sketch() {
    let sketch = ThetaSketch::builder()
        .lg_k(12)
        .sampling_probability(0.1)
        .build();

    // Nothing was seen, so the sampling threshold does not apply yet.
    assert!(sketch.is_empty());
    assert!(!sketch.is_estimation_mode());
    assert_eq!(sketch.theta(), 1.0);
    assert_eq!(sketch.estimate(), 0.0);
    assert_eq!(sketch.lower_bound(NumStdDev::One), 0.0);
    assert_eq!(sketch.upper_bound(NumStdDev::One), 0.0);
}

#[test]
fn test_sampled_sketch_that_saw_data() {
    let mut sketch = ThetaSketch::builder().sampling_probability(0.001).build();
    sketch.update(1u64);

    assert!(!sketch.is_empty());
    assert_eq!(sketch.num_retained(), 0);
    assert!(sketch.is_estimation_mode());
    assert_that!(sketch.theta(), near(0.001, 1e-10));
    assert_eq!(sketch.estimate(), 0.0);
    assert_that!(sketch.upper_bound(NumStdDev::Two), ge(0.0));
}

#[test]
fn test_compact_preserves_estimate() {
    let mut sketch = ThetaSketch::builder().lg_k(8).build();
    for i in 0..5000 {
        sketch.update(i);
    }
    for ordered in [true, false] {
        let compact = sketch.compact(ordered);
        assert_eq!(compact.is_ordered(), ordered);
        assert_eq!(compact.estimate(), sketch.estimate());
        assert_eq!(compact.theta64(), sketch.theta64());
        assert_eq!(
            compact.lower_bound(NumStdDev::Two),
            sketch.lower_bound(NumStdDev::Two)
        );
    }
}

#[test]
#[should_panic(expected = "lg_k must be in [5, 26]")]
fn test_builder_rejects_lg_k() {
    ThetaSketch::builder().lg_k(4);
}

#[test]
#[should_panic(expected = "sampling_probability must be in (0.0, 1.0]")]
fn test_builder_rejects_sampling_probability() {
    ThetaSketch::builder().sampling_probability(0.0);
}
