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

//! Approximate confidence bounds for an estimate computed from `num_samples` retained hashes
//! sampled with probability `theta`.
//!
//! Small sample counts use the exact posterior of the negative binomial distribution; larger
//! ones fall back to a continuity-corrected normal approximation.

use crate::common::NumStdDev;
use crate::error::Error;

/// Sample counts above this use the normal approximation.
const MAX_EXACT_SAMPLES: u64 = 120;
const EXACT_THETA_LIMIT: f64 = 1.0 - 1e-5;

/// Returns the approximate lower bound of the number of distinct items.
pub(crate) fn lower_bound(
    num_samples: u64,
    theta: f64,
    num_std_dev: NumStdDev,
) -> Result<f64, Error> {
    check_theta(theta)?;
    let estimate = num_samples as f64 / theta;
    let lb = approx_lower_bound(num_samples, theta, num_std_dev);
    Ok(estimate.min((num_samples as f64).max(lb)))
}

/// Returns the approximate upper bound of the number of distinct items.
///
/// `no_data_seen` distinguishes a sketch that never received data, whose upper bound is zero,
/// from one whose retained entries were all sampled away.
pub(crate) fn upper_bound(
    num_samples: u64,
    theta: f64,
    num_std_dev: NumStdDev,
    no_data_seen: bool,
) -> Result<f64, Error> {
    check_theta(theta)?;
    if no_data_seen {
        return Ok(0.0);
    }
    let estimate = num_samples as f64 / theta;
    let ub = approx_upper_bound(num_samples, theta, num_std_dev);
    Ok(estimate.max(ub))
}

fn check_theta(theta: f64) -> Result<(), Error> {
    if theta > 0.0 && theta <= 1.0 {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!(
            "theta must be in the range (0, 1], got {theta}"
        )))
    }
}

fn approx_lower_bound(num_samples: u64, theta: f64, num_std_dev: NumStdDev) -> f64 {
    if theta == 1.0 {
        return num_samples as f64;
    }
    if num_samples == 0 {
        return 0.0;
    }
    if num_samples == 1 {
        let delta = num_std_dev.tail_probability();
        let raw = (1.0 - delta).ln() / (1.0 - theta).ln();
        return raw.floor();
    }
    if num_samples > MAX_EXACT_SAMPLES {
        return cont_classic_lower_bound(num_samples, theta, num_std_dev.as_u8() as f64) - 0.5;
    }
    if theta > EXACT_THETA_LIMIT {
        return num_samples as f64;
    }
    if theta < num_samples as f64 / 360.0 {
        return cont_classic_lower_bound(num_samples, theta, num_std_dev.as_u8() as f64) - 0.5;
    }
    special_n_star(num_samples, theta, num_std_dev.tail_probability()) as f64
}

fn approx_upper_bound(num_samples: u64, theta: f64, num_std_dev: NumStdDev) -> f64 {
    if theta == 1.0 {
        return num_samples as f64;
    }
    if num_samples == 0 {
        let delta = num_std_dev.tail_probability();
        let raw = delta.ln() / (1.0 - theta).ln();
        return raw.ceil();
    }
    if num_samples > MAX_EXACT_SAMPLES {
        return cont_classic_upper_bound(num_samples, theta, num_std_dev.as_u8() as f64) + 0.5;
    }
    if theta > EXACT_THETA_LIMIT {
        return (num_samples + 1) as f64;
    }
    if theta < num_samples as f64 / 360.0 {
        return cont_classic_upper_bound(num_samples, theta, num_std_dev.as_u8() as f64) + 0.5;
    }
    special_n_prime_b(num_samples + 1, theta, num_std_dev.tail_probability()) as f64
}

fn cont_classic_lower_bound(num_samples: u64, theta: f64, num_std_devs: f64) -> f64 {
    let n_hat = (num_samples as f64 - 0.5) / theta;
    let b = num_std_devs * ((1.0 - theta) / theta).sqrt();
    let d = 0.5 * b * (b * b + 4.0 * n_hat).sqrt();
    let center = n_hat + 0.5 * (b * b);
    center - d
}

fn cont_classic_upper_bound(num_samples: u64, theta: f64, num_std_devs: f64) -> f64 {
    let n_hat = (num_samples as f64 + 0.5) / theta;
    let b = num_std_devs * ((1.0 - theta) / theta).sqrt();
    let d = 0.5 * b * (b * b + 4.0 * n_hat).sqrt();
    let center = n_hat + 0.5 * (b * b);
    center + d
}

/// Smallest population size whose posterior tail exceeds `delta`, minus one.
fn special_n_star(num_samples: u64, p: f64, delta: f64) -> u64 {
    debug_assert!(num_samples >= 1);
    debug_assert!(p > 0.0 && p < 1.0);
    let q = 1.0 - p;
    // posterior probability of exactly num_samples items
    let mut cur_term = p.powf(num_samples as f64);
    let mut total = cur_term;
    let mut m = num_samples;
    while total <= delta {
        cur_term = (cur_term * q * m as f64) / ((m + 1 - num_samples) as f64);
        total += cur_term;
        m += 1;
    }
    m - 1
}

/// Smallest population size whose cumulative posterior reaches `1 - delta`.
fn special_n_prime_b(num_samples: u64, p: f64, delta: f64) -> u64 {
    debug_assert!(num_samples >= 1);
    debug_assert!(p > 0.0 && p < 1.0);
    let q = 1.0 - p;
    let one_minus_delta = 1.0 - delta;
    let mut cur_term = p.powf(num_samples as f64);
    let mut total = cur_term;
    let mut m = num_samples;
    while total < one_minus_delta {
        cur_term = (cur_term * q * m as f64) / ((m + 1 - num_samples) as f64);
        total += cur_term;
        m += 1;
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const ALL: [NumStdDev; 3] = [NumStdDev::One, NumStdDev::Two, NumStdDev::Three];

    #[test]
    fn test_exact_mode_returns_count() {
        for nsd in ALL {
            assert_eq!(lower_bound(1000, 1.0, nsd).unwrap(), 1000.0);
            assert_eq!(upper_bound(1000, 1.0, nsd, false).unwrap(), 1000.0);
        }
    }

    #[test]
    fn test_no_data_seen() {
        assert_eq!(upper_bound(0, 0.5, NumStdDev::Two, true).unwrap(), 0.0);
        assert_eq!(lower_bound(0, 0.5, NumStdDev::Two).unwrap(), 0.0);
        // zero samples after sampling still leave room above zero
        assert!(upper_bound(0, 0.5, NumStdDev::Two, false).unwrap() >= 1.0);
    }

    #[test]
    fn test_bounds_bracket_estimate() {
        let cases = [
            (1u64, 0.5),
            (5, 0.3),
            (50, 0.25),
            (100, 0.01),
            (1000, 0.1),
            (4096, 0.06),
        ];
        for (n, theta) in cases {
            let estimate = n as f64 / theta;
            let mut last_lb = f64::MAX;
            let mut last_ub = 0.0;
            for nsd in ALL {
                let lb = lower_bound(n, theta, nsd).unwrap();
                let ub = upper_bound(n, theta, nsd, false).unwrap();
                assert!(lb <= estimate, "n={n} theta={theta} lb={lb}");
                assert!(ub >= estimate, "n={n} theta={theta} ub={ub}");
                assert!(lb >= n as f64);
                // wider intervals for more standard deviations
                assert!(lb <= last_lb);
                assert!(ub >= last_ub);
                last_lb = lb;
                last_ub = ub;
            }
        }
    }

    #[test]
    fn test_large_sample_relative_error() {
        // roughly 2 / sqrt(k) at two standard deviations
        let n = 4096;
        let theta = 0.25;
        let estimate = n as f64 / theta;
        let lb = lower_bound(n, theta, NumStdDev::Two).unwrap();
        let ub = upper_bound(n, theta, NumStdDev::Two, false).unwrap();
        assert!((estimate - lb) / estimate < 0.04);
        assert!((ub - estimate) / estimate < 0.04);
    }

    #[test]
    fn test_invalid_theta() {
        for theta in [0.0, -0.1, 1.5, f64::NAN] {
            let err = lower_bound(10, theta, NumStdDev::One).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
            assert!(upper_bound(10, theta, NumStdDev::One, false).is_err());
        }
    }
}
