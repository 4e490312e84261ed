//! Constant-velocity Kalman filter over bounding box state.
//!
//! The state is 8-dimensional: (cx, cy, aspect, h) plus their velocities.
//! Process and measurement noise scale with the box height, so uncertainty
//! stays proportional to apparent object size.

use ndarray::{Array1, Array2};

use crate::error::TrackError;

const NDIM: usize = 4;

#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: Array2<f64>,
    update_mat: Array2<f64>,
    std_weight_position: f64,
    std_weight_velocity: f64,
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl KalmanFilter {
    pub fn new() -> Self {
        let mut motion_mat = Array2::eye(2 * NDIM);
        for i in 0..NDIM {
            motion_mat[[i, NDIM + i]] = 1.0;
        }

        let mut update_mat = Array2::zeros((NDIM, 2 * NDIM));
        for i in 0..NDIM {
            update_mat[[i, i]] = 1.0;
        }

        Self {
            motion_mat,
            update_mat,
            std_weight_position: 1.0 / 20.0,
            std_weight_velocity: 1.0 / 160.0,
        }
    }

    /// Initialize a fresh state distribution from an XYAH measurement.
    ///
    /// Velocities start at zero with high uncertainty.
    pub fn initiate(&self, measurement: [f64; 4]) -> (Array1<f64>, Array2<f64>) {
        let mut mean = Array1::zeros(2 * NDIM);
        for i in 0..NDIM {
            mean[i] = measurement[i];
        }

        let h = measurement[3];
        let std = [
            2.0 * self.std_weight_position * h,
            2.0 * self.std_weight_position * h,
            1e-2,
            2.0 * self.std_weight_position * h,
            10.0 * self.std_weight_velocity * h,
            10.0 * self.std_weight_velocity * h,
            1e-5,
            10.0 * self.std_weight_velocity * h,
        ];

        let mut cov = Array2::zeros((2 * NDIM, 2 * NDIM));
        for i in 0..2 * NDIM {
            cov[[i, i]] = std[i] * std[i];
        }

        (mean, cov)
    }

    /// Advance the state one time step under the constant-velocity model.
    ///
    /// Safe to call many times in a row without a correction: the
    /// covariance grows by a fixed positive-definite process term each
    /// step and stays finite for finite state.
    pub fn predict(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let h = mean[3];
        let std = [
            self.std_weight_position * h,
            self.std_weight_position * h,
            1e-2,
            self.std_weight_position * h,
            self.std_weight_velocity * h,
            self.std_weight_velocity * h,
            1e-5,
            self.std_weight_velocity * h,
        ];

        let mut motion_cov = Array2::zeros((2 * NDIM, 2 * NDIM));
        for i in 0..2 * NDIM {
            motion_cov[[i, i]] = std[i] * std[i];
        }

        let new_mean = self.motion_mat.dot(mean);
        let new_covariance = self.motion_mat.dot(covariance).dot(&self.motion_mat.t()) + motion_cov;

        (new_mean, new_covariance)
    }

    /// Project the state distribution into measurement space.
    fn project(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
    ) -> (Array1<f64>, Array2<f64>) {
        let h = mean[3];
        let std = [
            self.std_weight_position * h,
            self.std_weight_position * h,
            1e-1,
            self.std_weight_position * h,
        ];

        let mut innovation_cov = Array2::zeros((NDIM, NDIM));
        for i in 0..NDIM {
            innovation_cov[[i, i]] = std[i] * std[i];
        }

        let mean_proj = self.update_mat.dot(mean);
        let covariance_proj =
            self.update_mat.dot(covariance).dot(&self.update_mat.t()) + innovation_cov;

        (mean_proj, covariance_proj)
    }

    /// Fuse an XYAH observation into the state, shrinking uncertainty.
    ///
    /// Fails only if the projected measurement covariance is singular,
    /// which a caller must treat as "keep the predicted state".
    pub fn correct(
        &self,
        mean: &Array1<f64>,
        covariance: &Array2<f64>,
        measurement: [f64; 4],
    ) -> Result<(Array1<f64>, Array2<f64>), TrackError> {
        let (projected_mean, projected_cov) = self.project(mean, covariance);

        let measurement_arr = Array1::from_vec(measurement.to_vec());
        let innovation = measurement_arr - projected_mean;

        // K = P * H^T * S^-1, with H = [I 0] so P * H^T is the left
        // 8x4 block of P and S is the 4x4 projected covariance.
        let s_inv = invert_4x4(&projected_cov).ok_or_else(|| {
            TrackError::Numerical("projected measurement covariance is singular".into())
        })?;

        let pht = covariance.dot(&self.update_mat.t()); // 8x4
        let kalman_gain = pht.dot(&s_inv); // 8x4

        let new_mean = mean + kalman_gain.dot(&innovation);
        let new_covariance = covariance - kalman_gain.dot(&projected_cov).dot(&kalman_gain.t());

        Ok((new_mean, new_covariance))
    }
}

/// Invert a 4x4 matrix through nalgebra, avoiding a BLAS/LAPACK link.
fn invert_4x4(m: &Array2<f64>) -> Option<Array2<f64>> {
    let mut nm = nalgebra::Matrix4::zeros();
    for i in 0..NDIM {
        for j in 0..NDIM {
            nm[(i, j)] = m[[i, j]];
        }
    }
    let inv = nm.try_inverse()?;
    let mut res = Array2::zeros((NDIM, NDIM));
    for i in 0..NDIM {
        for j in 0..NDIM {
            res[[i, j]] = inv[(i, j)];
        }
    }
    Some(res)
}
