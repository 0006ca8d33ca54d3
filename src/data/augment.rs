//! Stochastic point-cloud augmentation used for training batches.
//!
//! Clouds are flattened row-major, `num_channel` values per point. The first
//! three channels are xyz; channels 3..6, when present, are treated as normals
//! and follow rotations but not scaling, shifting or jitter.

use std::f64::consts::PI;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::math::matrix::Matrix;

type Rotation = [[f64; 3]; 3];

const SCALE_LOW: f64 = 0.8;
const SCALE_HIGH: f64 = 1.25;
const SHIFT_RANGE: f64 = 0.1;
const JITTER_SIGMA: f64 = 0.01;
const JITTER_CLIP: f64 = 0.05;
const PERTURB_SIGMA: f64 = 0.06;
const PERTURB_CLIP: f64 = 0.18;

/// Full augmentation pipeline: random up-axis rotation, small rotation
/// perturbation, random scale, random shift, clipped jitter, point shuffle.
pub fn augment_cloud<R: Rng + ?Sized>(cloud: &mut [f64], num_channel: usize, rng: &mut R) {
    if num_channel < 3 {
        return;
    }
    let angle = rng.gen::<f64>() * 2.0 * PI;
    rotate(cloud, num_channel, &rotation_y(angle));
    let perturbation = perturbation_rotation(rng);
    rotate(cloud, num_channel, &perturbation);
    scale(cloud, num_channel, rng.gen_range(SCALE_LOW..SCALE_HIGH));
    let offset = [
        rng.gen_range(-SHIFT_RANGE..SHIFT_RANGE),
        rng.gen_range(-SHIFT_RANGE..SHIFT_RANGE),
        rng.gen_range(-SHIFT_RANGE..SHIFT_RANGE),
    ];
    shift(cloud, num_channel, offset);
    jitter(cloud, num_channel, JITTER_SIGMA, JITTER_CLIP, rng);
    shuffle_points(cloud, num_channel, rng);
}

/// Rotation about the up (y) axis.
pub fn rotation_y(angle: f64) -> Rotation {
    let (s, c) = angle.sin_cos();
    [[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]]
}

fn rotation_x(angle: f64) -> Rotation {
    let (s, c) = angle.sin_cos();
    [[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]]
}

fn rotation_z(angle: f64) -> Rotation {
    let (s, c) = angle.sin_cos();
    [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]]
}

fn compose(a: &Rotation, b: &Rotation) -> Rotation {
    let mut out = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

fn perturbation_rotation<R: Rng + ?Sized>(rng: &mut R) -> Rotation {
    let mut angle = || (Matrix::sample_standard_normal(&mut *rng) * PERTURB_SIGMA).clamp(-PERTURB_CLIP, PERTURB_CLIP);
    let (ax, ay, az) = (angle(), angle(), angle());
    compose(&rotation_z(az), &compose(&rotation_y(ay), &rotation_x(ax)))
}

/// Applies `p ← p · R` to xyz and, when present, to the normal channels.
pub fn rotate(cloud: &mut [f64], num_channel: usize, r: &Rotation) {
    let groups: &[usize] = if num_channel >= 6 { &[0, 3] } else { &[0] };
    for point in cloud.chunks_exact_mut(num_channel) {
        for &g in groups {
            let p = [point[g], point[g + 1], point[g + 2]];
            for j in 0..3 {
                point[g + j] = p[0] * r[0][j] + p[1] * r[1][j] + p[2] * r[2][j];
            }
        }
    }
}

pub fn scale(cloud: &mut [f64], num_channel: usize, factor: f64) {
    for point in cloud.chunks_exact_mut(num_channel) {
        for x in &mut point[..3] {
            *x *= factor;
        }
    }
}

pub fn shift(cloud: &mut [f64], num_channel: usize, offset: [f64; 3]) {
    for point in cloud.chunks_exact_mut(num_channel) {
        for (x, o) in point[..3].iter_mut().zip(offset.iter()) {
            *x += o;
        }
    }
}

/// Adds Gaussian noise clipped to `[-clip, clip]` to every xyz coordinate.
pub fn jitter<R: Rng + ?Sized>(cloud: &mut [f64], num_channel: usize, sigma: f64, clip: f64, rng: &mut R) {
    for point in cloud.chunks_exact_mut(num_channel) {
        for x in &mut point[..3] {
            *x += (Matrix::sample_standard_normal(&mut *rng) * sigma).clamp(-clip, clip);
        }
    }
}

/// Permutes point order, keeping each point's channels together.
pub fn shuffle_points<R: Rng + ?Sized>(cloud: &mut [f64], num_channel: usize, rng: &mut R) {
    let mut points: Vec<Vec<f64>> = cloud.chunks_exact(num_channel).map(<[f64]>::to_vec).collect();
    points.shuffle(rng);
    for (dst, src) in cloud.chunks_exact_mut(num_channel).zip(points.iter()) {
        dst.copy_from_slice(src);
    }
}
