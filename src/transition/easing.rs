//! Easing curves over `t ∈ [0, 1]`.

use std::f64::consts::PI;

pub fn linear(t: f64) -> f64 {
    t
}

pub fn quad_in(t: f64) -> f64 {
    t * t
}

pub fn quad_out(t: f64) -> f64 {
    -t * (t - 2.0)
}

pub fn cubic_in(t: f64) -> f64 {
    t * t * t
}

pub fn cubic_out(t: f64) -> f64 {
    let f = t - 1.0;
    f * f * f + 1.0
}

pub fn cubic_in_out(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        0.5 * (2.0 * t - 2.0).powi(3) + 1.0
    }
}

pub fn sine_in(t: f64) -> f64 {
    1.0 - (t * PI / 2.0).cos()
}

pub fn sine_out(t: f64) -> f64 {
    (t * PI / 2.0).sin()
}
