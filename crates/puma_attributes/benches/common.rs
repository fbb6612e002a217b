#![allow(dead_code)]

use std::time::Duration;

use criterion::{Criterion, Throughput};
use puma_attributes::prelude::{AttributesValuesMap, DefaultValue};
use rand::rngs::StdRng;
use rand::{Rng, RngExt, SeedableRng};

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// `shape_count` maps holding `per_shape` attributes of mixed categories.
pub fn make_value_maps(shape_count: usize, per_shape: usize, seed: u64) -> Vec<AttributesValuesMap> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..shape_count)
        .map(|_| {
            let mut map = AttributesValuesMap::new();
            for i in 0..per_shape {
                map.insert(format!("/ce/rule/attr{i}"), random_value(&mut rng));
            }
            map
        })
        .collect()
}

fn random_value(rng: &mut StdRng) -> DefaultValue {
    match rng.next_u32() % 6 {
        0 => DefaultValue::Bool(rng.next_u32() % 2 == 0),
        1 => DefaultValue::Integer((rng.next_u32() % 1000) as i32),
        2 => DefaultValue::Double(rng.random::<f64>() * 100.0),
        3 => DefaultValue::String(format!("value_{}", rng.next_u32() % 64)),
        4 => DefaultValue::DoubleArray(make_doubles(rng, 8)),
        _ => DefaultValue::StringArray(make_strings(rng, 8)),
    }
}

pub fn make_doubles(rng: &mut StdRng, len: usize) -> Vec<f64> {
    (0..len).map(|_| rng.random::<f64>() * 1000.0).collect()
}

/// Strings that sometimes contain the delimiter or the escape character.
pub fn make_strings(rng: &mut StdRng, len: usize) -> Vec<String> {
    (0..len)
        .map(|_| match rng.next_u32() % 4 {
            0 => format!("a;{}", rng.next_u32() % 100),
            1 => format!("path\\{}", rng.next_u32() % 100),
            _ => format!("plain{}", rng.next_u32() % 100),
        })
        .collect()
}
