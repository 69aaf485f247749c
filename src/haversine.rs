//! Great-circle distance over coordinate pairs read from a parsed document.

use crate::value::{self, Value};

pub const EARTH_RADIUS_KM: f64 = 6371.8;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("document root has no \"pairs\" key")]
    MissingPairs,
    #[error("pair {index} is missing coordinate \"{key}\"")]
    MissingKey { index: usize, key: &'static str },
    #[error(transparent)]
    Value(#[from] value::Error),
}

fn square(x: f64) -> f64 {
    x * x
}

fn radians_from_degrees(degrees: f64) -> f64 {
    degrees * std::f64::consts::PI / 180.0
}

/// Haversine distance between `(x0, y0)` and `(x1, y1)`, where x is the
/// longitude and y the latitude, both in degrees. The result has the unit
/// of `radius`.
pub fn distance(x0: f64, y0: f64, x1: f64, y1: f64, radius: f64) -> f64 {
    let d_lat = radians_from_degrees(y1 - y0);
    let d_lon = radians_from_degrees(x1 - x0);
    let lat0 = radians_from_degrees(y0);
    let lat1 = radians_from_degrees(y1);

    let a = square((d_lat / 2.0).sin()) + lat0.cos() * lat1.cos() * square((d_lon / 2.0).sin());
    let c = 2.0 * a.sqrt().asin();

    radius * c
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Pair {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Pair {
    pub fn distance(&self, radius: f64) -> f64 {
        distance(self.x0, self.y0, self.x1, self.y1, radius)
    }

    fn from_value(index: usize, value: &Value) -> Result<Self, Error> {
        let coord = |key: &'static str| -> Result<f64, Error> {
            let v = value.get(key).ok_or(Error::MissingKey { index, key })?;
            Ok(v.as_number()?)
        };
        Ok(Pair {
            x0: coord("x0")?,
            y0: coord("y0")?,
            x1: coord("x1")?,
            y1: coord("y1")?,
        })
    }
}

/// Pairs read from a document, plus the number of `pairs` elements that
/// were not objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Pairs {
    pub pairs: Vec<Pair>,
    pub skipped: usize,
}

impl Pairs {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Mean over every element of the source array; skipped elements count
    /// towards the divisor but contribute no distance.
    pub fn mean_distance(&self, radius: f64) -> f64 {
        weighted_sum(&self.pairs, self.pairs.len() + self.skipped, radius)
    }
}

/// Extracts `{"pairs": [{"x0":…, "y0":…, "x1":…, "y1":…}, …]}`.
///
/// Elements of `pairs` that are not objects are skipped.
pub fn pairs_from_value(root: &Value) -> Result<Pairs, Error> {
    let pairs = root
        .as_object()?
        .get("pairs")
        .ok_or(Error::MissingPairs)?
        .as_array()?;

    let mut out = Pairs {
        pairs: Vec::with_capacity(pairs.len()),
        skipped: 0,
    };
    for (index, pair) in pairs.iter().enumerate() {
        if !pair.is_object() {
            tracing::warn!(index, kind = %pair.kind(), "skipping non-object pair");
            out.skipped += 1;
            continue;
        }
        out.pairs.push(Pair::from_value(index, pair)?);
    }
    Ok(out)
}

fn weighted_sum(pairs: &[Pair], count: usize, radius: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    let coef = 1.0 / count as f64;
    pairs.iter().map(|p| coef * p.distance(radius)).sum()
}

/// Mean distance, accumulated as a sum of `d / n` terms.
pub fn mean_distance(pairs: &[Pair], radius: f64) -> f64 {
    weighted_sum(pairs, pairs.len(), radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn same_point_is_zero() {
        assert_eq!(distance(12.5, -40.0, 12.5, -40.0, EARTH_RADIUS_KM), 0.0);
    }

    #[test]
    fn antipodes_are_half_circumference() {
        let d = distance(0.0, 0.0, 180.0, 0.0, EARTH_RADIUS_KM);
        assert!(close(d, std::f64::consts::PI * EARTH_RADIUS_KM));
    }

    #[test]
    fn quarter_meridian() {
        let d = distance(0.0, 0.0, 0.0, 90.0, 1.0);
        assert!(close(d, std::f64::consts::FRAC_PI_2));
    }

    #[test]
    fn symmetric() {
        let a = distance(-73.9, 40.7, 2.35, 48.85, EARTH_RADIUS_KM);
        let b = distance(2.35, 48.85, -73.9, 40.7, EARTH_RADIUS_KM);
        assert!(close(a, b));
        assert!(a > 5000.0 && a < 6000.0);
    }

    #[test]
    fn extracts_pairs_and_skips_non_objects() {
        let root = parse(
            r#"{"pairs":[{"x0":1,"y0":2,"x1":3,"y1":4}, 7, {"y1":8,"x1":7,"y0":6,"x0":5}]}"#,
        )
        .unwrap();
        let pairs = pairs_from_value(&root).unwrap();
        assert_eq!(pairs.skipped, 1);
        assert_eq!(
            pairs.pairs,
            vec![
                Pair { x0: 1.0, y0: 2.0, x1: 3.0, y1: 4.0 },
                Pair { x0: 5.0, y0: 6.0, x1: 7.0, y1: 8.0 },
            ]
        );
    }

    #[test]
    fn missing_coordinate() {
        let root = parse(r#"{"pairs":[{"x0":1,"y0":2,"x1":3}]}"#).unwrap();
        assert!(matches!(
            pairs_from_value(&root),
            Err(Error::MissingKey { index: 0, key: "y1" })
        ));
    }

    #[test]
    fn non_numeric_coordinate() {
        let root = parse(r#"{"pairs":[{"x0":"1","y0":2,"x1":3,"y1":4}]}"#).unwrap();
        assert!(matches!(pairs_from_value(&root), Err(Error::Value(_))));
    }

    #[test]
    fn wrong_root_shape() {
        assert!(matches!(
            pairs_from_value(&parse("{}").unwrap()),
            Err(Error::MissingPairs)
        ));
        assert!(matches!(
            pairs_from_value(&parse("[]").unwrap()),
            Err(Error::Value(_))
        ));
        assert!(matches!(
            pairs_from_value(&parse(r#"{"pairs":{}}"#).unwrap()),
            Err(Error::Value(_))
        ));
    }

    #[test]
    fn mean_of_pairs() {
        let pairs = [
            Pair { x0: 0.0, y0: 0.0, x1: 0.0, y1: 90.0 },
            Pair { x0: 0.0, y0: 0.0, x1: 0.0, y1: 0.0 },
        ];
        assert!(close(mean_distance(&pairs, 1.0), std::f64::consts::FRAC_PI_4));
        assert_eq!(mean_distance(&[], 1.0), 0.0);
    }

    #[test]
    fn skipped_elements_count_towards_the_mean() {
        let root = parse(r#"{"pairs":[{"x0":0,"y0":0,"x1":0,"y1":90}, 7]}"#).unwrap();
        let pairs = pairs_from_value(&root).unwrap();
        assert_eq!(pairs.len(), 1);
        assert!(close(pairs.mean_distance(1.0), std::f64::consts::FRAC_PI_4));
        assert!(close(mean_distance(&pairs.pairs, 1.0), std::f64::consts::FRAC_PI_2));
    }

    #[test]
    fn only_skipped_elements() {
        let root = parse(r#"{"pairs":[null, "x"]}"#).unwrap();
        let pairs = pairs_from_value(&root).unwrap();
        assert!(pairs.is_empty());
        assert_eq!(pairs.skipped, 2);
        assert_eq!(pairs.mean_distance(1.0), 0.0);
    }
}
