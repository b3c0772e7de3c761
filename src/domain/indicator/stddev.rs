//! Sample standard deviation (n - 1 denominator) over a slice of values.

pub fn sample_stddev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / (n - 1.0);
    Some(variance.sqrt())
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stddev_constant_values() {
        let v = sample_stddev(&[100.0, 100.0, 100.0]).unwrap();
        assert!((v - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn stddev_known_values() {
        // population stddev of this set is 2.0; sample is sqrt(32/7)
        let v = sample_stddev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((v - (32.0_f64 / 7.0).sqrt()).abs() < 1e-10);
    }

    #[test]
    fn stddev_needs_two_points() {
        assert_eq!(sample_stddev(&[1.0]), None);
        assert_eq!(mean(&[]), None);
    }
}
