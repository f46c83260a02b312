//! Statistical helpers shared by the scoring and income engines.

/// Statistical helper trait over numeric slices.
pub trait StatisticalMethods {
    fn mean(&self) -> f64;
    fn variance(&self) -> f64;
    fn std_dev(&self) -> f64;
    /// Standard deviation over the absolute mean; the normalized volatility
    /// measure used for balance and income stability. Zero mean yields 0.0
    /// so that an all-zero series reads as perfectly stable.
    fn coefficient_of_variation(&self) -> f64;
}

impl StatisticalMethods for [f64] {
    fn mean(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        self.iter().sum::<f64>() / self.len() as f64
    }

    fn variance(&self) -> f64 {
        if self.len() < 2 {
            return 0.0;
        }
        let mean = self.mean();
        let sum_sq_diff: f64 = self.iter().map(|x| (x - mean).powi(2)).sum();
        sum_sq_diff / (self.len() - 1) as f64
    }

    fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    fn coefficient_of_variation(&self) -> f64 {
        let mean = self.mean();
        if mean.abs() < f64::EPSILON {
            return 0.0;
        }
        self.std_dev() / mean.abs()
    }
}

impl StatisticalMethods for Vec<f64> {
    fn mean(&self) -> f64 {
        self.as_slice().mean()
    }

    fn variance(&self) -> f64 {
        self.as_slice().variance()
    }

    fn std_dev(&self) -> f64 {
        self.as_slice().std_dev()
    }

    fn coefficient_of_variation(&self) -> f64 {
        self.as_slice().coefficient_of_variation()
    }
}

/// Median of a slice of day gaps. Used to infer payment cadence.
pub fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}
