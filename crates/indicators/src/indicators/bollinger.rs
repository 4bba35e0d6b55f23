/// Upper/middle/lower band at one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Bollinger Bands: SMA(period) ± k · sample standard deviation over the same window.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    pub period: usize,
    pub k: f64,
}

impl BollingerBands {
    pub fn new(period: usize, k: f64) -> Self {
        assert!(period >= 2, "Bollinger period must be >= 2");
        Self { period, k }
    }

    /// One band per close; `None` until `period` closes are available.
    pub fn series(&self, closes: &[f64]) -> Vec<Option<Band>> {
        let mut out = vec![None; closes.len()];
        for (i, window) in closes.windows(self.period).enumerate() {
            out[i + self.period - 1] = Some(self.band(window));
        }
        out
    }

    fn band(&self, window: &[f64]) -> Band {
        let n = window.len() as f64;
        let mean = window.iter().sum::<f64>() / n;
        let var = window.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let width = self.k * var.sqrt();
        Band {
            upper: mean + width,
            middle: mean,
            lower: mean - width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_absent_before_full_window() {
        let bb = BollingerBands::new(20, 2.0);
        let closes: Vec<f64> = (1..=19).map(|i| i as f64).collect();
        assert!(bb.series(&closes).iter().all(Option::is_none));
    }

    #[test]
    fn bands_use_sample_standard_deviation() {
        let bb = BollingerBands::new(20, 2.0);
        // 1..=20: mean 10.5, sum of squared deviations 665, sample variance 35
        let closes: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let band = bb.series(&closes)[19].unwrap();
        let sd = 35f64.sqrt();
        assert!((band.middle - 10.5).abs() < 1e-12);
        assert!((band.upper - (10.5 + 2.0 * sd)).abs() < 1e-9);
        assert!((band.lower - (10.5 - 2.0 * sd)).abs() < 1e-9);
    }

    #[test]
    fn flat_prices_collapse_bands() {
        let bb = BollingerBands::new(5, 2.0);
        let band = bb.series(&[7.0; 5])[4].unwrap();
        assert_eq!(band.upper, 7.0);
        assert_eq!(band.lower, 7.0);
    }
}
