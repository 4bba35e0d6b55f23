use super::ewm;

/// RSI (Relative Strength Index) indicator.
///
/// Gains and losses are smoothed with Wilder's factor `1 / period` (an EWM with
/// centre of mass `period − 1`), seeded from the first change.
/// Values are reported once `period` changes (`period + 1` closes) exist.
#[derive(Debug, Clone)]
pub struct RsiIndicator {
    pub period: usize,
}

impl RsiIndicator {
    pub fn new(period: usize) -> Self {
        assert!(period >= 2, "RSI period must be >= 2");
        Self { period }
    }

    /// One value per close (oldest first); `None` before `period + 1` closes.
    pub fn series(&self, closes: &[f64]) -> Vec<Option<f64>> {
        let mut out = vec![None; closes.len()];
        if closes.len() < 2 {
            return out;
        }

        let (gains, losses): (Vec<f64>, Vec<f64>) = closes
            .windows(2)
            .map(|w| {
                let change = w[1] - w[0];
                (change.max(0.0), (-change).max(0.0))
            })
            .unzip();

        let alpha = 1.0 / self.period as f64;
        let avg_gain = ewm(&gains, alpha);
        let avg_loss = ewm(&losses, alpha);

        // change `i` ends at close `i + 1`
        for i in (self.period - 1)..gains.len() {
            out[i + 1] = Some(rsi_from_averages(avg_gain[i], avg_loss[i]));
        }
        out
    }

    /// RSI at the most recent close.
    pub fn compute(&self, closes: &[f64]) -> Option<f64> {
        self.series(closes).last().copied().flatten()
    }
}

/// A window with no losses is a pure uptrend and reads 100.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_returns_none_when_insufficient_data() {
        let rsi = RsiIndicator::new(14);
        // Need at least period+1 = 15 values
        let prices = vec![100.0; 14];
        assert!(rsi.compute(&prices).is_none());
        assert!(rsi.series(&prices).iter().all(Option::is_none));
    }

    #[test]
    fn rsi_returns_some_with_sufficient_data() {
        let rsi = RsiIndicator::new(14);
        // 15 values, exactly period+1
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        let series = rsi.series(&prices);
        assert!(series[13].is_none());
        assert!(series[14].is_some());
    }

    #[test]
    fn rsi_all_gains_returns_100() {
        let rsi = RsiIndicator::new(3);
        // Strictly increasing prices → RSI = 100
        let prices = vec![10.0, 11.0, 12.0, 13.0, 14.0];
        let value = rsi.compute(&prices).unwrap();
        assert_eq!(value, 100.0);
    }

    #[test]
    fn rsi_all_losses_returns_0() {
        let rsi = RsiIndicator::new(3);
        let prices = vec![14.0, 13.0, 12.0, 11.0, 10.0];
        let value = rsi.compute(&prices).unwrap();
        assert!((value - 0.0).abs() < 1e-9, "Expected ~0, got {value}");
    }

    #[test]
    fn rsi_flat_series_reads_100() {
        let rsi = RsiIndicator::new(14);
        let value = rsi.compute(&[50.0; 20]).unwrap();
        assert_eq!(value, 100.0);
    }

    #[test]
    fn rsi_known_value() {
        // alpha = 1/2: gains [1, 0] → 0.5, losses [0, 1] → 0.5 → RSI 50
        let rsi = RsiIndicator::new(2);
        let value = rsi.compute(&[1.0, 2.0, 1.0]).unwrap();
        assert!((value - 50.0).abs() < 1e-9, "Expected 50, got {value}");
    }

    #[test]
    fn rsi_stays_in_range_on_choppy_prices() {
        let rsi = RsiIndicator::new(14);
        let prices = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.15, 43.61, 44.33, 44.83, 45.10,
            45.15, 44.34, 44.09, 44.50, 43.90,
        ];
        for v in rsi.series(&prices).into_iter().flatten() {
            assert!((0.0..=100.0).contains(&v), "RSI out of range: {v}");
        }
    }
}
