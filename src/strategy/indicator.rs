use std::collections::HashMap;

use crate::indicators::{calculate_sma, deviation_score};
use crate::models::IndicatorSnapshot;
use crate::strategy::{CandleWindow, StrategyConfig};

/// Maintains the per-symbol rolling close window and derives an
/// [`IndicatorSnapshot`] from it on every new close.
///
/// Returns `None` while a symbol's window is still warming up; that is the
/// normal state for the first `ma_period - 1` closes, not an error.
pub struct IndicatorEngine {
    windows: HashMap<String, CandleWindow>,
    ma_period: usize,
    scale_param: f64,
}

impl IndicatorEngine {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            windows: HashMap::new(),
            ma_period: config.ma_period,
            scale_param: config.scale_param,
        }
    }

    pub fn on_close(&mut self, symbol: &str, price: f64) -> Option<IndicatorSnapshot> {
        let window = self
            .windows
            .entry(symbol.to_string())
            .or_insert_with(|| CandleWindow::new(self.ma_period));
        window.push(price);

        if !window.is_full() {
            return None;
        }

        let closes = window.closes();
        let moving_average = calculate_sma(&closes, self.ma_period)?;
        let deviation = price - moving_average;

        Some(IndicatorSnapshot {
            moving_average,
            deviation,
            signal_score: deviation_score(deviation, self.scale_param),
        })
    }

    /// How many closes a symbol has accumulated so far
    pub fn samples(&self, symbol: &str) -> usize {
        self.windows.get(symbol).map(|w| w.len()).unwrap_or(0)
    }

    pub fn period(&self) -> usize {
        self.ma_period
    }
}
