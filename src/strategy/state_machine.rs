use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::{IndicatorSnapshot, Signal};
use crate::strategy::StrategyConfig;

#[derive(Debug, Clone, Default)]
struct SymbolState {
    in_position: bool,
    /// Stamped on close actions only; stop-loss exits do not reset it
    last_close_at: Option<DateTime<Utc>>,
}

/// Per-symbol signal state machine
///
/// Rules are evaluated in a fixed order (open, close, stop-loss) and none of
/// them suppresses the later ones, so a single event can emit several signals.
/// Transitions are applied at emission time: an `Open` flips the symbol to
/// in-position before the order is ever sent, and a failed order does not
/// roll that back. Position guards live here, not at the call sites: no
/// `Open` while positioned, no `Close`/`StopLoss` while flat.
pub struct SignalEngine {
    config: StrategyConfig,
    states: HashMap<String, SymbolState>,
}

impl SignalEngine {
    pub fn new(config: StrategyConfig) -> Self {
        Self {
            config,
            states: HashMap::new(),
        }
    }

    /// Classify one event and apply the resulting transitions
    ///
    /// `now` is passed in rather than read from the clock so cooldown
    /// behavior is deterministic under test.
    pub fn evaluate(
        &mut self,
        symbol: &str,
        price: f64,
        snapshot: &IndicatorSnapshot,
        now: DateTime<Utc>,
    ) -> Vec<Signal> {
        let state = self.states.entry(symbol.to_string()).or_default();
        let mut signals = Vec::new();

        if snapshot.signal_score < self.config.buy_threshold && !state.in_position {
            tracing::info!(
                "{}: buy signal (score {:.4} < {:.4})",
                symbol,
                snapshot.signal_score,
                self.config.buy_threshold
            );
            state.in_position = true;
            signals.push(Signal::Open);
        }

        let cooldown_clear = match state.last_close_at {
            Some(stamped) => now - stamped > self.config.cooldown,
            None => true,
        };
        if snapshot.signal_score > self.config.sell_threshold && cooldown_clear && state.in_position
        {
            tracing::info!(
                "{}: close signal (score {:.4} > {:.4})",
                symbol,
                snapshot.signal_score,
                self.config.sell_threshold
            );
            state.in_position = false;
            state.last_close_at = Some(now);
            signals.push(Signal::Close);
        }

        let stop_price = snapshot.moving_average * (1.0 - self.config.stop_loss_pct / 100.0);
        if price <= stop_price && state.in_position {
            tracing::warn!(
                "{}: stop loss triggered at {} (stop price {:.4})",
                symbol,
                price,
                stop_price
            );
            state.in_position = false;
            signals.push(Signal::StopLoss);
        }

        if signals.is_empty() {
            tracing::debug!(
                "{}: hold (score {:.4}, in_position {}, cooldown_clear {})",
                symbol,
                snapshot.signal_score,
                state.in_position,
                cooldown_clear
            );
        }

        signals
    }

    pub fn in_position(&self, symbol: &str) -> bool {
        self.states
            .get(symbol)
            .map(|s| s.in_position)
            .unwrap_or(false)
    }
}
