// Deviation strategy: rolling indicator state plus the signal state machine

pub mod indicator;
pub mod state_machine;
pub mod window;

pub use indicator::IndicatorEngine;
pub use state_machine::SignalEngine;
pub use window::CandleWindow;

use crate::config::BotConfig;
use chrono::Duration;

/// Parameters of the deviation strategy
#[derive(Debug, Clone)]
pub struct StrategyConfig {
    /// Rolling window length (number of closes)
    pub ma_period: usize,
    /// Scale applied to the deviation before scoring
    pub scale_param: f64,
    /// Score below which an entry fires (when flat)
    pub buy_threshold: f64,
    /// Score above which an exit fires (when positioned, outside cooldown)
    pub sell_threshold: f64,
    /// Percent below the moving average that forces an exit
    pub stop_loss_pct: f64,
    /// Minimum time between successive close actions
    pub cooldown: Duration,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            ma_period: 44,
            scale_param: 44.0,
            buy_threshold: 0.1,
            sell_threshold: 0.9,
            stop_loss_pct: 50.0,
            cooldown: Duration::seconds(60),
        }
    }
}

impl From<&BotConfig> for StrategyConfig {
    fn from(config: &BotConfig) -> Self {
        Self {
            ma_period: config.ma_period,
            scale_param: config.scale_param,
            buy_threshold: config.buy_threshold,
            sell_threshold: config.sell_threshold,
            stop_loss_pct: config.stop_loss_pct,
            cooldown: config.cooldown,
        }
    }
}
