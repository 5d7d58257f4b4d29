//! `From` implementations bridging `blind_config` types to `blind_core`
//! types, so the CLI never maps fields by hand.

use crate::arbiter::InputCfg;
use crate::gesture::GestureCfg;
use crate::timing::Timing;

impl From<&blind_config::TimingCfg> for Timing {
    fn from(c: &blind_config::TimingCfg) -> Self {
        Self {
            seconds_to_open: c.seconds_to_open,
            seconds_to_close: c.seconds_to_close,
        }
    }
}

impl From<&blind_config::GestureCfg> for GestureCfg {
    fn from(c: &blind_config::GestureCfg) -> Self {
        Self {
            first_tap_min_ms: c.first_tap_min_ms,
            second_tap_max_ms: c.second_tap_max_ms,
            settle_ms: c.settle_ms,
        }
    }
}

impl From<&blind_config::InputCfg> for InputCfg {
    fn from(c: &blind_config::InputCfg) -> Self {
        Self {
            debounce_ms: c.debounce_ms,
        }
    }
}
