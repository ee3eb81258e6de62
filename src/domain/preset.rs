//! Named strategy configurations.
//!
//! Each preset pairs a rule with a timing policy and knows its counterpart
//! with the opposite timing, so a biased run can be charted next to the
//! corrected one.

use std::fmt;
use std::str::FromStr;

use super::engine::StrategySpec;
use super::signal::{RuleKind, TimingOffset};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Trades today on tomorrow's return.
    CrystalBall,
    /// Trades today on today's close-to-close return.
    CrystalBallLagged,
    /// Enters at the open on the sign of the same day's close - open.
    CloseOpenBiased,
    /// Enters at the open on the sign of yesterday's close - open.
    CloseOpenUnbiased,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::CrystalBall,
        Preset::CrystalBallLagged,
        Preset::CloseOpenBiased,
        Preset::CloseOpenUnbiased,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::CrystalBall => "crystal_ball",
            Preset::CrystalBallLagged => "crystal_ball_lagged",
            Preset::CloseOpenBiased => "close_open_biased",
            Preset::CloseOpenUnbiased => "close_open_unbiased",
        }
    }

    pub fn spec(self) -> StrategySpec {
        match self {
            Preset::CrystalBall => {
                StrategySpec::new(RuleKind::NextReturnSign, TimingOffset::SameBar)
            }
            Preset::CrystalBallLagged => {
                StrategySpec::new(RuleKind::NextReturnSign, TimingOffset::PriorBar)
            }
            Preset::CloseOpenBiased => {
                StrategySpec::new(RuleKind::CloseMinusOpenSign, TimingOffset::SameBar)
            }
            Preset::CloseOpenUnbiased => {
                StrategySpec::new(RuleKind::CloseMinusOpenSign, TimingOffset::PriorBar)
            }
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Preset::CrystalBall => "Strategy Backtest",
            Preset::CrystalBallLagged => "Next-Return Strategy w/o Lookahead Bias",
            Preset::CloseOpenBiased => "Close-Open Strategy with Lookahead Bias",
            Preset::CloseOpenUnbiased => "Close-Open Strategy w/o Lookahead Bias",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Preset::CrystalBall => "long if the next day's return is positive, short otherwise",
            Preset::CrystalBallLagged => "long if today's return is positive, hold tomorrow",
            Preset::CloseOpenBiased => "enter at the open on the sign of that day's close - open",
            Preset::CloseOpenUnbiased => {
                "enter at the open on the sign of the previous day's close - open"
            }
        }
    }

    /// Same rule, opposite timing policy.
    pub fn counterpart(self) -> Preset {
        match self {
            Preset::CrystalBall => Preset::CrystalBallLagged,
            Preset::CrystalBallLagged => Preset::CrystalBall,
            Preset::CloseOpenBiased => Preset::CloseOpenUnbiased,
            Preset::CloseOpenUnbiased => Preset::CloseOpenBiased,
        }
    }

    pub fn from_spec(spec: StrategySpec) -> Preset {
        Preset::ALL
            .into_iter()
            .find(|p| p.spec() == spec)
            .unwrap_or(Preset::CrystalBall)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<_> = Preset::ALL.iter().map(|p| p.name()).collect();
                format!("unknown preset '{}' (expected one of {})", wanted, names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counterpart_flips_timing_only() {
        for preset in Preset::ALL {
            let other = preset.counterpart();
            assert_eq!(preset.spec().rule, other.spec().rule);
            assert_ne!(preset.spec().timing, other.spec().timing);
            assert_eq!(other.counterpart(), preset);
        }
    }

    #[test]
    fn every_rule_timing_pair_has_a_preset() {
        for rule in [RuleKind::NextReturnSign, RuleKind::CloseMinusOpenSign] {
            for timing in [TimingOffset::SameBar, TimingOffset::PriorBar] {
                let spec = StrategySpec::new(rule, timing);
                assert_eq!(Preset::from_spec(spec).spec(), spec);
            }
        }
    }

    #[test]
    fn parse_by_name() {
        assert_eq!("close_open_unbiased".parse::<Preset>(), Ok(Preset::CloseOpenUnbiased));
        assert_eq!(" Crystal_Ball ".parse::<Preset>(), Ok(Preset::CrystalBall));
        let err = "moon".parse::<Preset>().unwrap_err();
        assert!(err.contains("crystal_ball"));
    }

    #[test]
    fn titles_match_script_plots() {
        assert_eq!(Preset::CloseOpenBiased.title(), "Close-Open Strategy with Lookahead Bias");
        assert_eq!(Preset::CloseOpenUnbiased.title(), "Close-Open Strategy w/o Lookahead Bias");
    }
}
