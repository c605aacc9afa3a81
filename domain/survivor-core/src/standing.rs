#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuybackDecision {
    Undecided,
    Accepted,
    Declined,
}

impl BuybackDecision {
    /// Maps the nullable `has_bought_back` column onto a decision.
    pub fn from_flag(has_bought_back: Option<bool>) -> Self {
        match has_bought_back {
            None => BuybackDecision::Undecided,
            Some(true) => BuybackDecision::Accepted,
            Some(false) => BuybackDecision::Declined,
        }
    }

    pub fn to_flag(self) -> Option<bool> {
        match self {
            BuybackDecision::Undecided => None,
            BuybackDecision::Accepted => Some(true),
            BuybackDecision::Declined => Some(false),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Standing {
    Alive,
    BuybackPending,
    AliveAfterBuyback,
    Eliminated,
}

impl Standing {
    /// Derives a player's standing from scratch.
    ///
    /// Nothing but the current strike count, the buyback decision and the
    /// pool's threshold goes in, so the result never depends on a previously
    /// stored standing.
    pub fn derive(strikes: u32, buyback: BuybackDecision, max_strikes: u32) -> Self {
        if strikes < max_strikes {
            return Standing::Alive;
        }
        if strikes > max_strikes {
            return Standing::Eliminated;
        }
        match buyback {
            BuybackDecision::Undecided => Standing::BuybackPending,
            BuybackDecision::Accepted => Standing::AliveAfterBuyback,
            BuybackDecision::Declined => Standing::Eliminated,
        }
    }

    pub fn is_eliminated(&self) -> bool {
        *self == Standing::Eliminated
    }

    pub fn is_active(&self) -> bool {
        !self.is_eliminated()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Standing::Alive => "alive",
            Standing::BuybackPending => "buyback pending",
            Standing::AliveAfterBuyback => "alive after buyback",
            Standing::Eliminated => "eliminated",
        }
    }
}

impl std::fmt::Display for Standing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("max strikes must be at least 1")]
    MaxStrikesTooLow,

    #[error("fees must not be negative")]
    NegativeFee,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alive_below_threshold() {
        for strikes in 0..2 {
            for decision in [
                BuybackDecision::Undecided,
                BuybackDecision::Accepted,
                BuybackDecision::Declined,
            ] {
                assert_eq!(Standing::derive(strikes, decision, 2), Standing::Alive);
            }
        }
    }

    #[test]
    fn test_at_threshold_depends_on_decision() {
        assert_eq!(
            Standing::derive(2, BuybackDecision::Undecided, 2),
            Standing::BuybackPending
        );
        assert_eq!(
            Standing::derive(2, BuybackDecision::Accepted, 2),
            Standing::AliveAfterBuyback
        );
        assert_eq!(
            Standing::derive(2, BuybackDecision::Declined, 2),
            Standing::Eliminated
        );
    }

    #[test]
    fn test_past_threshold_is_always_eliminated() {
        for decision in [
            BuybackDecision::Undecided,
            BuybackDecision::Accepted,
            BuybackDecision::Declined,
        ] {
            assert_eq!(Standing::derive(3, decision, 2), Standing::Eliminated);
            assert_eq!(Standing::derive(7, decision, 2), Standing::Eliminated);
        }
    }

    #[test]
    fn test_buyback_scenario() {
        let mut decision = BuybackDecision::Undecided;
        let pending = Standing::derive(2, decision, 2);
        assert_eq!(pending, Standing::BuybackPending);
        assert!(pending.is_active());

        decision = BuybackDecision::Accepted;
        let bought_back = Standing::derive(2, decision, 2);
        assert_eq!(bought_back, Standing::AliveAfterBuyback);
        assert!(!bought_back.is_eliminated());

        let out = Standing::derive(3, decision, 2);
        assert_eq!(out, Standing::Eliminated);
        assert!(out.is_eliminated() && !out.is_active());
    }

    #[test]
    fn test_decision_flag_mapping() {
        for flag in [None, Some(true), Some(false)] {
            assert_eq!(BuybackDecision::from_flag(flag).to_flag(), flag);
        }
    }
}
