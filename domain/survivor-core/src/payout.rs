use rust_decimal::{Decimal, RoundingStrategy};

use crate::standing::{SettingsError, Standing};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fees {
    pub entry_fee: Decimal,
    pub buyback_fee: Decimal,
}

impl Fees {
    pub fn new(entry_fee: Decimal, buyback_fee: Decimal) -> Result<Self, SettingsError> {
        if entry_fee.is_sign_negative() || buyback_fee.is_sign_negative() {
            return Err(SettingsError::NegativeFee);
        }
        Ok(Self {
            entry_fee,
            buyback_fee,
        })
    }
}

/// One player's final state as far as the payout is concerned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entrant<P> {
    pub id: P,
    pub strikes: u32,
    pub standing: Standing,
    pub entry_fee_paid: bool,
    pub bought_back: bool,
    pub buyback_fee_paid: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WinnerTier {
    /// Survivors who never took a strike.
    Perfect,
    /// Every survivor, when nobody finished without a strike.
    Survivors,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Distribution<P> {
    Split {
        tier: WinnerTier,
        winners: Vec<P>,
        share: Decimal,
        /// Cents left over after truncating every share to whole cents.
        remainder: Decimal,
    },
    /// Nobody survived; the pot cannot be paid out.
    CarryOver,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Payout<P> {
    pub pot: Decimal,
    pub distribution: Distribution<P>,
}

pub fn pot_size<P>(entrants: &[Entrant<P>], fees: &Fees) -> Decimal {
    let entries = entrants.iter().filter(|e| e.entry_fee_paid).count();
    let buybacks = entrants
        .iter()
        .filter(|e| e.bought_back && e.buyback_fee_paid)
        .count();
    fees.entry_fee * Decimal::from(entries) + fees.buyback_fee * Decimal::from(buybacks)
}

pub fn compute_payout<P: Clone>(entrants: &[Entrant<P>], fees: &Fees) -> Payout<P> {
    let pot = pot_size(entrants, fees);

    let survivors: Vec<&Entrant<P>> = entrants
        .iter()
        .filter(|e| !e.standing.is_eliminated())
        .collect();
    let perfect: Vec<&Entrant<P>> = survivors
        .iter()
        .copied()
        .filter(|e| e.strikes == 0)
        .collect();

    let (tier, winners) = if !perfect.is_empty() {
        (WinnerTier::Perfect, perfect)
    } else {
        (WinnerTier::Survivors, survivors)
    };

    if winners.is_empty() {
        return Payout {
            pot,
            distribution: Distribution::CarryOver,
        };
    }

    let count = Decimal::from(winners.len());
    let share = (pot / count).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let remainder = pot - share * count;

    Payout {
        pot,
        distribution: Distribution::Split {
            tier,
            winners: winners.into_iter().map(|e| e.id.clone()).collect(),
            share,
            remainder,
        },
    }
}
