pub mod payout;
pub mod picks;
pub mod players;
pub mod results;
pub mod season;
pub mod standings;
pub mod teams;
