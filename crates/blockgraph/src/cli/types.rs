//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::config::Direction;

/// Graph layout direction for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionArg {
    /// Top down
    #[value(name = "TD", alias = "td")]
    Td,
    /// Left to right
    #[value(name = "LR", alias = "lr")]
    Lr,
    /// Bottom up
    #[value(name = "DT", alias = "dt")]
    Dt,
    /// Right to left
    #[value(name = "RL", alias = "rl")]
    Rl,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Td => Direction::TD,
            DirectionArg::Lr => Direction::LR,
            DirectionArg::Dt => Direction::DT,
            DirectionArg::Rl => Direction::RL,
        }
    }
}
