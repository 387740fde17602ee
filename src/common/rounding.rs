// src/common/rounding.rs

use rust_decimal::{Decimal, RoundingStrategy};

/// Arredondamento "comercial" (0.5 sempre para longe do zero), igual ao
/// Math.round que o front usa. O padrão do Decimal é banker's rounding,
/// que divergiria dos totais exibidos na tela.
pub fn round_dp(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}
