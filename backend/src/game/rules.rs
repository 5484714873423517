use chrono::Duration;

/// Prize for each level, indexed by the highest level answered correctly
pub const PRIZES: [i64; 15] = [
    100, 200, 300, 500, 1_000, 2_000, 4_000, 8_000, 16_000, 32_000, 64_000, 125_000, 250_000,
    500_000, 1_000_000,
];

/// Minutes a player has to finish a game
pub const TIME_LIMIT_MINUTES: i64 = 35;

pub fn time_limit() -> Duration {
    Duration::minutes(TIME_LIMIT_MINUTES)
}

/// Prize earned once `level` has been answered; 0 when no level was answered
pub fn prize_for_level(level: i32) -> i64 {
    usize::try_from(level)
        .ok()
        .and_then(|idx| PRIZES.get(idx))
        .copied()
        .unwrap_or(0)
}

/// Formats an amount the way it is shown to players, e.g. "125 000 ₽"
pub fn format_prize(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}{grouped} ₽")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prize_for_level() {
        assert_eq!(prize_for_level(-1), 0);
        assert_eq!(prize_for_level(0), 100);
        assert_eq!(prize_for_level(1), 200);
        assert_eq!(prize_for_level(14), 1_000_000);
        assert_eq!(prize_for_level(15), 0);
    }

    #[test]
    fn test_prizes_strictly_increase() {
        assert!(PRIZES.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_format_prize() {
        assert_eq!(format_prize(0), "0 ₽");
        assert_eq!(format_prize(200), "200 ₽");
        assert_eq!(format_prize(1_000), "1 000 ₽");
        assert_eq!(format_prize(125_000), "125 000 ₽");
        assert_eq!(format_prize(1_000_000), "1 000 000 ₽");
    }

    #[test]
    fn test_time_limit() {
        assert_eq!(time_limit(), Duration::minutes(35));
    }
}
