/// Prefix shared by every vaga code issued in `year`.
pub fn codigo_prefix(year: i32) -> String {
    format!("VAG-{}-", year)
}

/// Next sequential code after `last` (the highest code already issued for the year).
/// A missing or unparsable previous code restarts the sequence at 1.
pub fn next_codigo(year: i32, last: Option<&str>) -> String {
    let prefix = codigo_prefix(year);
    let next = last
        .and_then(|code| code.strip_prefix(prefix.as_str()))
        .and_then(|seq| seq.parse::<u32>().ok())
        .map(|seq| seq + 1)
        .unwrap_or(1);
    format!("{}{:04}", prefix, next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_highest_code_of_the_year() {
        assert_eq!(next_codigo(2025, Some("VAG-2025-0007")), "VAG-2025-0008");
    }

    #[test]
    fn starts_at_one_without_codes() {
        assert_eq!(next_codigo(2025, None), "VAG-2025-0001");
    }

    #[test]
    fn ignores_codes_from_other_years() {
        assert_eq!(next_codigo(2025, Some("VAG-2024-0042")), "VAG-2025-0001");
    }

    #[test]
    fn grows_past_four_digits() {
        assert_eq!(next_codigo(2025, Some("VAG-2025-9999")), "VAG-2025-10000");
    }
}
