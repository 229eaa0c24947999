use chrono::{DateTime, NaiveDate, Utc};

/// Two decimals with a comma separator, no thousands grouping: `1234,5` -> `1234,50`.
pub fn decimal_br(value: f64) -> String {
    format!("{:.2}", value).replace('.', ",")
}

pub fn money_br(value: f64) -> String {
    format!("R$ {}", decimal_br(value))
}

/// Shortest rendering of a number: `10` stays `10`, `12.5` stays `12.5`.
pub fn plain_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

pub fn date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Calendar date of a timestamp in UTC.
pub fn datetime_date_br(value: DateTime<Utc>) -> String {
    date_br(value.date_naive())
}

pub fn opt_datetime_date_br(value: Option<DateTime<Utc>>, missing: &str) -> String {
    value
        .map(datetime_date_br)
        .unwrap_or_else(|| missing.to_string())
}

pub fn or_na(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("N/A")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn money_uses_comma_decimals() {
        assert_eq!(money_br(1234.5), "R$ 1234,50");
        assert_eq!(money_br(0.0), "R$ 0,00");
        assert_eq!(decimal_br(20600.0), "20600,00");
    }

    #[test]
    fn plain_number_drops_trailing_zeroes() {
        assert_eq!(plain_number(10.0), "10");
        assert_eq!(plain_number(12.5), "12.5");
    }

    #[test]
    fn dates_render_day_first() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(date_br(date), "05/03/2024");

        let ts = Utc.with_ymd_and_hms(2024, 3, 15, 23, 30, 0).unwrap();
        assert_eq!(datetime_date_br(ts), "15/03/2024");
        assert_eq!(opt_datetime_date_br(None, "-"), "-");
    }

    #[test]
    fn blank_values_become_na() {
        assert_eq!(or_na(None), "N/A");
        assert_eq!(or_na(Some("")), "N/A");
        assert_eq!(or_na(Some("Ana")), "Ana");
    }
}
