use nom::branch::alt;
use nom::character::complete::{char, digit0, digit1, one_of};
use nom::combinator::{opt, recognize};
use nom::number::complete::double;
use nom::sequence::{pair, tuple};
use nom::IResult;
use crate::telemetry::buffer::Sample;
/// Converts one telemetry token to a number. Total: never fails.
///
/// The longest leading float (`"42abc"` gives 42) is taken; a token with no
/// numeric prefix, or one that reads as NaN or infinity, becomes `0.0`.
pub fn coerce_numeric(token: &str) -> f64 {
    let token = token.trim();
    match double::<&str, nom::error::Error<&str>>(token) {
        Ok((_rest, value)) if value.is_finite() => value,
        // "inf"/"nan" parse fine but are not finite; they stay zero
        Ok(_) => 0.0,
        // a dangling exponent ("1e", "5E+") fails the whole float
        Err(_) => mantissa(token)
            .ok()
            .and_then(|(_, digits)| digits.parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .unwrap_or(0.0),
    }
}
/// Sign and digits with an optional fraction, without any exponent.
fn mantissa(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(one_of("+-")),
        alt((
            recognize(pair(digit1, opt(pair(char('.'), digit0)))),
            recognize(pair(char('.'), digit1)),
        )),
    )))(input)
}
/// Splits a comma-separated line into exactly `channel_count` values.
///
/// Missing positions are zero filled, extra tokens are dropped.
pub fn parse_sample(line: &str, channel_count: usize) -> Sample {
    let mut values: Vec<f64> = line
        .split(',')
        .take(channel_count)
        .map(coerce_numeric)
        .collect();
    values.resize(channel_count, 0.0);
    Sample::new(values)
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn coerces_tokens() {
        assert_eq!(coerce_numeric(" 3.5 "), 3.5);
        assert_eq!(coerce_numeric("-12"), -12.0);
        assert_eq!(coerce_numeric("42abc"), 42.0);
        assert_eq!(coerce_numeric("2.5e2"), 250.0);
        assert_eq!(coerce_numeric(".5"), 0.5);
        assert_eq!(coerce_numeric("abc"), 0.0);
        assert_eq!(coerce_numeric(""), 0.0);
        assert_eq!(coerce_numeric("NaN"), 0.0);
        assert_eq!(coerce_numeric("inf"), 0.0);
    }
    #[test]
    fn dangling_exponent_keeps_the_mantissa() {
        assert_eq!(coerce_numeric("1e"), 1.0);
        assert_eq!(coerce_numeric("5E+"), 5.0);
        assert_eq!(coerce_numeric("7e-x"), 7.0);
        assert_eq!(coerce_numeric("2.5e"), 2.5);
        assert_eq!(coerce_numeric("-3.e"), -3.0);
        assert_eq!(coerce_numeric("3abc"), 3.0);
        assert_eq!(coerce_numeric("e5"), 0.0);
        assert_eq!(parse_sample("1e,2.5E-,x", 3).values(), &[1.0, 2.5, 0.0]);
    }
    #[test]
    fn sample_width_is_always_channel_count() {
        let long = (0..40).map(|i| i.to_string()).collect::<Vec<_>>().join(",");
        for line in ["", "abc,def,ghi", "1,2", long.as_str(), ",,,", "1;2;3"] {
            for channels in [0, 1, 3, 13] {
                assert_eq!(parse_sample(line, channels).len(), channels, "{line:?}");
            }
        }
    }
    #[test]
    fn pads_and_truncates() {
        assert_eq!(parse_sample("1,2", 4).values(), &[1.0, 2.0, 0.0, 0.0]);
        assert_eq!(parse_sample("1,2,3,4,5", 3).values(), &[1.0, 2.0, 3.0]);
        assert_eq!(parse_sample("7,x,9", 3).values(), &[7.0, 0.0, 9.0]);
    }
    #[test]
    fn trailing_comma_from_device_is_harmless() {
        let sample = parse_sample("103,103,104,100,", 5);
        assert_eq!(sample.values(), &[103.0, 103.0, 104.0, 100.0, 0.0]);
    }
}
