use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::{Rng, RngCore};
use tracing::warn;

use seedwright_core::ColumnKind;

use crate::generators::{GeneratedValue, GeneratorContext, semantic};

pub const UNKNOWN_TEXT_LEN: usize = 10;
pub const DEFAULT_TEXT_MAX: usize = 50;
pub const ARRAY_LEN_MIN: usize = 1;
pub const ARRAY_LEN_MAX: usize = 5;

const MIN_RANDOM_TEXT: usize = 8;
const ARRAY_TOKEN_LEN: usize = 6;
const DEFAULT_DECIMAL_MIN: f64 = 0.0;
const DEFAULT_DECIMAL_MAX: f64 = 10_000.0;
const DEFAULT_PRECISION: u32 = 2;
const MAX_PRECISION: u32 = 10;
const SECONDS_PER_DAY: u32 = 86_400;
const ZONE_SUFFIX: &str = "+00:00";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const ALPHANUMERIC: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const TOKEN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const DIGITS: &[u8] = b"0123456789";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Uniform integer within the configured, name-derived or type default range.
pub fn integer(
    kind: &ColumnKind,
    ctx: &GeneratorContext<'_>,
    rng: &mut dyn RngCore,
) -> GeneratedValue {
    let (type_min, type_max, default_max) = match kind {
        ColumnKind::SmallInt => (i64::from(i16::MIN), i64::from(i16::MAX), 32_767),
        ColumnKind::Integer => (i64::from(i32::MIN), i64::from(i32::MAX), 100_000),
        _ => (i64::MIN, i64::MAX, 1_000_000),
    };
    let (default_min, default_max) =
        semantic::integer_range(&ctx.column.name).unwrap_or((1, default_max));

    let min = finite(ctx.options.min).map_or(default_min, |value| value.round() as i64);
    let max = finite(ctx.options.max).map_or(default_max, |value| value.round() as i64);
    let (min, max) = ctx.ordered("integer", min, max);
    let (min, max) = (min.clamp(type_min, type_max), max.clamp(type_min, type_max));

    GeneratedValue::Int(rng.random_range(min..=max))
}

/// Uniform float rounded to the configured precision.
pub fn decimal(ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> GeneratedValue {
    let min = finite(ctx.options.min).unwrap_or(DEFAULT_DECIMAL_MIN);
    let max = finite(ctx.options.max).unwrap_or(DEFAULT_DECIMAL_MAX);
    let (min, max) = ctx.ordered("decimal", min, max);

    let precision = match ctx.options.precision {
        Some(precision) if precision > MAX_PRECISION => {
            warn!(
                table = %ctx.table,
                column = %ctx.column.name,
                precision,
                max = MAX_PRECISION,
                "precision too large; clamping"
            );
            MAX_PRECISION
        }
        Some(precision) => precision,
        None => DEFAULT_PRECISION,
    };

    let raw = if min < max {
        rng.random_range(min..=max)
    } else {
        min
    };
    let factor = 10_f64.powi(precision as i32);
    GeneratedValue::Float(((raw * factor).round() / factor).clamp(min, max))
}

/// RFC 4122 version 4 identifier.
pub fn uuid_v4(rng: &mut dyn RngCore) -> String {
    uuid::Builder::from_random_bytes(rng.random())
        .into_uuid()
        .to_string()
}

pub fn date(ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> GeneratedValue {
    let (start, end) = date_range(ctx);
    let span = (end - start).num_days();
    let date = start + Duration::days(rng.random_range(0..=span));
    GeneratedValue::Text(date.format("%Y-%m-%d").to_string())
}

pub fn time(zoned: bool, rng: &mut dyn RngCore) -> GeneratedValue {
    let seconds = rng.random_range(0..SECONDS_PER_DAY);
    let mut value = format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        seconds / 60 % 60,
        seconds % 60
    );
    if zoned {
        value.push_str(ZONE_SUFFIX);
    }
    GeneratedValue::Text(value)
}

/// Timestamp inside the date range. Without an explicit `end_date` the
/// range stops at the reference time.
pub fn timestamp(zoned: bool, ctx: &GeneratorContext<'_>, rng: &mut dyn RngCore) -> GeneratedValue {
    let (start, end) = date_range(ctx);
    let start = start.and_time(NaiveTime::MIN);
    let mut end = end_of_day(end);
    if ctx.options.end_date.is_none() {
        end = end.min(ctx.reference_time).max(start);
    }

    let span = (end - start).num_seconds();
    let value = start + Duration::seconds(rng.random_range(0..=span));
    let mut value = value.format(TIMESTAMP_FORMAT).to_string();
    if zoned {
        value.push_str(ZONE_SUFFIX);
    }
    GeneratedValue::Text(value)
}

/// Expand a template: `X` becomes a digit, `A` an uppercase letter.
pub fn pattern(template: &str, rng: &mut dyn RngCore) -> String {
    template
        .chars()
        .map(|ch| match ch {
            'X' => pick_char(DIGITS, rng),
            'A' => pick_char(UPPERCASE, rng),
            other => other,
        })
        .collect()
}

pub fn alphanumeric(len: usize, rng: &mut dyn RngCore) -> String {
    (0..len).map(|_| pick_char(ALPHANUMERIC, rng)).collect()
}

/// Random alphanumeric text no longer than `min(max_length, 50)`.
pub fn random_text(max_length: Option<usize>, rng: &mut dyn RngCore) -> String {
    let cap = max_length.unwrap_or(DEFAULT_TEXT_MAX).min(DEFAULT_TEXT_MAX);
    if cap == 0 {
        return String::new();
    }
    let len = rng.random_range(cap.min(MIN_RANDOM_TEXT)..=cap);
    alphanumeric(len, rng)
}

/// Element for arrays of unrecognised types: `val_[a-z0-9]+`.
pub fn array_token(rng: &mut dyn RngCore) -> String {
    let suffix: String = (0..ARRAY_TOKEN_LEN)
        .map(|_| pick_char(TOKEN_CHARSET, rng))
        .collect();
    format!("val_{suffix}")
}

pub fn truncate_chars(value: String, limit: usize) -> String {
    match value.char_indices().nth(limit) {
        Some((cut, _)) => value[..cut].to_string(),
        None => value,
    }
}

fn pick_char(charset: &[u8], rng: &mut dyn RngCore) -> char {
    charset[rng.random_range(0..charset.len())] as char
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite())
}

fn date_range(ctx: &GeneratorContext<'_>) -> (NaiveDate, NaiveDate) {
    let start = ctx.options.start_date.unwrap_or_else(default_start_date);
    let end = ctx
        .options
        .end_date
        .unwrap_or_else(|| ctx.reference_time.date());
    ctx.ordered("date", start, end)
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}
