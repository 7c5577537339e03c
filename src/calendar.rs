//! Solar Hijri (Jalali) date stamps used in data file names.

use chrono::{Datelike, NaiveDate};

const CUMULATIVE_DAYS: [i64; 12] = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];

/// Convert a Gregorian date to a Jalali `(year, month, day)` triple.
pub fn to_jalali(date: NaiveDate) -> (i64, u32, u32) {
    let gy = i64::from(date.year());
    let gm = date.month() as usize;
    let gd = i64::from(date.day());

    let gy2 = if gm > 2 { gy + 1 } else { gy };
    let mut days = 355_666 + 365 * gy + (gy2 + 3) / 4 - (gy2 + 99) / 100 + (gy2 + 399) / 400
        + gd
        + CUMULATIVE_DAYS[gm - 1];

    let mut jy = -1595 + 33 * (days / 12_053);
    days %= 12_053;
    jy += 4 * (days / 1461);
    days %= 1461;
    if days > 365 {
        jy += (days - 1) / 365;
        days = (days - 1) % 365;
    }

    let (jm, jd) = if days < 186 {
        (1 + days / 31, 1 + days % 31)
    } else {
        (7 + (days - 186) / 30, 1 + (days - 186) % 30)
    };

    (jy, jm as u32, jd as u32)
}

/// `yyyymmdd` in the Jalali calendar, e.g. `13990101`.
pub fn jalali_stamp(date: NaiveDate) -> String {
    let (y, m, d) = to_jalali(date);
    format!("{}{:02}{:02}", y, m, d)
}
