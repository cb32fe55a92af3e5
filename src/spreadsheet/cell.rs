use chrono::Duration;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use chrono::Timelike;

/// Largest whole-day serial a spreadsheet can represent (9999-12-31).
const MAX_DATE_SERIAL: i64 = 2_958_465;

/// Wall-clock time plain date serials are anchored at
pub(crate) const ANCHOR_TIME: NaiveTime = match NaiveTime::from_hms_opt(12, 0, 0) {
    Some(time) => time,
    None => NaiveTime::MIN,
};

/// Date system a workbook's serial numbers count from.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DateSystem {
    /// Day 1 is 1900-01-01, including the phantom 1900-02-29 (day 60).
    #[default]
    Excel1900,
    /// Day 0 is 1904-01-01.
    Excel1904,
}

impl DateSystem {
    /// Converts the whole-day part of a serial to a calendar date.
    ///
    /// Returns `None` for NaN, negative or out-of-range serials and for the
    /// non-existent 1900-02-29.
    pub fn serial_to_date(&self, serial: f64) -> Option<NaiveDate> {
        if !serial.is_finite() || serial < 0.0 {
            return None;
        }
        let days = serial.trunc() as i64;
        if days > MAX_DATE_SERIAL {
            return None;
        }
        let (epoch, offset) = match self {
            DateSystem::Excel1900 if days < 60 => (NaiveDate::from_ymd_opt(1899, 12, 31)?, days),
            DateSystem::Excel1900 if days == 60 => return None,
            DateSystem::Excel1900 => (NaiveDate::from_ymd_opt(1899, 12, 30)?, days),
            DateSystem::Excel1904 => (NaiveDate::from_ymd_opt(1904, 1, 1)?, days),
        };
        epoch.checked_add_signed(Duration::days(offset))
    }

    /// Converts a serial to a date-time, the fraction being the time of day
    /// rounded to the second.
    pub fn serial_to_datetime(&self, serial: f64) -> Option<NaiveDateTime> {
        let date = self.serial_to_date(serial)?;
        let seconds = (serial.fract() * 86_400.0).round() as i64;
        date.and_time(NaiveTime::MIN)
            .checked_add_signed(Duration::seconds(seconds))
    }
}

/// One decoded cell value, as handed to the ingestion pipeline.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RawCell {
    #[default]
    Null,
    Number(f64),
    Text(String),
    /// Calendar date, with the time of day the cell carried (midnight for
    /// plain dates).
    Date(NaiveDateTime),
    Boolean(bool),
}

impl RawCell {
    pub fn is_null(&self) -> bool {
        matches!(self, RawCell::Null)
    }

    /// Stringifies the value the way it is shown in headers and text columns.
    ///
    /// Integral numbers print without a fraction, null as the empty string.
    /// Dates print as `YYYY-MM-DD`; the time is appended unless it is
    /// midnight or the noon anchor, so resolved and anchored dates of one
    /// column read alike.
    pub fn to_text(&self) -> String {
        match self {
            RawCell::Null => String::new(),
            RawCell::Number(value) => format_number(*value),
            RawCell::Text(value) => value.to_owned(),
            RawCell::Date(value) if value.time() == NaiveTime::MIN || value.time() == ANCHOR_TIME => {
                value.format("%Y-%m-%d").to_string()
            }
            RawCell::Date(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
            RawCell::Boolean(value) => value.to_string(),
        }
    }
}

/// Shortest decimal rendering of a number, integral values without `.0`.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// How a worksheet cell's raw text is to be interpreted.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    Boolean,
    Number,
    /// Number styled with a date or date-time format
    NumberDate,
    /// Number styled with a time-only format
    NumberTime,
    /// ISO 8601 date/time text (`t="d"`)
    IsoDateTime,
    InlineString,
    SharedString,
    Error,
}

impl CellType {
    /// Classifies built-in number format ids.
    pub(crate) fn parse_builtin_number_format_id(id: &str) -> Option<Self> {
        match id.parse::<u32>().ok()? {
            14..=17 | 22 | 27..=36 | 50..=58 => Some(Self::NumberDate),
            18..=21 | 45..=47 => Some(Self::NumberTime),
            _ => None,
        }
    }

    /// Classifies a custom number format code by scanning for date/time tokens
    /// outside literals, escapes and bracketed sections.
    pub(crate) fn parse_custom_number_format(format: &str) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_bracket = false;
        let mut is_date = false;
        let mut is_time = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' if !is_literal => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_bracket => is_literal = true,

                ']' if is_bracket => is_bracket = false,
                '[' if !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        if is_date {
            Self::NumberDate
        } else if is_time {
            Self::NumberTime
        } else {
            Self::Number
        }
    }
}

/// A worksheet cell with its position, type and raw text.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    pub(crate) kind: CellType,
    /// Raw text; for shared strings the already resolved string
    pub(crate) value: String,
}

impl Cell {
    fn to_number(&self) -> Option<f64> {
        self.value.trim().parse::<f64>().ok()
    }

    /// Converts the cell into the pipeline's value model.
    ///
    /// Date-styled numbers become dates when the serial is representable,
    /// otherwise they stay numbers. Numbers that do not parse are kept as text.
    pub(crate) fn to_raw(&self, system: DateSystem) -> RawCell {
        match self.kind {
            CellType::Empty | CellType::Error => RawCell::Null,
            CellType::Boolean => RawCell::Boolean(self.value.trim() == "1"),
            CellType::InlineString | CellType::SharedString => RawCell::Text(self.value.to_owned()),
            CellType::IsoDateTime => parse_iso_datetime(&self.value)
                .map(RawCell::Date)
                .unwrap_or_else(|| RawCell::Text(self.value.to_owned())),
            CellType::NumberDate => match self.to_number() {
                Some(serial) => system
                    .serial_to_datetime(serial)
                    .map(RawCell::Date)
                    .unwrap_or(RawCell::Number(serial)),
                None => RawCell::Text(self.value.to_owned()),
            },
            CellType::Number | CellType::NumberTime => match self.to_number() {
                Some(number) => RawCell::Number(number),
                None => RawCell::Text(self.value.to_owned()),
            },
        }
    }
}

/// Parses the ISO forms SpreadsheetML uses for `t="d"` cells.
fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim().trim_end_matches('Z');
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .map(|datetime| datetime.with_nanosecond(0).unwrap_or(datetime))
}
