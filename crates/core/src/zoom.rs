//! Zoom levels and the timeline header they produce.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize};

use crate::bounds::TimelineBounds;
use crate::error::GanttResult;
use crate::geometry::offset_of;

/// Calendar granularity of the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomLevel {
    #[default]
    Day,
    Week,
    Month,
}

impl ZoomLevel {
    /// All levels from finest to coarsest.
    pub const ALL: [ZoomLevel; 3] = [ZoomLevel::Day, ZoomLevel::Week, ZoomLevel::Month];

    /// Returns the string representation used in the snapshot document
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoomLevel::Day => "day",
            ZoomLevel::Week => "week",
            ZoomLevel::Month => "month",
        }
    }

    /// Pixels per calendar day (4:2:1 across the levels).
    pub fn day_width(&self) -> i64 {
        match self {
            ZoomLevel::Day => 40,
            ZoomLevel::Week => 20,
            ZoomLevel::Month => 10,
        }
    }

    /// Width of the header cell that starts at `date`.
    pub fn cell_width(&self, date: NaiveDate) -> i64 {
        match self {
            ZoomLevel::Day => self.day_width(),
            ZoomLevel::Week => self.day_width() * 7,
            ZoomLevel::Month => self.day_width() * days_in_month(date),
        }
    }

    /// Whether a header cell starts on `date`.
    pub fn should_render_header_cell(&self, date: NaiveDate) -> bool {
        match self {
            ZoomLevel::Day => true,
            ZoomLevel::Week => date.weekday() == Weekday::Mon,
            ZoomLevel::Month => date.day() == 1,
        }
    }

    /// Label shown in the header cell that starts at `date`.
    pub fn header_label(&self, date: NaiveDate) -> String {
        match self {
            ZoomLevel::Day => {
                if date.day() == 1 || date.weekday() == Weekday::Mon {
                    date.format("%b %d").to_string()
                } else {
                    date.day().to_string()
                }
            }
            ZoomLevel::Week => format!("Week {}", date.iso_week().week()),
            ZoomLevel::Month => date.format("%b %Y").to_string(),
        }
    }

    /// The next level, wrapping from month back to day.
    pub fn cycle(self) -> Self {
        match self {
            ZoomLevel::Day => ZoomLevel::Week,
            ZoomLevel::Week => ZoomLevel::Month,
            ZoomLevel::Month => ZoomLevel::Day,
        }
    }

    /// Header cells covering `bounds`, in date order.
    pub fn header_cells(&self, bounds: &TimelineBounds) -> GanttResult<Vec<HeaderCell>> {
        let day_width = self.day_width();
        let mut cells = Vec::new();
        for date in bounds.start.iter_days().take_while(|d| *d < bounds.end) {
            if !self.should_render_header_cell(date) {
                continue;
            }
            cells.push(HeaderCell {
                date,
                offset: offset_of(date, bounds.start, day_width)?,
                width: self.cell_width(date),
                label: self.header_label(date),
                weekend: is_weekend(date),
            });
        }
        Ok(cells)
    }
}

impl std::fmt::Display for ZoomLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ZoomLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" => Ok(ZoomLevel::Day),
            "week" => Ok(ZoomLevel::Week),
            "month" => Ok(ZoomLevel::Month),
            _ => Err(format!(
                "invalid zoom '{}'. Valid values: day, week, month",
                s
            )),
        }
    }
}

// Unknown zoom strings in stored documents fall back to the default level.
impl<'de> Deserialize<'de> for ZoomLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|s| s.parse().ok()).unwrap_or_default())
    }
}

/// One labelled cell of the timeline header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub date: NaiveDate,
    /// Left edge in pixels from the timeline start.
    pub offset: i64,
    pub width: i64,
    pub label: String,
    pub weekend: bool,
}

/// Number of days in the month containing `date`.
pub fn days_in_month(date: NaiveDate) -> i64 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    match (
        NaiveDate::from_ymd_opt(year, month, 1),
        NaiveDate::from_ymd_opt(date.year(), date.month(), 1),
    ) {
        (Some(next), Some(first)) => (next - first).num_days(),
        _ => 31,
    }
}

/// Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}
