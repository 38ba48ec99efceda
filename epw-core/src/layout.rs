use serde::{Deserialize, Serialize};

/// Number of header lines preceding the hourly data in an EPW file.
pub const EPW_HEADER_LINES: usize = 8;

/// A data line must have at least this many fields to be considered.
pub const EPW_MIN_COLUMNS: usize = 7;

pub const EPW_COLUMN_YEAR: usize = 0;
pub const EPW_COLUMN_MONTH: usize = 1;
pub const EPW_COLUMN_DAY: usize = 2;
pub const EPW_COLUMN_HOUR: usize = 3;
pub const EPW_COLUMN_MINUTE: usize = 4;
pub const EPW_COLUMN_DRY_BULB: usize = 6; // dry bulb temperature in degrees C
pub const EPW_COLUMN_CLOUD_COVER: usize = 20;

/// Where things live in an EPW file.
///
/// Defaults describe the common EPW layout. Every field can be overridden from
/// the config file, e.g.
///
/// ```toml
/// [layout]
/// cloud_cover_column = 22
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpwLayout {
    pub header_lines: usize,
    pub delimiter: char,
    pub min_columns: usize,
    pub year_column: usize,
    pub month_column: usize,
    pub day_column: usize,
    pub hour_column: usize,
    pub minute_column: usize,
    pub dry_bulb_column: usize,
    pub cloud_cover_column: usize,
}

impl Default for EpwLayout {
    fn default() -> Self {
        Self {
            header_lines: EPW_HEADER_LINES,
            delimiter: ',',
            min_columns: EPW_MIN_COLUMNS,
            year_column: EPW_COLUMN_YEAR,
            month_column: EPW_COLUMN_MONTH,
            day_column: EPW_COLUMN_DAY,
            hour_column: EPW_COLUMN_HOUR,
            minute_column: EPW_COLUMN_MINUTE,
            dry_bulb_column: EPW_COLUMN_DRY_BULB,
            cloud_cover_column: EPW_COLUMN_CLOUD_COVER,
        }
    }
}

impl EpwLayout {
    /// Delimiter as a single byte. Non-ASCII delimiters fall back to a comma.
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .unwrap_or(b',')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_matches_epw() {
        let layout = EpwLayout::default();

        assert_eq!(layout.header_lines, 8);
        assert_eq!(layout.min_columns, 7);
        assert_eq!(layout.dry_bulb_column, 6);
        assert_eq!(layout.cloud_cover_column, 20);
        assert_eq!(layout.delimiter_byte(), b',');
    }

    #[test]
    fn non_ascii_delimiter_falls_back_to_comma() {
        let layout = EpwLayout {
            delimiter: '§',
            ..EpwLayout::default()
        };
        assert_eq!(layout.delimiter_byte(), b',');

        let layout = EpwLayout {
            delimiter: ';',
            ..EpwLayout::default()
        };
        assert_eq!(layout.delimiter_byte(), b';');
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let layout: EpwLayout = toml::from_str("cloud_cover_column = 22").expect("valid toml");

        assert_eq!(layout.cloud_cover_column, 22);
        assert_eq!(layout.header_lines, EPW_HEADER_LINES);
    }
}
