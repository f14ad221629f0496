//! # Style System
//!
//! The CV style record and the geometry it implies.
//!
//! Style values are presets rather than free-form CSS: a font size preset,
//! a line-height preset, a page margin preset and so on. Each preset maps to
//! a fixed pixel value at 96 dpi, which is what the preview page and the
//! measurer both use. Keeping the set small keeps the measured layout and
//! the displayed layout in lockstep.
//!
//! Every field has a default, and the struct is deserialized with
//! `#[serde(default)]`, so a style exported by an older version is merged
//! over the current defaults on import.

use serde::{Deserialize, Serialize};

use crate::model::{parse_date, PRESENT};

/// The complete style record for a CV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvStyle {
    /// CSS font-family value, e.g. `'Poppins', sans-serif`.
    pub font_family: String,
    pub font_size: FontSize,
    pub line_height: LineHeight,
    /// Page padding preset, applied on all four sides.
    pub margin: PageMargin,
    /// Bottom spacing after each section.
    pub section_spacing: SectionSpacing,
    pub date_format: DateFormat,
    pub page_alignment: PageAlignment,
    pub accent_color: String,
    pub heading_color: String,
    pub body_text_color: String,
    pub heading_style: HeadingStyle,
    /// Columns in the personal-info detail grid (1-4).
    pub personal_info_columns: u8,
    /// Grid gaps, in rem (16px).
    pub personal_info_column_gap: f64,
    pub personal_info_row_gap: f64,
    pub personal_info_label_value_gap: f64,
    pub paper_size: PaperSize,
}

impl Default for CvStyle {
    fn default() -> Self {
        Self {
            font_family: "'Poppins', sans-serif".to_string(),
            font_size: FontSize::Sm,
            line_height: LineHeight::Normal,
            margin: PageMargin::P8,
            section_spacing: SectionSpacing::Mb4,
            date_format: DateFormat::MonthYear,
            page_alignment: PageAlignment::Left,
            accent_color: "#3b82f6".to_string(),
            heading_color: "#1f2937".to_string(),
            body_text_color: "#374151".to_string(),
            heading_style: HeadingStyle::CompanyFirst,
            personal_info_columns: 2,
            personal_info_column_gap: 2.0,
            personal_info_row_gap: 0.5,
            personal_info_label_value_gap: 0.5,
            paper_size: PaperSize::A4,
        }
    }
}

/// Pixels per CSS rem.
pub const REM: f64 = 16.0;

impl CvStyle {
    /// Base body font size in px.
    pub fn base_font_size(&self) -> f64 {
        self.font_size.px()
    }

    /// Body line height in px.
    pub fn body_line_height(&self) -> f64 {
        self.font_size.px() * self.line_height.factor()
    }

    /// Personal-info grid columns, clamped to the supported 1-4 range.
    pub fn detail_columns(&self) -> usize {
        usize::from(self.personal_info_columns.clamp(1, 4))
    }

    /// Geometry of one page for this style.
    pub fn page_geometry(&self) -> PageGeometry {
        PageGeometry::new(self.paper_size, self.margin)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontSize {
    #[serde(rename = "text-xs")]
    Xs,
    #[default]
    #[serde(rename = "text-sm")]
    Sm,
    #[serde(rename = "text-base")]
    Base,
    #[serde(rename = "text-lg")]
    Lg,
}

impl FontSize {
    pub fn px(self) -> f64 {
        match self {
            FontSize::Xs => 12.0,
            FontSize::Sm => 14.0,
            FontSize::Base => 16.0,
            FontSize::Lg => 18.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineHeight {
    #[serde(rename = "leading-tight")]
    Tight,
    #[default]
    #[serde(rename = "leading-normal")]
    Normal,
    #[serde(rename = "leading-relaxed")]
    Relaxed,
}

impl LineHeight {
    /// Multiplier of the font size.
    pub fn factor(self) -> f64 {
        match self {
            LineHeight::Tight => 1.25,
            LineHeight::Normal => 1.5,
            LineHeight::Relaxed => 1.625,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageMargin {
    #[serde(rename = "p-4")]
    P4,
    #[default]
    #[serde(rename = "p-8")]
    P8,
    #[serde(rename = "p-12")]
    P12,
}

impl PageMargin {
    pub fn px(self) -> f64 {
        match self {
            PageMargin::P4 => 16.0,
            PageMargin::P8 => 32.0,
            PageMargin::P12 => 48.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionSpacing {
    #[serde(rename = "mb-3")]
    Mb3,
    #[default]
    #[serde(rename = "mb-4")]
    Mb4,
    #[serde(rename = "mb-6")]
    Mb6,
}

impl SectionSpacing {
    pub fn px(self) -> f64 {
        match self {
            SectionSpacing::Mb3 => 12.0,
            SectionSpacing::Mb4 => 16.0,
            SectionSpacing::Mb6 => 24.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateFormat {
    #[serde(rename = "MM/YYYY")]
    MonthNumberYear,
    #[default]
    #[serde(rename = "Month YYYY")]
    MonthYear,
    #[serde(rename = "YYYY")]
    Year,
}

impl DateFormat {
    /// Format a stored date for display. `Present` (any case) stays
    /// `Present`; anything that doesn't parse as a date is shown verbatim.
    pub fn format(self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }
        if raw.eq_ignore_ascii_case(PRESENT) {
            return PRESENT.to_string();
        }
        let Some(date) = parse_date(raw.trim()) else {
            return raw.to_string();
        };
        match self {
            DateFormat::MonthYear => date.format("%B %Y").to_string(),
            DateFormat::MonthNumberYear => date.format("%m/%Y").to_string(),
            DateFormat::Year => date.format("%Y").to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageAlignment {
    #[default]
    Left,
    Center,
}

/// Which half of a work/education heading comes first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HeadingStyle {
    #[default]
    CompanyFirst,
    TitleFirst,
}

/// Supported paper sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    A4,
    Letter,
}

impl PaperSize {
    /// Returns (width, height) in CSS px at 96 dpi.
    pub fn dimensions(self) -> (f64, f64) {
        match self {
            PaperSize::A4 => (794.0, 1123.0),
            PaperSize::Letter => (816.0, 1056.0),
        }
    }
}

/// Pixel geometry of a page: size, uniform margin and the usable content box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl PageGeometry {
    pub fn new(paper: PaperSize, margin: PageMargin) -> Self {
        let (width, height) = paper.dimensions();
        Self {
            width,
            height,
            margin: margin.px(),
        }
    }

    /// Usable content width (page width minus left and right margin).
    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    /// The page budget: page height minus top and bottom margin.
    pub fn content_height(&self) -> f64 {
        self.height - 2.0 * self.margin
    }
}

/// An RGB color with components in 0.0 - 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Parse `#rgb` or `#rrggbb`. Anything else resolves to black.
    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim().trim_start_matches('#');
        let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0);
        let (r, g, b) = match hex.len() {
            3 if hex.is_ascii() => (
                channel(&hex[0..1].repeat(2)),
                channel(&hex[1..2].repeat(2)),
                channel(&hex[2..3].repeat(2)),
            ),
            6 if hex.is_ascii() => (channel(&hex[0..2]), channel(&hex[2..4]), channel(&hex[4..6])),
            _ => (0, 0, 0),
        };
        Self {
            r: f64::from(r) / 255.0,
            g: f64::from(g) / 255.0,
            b: f64::from(b) / 255.0,
        }
    }

    /// Blend toward white; `amount` of 1.0 keeps the color, 0.0 is white.
    pub fn with_opacity(self, amount: f64) -> Self {
        let mix = |c: f64| c * amount + (1.0 - amount);
        Self {
            r: mix(self.r),
            g: mix(self.g),
            b: mix(self.b),
        }
    }
}
