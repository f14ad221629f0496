//! # Font Management
//!
//! The CV style names a CSS font family (`'Poppins', sans-serif`). Layout
//! and PDF output both map that onto one of the standard PDF base families
//! so measured widths and drawn glyphs agree: serif families map to Times,
//! monospace to Courier, everything else to Helvetica.
//!
//! Standard fonts need no embedding, which keeps exported PDFs small and
//! the measurer free of font files.

pub mod metrics;

pub use metrics::StandardFontMetrics;

/// Weight at and above which text is drawn bold.
pub const BOLD_THRESHOLD: u32 = 600;

/// A standard base family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseFamily {
    Helvetica,
    Times,
    Courier,
}

impl BaseFamily {
    /// Resolve a CSS font-family list.
    pub fn from_css(family: &str) -> Self {
        let lower = family.to_ascii_lowercase();
        if lower.contains("mono") || lower.contains("courier") {
            BaseFamily::Courier
        } else if lower.contains("times")
            || lower.contains("georgia")
            || lower.contains("garamond")
            || (lower.contains("serif") && !lower.contains("sans-serif"))
        {
            BaseFamily::Times
        } else {
            BaseFamily::Helvetica
        }
    }
}

/// The standard PDF fonts this crate draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    pub fn resolve(family: BaseFamily, weight: u32, italic: bool) -> Self {
        let bold = weight >= BOLD_THRESHOLD;
        match (family, bold, italic) {
            (BaseFamily::Helvetica, false, false) => Self::Helvetica,
            (BaseFamily::Helvetica, true, false) => Self::HelveticaBold,
            (BaseFamily::Helvetica, false, true) => Self::HelveticaOblique,
            (BaseFamily::Helvetica, true, true) => Self::HelveticaBoldOblique,
            (BaseFamily::Times, false, false) => Self::TimesRoman,
            (BaseFamily::Times, true, false) => Self::TimesBold,
            (BaseFamily::Times, false, true) => Self::TimesItalic,
            (BaseFamily::Times, true, true) => Self::TimesBoldItalic,
            (BaseFamily::Courier, false, false) => Self::Courier,
            (BaseFamily::Courier, true, false) => Self::CourierBold,
            (BaseFamily::Courier, false, true) => Self::CourierOblique,
            (BaseFamily::Courier, true, true) => Self::CourierBoldOblique,
        }
    }

    /// The four faces of a family, regular first.
    pub fn faces(family: BaseFamily) -> [StandardFont; 4] {
        [
            Self::resolve(family, 400, false),
            Self::resolve(family, 700, false),
            Self::resolve(family, 400, true),
            Self::resolve(family, 700, true),
        ]
    }

    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => &metrics::HELVETICA,
            Self::HelveticaBold | Self::HelveticaBoldOblique => &metrics::HELVETICA_BOLD,
            Self::TimesRoman | Self::TimesItalic => &metrics::TIMES_ROMAN,
            Self::TimesBold | Self::TimesBoldItalic => &metrics::TIMES_BOLD,
            Self::Courier | Self::CourierBold | Self::CourierOblique | Self::CourierBoldOblique => {
                &metrics::COURIER
            }
        }
    }
}

/// Text measurement for one CV's font family.
#[derive(Debug, Clone, Copy)]
pub struct FontContext {
    family: BaseFamily,
}

impl FontContext {
    pub fn new(css_family: &str) -> Self {
        Self {
            family: BaseFamily::from_css(css_family),
        }
    }

    pub fn family(&self) -> BaseFamily {
        self.family
    }

    pub fn font(&self, weight: u32, italic: bool) -> StandardFont {
        StandardFont::resolve(self.family, weight, italic)
    }

    /// Advance width of a single character, in the unit of `font_size`.
    pub fn char_width(&self, ch: char, weight: u32, italic: bool, font_size: f64) -> f64 {
        self.font(weight, italic).metrics().char_width(ch, font_size)
    }

    /// Width of a string, in the unit of `font_size`.
    pub fn measure_string(
        &self,
        text: &str,
        weight: u32,
        italic: bool,
        font_size: f64,
        letter_spacing: f64,
    ) -> f64 {
        self.font(weight, italic)
            .metrics()
            .measure_string(text, font_size, letter_spacing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_families_map_to_base_families() {
        assert_eq!(BaseFamily::from_css("'Poppins', sans-serif"), BaseFamily::Helvetica);
        assert_eq!(BaseFamily::from_css("'Merriweather', serif"), BaseFamily::Times);
        assert_eq!(BaseFamily::from_css("Georgia"), BaseFamily::Times);
        assert_eq!(BaseFamily::from_css("'Roboto Mono', monospace"), BaseFamily::Courier);
    }

    #[test]
    fn bold_is_wider() {
        let ctx = FontContext::new("Helvetica");
        let regular = ctx.char_width('A', 400, false, 12.0);
        let bold = ctx.char_width('A', 700, false, 12.0);
        assert!(bold > regular);
    }

    #[test]
    fn semibold_snaps_to_bold() {
        let ctx = FontContext::new("Inter");
        assert_eq!(ctx.font(600, false), StandardFont::HelveticaBold);
        assert_eq!(ctx.font(500, true), StandardFont::HelveticaOblique);
    }

    #[test]
    fn faces_are_distinct() {
        let faces = StandardFont::faces(BaseFamily::Times);
        assert_eq!(faces[0].pdf_name(), "Times-Roman");
        assert_eq!(faces[3].pdf_name(), "Times-BoldItalic");
    }
}
