//! # Text Layout
//!
//! Line breaking and text measurement over styled runs.
//!
//! Break opportunities come from UAX#14 (`unicode-linebreak`); widths come
//! from the standard-font tables in [`crate::font`]. Breaking is greedy:
//! a line takes characters until the next one would overflow, then breaks
//! at the last opportunity, or mid-word when a single word is wider than
//! the line.

pub mod rich;

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::font::FontContext;
use crate::style::Color;

/// Visual style of a run of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub size: f64,
    pub weight: u32,
    pub italic: bool,
    pub letter_spacing: f64,
    pub color: Color,
    pub href: Option<String>,
}

impl TextStyle {
    pub fn new(size: f64, weight: u32, color: Color) -> Self {
        Self {
            size,
            weight,
            italic: false,
            letter_spacing: 0.0,
            color,
            href: None,
        }
    }

    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn tracking(mut self, letter_spacing: f64) -> Self {
        self.letter_spacing = letter_spacing;
        self
    }

    pub fn link(mut self, href: Option<String>) -> Self {
        self.href = href;
        self
    }
}

/// A run of text with one style.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub style: TextStyle,
}

impl Span {
    pub fn new(text: impl Into<String>, style: TextStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// A same-style piece of a broken line, positioned from the line start.
#[derive(Debug, Clone, PartialEq)]
pub struct LineFragment {
    pub text: String,
    pub x: f64,
    pub width: f64,
    pub style: TextStyle,
}

/// One line after breaking. `width` excludes trailing spaces.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub fragments: Vec<LineFragment>,
    pub width: f64,
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Entry `i` is the opportunity *before* char `i`; index 0 is always
/// `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    let mut byte_to_char = vec![0usize; text.len() + 1];
    for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
        byte_to_char[byte_idx] = char_idx;
    }
    byte_to_char[text.len()] = char_count;

    // linebreaks() yields the byte offset where the next segment starts.
    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }
    result
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

/// Width of one line of text in one style, with no breaking.
pub fn measure_width(fonts: &FontContext, text: &str, style: &TextStyle) -> f64 {
    fonts.measure_string(text, style.weight, style.italic, style.size, style.letter_spacing)
}

/// Break styled runs into lines no wider than `max_width`.
///
/// Always returns at least one line; empty input gives one empty line.
pub fn break_into_lines(fonts: &FontContext, spans: &[Span], max_width: f64) -> Vec<TextLine> {
    let mut chars: Vec<(char, usize)> = Vec::new();
    for (idx, span) in spans.iter().enumerate() {
        chars.extend(span.text.chars().map(|ch| (ch, idx)));
    }
    if chars.is_empty() {
        return vec![TextLine {
            fragments: Vec::new(),
            width: 0.0,
        }];
    }

    let widths: Vec<f64> = chars
        .iter()
        .map(|&(ch, idx)| {
            if is_newline(ch) {
                return 0.0;
            }
            let style = &spans[idx].style;
            fonts.char_width(ch, style.weight, style.italic, style.size) + style.letter_spacing
        })
        .collect();

    let plain: String = chars.iter().map(|&(ch, _)| ch).collect();
    let break_opps = compute_break_opportunities(&plain);

    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut line_width = 0.0;
    let mut last_break_point: Option<usize> = None;

    for i in 0..chars.len() {
        if i > 0 {
            match break_opps[i] {
                Some(BreakOpportunity::Mandatory) => {
                    let end = if is_newline(chars[i - 1].0) { i - 1 } else { i };
                    lines.push(make_line(&chars[line_start..end], &widths[line_start..end], spans));
                    line_start = i;
                    line_width = 0.0;
                    last_break_point = None;
                }
                Some(BreakOpportunity::Allowed) => last_break_point = Some(i - 1),
                None => {}
            }
        }

        if is_newline(chars[i].0) {
            continue;
        }

        let char_width = widths[i];
        if line_width + char_width > max_width && line_start < i {
            let break_at = match last_break_point {
                Some(bp) if bp >= line_start => bp + 1,
                _ => i,
            };
            lines.push(make_line(
                &chars[line_start..break_at],
                &widths[line_start..break_at],
                spans,
            ));
            line_start = break_at;
            line_width = widths[line_start..=i].iter().sum();
            last_break_point = None;
            continue;
        }
        line_width += char_width;
    }

    if line_start < chars.len() {
        let rest: Vec<(char, usize)> = chars[line_start..]
            .iter()
            .copied()
            .filter(|&(ch, _)| !is_newline(ch))
            .collect();
        let rest_widths: Vec<f64> = chars[line_start..]
            .iter()
            .zip(&widths[line_start..])
            .filter(|((ch, _), _)| !is_newline(*ch))
            .map(|(_, w)| *w)
            .collect();
        lines.push(make_line(&rest, &rest_widths, spans));
    }
    lines
}

/// Group chars into same-style fragments and compute the trimmed width.
fn make_line(chars: &[(char, usize)], widths: &[f64], spans: &[Span]) -> TextLine {
    let mut fragments: Vec<(usize, LineFragment)> = Vec::new();
    let mut x = 0.0;
    for (&(ch, idx), &w) in chars.iter().zip(widths) {
        match fragments.last_mut() {
            Some((last_idx, fragment)) if *last_idx == idx => {
                fragment.text.push(ch);
                fragment.width += w;
            }
            _ => fragments.push((
                idx,
                LineFragment {
                    text: ch.to_string(),
                    x,
                    width: w,
                    style: spans[idx].style.clone(),
                },
            )),
        }
        x += w;
    }

    let mut width = x;
    for (&(ch, _), &w) in chars.iter().zip(widths).rev() {
        if ch != ' ' {
            break;
        }
        width -= w;
    }

    TextLine {
        fragments: fragments.into_iter().map(|(_, f)| f).collect(),
        width,
    }
}
