//! Integration tests for the vitae pipeline.
//!
//! These tests exercise the full path from a document to pages and on to
//! HTML and PDF output. They verify:
//! - Blocks land on pages greedily, whole, in order
//! - Explicit breaks and skill groups are honoured
//! - Exports carry no preview decorations
//! - Import/export and sessions survive a round trip through storage

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use vitae::editor::{reduce, Action, SectionPatch, SortDirection, SortKey};
use vitae::flatten::{flatten, BlockKind, RenderBlock};
use vitae::layout::{PageAssignment, Paginator};
use vitae::measure::{HostMeasurements, MetricsMeasurer};
use vitae::model::*;
use vitae::session::Session;
use vitae::store::{export_json, import_json, FileStorage};
use vitae::style::CvStyle;
use vitae::HtmlTarget;

// ─── Helpers ────────────────────────────────────────────────────

fn sample() -> Document {
    Document::sample(&mut SequentialIds::default())
}

fn section(id: &str, section_type: SectionType, items: Vec<Entry>) -> Section {
    Section {
        id: id.into(),
        title: section_type.to_string(),
        section_type,
        items,
        layout: Some(section_type.default_layout()),
        display_style: None,
        visible: true,
        page_break_before: false,
        page_break_after: false,
    }
}

fn work(id: &str, n: usize) -> Entry {
    Entry::new(
        id,
        EntryBody::WorkExperience(WorkExperienceEntry {
            job_title: format!("Engineer {n}"),
            company: "Acme".into(),
            start_date: "2020-01-01".into(),
            end_date: PRESENT.into(),
            description: "<ul><li>Shipped things that people used every single day.</li><li>Reviewed code.</li></ul>"
                .into(),
            ..Default::default()
        }),
    )
}

fn skill(id: &str, name: &str, category: &str) -> Entry {
    Entry::new(
        id,
        EntryBody::Skill(SkillEntry {
            skill_name: name.into(),
            category: category.into(),
            ..Default::default()
        }),
    )
}

fn custom(id: &str, title: &str) -> Entry {
    Entry::new(
        id,
        EntryBody::Custom(CustomEntry {
            title: title.into(),
            ..Default::default()
        }),
    )
}

fn document(sections: Vec<Section>) -> Document {
    Document {
        personal_info: PersonalInfo {
            name: "Jane Doe".into(),
            ..Default::default()
        },
        sections,
    }
}

fn long_document(entries: usize) -> Document {
    let items = (0..entries).map(|n| work(&format!("w{n}"), n)).collect();
    document(vec![section("work", SectionType::WorkExperience, items)])
}

/// Fixed host heights for a flattened document.
fn heights(blocks: &[RenderBlock], height_of: impl Fn(&RenderBlock) -> f64) -> HashMap<String, f64> {
    blocks.iter().map(|b| (b.id.clone(), height_of(b))).collect()
}

fn assert_contiguous(assignment: &PageAssignment, blocks: &[RenderBlock]) {
    let mut last = 0;
    for block in blocks {
        let page = assignment.page_of(&block.id).expect("every block is assigned");
        assert!(page == last || page == last + 1, "page jumped from {last} to {page}");
        last = page;
    }
    assert_eq!(assignment.page_count(), last + 1);
}

fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle.as_bytes())
}

// ─── Pagination ─────────────────────────────────────────────────

#[test]
fn test_fifth_item_moves_to_the_next_page() {
    let items = (1..=5).map(|n| custom(&format!("e{n}"), &format!("Item {n}"))).collect();
    let doc = document(vec![section("a", SectionType::Custom, items)]);
    let blocks = flatten(&doc);
    // Header and section title together take 100px.
    let heights = heights(&blocks, |b| match b.kind {
        BlockKind::Header => 55.0,
        BlockKind::SectionHeader => 45.0,
        _ => 150.0,
    });

    let assignment = PageAssignment::from_heights(&blocks, &heights, 700.0);
    for n in 1..=4 {
        assert_eq!(assignment.page_of(&format!("item:a:e{n}")), Some(0));
    }
    assert_eq!(assignment.page_of("item:a:e5"), Some(1));
    assert_eq!(assignment.page_count(), 2);
}

#[test]
fn test_skill_category_is_never_split() {
    let doc = document(vec![section(
        "skills",
        SectionType::Skills,
        vec![
            skill("s1", "Rust", "Languages"),
            skill("s2", "Go", "Languages"),
            skill("s3", "Git", "Tools"),
            skill("s4", "Docker", "Tools"),
        ],
    )]);
    let style = CvStyle::default();
    let width = style.page_geometry().width;
    let blocks = flatten(&doc);
    // The header leaves room for the title and one category only.
    let measured = heights(&blocks, |b| match b.kind {
        BlockKind::Header => 1000.0,
        BlockKind::SectionHeader => 20.0,
        _ => 30.0,
    });

    let mut paginator = Paginator::new(HostMeasurements::new(measured));
    let pass = paginator.relayout(&doc, 0, &style, width);
    assert!(!pass.stale);
    let view = vitae::page_view(pass, &style);
    assert_eq!(view.pages.len(), 2);

    let mut seen: HashMap<String, usize> = HashMap::new();
    for page in &view.pages {
        for block in page.sections.iter().flat_map(|s| &s.blocks) {
            if let BlockKind::SkillGroup { entry_ids, .. } = &block.kind {
                for id in entry_ids {
                    assert!(seen.insert(id.clone(), page.index).is_none(), "{id} rendered twice");
                }
            }
        }
    }
    assert_eq!(seen["s1"], seen["s2"]);
    assert_eq!(seen["s3"], seen["s4"]);
    assert_eq!(seen["s1"], 0);
    assert_eq!(seen["s3"], 1);
}

#[test]
fn test_long_document_spans_pages() {
    let doc = long_document(30);
    let style = CvStyle::default();
    let pass = vitae::paginate(&doc, &style);
    assert!(pass.assignment.page_count() >= 2);
    assert_contiguous(&pass.assignment, &pass.blocks);

    let budget = style.page_geometry().content_height();
    let heights = pass.heights.as_ref().expect("metrics always measure");
    let mut totals = vec![0.0; pass.assignment.page_count()];
    for block in &pass.blocks {
        totals[pass.assignment.page_of(&block.id).unwrap_or(0)] += heights[&block.id];
    }
    for total in totals {
        assert!(total <= budget + 1.0, "page total {total} over budget {budget}");
    }
}

#[test]
fn test_explicit_break_starts_a_new_page() {
    let mut doc = document(vec![
        section("a", SectionType::Custom, vec![custom("e1", "One")]),
        section("b", SectionType::Custom, vec![custom("e2", "Two")]),
    ]);
    let pass = vitae::paginate(&doc, &CvStyle::default());
    assert_eq!(pass.assignment.page_count(), 1);

    doc = reduce(
        &doc,
        Action::UpdateSection {
            section_id: "b".into(),
            patch: SectionPatch {
                page_break_before: Some(true),
                ..Default::default()
            },
        },
        &mut SequentialIds::default(),
    );
    let pass = vitae::paginate(&doc, &CvStyle::default());
    assert_eq!(pass.assignment.page_of("item:a:e1"), Some(0));
    assert_eq!(pass.assignment.page_of("section:b"), Some(1));
}

#[test]
fn test_hidden_sections_are_not_paginated() {
    let mut doc = sample();
    for section in &mut doc.sections {
        section.visible = false;
    }
    let pass = vitae::paginate(&doc, &CvStyle::default());
    assert_eq!(pass.blocks.len(), 1);
    assert_eq!(pass.assignment.page_count(), 1);
}

#[test]
fn test_zero_width_keeps_the_last_committed_pages() {
    let doc = long_document(30);
    let style = CvStyle::default();
    let mut paginator = Paginator::new(MetricsMeasurer::new());
    let pages = paginator.relayout(&doc, 1, &style, 794.0).assignment.page_count();
    assert!(pages >= 2);

    let pass = paginator.relayout(&doc, 1, &style, 0.0);
    assert!(pass.stale);
    assert_eq!(pass.assignment.page_count(), pages);
}

// ─── Editing ────────────────────────────────────────────────────

#[test]
fn test_natural_sort_orders_numbers_numerically() {
    let doc = document(vec![section(
        "c",
        SectionType::Custom,
        vec![custom("a", "Item 10"), custom("b", "item 9"), custom("c", "Item 2")],
    )]);
    let sorted = reduce(
        &doc,
        Action::SortItems {
            section_id: "c".into(),
            key: SortKey::Title,
            direction: SortDirection::Asc,
        },
        &mut SequentialIds::default(),
    );
    let order: Vec<&str> = sorted.sections[0].items.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(order, ["c", "b", "a"]);
}

#[test]
fn test_duplicate_section_gets_fresh_ids() {
    let doc = sample();
    let id = doc.sections[0].id.clone();
    let mut ids = SequentialIds::default();
    // Skip past ids the sample already used.
    for _ in 0..1000 {
        ids.next_id();
    }
    let next = reduce(&doc, Action::DuplicateSection { section_id: id }, &mut ids);
    assert_eq!(next.sections.len(), doc.sections.len() + 1);
    assert!(next.validate().is_ok());

    let before: HashSet<&str> = doc.sections.iter().map(|s| s.id.as_str()).collect();
    assert!(next.sections.iter().filter(|s| !before.contains(s.id.as_str())).count() == 1);
}

// ─── Output ─────────────────────────────────────────────────────

#[test]
fn test_exports_carry_no_decorations() {
    let doc = long_document(30);
    let style = CvStyle::default();

    let export = vitae::render_html(&doc, &style, HtmlTarget::Export);
    assert!(export.contains("data-page=\"2\""));
    assert!(!export.contains("ruler"));
    assert!(!export.contains("page-end"));

    let preview = vitae::render_html(&doc, &style, HtmlTarget::Preview);
    assert!(preview.contains("class=\"ruler\""));
    assert!(preview.contains("class=\"page-end\""));
}

#[test]
fn test_pdf_has_one_page_per_assigned_page() {
    let doc = long_document(30);
    let style = CvStyle::default();
    let pages = vitae::paginate(&doc, &style).assignment.page_count();
    let bytes = vitae::render_pdf(&doc, &style);
    assert!(bytes.starts_with(b"%PDF-1.7"));
    assert!(contains(&bytes, &format!("/Count {pages}")));
    assert!(contains(&bytes, "/Title (Jane Doe - CV)"));
}

#[test]
fn test_render_json_accepts_a_bare_document() {
    let json = serde_json::to_string(&sample()).unwrap();
    let bytes = vitae::render_json(&json).unwrap();
    assert!(bytes.starts_with(b"%PDF"));

    let cv = vitae::read_cv(&json).unwrap();
    assert_eq!(cv.style, CvStyle::default());
    assert_eq!(cv.name, "Jane Doe");
}

#[test]
fn test_render_json_reports_bad_input() {
    assert!(vitae::render_json("{ nope").is_err());
    assert!(vitae::render_json(r#"{ "name": "x", "data": {} }"#).is_err());
}

// ─── Persistence ────────────────────────────────────────────────

#[test]
fn test_export_import_round_trip() {
    let doc = sample();
    let mut style = CvStyle::default();
    style.personal_info_columns = 3;
    let json = export_json("Round trip", &doc, &style).unwrap();
    let bundle = import_json(&json).unwrap();
    assert_eq!(bundle.data, doc);
    assert_eq!(bundle.style, style);
}

#[test]
fn test_session_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let start = Instant::now();

    let document = {
        let storage = FileStorage::new(dir.path());
        let mut session = Session::open(Box::new(storage), Box::new(SequentialIds::default()));
        for n in 0..3 {
            session.dispatch(
                Action::AddSection {
                    title: format!("Extra {n}"),
                    section_type: SectionType::Custom,
                },
                start + Duration::from_millis(100 * n),
            );
        }
        session.rename("Restarted", start + Duration::from_millis(250));
        assert!(session.tick(start + Duration::from_millis(750)).unwrap());
        session.document().clone()
    };

    let reopened = Session::open(Box::new(FileStorage::new(dir.path())), Box::new(UuidIds));
    assert_eq!(reopened.name(), "Restarted");
    assert_eq!(reopened.document(), &document);
}
