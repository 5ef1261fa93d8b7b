use docmark::bidi::Reorderer;
use docmark::config::{parse_config_string, ConfigSource};
use docmark::fonts::FontBook;
use docmark::layout::DrawItem;
use docmark::styling::{PageSize, RenderStyle};
use docmark::Engine;
use lopdf::Document;
use tempfile::tempdir;

fn builtin_engine(style: RenderStyle) -> Engine {
    Engine::new(FontBook::builtin(), style, Reorderer::default())
}

fn page_count(bytes: &[u8]) -> usize {
    Document::load_mem(bytes).unwrap().get_pages().len()
}

const SAMPLE: &str = "# Quarterly report

Intro with **bold**, *italic* and `code`.

## Items

- first
  - nested
1. numbered

> a quote

---

```
fn main() {}
```
";

#[test]
fn test_sample_document_renders_one_page() {
    let engine = builtin_engine(RenderStyle::default());
    let bytes = engine.render_to_bytes(SAMPLE).unwrap();
    assert_eq!(page_count(&bytes), 1);
}

#[test]
fn test_long_document_spans_pages() {
    let engine = builtin_engine(RenderStyle::default());
    let markdown: String = (0..150)
        .map(|i| format!("Paragraph {} with some words to fill the line.\n", i))
        .collect();
    let rendered = engine.layout(&markdown);
    assert!(rendered.page_count() > 1);

    let bytes = engine.render_to_bytes(&markdown).unwrap();
    assert_eq!(page_count(&bytes), rendered.page_count());
}

#[test]
fn test_unterminated_fence_still_renders() {
    let engine = builtin_engine(RenderStyle::default());
    let rendered = engine.layout("text\n```\nlet a = 1;\nlet b = 2;");
    let fills = rendered
        .items()
        .filter(|i| matches!(i, DrawItem::FillRect { .. }))
        .count();
    assert_eq!(fills, 2);
}

#[test]
fn test_rtl_paragraph_reordered_and_right_aligned() {
    let style = RenderStyle::default();
    let engine = builtin_engine(style.clone());
    let rendered = engine.layout("שלום עולם");
    let texts: Vec<(f32, String)> = rendered
        .items()
        .filter_map(|i| match i {
            DrawItem::Text { x, text, .. } => Some((*x, text.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].0 > style.margins.left);
    #[cfg(feature = "bidi")]
    assert_ne!(texts[0].1, "שלום עולם");
}

#[test]
fn test_mixed_direction_document_to_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mixed.pdf");
    let engine = builtin_engine(RenderStyle::default());
    engine
        .render_to_file("# כותרת\n\nEnglish line\n\n- פריט\n> ציטוט", &path)
        .unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(page_count(&bytes), 1);
}

#[test]
fn test_page_size_from_configuration() {
    let config = parse_config_string("[page]\nsize = \"letter\"");
    assert_eq!(config.style.page_size, PageSize::Letter);
    let engine = builtin_engine(config.style);
    let rendered = engine.layout("hello");
    assert_eq!(rendered.width, 612.0);
    assert_eq!(rendered.height, 792.0);
}

#[test]
fn test_parse_into_file_with_embedded_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cfg.pdf");
    docmark::parse_into_file(
        "# Title\nBody",
        path.to_str().unwrap(),
        ConfigSource::Embedded("[text]\nsize = 12\n[fonts]\nbidi = false"),
    )
    .unwrap();
    assert!(path.exists());
}
