use std::fmt::Write as _;
use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use menu_toolkit::{Document, DomEvent, Menu, MenuConfig, visible_rows};

// `branches` parents, each with `leaves` links and one nested parent.
fn markup(branches: usize, leaves: usize) -> String {
    let mut html = String::from(r#"<ul id="menu">"#);
    for b in 0..branches {
        let _ = write!(html, r##"<li class="menu-item-has-children"><a href="#">Branch {b}</a><ul>"##);
        for l in 0..leaves {
            let _ = write!(html, r#"<li><a href="/{b}/{l}">Leaf {l}</a></li>"#);
        }
        let _ = write!(
            html,
            r#"<li class="menu-item-has-children"><a href="/{b}/more">More</a><ul><li><a href="/{b}/more/x">X</a></li></ul></li>"#
        );
        html.push_str("</ul></li>");
    }
    html.push_str("</ul>");
    html
}

fn bench_create(c: &mut Criterion) {
    let html = markup(200, 10);
    c.bench_function("create_400_toggles", |b| {
        b.iter(|| {
            let mut doc = Document::parse(&html).unwrap();
            let root = doc.element_by_id("menu").unwrap();
            let menu = Menu::create(&mut doc, root, MenuConfig::default()).unwrap();
            black_box(menu.is_some());
        });
    });
}

fn bench_toggle(c: &mut Criterion) {
    let html = markup(200, 10);
    let mut doc = Document::parse(&html).unwrap();
    let root = doc.element_by_id("menu").unwrap();
    let mut menu = Menu::create(&mut doc, root, MenuConfig::default())
        .unwrap()
        .unwrap();
    let toggles: Vec<_> = visible_rows(&doc, &menu)
        .iter()
        .filter_map(|row| row.toggle)
        .collect();

    c.bench_function("toggle_click_all_branches", |b| {
        b.iter(|| {
            for &toggle in &toggles {
                black_box(menu.handle_event(&mut doc, &DomEvent::click(toggle)));
            }
        });
    });
}

criterion_group!(perf, bench_create, bench_toggle);
criterion_main!(perf);
