use gtk4::prelude::*;

use crate::render::{Block, BlockKind};

/// Replace the children of `container` with one widget per block.
pub fn fill_rendered(container: &gtk4::Box, blocks: &[Block]) {
    while let Some(child) = container.first_child() {
        container.remove(&child);
    }
    for block in blocks {
        container.append(&block_widget(block));
    }
}

fn block_widget(block: &Block) -> gtk4::Widget {
    if block.kind == BlockKind::Rule {
        let separator = gtk4::Separator::new(gtk4::Orientation::Horizontal);
        separator.set_margin_top(6);
        separator.set_margin_bottom(6);
        return separator.upcast();
    }

    let markup = match &block.kind {
        BlockKind::ListItem { marker, .. } => format!("{marker} {}", block.markup),
        _ => block.markup.clone(),
    };

    let label = gtk4::Label::new(None);
    set_markup_or_text(&label, &markup);
    label.set_wrap(true);
    label.set_wrap_mode(gtk4::pango::WrapMode::WordChar);
    label.set_xalign(0.0);
    label.set_selectable(true);
    label.set_margin_top(2);
    label.set_margin_bottom(2);

    match &block.kind {
        BlockKind::Heading(level) => {
            label.add_css_class(match level {
                1 => "title-1",
                2 => "title-2",
                3 => "title-3",
                _ => "title-4",
            });
            label.set_margin_top(8);
        }
        BlockKind::Paragraph => {}
        BlockKind::ListItem { depth, .. } => {
            label.set_margin_start(12 * (*depth as i32 + 1));
        }
        BlockKind::CodeBlock => {
            label.add_css_class("monospace");
            label.add_css_class("card");
            label.set_margin_top(4);
            label.set_margin_bottom(4);
        }
        BlockKind::Quote => {
            label.add_css_class("dim-label");
            label.set_margin_start(16);
        }
        BlockKind::TableRow { header } => {
            label.add_css_class("monospace");
            if *header {
                label.add_css_class("heading");
            }
        }
        BlockKind::Rule => {}
    }

    label.upcast()
}

/// Pango drops the whole label on invalid markup, so fall back to plain text.
fn set_markup_or_text(label: &gtk4::Label, markup: &str) {
    if gtk4::pango::parse_markup(markup, '\0').is_ok() {
        label.set_markup(markup);
    } else {
        log::warn!("Rendering block as plain text after markup error");
        label.set_text(markup);
    }
}
