use std::cell::RefCell;

use gtk4::prelude::*;
use libadwaita::prelude::*;

use super::previews::TexturePreviews;
use super::rendered::fill_rendered;
use crate::session::{Notice, NoticeLevel, RecognitionMode, Session};

/// Handles returned from building the main window.
pub struct MainWindow {
    pub window: libadwaita::ApplicationWindow,
    pub toast_overlay: libadwaita::ToastOverlay,
    pub markdown_toggle: gtk4::ToggleButton,
    pub plain_toggle: gtk4::ToggleButton,
    pub drop_area: gtk4::Box,
    pub choose_button: gtk4::Button,
    pub remove_button: gtk4::Button,
    pub file_label: gtk4::Label,
    pub preview: gtk4::Picture,
    pub submit_button: gtk4::Button,
    pub spinner: gtk4::Spinner,
    pub copy_button: gtk4::Button,
    pub export_button: gtk4::Button,
    pub rendered_box: gtk4::Box,
    pub raw_view: gtk4::TextView,
    /// Raw text currently shown, so unchanged results are not rebuilt.
    shown_raw: RefCell<Option<String>>,
}

/// Build the main window. `mode` preselects one of the two mode toggles.
pub fn build_window(
    app: &libadwaita::Application,
    endpoint: &str,
    mode: RecognitionMode,
) -> MainWindow {
    let window = libadwaita::ApplicationWindow::builder()
        .application(app)
        .title("OCR Desk")
        .default_width(960)
        .default_height(680)
        .build();

    let toolbar_view = libadwaita::ToolbarView::new();
    let header = libadwaita::HeaderBar::new();
    let title = libadwaita::WindowTitle::new("OCR Desk", endpoint);
    header.set_title_widget(Some(&title));

    // --- Mode selector ---
    let markdown_toggle = gtk4::ToggleButton::with_label(RecognitionMode::Markdown.label());
    let plain_toggle = gtk4::ToggleButton::with_label(RecognitionMode::PlainText.label());
    plain_toggle.set_group(Some(&markdown_toggle));
    match mode {
        RecognitionMode::Markdown => markdown_toggle.set_active(true),
        RecognitionMode::PlainText => plain_toggle.set_active(true),
    }
    let mode_box = gtk4::Box::new(gtk4::Orientation::Horizontal, 0);
    mode_box.add_css_class("linked");
    mode_box.append(&markdown_toggle);
    mode_box.append(&plain_toggle);
    header.pack_start(&mode_box);

    toolbar_view.add_top_bar(&header);

    let paned = gtk4::Paned::new(gtk4::Orientation::Horizontal);
    paned.set_position(380);
    paned.set_shrink_start_child(false);
    paned.set_shrink_end_child(false);

    // --- Upload column ---
    let upload_column = gtk4::Box::new(gtk4::Orientation::Vertical, 12);
    upload_column.set_margin_start(16);
    upload_column.set_margin_end(16);
    upload_column.set_margin_top(12);
    upload_column.set_margin_bottom(12);

    let drop_area = gtk4::Box::new(gtk4::Orientation::Vertical, 8);
    drop_area.add_css_class("card");
    drop_area.set_vexpand(true);

    let preview = gtk4::Picture::new();
    preview.set_content_fit(gtk4::ContentFit::Contain);
    preview.set_can_shrink(true);
    preview.set_vexpand(true);
    preview.set_margin_start(8);
    preview.set_margin_end(8);
    preview.set_margin_top(8);

    let file_label = gtk4::Label::new(Some("Drop an image here or choose one"));
    file_label.add_css_class("dim-label");
    file_label.set_ellipsize(gtk4::pango::EllipsizeMode::Middle);
    file_label.set_margin_bottom(8);

    drop_area.append(&preview);
    drop_area.append(&file_label);
    upload_column.append(&drop_area);

    let file_buttons = gtk4::Box::new(gtk4::Orientation::Horizontal, 8);
    file_buttons.set_halign(gtk4::Align::Center);
    let choose_button = gtk4::Button::builder()
        .label("Choose Image…")
        .build();
    let remove_button = gtk4::Button::builder()
        .icon_name("user-trash-symbolic")
        .tooltip_text("Remove image")
        .build();
    file_buttons.append(&choose_button);
    file_buttons.append(&remove_button);
    upload_column.append(&file_buttons);

    let submit_row = gtk4::Box::new(gtk4::Orientation::Horizontal, 8);
    submit_row.set_halign(gtk4::Align::Center);
    let submit_button = gtk4::Button::builder()
        .label("Recognize")
        .build();
    submit_button.add_css_class("suggested-action");
    submit_button.add_css_class("pill");
    let spinner = gtk4::Spinner::new();
    submit_row.append(&submit_button);
    submit_row.append(&spinner);
    upload_column.append(&submit_row);

    paned.set_start_child(Some(&upload_column));

    // --- Result column ---
    let result_column = gtk4::Box::new(gtk4::Orientation::Vertical, 8);
    result_column.set_margin_start(16);
    result_column.set_margin_end(16);
    result_column.set_margin_top(12);
    result_column.set_margin_bottom(12);

    let result_stack = libadwaita::ViewStack::new();

    let rendered_box = gtk4::Box::new(gtk4::Orientation::Vertical, 4);
    rendered_box.set_margin_start(8);
    rendered_box.set_margin_end(8);
    let rendered_scroll = gtk4::ScrolledWindow::builder()
        .hscrollbar_policy(gtk4::PolicyType::Never)
        .vexpand(true)
        .child(&rendered_box)
        .build();
    result_stack.add_titled(&rendered_scroll, Some("rendered"), "Rendered");

    let raw_view = gtk4::TextView::new();
    raw_view.set_editable(false);
    raw_view.set_monospace(true);
    raw_view.set_wrap_mode(gtk4::WrapMode::WordChar);
    let raw_scroll = gtk4::ScrolledWindow::builder()
        .vexpand(true)
        .child(&raw_view)
        .build();
    result_stack.add_titled(&raw_scroll, Some("raw"), "Raw");

    let switcher = libadwaita::ViewSwitcher::builder()
        .stack(&result_stack)
        .policy(libadwaita::ViewSwitcherPolicy::Wide)
        .build();

    let result_header = gtk4::Box::new(gtk4::Orientation::Horizontal, 8);
    switcher.set_hexpand(true);
    switcher.set_halign(gtk4::Align::Start);
    result_header.append(&switcher);

    let copy_button = gtk4::Button::builder()
        .icon_name("edit-copy-symbolic")
        .tooltip_text("Copy raw text")
        .build();
    let export_button = gtk4::Button::builder()
        .icon_name("document-save-symbolic")
        .tooltip_text("Save to output folder")
        .build();
    result_header.append(&copy_button);
    result_header.append(&export_button);

    result_column.append(&result_header);
    result_column.append(&result_stack);
    paned.set_end_child(Some(&result_column));

    // Assemble
    let toast_overlay = libadwaita::ToastOverlay::new();
    toast_overlay.set_child(Some(&paned));
    toolbar_view.set_content(Some(&toast_overlay));
    window.set_content(Some(&toolbar_view));

    MainWindow {
        window,
        toast_overlay,
        markdown_toggle,
        plain_toggle,
        drop_area,
        choose_button,
        remove_button,
        file_label,
        preview,
        submit_button,
        spinner,
        copy_button,
        export_button,
        rendered_box,
        raw_view,
        shown_raw: RefCell::new(None),
    }
}

/// Bring every widget in line with the session. Called after each state change.
pub fn sync(widgets: &MainWindow, session: &Session<TexturePreviews>) {
    let selected = session.selected();
    match selected {
        Some(file) => {
            widgets.file_label.set_text(&file.name);
            let texture = file
                .preview
                .and_then(|handle| session.previews().texture(handle));
            widgets.preview.set_paintable(texture);
        }
        None => {
            widgets.file_label.set_text("Drop an image here or choose one");
            widgets.preview.set_paintable(None::<&gtk4::gdk::Paintable>);
        }
    }
    widgets.remove_button.set_sensitive(selected.is_some());

    let in_flight = session.is_in_flight();
    widgets.submit_button.set_sensitive(!in_flight);
    widgets.spinner.set_spinning(in_flight);
    widgets
        .submit_button
        .set_label(if in_flight { "Recognizing…" } else { "Recognize" });

    let result = session.result();
    widgets.copy_button.set_sensitive(!result.is_empty());
    widgets.export_button.set_sensitive(!result.is_empty());

    let mut shown = widgets.shown_raw.borrow_mut();
    if shown.as_deref() != Some(result.raw()) {
        fill_rendered(&widgets.rendered_box, result.rendered());
        widgets.raw_view.buffer().set_text(result.raw());
        *shown = Some(result.raw().to_string());
    }
}

/// Show a notice as a toast. Errors stay up longer.
pub fn show_notice(widgets: &MainWindow, notice: &Notice) {
    let toast = libadwaita::Toast::new(&notice.message);
    match notice.level {
        NoticeLevel::Success => toast.set_timeout(2),
        NoticeLevel::Warning => toast.set_timeout(3),
        NoticeLevel::Error => {
            toast.set_timeout(6);
            toast.set_priority(libadwaita::ToastPriority::High);
        }
    }
    widgets.toast_overlay.add_toast(toast);
}
