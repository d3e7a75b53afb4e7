use gtk4::prelude::*;
use gtk4::{gdk, gio, glib};

/// Name and bytes of a file the user picked, or a message explaining why it
/// could not be read.
pub type LoadedFile = Result<(String, Vec<u8>), String>;

/// Show an "open image" dialog. `on_loaded` runs on the GTK main thread once
/// the chosen file has been read; it is not called if the dialog is dismissed.
pub fn choose_image<F>(parent: &libadwaita::ApplicationWindow, on_loaded: F)
where
    F: FnOnce(LoadedFile) + 'static,
{
    let filter = gtk4::FileFilter::new();
    filter.set_name(Some("Images"));
    filter.add_mime_type("image/*");
    filter.add_pixbuf_formats();

    let filters = gio::ListStore::new::<gtk4::FileFilter>();
    filters.append(&filter);

    let dialog = gtk4::FileDialog::builder()
        .title("Choose an Image")
        .modal(true)
        .filters(&filters)
        .default_filter(&filter)
        .build();

    dialog.open(Some(parent), None::<&gio::Cancellable>, move |result| match result {
        Ok(file) => load_file(file, on_loaded),
        Err(e) if e.matches(gtk4::DialogError::Dismissed) => {
            log::debug!("File dialog dismissed");
        }
        Err(e) => on_loaded(Err(format!("Could not open file: {e}"))),
    });
}

/// Accept image files dropped onto `widget`.
pub fn accept_drops<F>(widget: &impl IsA<gtk4::Widget>, on_loaded: F)
where
    F: Fn(LoadedFile) + Clone + 'static,
{
    let target = gtk4::DropTarget::new(gio::File::static_type(), gdk::DragAction::COPY);
    target.connect_drop(move |_, value, _, _| match value.get::<gio::File>() {
        Ok(file) => {
            load_file(file, on_loaded.clone());
            true
        }
        Err(_) => false,
    });
    widget.add_controller(target);
}

/// Read the whole file asynchronously and hand it to `on_loaded`.
fn load_file<F>(file: gio::File, on_loaded: F)
where
    F: FnOnce(LoadedFile) + 'static,
{
    let name = file
        .basename()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    glib::spawn_future_local(async move {
        match file.load_contents_future().await {
            Ok((contents, _etag)) => on_loaded(Ok((name, contents.to_vec()))),
            Err(e) => on_loaded(Err(format!("Could not read {name}: {e}"))),
        }
    });
}
