use std::collections::HashMap;

use gtk4::{gdk, glib};

use crate::session::{PreviewHandle, PreviewStore};

/// Preview textures decoded from the selected image, keyed by handle.
/// Releasing a handle drops the texture.
#[derive(Default)]
pub struct TexturePreviews {
    next: u64,
    textures: HashMap<PreviewHandle, gdk::Texture>,
}

impl TexturePreviews {
    pub fn texture(&self, handle: PreviewHandle) -> Option<&gdk::Texture> {
        self.textures.get(&handle)
    }
}

impl PreviewStore for TexturePreviews {
    fn allocate(&mut self, name: &str, content: &[u8]) -> Option<PreviewHandle> {
        let bytes = glib::Bytes::from_owned(content.to_vec());
        match gdk::Texture::from_bytes(&bytes) {
            Ok(texture) => {
                self.next += 1;
                let handle = PreviewHandle(self.next);
                self.textures.insert(handle, texture);
                Some(handle)
            }
            Err(e) => {
                log::warn!("Cannot decode preview for {name}: {e}");
                None
            }
        }
    }

    fn release(&mut self, handle: PreviewHandle) {
        if self.textures.remove(&handle).is_none() {
            log::warn!("Preview {handle:?} was already released");
        }
    }
}
