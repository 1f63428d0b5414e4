use js_sys::{Array, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, Document, HtmlAnchorElement, Url};

use sketchpad_shared::ExportArtifact;

/// Saves the artifact through a temporary object URL and anchor click.
pub fn download_artifact(document: &Document, artifact: &ExportArtifact) -> Result<(), JsValue> {
    let bytes = Uint8Array::from(artifact.bytes.as_slice());
    let blob = Blob::new_with_u8_array_sequence(&Array::of1(&bytes))?;
    let href = Url::create_object_url_with_blob(&blob)?;
    let anchor = document
        .create_element("a")?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| JsValue::from_str("Invalid anchor element"))?;
    anchor.set_href(&href);
    anchor.set_download(&artifact.file_name);
    anchor.set_type(ExportArtifact::MIME_TYPE);
    anchor.click();
    Url::revoke_object_url(&href)
}
