use wasm_bindgen::{Clamped, JsValue};
use web_sys::ImageData;

use sketchpad_shared::StrokeSurface;

use crate::state::State;

/// Copies the raster surface onto the on-screen canvas. The canvas backing
/// store has the surface's resolution, so this is a 1:1 blit; CSS handles
/// the on-screen scaling.
pub fn present(state: &State) -> Result<(), JsValue> {
    let surface = state.session.surface();
    let (width, height) = surface.size();
    let pixels = surface.to_rgba_bytes();
    let image = ImageData::new_with_u8_clamped_array_and_sh(Clamped(&pixels), width, height)?;
    state.ctx.put_image_data(&image, 0.0, 0.0)
}
