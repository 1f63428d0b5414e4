use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Document, Element, HtmlButtonElement, HtmlCanvasElement, HtmlInputElement, HtmlSpanElement,
    PointerEvent, TouchEvent,
};

use sketchpad_shared::{DisplayRect, ToolKind};

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

pub fn update_size_label(input: &HtmlInputElement, value: &HtmlSpanElement) {
    value.set_text_content(Some(&input.value()));
}

pub fn set_tool_button(button: &HtmlButtonElement, active: bool) {
    let pressed = if active { "true" } else { "false" };
    let _ = button.set_attribute("aria-pressed", pressed);
    let class_list = button.class_list();
    let _ = if active {
        class_list.add_1("active-tool")
    } else {
        class_list.remove_1("active-tool")
    };
}

pub fn sync_tool_buttons(buttons: &[(ToolKind, HtmlButtonElement)], active: ToolKind) {
    for (kind, button) in buttons {
        set_tool_button(button, *kind == active);
    }
}

pub fn set_status(status_el: &Element, state: &str, text: &str) {
    let _ = status_el.set_attribute("data-state", state);
    status_el.set_text_content(Some(text));
}

pub fn display_rect(canvas: &HtmlCanvasElement) -> DisplayRect {
    let rect = canvas.get_bounding_client_rect();
    DisplayRect::new(rect.left(), rect.top(), rect.width(), rect.height())
}

pub fn pointer_position(event: &PointerEvent) -> (f64, f64) {
    (event.client_x() as f64, event.client_y() as f64)
}

pub fn touch_positions(event: &TouchEvent) -> Vec<(f64, f64)> {
    let touches = event.touches();
    (0..touches.length())
        .filter_map(|index| touches.get(index))
        .map(|touch| (touch.client_x() as f64, touch.client_y() as f64))
        .collect()
}
