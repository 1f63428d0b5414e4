use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Event, HtmlButtonElement, HtmlCanvasElement, HtmlInputElement,
    HtmlSpanElement, PointerEvent, TouchEvent,
};

use sketchpad_shared::signal::DEFAULT_MESSAGE;
use sketchpad_shared::{
    DrawingSession, PointerInput, SessionConfig, SignalEvent, SketchError, ToolKind,
};

use crate::dom::{
    display_rect, get_element, pointer_position, set_status, sync_tool_buttons,
    touch_positions, update_size_label,
};
use crate::download::download_artifact;
use crate::net::query_flag;
use crate::render::present;
use crate::signal::{SignalBackend, SignalUpdate};
use crate::state::{State, EXPORT_PREFIX};
use crate::util::{make_sender_name, now_ms};

#[derive(Clone, Copy)]
enum Phase {
    Down,
    Move,
}

fn debug_enabled(window: &web_sys::Window) -> bool {
    query_flag(window, "debug", "1") || query_flag(window, "debug", "true")
}

fn document_ready_state(document: &web_sys::Document) -> Option<String> {
    Reflect::get(document.as_ref(), &JsValue::from_str("readyState"))
        .ok()?
        .as_string()
}

fn to_js(error: SketchError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn is_touch_pointer(event: &PointerEvent) -> bool {
    event.pointer_type() == "touch"
}

fn handle_input(state: &Rc<RefCell<State>>, phase: Phase, input: PointerInput<'_>) {
    let mut state = state.borrow_mut();
    let rect = display_rect(&state.canvas);
    match phase {
        Phase::Down => {
            state.session.pointer_down(input, rect);
        }
        Phase::Move => {
            if state.session.pointer_move(input, rect) {
                if let Err(err) = present(&state) {
                    web_sys::console::error_1(&err);
                }
            }
        }
    }
}

fn end_stroke(state: &Rc<RefCell<State>>) {
    state.borrow_mut().session.pointer_up();
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let started = Rc::new(Cell::new(false));

    if document_ready_state(&document).as_deref() == Some("complete") {
        started.set(true);
        return start_app();
    }

    let onload_started = started.clone();
    let onload = Closure::<dyn FnMut(Event)>::new(move |_| {
        if onload_started.replace(true) {
            return;
        }
        if let Err(err) = start_app() {
            web_sys::console::error_1(&err);
        }
    });
    window.add_event_listener_with_callback("load", onload.as_ref().unchecked_ref())?;
    onload.forget();

    Ok(())
}

fn start_app() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let debug = debug_enabled(&window);

    let canvas: HtmlCanvasElement = get_element(&document, "drawingCanvas")?;
    let color_input: HtmlInputElement = get_element(&document, "colorPicker")?;
    let size_input: HtmlInputElement = get_element(&document, "brushSize")?;
    let size_value: HtmlSpanElement = get_element(&document, "sizeValue")?;
    let clear_button: HtmlButtonElement = get_element(&document, "clearBtn")?;
    let save_button: HtmlButtonElement = get_element(&document, "saveBtn")?;
    let signal_button: HtmlButtonElement = get_element(&document, "signalBtn")?;
    let signal_status = document
        .get_element_by_id("signalStatus")
        .ok_or_else(|| JsValue::from_str("Missing signal status element"))?;
    let tool_buttons: Rc<Vec<(ToolKind, HtmlButtonElement)>> = Rc::new(
        ToolKind::ALL
            .into_iter()
            .map(|kind| {
                get_element::<HtmlButtonElement>(&document, &format!("{}Btn", kind.name()))
                    .map(|button| (kind, button))
            })
            .collect::<Result<_, _>>()?,
    );

    let config = SessionConfig::default();
    canvas.set_width(config.surface_width);
    canvas.set_height(config.surface_height);
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Missing canvas context"))?
        .dyn_into::<CanvasRenderingContext2d>()?;

    let mut session = DrawingSession::with_raster(&config).map_err(to_js)?;
    if let Err(error) = session.set_color(&color_input.value()) {
        web_sys::console::warn_1(&format!("Ignoring initial color: {error}").into());
        color_input.set_value(&config.color.to_hex());
    }
    session.set_size(size_input.value_as_number() as f32);
    if debug {
        web_sys::console::log_1(
            &format!(
                "Sketchpad surface={}x{} tool={} style={:?}",
                config.surface_width,
                config.surface_height,
                session.tool(),
                session.style()
            )
            .into(),
        );
    }

    let state = Rc::new(RefCell::new(State {
        canvas: canvas.clone(),
        ctx,
        session,
    }));

    update_size_label(&size_input, &size_value);
    sync_tool_buttons(&tool_buttons, state.borrow().session.tool());
    present(&state.borrow())?;

    for (kind, button) in tool_buttons.iter() {
        let kind = *kind;
        let tool_state = state.clone();
        let buttons = tool_buttons.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            tool_state.borrow_mut().session.select_tool(kind);
            sync_tool_buttons(&buttons, kind);
            if debug {
                web_sys::console::log_1(&format!("tool -> {kind}").into());
            }
        });
        button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let color_state = state.clone();
        let color_input_cb = color_input.clone();
        let oninput = Closure::<dyn FnMut(Event)>::new(move |_| {
            if let Err(error) = color_state
                .borrow_mut()
                .session
                .set_color(&color_input_cb.value())
            {
                web_sys::console::warn_1(&error.to_string().into());
            }
        });
        color_input.add_event_listener_with_callback("input", oninput.as_ref().unchecked_ref())?;
        oninput.forget();
    }

    {
        let size_state = state.clone();
        let size_input_cb = size_input.clone();
        let oninput = Closure::<dyn FnMut(Event)>::new(move |_| {
            size_state
                .borrow_mut()
                .session
                .set_size(size_input_cb.value_as_number() as f32);
            update_size_label(&size_input_cb, &size_value);
        });
        size_input.add_event_listener_with_callback("input", oninput.as_ref().unchecked_ref())?;
        oninput.forget();
    }

    {
        let clear_state = state.clone();
        let buttons = tool_buttons.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let mut state = clear_state.borrow_mut();
            state.session.clear();
            sync_tool_buttons(&buttons, state.session.tool());
            if let Err(err) = present(&state) {
                web_sys::console::error_1(&err);
            }
        });
        clear_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let save_state = state.clone();
        let document = document.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let artifact = match save_state.borrow().session.export(EXPORT_PREFIX, now_ms()) {
                Ok(artifact) => artifact,
                Err(error) => {
                    web_sys::console::error_1(&error.to_string().into());
                    return;
                }
            };
            if debug {
                web_sys::console::log_1(
                    &format!("export {} bytes={}", artifact.file_name, artifact.bytes.len()).into(),
                );
            }
            if let Err(err) = download_artifact(&document, &artifact) {
                web_sys::console::error_1(&err);
            }
        });
        save_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let down_state = state.clone();
        let ondown = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if is_touch_pointer(&event) {
                return;
            }
            let (x, y) = pointer_position(&event);
            handle_input(&down_state, Phase::Down, PointerInput::Pointer { x, y });
        });
        canvas.add_event_listener_with_callback("pointerdown", ondown.as_ref().unchecked_ref())?;
        ondown.forget();
    }

    {
        let move_state = state.clone();
        let onmove = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if is_touch_pointer(&event) {
                return;
            }
            let (x, y) = pointer_position(&event);
            handle_input(&move_state, Phase::Move, PointerInput::Pointer { x, y });
        });
        canvas.add_event_listener_with_callback("pointermove", onmove.as_ref().unchecked_ref())?;
        onmove.forget();
    }

    {
        let stop_state = state.clone();
        let onstop = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if is_touch_pointer(&event) {
                return;
            }
            end_stroke(&stop_state);
        });
        canvas.add_event_listener_with_callback("pointerup", onstop.as_ref().unchecked_ref())?;
        canvas
            .add_event_listener_with_callback("pointercancel", onstop.as_ref().unchecked_ref())?;
        canvas.add_event_listener_with_callback("pointerleave", onstop.as_ref().unchecked_ref())?;
        onstop.forget();
    }

    {
        let touch_state = state.clone();
        let ontouch = Closure::<dyn FnMut(TouchEvent)>::new(move |event: TouchEvent| {
            event.prevent_default();
            let touches = touch_positions(&event);
            match event.type_().as_str() {
                "touchstart" => {
                    handle_input(&touch_state, Phase::Down, PointerInput::Touch(&touches))
                }
                "touchmove" => {
                    handle_input(&touch_state, Phase::Move, PointerInput::Touch(&touches))
                }
                _ => end_stroke(&touch_state),
            }
        });
        for name in ["touchstart", "touchmove", "touchend", "touchcancel"] {
            canvas.add_event_listener_with_callback(name, ontouch.as_ref().unchecked_ref())?;
        }
        ontouch.forget();
    }

    let simulated = query_flag(&window, "signal", "sim");
    let status_cb = signal_status.clone();
    let backend = SignalBackend::connect(
        &window,
        simulated,
        Rc::new(move |update: SignalUpdate| match update {
            SignalUpdate::Connected => set_status(&status_cb, "connected", "Ready to send a signal"),
            SignalUpdate::Disconnected => {
                set_status(&status_cb, "offline", "Signal relay unavailable")
            }
            SignalUpdate::Received(signal) => set_status(
                &status_cb,
                "received",
                &format!("{} from {}", signal.message, signal.sender),
            ),
            SignalUpdate::Rejected(reason) => set_status(&status_cb, "error", &reason),
        }),
    )?;
    web_sys::console::log_1(&format!("Signal backend: {}", backend.label()).into());

    {
        let sender_name = make_sender_name();
        let status_el = signal_status.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let signal = SignalEvent::new(sender_name.clone(), DEFAULT_MESSAGE, now_ms());
            match backend.send(signal) {
                Ok(()) => set_status(&status_el, "sent", "Signal sent"),
                Err(error) => {
                    web_sys::console::warn_1(&error.to_string().into());
                    set_status(&status_el, "error", "Could not send the signal, try again");
                }
            }
        });
        signal_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    Ok(())
}
