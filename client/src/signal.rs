use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

use sketchpad_shared::{
    SignalClientMessage, SignalEvent, SignalFeed, SignalServerMessage, SketchError,
};

use crate::util::now_ms;
use crate::ws::{connect_ws, WsEvent, WsSender};

const SIMULATED_DELAY_MS: i32 = 1200;

pub enum SignalUpdate {
    Connected,
    Disconnected,
    Received(SignalEvent),
    Rejected(String),
}

pub type UpdateHandler = Rc<dyn Fn(SignalUpdate)>;

/// Where "send a signal" goes. Either path reports back through the same
/// handler, after the freshness feed has filtered received signals.
pub enum SignalBackend {
    Relay(Rc<WsSender>),
    Simulated { window: Window, deliver: UpdateHandler },
}

fn feed_filtered(on_update: UpdateHandler) -> UpdateHandler {
    let feed = RefCell::new(SignalFeed::default());
    Rc::new(move |update: SignalUpdate| match update {
        SignalUpdate::Received(signal) => {
            let accepted = feed.borrow_mut().accept(signal, now_ms());
            if let Some(signal) = accepted {
                on_update(SignalUpdate::Received(signal));
            }
        }
        other => on_update(other),
    })
}

impl SignalBackend {
    pub fn connect(window: &Window, simulated: bool, on_update: UpdateHandler) -> Result<Self, JsValue> {
        let deliver = feed_filtered(on_update);
        if simulated {
            deliver(SignalUpdate::Connected);
            return Ok(SignalBackend::Simulated {
                window: window.clone(),
                deliver,
            });
        }
        let sender = connect_ws(window, move |event| match event {
            WsEvent::Open => deliver(SignalUpdate::Connected),
            WsEvent::Close | WsEvent::Error => deliver(SignalUpdate::Disconnected),
            WsEvent::Message(SignalServerMessage::Received { signal }) => {
                deliver(SignalUpdate::Received(signal))
            }
            WsEvent::Message(SignalServerMessage::Rejected { reason }) => {
                deliver(SignalUpdate::Rejected(reason))
            }
        })?;
        Ok(SignalBackend::Relay(sender))
    }

    pub fn label(&self) -> &'static str {
        match self {
            SignalBackend::Relay(_) => "relay",
            SignalBackend::Simulated { .. } => "simulation",
        }
    }

    pub fn send(&self, signal: SignalEvent) -> Result<(), SketchError> {
        match self {
            SignalBackend::Relay(sender) => sender.send(&SignalClientMessage::Send { signal }),
            SignalBackend::Simulated { window, deliver } => {
                let deliver = deliver.clone();
                let callback = Closure::once_into_js(move || {
                    deliver(SignalUpdate::Received(signal));
                });
                window
                    .set_timeout_with_callback_and_timeout_and_arguments_0(
                        callback.unchecked_ref(),
                        SIMULATED_DELAY_MS,
                    )
                    .map(|_| ())
                    .map_err(|error| SketchError::NotificationDeliveryFailed(format!("{error:?}")))
            }
        }
    }
}
