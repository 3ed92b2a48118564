use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::{Function, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// Browser speech recognition wired to a transcript callback.
///
/// Handlers are attached once at construction; `start` and `abort` only
/// drive the engine, so repeated use never stacks listeners.
struct SpeechRecognizer {
    recognition: JsValue,
    state: Rc<RecognizerState>,
    _on_result: Closure<dyn Fn(JsValue)>,
    _on_end: Closure<dyn Fn()>,
    _on_error: Closure<dyn Fn(JsValue)>,
}

#[derive(Default)]
struct RecognizerState {
    active: Cell<bool>,
    restart_pending: Cell<bool>,
}

/// Resolved once at startup.
enum VoiceCapability {
    Supported(SpeechRecognizer),
    Unsupported,
}

thread_local! {
    static VOICE: RefCell<Option<VoiceCapability>> = const { RefCell::new(None) };
}

fn call_method(target: &JsValue, name: &str) -> Result<(), JsValue> {
    let method = Reflect::get(target, &JsValue::from_str(name))?.dyn_into::<Function>()?;
    method.call0(target)?;
    Ok(())
}

fn recognition_constructor() -> Option<Function> {
    let window = web_sys::window()?;
    ["SpeechRecognition", "webkitSpeechRecognition"]
        .into_iter()
        .find_map(|name| {
            Reflect::get(window.as_ref(), &JsValue::from_str(name))
                .ok()
                .and_then(|ctor| ctor.dyn_into::<Function>().ok())
        })
}

/// `event.results[0][0].transcript`
fn transcript_from_event(event: &JsValue) -> Option<String> {
    let results = Reflect::get(event, &JsValue::from_str("results")).ok()?;
    let first = Reflect::get_u32(&results, 0).ok()?;
    let alternative = Reflect::get_u32(&first, 0).ok()?;
    let transcript = Reflect::get(&alternative, &JsValue::from_str("transcript"))
        .ok()?
        .as_string()?;
    let transcript = transcript.trim();
    (!transcript.is_empty()).then(|| transcript.to_string())
}

impl SpeechRecognizer {
    fn new(
        ctor: &Function,
        locale: &str,
        on_transcript: Rc<dyn Fn(String)>,
    ) -> Result<Self, JsValue> {
        let recognition = Reflect::construct(ctor, &js_sys::Array::new())?;
        Reflect::set(&recognition, &"lang".into(), &JsValue::from_str(locale))?;
        Reflect::set(&recognition, &"interimResults".into(), &JsValue::FALSE)?;
        Reflect::set(&recognition, &"continuous".into(), &JsValue::FALSE)?;
        Reflect::set(&recognition, &"maxAlternatives".into(), &JsValue::from(1))?;

        let state = Rc::new(RecognizerState::default());

        let on_result = Closure::<dyn Fn(JsValue)>::new(move |event: JsValue| {
            if let Some(transcript) = transcript_from_event(&event) {
                on_transcript(transcript);
            }
        });

        let end_state = state.clone();
        let end_target = recognition.clone();
        let on_end = Closure::<dyn Fn()>::new(move || {
            end_state.active.set(false);
            if end_state.restart_pending.replace(false) {
                match call_method(&end_target, "start") {
                    Ok(()) => end_state.active.set(true),
                    Err(e) => {
                        web_sys::console::warn_1(&format!("Voice restart failed: {e:?}").into())
                    }
                }
            } else {
                web_sys::console::info_1(&"Voice recognition ended.".into());
            }
        });

        let on_error = Closure::<dyn Fn(JsValue)>::new(move |event: JsValue| {
            let code = Reflect::get(&event, &JsValue::from_str("error"))
                .ok()
                .and_then(|e| e.as_string())
                .unwrap_or_default();
            web_sys::console::warn_1(&format!("Voice recognition error: {code}").into());
        });

        Reflect::set(&recognition, &"onresult".into(), on_result.as_ref())?;
        Reflect::set(&recognition, &"onend".into(), on_end.as_ref())?;
        Reflect::set(&recognition, &"onerror".into(), on_error.as_ref())?;

        Ok(Self {
            recognition,
            state,
            _on_result: on_result,
            _on_end: on_end,
            _on_error: on_error,
        })
    }

    /// Begin listening. An active session is aborted first and the new one
    /// starts once the engine reports `end`.
    fn start(&self) {
        if self.state.active.get() {
            self.state.restart_pending.set(true);
            if let Err(e) = call_method(&self.recognition, "abort") {
                web_sys::console::warn_1(&format!("Voice abort failed: {e:?}").into());
            }
            return;
        }
        match call_method(&self.recognition, "start") {
            Ok(()) => {
                self.state.active.set(true);
                web_sys::console::info_1(&"Voice recognition started.".into());
            }
            Err(e) => web_sys::console::warn_1(&format!("Voice start failed: {e:?}").into()),
        }
    }

    fn shutdown(&self) {
        self.state.restart_pending.set(false);
        if self.state.active.replace(false) {
            call_method(&self.recognition, "abort").ok();
        }
        for handler in ["onresult", "onend", "onerror"] {
            Reflect::set(&self.recognition, &handler.into(), &JsValue::NULL).ok();
        }
    }
}

/// Resolve speech support and install the recognizer. Returns whether voice
/// input is available; when it is not, callers hide the trigger.
pub fn install(locale: &str, on_transcript: impl Fn(String) + 'static) -> bool {
    let capability = match recognition_constructor() {
        Some(ctor) => match SpeechRecognizer::new(&ctor, locale, Rc::new(on_transcript)) {
            Ok(recognizer) => VoiceCapability::Supported(recognizer),
            Err(e) => {
                web_sys::console::warn_1(
                    &format!("Speech recognition init failed: {e:?}").into(),
                );
                VoiceCapability::Unsupported
            }
        },
        None => {
            web_sys::console::info_1(&"Speech recognition is not supported.".into());
            VoiceCapability::Unsupported
        }
    };
    let supported = matches!(capability, VoiceCapability::Supported(_));
    VOICE.with(|slot| {
        if let Some(VoiceCapability::Supported(old)) = slot.borrow_mut().replace(capability) {
            old.shutdown();
        }
    });
    supported
}

/// Start (or restart) dictation. No-op without support.
pub fn start() {
    VOICE.with(|slot| {
        if let Some(VoiceCapability::Supported(recognizer)) = slot.borrow().as_ref() {
            recognizer.start();
        }
    });
}

pub fn teardown() {
    VOICE.with(|slot| {
        if let Some(VoiceCapability::Supported(recognizer)) = slot.borrow_mut().take() {
            recognizer.shutdown();
        }
    });
}
