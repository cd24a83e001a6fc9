use crate::browser::load_image;
use crate::config::STATUS_CLEAR_MS;
use gloo_timers::callback::Timeout;
use log::info;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlImageElement;
use yew::prelude::*;

/// A transient status line and the callbacks that drive it.
#[derive(Clone, PartialEq)]
pub struct StatusMessage {
    /// Text currently shown, if any.
    pub text: Option<String>,
    /// Show a message; it clears itself after `STATUS_CLEAR_MS`.
    pub show: Callback<String>,
    /// Clear the message immediately.
    pub clear: Callback<()>,
}

/// Custom hook for a status message that clears itself after a delay.
#[hook]
pub fn use_status_message() -> StatusMessage {
    let text = use_state(|| None::<String>);
    // Replacing the handle drops (and so cancels) a pending clear.
    let timer = use_mut_ref(|| None::<Timeout>);

    let clear = {
        let text = text.clone();
        let timer = timer.clone();
        Callback::from(move |_: ()| {
            timer.borrow_mut().take();
            text.set(None);
        })
    };

    let show = {
        let text = text.clone();
        let timer = timer.clone();
        Callback::from(move |message: String| {
            info!("Status: {}", message);
            text.set(Some(message));
            let text = text.clone();
            let handle = Timeout::new(STATUS_CLEAR_MS, move || text.set(None));
            *timer.borrow_mut() = Some(handle);
        })
    };

    StatusMessage {
        text: (*text).clone(),
        show,
        clear,
    }
}

/// Loading state of an image that canvases depend on.
#[derive(Clone, PartialEq)]
pub enum ImageLoad {
    Idle,
    Loading,
    Ready(Rc<HtmlImageElement>),
    Failed(String),
}

impl ImageLoad {
    pub fn image(&self) -> Option<&HtmlImageElement> {
        match self {
            ImageLoad::Ready(image) => Some(image.as_ref()),
            _ => None,
        }
    }
}

/// Custom hook that loads `src` whenever it changes.
///
/// A load that finishes after `src` changed again is discarded.
#[hook]
pub fn use_loaded_image(src: Option<String>) -> ImageLoad {
    let state = use_state(|| ImageLoad::Idle);
    let generation = use_mut_ref(|| 0u32);

    {
        let state = state.clone();
        let generation = generation.clone();
        use_effect_with(src, move |src| {
            *generation.borrow_mut() += 1;
            let current = *generation.borrow();
            match src.clone() {
                None => state.set(ImageLoad::Idle),
                Some(src) => {
                    state.set(ImageLoad::Loading);
                    spawn_local(async move {
                        let result = load_image(&src).await;
                        if *generation.borrow() != current {
                            return;
                        }
                        match result {
                            Ok(image) => state.set(ImageLoad::Ready(Rc::new(image))),
                            Err(e) => state.set(ImageLoad::Failed(e.to_string())),
                        }
                    });
                }
            }
            || ()
        });
    }

    (*state).clone()
}
