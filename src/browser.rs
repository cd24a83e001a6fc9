//! Thin glue over browser APIs: dialogs, downloads, image loading, pointer coordinates.

use crate::interaction::{Decision, DecisionProvider};
use crate::palette::{palette_hint, CatalogColor};
use crate::utils::parse_catalog_color;
use crate::{CanvasSize, ClientError, PieceId, Point};
use futures::channel::oneshot;
use gloo_utils::{document, window};
use log::{debug, warn};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlAnchorElement, HtmlCanvasElement, HtmlImageElement, MouseEvent};

pub fn alert(message: &str) {
    if let Err(e) = window().alert_with_message(message) {
        warn!("alert failed: {:?}", e);
    }
}

fn confirm(message: &str) -> Decision<()> {
    match window().confirm_with_message(message) {
        Ok(true) => Decision::Accept(()),
        Ok(false) => Decision::Decline,
        Err(e) => {
            warn!("confirm failed: {:?}", e);
            Decision::Decline
        }
    }
}

/// Native `confirm`/`prompt` dialogs.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserDialogs;

impl DecisionProvider for BrowserDialogs {
    fn confirm_rotation(&mut self, piece_id: PieceId) -> Decision<()> {
        confirm(&format!("Rotate piece {} by 90°?", piece_id))
    }

    fn confirm_removal(&mut self, piece_id: PieceId) -> Decision<()> {
        confirm(&format!("Remove piece {}?", piece_id))
    }

    fn choose_color(&mut self, piece_id: PieceId, current: &str) -> Decision<CatalogColor> {
        let message = format!(
            "New colour for piece {} (currently {}).\nAvailable: {}",
            piece_id,
            current,
            palette_hint()
        );
        let answer = match window().prompt_with_message_and_default(&message, current) {
            Ok(Some(answer)) => answer,
            Ok(None) => return Decision::Decline,
            Err(e) => {
                warn!("prompt failed: {:?}", e);
                return Decision::Decline;
            }
        };
        match parse_catalog_color(&answer) {
            Ok(color) => Decision::Accept(color),
            Err(message) => {
                alert(&message);
                Decision::Decline
            }
        }
    }
}

/// Start a browser download of `href` via a temporary anchor.
pub fn trigger_download(href: &str, filename: &str) -> Result<(), JsValue> {
    let doc = document();
    let anchor: HtmlAnchorElement = doc.create_element("a")?.dyn_into()?;
    anchor.set_href(href);
    anchor.set_download(filename);
    let body = doc
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;
    body.append_child(&anchor)?;
    anchor.click();
    body.remove_child(&anchor)?;
    debug!("Download of {} started", filename);
    Ok(())
}

/// Load an image and resolve once it has either loaded or failed.
pub async fn load_image(src: &str) -> Result<HtmlImageElement, ClientError> {
    let image = HtmlImageElement::new()
        .map_err(|e| ClientError::ResourceLoad(format!("{} ({:?})", src, e)))?;
    let (tx, rx) = oneshot::channel::<bool>();
    let tx = Rc::new(RefCell::new(Some(tx)));

    let on_load = {
        let tx = tx.clone();
        Closure::once(move || {
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(true);
            }
        })
    };
    let on_error = Closure::once(move || {
        if let Some(tx) = tx.borrow_mut().take() {
            let _ = tx.send(false);
        }
    });
    image.set_onload(Some(on_load.as_ref().unchecked_ref()));
    image.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    image.set_src(src);

    let loaded = rx.await.unwrap_or(false);
    image.set_onload(None);
    image.set_onerror(None);
    if loaded {
        debug!(
            "Loaded {} ({}x{})",
            src,
            image.natural_width(),
            image.natural_height()
        );
        Ok(image)
    } else {
        warn!("Image {} failed to load", src);
        Err(ClientError::ResourceLoad(src.to_string()))
    }
}

pub fn image_size(image: &HtmlImageElement) -> CanvasSize {
    CanvasSize {
        width: f64::from(image.natural_width()),
        height: f64::from(image.natural_height()),
    }
}

/// Map a client-space position onto canvas pixels, undoing CSS scaling.
pub fn client_to_canvas(
    client: Point,
    rect_origin: Point,
    rect_size: CanvasSize,
    canvas: CanvasSize,
) -> Point {
    let scale_x = if rect_size.width > 0.0 {
        canvas.width / rect_size.width
    } else {
        1.0
    };
    let scale_y = if rect_size.height > 0.0 {
        canvas.height / rect_size.height
    } else {
        1.0
    };
    let local = client - rect_origin;
    Point::new(local.x * scale_x, local.y * scale_y)
}

/// Pointer position of a mouse event in the canvas's pixel space.
pub fn canvas_point(event: &MouseEvent, canvas: &HtmlCanvasElement) -> Point {
    let rect = canvas.get_bounding_client_rect();
    client_to_canvas(
        Point::new(f64::from(event.client_x()), f64::from(event.client_y())),
        Point::new(rect.left(), rect.top()),
        CanvasSize {
            width: rect.width(),
            height: rect.height(),
        },
        CanvasSize {
            width: f64::from(canvas.width()),
            height: f64::from(canvas.height()),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_position_is_scaled_into_canvas_pixels() {
        let p = client_to_canvas(
            Point::new(110.0, 70.0),
            Point::new(10.0, 20.0),
            CanvasSize {
                width: 200.0,
                height: 100.0,
            },
            CanvasSize {
                width: 400.0,
                height: 100.0,
            },
        );
        assert_eq!(p, Point::new(200.0, 50.0));
    }

    #[test]
    fn zero_sized_rect_does_not_scale() {
        let p = client_to_canvas(
            Point::new(5.0, 5.0),
            Point::ORIGIN,
            CanvasSize::default(),
            CanvasSize {
                width: 50.0,
                height: 50.0,
            },
        );
        assert_eq!(p, Point::new(5.0, 5.0));
    }
}
