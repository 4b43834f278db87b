//! Browser binding: a whiteboard drawn into a `<canvas>` element.

use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};
use whiteboard_core::loader::is_data_url;
use whiteboard_core::shapes::ShapeId;
use whiteboard_core::{
    EXPORT_FILE_NAME, FileReaderUpdate, LoadError, LoadTicket, Mode, MouseButton, PointerEvent,
    Whiteboard, WhiteboardConfig, WhiteboardEvent,
};
use whiteboard_render::{
    RasterRenderer, RenderContext, Renderer, decode_data_url, decode_image, render_png,
};

/// Initialize logging and panic reporting.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

struct State {
    board: Whiteboard,
    renderer: RasterRenderer,
    element: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    on_change: Option<js_sys::Function>,
}

impl State {
    /// Rasterize the board and blit it into the element.
    fn redraw(&mut self) -> Result<(), JsValue> {
        self.board.take_render_request();
        let ctx = RenderContext::new(self.board.canvas()).with_preview(self.board.stroke_preview());
        self.renderer.build_scene(&ctx).map_err(to_js)?;
        let Some(pixmap) = self.renderer.pixmap() else {
            return Ok(());
        };
        let data = web_sys::ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(pixmap.as_raw()),
            pixmap.width(),
            pixmap.height(),
        )?;
        self.context.put_image_data(&data, 0.0, 0.0)?;
        self.element
            .style()
            .set_property("cursor", self.board.canvas().hover_cursor.css())?;
        Ok(())
    }

    /// Take the notifications the host has not seen yet.
    fn take_changes(&mut self) -> Changes {
        let scenes = self
            .board
            .drain_events()
            .into_iter()
            .map(|event| {
                let WhiteboardEvent::SceneChanged { json } = event;
                json
            })
            .collect();
        Changes {
            callback: self.on_change.clone(),
            scenes,
        }
    }
}

/// Scene snapshots on their way to the host callback.
struct Changes {
    callback: Option<js_sys::Function>,
    scenes: Vec<String>,
}

impl Changes {
    /// Call the host. The state must not be borrowed here: the callback may
    /// call straight back into the widget.
    fn deliver(self) {
        let Some(callback) = self.callback else {
            return;
        };
        for json in self.scenes {
            if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                log::warn!("change callback failed: {err:?}");
            }
        }
    }
}

/// A whiteboard widget bound to a canvas element.
#[wasm_bindgen]
pub struct WhiteboardWidget {
    state: Rc<RefCell<State>>,
}

#[wasm_bindgen]
impl WhiteboardWidget {
    /// Mount a whiteboard on the canvas with id `canvas_id`, optionally
    /// restoring a saved scene.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, saved_scene: Option<String>) -> Result<WhiteboardWidget, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let element = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("no element #{canvas_id}")))?
            .dyn_into::<HtmlCanvasElement>()?;
        let context = element
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let config = WhiteboardConfig {
            width: element.width(),
            height: element.height(),
            ..WhiteboardConfig::default()
        };
        let mut board = Whiteboard::new(config);
        board.mount(saved_scene.as_deref()).map_err(to_js)?;

        let mut state = State {
            board,
            renderer: RasterRenderer::new(),
            element,
            context,
            on_change: None,
        };
        state.redraw()?;
        Ok(Self { state: Rc::new(RefCell::new(state)) })
    }

    /// Register the scene-changed callback; it receives the scene JSON.
    pub fn set_on_change(&self, callback: js_sys::Function) {
        self.state.borrow_mut().on_change = Some(callback);
    }

    /// Switch mode by name (`"PENCIL"`, `"select"`, ...).
    pub fn activate(&self, mode: &str) -> Result<(), JsValue> {
        let mode: Mode = mode.parse().map_err(to_js)?;
        self.update(|board| {
            board.activate(mode);
            Ok(())
        })
    }

    pub fn mode(&self) -> String {
        self.state.borrow().board.mode().name().to_string()
    }

    /// Current stroke colour as `#rrggbb`.
    pub fn color(&self) -> String {
        self.state.borrow().board.options().color_hex()
    }

    pub fn set_color(&self, color: &str) -> Result<(), JsValue> {
        self.state.borrow_mut().board.set_color(color).map_err(to_js)
    }

    /// Set the width from the slider's string value.
    pub fn set_width(&self, width: &str) -> Result<(), JsValue> {
        self.state.borrow_mut().board.set_width_input(width).map_err(to_js)
    }

    pub fn set_fill(&self, fill: bool) {
        self.state.borrow_mut().board.set_fill(fill);
    }

    pub fn pointer_down(&self, x: f64, y: f64, button: i16) -> Result<(), JsValue> {
        let Some(button) = MouseButton::from_dom(button) else {
            return Ok(());
        };
        self.pointer(PointerEvent::Down { position: kurbo::Point::new(x, y), button })
    }

    pub fn pointer_move(&self, x: f64, y: f64) -> Result<(), JsValue> {
        self.pointer(PointerEvent::Move { position: kurbo::Point::new(x, y) })
    }

    pub fn pointer_up(&self, x: f64, y: f64, button: i16) -> Result<(), JsValue> {
        let Some(button) = MouseButton::from_dom(button) else {
            return Ok(());
        };
        self.pointer(PointerEvent::Up { position: kurbo::Point::new(x, y), button })
    }

    /// Remove every object; the background stays.
    pub fn clear(&self) -> Result<(), JsValue> {
        self.update(|board| {
            board.clear();
            Ok(())
        })
    }

    /// Id of the selected object, if any.
    pub fn active_id(&self) -> Option<String> {
        let state = self.state.borrow();
        state.board.canvas().active().map(|id| id.to_string())
    }

    /// Replace the content of the text object `id`.
    pub fn set_text(&self, id: &str, content: String) -> Result<(), JsValue> {
        let id = ShapeId::parse_str(id).map_err(to_js)?;
        self.update(|board| board.set_text(id, content).map_err(to_js))
    }

    pub fn to_json(&self) -> Result<String, JsValue> {
        self.state.borrow().board.to_json().map_err(to_js)
    }

    pub fn load_json(&self, json: &str) -> Result<(), JsValue> {
        self.update(|board| board.load_json(json).map_err(to_js))
    }

    /// Merge a page-provider update given as JSON
    /// (`{"file": ..., "currentPageNumber": ..., "currentPage": ...}`).
    pub fn update_file_reader_info(&self, update: &str) -> Result<(), JsValue> {
        let update: FileReaderUpdate = serde_json::from_str(update).map_err(to_js)?;
        let ticket = self.state.borrow_mut().board.update_file_reader_info(update);
        if let Some(ticket) = ticket {
            spawn_load(self.state.clone(), ticket);
        }
        Ok(())
    }

    /// Add an image (URL or data URL) as a new object.
    pub fn upload_image(&self, source: String) {
        let ticket = self.state.borrow_mut().board.request_image_upload(source);
        spawn_load(self.state.clone(), ticket);
    }

    /// Download the drawing as `image.png`.
    pub fn save_as_image(&self) -> Result<(), JsValue> {
        let png = render_png(self.state.borrow().board.canvas(), 1.0).map_err(to_js)?;
        download_binary_file(EXPORT_FILE_NAME, &png, "image/png")
    }

    /// Detach from the host; loads still in flight are dropped.
    pub fn unmount(&self) {
        let mut state = self.state.borrow_mut();
        state.board.unmount();
        state.on_change = None;
    }
}

impl WhiteboardWidget {
    fn pointer(&self, event: PointerEvent) -> Result<(), JsValue> {
        self.update(|board| {
            board.handle_pointer_event(event);
            Ok(())
        })
    }

    /// Run `f` on the board and redraw, then notify the host once the
    /// state borrow is released.
    fn update(
        &self,
        f: impl FnOnce(&mut Whiteboard) -> Result<(), JsValue>,
    ) -> Result<(), JsValue> {
        let (result, changes) = {
            let mut state = self.state.borrow_mut();
            let result = f(&mut state.board).and_then(|()| state.redraw());
            (result, state.take_changes())
        };
        changes.deliver();
        result
    }
}

/// Fetch and decode the ticket's image, then hand the result back.
fn spawn_load(state: Rc<RefCell<State>>, ticket: LoadTicket) {
    wasm_bindgen_futures::spawn_local(async move {
        let result = if is_data_url(&ticket.source) {
            decode_data_url(&ticket.source)
        } else {
            match fetch_bytes(&ticket.source).await {
                Ok(bytes) => decode_image(&bytes),
                Err(err) => Err(LoadError::Fetch(format!("{err:?}"))),
            }
        };

        let changes = {
            let mut state = state.borrow_mut();
            match state.board.complete_load(&ticket, result) {
                Ok(outcome) => log::debug!("load of {} finished: {outcome:?}", ticket.source),
                Err(err) => log::warn!("load of {} failed: {err}", ticket.source),
            }
            if let Err(err) = state.redraw() {
                log::error!("redraw failed: {err:?}");
            }
            state.take_changes()
        };
        changes.deliver();
    });
}

async fn fetch_bytes(url: &str) -> Result<Vec<u8>, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let response: web_sys::Response = JsFuture::from(window.fetch_with_str(url)).await?.dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!("HTTP {}", response.status())));
    }
    let buffer = JsFuture::from(response.array_buffer()?).await?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

fn download_binary_file(filename: &str, data: &[u8], mime_type: &str) -> Result<(), JsValue> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let uint8_array = js_sys::Uint8Array::from(data);
    let blob_parts = js_sys::Array::new();
    blob_parts.push(&uint8_array);

    let options = web_sys::BlobPropertyBag::new();
    options.set_type(mime_type);
    let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&blob_parts, &options)?;

    let url = web_sys::Url::create_object_url_with_blob(&blob)?;
    let a = document
        .create_element("a")?
        .dyn_into::<web_sys::HtmlAnchorElement>()?;
    a.set_href(&url);
    a.set_download(filename);
    a.click();

    web_sys::Url::revoke_object_url(&url).ok();
    Ok(())
}
