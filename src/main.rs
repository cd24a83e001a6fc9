//! Glass-piece editor: upload a stained-glass image, place and recolour its
//! pieces, export a cutting plan and compare a generated replica.

use std::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};
use vitraz_logik::{
    api::{ApiClient, CuttingPlan},
    browser::{canvas_point, image_size, trigger_download, BrowserDialogs},
    components::{ColorGroupList, StatusLine},
    config::{ApiConfig, EMPTY_ANALYSIS_MSG, PLAN_FILE, REPLICA_FILE},
    hooks::{use_loaded_image, use_status_message, ImageLoad},
    interaction::{request_recolor, Interaction, PointerButton, PointerEvent, ServerRequest},
    render::{draw_preview, draw_source, draw_workspace},
    session::{AnalysisOutcome, EditorSession},
    utils::cache_busted,
    PieceId, Point,
};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlInputElement};
use yew::prelude::*;

// ──────────────────────────────────────────────────────────────────────────────
// Helper functions

/// 2D context of a mounted canvas.
fn context_2d(node: &NodeRef) -> Option<CanvasRenderingContext2d> {
    node.cast::<HtmlCanvasElement>()?
        .get_context("2d")
        .ok()??
        .dyn_into::<CanvasRenderingContext2d>()
        .ok()
}

/// Position of a mouse event on the canvas behind `node`.
fn pointer_on(node: &NodeRef, event: &MouseEvent) -> Option<Point> {
    node.cast::<HtmlCanvasElement>()
        .map(|canvas| canvas_point(event, &canvas))
}

/// Token that changes on every call, so regenerated images bypass the cache.
fn fresh_token() -> u64 {
    js_sys::Date::now() as u64
}

/// Everything an async round-trip needs to report back into the page.
#[derive(Clone)]
struct EditorHandles {
    api: Rc<ApiClient>,
    session: Rc<RefCell<EditorSession>>,
    status: Callback<String>,
    redraw: UseForceUpdateHandle,
}

impl EditorHandles {
    /// Send a recolour/delete request and reconcile the session with the reply.
    fn execute(&self, request: ServerRequest) {
        let generation = self.session.borrow().generation();
        let handles = self.clone();
        spawn_local(async move {
            let (result, done) = match request {
                ServerRequest::Recolor { piece_id, color } => (
                    handles.api.replace_color(piece_id, color).await,
                    format!("Piece {} recoloured to {}", piece_id, color),
                ),
                ServerRequest::Delete { piece_id } => (
                    handles.api.delete_piece(piece_id).await,
                    format!("Piece {} removed", piece_id),
                ),
            };
            match result {
                Ok(set) => {
                    let applied = handles.session.borrow_mut().apply_piece_set(generation, set);
                    let Some(dropped) = applied else {
                        return;
                    };
                    if dropped > 0 {
                        info!("{} placed pieces dropped after reconcile", dropped);
                    }
                    handles.status.emit(done);
                    handles.redraw.force_update();
                }
                Err(e) => handles.status.emit(e.to_string()),
            }
        });
    }

    fn recolor_from_panel(&self, piece_id: PieceId) {
        let request = request_recolor(&self.session.borrow(), piece_id, &mut BrowserDialogs);
        if let Some(request) = request {
            self.execute(request);
        }
    }

    fn save_plan(&self) {
        let plan: CuttingPlan = self.session.borrow().cutting_plan();
        let handles = self.clone();
        spawn_local(async move {
            match handles.api.save_plan(&plan).await {
                Ok(message) => {
                    handles.status.emit(message);
                    let href = handles.api.config().download_url(PLAN_FILE);
                    if let Err(e) = trigger_download(&href, PLAN_FILE) {
                        warn!("Plan download failed: {:?}", e);
                    }
                }
                Err(e) => handles.status.emit(e.to_string()),
            }
        });
    }

    fn generate_replica(&self) {
        let generation = self.session.borrow().generation();
        let handles = self.clone();
        spawn_local(async move {
            let reply = handles.api.generate_replica().await;
            let taken = handles
                .session
                .borrow_mut()
                .apply_replica(generation, reply, fresh_token());
            match taken {
                Ok(true) => {
                    let href = handles.api.config().download_url(REPLICA_FILE);
                    if let Err(e) = trigger_download(&href, REPLICA_FILE) {
                        warn!("Replica download failed: {:?}", e);
                    }
                    handles.redraw.force_update();
                }
                Ok(false) => {}
                Err(e) => handles.status.emit(e.to_string()),
            }
        });
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Main component

#[function_component]
fn App() -> Html {
    let api = use_memo((), |_| ApiClient::new(ApiConfig::default()));
    let session = use_mut_ref(EditorSession::new);
    let interaction = use_mut_ref(Interaction::new);
    let redraw = use_force_update();
    let status = use_status_message();

    let uploading = use_state(|| false);
    let image_src = use_state(|| None::<String>);

    let file_input = use_node_ref();
    let source_canvas = use_node_ref();
    let workspace_canvas = use_node_ref();
    let preview_canvas = use_node_ref();

    // the preview loads whatever replica the session currently holds
    let replica_src = session
        .borrow()
        .replica()
        .map(|replica| cache_busted(&api.config().url(&replica.path), replica.token));
    let original = use_loaded_image((*image_src).clone());
    let replica = use_loaded_image(replica_src);

    let handles = EditorHandles {
        api: api.clone(),
        session: session.clone(),
        status: status.show.clone(),
        redraw: redraw.clone(),
    };

    // size the session to the original once it has loaded
    {
        let session = session.clone();
        let status = status.show.clone();
        use_effect_with(original.clone(), move |original| {
            match original {
                ImageLoad::Ready(image) => {
                    session.borrow_mut().attach_canvas(image_size(image));
                }
                ImageLoad::Failed(message) => status.emit(message.clone()),
                ImageLoad::Idle | ImageLoad::Loading => {}
            }
            || ()
        });
    }

    {
        let session = session.clone();
        let status = status.show.clone();
        let redraw = redraw.clone();
        use_effect_with(replica.clone(), move |replica| {
            if let ImageLoad::Failed(message) = replica {
                status.emit(message.clone());
                let dropped = session.borrow_mut().drop_replica();
                if dropped {
                    redraw.force_update();
                }
            }
            || ()
        });
    }

    // redraw every canvas after each render
    {
        let session = session.clone();
        let original = original.clone();
        let replica = replica.clone();
        let source_canvas = source_canvas.clone();
        let workspace_canvas = workspace_canvas.clone();
        let preview_canvas = preview_canvas.clone();
        use_effect(move || {
            if let Some(image) = original.image() {
                let session = session.borrow();
                if let Some(mut ctx) = context_2d(&source_canvas) {
                    draw_source(&mut ctx, &session, image);
                }
                if let Some(mut ctx) = context_2d(&workspace_canvas) {
                    draw_workspace(&mut ctx, &session);
                }
                if let Some(mut ctx) = context_2d(&preview_canvas) {
                    draw_preview(&mut ctx, &session, image, replica.image());
                }
            }
            || ()
        });
    }

    let on_upload = {
        let api = api.clone();
        let session = session.clone();
        let interaction = interaction.clone();
        let file_input = file_input.clone();
        let uploading = uploading.clone();
        let image_src = image_src.clone();
        let status = status.clone();
        let redraw = redraw.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let file = file_input
                .cast::<HtmlInputElement>()
                .and_then(|input| input.files())
                .and_then(|files| files.get(0));
            let Some(file) = file else {
                status.show.emit("Choose an image to upload".to_string());
                return;
            };

            // the current image stays editable until the new analysis arrives
            status.clear.emit(());
            uploading.set(true);

            let api = api.clone();
            let session = session.clone();
            let interaction = interaction.clone();
            let uploading = uploading.clone();
            let image_src = image_src.clone();
            let status = status.show.clone();
            let redraw = redraw.clone();
            spawn_local(async move {
                let reply = api.upload_image(&file).await;
                let applied = session.borrow_mut().apply_upload(reply);
                match applied {
                    Ok(outcome) => {
                        interaction.borrow_mut().cancel();
                        match outcome {
                            AnalysisOutcome::Ready { image_path, pieces } => {
                                info!("{} pieces ready for editing", pieces);
                                let src = cache_busted(&api.config().url(&image_path), fresh_token());
                                image_src.set(Some(src));
                            }
                            AnalysisOutcome::Empty => {
                                image_src.set(None);
                                status.emit(EMPTY_ANALYSIS_MSG.to_string());
                            }
                        }
                    }
                    Err(e) => status.emit(e.to_string()),
                }
                uploading.set(false);
                redraw.force_update();
            });
        })
    };

    // workspace pointer events all go through the interaction state machine
    let dispatch = {
        let session = session.clone();
        let interaction = interaction.clone();
        let handles = handles.clone();
        Callback::from(move |event: PointerEvent| {
            let reaction = {
                let mut session = session.borrow_mut();
                interaction
                    .borrow_mut()
                    .handle(&mut session, event, &mut BrowserDialogs)
            };
            if reaction.redraw {
                handles.redraw.force_update();
            }
            if let Some(request) = reaction.request {
                handles.execute(request);
            }
        })
    };

    let on_workspace_down = {
        let dispatch = dispatch.clone();
        let canvas = workspace_canvas.clone();
        Callback::from(move |e: MouseEvent| {
            if let Some(at) = pointer_on(&canvas, &e) {
                let button = PointerButton::from_dom(e.button());
                dispatch.emit(PointerEvent::Down { at, button });
            }
        })
    };
    let on_workspace_move = {
        let dispatch = dispatch.clone();
        let canvas = workspace_canvas.clone();
        Callback::from(move |e: MouseEvent| {
            if let Some(at) = pointer_on(&canvas, &e) {
                dispatch.emit(PointerEvent::Move { at });
            }
        })
    };
    let on_workspace_up = {
        let dispatch = dispatch.clone();
        let canvas = workspace_canvas.clone();
        Callback::from(move |e: MouseEvent| {
            if let Some(at) = pointer_on(&canvas, &e) {
                dispatch.emit(PointerEvent::Up { at });
            }
        })
    };
    let on_workspace_leave = {
        let dispatch = dispatch.clone();
        Callback::from(move |_: MouseEvent| dispatch.emit(PointerEvent::Leave))
    };
    let on_context_menu = Callback::from(|e: MouseEvent| e.prevent_default());

    let on_source_move = {
        let session = session.clone();
        let canvas = source_canvas.clone();
        let redraw = redraw.clone();
        Callback::from(move |e: MouseEvent| {
            let Some(at) = pointer_on(&canvas, &e) else {
                return;
            };
            let changed = session.borrow_mut().hover_source(at);
            if changed {
                redraw.force_update();
            }
        })
    };
    let on_source_leave = {
        let session = session.clone();
        let redraw = redraw.clone();
        Callback::from(move |_: MouseEvent| {
            let changed = session.borrow_mut().clear_hover();
            if changed {
                redraw.force_update();
            }
        })
    };

    let on_preview_move = {
        let session = session.clone();
        let canvas = preview_canvas.clone();
        let redraw = redraw.clone();
        Callback::from(move |e: MouseEvent| {
            if let Some(at) = pointer_on(&canvas, &e) {
                session.borrow_mut().set_split(at.x);
                redraw.force_update();
            }
        })
    };

    let on_piece_click = {
        let handles = handles.clone();
        Callback::from(move |piece_id: PieceId| handles.recolor_from_panel(piece_id))
    };
    let on_save_plan = {
        let handles = handles.clone();
        Callback::from(move |_: MouseEvent| handles.save_plan())
    };
    let on_generate_replica = {
        let handles = handles.clone();
        Callback::from(move |_: MouseEvent| handles.generate_replica())
    };

    let session_view = session.borrow();
    let size = original
        .image()
        .filter(|_| session_view.is_ready())
        .map(image_size);
    let groups = session_view.color_groups().clone();
    let placed = session_view.workspace().len();
    drop(session_view);

    html! {
        <div class="container">
            <h1>{ "Stained glass editor" }</h1>

            <form class="upload-form" onsubmit={on_upload}>
                <input type="file" accept="image/*" ref={file_input} />
                <button type="submit" disabled={*uploading}>
                    { if *uploading { "Analysing…" } else { "Upload" } }
                </button>
            </form>

            <StatusLine text={status.text.clone()} />

            if let Some(size) = size {
                <div class="editor">
                    <div class="canvases">
                        <div class="canvas-panel">
                            <h3>{ "Original" }</h3>
                            <canvas ref={source_canvas}
                                width={size.width.to_string()}
                                height={size.height.to_string()}
                                onmousemove={on_source_move}
                                onmouseleave={on_source_leave} />
                        </div>
                        <div class="canvas-panel">
                            <h3>{ format!("Workspace ({} placed)", placed) }</h3>
                            <canvas ref={workspace_canvas} class="workspace"
                                width={size.width.to_string()}
                                height={size.height.to_string()}
                                onmousedown={on_workspace_down}
                                onmousemove={on_workspace_move}
                                onmouseup={on_workspace_up}
                                onmouseleave={on_workspace_leave}
                                oncontextmenu={on_context_menu} />
                        </div>
                        <div class="canvas-panel">
                            <h3>{ "Preview" }</h3>
                            <canvas ref={preview_canvas}
                                width={size.width.to_string()}
                                height={size.height.to_string()}
                                onmousemove={on_preview_move} />
                        </div>
                    </div>

                    <div class="actions">
                        <button onclick={on_save_plan}>{ "Save cutting plan" }</button>
                        <button onclick={on_generate_replica}>{ "Generate replica" }</button>
                    </div>

                    <ColorGroupList {groups} {on_piece_click} />
                </div>
            } else if matches!(original, ImageLoad::Loading) {
                <p class="loading">{ "Loading image…" }</p>
            }
        </div>
    }
}

/// Entry point: installs logging and renders the editor.
fn main() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Debug) {
        web_sys::console::error_1(&format!("logger init failed: {}", e).into());
    }
    yew::Renderer::<App>::new().render();
}
