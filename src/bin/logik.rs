//! Colour-guessing game: start a game, submit guesses, read the pegs.

use log::info;
use vitraz_logik::{
    api::ApiClient,
    components::{render_results, RemainingAttempts, SecretCombination, StatusLine, StoneSelect},
    config::{ApiConfig, MAX_STONES},
    game::{Difficulty, GameBoard, NewGameForm, StoneColor},
    hooks::use_status_message,
    utils::{guess_fields, parse_difficulty, validate_guess},
};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

type Selection = [Option<StoneColor>; MAX_STONES];

const EMPTY_SELECTION: Selection = [None; MAX_STONES];

/// Render one select per visible stone slot.
fn stone_selects(
    selection: &Selection,
    visible: usize,
    label: &str,
    on_pick: &Callback<(usize, Option<StoneColor>)>,
) -> Html {
    (0..visible)
        .map(|idx| {
            let on_pick = on_pick.clone();
            let onchange = Callback::from(move |stone| on_pick.emit((idx, stone)));
            html! {
                <StoneSelect
                    key={idx}
                    label={format!("{} {}", label, idx + 1)}
                    value={selection[idx]}
                    {onchange} />
            }
        })
        .collect()
}

#[function_component]
fn App() -> Html {
    let api = use_memo((), |_| ApiClient::new(ApiConfig::default()));
    let status = use_status_message();
    let board = use_mut_ref(|| None::<GameBoard>);
    let redraw = use_force_update();
    let form = use_state(NewGameForm::default);
    let guess = use_state(|| EMPTY_SELECTION);
    let busy = use_state(|| false);

    // ── new-game form ──
    let on_difficulty = {
        let form = form.clone();
        let status = status.show.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            match parse_difficulty(&select.value()) {
                Ok(difficulty) => {
                    let mut next = (*form).clone();
                    next.difficulty = difficulty;
                    form.set(next);
                }
                Err(err) => status.emit(err),
            }
        })
    };
    let on_random_toggle = {
        let form = form.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let mut next = (*form).clone();
            next.generate_random = input.checked();
            form.set(next);
        })
    };
    let on_secret_pick = {
        let form = form.clone();
        Callback::from(move |(idx, stone): (usize, Option<StoneColor>)| {
            let mut next = (*form).clone();
            next.secret[idx] = stone;
            form.set(next);
        })
    };
    let on_start = {
        let api = api.clone();
        let form = form.clone();
        let board = board.clone();
        let guess = guess.clone();
        let busy = busy.clone();
        let status = status.clone();
        let redraw = redraw.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let fields = match form.fields() {
                Ok(fields) => fields,
                Err(err) => {
                    status.show.emit(err);
                    return;
                }
            };
            let difficulty = form.difficulty;
            status.clear.emit(());
            busy.set(true);

            let api = api.clone();
            let board = board.clone();
            let guess = guess.clone();
            let busy = busy.clone();
            let status = status.show.clone();
            let redraw = redraw.clone();
            spawn_local(async move {
                match api.start_game(&fields).await {
                    Ok(redirect) => {
                        info!("Game started ({} stones), server sent {}", difficulty.stones(), redirect);
                        *board.borrow_mut() = Some(GameBoard::new(difficulty));
                        guess.set(EMPTY_SELECTION);
                    }
                    Err(e) => status.emit(e.to_string()),
                }
                busy.set(false);
                redraw.force_update();
            });
        })
    };

    // ── guess form ──
    let on_guess_pick = {
        let guess = guess.clone();
        Callback::from(move |(idx, stone): (usize, Option<StoneColor>)| {
            let mut next = *guess;
            next[idx] = stone;
            guess.set(next);
        })
    };
    let on_guess = {
        let api = api.clone();
        let board = board.clone();
        let guess = guess.clone();
        let busy = busy.clone();
        let status = status.clone();
        let redraw = redraw.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let Some(stones) = board.borrow().as_ref().map(GameBoard::stones) else {
                return;
            };
            let chosen = match validate_guess(&*guess, stones) {
                Ok(chosen) => chosen,
                Err(err) => {
                    status.show.emit(err);
                    return;
                }
            };
            busy.set(true);

            let api = api.clone();
            let board = board.clone();
            let guess = guess.clone();
            let busy = busy.clone();
            let status = status.clone();
            let redraw = redraw.clone();
            spawn_local(async move {
                let reply = api.submit_guess(&guess_fields(&chosen)).await;
                let applied = board
                    .borrow_mut()
                    .as_mut()
                    .map(|board| board.apply(reply).map(|_| board.is_over()));
                match applied {
                    Some(Ok(over)) => {
                        status.clear.emit(());
                        if !over {
                            guess.set(EMPTY_SELECTION);
                        }
                    }
                    Some(Err(e)) => status.show.emit(e.to_string()),
                    None => {}
                }
                busy.set(false);
                redraw.force_update();
            });
        })
    };
    let on_new_game = {
        let board = board.clone();
        let form = form.clone();
        let redraw = redraw.clone();
        Callback::from(move |_: MouseEvent| {
            *board.borrow_mut() = None;
            form.set(NewGameForm::default());
            redraw.force_update();
        })
    };

    let board_view = board.borrow().clone();

    html! {
        <div class="container">
            <h1>{ "Logik" }</h1>
            <StatusLine text={status.text.clone()} error={true} />

            if let Some(board) = board_view {
                <div id="game-board" class="game-board">
                    <RemainingAttempts remaining={board.remaining()} />
                    if let Some(message) = board.message() {
                        <div class="game-message">{ message }</div>
                    }
                    if let Some(secret) = board.secret() {
                        <SecretCombination secret={secret.to_vec()} />
                    }
                    { render_results(board.history()) }

                    if board.accepting_guesses() {
                        <form class="guess-form" onsubmit={on_guess}>
                            { stone_selects(&guess, board.stones(), "Stone", &on_guess_pick) }
                            <button type="submit" disabled={*busy}>{ "Guess" }</button>
                        </form>
                    } else {
                        <button onclick={on_new_game}>{ "New game" }</button>
                    }
                </div>
            } else {
                <form class="new-game-form" onsubmit={on_start}>
                    <div class="form-group">
                        <label for="difficulty">{ "Stones:" }</label>
                        <select id="difficulty" onchange={on_difficulty}>
                            { [Difficulty::Four, Difficulty::Five].iter().map(|&d| html! {
                                <option value={d.form_value()} selected={form.difficulty == d}>
                                    { d.stones() }
                                </option>
                            }).collect::<Html>() }
                        </select>
                    </div>
                    <div class="form-group">
                        <label>
                            <input type="checkbox" id="generate_random"
                                checked={form.generate_random}
                                onchange={on_random_toggle} />
                            { " Random secret" }
                        </label>
                    </div>
                    <div class="manual-input">
                        { stone_selects(&form.secret, form.visible_secret_inputs(), "Secret", &on_secret_pick) }
                    </div>
                    <button type="submit" disabled={*busy}>{ "Start game" }</button>
                </form>
            }
        </div>
    }
}

fn main() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Debug) {
        web_sys::console::error_1(&format!("logger init failed: {}", e).into());
    }
    yew::Renderer::<App>::new().render();
}
