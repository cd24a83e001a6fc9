//! Pure Yew view components for the game and editor pages.
//!
//! This module contains stateless components that render based on props,
//! making them easy to test and reuse.

use crate::api::ColorGroups;
use crate::game::{GuessAttempt, StoneColor};
use crate::palette::CatalogColor;
use crate::utils::parse_stone_selection;
use crate::{ColorGroup, Piece, PieceId, Rgb};
use log::warn;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

fn render_stone(stone: StoneColor) -> Html {
    html! { <span class={stone.css_class()} title={stone.name()}></span> }
}

/// Renders the table of every scored guess, oldest first.
///
/// Each row shows the guessed stones followed by one cell with black pegs
/// then white pegs.
pub fn render_results(history: &[GuessAttempt]) -> Html {
    if history.is_empty() {
        return html! {
            <div class="results">
                <p class="no-results-message">{ "No guesses yet" }</p>
            </div>
        };
    }

    let stones = history.first().map(|a| a.guess.len()).unwrap_or(0);

    html! {
        <div class="results">
            <table class="results-table">
                <thead>
                    <tr>
                        <th>{ "#" }</th>
                        { (0..stones).map(|i| html!{ <th>{ i + 1 }</th> }).collect::<Html>() }
                        <th>{ "Result" }</th>
                    </tr>
                </thead>
                <tbody>
                    { history.iter().enumerate().map(|(idx, attempt)| {
                        render_result_row(attempt, idx)
                    }).collect::<Html>() }
                </tbody>
            </table>
        </div>
    }
}

/// Renders a single result row in the table
fn render_result_row(attempt: &GuessAttempt, idx: usize) -> Html {
    html! {
        <tr>
            <td>{ idx + 1 }</td>
            { attempt.guess.iter().map(|&stone| html! {
                <td>{ render_stone(stone) }</td>
            }).collect::<Html>() }
            <td class="feedback">
                { attempt.pegs().into_iter().map(|peg| html! {
                    <span class={peg.css_class()}></span>
                }).collect::<Html>() }
            </td>
        </tr>
    }
}

#[derive(Properties, PartialEq)]
pub struct SecretCombinationProps {
    pub secret: Vec<StoneColor>,
}

/// The revealed secret, shown once above the results after the game ends.
#[function_component(SecretCombination)]
pub fn secret_combination(props: &SecretCombinationProps) -> Html {
    html! {
        <div class="secret-combination">
            <span class="secret-label">{ "Secret: " }</span>
            { props.secret.iter().map(|&stone| render_stone(stone)).collect::<Html>() }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct RemainingAttemptsProps {
    pub remaining: u32,
}

#[function_component(RemainingAttempts)]
pub fn remaining_attempts(props: &RemainingAttemptsProps) -> Html {
    html! {
        <div class="remaining-attempts">
            { format!("Remaining attempts: {}", props.remaining) }
        </div>
    }
}

/// Select for one stone position.
#[derive(Properties, PartialEq)]
pub struct StoneSelectProps {
    pub label: AttrValue,
    pub value: Option<StoneColor>,
    pub onchange: Callback<Option<StoneColor>>,
}

#[function_component(StoneSelect)]
pub fn stone_select(props: &StoneSelectProps) -> Html {
    let onchange = {
        let cb = props.onchange.clone();
        Callback::from(move |e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            match parse_stone_selection(&select.value()) {
                Ok(stone) => cb.emit(stone),
                Err(err) => warn!("{}", err),
            }
        })
    };

    html! {
        <div class="form-group stone-select">
            <label>{ props.label.clone() }</label>
            <select {onchange}>
                <option value="" selected={props.value.is_none()}>{ "–" }</option>
                { StoneColor::ALL.iter().map(|&stone| html! {
                    <option value={stone.name()} class={stone.css_class()}
                            selected={props.value == Some(stone)}>
                        { stone.name() }
                    </option>
                }).collect::<Html>() }
            </select>
        </div>
    }
}

/// Colour groups of the current analysis, each piece clickable for recolouring.
#[derive(Properties, PartialEq)]
pub struct ColorGroupListProps {
    pub groups: ColorGroups,
    pub on_piece_click: Callback<PieceId>,
}

fn render_group_piece(piece: &Piece, on_click: &Callback<PieceId>) -> Html {
    let onclick = {
        let on_click = on_click.clone();
        let id = piece.id;
        Callback::from(move |_: MouseEvent| on_click.emit(id))
    };
    html! {
        <li class="group-piece" {onclick}>
            <span class="swatch" style={format!("background-color: {}", piece.original_rgb.css())}></span>
            { format!("Piece {} (original RGB {})", piece.id, piece.original_rgb) }
        </li>
    }
}

/// Swatch for a group header: the catalog colour itself, or the first piece's
/// colour for names outside the catalog.
fn group_swatch(name: &str, group: &ColorGroup) -> Option<Rgb> {
    CatalogColor::from_name(name)
        .map(CatalogColor::rgb)
        .or_else(|| group.pieces.first().map(|p| p.catalog_rgb))
}

#[function_component(ColorGroupList)]
pub fn color_group_list(props: &ColorGroupListProps) -> Html {
    if props.groups.is_empty() {
        return html! {};
    }

    html! {
        <div class="color-groups">
            { props.groups.iter().map(|(name, group)| {
                let swatch = group_swatch(name, group).map(Rgb::css).unwrap_or_default();
                html! {
                    <div class="color-group" key={name.clone()}>
                        <h4>
                            <span class="swatch" style={format!("background-color: {}", swatch)}></span>
                            { format!("{}: {} pieces ({:.2}%)", name, group.pieces.len(), group.percent_area) }
                        </h4>
                        <ul>
                            { group.pieces.iter().map(|p| render_group_piece(p, &props.on_piece_click)).collect::<Html>() }
                        </ul>
                    </div>
                }
            }).collect::<Html>() }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct StatusLineProps {
    pub text: Option<String>,
    #[prop_or_default]
    pub error: bool,
}

#[function_component(StatusLine)]
pub fn status_line(props: &StatusLineProps) -> Html {
    match &props.text {
        Some(text) => html! {
            <div class={classes!("status-message", props.error.then_some("error"))}>{ text }</div>
        },
        None => html! {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{piece, rect};

    fn group_of(pieces: Vec<Piece>) -> ColorGroup {
        ColorGroup {
            pieces,
            total_area: 0,
            percent_area: 0.0,
        }
    }

    #[test]
    fn group_swatch_uses_catalog_colour() {
        let group = group_of(vec![piece(1, "navy", Rgb(1, 2, 3), rect(0.0, 0.0, 1.0, 1.0))]);
        assert_eq!(group_swatch("navy", &group), Some(Rgb(0, 0, 128)));
        assert_eq!(group_swatch("mauve", &group), Some(Rgb(1, 2, 3)));
        assert_eq!(group_swatch("mauve", &group_of(Vec::new())), None);
    }
}
