//! Guess-game board: stone colours, attempts and the result history.
//!
//! Scoring happens on the server; the board only mirrors what each reply
//! says and decides what the page shows.

use crate::config::{MAX_ATTEMPTS, MAX_STONES};
use crate::ClientError;
use log::{debug, info};
use serde::Deserialize;
use std::fmt;

/// Stone colours known to the game server, by server id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "u8")]
pub enum StoneColor {
    Red = 1,
    Blue = 2,
    Green = 3,
    Yellow = 4,
    Purple = 5,
    Cyan = 6,
}

impl StoneColor {
    pub const ALL: [StoneColor; 6] = [
        StoneColor::Red,
        StoneColor::Blue,
        StoneColor::Green,
        StoneColor::Yellow,
        StoneColor::Purple,
        StoneColor::Cyan,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    /// The name the server expects in form submissions.
    pub fn name(self) -> &'static str {
        match self {
            StoneColor::Red => "červená",
            StoneColor::Blue => "modrá",
            StoneColor::Green => "zelená",
            StoneColor::Yellow => "žlutá",
            StoneColor::Purple => "fialová",
            StoneColor::Cyan => "azurová",
        }
    }

    pub fn css_class(self) -> String {
        format!("stone color-{}", self.name().to_lowercase())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }
}

impl TryFrom<u8> for StoneColor {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.id() == id)
            .ok_or_else(|| format!("unknown stone colour id {}", id))
    }
}

impl fmt::Display for StoneColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    #[default]
    Four,
    Five,
}

impl Difficulty {
    pub fn stones(self) -> usize {
        match self {
            Difficulty::Four => 4,
            Difficulty::Five => 5,
        }
    }

    /// Value of the difficulty field in the new-game form.
    pub fn form_value(self) -> &'static str {
        match self {
            Difficulty::Four => "4",
            Difficulty::Five => "5",
        }
    }

    pub fn from_stones(stones: usize) -> Option<Self> {
        match stones {
            4 => Some(Difficulty::Four),
            5 => Some(Difficulty::Five),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Peg {
    Black,
    White,
}

impl Peg {
    pub fn css_class(self) -> &'static str {
        match self {
            Peg::Black => "peg black",
            Peg::White => "peg white",
        }
    }
}

/// One scored guess, decoded from the server's `[guess, black, white]` triple.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "(Vec<u8>, u8, u8)")]
pub struct GuessAttempt {
    pub guess: Vec<StoneColor>,
    pub black: u8,
    pub white: u8,
}

impl TryFrom<(Vec<u8>, u8, u8)> for GuessAttempt {
    type Error = String;

    fn try_from((ids, black, white): (Vec<u8>, u8, u8)) -> Result<Self, Self::Error> {
        let guess = ids
            .into_iter()
            .map(StoneColor::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { guess, black, white })
    }
}

impl GuessAttempt {
    /// Feedback markers: all black pegs first, then all white ones.
    pub fn pegs(&self) -> Vec<Peg> {
        std::iter::repeat(Peg::Black)
            .take(usize::from(self.black))
            .chain(std::iter::repeat(Peg::White).take(usize::from(self.white)))
            .collect()
    }
}

/// Successful reply to a guess submission.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GuessProgress {
    pub guesses: Vec<GuessAttempt>,
    pub remaining_attempts: u32,
    pub game_over: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub secret: Vec<StoneColor>,
}

/// Everything the game page shows.
#[derive(Debug, Clone, PartialEq)]
pub struct GameBoard {
    difficulty: Difficulty,
    history: Vec<GuessAttempt>,
    remaining: u32,
    over: bool,
    message: Option<String>,
    secret: Option<Vec<StoneColor>>,
}

impl GameBoard {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            history: Vec::new(),
            remaining: MAX_ATTEMPTS,
            over: false,
            message: None,
            secret: None,
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn stones(&self) -> usize {
        self.difficulty.stones()
    }

    pub fn history(&self) -> &[GuessAttempt] {
        &self.history
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    /// The guess form is only shown while this holds.
    pub fn accepting_guesses(&self) -> bool {
        !self.over
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn secret(&self) -> Option<&[StoneColor]> {
        self.secret.as_deref()
    }

    /// Mirror a guess reply. On error nothing changes and the error is handed back.
    pub fn apply(&mut self, reply: Result<GuessProgress, ClientError>) -> Result<(), ClientError> {
        let progress = reply?;
        debug!(
            "Guess reply: {} attempts, {} remaining, over={}",
            progress.guesses.len(),
            progress.remaining_attempts,
            progress.game_over
        );
        self.history = progress.guesses;
        self.remaining = progress.remaining_attempts;
        self.over = progress.game_over;
        if self.over {
            info!("Game over: {}", progress.message.as_deref().unwrap_or(""));
            self.message = progress.message;
            if self.secret.is_none() && !progress.secret.is_empty() {
                self.secret = Some(progress.secret);
            }
        } else {
            self.message = None;
        }
        Ok(())
    }
}

/// State of the new-game form.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGameForm {
    pub difficulty: Difficulty,
    pub generate_random: bool,
    pub secret: [Option<StoneColor>; MAX_STONES],
}

impl Default for NewGameForm {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            generate_random: true,
            secret: [None; MAX_STONES],
        }
    }
}

impl NewGameForm {
    /// How many secret selects are shown (and required).
    pub fn visible_secret_inputs(&self) -> usize {
        if self.generate_random {
            0
        } else {
            self.difficulty.stones()
        }
    }

    /// Form fields for the start request, or why the form cannot be sent yet.
    pub fn fields(&self) -> Result<Vec<(&'static str, String)>, String> {
        let mut fields = vec![("difficulty", self.difficulty.form_value().to_string())];
        if self.generate_random {
            fields.push(("generate_random", "on".to_string()));
            return Ok(fields);
        }
        let stones = self.difficulty.stones();
        for (idx, stone) in self.secret.iter().take(stones).enumerate() {
            match stone {
                Some(color) => fields.push(("secret", color.name().to_string())),
                None => return Err(format!("Choose a colour for secret stone {}", idx + 1)),
            }
        }
        Ok(fields)
    }
}
