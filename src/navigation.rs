// ABOUTME: Slide navigation state machine for the pitch-deck application
// ABOUTME: Pure transitions over the current slide index plus the keyboard intent table

use crate::errors::{DeckError, Result};

/// The cursor identifying the visible slide of one presentation instance.
///
/// `current` is always a valid index into a deck of `count` slides; every
/// operation below is total and keeps that true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationState {
    current: usize,
    count: usize,
}

/// A navigation request, decoupled from whatever input produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Next,
    Previous,
    GoTo(usize),
}

/// Enabled state of the Previous/Next buttons.
///
/// Unlike the keyboard shortcuts, the buttons do not wrap around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub previous_enabled: bool,
    pub next_enabled: bool,
}

/// Keys the keyboard listener is allowed to translate, in DOM `KeyboardEvent.key` form.
pub const NAVIGATION_KEYS: [&str; 16] = [
    "ArrowRight",
    " ",
    "Spacebar",
    "ArrowLeft",
    "Home",
    "End",
    "1",
    "2",
    "3",
    "4",
    "5",
    "6",
    "7",
    "8",
    "9",
    "0",
];

impl NavigationState {
    /// Create the state for a freshly mounted presentation (slide 0)
    pub fn new(count: usize) -> Result<Self> {
        if count == 0 {
            return Err(DeckError::ValidationError(
                "A presentation needs at least one slide".to_string(),
            ));
        }
        Ok(Self { current: 0, count })
    }

    /// Create a state positioned at `index`, clamped into range
    pub fn at(index: usize, count: usize) -> Result<Self> {
        Ok(Self::new(count)?.go_to(index))
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn last(&self) -> usize {
        self.count - 1
    }

    /// Advance one slide, wrapping from the last slide to the first
    pub fn next(self) -> Self {
        Self {
            current: (self.current + 1) % self.count,
            ..self
        }
    }

    /// Go back one slide, wrapping from the first slide to the last
    pub fn previous(self) -> Self {
        Self {
            current: (self.current + self.count - 1) % self.count,
            ..self
        }
    }

    /// Jump straight to `index`; out-of-range values clamp to the last slide
    pub fn go_to(self, index: usize) -> Self {
        Self {
            current: index.min(self.last()),
            ..self
        }
    }

    pub fn apply(self, intent: Intent) -> Self {
        transition(self, intent)
    }

    /// Apply intents in order, one transition each
    pub fn apply_all<I>(self, intents: I) -> Self
    where
        I: IntoIterator<Item = Intent>,
    {
        intents.into_iter().fold(self, transition)
    }

    pub fn controls(&self) -> Controls {
        Controls {
            previous_enabled: self.current > 0,
            next_enabled: self.current < self.last(),
        }
    }

    /// Header progress text, shown only between the title and closing slides
    pub fn progress_label(&self) -> Option<String> {
        if self.current > 0 && self.current < self.last() {
            Some(format!("{} / {}", self.current, self.count - 2))
        } else {
            None
        }
    }
}

/// The whole state machine: one total function from (state, intent) to state
pub fn transition(state: NavigationState, intent: Intent) -> NavigationState {
    match intent {
        Intent::Next => state.next(),
        Intent::Previous => state.previous(),
        Intent::GoTo(index) => state.go_to(index),
    }
}

impl Intent {
    /// Translate a `KeyboardEvent.key` value into an intent.
    ///
    /// Digits select slides 1-9 and "0" selects the tenth; digits with no
    /// matching slide, and every other key, return `None`.
    pub fn from_key(key: &str, count: usize) -> Option<Intent> {
        match key {
            "ArrowRight" | " " | "Spacebar" => Some(Intent::Next),
            "ArrowLeft" => Some(Intent::Previous),
            "Home" => Some(Intent::GoTo(0)),
            "End" if count > 0 => Some(Intent::GoTo(count - 1)),
            _ => {
                let mut chars = key.chars();
                let digit = match (chars.next(), chars.next()) {
                    (Some(c), None) => c.to_digit(10)? as usize,
                    _ => return None,
                };
                let position = if digit == 0 { 10 } else { digit };
                if position <= count {
                    Some(Intent::GoTo(position - 1))
                } else {
                    None
                }
            }
        }
    }

    /// Name used in the `intent` query parameter
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Next => "next",
            Intent::Previous => "previous",
            Intent::GoTo(_) => "goto",
        }
    }

    /// Encode as query parameters, e.g. `intent=goto&index=3`
    pub fn to_query(&self) -> String {
        match self {
            Intent::GoTo(index) => format!("intent=goto&index={}", index),
            other => format!("intent={}", other.name()),
        }
    }

    /// Compact token used in a `steps` list: `next`, `previous` or `goto:N`
    pub fn to_step(&self) -> String {
        match self {
            Intent::GoTo(index) => format!("goto:{}", index),
            other => other.name().to_string(),
        }
    }

    pub fn from_step(step: &str) -> Result<Intent> {
        match step.split_once(':') {
            Some(("goto", index)) => Intent::from_query("goto", Some(index)),
            Some(_) => Err(DeckError::ValidationError(format!(
                "Invalid navigation step: {}",
                step
            ))),
            None => Intent::from_query(step, None),
        }
    }

    /// Decode a comma separated `steps` list, e.g. `next,next,goto:3`
    pub fn parse_steps(steps: &str) -> Result<Vec<Intent>> {
        steps
            .split(',')
            .filter(|step| !step.is_empty())
            .map(Intent::from_step)
            .collect()
    }

    /// Decode from the `intent` and `index` query parameters
    pub fn from_query(intent: &str, index: Option<&str>) -> Result<Intent> {
        match intent {
            "next" => Ok(Intent::Next),
            "previous" => Ok(Intent::Previous),
            "goto" => {
                let raw = index.ok_or_else(|| {
                    DeckError::ValidationError("goto intent requires an index".to_string())
                })?;
                let index = raw.parse::<usize>().map_err(|_| {
                    DeckError::ValidationError(format!("Invalid slide index: {}", raw))
                })?;
                Ok(Intent::GoTo(index))
            }
            other => Err(DeckError::ValidationError(format!(
                "Unknown navigation intent: {}",
                other
            ))),
        }
    }
}
