//! Open/closed model of the chat panel.
//!
//! Transitions are a fixed table; an event without an entry leaves the state
//! untouched and is reported as not consumed so the host page keeps its
//! default handling.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Panel visibility.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PanelState {
    /// Collapsed to the launcher bar.
    #[default]
    Closed,
    /// Expanded with the thread visible.
    Open,
}

/// Inputs the panel reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum PanelEvent {
    /// Cmd+I or Ctrl+I.
    Shortcut,
    /// The Escape key.
    Escape,
    /// The header close button.
    CloseButton,
    /// A click on the collapsed launcher.
    OpenRequest,
}

/// Side effects the host performs after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum PanelEffect {
    /// Move keyboard focus into the message input.
    FocusInput,
}

/// Result of feeding one event to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    /// State after the event.
    pub state: PanelState,
    /// Effect to run, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<PanelEffect>,
    /// Whether the key event should not reach the page.
    pub consumed: bool,
}

const TABLE: &[(PanelState, PanelEvent, PanelState, Option<PanelEffect>)] = &[
    (
        PanelState::Closed,
        PanelEvent::Shortcut,
        PanelState::Open,
        Some(PanelEffect::FocusInput),
    ),
    (PanelState::Open, PanelEvent::Shortcut, PanelState::Closed, None),
    (PanelState::Open, PanelEvent::Escape, PanelState::Closed, None),
    (PanelState::Open, PanelEvent::CloseButton, PanelState::Closed, None),
    (
        PanelState::Closed,
        PanelEvent::OpenRequest,
        PanelState::Open,
        Some(PanelEffect::FocusInput),
    ),
    (PanelState::Open, PanelEvent::OpenRequest, PanelState::Open, None),
];

/// Look up the transition for `event` in `state`.
#[must_use]
pub fn transition(state: PanelState, event: PanelEvent) -> Transition {
    TABLE
        .iter()
        .find(|(from, on, _, _)| *from == state && *on == event)
        .map_or(
            Transition {
                state,
                effect: None,
                consumed: false,
            },
            |&(_, _, to, effect)| Transition {
                state: to,
                effect,
                consumed: true,
            },
        )
}

/// Map a key press to a panel event.
///
/// `key` is the DOM `KeyboardEvent.key` value.
#[must_use]
pub fn classify_key(key: &str, meta: bool, ctrl: bool) -> Option<PanelEvent> {
    if (meta || ctrl) && key.eq_ignore_ascii_case("i") {
        Some(PanelEvent::Shortcut)
    } else if key == "Escape" {
        Some(PanelEvent::Escape)
    } else {
        None
    }
}

/// Host platform, as far as shortcut labels are concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Platform {
    /// Apple desktop.
    MacOs,
    /// Anything else.
    Other,
}

impl Platform {
    /// Guess the platform from a `User-Agent` header.
    #[must_use]
    pub fn from_user_agent(user_agent: &str) -> Self {
        if user_agent.contains("Macintosh") || user_agent.contains("Mac OS X") {
            Self::MacOs
        } else {
            Self::Other
        }
    }

    /// Label for the toggle shortcut.
    #[must_use]
    pub const fn shortcut_label(self) -> &'static str {
        match self {
            Self::MacOs => "⌘I",
            Self::Other => "Ctrl+I",
        }
    }
}

/// The panel itself.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChatPanel {
    state: PanelState,
}

impl ChatPanel {
    /// Panel starting in `state`.
    #[must_use]
    pub const fn new(state: PanelState) -> Self {
        Self { state }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> PanelState {
        self.state
    }

    /// Apply `event`.
    pub fn handle(&mut self, event: PanelEvent) -> Transition {
        let outcome = transition(self.state, event);
        self.state = outcome.state;
        outcome
    }

    /// Apply a key press; keys the panel ignores are not consumed.
    pub fn handle_key(&mut self, key: &str, meta: bool, ctrl: bool) -> Transition {
        match classify_key(key, meta, ctrl) {
            Some(event) => self.handle(event),
            None => Transition {
                state: self.state,
                effect: None,
                consumed: false,
            },
        }
    }

    /// Header text for the current state.
    #[must_use]
    pub const fn header_label(&self) -> &'static str {
        match self.state {
            PanelState::Open => "Conversations",
            PanelState::Closed => "Start chatting",
        }
    }
}
