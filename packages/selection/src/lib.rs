#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Two-mode property/area selection state machine.
//!
//! [`SelectionState`] is a plain value: it changes only through
//! [`SelectionState::apply`], which maps an interaction event to the next
//! state. Events that do not fit the current mode are ignored, never
//! rejected, so rapid or ambiguous input always leaves a valid state.
//!
//! At any time the focus is either nothing, a property (in property mode)
//! or an area with its statistics (in area mode), and the detail panel is
//! visible exactly when something is focused.

use estate_map_analytics_models::AreaStatistics;
use estate_map_property_models::{AreaFeature, PropertyRecord};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Which kind of entity the map currently lets the user select.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Mode {
    /// Individual property markers.
    #[default]
    Property,
    /// Administrative area polygons.
    Area,
}

/// A selected area together with the statistics computed when it was
/// selected. `statistics` is `None` when the area holds no properties or
/// its geometry could not be tested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaFocus {
    /// The selected area.
    pub area: AreaFeature,
    /// Statistics over the properties inside the area.
    pub statistics: Option<AreaStatistics>,
}

/// The entity shown in the detail panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Focus {
    /// A single property.
    Property(PropertyRecord),
    /// An area and its statistics.
    Area(AreaFocus),
}

impl Focus {
    /// The mode this focus belongs to.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        match self {
            Self::Property(_) => Mode::Property,
            Self::Area(_) => Mode::Area,
        }
    }
}

/// Interaction events the presentation layer feeds into the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    /// A property marker was clicked.
    SelectMarker(PropertyRecord),
    /// An area polygon was clicked and its statistics computed.
    SelectArea(AreaFocus),
    /// The user switched between property and area mode.
    SwitchMode(Mode),
    /// A click landed on the map outside the detail panel.
    Dismiss,
    /// The panel's close control was used.
    ClosePanel,
}

/// What an event did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Transition {
    /// Something is now focused and the panel is open.
    Focused,
    /// Focus was cleared and the panel closed.
    Cleared,
    /// The event did not apply to the current mode.
    Ignored,
}

/// The interaction state of one map session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    mode: Mode,
    focus: Option<Focus>,
    panel_visible: bool,
}

impl SelectionState {
    /// Initial state: property mode, nothing focused, panel hidden.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Currently focused entity.
    #[must_use]
    pub const fn focus(&self) -> Option<&Focus> {
        self.focus.as_ref()
    }

    /// Whether the detail panel is open.
    #[must_use]
    pub const fn panel_visible(&self) -> bool {
        self.panel_visible
    }

    /// The focused property, if any.
    #[must_use]
    pub const fn selected_property(&self) -> Option<&PropertyRecord> {
        match &self.focus {
            Some(Focus::Property(property)) => Some(property),
            _ => None,
        }
    }

    /// The focused area, if any.
    #[must_use]
    pub const fn selected_area(&self) -> Option<&AreaFocus> {
        match &self.focus {
            Some(Focus::Area(area)) => Some(area),
            _ => None,
        }
    }

    /// Whether `property` has the same identity as the focused property.
    #[must_use]
    pub fn is_property_selected(&self, property: &PropertyRecord) -> bool {
        self.selected_property()
            .is_some_and(|focused| focused.same_identity(property))
    }

    /// Whether the area named `name` is the focused area.
    #[must_use]
    pub fn is_area_selected(&self, name: &str) -> bool {
        self.selected_area().is_some_and(|focus| focus.area.name == name)
    }

    /// Whether the focus matches the mode and the panel matches the focus.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let kind_matches = self.focus.as_ref().is_none_or(|f| f.mode() == self.mode);
        kind_matches && self.panel_visible == self.focus.is_some()
    }

    /// Returns the state after `event`, leaving `self` untouched.
    #[must_use]
    pub fn next(&self, event: SelectionEvent) -> Self {
        let mut next = self.clone();
        next.apply(event);
        next
    }

    /// Applies `event` in place and reports what it did.
    pub fn apply(&mut self, event: SelectionEvent) -> Transition {
        let transition = match event {
            SelectionEvent::SelectMarker(property) => self.select_marker(property),
            SelectionEvent::SelectArea(area) => self.select_area(area),
            SelectionEvent::SwitchMode(mode) => {
                log::debug!("Switching selection mode {} -> {mode}", self.mode);
                self.mode = mode;
                self.clear()
            }
            SelectionEvent::Dismiss | SelectionEvent::ClosePanel => self.clear(),
        };

        debug_assert!(self.is_consistent(), "inconsistent selection: {self:?}");
        transition
    }

    fn select_marker(&mut self, property: PropertyRecord) -> Transition {
        if self.mode != Mode::Property {
            log::debug!("Ignoring marker '{}' in {} mode", property.name, self.mode);
            return Transition::Ignored;
        }

        if self.is_property_selected(&property) {
            return self.clear();
        }

        self.set_focus(Focus::Property(property))
    }

    fn select_area(&mut self, area: AreaFocus) -> Transition {
        if self.mode != Mode::Area {
            log::debug!("Ignoring area '{}' in {} mode", area.area.name, self.mode);
            return Transition::Ignored;
        }

        self.set_focus(Focus::Area(area))
    }

    fn set_focus(&mut self, focus: Focus) -> Transition {
        self.focus = Some(focus);
        self.panel_visible = true;
        Transition::Focused
    }

    fn clear(&mut self) -> Transition {
        self.focus = None;
        self.panel_visible = false;
        Transition::Cleared
    }
}
