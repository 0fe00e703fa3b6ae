//! Accordion building blocks for ratatui.
//!
//! Compose a tree from `group`, `item`, `header`, `panel` and `text`, mount
//! it in a [`Host`], and draw it with [`AccordionView`]:
//!
//! ```ignore
//! use termcordion_widgets::{group, section, AccordionState, AccordionView, Host};
//!
//! let host = Host::mount_default(&group([
//!     section("Header 1", "Panel 1"),
//!     section("Header 2", "Panel 2"),
//! ]))?;
//! let mut state = AccordionState::new();
//! frame.render_stateful_widget(AccordionView::new(&host), area, &mut state);
//! ```
//!
//! Each `Group` owns its own registry, so any number of its items can be open
//! at once and toggling one never affects another.

pub mod element;
pub mod host;
pub mod input;
pub mod render;
pub mod style;

pub use element::{group, header, item, panel, section, text, Element, ElementKind};
pub use host::{HeaderHandle, Host, LineKind, RenderedLine};
pub use input::{handle_key, handle_mouse, InputOutcome};
pub use render::{AccordionState, AccordionView};
pub use style::AccordionStyle;

pub use termcordion_core::CompositionError;
