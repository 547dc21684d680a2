//! Field binding for NavGlass displays.
//!
//! Telemetry frames carry flat sections of named measurements. Display
//! elements opt in to a measurement through their id:
//!
//! | id | written content |
//! |---|---|
//! | `mi_<Field>` | raw value of `<Field>` |
//! | `ms_<Field>` | raw value of `<Field>` (string display) |
//! | `mf<d>_<Field>` | `<Field>` with `<d>` decimal places |
//!
//! Only one element per measurement is supported. To show the same
//! measurement twice, derive a copy of it in an augment hook first.
//!
//! # Examples
//!
//! ```
//! use navglass_binding::{ElementTable, MarkerFilter, MessageDispatcher};
//!
//! let mut display = ElementTable::from_ids(["mi_GpsTime", "mf2_Roll"]);
//! let mut dispatcher = MessageDispatcher::new(MarkerFilter::disabled());
//!
//! dispatcher
//!     .on_frame(&mut display, r#"{"nav": {"GpsTime": 1234, "Roll": 0.5678}}"#)
//!     .unwrap();
//!
//! assert_eq!(display.content("mi_GpsTime"), Some("1234"));
//! assert_eq!(display.content("mf2_Roll"), Some("0.57"));
//! ```

#![warn(missing_docs)]

pub mod binder;
pub mod directive;
pub mod dispatcher;
pub mod document;
pub mod format;
pub mod frame;

pub use binder::{BindOutcome, Binder};
pub use directive::BindingDirective;
pub use dispatcher::{
    AugmentHook, DispatchError, DispatchHooks, DispatchReport, MessageDispatcher, PostUpdateHook,
};
pub use document::{Document, Element, ElementTable};
pub use format::{FormatError, FormatFailure};
pub use frame::{Frame, MarkerFilter, Section, SectionMapping, MARKER_ID_FIELD};
