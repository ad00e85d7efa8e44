//! Presentation view-models built from query state

mod empty_state;
mod page;
mod panel;

pub use empty_state::EmptyState;
pub use page::{DashboardPage, NamedPanel, PageKind};
pub use panel::{Panel, PanelContext};
