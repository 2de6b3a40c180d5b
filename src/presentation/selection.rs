// Hit testing, hover/selection state and filtered plot views
use crate::domain::dashboard::{Dashboard, SummaryStats};
use crate::domain::plot::{EnrichedPlot, StatusFilter};
use crate::presentation::viewport::Point;
use std::sync::Arc;

/// Hover, selection and filter for one map view.
///
/// Only ids are kept. Plots are looked up against the current dashboard on
/// every access, so the state stays valid when an edit swaps the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub hovered_id: Option<String>,
    pub selected_id: Option<String>,
    pub filter: StatusFilter,
}

impl SelectionState {
    pub fn set_hover(&mut self, plot_id: Option<&str>) {
        self.hovered_id = plot_id.map(str::to_string);
    }

    pub fn set_selection(&mut self, plot_id: Option<&str>) {
        self.selected_id = plot_id.map(str::to_string);
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    /// Click on a plot shape. Selects it unless the gesture was a pan.
    pub fn click_plot(&mut self, plot_id: &str, gesture_was_drag: bool) {
        if !gesture_was_drag {
            self.set_selection(Some(plot_id));
        }
    }

    /// Click on empty map area. Clears the selection unless the gesture was a pan.
    pub fn click_background(&mut self, gesture_was_drag: bool) {
        if !gesture_was_drag {
            self.selected_id = None;
        }
    }

    pub fn hovered_plot<'a>(&self, dashboard: &'a Dashboard) -> Option<&'a Arc<EnrichedPlot>> {
        self.hovered_id.as_deref().and_then(|id| dashboard.find_plot(id))
    }

    pub fn selected_plot<'a>(&self, dashboard: &'a Dashboard) -> Option<&'a Arc<EnrichedPlot>> {
        self.selected_id.as_deref().and_then(|id| dashboard.find_plot(id))
    }

    pub fn display_plot<'a>(&self, dashboard: &'a Dashboard) -> Option<&'a Arc<EnrichedPlot>> {
        display_plot(
            self.hovered_id.as_deref(),
            self.selected_id.as_deref(),
            dashboard,
        )
    }

    /// The displayed plot, but only when it is the selected one; hovering
    /// another plot hides the status controls.
    pub fn editable_plot<'a>(&self, dashboard: &'a Dashboard) -> Option<&'a Arc<EnrichedPlot>> {
        let displayed = self.display_plot(dashboard)?;
        let selected = self.selected_id.as_deref()?;
        (displayed.id() == selected).then_some(displayed)
    }

    /// Plot that gets a floating tooltip: hovered and not already selected.
    pub fn tooltip_plot<'a>(&self, dashboard: &'a Dashboard) -> Option<&'a Arc<EnrichedPlot>> {
        self.hovered_plot(dashboard)
            .filter(|plot| self.selected_id.as_deref() != Some(plot.id()))
    }
}

/// Plots passing `filter` by effective status, in dashboard order.
pub fn visible_plots(dashboard: &Dashboard, filter: StatusFilter) -> Vec<&Arc<EnrichedPlot>> {
    dashboard
        .plots
        .iter()
        .filter(|plot| filter.matches(plot.effective_status()))
        .collect()
}

/// Hovered plot if it resolves, else the selected plot.
pub fn display_plot<'a>(
    hovered_id: Option<&str>,
    selected_id: Option<&str>,
    dashboard: &'a Dashboard,
) -> Option<&'a Arc<EnrichedPlot>> {
    hovered_id
        .and_then(|id| dashboard.find_plot(id))
        .or_else(|| selected_id.and_then(|id| dashboard.find_plot(id)))
}

/// Topmost visible plot containing `content`. Later plots draw over earlier
/// ones, so the search runs back to front.
pub fn hit_test(
    dashboard: &Dashboard,
    filter: StatusFilter,
    content: Point,
) -> Option<&Arc<EnrichedPlot>> {
    let hit = visible_plots(dashboard, filter)
        .into_iter()
        .rev()
        .find(|plot| plot.bbox().contains(content.x, content.y));

    tracing::debug!(
        "Hit test at ({:.1}, {:.1}) -> {:?}",
        content.x,
        content.y,
        hit.map(|p| p.id())
    );
    hit
}

/// Counts by effective status, recomputed from the dashboard on each call.
pub fn summary_stats(dashboard: &Dashboard) -> SummaryStats {
    dashboard.summary()
}
