// Map session - Interactive state for one open dashboard
use crate::application::status_editor;
use crate::domain::dashboard::{Dashboard, SummaryStats};
use crate::domain::error::DomainError;
use crate::domain::plot::{BoundingBox, EnrichedPlot, PlotStatus, StatusFilter};
use crate::presentation::selection::{self, SelectionState};
use crate::presentation::viewport::{Point, ViewportController};
use std::sync::Arc;

/// Offset of the floating tooltip from the cursor, in screen pixels
const TOOLTIP_OFFSET_PX: f64 = 15.0;
/// Padding around a selected plot's highlight ring, in content units
const HIGHLIGHT_PADDING: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    #[allow(dead_code)]
    Secondary,
}

/// What a pointer release ended up clicking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    Plot(String),
    Background,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotLabel {
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
}

/// Render data for one plot shape, in content units.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotOverlay {
    pub id: String,
    pub bbox: BoundingBox,
    pub status: PlotStatus,
    pub selected: bool,
    pub hovered: bool,
    pub stroke_width: f64,
    pub highlight: Option<BoundingBox>,
    pub label: Option<PlotLabel>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub plot_id: String,
    /// Screen position of the tooltip's top-left corner
    pub position: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapOverlay {
    pub plots: Vec<PlotOverlay>,
    pub tooltip: Option<Tooltip>,
}

/// Owns the current dashboard snapshot together with the viewport and the
/// selection state, and routes pointer input to them.
#[derive(Debug, Clone)]
pub struct MapSession {
    dashboard: Arc<Dashboard>,
    viewport: ViewportController,
    selection: SelectionState,
    cursor: Point,
    primary_down: bool,
}

impl MapSession {
    pub fn new(dashboard: impl Into<Arc<Dashboard>>, width: f64, height: f64) -> Self {
        Self {
            dashboard: dashboard.into(),
            viewport: ViewportController::new(width, height),
            selection: SelectionState::default(),
            cursor: Point::default(),
            primary_down: false,
        }
    }

    /// Current snapshot. Earlier snapshots handed out stay unchanged.
    pub fn dashboard(&self) -> Arc<Dashboard> {
        Arc::clone(&self.dashboard)
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.selection.set_filter(filter);
    }

    pub fn select(&mut self, plot_id: Option<&str>) {
        self.selection.set_selection(plot_id);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset_view();
    }

    pub fn wheel(&mut self, screen: Point, delta_y: f64) {
        self.viewport.wheel(screen, delta_y);
    }

    pub fn pointer_pressed(&mut self, screen: Point, button: PointerButton) {
        if button != PointerButton::Primary {
            return;
        }
        self.primary_down = true;
        self.cursor = screen;
        self.viewport.begin_pan(screen);
    }

    pub fn pointer_moved(&mut self, screen: Point) {
        self.cursor = screen;
        if self.viewport.is_panning() {
            self.viewport.continue_pan(screen);
        }

        let hovered = self
            .plot_at(screen)
            .map(|plot| plot.id().to_string());
        self.selection.set_hover(hovered.as_deref());
    }

    /// Ends the gesture and delivers the click: to the plot under the pointer
    /// if there is one, otherwise to the background.
    pub fn pointer_released(&mut self, screen: Point) -> Option<ClickTarget> {
        self.viewport.end_pan();
        if !std::mem::take(&mut self.primary_down) {
            return None;
        }

        let dragged = self.viewport.was_dragged();
        match self.plot_at(screen).map(|plot| plot.id().to_string()) {
            Some(plot_id) => {
                self.selection.click_plot(&plot_id, dragged);
                Some(ClickTarget::Plot(plot_id))
            }
            None => {
                self.selection.click_background(dragged);
                Some(ClickTarget::Background)
            }
        }
    }

    /// Pointer left the map: the gesture ends without a click.
    pub fn pointer_left(&mut self) {
        self.viewport.end_pan();
        self.primary_down = false;
        self.selection.set_hover(None);
    }

    pub fn plot_at(&self, screen: Point) -> Option<&Arc<EnrichedPlot>> {
        let content = self.viewport.screen_to_content(screen);
        selection::hit_test(&self.dashboard, self.selection.filter, content)
    }

    pub fn display_plot(&self) -> Option<&Arc<EnrichedPlot>> {
        self.selection.display_plot(&self.dashboard)
    }

    pub fn editable_plot(&self) -> Option<&Arc<EnrichedPlot>> {
        self.selection.editable_plot(&self.dashboard)
    }

    pub fn summary(&self) -> SummaryStats {
        selection::summary_stats(&self.dashboard)
    }

    /// Swaps in a copy of the dashboard with the plot's status changed.
    pub fn edit_status(&mut self, plot_id: &str, status: PlotStatus) -> Result<(), DomainError> {
        let updated = status_editor::set_status(&self.dashboard, plot_id, status)?;
        self.dashboard = Arc::new(updated);
        Ok(())
    }

    pub fn overlay(&self) -> MapOverlay {
        let stroke = self.viewport.stroke_width();
        let selected_stroke = self.viewport.selected_stroke_width();
        let font_size = self.viewport.label_font_size();
        let selected_id = self.selection.selected_id.as_deref();
        let hovered_id = self.selection.hovered_id.as_deref();

        let plots = selection::visible_plots(&self.dashboard, self.selection.filter)
            .into_iter()
            .map(|plot| {
                let bbox = *plot.bbox();
                let selected = selected_id == Some(plot.id());
                let label = self.viewport.label_visible(&bbox).then(|| {
                    let (x, y) = bbox.center();
                    PlotLabel { x, y, font_size }
                });
                let highlight = selected.then(|| {
                    BoundingBox::new(
                        bbox.ymin - HIGHLIGHT_PADDING,
                        bbox.xmin - HIGHLIGHT_PADDING,
                        bbox.ymin + bbox.height() + HIGHLIGHT_PADDING,
                        bbox.xmin + bbox.width() + HIGHLIGHT_PADDING,
                    )
                });

                PlotOverlay {
                    id: plot.id().to_string(),
                    bbox,
                    status: plot.effective_status(),
                    selected,
                    hovered: hovered_id == Some(plot.id()),
                    stroke_width: if selected { selected_stroke } else { stroke },
                    highlight,
                    label,
                }
            })
            .collect();

        let tooltip = self
            .selection
            .tooltip_plot(&self.dashboard)
            .map(|plot| Tooltip {
                plot_id: plot.id().to_string(),
                position: Point::new(
                    self.cursor.x + TOOLTIP_OFFSET_PX,
                    self.cursor.y + TOOLTIP_OFFSET_PX,
                ),
            });

        MapOverlay { plots, tooltip }
    }
}
