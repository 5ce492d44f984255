use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints};
use nalgebra::DMatrix;

use crate::color::param_color;
use crate::data::chain::{Chain, DEFAULT_BURN_FRACTION};
use crate::error::{Error, Result};
use crate::stats::Histogram;

/// Subplots per row once there is more than one parameter.
pub const GRID_COLUMNS: usize = 4;

/// Height of one subplot row in points.
const ROW_HEIGHT: f32 = 140.0;
const TITLE_SIZE: f32 = 11.0;

// ---------------------------------------------------------------------------
// Grid layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    pub nrows: usize,
    pub ncols: usize,
}

/// Subplot grid for `ndim` parameters: four columns, as many rows as needed;
/// a single cell when there is at most one parameter.
pub fn grid_shape(ndim: usize) -> GridShape {
    if ndim > 1 {
        GridShape {
            nrows: ndim.div_ceil(GRID_COLUMNS),
            ncols: GRID_COLUMNS,
        }
    } else {
        GridShape { nrows: 1, ncols: 1 }
    }
}

// ---------------------------------------------------------------------------
// Plot options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceOptions {
    pub line_width: f32,
    /// Fixed colour for every trace; `None` gives each parameter its own.
    pub color: Option<Color32>,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            color: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistOptions {
    pub bins: usize,
    /// Normalise to unit area instead of raw counts.
    pub density: bool,
    pub color: Option<Color32>,
}

impl Default for HistOptions {
    fn default() -> Self {
        Self {
            bins: 50,
            density: true,
            color: None,
        }
    }
}

/// One histogram bar: bin centre, height, bin width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistBar {
    pub center: f64,
    pub height: f64,
    pub width: f64,
}

// ---------------------------------------------------------------------------
// PostProcessing
// ---------------------------------------------------------------------------

/// A burned-in chain with one name per plotted column.
#[derive(Debug, Clone)]
pub struct PostProcessing {
    chain: Chain,
    /// Palette index of each plotted column, so a parameter keeps its
    /// colour when only a subset of the full chain is shown.
    color_keys: Vec<usize>,
}

impl PostProcessing {
    /// Discard `floor(burn_fraction * nsamples)` leading draws.
    pub fn new(samples: DMatrix<f64>, pars: Vec<String>, burn_fraction: f64) -> Result<Self> {
        Self::from_chain(&Chain::new(samples, pars)?, burn_fraction)
    }

    /// Same as [`PostProcessing::new`] with the default 25 % burn-in.
    pub fn with_default_burn(samples: DMatrix<f64>, pars: Vec<String>) -> Result<Self> {
        Self::new(samples, pars, DEFAULT_BURN_FRACTION)
    }

    pub fn from_chain(chain: &Chain, burn_fraction: f64) -> Result<Self> {
        let chain = chain.burn(burn_fraction)?;
        let color_keys = (0..chain.params.len()).collect();
        Ok(Self { chain, color_keys })
    }

    /// Colour column `i` as parameter `keys[i]` of the full chain.
    pub fn with_color_keys(mut self, keys: Vec<usize>) -> Result<Self> {
        if keys.len() != self.ndim() {
            return Err(Error::shape("colour keys", self.ndim(), keys.len()));
        }
        self.color_keys = keys;
        Ok(self)
    }

    /// Default plot colour of column `idx`.
    pub fn color(&self, idx: usize) -> Color32 {
        param_color(self.color_keys.get(idx).copied().unwrap_or(idx))
    }

    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    pub fn pars(&self) -> &[String] {
        &self.chain.params
    }

    pub fn ndim(&self) -> usize {
        self.chain.params.len()
    }

    pub fn grid(&self) -> GridShape {
        grid_shape(self.ndim())
    }

    /// `(draw index, value)` pairs of one parameter.
    pub fn trace_points(&self, idx: usize) -> Result<Vec<[f64; 2]>> {
        Ok(self
            .chain
            .column(idx)?
            .into_iter()
            .enumerate()
            .map(|(i, v)| [i as f64, v])
            .collect())
    }

    /// Histogram bars of one parameter.
    pub fn hist_bars(&self, idx: usize, opts: &HistOptions) -> Result<Vec<HistBar>> {
        let values = self.chain.column(idx)?;
        let hist = Histogram::new(&values, opts.bins)?;
        let heights: Vec<f64> = if opts.density {
            hist.densities()
        } else {
            hist.counts.iter().map(|&c| c as f64).collect()
        };
        Ok(hist
            .centers()
            .into_iter()
            .zip(hist.widths())
            .zip(heights)
            .map(|((center, width), height)| HistBar {
                center,
                height,
                width,
            })
            .collect())
    }

    /// Draw the raw sample sequence of every parameter in a grid.
    pub fn plot_trace(&self, ui: &mut Ui, opts: &TraceOptions) {
        self.draw_grid(ui, "trace", |ui, idx, name, size| {
            let points = match self.trace_points(idx) {
                Ok(p) => p,
                Err(e) => {
                    log::error!("trace of {name}: {e}");
                    return;
                }
            };
            let color = opts.color.unwrap_or_else(|| self.color(idx));
            Plot::new(("trace", idx))
                .width(size.x)
                .height(size.y)
                .allow_scroll(false)
                .show(ui, |plot_ui| {
                    plot_ui.line(
                        Line::new(PlotPoints::from(points))
                            .color(color)
                            .width(opts.line_width),
                    );
                });
        });
    }

    /// Draw a histogram of every parameter in a grid.
    pub fn plot_hist(&self, ui: &mut Ui, opts: &HistOptions) {
        self.draw_grid(ui, "hist", |ui, idx, name, size| {
            let bars = match self.hist_bars(idx, opts) {
                Ok(b) => b,
                Err(e) => {
                    log::error!("histogram of {name}: {e}");
                    return;
                }
            };
            let color = opts.color.unwrap_or_else(|| self.color(idx));
            let chart = BarChart::new(
                bars.iter()
                    .map(|b| Bar::new(b.center, b.height).width(b.width))
                    .collect(),
            )
            .color(color);
            Plot::new(("hist", idx))
                .width(size.x)
                .height(size.y)
                .allow_scroll(false)
                .show(ui, |plot_ui| plot_ui.bar_chart(chart));
        });
    }

    /// Lay out one titled cell per parameter and let `draw` fill it.
    fn draw_grid<F>(&self, ui: &mut Ui, id: &str, mut draw: F)
    where
        F: FnMut(&mut Ui, usize, &str, egui::Vec2),
    {
        let shape = self.grid();
        let spacing = ui.spacing().item_spacing.x;
        let cell = egui::vec2(
            ((ui.available_width() - spacing * (shape.ncols as f32 + 1.0)) / shape.ncols as f32).max(80.0),
            ROW_HEIGHT,
        );

        egui::ScrollArea::vertical()
            .id_salt(id)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                egui::Grid::new(id).num_columns(shape.ncols).show(ui, |ui| {
                    for (idx, name) in self.pars().iter().enumerate() {
                        ui.vertical(|ui| {
                            ui.label(RichText::new(name).size(TITLE_SIZE));
                            draw(ui, idx, name, cell);
                        });
                        if (idx + 1) % shape.ncols == 0 {
                            ui.end_row();
                        }
                    }
                });
            });
    }
}
