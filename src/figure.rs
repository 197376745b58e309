//! Headless figures: a grid of titled panels written as SVG.
//!
//! Image panels are stored as PNG files next to the SVG (`<name>_files/NN.png`)
//! and referenced by relative path; histogram panels are drawn as bars.

use anyhow::{bail, Context, Result};
use image::{DynamicImage, ImageFormat};
use std::fs;
use std::path::{Path, PathBuf};

const CELL_SIZE: f64 = 240.0;
const CELL_PADDING: f64 = 10.0;
const PANEL_TITLE_HEIGHT: f64 = 24.0;
const FIGURE_TITLE_HEIGHT: f64 = 44.0;

const COLOR_TEXT: &str = "#2c3e50";
const COLOR_BAR: &str = "#3498db";
const COLOR_FRAME: &str = "#ecf0f1";

/// What a panel shows
#[derive(Debug, Clone)]
pub enum PanelContent {
    Image(DynamicImage),
    Histogram(Box<[u32; 256]>),
}

/// A titled cell of a figure
#[derive(Debug, Clone)]
pub struct Panel {
    pub title: String,
    pub content: PanelContent,
}

impl Panel {
    pub fn image(title: impl Into<String>, image: impl Into<DynamicImage>) -> Self {
        Self {
            title: title.into(),
            content: PanelContent::Image(image.into()),
        }
    }

    pub fn histogram(title: impl Into<String>, bins: [u32; 256]) -> Self {
        Self {
            title: title.into(),
            content: PanelContent::Histogram(Box::new(bins)),
        }
    }
}

/// Grid of panels with an optional super-title
#[derive(Debug, Clone)]
pub struct Figure {
    title: Option<String>,
    rows: usize,
    cols: usize,
    cell_size: f64,
    panels: Vec<Option<Panel>>,
}

impl Figure {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            title: None,
            rows,
            cols,
            cell_size: CELL_SIZE,
            panels: vec![None; rows * cols],
        }
    }

    /// Smallest grid with `cols` columns that holds `count` panels
    pub fn for_count(count: usize, cols: usize) -> Self {
        let cols = cols.max(1);
        Self::new(count.div_ceil(cols).max(1), cols)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_cell_size(mut self, cell_size: f64) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Place a panel at a 0-based, row-major grid position
    pub fn set(&mut self, index: usize, panel: Panel) -> Result<()> {
        if index >= self.panels.len() {
            bail!(
                "Panel index {} out of range for a {}x{} figure",
                index,
                self.rows,
                self.cols
            );
        }
        self.panels[index] = Some(panel);
        Ok(())
    }

    /// Place a panel in the first free position
    pub fn push(&mut self, panel: Panel) -> Result<()> {
        match self.panels.iter().position(Option::is_none) {
            Some(index) => self.set(index, panel),
            None => bail!("Figure is full ({} panels)", self.panels.len()),
        }
    }

    /// Panels that have been placed, in grid order
    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.panels.iter().flatten()
    }

    /// Write `<name>.svg` and its image assets into `dir`; returns the SVG path
    pub fn save(&self, dir: &Path, name: &str) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create figure directory: {}", dir.display()))?;

        let assets_name = format!("{}_files", name);
        let assets_dir = dir.join(&assets_name);

        let title_height = if self.title.is_some() { FIGURE_TITLE_HEIGHT } else { 0.0 };
        let width = self.cols as f64 * self.cell_size;
        let height = title_height + self.rows as f64 * self.cell_size;

        let mut svg = String::new();
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" width="{}" height="{}">"#,
            width, height, width, height
        ));
        svg.push_str(&format!(r#"<rect width="{}" height="{}" fill="white"/>"#, width, height));

        if let Some(title) = &self.title {
            svg.push_str(&format!(
                r#"<text x="{}" y="30" text-anchor="middle" font-family="Arial, sans-serif" font-size="20" font-weight="bold" fill="{}">{}</text>"#,
                width / 2.0, COLOR_TEXT, escape_xml(title)
            ));
        }

        for (index, panel) in self.panels.iter().enumerate() {
            let Some(panel) = panel else {
                continue;
            };

            let x = (index % self.cols) as f64 * self.cell_size;
            let y = title_height + (index / self.cols) as f64 * self.cell_size;
            let inner_x = x + CELL_PADDING;
            let inner_y = y + PANEL_TITLE_HEIGHT;
            let inner_w = self.cell_size - 2.0 * CELL_PADDING;
            let inner_h = self.cell_size - PANEL_TITLE_HEIGHT - CELL_PADDING;

            svg.push_str(&format!(
                r#"<text x="{}" y="{}" text-anchor="middle" font-family="Arial, sans-serif" font-size="13" fill="{}">{}</text>"#,
                x + self.cell_size / 2.0, y + 17.0, COLOR_TEXT, escape_xml(&panel.title)
            ));

            match &panel.content {
                PanelContent::Image(image) => {
                    fs::create_dir_all(&assets_dir).with_context(|| {
                        format!("Failed to create figure directory: {}", assets_dir.display())
                    })?;
                    let file_name = format!("{:02}.png", index + 1);
                    let asset_path = assets_dir.join(&file_name);
                    image
                        .save_with_format(&asset_path, ImageFormat::Png)
                        .with_context(|| format!("Failed to save panel: {}", asset_path.display()))?;

                    svg.push_str(&format!(
                        r#"<image href="{}/{}" x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="xMidYMid meet"/>"#,
                        escape_xml(&assets_name), file_name, inner_x, inner_y, inner_w, inner_h
                    ));
                }
                PanelContent::Histogram(bins) => {
                    svg.push_str(&histogram_bars(bins, inner_x, inner_y, inner_w, inner_h));
                }
            }
        }

        svg.push_str("</svg>");

        let svg_path = dir.join(format!("{}.svg", name));
        fs::write(&svg_path, svg)
            .with_context(|| format!("Failed to write figure: {}", svg_path.display()))?;
        Ok(svg_path)
    }
}

fn histogram_bars(bins: &[u32; 256], x: f64, y: f64, width: f64, height: f64) -> String {
    let mut svg = format!(
        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{}"/>"#,
        x, y, width, height, COLOR_FRAME
    );

    let max = bins.iter().copied().max().unwrap_or(0);
    if max == 0 {
        return svg;
    }

    let bar_width = width / bins.len() as f64;
    for (i, &count) in bins.iter().enumerate() {
        if count == 0 {
            continue;
        }
        let bar_height = height * count as f64 / max as f64;
        svg.push_str(&format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"/>"#,
            x + i as f64 * bar_width,
            y + height - bar_height,
            bar_width,
            bar_height,
            COLOR_BAR
        ));
    }
    svg
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
