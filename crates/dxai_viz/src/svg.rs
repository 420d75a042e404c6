//! SVG rendering of the summary matrices.

use std::fmt::Write as _;
use std::path::Path;

use dxai_analysis::{CoverageMatrix, KeywordStatus, RougeMatrix};

use crate::colormap::{hex, status_color, text_color, yl_gn_bu};
use crate::error::{Result, VizError};

/// Title of the keyword coverage figure.
pub const COVERAGE_TITLE: &str = "Model Performance Summary";
/// Title of the ROUGE figure.
pub const ROUGE_TITLE: &str = "ROUGE Score Performance Matrix";

const FONT: &str = "DejaVu Sans, Arial, sans-serif";
const CHAR_WIDTH: usize = 7;
const ROW_HEIGHT: usize = 32;
const TITLE_HEIGHT: usize = 60;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Minimal SVG document builder.
struct Svg {
    width: usize,
    height: usize,
    body: String,
}

impl Svg {
    fn new(width: usize, height: usize) -> Self {
        let mut svg = Self {
            width,
            height,
            body: String::new(),
        };
        svg.rect(0, 0, width, height, "white", None);
        svg
    }

    fn rect(&mut self, x: usize, y: usize, w: usize, h: usize, fill: &str, stroke: Option<&str>) {
        let stroke = stroke
            .map(|s| format!(r#" stroke="{s}" stroke-width="1""#))
            .unwrap_or_default();
        let _ = writeln!(
            self.body,
            r#"<rect x="{x}" y="{y}" width="{w}" height="{h}" fill="{fill}"{stroke}/>"#
        );
    }

    fn text(&mut self, x: usize, y: usize, size: usize, anchor: &str, fill: &str, text: &str) {
        let _ = writeln!(
            self.body,
            r#"<text x="{x}" y="{y}" font-size="{size}" text-anchor="{anchor}" dominant-baseline="middle" fill="{fill}">{}</text>"#,
            escape(text)
        );
    }

    fn rotated_text(&mut self, x: usize, y: usize, size: usize, angle: i32, anchor: &str, text: &str) {
        let _ = writeln!(
            self.body,
            r#"<text transform="translate({x},{y}) rotate({angle})" font-size="{size}" text-anchor="{anchor}" fill="black">{}</text>"#,
            escape(text)
        );
    }

    fn finish(self) -> String {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" font-family=\"{FONT}\">\n{}</svg>\n",
            self.body,
            w = self.width,
            h = self.height
        )
    }
}

fn label_width(labels: &[String]) -> usize {
    labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) * CHAR_WIDTH + 20
}

/// Keyword coverage as an annotated grid.
///
/// Keywords run along the top at 45°, cases down the left side; height grows
/// with the number of cases.
pub fn coverage_svg(matrix: &CoverageMatrix) -> Result<String> {
    if matrix.is_empty() || matrix.keywords.is_empty() {
        return Err(VizError::Empty("coverage matrix".to_string()));
    }

    let cell_w = 72;
    let left = 50 + label_width(&matrix.cases);
    let header = TITLE_HEIGHT + 30 + label_width(&matrix.keywords) * 7 / 10;
    let grid_w = cell_w * matrix.keywords.len();
    let grid_h = ROW_HEIGHT * matrix.n_cases();
    let legend_w = 160;
    let width = left + grid_w + legend_w + 40;
    let height = (header + grid_h + 40).max(400);

    let mut svg = Svg::new(width, height);
    svg.text(width / 2, 24, 18, "middle", "black", COVERAGE_TITLE);
    svg.text(left + grid_w / 2, 52, 14, "middle", "black", "Clinical Keywords");
    svg.rotated_text(18, header + grid_h / 2, 14, -90, "middle", "Test Cases");

    for (col, keyword) in matrix.keywords.iter().enumerate() {
        let x = left + col * cell_w + cell_w / 2;
        svg.rotated_text(x, header - 8, 12, -45, "start", keyword);
    }

    for (row, (case, statuses)) in matrix.cases.iter().zip(&matrix.cells).enumerate() {
        let y = header + row * ROW_HEIGHT;
        svg.text(left - 8, y + ROW_HEIGHT / 2, 12, "end", "black", case);
        for (col, status) in statuses.iter().enumerate() {
            let x = left + col * cell_w;
            svg.rect(x, y, cell_w, ROW_HEIGHT, status_color(*status), Some("white"));
            let fill = if *status == KeywordStatus::Mentioned {
                "white"
            } else {
                "black"
            };
            svg.text(x + cell_w / 2, y + ROW_HEIGHT / 2, 10, "middle", fill, status.label());
        }
    }

    let legend_x = left + grid_w + 30;
    svg.text(legend_x, header, 13, "start", "black", "Keyword Status");
    for (i, status) in KeywordStatus::ALL.iter().enumerate() {
        let y = header + 16 + i * 26;
        svg.rect(legend_x, y, 18, 18, status_color(*status), Some("black"));
        svg.text(legend_x + 26, y + 9, 12, "start", "black", status.label());
    }

    Ok(svg.finish())
}

/// ROUGE F-measures as an annotated YlGnBu grid with a colour bar.
pub fn rouge_svg(matrix: &RougeMatrix) -> Result<String> {
    if matrix.is_empty() {
        return Err(VizError::Empty("ROUGE matrix".to_string()));
    }

    let cell_w = 110;
    let left = 50 + label_width(&matrix.cases);
    let header = TITLE_HEIGHT + 40;
    let grid_w = cell_w * matrix.metrics().len();
    let grid_h = ROW_HEIGHT * matrix.n_cases();
    let width = left + grid_w + 170;
    let height = (header + grid_h + 80).max(360);

    let mut svg = Svg::new(width, height);
    svg.text(width / 2, 24, 18, "middle", "black", ROUGE_TITLE);
    svg.text(left + grid_w / 2, height - 24, 14, "middle", "black", "ROUGE Metric Type");
    svg.rotated_text(18, header + grid_h / 2, 14, -90, "middle", "Test Cases");

    for (col, metric) in matrix.metrics().iter().enumerate() {
        svg.text(left + col * cell_w + cell_w / 2, header - 14, 12, "middle", "black", metric);
    }

    for (row, (case, scores)) in matrix.cases.iter().zip(&matrix.scores).enumerate() {
        let y = header + row * ROW_HEIGHT;
        svg.text(left - 8, y + ROW_HEIGHT / 2, 12, "end", "black", case);
        for (col, value) in scores.values().iter().enumerate() {
            let x = left + col * cell_w;
            let rgb = yl_gn_bu(*value as f32);
            svg.rect(x, y, cell_w, ROW_HEIGHT, &hex(rgb), Some("white"));
            svg.text(
                x + cell_w / 2,
                y + ROW_HEIGHT / 2,
                11,
                "middle",
                text_color(rgb),
                &format!("{:.3}", value),
            );
        }
    }

    // Colour bar
    let bar_x = left + grid_w + 30;
    let bar_h = grid_h.max(200);
    let steps = 50;
    for i in 0..steps {
        let value = 1.0 - i as f32 / steps as f32;
        let y = header + i * bar_h / steps;
        let h = header + (i + 1) * bar_h / steps - y;
        svg.rect(bar_x, y, 20, h, &hex(yl_gn_bu(value)), None);
    }
    svg.rect(bar_x, header, 20, bar_h, "none", Some("black"));
    for tick in 0..=5 {
        let y = header + bar_h - tick * bar_h / 5;
        svg.text(bar_x + 26, y, 10, "start", "black", &format!("{:.1}", tick as f32 / 5.0));
    }
    svg.rotated_text(
        bar_x + 70,
        header + bar_h / 2,
        12,
        90,
        "middle",
        "ROUGE F1-Score (0 to 1)",
    );

    Ok(svg.finish())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

/// Render and write the coverage figure.
pub fn save_coverage_svg(path: impl AsRef<Path>, matrix: &CoverageMatrix) -> Result<()> {
    write_file(path.as_ref(), &coverage_svg(matrix)?)
}

/// Render and write the ROUGE figure.
pub fn save_rouge_svg(path: impl AsRef<Path>, matrix: &RougeMatrix) -> Result<()> {
    write_file(path.as_ref(), &rouge_svg(matrix)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dxai_core::RougeScores;

    fn coverage(n_cases: usize) -> CoverageMatrix {
        CoverageMatrix {
            cases: (0..n_cases).map(|i| format!("case_{i:02}")).collect(),
            keywords: vec!["central incisor".to_string(), "crown".to_string()],
            cells: (0..n_cases)
                .map(|_| vec![KeywordStatus::Omission, KeywordStatus::Mentioned])
                .collect(),
        }
    }

    fn height(svg: &str) -> usize {
        let start = svg.find("height=\"").unwrap() + 8;
        let end = start + svg[start..].find('"').unwrap();
        svg[start..end].parse().unwrap()
    }

    #[test]
    fn test_coverage_svg_contents() {
        let svg = coverage_svg(&coverage(2)).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(COVERAGE_TITLE));
        assert!(svg.contains("Clinical Keywords"));
        assert!(svg.contains("Test Cases"));
        assert!(svg.contains("rotate(-45)"));
        assert!(svg.contains("#FFC107"));
        assert!(svg.contains(">case_01<"));
        assert!(svg.contains(">N/A<"));
    }

    #[test]
    fn test_coverage_height_grows() {
        let small = height(&coverage_svg(&coverage(2)).unwrap());
        let large = height(&coverage_svg(&coverage(40)).unwrap());
        assert!(large > small);
    }

    #[test]
    fn test_empty_matrix_rejected() {
        assert!(matches!(coverage_svg(&coverage(0)), Err(VizError::Empty(_))));
        let rouge = RougeMatrix {
            cases: vec![],
            scores: vec![],
        };
        assert!(rouge_svg(&rouge).is_err());
    }

    #[test]
    fn test_rouge_svg_contents() {
        let matrix = RougeMatrix {
            cases: vec!["a<b".to_string()],
            scores: vec![RougeScores {
                rouge1: 0.5,
                rouge2: 0.125,
                rouge_l: 1.0,
            }],
        };
        let svg = rouge_svg(&matrix).unwrap();
        assert!(svg.contains(ROUGE_TITLE));
        assert!(svg.contains("ROUGE Metric Type"));
        assert!(svg.contains("ROUGE F1-Score (0 to 1)"));
        assert!(svg.contains(">0.125<"));
        assert!(svg.contains(">rougeL<"));
        assert!(svg.contains("a&lt;b"));
    }

    #[test]
    fn test_save_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary").join("coverage.svg");
        save_coverage_svg(&path, &coverage(1)).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains(COVERAGE_TITLE));
    }
}
