//! Table detection from text alignment (stream mode).
//!
//! Tables are found without ruling lines: spans are grouped into rows by
//! baseline, column edges are the left-edge positions that recur across
//! rows, and runs of rows aligned to those edges become table regions.

use std::collections::{HashMap, HashSet};

use crate::model::{BBox, TableRegion};

use super::layout::TextSpan;

/// Left edges within this many points share a bucket.
const EDGE_BUCKET: f32 = 5.0;

/// A span is aligned to a column when its left edge is this close.
const ALIGN_TOLERANCE: f32 = 5.0;

/// A detected table, still in PDF coordinates.
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// Column left edges (X coordinates)
    pub columns: Vec<f32>,
    /// Rows of spans, top row first
    pub rows: Vec<TableRowData>,
}

/// A row of text spans in a table.
#[derive(Debug, Clone)]
pub struct TableRowData {
    /// Mean baseline of this row
    pub y: f32,
    /// Spans in this row, sorted by X
    pub spans: Vec<TextSpan>,
}

impl DetectedTable {
    fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.rows.iter().flat_map(|r| r.spans.iter())
    }

    /// Right boundary of the table.
    pub fn right_x(&self) -> f32 {
        self.spans().map(|s| s.x + s.width).fold(f32::MIN, f32::max)
    }

    /// Convert to a table region on a page of the given height.
    ///
    /// Row 0 is the header row. Each span lands in exactly one cell; spans
    /// sharing a cell are joined with a space. Overprinted copies of a span
    /// count once.
    pub fn to_region(&self, page_height: f32) -> TableRegion {
        let right_x = self.right_x();
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut cells: Vec<Vec<&str>> = vec![Vec::new(); self.columns.len()];
                for (i, span) in row.spans.iter().enumerate() {
                    if row.spans[..i].iter().any(|earlier| same_span(earlier, span)) {
                        continue;
                    }
                    let col = find_column_for_span(span.x, &self.columns, right_x);
                    if let Some(cell) = cells.get_mut(col) {
                        cell.push(span.text.trim());
                    }
                }
                cells.into_iter().map(|parts| parts.join(" ")).collect()
            })
            .collect();

        let bbox = self
            .spans()
            .map(|s| {
                BBox::new(
                    s.x,
                    page_height - s.top(),
                    s.x + s.width,
                    page_height - s.bottom(),
                )
            })
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();

        TableRegion::new(bbox, rows)
    }
}

/// Table detector configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDetectorConfig {
    /// Minimum number of rows to consider as table
    pub min_rows: usize,
    /// Minimum number of columns to consider as table
    pub min_columns: usize,
    /// Maximum number of columns (above this, likely word-level splitting)
    pub max_columns: usize,
    /// Y tolerance for grouping spans into rows (fraction of font size)
    pub y_tolerance_factor: f32,
    /// Minimum column alignment ratio (0.0-1.0)
    pub min_alignment_ratio: f32,
    /// Minimum gap between columns (points)
    pub min_column_gap: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 6,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.3,
            min_column_gap: 15.0,
        }
    }
}

/// Detects tables in a page's text spans.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a new table detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new table detector with custom configuration.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect tables in the given spans.
    ///
    /// Returns the tables, top first, and the spans that belong to none.
    pub fn detect(&self, spans: Vec<TextSpan>) -> (Vec<DetectedTable>, Vec<TextSpan>) {
        if spans.len() < self.config.min_rows * self.config.min_columns {
            return (vec![], spans);
        }

        let rows = self.group_into_rows(&spans);
        if rows.len() < self.config.min_rows {
            return (vec![], spans);
        }

        let columns = self.detect_columns(&rows);
        log::debug!(
            "TableDetector: {} spans, {} rows, columns at {:?}",
            spans.len(),
            rows.len(),
            columns
        );
        if columns.len() < self.config.min_columns {
            return (vec![], spans);
        }

        let mut tables = Vec::new();
        let mut used: HashSet<usize> = HashSet::new();

        for (start, end) in self.find_table_regions(&rows, &columns) {
            let table_rows = rows[start..=end].to_vec();

            // Columns are re-derived per region; page-wide edges may belong
            // to other content.
            let table_columns = self.detect_columns(&table_rows);
            if table_columns.len() < self.config.min_columns {
                continue;
            }
            if table_columns.len() > self.config.max_columns {
                log::debug!(
                    "TableDetector: skipping rows {}..={}, {} columns",
                    start,
                    end,
                    table_columns.len()
                );
                continue;
            }
            if self.is_list_pattern(&table_rows, &table_columns) {
                log::debug!("TableDetector: skipping rows {}..={}, list pattern", start, end);
                continue;
            }

            // Overprinted copies of a cell (faux bold) are all consumed
            let table_spans: Vec<&TextSpan> =
                table_rows.iter().flat_map(|r| r.spans.iter()).collect();
            used.extend(
                spans
                    .iter()
                    .enumerate()
                    .filter(|(_, o)| table_spans.iter().any(|t| same_span(o, t)))
                    .map(|(i, _)| i),
            );

            tables.push(DetectedTable {
                columns: table_columns,
                rows: table_rows,
            });
        }

        let remaining = spans
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !used.contains(i))
            .map(|(_, span)| span)
            .collect();

        (tables, remaining)
    }

    /// Group spans into rows by baseline, top row first.
    fn group_into_rows(&self, spans: &[TextSpan]) -> Vec<TableRowData> {
        let mut sorted = spans.to_vec();
        sorted.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

        let mut rows: Vec<TableRowData> = Vec::new();
        let mut current: Vec<TextSpan> = Vec::new();
        let mut current_y: Option<f32> = None;

        for span in sorted {
            let y_tolerance = span.font_size * self.config.y_tolerance_factor;
            match current_y {
                Some(y) if (span.y - y).abs() <= y_tolerance => current.push(span),
                _ => {
                    if !current.is_empty() {
                        rows.push(make_row(std::mem::take(&mut current)));
                    }
                    current_y = Some(span.y);
                    current.push(span);
                }
            }
        }
        if !current.is_empty() {
            rows.push(make_row(current));
        }

        rows
    }

    /// Column left edges shared by enough rows.
    ///
    /// Rows with at least two spans are the evidence; when too few rows
    /// qualify, every span of every row counts instead.
    fn detect_columns(&self, rows: &[TableRowData]) -> Vec<f32> {
        let multi_span_rows: Vec<&TableRowData> =
            rows.iter().filter(|r| r.spans.len() >= 2).collect();

        let mut edge_counts: HashMap<i32, usize> = HashMap::new();
        let evidence_rows = if multi_span_rows.len() >= self.config.min_rows {
            // Each bucket counts once per row
            for row in &multi_span_rows {
                let buckets: HashSet<i32> = row.spans.iter().map(|s| edge_bucket(s.x)).collect();
                for bucket in buckets {
                    *edge_counts.entry(bucket).or_insert(0) += 1;
                }
            }
            multi_span_rows.len()
        } else {
            for span in rows.iter().flat_map(|r| r.spans.iter()) {
                *edge_counts.entry(edge_bucket(span.x)).or_insert(0) += 1;
            }
            rows.len()
        };

        let min_occurrences =
            ((evidence_rows as f32 * self.config.min_alignment_ratio) as usize).max(2);

        let mut edges: Vec<f32> = edge_counts
            .into_iter()
            .filter(|(_, count)| *count >= min_occurrences)
            .map(|(bucket, _)| bucket as f32 * EDGE_BUCKET)
            .collect();
        edges.sort_by(f32::total_cmp);

        let mut merged: Vec<f32> = Vec::with_capacity(edges.len());
        for edge in edges {
            match merged.last() {
                Some(&last) if edge - last < self.config.min_column_gap => {}
                _ => merged.push(edge),
            }
        }
        merged
    }

    /// Runs of consecutive aligned rows, as inclusive index ranges.
    fn find_table_regions(&self, rows: &[TableRowData], columns: &[f32]) -> Vec<(usize, usize)> {
        let mut regions = Vec::new();
        let mut start: Option<usize> = None;

        for (i, row) in rows.iter().enumerate() {
            // A lone span lines up with some column anywhere on the page
            if row.spans.len() >= 2
                && alignment_score(row, columns) >= self.config.min_alignment_ratio
            {
                start.get_or_insert(i);
            } else if let Some(s) = start.take() {
                if i - s >= self.config.min_rows {
                    regions.push((s, i - 1));
                }
            }
        }
        if let Some(s) = start {
            if rows.len() - s >= self.config.min_rows {
                regions.push((s, rows.len() - 1));
            }
        }

        regions
    }

    /// Whether aligned rows are really a bulleted or numbered list.
    ///
    /// A list marker and its item text become separate spans at two stable
    /// X positions, which otherwise reads as a two-column table.
    fn is_list_pattern(&self, rows: &[TableRowData], columns: &[f32]) -> bool {
        if columns.len() < 2 || rows.is_empty() {
            return false;
        }

        let mut bullets = 0;
        let mut numbers = 0;
        for row in rows {
            let Some(first) = row.spans.iter().min_by(|a, b| a.x.total_cmp(&b.x)) else {
                continue;
            };
            if is_bullet_marker(&first.text) {
                bullets += 1;
            } else if is_number_marker(&first.text) {
                numbers += 1;
            }
        }

        let total = rows.len() as f32;
        // Numbered first columns are common in real tables; only reject the
        // two-column case for them.
        bullets as f32 / total >= 0.5
            || (columns.len() == 2 && (bullets + numbers) as f32 / total >= 0.5)
    }
}

fn make_row(spans: Vec<TextSpan>) -> TableRowData {
    let y = spans.iter().map(|s| s.y).sum::<f32>() / spans.len() as f32;
    TableRowData { y, spans }
}

fn edge_bucket(x: f32) -> i32 {
    (x / EDGE_BUCKET).round() as i32
}

fn same_span(a: &TextSpan, b: &TextSpan) -> bool {
    (a.x - b.x).abs() < 0.1 && (a.y - b.y).abs() < 0.1 && a.text == b.text
}

/// Fraction of a row's spans that start on a column edge.
fn alignment_score(row: &TableRowData, columns: &[f32]) -> f32 {
    if row.spans.is_empty() || columns.is_empty() {
        return 0.0;
    }
    let aligned = row
        .spans
        .iter()
        .filter(|span| columns.iter().any(|col| (span.x - col).abs() <= ALIGN_TOLERANCE))
        .count();
    aligned as f32 / row.spans.len() as f32
}

/// Index of the column a span starting at `span_x` belongs to.
fn find_column_for_span(span_x: f32, columns: &[f32], right_x: f32) -> usize {
    // Spans may start slightly before their column edge
    const SLACK: f32 = 10.0;

    for (i, &col_start) in columns.iter().enumerate() {
        let col_end = columns.get(i + 1).copied().unwrap_or(right_x + 100.0);
        if span_x >= col_start - SLACK && span_x < col_end - SLACK {
            return i;
        }
    }

    columns
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (span_x - **a).abs().total_cmp(&(span_x - **b).abs()))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Check if text is a bullet marker (•, -, etc.).
fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text.trim(),
        "-" | "–" | "—" | "•" | "·" | "*" | "○" | "▪" | "◦" | "▸" | "▹" | "►" | "■" | "●" | "※"
            | "□" | "◆" | "◇" | "▶" | "▷" | "☞" | "➤" | "➜"
    )
}

/// Check if text is a number-style list marker (1., 2), a., etc.).
fn is_number_marker(text: &str) -> bool {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return false;
    }

    if cleaned.parse::<u32>().is_ok() {
        return true;
    }

    // "12." or "1)"
    if let Some(pos) = cleaned.find(|c: char| !c.is_ascii_digit()) {
        let suffix = &cleaned[pos..];
        if pos > 0 && (suffix == "." || suffix == ")") {
            return true;
        }
    }

    // "a." or "B)"
    let mut chars = cleaned.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(c), Some('.' | ')'), None) if c.is_alphabetic()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_span(text: &str, x: f32, y: f32) -> TextSpan {
        TextSpan::new(text.to_string(), x, y, 12.0, "Helvetica".to_string())
    }

    fn grid() -> Vec<TextSpan> {
        vec![
            make_span("Name", 10.0, 100.0),
            make_span("Age", 80.0, 100.0),
            make_span("Alice", 10.0, 85.0),
            make_span("30", 80.0, 85.0),
            make_span("Bob", 10.0, 70.0),
            make_span("25", 80.0, 70.0),
        ]
    }

    #[test]
    fn test_group_into_rows() {
        let detector = TableDetector::new();
        let rows = detector.group_into_rows(&grid());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].spans[0].text, "Name");
        assert_eq!(rows[2].spans[1].text, "25");
    }

    #[test]
    fn test_detect_columns() {
        let detector = TableDetector::new();
        let rows = detector.group_into_rows(&grid());
        assert_eq!(detector.detect_columns(&rows), vec![10.0, 80.0]);
    }

    #[test]
    fn test_detect_simple_table() {
        let detector = TableDetector::new();
        let (tables, remaining) = detector.detect(grid());
        assert_eq!(tables.len(), 1);
        assert!(remaining.is_empty());
        assert_eq!(tables[0].rows.len(), 3);
        assert_eq!(tables[0].columns.len(), 2);
    }

    #[test]
    fn test_table_keeps_surrounding_text() {
        let mut spans = grid();
        spans.push(make_span("A paragraph well below the table", 40.0, 20.0));
        spans.push(make_span("Title", 30.0, 200.0));

        let (tables, remaining) = TableDetector::new().detect(spans);
        assert_eq!(tables.len(), 1);
        let texts: Vec<&str> = remaining.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts.len(), 2);
        assert!(texts.contains(&"Title"));
    }

    #[test]
    fn test_single_span_rows_stay_outside() {
        let mut spans = grid();
        spans.push(make_span("Heading at the margin", 10.0, 130.0));
        spans.push(make_span("Body at the margin", 10.0, 40.0));

        let (tables, remaining) = TableDetector::new().detect(spans);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].rows.len(), 3);
        assert_eq!(remaining.len(), 2);
    }

    #[test]
    fn test_overprinted_cells_are_all_consumed() {
        let mut spans = grid();
        spans.push(make_span("Alice", 10.0, 85.0));
        spans.push(make_span("Age", 80.0, 100.0));

        let (tables, remaining) = TableDetector::new().detect(spans);
        assert_eq!(tables.len(), 1);
        assert!(remaining.is_empty());

        let region = tables[0].to_region(792.0);
        assert_eq!(region.rows[0], vec!["Name".to_string(), "Age".to_string()]);
        assert_eq!(region.rows[1], vec!["Alice".to_string(), "30".to_string()]);
    }

    #[test]
    fn test_no_table_single_column() {
        let spans = vec![
            make_span("Line 1", 10.0, 100.0),
            make_span("Line 2", 10.0, 85.0),
            make_span("Line 3", 10.0, 70.0),
            make_span("Line 4", 10.0, 55.0),
        ];
        let (tables, remaining) = TableDetector::new().detect(spans);
        assert!(tables.is_empty());
        assert_eq!(remaining.len(), 4);
    }

    #[test]
    fn test_to_region() {
        let (tables, _) = TableDetector::new().detect(grid());
        let region = tables[0].to_region(792.0);

        assert_eq!(
            region.rows,
            vec![
                vec!["Name".to_string(), "Age".to_string()],
                vec!["Alice".to_string(), "30".to_string()],
                vec!["Bob".to_string(), "25".to_string()],
            ]
        );
        // Top of the header row, flipped to top-left origin
        assert!((region.bbox.y0 - (792.0 - (100.0 + 12.0 * 0.8))).abs() < 1e-3);
        assert!((region.bbox.y1 - (792.0 - (70.0 - 12.0 * 0.2))).abs() < 1e-3);
        assert_eq!(region.bbox.x0, 10.0);
    }

    #[test]
    fn test_to_region_joins_cell_spans() {
        let detected = DetectedTable {
            columns: vec![10.0, 80.0],
            rows: vec![TableRowData {
                y: 100.0,
                spans: vec![
                    make_span("New", 10.0, 100.0),
                    make_span("York", 40.0, 100.0),
                    make_span("8M", 80.0, 100.0),
                ],
            }],
        };
        let region = detected.to_region(792.0);
        assert_eq!(region.rows[0], vec!["New York".to_string(), "8M".to_string()]);
    }

    #[test]
    fn test_numbered_list_not_detected_as_table() {
        let spans: Vec<TextSpan> = (0..5)
            .flat_map(|i| {
                let y = 400.0 - i as f32 * 30.0;
                [
                    make_span(&format!("{}.", i + 1), 50.0, y),
                    make_span("Item text", 80.0, y),
                ]
            })
            .collect();
        let (tables, remaining) = TableDetector::new().detect(spans);
        assert!(tables.is_empty());
        assert_eq!(remaining.len(), 10);
    }

    #[test]
    fn test_bullet_list_not_detected_as_table() {
        let spans = vec![
            make_span("-", 50.0, 400.0),
            make_span("Management", 80.0, 400.0),
            make_span("•", 50.0, 370.0),
            make_span("Interface", 80.0, 370.0),
            make_span("-", 50.0, 340.0),
            make_span("Firmware", 80.0, 340.0),
        ];
        let (tables, remaining) = TableDetector::new().detect(spans);
        assert!(tables.is_empty());
        assert_eq!(remaining.len(), 6);
    }

    #[test]
    fn test_list_markers() {
        assert!(is_number_marker("1."));
        assert!(is_number_marker("12."));
        assert!(is_number_marker("1)"));
        assert!(is_number_marker("1 ."));
        assert!(is_number_marker("3"));
        assert!(is_number_marker("a."));
        assert!(is_number_marker("B)"));
        assert!(is_bullet_marker("•"));
        assert!(is_bullet_marker(" - "));

        assert!(!is_number_marker("Name"));
        assert!(!is_number_marker("ab."));
        assert!(!is_number_marker(""));
        assert!(!is_bullet_marker("Alice"));
    }

    #[test]
    fn test_find_column_for_span() {
        let columns = [10.0, 80.0, 150.0];
        assert_eq!(find_column_for_span(10.0, &columns, 200.0), 0);
        assert_eq!(find_column_for_span(75.0, &columns, 200.0), 1);
        assert_eq!(find_column_for_span(160.0, &columns, 200.0), 2);
    }
}
