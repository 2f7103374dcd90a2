//! # BXSF 能带网格格式解析器
//!
//! 解析和写出 Wannier90 生成的 Band-XCrySDen-Structure-File (BXSF)。
//!
//! ## BXSF 格式说明
//! ```text
//! BEGIN_INFO
//!   # free comments
//!   Fermi Energy:     5.5
//! END_INFO
//! BEGIN_BLOCK_BANDGRID_3D
//! from_wannier_code
//! BEGIN_BANDGRID_3D_fermi
//! 4                          # number of bands
//! 10 10 10                   # grid shape nx ny nz
//! 0.0 0.0 0.0                # origin, must be zero
//! b1x b1y b1z                # reciprocal lattice vectors (1/ang)
//! b2x b2y b2z
//! b3x b3y b3z
//! BAND: 1
//! e1 e2 e3 ...               # nx*ny*nz values over any number of lines
//! BAND: 2
//! ...
//! END_BANDGRID_3D
//! END_BLOCK_BANDGRID_3D
//! ```
//!
//! 解析器是显式状态机：`Preamble → GridHeader → BandBlock → Done`。
//! 写出时所有行都去掉行首空白，否则 SKEAF 读取本征值时会崩溃。
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/grid.rs`

use crate::error::{Result, SkeafError};
use crate::models::{Band, GridDocument};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::OnceLock;

pub const FERMI_ENERGY_KEY: &str = "Fermi Energy:";
pub const BEGIN_GRID: &str = "BEGIN_BANDGRID_3D_";
pub const END_GRID: &str = "END_BANDGRID_3D";
pub const END_BLOCK: &str = "END_BLOCK_BANDGRID_3D";

/// 每行写出的本征值个数
const VALUES_PER_LINE: usize = 6;

fn band_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^BAND:\s*([+-]?\d+)\s*$").unwrap())
}

fn fermi_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Fermi Energy:\s*(\S+)").unwrap())
}

/// 网格头部的字段顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderField {
    BandCount,
    Shape,
    Origin,
    Lattice(usize),
}

/// 解析状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// `BEGIN_BANDGRID_3D_*` 之前的自由文本
    Preamble,
    GridHeader(HeaderField),
    BandBlock,
    /// 已读到 `END_BANDGRID_3D`，等待 `END_BLOCK_BANDGRID_3D`
    GridClosed,
    Done,
}

/// 正在读取的能带
struct PendingBand {
    label: i32,
    line: usize,
    energies: Vec<f64>,
}

/// 解析过程中累积的文档字段
struct DocumentBuilder {
    fermi_energy: Option<f64>,
    declared_bands: usize,
    grid_shape: [usize; 3],
    origin: [f64; 3],
    lattice_vectors: [[f64; 3]; 3],
    bands: Vec<Band>,
    labels: HashSet<i32>,
    pending: Option<PendingBand>,
    preamble: Vec<String>,
    interlude: Vec<String>,
    grid_title: String,
}

impl DocumentBuilder {
    fn new() -> Self {
        DocumentBuilder {
            fermi_energy: None,
            declared_bands: 0,
            grid_shape: [0; 3],
            origin: [0.0; 3],
            lattice_vectors: [[0.0; 3]; 3],
            bands: Vec::new(),
            labels: HashSet::new(),
            pending: None,
            preamble: Vec::new(),
            interlude: Vec::new(),
            grid_title: String::new(),
        }
    }

    fn grid_volume(&self) -> usize {
        self.grid_shape.iter().product()
    }

    fn start_band(&mut self, label: i32, line: usize) -> Result<()> {
        self.finish_band()?;
        if !self.labels.insert(label) {
            return Err(SkeafError::format(
                line,
                format!("duplicate band label {}", label),
            ));
        }
        self.pending = Some(PendingBand {
            label,
            line,
            energies: Vec::with_capacity(self.grid_volume()),
        });
        Ok(())
    }

    fn finish_band(&mut self) -> Result<()> {
        if let Some(band) = self.pending.take() {
            let expected = self.grid_volume();
            if band.energies.len() != expected {
                return Err(SkeafError::GridSizeMismatch {
                    what: format!("band {} (starting at line {})", band.label, band.line),
                    expected,
                    found: band.energies.len(),
                });
            }
            self.bands.push(Band::new(band.label, band.energies));
        }
        Ok(())
    }

    fn build(self) -> Result<GridDocument> {
        if self.bands.len() != self.declared_bands {
            return Err(SkeafError::GridSizeMismatch {
                what: "number of bands".to_string(),
                expected: self.declared_bands,
                found: self.bands.len(),
            });
        }
        Ok(GridDocument {
            // 进入网格头部前已保证存在
            fermi_energy: self.fermi_energy.unwrap_or_default(),
            grid_shape: self.grid_shape,
            origin: self.origin,
            lattice_vectors: self.lattice_vectors,
            bands: self.bands,
            preamble: self.preamble,
            interlude: self.interlude,
            grid_title: self.grid_title,
            provenance: None,
        })
    }
}

/// 解析 BXSF 文件
pub fn parse_bxsf_file(path: &Path) -> Result<GridDocument> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            SkeafError::InputNotFound {
                path: path.display().to_string(),
            }
        } else {
            SkeafError::FileReadError {
                path: path.display().to_string(),
                source: e,
            }
        }
    })?;

    parse_bxsf_content(&content)
}

/// 从字符串内容解析 BXSF 格式
pub fn parse_bxsf_content(content: &str) -> Result<GridDocument> {
    let mut doc = DocumentBuilder::new();
    let mut state = ParseState::Preamble;
    let mut last_line = 0;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        last_line = line_no;
        let line = raw.trim();

        state = match state {
            ParseState::Preamble => parse_preamble_line(&mut doc, line, line_no)?,
            ParseState::GridHeader(field) => {
                if line.is_empty() {
                    continue;
                }
                parse_header_line(&mut doc, field, line, line_no)?
            }
            ParseState::BandBlock => parse_band_line(&mut doc, line, line_no)?,
            ParseState::GridClosed => {
                if line.is_empty() {
                    continue;
                }
                if line != END_BLOCK {
                    return Err(SkeafError::format(
                        line_no,
                        format!("expected {} after {}, found '{}'", END_BLOCK, END_GRID, line),
                    ));
                }
                ParseState::Done
            }
            ParseState::Done => break,
        };
    }

    match state {
        ParseState::Done => doc.build(),
        ParseState::Preamble if doc.fermi_energy.is_none() => Err(SkeafError::format(
            last_line,
            format!("missing '{}' header line", FERMI_ENERGY_KEY),
        )),
        ParseState::Preamble => Err(SkeafError::format(
            last_line,
            format!("missing {}* marker", BEGIN_GRID),
        )),
        ParseState::GridHeader(field) => Err(SkeafError::format(
            last_line,
            format!("truncated grid header (expecting {:?})", field),
        )),
        ParseState::BandBlock => Err(SkeafError::format(
            last_line,
            format!("missing {} marker", END_GRID),
        )),
        ParseState::GridClosed => Err(SkeafError::format(
            last_line,
            format!("missing {} marker", END_BLOCK),
        )),
    }
}

fn parse_preamble_line(doc: &mut DocumentBuilder, line: &str, line_no: usize) -> Result<ParseState> {
    if let Some(title) = line.strip_prefix(BEGIN_GRID) {
        if doc.fermi_energy.is_none() {
            return Err(SkeafError::format(
                line_no,
                format!("{} found before the '{}' line", line, FERMI_ENERGY_KEY),
            ));
        }
        if title.is_empty() || title.contains(char::is_whitespace) {
            return Err(SkeafError::format(
                line_no,
                format!("malformed begin-grid marker '{}'", line),
            ));
        }
        doc.grid_title = title.to_string();
        return Ok(ParseState::GridHeader(HeaderField::BandCount));
    }

    if doc.fermi_energy.is_none() {
        if let Some(caps) = fermi_marker().captures(line) {
            let value = parse_float(&caps[1]).ok_or_else(|| {
                SkeafError::format(line_no, format!("invalid Fermi energy '{}'", &caps[1]))
            })?;
            doc.fermi_energy = Some(value);
            return Ok(ParseState::Preamble);
        }
        if line.contains(FERMI_ENERGY_KEY) {
            return Err(SkeafError::format(line_no, "missing Fermi energy value"));
        }
    }

    if band_marker().is_match(line) || line == END_GRID || line == END_BLOCK {
        return Err(SkeafError::format(
            line_no,
            format!("unexpected '{}' before the grid header", line),
        ));
    }

    if doc.fermi_energy.is_none() {
        doc.preamble.push(line.to_string());
    } else {
        doc.interlude.push(line.to_string());
    }
    Ok(ParseState::Preamble)
}

fn parse_header_line(
    doc: &mut DocumentBuilder,
    field: HeaderField,
    line: &str,
    line_no: usize,
) -> Result<ParseState> {
    match field {
        HeaderField::BandCount => {
            doc.declared_bands = line.parse().map_err(|_| {
                SkeafError::format(line_no, format!("invalid number of bands '{}'", line))
            })?;
            Ok(ParseState::GridHeader(HeaderField::Shape))
        }
        HeaderField::Shape => {
            let parts: Vec<usize> = line
                .split_whitespace()
                .map(|s| s.parse::<usize>())
                .collect::<std::result::Result<_, _>>()
                .map_err(|_| SkeafError::format(line_no, format!("invalid grid shape '{}'", line)))?;
            if parts.len() != 3 || parts.contains(&0) {
                return Err(SkeafError::format(
                    line_no,
                    format!("grid shape must be three positive integers, found '{}'", line),
                ));
            }
            doc.grid_shape = [parts[0], parts[1], parts[2]];
            Ok(ParseState::GridHeader(HeaderField::Origin))
        }
        HeaderField::Origin => {
            let origin = parse_vector(line, line_no, "origin")?;
            if origin.iter().any(|&x| x != 0.0) {
                return Err(SkeafError::format(
                    line_no,
                    format!(
                        "grid origin must be (0, 0, 0), found ({}, {}, {})",
                        origin[0], origin[1], origin[2]
                    ),
                ));
            }
            doc.origin = origin;
            Ok(ParseState::GridHeader(HeaderField::Lattice(0)))
        }
        HeaderField::Lattice(i) => {
            doc.lattice_vectors[i] = parse_vector(line, line_no, "lattice vector")?;
            if i < 2 {
                Ok(ParseState::GridHeader(HeaderField::Lattice(i + 1)))
            } else {
                Ok(ParseState::BandBlock)
            }
        }
    }
}

fn parse_band_line(doc: &mut DocumentBuilder, line: &str, line_no: usize) -> Result<ParseState> {
    if line.is_empty() {
        return Ok(ParseState::BandBlock);
    }

    if let Some(caps) = band_marker().captures(line) {
        let label: i32 = caps[1].parse().map_err(|_| {
            SkeafError::format(line_no, format!("invalid band label '{}'", &caps[1]))
        })?;
        doc.start_band(label, line_no)?;
        return Ok(ParseState::BandBlock);
    }

    if line == END_GRID {
        doc.finish_band()?;
        return Ok(ParseState::GridClosed);
    }

    if line == END_BLOCK {
        return Err(SkeafError::format(
            line_no,
            format!("{} reached before {}", END_BLOCK, END_GRID),
        ));
    }

    let pending = doc.pending.as_mut().ok_or_else(|| {
        SkeafError::format(line_no, "energy values before the first BAND: marker")
    })?;
    for token in line.split_whitespace() {
        let value = parse_float(token).ok_or_else(|| {
            SkeafError::format(line_no, format!("invalid energy value '{}'", token))
        })?;
        pending.energies.push(value);
    }
    Ok(ParseState::BandBlock)
}

/// 解析三个浮点数
fn parse_vector(line: &str, line_no: usize, what: &str) -> Result<[f64; 3]> {
    let parts: Vec<f64> = line
        .split_whitespace()
        .map(parse_float)
        .collect::<Option<_>>()
        .ok_or_else(|| SkeafError::format(line_no, format!("invalid {} '{}'", what, line)))?;
    if parts.len() != 3 {
        return Err(SkeafError::format(
            line_no,
            format!("{} must have three components, found '{}'", what, line),
        ));
    }
    Ok([parts[0], parts[1], parts[2]])
}

/// 解析浮点数，兼容 Fortran 的 `D` 指数
fn parse_float(token: &str) -> Option<f64> {
    if token.contains(['D', 'd']) {
        token.replace(['D', 'd'], "E").parse().ok()
    } else {
        token.parse().ok()
    }
}

/// 浮点数的最短无损表示，整数值保留 `.0`
fn fmt_float(x: f64) -> String {
    format!("{:?}", x)
}

/// 将 GridDocument 转换为 BXSF 格式字符串
pub fn to_bxsf_string(doc: &GridDocument) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.extend(doc.preamble.iter().map(|l| l.trim().to_string()));
    lines.push(format!("{} {}", FERMI_ENERGY_KEY, fmt_float(doc.fermi_energy)));
    if let Some(provenance) = &doc.provenance {
        lines.extend(provenance.comment_lines());
    }
    lines.extend(doc.interlude.iter().map(|l| l.trim().to_string()));

    lines.push(format!("{}{}", BEGIN_GRID, doc.grid_title));
    lines.push(doc.bands.len().to_string());
    lines.push(format!(
        "{} {} {}",
        doc.grid_shape[0], doc.grid_shape[1], doc.grid_shape[2]
    ));
    lines.push(
        doc.origin
            .iter()
            .map(|&x| fmt_float(x))
            .collect::<Vec<_>>()
            .join(" "),
    );
    for v in &doc.lattice_vectors {
        lines.push(format!("{:.10} {:.10} {:.10}", v[0], v[1], v[2]));
    }

    for band in &doc.bands {
        lines.push(format!("BAND: {}", band.label));
        for chunk in band.energies.chunks(VALUES_PER_LINE) {
            lines.push(
                chunk
                    .iter()
                    .map(|&e| fmt_float(e))
                    .collect::<Vec<_>>()
                    .join(" "),
            );
        }
    }

    lines.push(END_GRID.to_string());
    lines.push(END_BLOCK.to_string());

    let mut result = lines.join("\n");
    result.push('\n');
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provenance;

    const SAMPLE: &str = r#" BEGIN_INFO
   #
   # this is a Band-XCRYSDEN-Structure-File
   # for Fermi Surface Visualisation
   #
   Fermi Energy:        5.5000000000
 END_INFO

 BEGIN_BLOCK_BANDGRID_3D
 from_wannier_code
 BEGIN_BANDGRID_3D_fermi
            2
     2     2     2
     0.000000     0.000000     0.000000
     1.000000     0.000000     0.000000
     0.000000     2.000000     0.000000
     0.000000     0.000000     3.000000
 BAND:     4
   0.0000  1.0000  2.0000  3.0000
   4.0000  5.0000  6.0000  7.0000
 BAND:     5
  10.0000 11.0000 12.0000 13.0000 14.0000 15.0000
  16.0000 17.0000
 END_BANDGRID_3D
 END_BLOCK_BANDGRID_3D
"#;

    fn expect_format_error(content: &str) -> String {
        match parse_bxsf_content(content) {
            Err(SkeafError::Format { reason, .. }) => reason,
            other => panic!("expected a format error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_sample() {
        let doc = parse_bxsf_content(SAMPLE).unwrap();
        assert!((doc.fermi_energy - 5.5).abs() < 1e-12);
        assert_eq!(doc.grid_shape, [2, 2, 2]);
        assert_eq!(doc.origin, [0.0; 3]);
        assert_eq!(doc.lattice_vectors[1], [0.0, 2.0, 0.0]);
        assert_eq!(doc.grid_title, "fermi");
        assert_eq!(doc.band_labels(), vec![4, 5]);
        assert_eq!(doc.bands[0].energies, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(doc.bands[1].energies.len(), 8);
        assert_eq!(doc.preamble[0], "BEGIN_INFO");
        assert_eq!(
            doc.interlude,
            vec!["END_INFO", "", "BEGIN_BLOCK_BANDGRID_3D", "from_wannier_code"]
        );
    }

    #[test]
    fn test_parse_without_bands() {
        let content = "Fermi Energy: 1.0\nBEGIN_BANDGRID_3D_fermi\n0\n1 1 1\n0 0 0\n1 0 0\n0 1 0\n0 0 1\nEND_BANDGRID_3D\nEND_BLOCK_BANDGRID_3D\n";
        let doc = parse_bxsf_content(content).unwrap();
        assert!(doc.bands.is_empty());
        assert_eq!(doc.grid_volume(), 1);
    }

    #[test]
    fn test_parse_fortran_exponents() {
        let content = SAMPLE.replace("0.0000  1.0000", "0.0000D+00  1.0000d0");
        let doc = parse_bxsf_content(&content).unwrap();
        assert_eq!(doc.bands[0].energies[1], 1.0);
    }

    #[test]
    fn test_nonzero_origin_rejected() {
        let content = SAMPLE.replace(
            "     0.000000     0.000000     0.000000",
            "     0.100000     0.000000     0.000000",
        );
        let reason = expect_format_error(&content);
        assert!(reason.contains("origin"));
    }

    #[test]
    fn test_band_marker_in_preamble_rejected() {
        let content = format!("BAND: 1\n{}", SAMPLE);
        let reason = expect_format_error(&content);
        assert!(reason.contains("before the grid header"));
    }

    #[test]
    fn test_missing_fermi_energy() {
        let content = SAMPLE.replace("Fermi Energy:        5.5000000000", "# no fermi here");
        let reason = expect_format_error(&content);
        assert!(reason.contains("before the 'Fermi Energy:' line"));
    }

    #[test]
    fn test_malformed_fermi_energy() {
        let content = SAMPLE.replace("5.5000000000", "five");
        let reason = expect_format_error(&content);
        assert!(reason.contains("invalid Fermi energy"));
    }

    #[test]
    fn test_duplicate_band_label_rejected() {
        let content = SAMPLE.replace("BAND:     5", "BAND:     4");
        let reason = expect_format_error(&content);
        assert!(reason.contains("duplicate band label 4"));
    }

    #[test]
    fn test_band_size_mismatch() {
        let content = SAMPLE.replace("  16.0000 17.0000\n", "  16.0000\n");
        match parse_bxsf_content(&content) {
            Err(SkeafError::GridSizeMismatch {
                expected, found, ..
            }) => {
                assert_eq!(expected, 8);
                assert_eq!(found, 7);
            }
            other => panic!("expected grid size mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_declared_band_count_mismatch() {
        let content = SAMPLE.replace("            2\n", "            3\n");
        match parse_bxsf_content(&content) {
            Err(SkeafError::GridSizeMismatch {
                what,
                expected,
                found,
            }) => {
                assert_eq!(what, "number of bands");
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("expected grid size mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_end_block() {
        let content = SAMPLE.replace(" END_BLOCK_BANDGRID_3D\n", "");
        let reason = expect_format_error(&content);
        assert!(reason.contains(END_BLOCK));
    }

    #[test]
    fn test_zero_grid_dimension_rejected() {
        let content = SAMPLE.replace("     2     2     2", "     2     0     2");
        let reason = expect_format_error(&content);
        assert!(reason.contains("grid shape"));
    }

    #[test]
    fn test_written_lines_have_no_leading_whitespace() {
        let mut doc = parse_bxsf_content(SAMPLE).unwrap();
        doc.provenance = Some(Provenance::new(11.873, 0.1));
        let text = to_bxsf_string(&doc);
        for line in text.lines() {
            assert_eq!(line, line.trim_start(), "indented line: {:?}", line);
        }
    }

    #[test]
    fn test_provenance_follows_fermi_line() {
        let mut doc = parse_bxsf_content(SAMPLE).unwrap();
        doc.provenance = Some(Provenance::new(11.873, 0.0));
        let text = to_bxsf_string(&doc);
        let lines: Vec<&str> = text.lines().collect();
        let fermi_idx = lines
            .iter()
            .position(|l| l.starts_with(FERMI_ENERGY_KEY))
            .unwrap();
        assert_eq!(lines[fermi_idx + 1], "#");
        assert_eq!(lines[fermi_idx + 3], "# IMPORTANT NOTE!");
    }

    #[test]
    fn test_write_then_parse_preserves_document() {
        let doc = parse_bxsf_content(SAMPLE).unwrap();
        let text = to_bxsf_string(&doc);
        let reparsed = parse_bxsf_content(&text).unwrap();
        assert_eq!(reparsed, doc);
    }

    #[test]
    fn test_parse_missing_file() {
        let err = parse_bxsf_file(Path::new("/nonexistent/input.bxsf")).unwrap_err();
        assert!(matches!(err, SkeafError::InputNotFound { .. }));
        assert_eq!(err.exit_code(), 2);
    }
}
