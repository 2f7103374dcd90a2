//! # 单带抽取
//!
//! SKEAF 只接受单条能带，且要求倒格矢以 2π/bohr 为单位。这里从完整文档中
//! 抽取一条能带，换算倒格矢，按需平移 Fermi 能量。本征值与 Fermi 能量的
//! 单位不做换算。
//!
//! ## 依赖关系
//! - 被 `commands/extract.rs` 调用
//! - 使用 `models/grid.rs`

use crate::error::{Result, SkeafError};
use crate::models::{GridDocument, Provenance};

use std::f64::consts::PI;

/// SKEAF 内部使用的 bohr → Å 换算
pub const BOHR_TO_ANG: f64 = 0.529177209;

/// 倒格矢需要除以的因子：1/Å → 2π/bohr
pub const CONV_FACTOR: f64 = 2.0 * PI / BOHR_TO_ANG;

/// 抽取一条能带
pub fn extract_one(doc: &GridDocument, label: i32, fermi_shift: f64) -> Result<GridDocument> {
    let band = doc.band(label).ok_or_else(|| SkeafError::BandNotFound {
        label,
        available: doc
            .band_labels()
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join(" "),
    })?;

    let lattice_vectors = doc
        .lattice_vectors
        .map(|v| v.map(|component| component / CONV_FACTOR));

    Ok(GridDocument {
        fermi_energy: doc.fermi_energy + fermi_shift,
        grid_shape: doc.grid_shape,
        origin: doc.origin,
        lattice_vectors,
        bands: vec![band.clone()],
        preamble: doc.preamble.clone(),
        interlude: doc.interlude.clone(),
        grid_title: doc.grid_title.clone(),
        provenance: Some(Provenance::new(CONV_FACTOR, fermi_shift)),
    })
}

/// 按文档顺序抽取所有能带
pub fn extract_all(doc: &GridDocument, fermi_shift: f64) -> Result<Vec<GridDocument>> {
    doc.bands
        .iter()
        .map(|band| extract_one(doc, band.label, fermi_shift))
        .collect()
}
