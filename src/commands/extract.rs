//! # extract 子命令实现
//!
//! 将 BXSF 中的能带逐个写成 SKEAF 可读的单带文件。
//!
//! ## 功能
//! - 单带或全部能带（并行写出，带进度条）
//! - 输出文件名 `<stem>_band_<label>.bxsf`
//! - 报告每条能带的能量范围
//! - 写入失败时删除不完整的输出文件
//!
//! ## 依赖关系
//! - 使用 `cli/extract.rs` 定义的参数
//! - 使用 `parsers/bxsf.rs`, `bands/extractor.rs`
//! - 使用 `batch/runner.rs` 并行写出
//! - 使用 `utils/output.rs`
//! - 被 `commands/run.rs` 复用

use crate::bands;
use crate::batch::{BatchRunner, ProcessResult};
use crate::cli::extract::{BandSelection, ExtractArgs, ExtractOptions};
use crate::error::{Result, SkeafError};
use crate::models::GridDocument;
use crate::parsers;
use crate::utils::output;

use std::fs;
use std::path::{Path, PathBuf};

/// 已写出的单带文件
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenBand {
    pub label: i32,
    pub path: PathBuf,
    pub min: f64,
    pub max: f64,
}

impl WrittenBand {
    /// 能量范围报告行
    pub fn report_line(&self) -> String {
        format!("Min and max of band {} : {} {}", self.label, self.min, self.max)
    }
}

/// 执行能带抽取
pub fn execute(args: ExtractArgs) -> Result<()> {
    output::print_header("Extracting Bands for SKEAF");

    let doc = parsers::parse_bxsf_file(&args.input)?;
    output::print_success(&format!(
        "Loaded '{}' ({} bands)",
        args.input.display(),
        doc.bands.len()
    ));

    extract_and_write(&doc, args.band, &args.options)?;
    Ok(())
}

/// 输出文件名：去掉结尾的 `.bxsf` 后追加 `_band_<label>.bxsf`
pub fn band_output_path(output: &Path, label: i32) -> PathBuf {
    let name = output.to_string_lossy();
    let stem = name.strip_suffix(".bxsf").unwrap_or(&name);
    PathBuf::from(format!("{}_band_{}.bxsf", stem, label))
}

/// 抽取并写出选定的能带
pub fn extract_and_write(
    doc: &GridDocument,
    selection: BandSelection,
    options: &ExtractOptions,
) -> Result<Vec<WrittenBand>> {
    if options.shift_fermi != 0.0 {
        output::print_info(&format!(
            "Shifting the Fermi energy by {} (new value {})",
            options.shift_fermi,
            doc.fermi_energy + options.shift_fermi
        ));
    }

    match selection {
        BandSelection::Single(label) => {
            let written = write_band(doc, label, options)?;
            println!("{}", written.report_line());
            output::print_success(&format!(
                "Band {} saved to '{}'",
                label,
                written.path.display()
            ));
            Ok(vec![written])
        }
        BandSelection::All => write_all_bands(doc, options),
    }
}

fn write_all_bands(doc: &GridDocument, options: &ExtractOptions) -> Result<Vec<WrittenBand>> {
    let labels = doc.band_labels();
    output::print_report(
        "Bands in bxsf",
        labels
            .iter()
            .map(|l| l.to_string())
            .collect::<Vec<_>>()
            .join(" "),
    );

    let runner = BatchRunner::new(options.jobs);
    output::print_info(&format!(
        "Writing {} bands using {} parallel jobs",
        labels.len(),
        runner.jobs()
    ));

    let result = runner.run(&labels, "Writing", |&label| {
        match write_band(doc, label, options) {
            Ok(written) => ProcessResult::Success(written.report_line()),
            Err(e) => ProcessResult::Failed(format!("band {}", label), e.to_string()),
        }
    });

    for line in &result.messages {
        println!("{}", line);
    }

    output::print_separator();

    if result.failed > 0 {
        output::print_warning("Failed bands:");
        for (name, err) in &result.failures {
            output::print_error(&format!("  {}: {}", name, err));
        }
        return Err(SkeafError::BatchFailed {
            failed: result.failed,
            total: result.total(),
        });
    }

    output::print_done(&format!("Wrote {} band files", result.success));

    // 抽取不改变本征值，范围直接取自源文档
    doc.bands
        .iter()
        .map(|band| {
            let (min, max) = band_range(band.label, band.min_max())?;
            Ok(WrittenBand {
                label: band.label,
                path: band_output_path(&options.output, band.label),
                min,
                max,
            })
        })
        .collect()
}

fn band_range(label: i32, range: Option<(f64, f64)>) -> Result<(f64, f64)> {
    range.ok_or_else(|| SkeafError::InvalidArgument(format!("band {} has no eigenvalues", label)))
}

/// 抽取一条能带并写出
fn write_band(doc: &GridDocument, label: i32, options: &ExtractOptions) -> Result<WrittenBand> {
    let single = bands::extract_one(doc, label, options.shift_fermi)?;
    let (min, max) = band_range(label, single.bands.first().and_then(|b| b.min_max()))?;

    let path = band_output_path(&options.output, label);
    write_output(&path, &parsers::to_bxsf_string(&single))?;

    Ok(WrittenBand {
        label,
        path,
        min,
        max,
    })
}

/// 写出文件，失败时删除残留
fn write_output(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| {
        let _ = fs::remove_file(path);
        SkeafError::FileWriteError {
            path: path.display().to_string(),
            source: e,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bands::CONV_FACTOR;
    use crate::parsers::parse_bxsf_content;

    const SAMPLE: &str = "\
   BEGIN_INFO
      Fermi Energy:    5.5
   END_INFO
BEGIN_BLOCK_BANDGRID_3D
from_wannier_code
BEGIN_BANDGRID_3D_fermi
3
1 1 2
0.0 0.0 0.0
1.2 0.0 0.0
0.0 1.2 0.0
-0.3 0.4 2.5
BAND: 2
   0.1 0.2
BAND: 9
   1.5 -0.5
BAND: 4
   3.0 4.0
END_BANDGRID_3D
END_BLOCK_BANDGRID_3D
";

    fn options(output: PathBuf, jobs: usize) -> ExtractOptions {
        ExtractOptions {
            output,
            shift_fermi: 0.0,
            jobs,
        }
    }

    #[test]
    fn test_band_output_path() {
        assert_eq!(
            band_output_path(Path::new("skeaf.bxsf"), 5),
            PathBuf::from("skeaf_band_5.bxsf")
        );
        assert_eq!(
            band_output_path(Path::new("out/fermi"), 12),
            PathBuf::from("out/fermi_band_12.bxsf")
        );
        assert_eq!(
            band_output_path(Path::new("a.bxsf.bxsf"), 1),
            PathBuf::from("a.bxsf_band_1.bxsf")
        );
    }

    #[test]
    fn test_report_line() {
        let written = WrittenBand {
            label: 9,
            path: PathBuf::from("skeaf_band_9.bxsf"),
            min: -0.5,
            max: 1.5,
        };
        assert_eq!(written.report_line(), "Min and max of band 9 : -0.5 1.5");
    }

    #[test]
    fn test_single_band_file() {
        let dir = tempfile::tempdir().unwrap();
        let doc = parse_bxsf_content(SAMPLE).unwrap();
        let written = extract_and_write(
            &doc,
            BandSelection::Single(9),
            &options(dir.path().join("skeaf.bxsf"), 1),
        )
        .unwrap();

        assert_eq!(written.len(), 1);
        assert_eq!(written[0].path, dir.path().join("skeaf_band_9.bxsf"));
        assert_eq!((written[0].min, written[0].max), (-0.5, 1.5));

        let text = fs::read_to_string(&written[0].path).unwrap();
        assert!(text.lines().all(|l| !l.starts_with(' ') && !l.starts_with('\t')));

        let reparsed = parse_bxsf_content(&text).unwrap();
        assert_eq!(reparsed.band_labels(), vec![9]);
        assert_eq!(reparsed.fermi_energy, 5.5);
        assert!((reparsed.lattice_vectors[0][0] - 1.2 / CONV_FACTOR).abs() < 1e-9);
    }

    #[test]
    fn test_all_bands_in_parallel() {
        let dir = tempfile::tempdir().unwrap();
        let doc = parse_bxsf_content(SAMPLE).unwrap();
        let mut opts = options(dir.path().join("skeaf"), 2);
        opts.shift_fermi = 0.5;

        let written = extract_and_write(&doc, BandSelection::All, &opts).unwrap();
        let labels: Vec<i32> = written.iter().map(|w| w.label).collect();
        assert_eq!(labels, vec![2, 9, 4]);

        for w in &written {
            let reparsed = parse_bxsf_content(&fs::read_to_string(&w.path).unwrap()).unwrap();
            assert_eq!(reparsed.band_labels(), vec![w.label]);
            assert!((reparsed.fermi_energy - 6.0).abs() < 1e-12);
        }
        assert_eq!((written[2].min, written[2].max), (3.0, 4.0));
    }

    #[test]
    fn test_missing_band_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let doc = parse_bxsf_content(SAMPLE).unwrap();
        let err = extract_and_write(
            &doc,
            BandSelection::Single(7),
            &options(dir.path().join("skeaf.bxsf"), 1),
        )
        .unwrap_err();

        assert!(matches!(err, SkeafError::BandNotFound { label: 7, .. }));
        assert!(!dir.path().join("skeaf_band_7.bxsf").exists());
    }

    #[test]
    fn test_unwritable_output_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let doc = parse_bxsf_content(SAMPLE).unwrap();
        let target = dir.path().join("missing_dir").join("skeaf.bxsf");
        let err = extract_and_write(&doc, BandSelection::Single(2), &options(target, 1)).unwrap_err();

        assert!(matches!(err, SkeafError::FileWriteError { .. }));
        assert!(!dir.path().join("missing_dir").exists());
    }

    #[test]
    fn test_execute_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("nscf.bxsf");
        fs::write(&input, SAMPLE).unwrap();

        execute(ExtractArgs {
            input,
            band: BandSelection::Single(4),
            options: options(dir.path().join("skeaf.bxsf"), 0),
        })
        .unwrap();

        assert!(dir.path().join("skeaf_band_4.bxsf").exists());
    }
}
