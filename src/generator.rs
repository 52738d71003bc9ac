//! Top-level generation run: synthesize operands, encode, hand lines to a sink

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::config::{Dataflow, VectorConfig, GOLDEN_FILE, WEIGHT_FILE};
use crate::encoder::{encode_all, PackedStream};
use crate::error::{GenError, GenResult};
use crate::matrix::{Matrix, MatrixSource, RandomSource};
use crate::sink::{FileSink, VectorSink};

/// What a vector file carries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VectorKind {
    Input(Dataflow),
    Weights,
    Golden,
}

/// One written vector file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileReport {
    pub name: String,
    pub kind: VectorKind,
    pub lines: usize,
    pub hex_digits: usize,
}

/// Manifest of a generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub config: VectorConfig,
    pub files: Vec<FileReport>,
}

impl GenerationReport {
    pub fn file_names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }

    /// Export to JSON format
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn emit(
    sink: &mut dyn VectorSink,
    report: &mut GenerationReport,
    name: String,
    kind: VectorKind,
    stream: &PackedStream,
) -> GenResult<()> {
    let lines = stream.to_hex_lines()?;
    sink.write_lines(&name, &lines)?;
    report.files.push(FileReport {
        name,
        kind,
        lines: lines.len(),
        hex_digits: crate::hexfmt::hex_digits(stream.total_bits()),
    });
    Ok(())
}

/// Sources are injected, so their output is checked against the config
fn expect_shape(name: &str, matrix: &Matrix, shape: (usize, usize)) -> GenResult<()> {
    if matrix.shape() != shape {
        return Err(GenError::shape(
            format!("{} of {}x{}", name, shape.0, shape.1),
            format!("{}x{}", matrix.rows(), matrix.cols()),
        ));
    }
    Ok(())
}

/// Generate A and B from `source`, then write weights, golden and the
/// selected input encodings to `sink`.
pub fn generate(
    config: &VectorConfig,
    source: &mut dyn MatrixSource,
    sink: &mut dyn VectorSink,
) -> GenResult<GenerationReport> {
    config.validate()?;
    info!(%config, "generating systolic vectors");

    if config.op_width < config.exact_op_width() {
        warn!(
            op_width = config.op_width,
            exact = config.exact_op_width(),
            "op_width may be too narrow; golden elements wrap modulo 2^op_width"
        );
    }

    let (min, max) = (config.min_value(), config.max_value());
    let a = source.matrix(config.rows, config.k_dim, min, max)?;
    expect_shape("A", &a, (config.rows, config.k_dim))?;
    let b = source.matrix(config.k_dim, config.cols, min, max)?;
    expect_shape("B", &b, (config.k_dim, config.cols))?;

    let encoded = encode_all(config, &a, &b)?;

    let mut report = GenerationReport {
        config: config.clone(),
        files: Vec::new(),
    };

    emit(sink, &mut report, WEIGHT_FILE.to_string(), VectorKind::Weights, &encoded.weights)?;
    emit(sink, &mut report, GOLDEN_FILE.to_string(), VectorKind::Golden, &encoded.golden)?;
    for (dataflow, stream) in &encoded.inputs {
        let name = config.flow.input_file_name(*dataflow);
        emit(sink, &mut report, name, VectorKind::Input(*dataflow), stream)?;
    }

    info!(files = ?report.file_names(), "wrote vector files");
    Ok(report)
}

/// Random operands (seeded from the config when set) written into `dir`
pub fn generate_to_dir(config: &VectorConfig, dir: impl AsRef<Path>) -> GenResult<GenerationReport> {
    let mut source = RandomSource::new(config.seed);
    let mut sink = FileSink::new(dir.as_ref());
    generate(config, &mut source, &mut sink)
}
