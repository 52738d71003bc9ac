//! Generator configuration and the width/line arithmetic derived from it
//!
//! The widths here mirror the testbench ports of the systolic array: an
//! input bus of `rows` lanes, a weight bus of `cols` lanes (both `ip_width`
//! bits per lane) and a flattened output bus of `rows * cols` lanes of
//! `op_width` bits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{GenError, GenResult};
use crate::hexfmt::hex_digits;

pub const WEIGHT_FILE: &str = "weight_matrix.hex";
pub const GOLDEN_FILE: &str = "golden_output.hex";

/// Widest golden lane accepted; exact products of 63-bit inputs need far less
pub const MAX_OP_WIDTH: usize = 1024;

/// How matrix A is streamed into the array
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Dataflow {
    /// One column of A per contraction step; outputs stay resident
    OutputStationary,
    /// Rows of A re-blocked into `rows`-wide chunks of the contraction dimension
    WeightStationary,
}

impl Dataflow {
    pub fn short_name(&self) -> &'static str {
        match self {
            Dataflow::OutputStationary => "os",
            Dataflow::WeightStationary => "ws",
        }
    }
}

impl fmt::Display for Dataflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name().to_uppercase())
    }
}

/// Which input encoders run for a generation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FlowSelection {
    Os,
    #[default]
    Ws,
    Both,
}

impl FlowSelection {
    pub fn dataflows(&self) -> &'static [Dataflow] {
        match self {
            FlowSelection::Os => &[Dataflow::OutputStationary],
            FlowSelection::Ws => &[Dataflow::WeightStationary],
            FlowSelection::Both => &[Dataflow::OutputStationary, Dataflow::WeightStationary],
        }
    }

    /// Input file name for `dataflow`; split into suffixed files only when both run
    pub fn input_file_name(&self, dataflow: Dataflow) -> String {
        match self {
            FlowSelection::Both => format!("input_matrix_{}.hex", dataflow.short_name()),
            _ => "input_matrix.hex".to_string(),
        }
    }
}

impl FromStr for FlowSelection {
    type Err = GenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "os" | "output_stationary" | "outputstationary" => Ok(FlowSelection::Os),
            "ws" | "weight_stationary" | "weightstationary" => Ok(FlowSelection::Ws),
            "both" => Ok(FlowSelection::Both),
            _ => Err(GenError::flow(s)),
        }
    }
}

impl fmt::Display for FlowSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowSelection::Os => "os",
            FlowSelection::Ws => "ws",
            FlowSelection::Both => "both",
        };
        write!(f, "{}", name)
    }
}

/// Configuration for one generation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VectorConfig {
    /// Rows of A and of the output; also the array's input lane count
    pub rows: usize,
    /// Columns of B and of the output
    pub cols: usize,
    /// Bit width of input matrix elements
    pub ip_width: usize,
    /// Bit width of each golden output element
    pub op_width: usize,
    /// Contraction dimension
    #[serde(alias = "k")]
    pub k_dim: usize,
    pub seed: Option<u64>,
    pub flow: FlowSelection,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            rows: 16,
            cols: 16,
            ip_width: 8,
            op_width: 32,
            k_dim: 128,
            seed: None,
            flow: FlowSelection::Ws,
        }
    }
}

impl VectorConfig {
    pub fn new(rows: usize, cols: usize, ip_width: usize, op_width: usize, k_dim: usize) -> Self {
        Self {
            rows,
            cols,
            ip_width,
            op_width,
            k_dim,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_flow(mut self, flow: FlowSelection) -> Self {
        self.flow = flow;
        self
    }

    /// Load a configuration from a JSON file; missing keys take defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> GenResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| GenError::io(path, e))?;
        serde_json::from_str(&text)
            .map_err(|e| GenError::config(format!("{}: {}", path.display(), e)))
    }

    pub fn validate(&self) -> GenResult<()> {
        for (name, value) in [("rows", self.rows), ("cols", self.cols), ("k", self.k_dim)] {
            if value == 0 {
                return Err(GenError::config(format!("{} must be at least 1", name)));
            }
        }
        if !(1..=63).contains(&self.ip_width) {
            return Err(GenError::config(format!(
                "ip_width must be between 1 and 63, got {}",
                self.ip_width
            )));
        }
        if !(1..=MAX_OP_WIDTH).contains(&self.op_width) {
            return Err(GenError::config(format!(
                "op_width must be between 1 and {}, got {}",
                MAX_OP_WIDTH, self.op_width
            )));
        }

        let products = [
            ("rows * cols * op_width", self.rows.checked_mul(self.cols), self.op_width),
            ("rows * ip_width", Some(self.rows), self.ip_width),
            ("cols * ip_width", Some(self.cols), self.ip_width),
            ("rows * k", Some(self.rows), self.k_dim),
            ("k * cols", Some(self.k_dim), self.cols),
            ("ws_blocks * rows", Some(self.ws_blocks()), self.rows),
        ];
        for (name, lhs, rhs) in products {
            if lhs.and_then(|l| l.checked_mul(rhs)).is_none() {
                return Err(GenError::config(format!("{} overflows usize", name)));
            }
        }
        Ok(())
    }

    /// Get the maximum value that can be represented
    pub fn max_value(&self) -> i64 {
        (1i64 << (self.ip_width - 1)) - 1
    }

    /// Get the minimum value that can be represented
    pub fn min_value(&self) -> i64 {
        -(1i64 << (self.ip_width - 1))
    }

    /// Output width that holds every possible product without wraparound.
    ///
    /// Conservative: `2 * ip_width` bits per product plus `ceil(log2(k))`
    /// bits of accumulation growth.
    pub fn exact_op_width(&self) -> usize {
        let growth = (usize::BITS - self.k_dim.saturating_sub(1).leading_zeros()) as usize;
        2 * self.ip_width + growth
    }

    pub fn input_bits(&self) -> usize {
        self.rows * self.ip_width
    }

    pub fn weight_bits(&self) -> usize {
        self.cols * self.ip_width
    }

    pub fn golden_bits(&self) -> usize {
        self.rows * self.cols * self.op_width
    }

    pub fn input_hex_digits(&self) -> usize {
        hex_digits(self.input_bits())
    }

    pub fn weight_hex_digits(&self) -> usize {
        hex_digits(self.weight_bits())
    }

    pub fn golden_hex_digits(&self) -> usize {
        hex_digits(self.golden_bits())
    }

    /// Number of `rows`-wide blocks the contraction dimension splits into
    pub fn ws_blocks(&self) -> usize {
        self.k_dim.div_ceil(self.rows.max(1))
    }

    /// Lines in the input file for `dataflow`
    pub fn input_lines(&self, dataflow: Dataflow) -> usize {
        match dataflow {
            Dataflow::OutputStationary => self.k_dim,
            Dataflow::WeightStationary => self.ws_blocks() * self.rows,
        }
    }
}

impl fmt::Display for VectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows={} cols={} ip={} op={} k={} flow={}",
            self.rows, self.cols, self.ip_width, self.op_width, self.k_dim, self.flow
        )
    }
}
