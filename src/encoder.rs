//! Dataflow encoders
//!
//! Each encoder turns an operand (or the golden product) into a
//! `PackedStream`: the sequence of packed words the testbench feeds, one
//! per simulation time-step.
//!
//! For A = M x K, B = K x N and an array of M input lanes:
//! - weights: line `k` packs row `k` of B across N lanes
//! - output-stationary: line `k` packs column `k` of A across M lanes
//! - weight-stationary: K is cut into blocks of M; line `(b, m)` packs
//!   `A[m, b*M .. b*M + M]`, zero-padded past K
//! - golden: one line packing all of C row-major, `(0, 0)` in lane 0

use num_bigint::{BigInt, BigUint};

use crate::config::{Dataflow, VectorConfig};
use crate::error::GenResult;
use crate::hexfmt::format_hex;
use crate::matrix::{GoldenMatrix, Matrix};
use crate::packing::{pack, unpack};

/// Ordered packed words sharing one lane layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedStream {
    pub lanes: usize,
    pub lane_width: usize,
    pub words: Vec<BigUint>,
}

impl PackedStream {
    pub fn new(lanes: usize, lane_width: usize) -> Self {
        Self {
            lanes,
            lane_width,
            words: Vec::new(),
        }
    }

    pub fn push(&mut self, word: BigUint) {
        self.words.push(word);
    }

    /// Bit width of every word in the stream
    pub fn total_bits(&self) -> usize {
        self.lanes * self.lane_width
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Render every word as one fixed-width hex line
    pub fn to_hex_lines(&self) -> GenResult<Vec<String>> {
        let bits = self.total_bits();
        self.words.iter().map(|w| format_hex(w, bits)).collect()
    }

    /// Signed lane values of each word, lane 0 first
    pub fn decode(&self) -> Vec<Vec<BigInt>> {
        self.words
            .iter()
            .map(|w| unpack(w, self.lanes, self.lane_width))
            .collect()
    }
}

/// One line per contraction step, each packing a row of B
pub fn encode_weights(b: &Matrix, ip_width: usize) -> PackedStream {
    let mut stream = PackedStream::new(b.cols(), ip_width);
    for k in 0..b.rows() {
        stream.push(pack(b.row(k).iter().copied(), ip_width));
    }
    stream
}

/// One line per contraction step, each packing a column of A
pub fn encode_output_stationary(a: &Matrix, ip_width: usize) -> PackedStream {
    let mut stream = PackedStream::new(a.rows(), ip_width);
    for k in 0..a.cols() {
        stream.push(pack(a.column(k), ip_width));
    }
    stream
}

/// `ceil(k / rows)` blocks of `rows` lines; lanes past the end of the
/// contraction dimension are zero.
pub fn encode_weight_stationary(a: &Matrix, ip_width: usize) -> PackedStream {
    let rows = a.rows();
    let k_dim = a.cols();
    let mut stream = PackedStream::new(rows, ip_width);
    if rows == 0 {
        return stream;
    }

    let num_blocks = (k_dim + rows - 1) / rows;
    for block in 0..num_blocks {
        let k_base = block * rows;
        for m in 0..rows {
            let lanes = (0..rows).map(|i| {
                let kk = k_base + i;
                if kk < k_dim {
                    a.get(m, kk)
                } else {
                    0
                }
            });
            stream.push(pack(lanes, ip_width));
        }
    }
    stream
}

/// Encode A for the given dataflow
pub fn encode_inputs(a: &Matrix, ip_width: usize, dataflow: Dataflow) -> PackedStream {
    match dataflow {
        Dataflow::OutputStationary => encode_output_stationary(a, ip_width),
        Dataflow::WeightStationary => encode_weight_stationary(a, ip_width),
    }
}

/// Flatten C into a single word of `rows * cols` lanes.
///
/// Elements wider than `op_width` wrap modulo `2^op_width`; the caller is
/// responsible for choosing an `op_width` that holds the products.
pub fn encode_golden(c: &GoldenMatrix, op_width: usize) -> PackedStream {
    let mut stream = PackedStream::new(c.rows() * c.cols(), op_width);
    stream.push(pack(c.iter().cloned(), op_width));
    stream
}

/// All streams for one run
#[derive(Debug, Clone)]
pub struct EncodedVectors {
    pub inputs: Vec<(Dataflow, PackedStream)>,
    pub weights: PackedStream,
    pub golden: PackedStream,
}

/// Run every encoder the configuration selects over `a` and `b`
pub fn encode_all(config: &VectorConfig, a: &Matrix, b: &Matrix) -> GenResult<EncodedVectors> {
    let c = a.matmul(b)?;
    let golden = encode_golden(&c, config.op_width);
    let weights = encode_weights(b, config.ip_width);
    let inputs = config
        .flow
        .dataflows()
        .iter()
        .map(|&df| (df, encode_inputs(a, config.ip_width, df)))
        .collect();

    Ok(EncodedVectors {
        inputs,
        weights,
        golden,
    })
}
