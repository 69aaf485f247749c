//! Binary reference answers: one little-endian `f64` distance per pair,
//! followed by the mean of all distances.

use std::io::{self, Write};

const WIDTH: usize = std::mem::size_of::<f64>();

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("answer data is empty")]
    Empty,
    #[error("answer data length {0} is not a multiple of 8")]
    Misaligned(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Answers {
    pub distances: Vec<f64>,
    pub mean: f64,
}

pub fn write_answer(mut w: impl Write, value: f64) -> io::Result<()> {
    w.write_all(&value.to_le_bytes())
}

pub fn read_answers(bytes: &[u8]) -> Result<Answers, Error> {
    if bytes.is_empty() {
        return Err(Error::Empty);
    }
    if bytes.len() % WIDTH != 0 {
        return Err(Error::Misaligned(bytes.len()));
    }

    let mut values: Vec<f64> = bytes
        .chunks_exact(WIDTH)
        .map(|chunk| {
            let mut buf = [0u8; WIDTH];
            buf.copy_from_slice(chunk);
            f64::from_le_bytes(buf)
        })
        .collect();
    let mean = values.pop().ok_or(Error::Empty)?;

    Ok(Answers {
        distances: values,
        mean,
    })
}
