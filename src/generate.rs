//! Deterministic generator for coordinate-pair documents and their
//! reference answers.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::answers::write_answer;
use crate::haversine::{self, EARTH_RADIUS_KM};

/// Guards against accidentally producing enormous files.
pub const MAX_PAIR_COUNT: u64 = 1 << 34;

const MAX_ALLOWED_X: f64 = 180.0;
const MAX_ALLOWED_Y: f64 = 90.0;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("pair count must be less than {max}, got {count}")]
    TooManyPairs { count: u64, max: u64 },
    #[error("failed to write generated JSON")]
    Json(#[source] io::Error),
    #[error("failed to write answers")]
    Answers(#[source] io::Error),
    #[error("failed to write {}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Small four-lane PRNG. Same seed, same sequence.
#[derive(Debug, Clone)]
pub struct RandomSeries {
    a: u64,
    b: u64,
    c: u64,
    d: u64,
}

impl RandomSeries {
    pub fn seed(value: u64) -> Self {
        let mut series = RandomSeries {
            a: 0xf1ea5eed,
            b: value,
            c: value,
            d: value,
        };
        for _ in 0..20 {
            series.next_u64();
        }
        series
    }

    pub fn next_u64(&mut self) -> u64 {
        let e = self.a.wrapping_sub(self.b.rotate_left(27));
        self.a = self.b ^ self.c.rotate_left(17);
        self.b = self.c.wrapping_add(self.d);
        self.c = self.d.wrapping_add(e);
        self.d = e.wrapping_add(self.a);
        self.d
    }

    pub fn in_range(&mut self, min: f64, max: f64) -> f64 {
        let t = self.next_u64() as f64 / u64::MAX as f64;
        (1.0 - t) * min + t * max
    }

    fn degree(&mut self, center: f64, radius: f64, max_allowed: f64) -> f64 {
        let min = (center - radius).max(-max_allowed);
        let max = (center + radius).min(max_allowed);
        self.in_range(min, max)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, clap::ValueEnum)]
pub enum Method {
    /// Points spread over the whole globe.
    Uniform,
    /// Points grouped around periodically re-drawn centres.
    Cluster,
}

impl Method {
    pub fn name(self) -> &'static str {
        match self {
            Method::Uniform => "uniform",
            Method::Cluster => "cluster",
        }
    }
}

#[derive(Debug, Copy, Clone)]
pub struct Config {
    pub method: Method,
    pub seed: u64,
    pub pair_count: u64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Summary {
    pub method: Method,
    pub seed: u64,
    pub pair_count: u64,
    pub expected_mean: f64,
}

#[derive(Debug, Clone)]
pub struct Output {
    pub summary: Summary,
    pub json_path: PathBuf,
    pub answers_path: PathBuf,
}

struct Region {
    x_center: f64,
    y_center: f64,
    x_radius: f64,
    y_radius: f64,
}

impl Region {
    fn globe() -> Self {
        Region {
            x_center: 0.0,
            y_center: 0.0,
            x_radius: MAX_ALLOWED_X,
            y_radius: MAX_ALLOWED_Y,
        }
    }

    fn random(series: &mut RandomSeries) -> Self {
        Region {
            x_center: series.in_range(-MAX_ALLOWED_X, MAX_ALLOWED_X),
            y_center: series.in_range(-MAX_ALLOWED_Y, MAX_ALLOWED_Y),
            x_radius: series.in_range(0.0, MAX_ALLOWED_X),
            y_radius: series.in_range(0.0, MAX_ALLOWED_Y),
        }
    }
}

/// Writes the JSON document to `json` and the binary answers to `answers`.
pub fn generate(config: &Config, mut json: impl Write, mut answers: impl Write) -> Result<Summary, Error> {
    if config.pair_count >= MAX_PAIR_COUNT {
        return Err(Error::TooManyPairs {
            count: config.pair_count,
            max: MAX_PAIR_COUNT,
        });
    }
    tracing::debug!(method = config.method.name(), seed = config.seed, pairs = config.pair_count, "generating");

    let mut series = RandomSeries::seed(config.seed);
    let cluster_max = 1 + config.pair_count / 64;
    let mut cluster_left = match config.method {
        Method::Uniform => u64::MAX,
        Method::Cluster => 0,
    };
    let mut region = Region::globe();

    let coef = 1.0 / config.pair_count as f64;
    let mut sum = 0.0;

    json.write_all(b"{\"pairs\":[\n").map_err(Error::Json)?;
    for index in 0..config.pair_count {
        if cluster_left == 0 {
            cluster_left = cluster_max;
            region = Region::random(&mut series);
        } else {
            cluster_left -= 1;
        }

        let x0 = series.degree(region.x_center, region.x_radius, MAX_ALLOWED_X);
        let y0 = series.degree(region.y_center, region.y_radius, MAX_ALLOWED_Y);
        let x1 = series.degree(region.x_center, region.x_radius, MAX_ALLOWED_X);
        let y1 = series.degree(region.y_center, region.y_radius, MAX_ALLOWED_Y);

        let distance = haversine::distance(x0, y0, x1, y1, EARTH_RADIUS_KM);
        sum += coef * distance;

        let sep = if index + 1 == config.pair_count { "\n" } else { ",\n" };
        write!(
            json,
            "    {{\"x0\":{:.16}, \"y0\":{:.16}, \"x1\":{:.16}, \"y1\":{:.16}}}{}",
            x0, y0, x1, y1, sep
        )
        .map_err(Error::Json)?;
        write_answer(&mut answers, distance).map_err(Error::Answers)?;
    }
    json.write_all(b"]}\n").map_err(Error::Json)?;
    write_answer(&mut answers, sum).map_err(Error::Answers)?;

    json.flush().map_err(Error::Json)?;
    answers.flush().map_err(Error::Answers)?;

    Ok(Summary {
        method: config.method,
        seed: config.seed,
        pair_count: config.pair_count,
        expected_mean: sum,
    })
}

pub fn file_name(pair_count: u64, label: &str) -> String {
    format!("data_{}_{}.json", pair_count, label)
}

fn create(path: &Path) -> Result<BufWriter<File>, Error> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })
}

// Stream-level write failures gain the path of the file behind the stream.
fn with_paths(err: Error, json_path: &Path, answers_path: &Path) -> Error {
    match err {
        Error::Json(source) => Error::Write {
            path: json_path.to_path_buf(),
            source,
        },
        Error::Answers(source) => Error::Write {
            path: answers_path.to_path_buf(),
            source,
        },
        other => other,
    }
}

/// Generates `data_{n}_flex.json` and `data_{n}_haveranswer.json` in `dir`.
pub fn generate_files(config: &Config, dir: &Path) -> Result<Output, Error> {
    if config.pair_count >= MAX_PAIR_COUNT {
        return Err(Error::TooManyPairs {
            count: config.pair_count,
            max: MAX_PAIR_COUNT,
        });
    }
    let json_path = dir.join(file_name(config.pair_count, "flex"));
    let answers_path = dir.join(file_name(config.pair_count, "haveranswer"));

    let summary = generate(config, create(&json_path)?, create(&answers_path)?)
        .map_err(|err| with_paths(err, &json_path, &answers_path))?;
    tracing::info!(
        json = %json_path.display(),
        answers = %answers_path.display(),
        "wrote generated data"
    );

    Ok(Output {
        summary,
        json_path,
        answers_path,
    })
}
