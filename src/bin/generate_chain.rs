use std::collections::BTreeMap;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use nalgebra::DMatrix;
use parquet::arrow::ArrowWriter;
use pta_panda::data::loader::save_pulsar;
use pta_panda::data::pulsar::{Pulsar, SECONDS_PER_DAY};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

const N_SAMPLES: usize = 20_000;
const N_TOAS: usize = 600;

const PARAMS: [&str; 3] = ["gw_log10_A", "gw_gamma", "nmodel"];
const AUX: [&str; 4] = ["lnlike", "lnprior", "chain_accept", "pt_chain_accept"];

/// Draw a correlated chain: log10 A follows an AR(1) walk reflected inside
/// the [-18, -14] prior, the model index hops between 0 and 1 with a small
/// switching probability.
fn generate_samples(rng: &mut StdRng) -> Result<DMatrix<f64>> {
    let noise = Normal::new(0.0, 1.0).context("unit normal")?;
    let gamma = Normal::new(13.0 / 3.0, 0.4).context("gamma prior")?;

    let (lo, hi): (f64, f64) = (-18.0, -14.0);
    let (mean, phi, step): (f64, f64, f64) = (-14.9, 0.9, 0.15);

    let mut log10_a = mean;
    let mut model = 1.0_f64;

    let mut samples = DMatrix::zeros(N_SAMPLES, PARAMS.len() + AUX.len());
    for r in 0..N_SAMPLES {
        log10_a = mean + phi * (log10_a - mean) + step * noise.sample(rng);
        if log10_a > hi {
            log10_a = 2.0 * hi - log10_a;
        }
        if log10_a < lo {
            log10_a = 2.0 * lo - log10_a;
        }
        if rng.random::<f64>() < 0.02 {
            model = 1.0 - model;
        }

        let lnlike = -0.5 * ((log10_a - mean) / 0.3).powi(2) + 1250.0;
        samples[(r, 0)] = log10_a;
        samples[(r, 1)] = gamma.sample(rng);
        samples[(r, 2)] = model + rng.random_range(-0.45..0.45);
        samples[(r, 3)] = lnlike;
        samples[(r, 4)] = -(hi - lo).ln();
        samples[(r, 5)] = rng.random_range(0.2..0.4);
        samples[(r, 6)] = rng.random_range(0.5..0.9);
    }
    Ok(samples)
}

fn write_text_chain(samples: &DMatrix<f64>, dir: &Path) -> Result<()> {
    let path = dir.join("chain_1.txt");
    let mut out = BufWriter::new(std::fs::File::create(&path).context("creating chain_1.txt")?);
    for row in samples.row_iter() {
        let line = row.iter().map(|v| format!("{v:.8}")).collect::<Vec<_>>().join("\t");
        writeln!(out, "{line}")?;
    }
    out.flush()?;

    std::fs::write(dir.join("pars.txt"), PARAMS.join("\n") + "\n").context("writing pars.txt")?;
    Ok(())
}

fn write_parquet_chain(samples: &DMatrix<f64>, dir: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(
        PARAMS
            .iter()
            .chain(AUX.iter())
            .map(|n| Field::new(*n, DataType::Float64, false))
            .collect::<Vec<_>>(),
    ));

    let columns = (0..samples.ncols())
        .map(|c| Arc::new(Float64Array::from(samples.column(c).iter().copied().collect::<Vec<_>>())) as ArrayRef)
        .collect::<Vec<_>>();
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(dir.join("chain.parquet")).context("creating chain.parquet")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

/// Weekly-ish TOAs over ~11 years from two receivers, with a DMX-style
/// design column that only covers the first year.
fn generate_pulsar(rng: &mut StdRng) -> Result<Pulsar> {
    let jitter = Normal::new(0.0, 0.8).context("jitter")?;
    let white = Normal::new(0.0, 1e-7).context("white noise")?;

    let mjd0 = 53000.0;
    let mut days: Vec<f64> = (0..N_TOAS)
        .map(|i| mjd0 + i as f64 * 7.0 + jitter.sample(rng))
        .collect();
    days.sort_by(|a, b| a.total_cmp(b));

    let toas: Vec<f64> = days.iter().map(|d| d * SECONDS_PER_DAY).collect();
    let receivers: Vec<String> = (0..N_TOAS)
        .map(|_| if rng.random::<bool>() { "Rcvr1_2" } else { "Rcvr_800" }.to_string())
        .collect();
    let ssbfreqs: Vec<f64> = receivers
        .iter()
        .map(|r| if r == "Rcvr_800" { 8.2e8 } else { 1.4e9 })
        .collect();

    let t_mid = 0.5 * (toas[0] + toas[N_TOAS - 1]);
    let designmatrix = DMatrix::from_fn(N_TOAS, 4, |r, c| {
        let dt = (toas[r] - t_mid) / 1e8;
        match c {
            0 => 1.0,
            1 => dt,
            2 => dt * dt,
            _ => {
                if days[r] < mjd0 + 365.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    });

    let planetssb = (0..N_TOAS)
        .map(|r| DMatrix::from_fn(9, 6, |p, k| ((p + 1) as f64) * (days[r] / 365.25 + k as f64).sin()))
        .collect();

    let mut flags = BTreeMap::new();
    flags.insert("be".to_string(), vec!["GUPPI".to_string(); N_TOAS]);
    flags.insert("fe".to_string(), receivers);

    Ok(Pulsar {
        name: "J1909-3744".to_string(),
        toaerrs: vec![1e-7; N_TOAS],
        residuals: (0..N_TOAS).map(|_| white.sample(rng)).collect(),
        ssbfreqs,
        designmatrix,
        flags,
        planetssb: Some(planetssb),
        toas,
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_output"));
    std::fs::create_dir_all(&out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = StdRng::seed_from_u64(42);

    let samples = generate_samples(&mut rng)?;
    write_text_chain(&samples, &out_dir)?;
    write_parquet_chain(&samples, &out_dir)?;

    let psr = generate_pulsar(&mut rng)?;
    save_pulsar(&psr, &out_dir.join(format!("{}.json", psr.name)))?;

    println!(
        "Wrote {N_SAMPLES} samples x {} columns and pulsar {} ({N_TOAS} TOAs) to {}",
        samples.ncols(),
        psr.name,
        out_dir.display()
    );
    Ok(())
}
