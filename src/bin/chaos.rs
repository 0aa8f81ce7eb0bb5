// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate failure;
extern crate itertools;
extern crate mandelchaos;
extern crate num;
extern crate num_cpus;
extern crate rand;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use itertools::Itertools;
use mandelchaos::{
    checked_count, BifurcationRequest, BifurcationSampler, ComplexWindow, GridSampler, GridSpec,
    LogisticParams,
};
use num::Complex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::convert::TryFrom;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::str::FromStr;
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    let index = s.find(separator)?;
    let left = T::from_str(&s[..index]).ok()?;
    let right = T::from_str(&s[index + 1..]).ok()?;
    Some((left, right))
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    parse_pair(s, ',').map(|(re, im)| Complex { re, im })
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    parse_pair::<T>(s, separator)
        .map(|_| ())
        .ok_or_else(|| err.to_string())
}

fn validate_number<T: FromStr>(s: &str, err: &str) -> Result<(), String> {
    T::from_str(s).map(|_| ()).map_err(|_| err.to_string())
}

fn validate_range<T: FromStr + Ord>(s: &str, low: T, high: T, err: &str) -> Result<(), String> {
    match T::from_str(s) {
        Ok(ref i) if *i >= low && *i <= high => Ok(()),
        _ => Err(err.to_string()),
    }
}

const VERBOSE: &str = "verbose";
const MANDELBROT: &str = "mandelbrot";
const BIFURCATION: &str = "bifurcation";
const LOGISTIC: &str = "logistic";
const OUTPUT: &str = "output";
const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";
const RANGE: &str = "range";
const STEPS: &str = "steps";
const SAMPLES: &str = "samples";
const TRANSIENT: &str = "transient";
const SEED: &str = "seed";
const RATE: &str = "rate";
const X0: &str = "x0";

fn output_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name(OUTPUT)
        .long(OUTPUT)
        .short("o")
        .takes_value(true)
        .help("Output file (default: standard output)")
}

fn threads_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name(THREADS)
        .long(THREADS)
        .short("t")
        .takes_value(true)
        .validator(|s| {
            let max_threads = num_cpus::get();
            validate_range(
                &s,
                1,
                max_threads,
                &format!("Thread count must be a number between 1 and {}", max_threads),
            )
        })
        .help("Number of threads to use in the sampler (default: one per CPU)")
}

fn count_arg<'a, 'b>(
    name: &'static str,
    short: &'static str,
    default: &'static str,
    help: &'static str,
) -> Arg<'a, 'b> {
    Arg::with_name(name)
        .long(name)
        .short(short)
        .takes_value(true)
        .allow_hyphen_values(true)
        .default_value(default)
        .validator(|s| validate_number::<i64>(&s, "Could not parse count"))
        .help(help)
}

fn args<'a>() -> ArgMatches<'a> {
    App::new("chaos")
        .version("0.1.0")
        .about("Escape-time and bifurcation data for chaotic systems")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name(VERBOSE)
                .long(VERBOSE)
                .short("v")
                .global(true)
                .help("Log at debug level"),
        )
        .subcommand(
            SubCommand::with_name(MANDELBROT)
                .about("Escape counts of the Mandelbrot set over a pixel grid")
                .arg(
                    Arg::with_name(SIZE)
                        .long(SIZE)
                        .short("s")
                        .takes_value(true)
                        .default_value("800x600")
                        .validator(|s| {
                            validate_pair::<i64>(&s, 'x', "Could not parse grid size")
                        })
                        .help("Size of the grid, WIDTHxHEIGHT"),
                )
                .arg(
                    Arg::with_name(LEFTLOWER)
                        .long(LEFTLOWER)
                        .short("l")
                        .takes_value(true)
                        .allow_hyphen_values(true)
                        .default_value("-2.0,-1.5")
                        .validator(|s| {
                            validate_pair::<f64>(&s, ',', "Could not parse left lower corner")
                        })
                        .help("Left lower corner of the window, RE,IM"),
                )
                .arg(
                    Arg::with_name(RIGHTUPPER)
                        .long(RIGHTUPPER)
                        .short("r")
                        .takes_value(true)
                        .allow_hyphen_values(true)
                        .default_value("1.0,1.5")
                        .validator(|s| {
                            validate_pair::<f64>(&s, ',', "Could not parse right upper corner")
                        })
                        .help("Right upper corner of the window, RE,IM"),
                )
                .arg(count_arg(ITERATIONS, "i", "100", "Iteration budget per pixel"))
                .arg(threads_arg())
                .arg(output_arg()),
        )
        .subcommand(
            SubCommand::with_name(BIFURCATION)
                .about("Long-run logistic map values over a sweep of growth rates")
                .arg(
                    Arg::with_name(RANGE)
                        .long(RANGE)
                        .short("r")
                        .takes_value(true)
                        .allow_hyphen_values(true)
                        .default_value("2.8,4.0")
                        .validator(|s| {
                            validate_pair::<f64>(&s, ',', "Could not parse growth rate range")
                        })
                        .help("Growth rate range, MIN,MAX"),
                )
                .arg(count_arg(STEPS, "n", "300", "Number of growth rates"))
                .arg(count_arg(SAMPLES, "s", "100", "Random starts per growth rate"))
                .arg(count_arg(ITERATIONS, "i", "100", "Recorded values per start"))
                .arg(count_arg(TRANSIENT, "k", "100", "Discarded steps per start"))
                .arg(
                    Arg::with_name(SEED)
                        .long(SEED)
                        .takes_value(true)
                        .validator(|s| validate_number::<u64>(&s, "Could not parse seed"))
                        .help("Seed for the initial conditions (default: unseeded)"),
                )
                .arg(threads_arg())
                .arg(output_arg()),
        )
        .subcommand(
            SubCommand::with_name(LOGISTIC)
                .about("A single logistic map trajectory")
                .arg(
                    Arg::with_name(RATE)
                        .long(RATE)
                        .short("r")
                        .takes_value(true)
                        .required(true)
                        .allow_hyphen_values(true)
                        .validator(|s| validate_number::<f64>(&s, "Could not parse growth rate"))
                        .help("Growth rate"),
                )
                .arg(
                    Arg::with_name(X0)
                        .long(X0)
                        .short("x")
                        .takes_value(true)
                        .allow_hyphen_values(true)
                        .default_value("0.5")
                        .validator(|s| {
                            validate_number::<f64>(&s, "Could not parse initial population")
                        })
                        .help("Initial population"),
                )
                .arg(count_arg(ITERATIONS, "i", "50", "Recorded values"))
                .arg(count_arg(TRANSIENT, "k", "100", "Discarded steps"))
                .arg(output_arg()),
        )
        .get_matches()
}

// The validators have already run, so every value here parses; the
// only failures left are the library's own range checks.
fn count<T: TryFrom<i64>>(matches: &ArgMatches, name: &str) -> Result<T, failure::Error> {
    let value = matches.value_of(name).and_then(|s| i64::from_str(s).ok()).unwrap_or(0);
    Ok(checked_count(name, value)?)
}

fn float(matches: &ArgMatches, name: &str) -> f64 {
    matches.value_of(name).and_then(|s| f64::from_str(s).ok()).unwrap_or(0.0)
}

fn threads(matches: &ArgMatches) -> usize {
    matches
        .value_of(THREADS)
        .and_then(|s| usize::from_str(s).ok())
        .unwrap_or_else(num_cpus::get)
}

fn sink(matches: &ArgMatches) -> Result<Box<dyn Write>, failure::Error> {
    let out: Box<dyn Write> = match matches.value_of(OUTPUT) {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout())),
    };
    Ok(out)
}

fn mandelbrot(matches: &ArgMatches) -> Result<(), failure::Error> {
    let (width, height) = matches
        .value_of(SIZE)
        .and_then(|s| parse_pair::<i64>(s, 'x'))
        .unwrap_or((0, 0));
    let leftlower = matches
        .value_of(LEFTLOWER)
        .and_then(parse_complex)
        .unwrap_or(Complex::new(0.0, 0.0));
    let rightupper = matches
        .value_of(RIGHTUPPER)
        .and_then(parse_complex)
        .unwrap_or(Complex::new(0.0, 0.0));

    let grid = GridSpec::new(checked_count("width", width)?, checked_count("height", height)?)?;
    let window = ComplexWindow::from_corners(leftlower, rightupper)?;
    let sampler = GridSampler::new(grid, window, count(matches, ITERATIONS)?)?;

    let started = Instant::now();
    let escapes = sampler.sample(threads(matches))?;
    info!(
        width = escapes.width(),
        height = escapes.height(),
        elapsed = ?started.elapsed(),
        "computed escape grid"
    );

    let mut out = sink(matches)?;
    for row in escapes.rows() {
        writeln!(out, "{}", row.iter().join(","))?;
    }
    out.flush()?;
    Ok(())
}

fn bifurcation(matches: &ArgMatches) -> Result<(), failure::Error> {
    let (r_min, r_max) = matches
        .value_of(RANGE)
        .and_then(|s| parse_pair::<f64>(s, ','))
        .unwrap_or((0.0, 0.0));
    let request = BifurcationRequest::new(
        r_min,
        r_max,
        count(matches, STEPS)?,
        count(matches, SAMPLES)?,
        count(matches, ITERATIONS)?,
    )?
    .with_transient(count(matches, TRANSIENT)?);
    let sampler = BifurcationSampler::new(request);

    let started = Instant::now();
    let data = match matches.value_of(SEED).and_then(|s| u64::from_str(s).ok()) {
        Some(seed) => sampler.sample(&mut StdRng::seed_from_u64(seed), threads(matches))?,
        None => sampler.sample(&mut rand::thread_rng(), threads(matches))?,
    };
    info!(
        r_steps = data.len(),
        points = data.iter().map(|entry| entry.values.len()).sum::<usize>(),
        elapsed = ?started.elapsed(),
        "computed bifurcation data"
    );

    let mut out = sink(matches)?;
    for (r, x) in data.points() {
        writeln!(out, "{},{}", r, x)?;
    }
    out.flush()?;
    Ok(())
}

fn logistic(matches: &ArgMatches) -> Result<(), failure::Error> {
    let params = LogisticParams::new(
        float(matches, RATE),
        float(matches, X0),
        count(matches, ITERATIONS)?,
        count(matches, TRANSIENT)?,
    )?;
    let mut out = sink(matches)?;
    for x in params.iterate() {
        writeln!(out, "{}", x)?;
    }
    out.flush()?;
    Ok(())
}

fn main() {
    let matches = args();

    let verbose = matches.is_present(VERBOSE)
        || matches.subcommand().1.map_or(false, |sub| sub.is_present(VERBOSE));
    let level = if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Could not install logger: {}", e);
    }

    let result = match matches.subcommand() {
        (MANDELBROT, Some(sub)) => mandelbrot(sub),
        (BIFURCATION, Some(sub)) => bifurcation(sub),
        (LOGISTIC, Some(sub)) => logistic(sub),
        _ => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
