/**
 * SimReco
 * Copyright (C) 2018 Sebastian Schelter
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <http://www.gnu.org/licenses/>.
 */

use std::env;
use std::error::Error;
use std::path::Path;

use getopts::Options;

use simreco::io;
use simreco::{Labels, MissingRatingPolicy, RecommendationMode, RecommendationSource};

fn main() {

    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("d", "datadir", "Directory with movies.csv, ratings.csv and tags.csv (required).",
        "PATH");
    opts.optopt("m", "mode", "Recommendation mode: movies (content-based), tags (tag lookup) or \
        ratings (collaborative). Defaults to movies.", "MODE");
    opts.optopt("q", "query", "Movie title (movies, ratings) or tag (tags) to recommend for.",
        "TEXT");
    opts.optflag("a", "all", "Recommend for every movie instead of a single query (movies and \
        ratings modes only).");
    opts.optopt("n", "num-recommendations", "Number of recommendations to compute (optional, \
        defaults to 10).", "NUMBER");
    opts.optopt("r", "missing-ratings", "How to treat unobserved ratings: zero, skip or mean \
        (optional, defaults to zero).", "POLICY");
    opts.optopt("t", "threads", "Number of threads for --all (optional, defaults to the number \
        of CPUs).", "NUMBER");
    opts.optopt("o", "outputfile", "Output file name (optional, output will be written to stdout \
        by default).", "PATH");
    opts.optflag("h", "help", "Print this help menu");

    let matches = match opts.parse(&args[1..]) {
        Ok(matches) => matches,
        Err(failure) => {
            let hint = failure.to_string();
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    if matches.opt_present("h") {
        return print_usage_and_exit(&program, opts, None);
    }

    let data_dir = match matches.opt_str("d") {
        Some(data_dir) => data_dir,
        None => return print_usage_and_exit(
            &program,
            opts,
            Some("Please specify a data directory via --datadir."),
        ),
    };

    let query = matches.opt_str("q");
    let all = matches.opt_present("a");

    if query.is_none() && !all {
        return print_usage_and_exit(&program, opts,
            Some("Please specify a --query or ask for --all recommendations."));
    }

    let num_recommendations: usize = match matches.opt_get_default("n", 10) {
        Ok(n) => n,
        Err(failure) => {
            let hint = format!("Problem with option 'n': {}", failure.to_string());
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    let threads: usize = match matches.opt_get_default("t", num_cpus::get()) {
        Ok(threads) => threads,
        Err(failure) => {
            let hint = format!("Problem with option 't': {}", failure.to_string());
            return print_usage_and_exit(&program, opts, Some(&hint))
        },
    };

    let settings = Settings {
        data_dir,
        mode: matches.opt_str("m").unwrap_or_else(|| String::from("movies")),
        missing_ratings: matches.opt_str("r").unwrap_or_else(|| String::from("zero")),
        query,
        num_recommendations,
        threads,
        output_path: matches.opt_str("o"),
    };

    if let Err(failure) = compute_recommendations(settings) {
        eprintln!("\n{}\n", failure);
        std::process::exit(1);
    }
}

fn print_usage_and_exit(
    program: &str,
    opts: Options,
    hint: Option<&str>
) {

    if let Some(hint) = hint {
        eprintln!("\n{}\n", hint);
    }

    let brief = format!("Usage: {} [options]", program);
    eprint!("{}", opts.usage(&brief));

    let exit_code = usage_exit_code(hint);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Asking for help succeeds, a usage hint means the invocation was wrong.
fn usage_exit_code(hint: Option<&str>) -> i32 {
    match hint {
        Some(_) => 1,
        None => 0,
    }
}

struct Settings {
    data_dir: String,
    mode: String,
    missing_ratings: String,
    query: Option<String>,
    num_recommendations: usize,
    threads: usize,
    output_path: Option<String>,
}

fn compute_recommendations(settings: Settings) -> Result<(), Box<dyn Error>> {

    let data_dir = Path::new(&settings.data_dir);
    let mode: RecommendationMode = settings.mode.parse()?;
    let policy: MissingRatingPolicy = settings.missing_ratings.parse()?;

    eprintln!("Reading datasets from {}", data_dir.display());

    let movies = match mode {
        RecommendationMode::Tags => Vec::new(),
        _ => io::load_movies(data_dir)?,
    };
    let titles: Vec<String> = movies.iter().map(|movie| movie.title.clone()).collect();

    let recommendations = match mode {
        RecommendationMode::Content => {
            let descriptions: Vec<&str> = movies.iter()
                .map(|movie| movie.description.as_str())
                .collect();

            eprintln!("Vectorizing descriptions of {} movies", movies.len());
            let vectors = simreco::build_term_vectors(&descriptions)?;

            run(RecommendationSource::Content { titles: &titles, vectors: &vectors }, &settings)?
        },
        RecommendationMode::Tags => {
            let tags = io::load_tags(data_dir)?;
            eprintln!("Found {} tags", tags.len());

            run(RecommendationSource::Tags(&tags), &settings)?
        },
        RecommendationMode::Collaborative => {
            let ratings = io::load_ratings(data_dir)?;
            let labels = Labels::new(movies.iter().map(|movie| (movie.item, movie.title.clone())))?;

            eprintln!("Computing item similarities from {} ratings", ratings.len());
            let matrix = simreco::ratings_similarity_matrix(&ratings, &labels, policy)?;

            run(RecommendationSource::Collaborative(&matrix), &settings)?
        },
    };

    eprintln!("Writing recommendations...");
    io::write_recommendations(&recommendations, settings.output_path.clone())?;

    Ok(())
}

fn run(
    source: RecommendationSource,
    settings: &Settings,
) -> simreco::Result<Vec<(String, simreco::Recommendations)>> {

    match settings.query {
        Some(ref query) => {
            let recommended = simreco::recommend(query, source, settings.num_recommendations)?;
            Ok(vec![(query.clone(), recommended)])
        },
        None => simreco::recommend_all(source, settings.num_recommendations, settings.threads),
    }
}
