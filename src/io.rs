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

use std::fs::File;
use std::io::{self, stdout, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_derive::{Deserialize, Serialize};

use crate::error::{RecoError, Result};
use crate::recommend::Recommendations;
use crate::types::{ItemId, Movie, Rating, Tag};

/// The three record sets of a MovieLens-style data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    Movies,
    Ratings,
    Tags,
}

impl Dataset {

    pub fn file_name(&self) -> &'static str {
        match self {
            Dataset::Movies => "movies.csv",
            Dataset::Ratings => "ratings.csv",
            Dataset::Tags => "tags.csv",
        }
    }

    /// Location of the dataset in `data_dir`, fails if there is no such file.
    pub fn path(&self, data_dir: &Path) -> Result<PathBuf> {
        let path = data_dir.join(self.file_name());
        if !path.is_file() {
            return Err(RecoError::not_found(self.file_name(), &data_dir.display().to_string()));
        }
        Ok(path)
    }
}

impl FromStr for Dataset {
    type Err = RecoError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "movies" => Ok(Dataset::Movies),
            "ratings" => Ok(Dataset::Ratings),
            "tags" => Ok(Dataset::Tags),
            _ => Err(RecoError::UnsupportedMode(name.to_owned())),
        }
    }
}

/// Reads a comma separated input file with a header line.
pub fn csv_reader(path: &Path) -> Result<csv::Reader<File>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)?;

    Ok(reader)
}

fn read_records<T, R>(reader: &mut csv::Reader<R>) -> Result<Vec<T>>
    where T: DeserializeOwned, R: io::Read {

    let mut records = Vec::new();
    for result in reader.deserialize() {
        records.push(result?);
    }
    Ok(records)
}

#[derive(Deserialize)]
struct MovieRecord {
    #[serde(rename = "movieId")]
    item: ItemId,
    title: String,
    #[serde(default)]
    genres: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Loads the movies of `data_dir`. Without a `description` column, the pipe-separated genres
/// serve as description. Movies with an empty description are dropped.
pub fn load_movies(data_dir: &Path) -> Result<Vec<Movie>> {
    let mut reader = csv_reader(&Dataset::Movies.path(data_dir)?)?;
    movies_from_csv(&mut reader)
}

pub fn movies_from_csv<R: io::Read>(reader: &mut csv::Reader<R>) -> Result<Vec<Movie>> {

    let headers = reader.headers()?.clone();
    let has_description = headers.iter().any(|header| header == "description");

    if !has_description && !headers.iter().any(|header| header == "genres") {
        return Err(RecoError::InvalidInput(
            String::from("movies need a 'description' or a 'genres' column")));
    }

    let records: Vec<MovieRecord> = read_records(reader)?;
    let num_records = records.len();

    let movies: Vec<Movie> = records.into_iter()
        .filter_map(|record| {
            let description = if has_description {
                record.description.unwrap_or_default()
            } else {
                record.genres.unwrap_or_default().replace('|', " ")
            };

            if description.trim().is_empty() {
                None
            } else {
                Some(Movie { item: record.item, title: record.title, description })
            }
        })
        .collect();

    if movies.len() < num_records {
        warn!("Dropped {} movies without description", num_records - movies.len());
    }
    debug!("Read {} movies", movies.len());

    Ok(movies)
}

pub fn load_ratings(data_dir: &Path) -> Result<Vec<Rating>> {
    let mut reader = csv_reader(&Dataset::Ratings.path(data_dir)?)?;
    let ratings: Vec<Rating> = read_records(&mut reader)?;
    debug!("Read {} ratings", ratings.len());
    Ok(ratings)
}

pub fn load_tags(data_dir: &Path) -> Result<Vec<Tag>> {
    let mut reader = csv_reader(&Dataset::Tags.path(data_dir)?)?;
    let tags: Vec<Tag> = read_records(&mut reader)?;
    debug!("Read {} tags", tags.len());
    Ok(tags)
}

/// Struct used for JSON serialization of recommendations. Field names will be used in JSON.
#[derive(Serialize)]
struct RecommendationsForItem<'a> {
    for_item: &'a str,
    recommended: &'a Recommendations,
}

/// Output recommendations in JSON format, one line per queried item. If an `output_path` is
/// supplied, we write to a file at the specified path, otherwise, we output to stdout.
pub fn write_recommendations(
    recommendations: &[(String, Recommendations)],
    output_path: Option<String>,
) -> Result<()> {

    let out: Box<dyn Write> = match output_path {
        Some(path) => Box::new(File::create(&Path::new(&path))?),
        _ => Box::new(stdout())
    };

    write_recommendations_to(recommendations, out)
}

pub fn write_recommendations_to<W: Write>(
    recommendations: &[(String, Recommendations)],
    mut out: W,
) -> Result<()> {

    for (for_item, recommended) in recommendations {
        let line = serde_json::to_string(&RecommendationsForItem { for_item, recommended })
            .map_err(io::Error::from)?;
        writeln!(out, "{}", line)?;
    }

    out.flush()?;

    Ok(())
}
