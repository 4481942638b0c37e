use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::{City, Location};
use crate::store::{self, CityCatalog};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    /// The chosen subcommand; serving is the default.
    pub fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server.
    Serve,
    /// Load cities from a JSON array of `{name, state, location?}`.
    ImportCities { file: PathBuf },
}

#[derive(Deserialize)]
struct CityRecord {
    name: String,
    state: String,
    location: Option<Location>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Load a JSON array of `{name, state, location?}` into the catalog.
///
/// Cities already present are skipped. An unknown state or a blank name
/// aborts the import; earlier rows stay imported.
pub async fn import_cities(catalog: &CityCatalog, file_path: &Path) -> Result<ImportReport, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(file_path)?;
    let records: Vec<CityRecord> = serde_json::from_str(&content)?;

    let mut report = ImportReport::default();
    for record in records {
        let name = record.name.trim();
        if name.is_empty() {
            return Err(format!("city without a name in state {}", record.state).into());
        }

        let mut city = City::new(name, record.state.trim().to_uppercase());
        if let Some(location) = record.location {
            city = city.with_location(location);
        }
        catalog
            .validate_city(&city)
            .map_err(|e| format!("{}: {e}", city.id))?;

        match catalog.add_city(&city).await {
            Ok(()) => report.imported += 1,
            Err(store::Error::AlreadyExists) => {
                tracing::debug!(city_id = %city.id, "city already in catalog");
                report.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    tracing::info!(imported = report.imported, skipped = report.skipped, "city import finished");
    Ok(report)
}
