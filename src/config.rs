use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::plot::{Color, Palette};

#[derive(Debug, Deserialize)]
pub struct Config {
    pub database_url: String,
    #[serde(default = "default_port")]
    pub http_port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,

    // colours handed out to known devices in order, wrapping around
    #[serde(default = "default_palette")]
    pub palette: Vec<Color>,
    #[serde(default = "default_submission_color")]
    pub submission_color: Color,
}

impl Config {
    pub fn palette(&self) -> Palette {
        Palette {
            devices: self.palette.clone(),
            submission: self.submission_color,
        }
    }
}

fn default_port() -> u16 {
    3333
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_palette() -> Vec<Color> {
    vec![Color::Red, Color::Purple, Color::Black]
}

fn default_submission_color() -> Color {
    Color::Black
}

pub fn load(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path).context("Failed to read config")?;
    let mut config: Config = toml::from_str(&data).context("Failed to parse config")?;

    if let Ok(url) = dotenvy::var("DATABASE_URL") {
        config.database_url = url;
    }

    Ok(config)
}
