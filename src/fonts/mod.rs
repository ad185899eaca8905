//! Font discovery for the PDF renderer and the chart rasteriser.
//!
//! Both consumers share one Roboto family. The directory is resolved from, in order: an
//! explicitly configured path, the `EXERCISE_REPORT_FONTS_DIR` environment variable,
//! `assets/fonts` next to the running executable and `assets/fonts` under the crate manifest.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::Error;
use genpdf::fonts::{self, FontData, FontFamily};
use log::debug;

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// Environment variable overriding the font search path.
pub const FONTS_DIR_ENV: &str = "EXERCISE_REPORT_FONTS_DIR";

const REGULAR_FONT_FILE: &str = "Roboto-Regular.ttf";

const FONT_FILES: &[&str] = &[
    REGULAR_FONT_FILE,
    "Roboto-Bold.ttf",
    "Roboto-Italic.ttf",
    "Roboto-BoldItalic.ttf",
];

/// Returns the directory that ships the bundled fonts inside the source tree.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn push_unique(candidates: &mut Vec<PathBuf>, candidate: PathBuf) {
    if !candidates.iter().any(|existing| existing == &candidate) {
        candidates.push(candidate);
    }
}

fn font_directory_candidates(configured: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = configured.filter(|path| !path.as_os_str().is_empty()) {
        candidates.push(path.to_path_buf());
    }

    if let Some(path) = env::var_os(FONTS_DIR_ENV).filter(|value| !value.is_empty()) {
        push_unique(&mut candidates, PathBuf::from(path));
    }

    if let Some(bin_dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        push_unique(&mut candidates, bin_dir.join("assets/fonts"));
    }

    push_unique(&mut candidates, bundled_fonts_source_dir());
    candidates
}

fn missing_font_files(path: &Path) -> Vec<&'static str> {
    FONT_FILES
        .iter()
        .copied()
        .filter(|name| !path.join(name).is_file())
        .collect()
}

/// Locates the first candidate directory containing the whole font family.
pub fn resolve_font_directory(configured: Option<&Path>) -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates(configured) {
        if !candidate.is_dir() {
            attempts.push(format!("{} (directory missing)", candidate.display()));
            continue;
        }

        let missing = missing_font_files(&candidate);
        if missing.is_empty() {
            debug!("Using fonts from {}", candidate.display());
            return Ok(candidate);
        }

        attempts.push(format!(
            "{} (missing files [{}])",
            candidate.display(),
            missing.join(", ")
        ));
    }

    Err(Error::new(
        format!(
            "Unable to locate the {} font family. Checked: {}. See assets/fonts/README.md or set {}.",
            DEFAULT_FONT_FAMILY_NAME,
            attempts.join(", "),
            FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "font directory not found"),
    ))
}

/// Loads the Roboto family as a `genpdf` font family definition.
pub fn default_font_family(configured: Option<&Path>) -> Result<FontFamily<FontData>, Error> {
    let directory = resolve_font_directory(configured)?;

    fonts::from_files(&directory, DEFAULT_FONT_FAMILY_NAME, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load font family '{}' from {}: {}",
                DEFAULT_FONT_FAMILY_NAME,
                directory.display(),
                err
            ),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

/// Reads the raw bytes of the regular face, used to register the chart font.
pub fn regular_font_bytes(configured: Option<&Path>) -> Result<Vec<u8>, Error> {
    let path = resolve_font_directory(configured)?.join(REGULAR_FONT_FILE);
    fs::read(&path).map_err(|err| {
        Error::new(
            format!("Failed to read font file {}", path.display()),
            err,
        )
    })
}

/// Indicates whether the complete font family can be found on disk.
pub fn default_fonts_available(configured: Option<&Path>) -> bool {
    resolve_font_directory(configured).is_ok()
}
