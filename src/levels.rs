use crate::board::Board;
use std::fmt;
use std::fs;
use std::io;

/// Error type for level parsing operations.
#[derive(Debug)]
pub enum LevelError {
    /// IO error when reading from file
    Io(io::Error),
    /// Invalid level content
    InvalidLevel(String),
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Io(err) => write!(f, "IO error: {}", err),
            LevelError::InvalidLevel(msg) => write!(f, "Invalid level: {}", msg),
        }
    }
}

impl std::error::Error for LevelError {}

impl From<io::Error> for LevelError {
    fn from(err: io::Error) -> Self {
        LevelError::Io(err)
    }
}

/// A collection of sliding-block layouts.
#[derive(Debug)]
pub struct Levels {
    levels: Vec<Board>,
}

impl Levels {
    /// Parse layouts from a string.
    ///
    /// Levels are separated by blank lines or by lines starting with `;`,
    /// which are treated as comments. Each level is in the format accepted
    /// by [`Board::from_text`].
    pub fn from_text(contents: &str) -> Result<Self, LevelError> {
        let mut levels = Vec::new();
        let mut current_level = String::new();

        for line in contents.lines() {
            let is_separator = line.trim().is_empty() || line.trim_start().starts_with(';');
            if is_separator {
                if !current_level.is_empty() {
                    levels.push(Self::parse_level(&current_level, levels.len())?);
                    current_level.clear();
                }
                continue;
            }

            current_level.push_str(line);
            current_level.push('\n');
        }

        // Don't forget the last level if file doesn't end with empty line
        if !current_level.is_empty() {
            levels.push(Self::parse_level(&current_level, levels.len())?);
        }

        Ok(Levels { levels })
    }

    fn parse_level(text: &str, index: usize) -> Result<Board, LevelError> {
        Board::from_text(text)
            .map_err(|msg| LevelError::InvalidLevel(format!("level {}: {}", index + 1, msg)))
    }

    /// Parse layouts from a text file.
    pub fn from_file(path: &str) -> Result<Self, LevelError> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(&contents)
    }

    /// Get the nth level (0-indexed).
    pub fn get(&self, index: usize) -> Option<&Board> {
        self.levels.get(index)
    }

    /// Get the number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Board> {
        self.levels.iter()
    }
}
