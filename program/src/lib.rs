//! The program file format: one byte per line written as a base-2 literal, with
//! `#` starting a comment. Blank and comment-only lines are skipped.
//!
//! ```text
//! # print8.ls8
//! 10000010 # LDI R0,8
//! 00000000
//! 00001000
//! 01000111 # PRN R0
//! 00000000
//! 00000001 # HLT
//! ```

use common::constants::MEM_SIZE;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::debug;
use thiserror::Error;

pub const COMMENT: char = '#';

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unable to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("line {line}: {token:?} is not an 8 bit binary literal")]
    InvalidLiteral { line: usize, token: String },

    #[error("program is {len} bytes but memory only holds {}", MEM_SIZE)]
    TooLarge { len: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    image: Vec<u8>,
}

impl Program {
    pub fn from_image(image: Vec<u8>) -> Result<Program, LoadError> {
        if image.len() > MEM_SIZE {
            return Err(LoadError::TooLarge { len: image.len() });
        }
        Ok(Program { image })
    }

    pub fn parse(text: &str) -> Result<Program, LoadError> {
        let mut image = vec![];
        for (i, line) in text.lines().enumerate() {
            let token = strip_comment(line);
            if token.is_empty() {
                continue;
            }
            let byte = parse_literal(token).ok_or_else(|| LoadError::InvalidLiteral {
                line: i + 1,
                token: token.to_owned(),
            })?;
            image.push(byte);
        }
        Self::from_image(image)
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<Program, LoadError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })?;
        let prog = Self::parse(&text)?;
        debug!("Loaded {} bytes from {}", prog.len(), path.display());
        Ok(prog)
    }

    pub fn image(&self) -> &[u8] {
        &self.image
    }

    pub fn len(&self) -> usize {
        self.image.len()
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_empty()
    }
}

impl FromStr for Program {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Program::parse(s)
    }
}

fn strip_comment(line: &str) -> &str {
    line.split_once(COMMENT).map_or(line, |(code, _)| code).trim()
}

// from_str_radix alone would also take a leading sign.
fn parse_literal(token: &str) -> Option<u8> {
    if !token.bytes().all(|b| b == b'0' || b == b'1') {
        return None;
    }
    u8::from_str_radix(token, 2).ok()
}
