use crate::error::{MatchError, MatchResult};
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

const PROGRAM: &str = "image-matcher";

#[derive(Debug, PartialEq)]
pub struct Args {
    /// Reference image to look for on screen
    pub template: PathBuf,
}

impl Args {
    pub fn parse() -> MatchResult<Self> {
        Self::parse_from(env::args_os())
    }

    /// Exactly one positional argument after the program name
    pub fn parse_from<I, T>(args: I) -> MatchResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut args = args.into_iter().map(Into::into);
        let program = args
            .next()
            .and_then(|p| {
                PathBuf::from(p)
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| PROGRAM.to_string());

        match (args.next(), args.next()) {
            (Some(template), None) => Ok(Args {
                template: PathBuf::from(template),
            }),
            _ => Err(MatchError::Usage { program }),
        }
    }
}
