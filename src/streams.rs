// src/streams.rs
//! Resolving and opening the input and output of a run.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use log::debug;

const STDIN_ARG: &str = "-";
const OUTPUT_FILE_EXTENSION: &str = "csv";

/// Where to read access log lines from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Input {
    /// Standard input.
    Stdin,

    /// A file on disk.
    File(PathBuf),
}

/// Possible error situations when opening an [`Input`].
#[derive(Debug)]
pub enum InputError {
    /// The input file does not exist.
    NotFound(PathBuf),

    /// The input file exists but could not be opened (e.g. permission denied).
    Open {
        /// The path of the input file.
        path: PathBuf,

        /// The underlying error.
        source: io::Error,
    },
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            InputError::NotFound(path) => write!(f, "Logfile '{}' not found", path.display()),
            InputError::Open { path, source } => write!(f, "{}: '{}'", source, path.display()),
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InputError::NotFound(_) => None,
            InputError::Open { source, .. } => Some(source),
        }
    }
}

impl Input {
    /// Determine the input from an optional command line path.
    ///
    /// `None` and `-` both select standard input.
    #[must_use]
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(path) if path != Path::new(STDIN_ARG) => Input::File(path.to_path_buf()),
            _ => Input::Stdin,
        }
    }

    /// Open the input for reading lines.
    ///
    /// # Errors
    ///
    /// - If the input file doesn't exist, [`InputError::NotFound`] is returned.
    /// - Any other error opening the file is returned as [`InputError::Open`].
    pub fn open(&self) -> Result<Box<dyn BufRead>, InputError> {
        match self {
            Input::Stdin => {
                debug!("Reading from standard input");
                Ok(Box::new(BufReader::new(io::stdin())))
            }
            Input::File(path) => {
                debug!("Reading from {}", path.display());
                let file = File::open(path).map_err(|source| {
                    if source.kind() == io::ErrorKind::NotFound {
                        InputError::NotFound(path.clone())
                    } else {
                        InputError::Open {
                            path: path.clone(),
                            source,
                        }
                    }
                })?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }
}

impl std::fmt::Display for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Input::Stdin => write!(f, "<stdin>"),
            Input::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Where to write rows to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Output {
    /// Standard output.
    Stdout,

    /// A file on disk, which will be created or truncated.
    File(PathBuf),
}

/// Possible error situations when resolving or opening an [`Output`].
#[derive(Debug)]
pub enum OutputError {
    /// The output is a directory, but there is no input file name to name the output after.
    NoInputName {
        /// The output directory.
        directory: PathBuf,
    },

    /// The output file is the input file, which would be truncated before it was read.
    SameAsInput {
        /// The path of the output file.
        path: PathBuf,
    },

    /// The output file could not be created.
    Open {
        /// The path of the output file.
        path: PathBuf,

        /// The underlying error.
        source: io::Error,
    },
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            OutputError::NoInputName { directory } => write!(
                f,
                "cannot name an output file in '{}' without an input file",
                directory.display()
            ),
            OutputError::SameAsInput { path } => {
                write!(f, "output file '{}' is also the input", path.display())
            }
            OutputError::Open { path, source } => write!(f, "{}: '{}'", source, path.display()),
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::NoInputName { .. } | OutputError::SameAsInput { .. } => None,
            OutputError::Open { source, .. } => Some(source),
        }
    }
}

impl Output {
    /// Determine the output from an optional command line path.
    ///
    /// If `path` is an existing directory, the output is a file in that directory with the same
    /// stem as the `input` file and a `.csv` extension.
    ///
    /// # Errors
    ///
    /// - If `path` is a directory and `input` is standard input, [`OutputError::NoInputName`] is
    ///   returned.
    /// - If the output file would be the `input` file, [`OutputError::SameAsInput`] is returned.
    pub fn resolve(path: Option<&Path>, input: &Input) -> Result<Self, OutputError> {
        let path = match path {
            None => return Ok(Output::Stdout),
            Some(path) => path,
        };

        let output_path = if path.is_dir() {
            let stem = match input {
                Input::File(input_path) => input_path.file_stem(),
                Input::Stdin => None,
            }
            .ok_or_else(|| OutputError::NoInputName {
                directory: path.to_path_buf(),
            })?;

            let mut output_path = path.join(stem);
            output_path.set_extension(OUTPUT_FILE_EXTENSION);
            output_path
        } else {
            path.to_path_buf()
        };

        if let Input::File(input_path) = input {
            if is_same_file(input_path, &output_path) {
                return Err(OutputError::SameAsInput { path: output_path });
            }
        }

        Ok(Output::File(output_path))
    }

    /// Open the output for writing.
    ///
    /// # Errors
    ///
    /// Any error creating the output file is returned as [`OutputError::Open`].
    pub fn open(&self) -> Result<Box<dyn Write>, OutputError> {
        match self {
            Output::Stdout => {
                debug!("Writing to standard output");
                Ok(Box::new(io::stdout()))
            }
            Output::File(path) => {
                debug!("Writing to {}", path.display());
                let file = File::create(path).map_err(|source| OutputError::Open {
                    path: path.clone(),
                    source,
                })?;
                Ok(Box::new(file))
            }
        }
    }
}

/// Whether `input` and `output` both exist and resolve to the same file.
fn is_same_file(input: &Path, output: &Path) -> bool {
    match (fs::canonicalize(input), fs::canonicalize(output)) {
        (Ok(input), Ok(output)) => input == output,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::{Read, Write};
    use std::path::{Path, PathBuf};

    use crate::test;

    use super::{Input, InputError, Output, OutputError};

    #[test]
    fn input_from_path() {
        assert_eq!(Input::from_path(None), Input::Stdin);
        assert_eq!(Input::from_path(Some(Path::new("-"))), Input::Stdin);
        assert_eq!(
            Input::from_path(Some(Path::new("access.log"))),
            Input::File(PathBuf::from("access.log"))
        );
    }

    #[test]
    fn input_not_found() -> test::Result {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("missing.log");

        let error = Input::File(path.clone()).open().err().unwrap();
        assert!(matches!(&error, InputError::NotFound(p) if *p == path));
        assert_eq!(
            format!("{}", error),
            format!("Logfile '{}' not found", path.display())
        );

        Ok(())
    }

    #[test]
    fn input_open_file() -> test::Result {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("access.log");
        fs::write(&path, "hello?\n")?;

        let mut contents = String::new();
        Input::File(path).open()?.read_to_string(&mut contents)?;
        assert_eq!(contents, "hello?\n");

        Ok(())
    }

    #[test]
    fn output_resolve() -> test::Result {
        let tempdir = tempfile::tempdir()?;
        let input = Input::File(PathBuf::from("/var/log/apache2/access.log"));

        assert_eq!(Output::resolve(None, &input)?, Output::Stdout);

        let file = tempdir.path().join("out.tsv");
        assert_eq!(
            Output::resolve(Some(file.as_path()), &input)?,
            Output::File(file.clone())
        );

        assert_eq!(
            Output::resolve(Some(tempdir.path()), &input)?,
            Output::File(tempdir.path().join("access.csv"))
        );

        Ok(())
    }

    #[test]
    fn output_resolve_directory_without_input_name() -> test::Result {
        let tempdir = tempfile::tempdir()?;

        let error = Output::resolve(Some(tempdir.path()), &Input::Stdin)
            .err()
            .unwrap();
        assert!(matches!(error, OutputError::NoInputName { .. }));

        Ok(())
    }

    #[test]
    fn output_resolve_same_as_input() -> test::Result {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("access.csv");
        fs::write(&path, "hello?\n")?;
        let input = Input::File(path.clone());

        let error = Output::resolve(Some(tempdir.path()), &input)
            .err()
            .unwrap();
        assert!(matches!(error, OutputError::SameAsInput { .. }));

        // The same file through a different path.
        let indirect = tempdir.path().join(".").join("access.csv");
        let error = Output::resolve(Some(indirect.as_path()), &input)
            .err()
            .unwrap();
        assert!(matches!(error, OutputError::SameAsInput { .. }));
        assert_eq!(
            format!("{}", error),
            format!("output file '{}' is also the input", indirect.display())
        );

        assert_eq!(fs::read_to_string(&path)?, "hello?\n");

        Ok(())
    }

    #[test]
    fn output_open_file() -> test::Result {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("access.csv");

        {
            let mut output = Output::File(path.clone()).open()?;
            writeln!(output, "world!")?;
        }

        assert_eq!(fs::read_to_string(&path)?, "world!\n");

        Ok(())
    }

    #[test]
    fn output_open_error() -> test::Result {
        let tempdir = tempfile::tempdir()?;
        let path = tempdir.path().join("missing").join("access.csv");

        let error = Output::File(path).open().err().unwrap();
        assert!(matches!(error, OutputError::Open { .. }));

        Ok(())
    }
}
