use crate::matrix::{CostMatrix, RankedMatching};
use itertools::Itertools;
use std::fs::File;
use std::io::{BufRead, BufReader, Error, ErrorKind, Write};
use std::path::Path;
use std::str::FromStr;

pub trait MatrixRead: Sized {
    /// Reads a square matrix given as one whitespace separated row per line. Empty lines and
    /// everything after a `#` are ignored; `inf` marks a forbidden entry.
    fn try_read_matrix<T: BufRead>(reader: T) -> Result<Self, Error>;

    /// Tries to read the matrix file at the passed in path
    fn try_read_matrix_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let file = File::open(path)?;
        Self::try_read_matrix(BufReader::new(file))
    }
}

pub trait MatrixWrite {
    fn try_write_matrix<T: Write>(&self, writer: T) -> Result<(), Error>;
}

impl MatrixRead for CostMatrix {
    fn try_read_matrix<T: BufRead>(reader: T) -> Result<Self, Error> {
        let mut rows = Vec::new();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let content = match line.split_once('#') {
                Some((content, _comment)) => content,
                None => line.as_str(),
            };

            if content.trim().is_empty() {
                continue;
            }

            let row = content
                .split_whitespace()
                .map(|token| {
                    f64::from_str(token).map_err(|_| {
                        Error::new(
                            ErrorKind::InvalidData,
                            format!("Cannot parse entry '{}' in line {}", token, line_no + 1),
                        )
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            rows.push(row);
        }

        CostMatrix::try_from_rows(&rows).map_err(|e| Error::new(ErrorKind::InvalidData, e))
    }
}

impl MatrixWrite for CostMatrix {
    fn try_write_matrix<T: Write>(&self, mut writer: T) -> Result<(), Error> {
        writeln!(writer, "# n={}", self.len())?;
        for row in self.rows() {
            writeln!(writer, "{}", row.iter().join(" "))?;
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// `rank cost [(row, col), ...]`
    Pairs,
    /// `rank cost col_0 col_1 ... col_n-1`
    Columns,
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Pairs
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pairs" => Ok(OutputFormat::Pairs),
            "columns" => Ok(OutputFormat::Columns),
            _ => Err(Error::new(
                ErrorKind::InvalidInput,
                format!("unknown output format: {}", s),
            )),
        }
    }
}

/// Writes a single line for the matching of the given (1-based) rank
pub fn try_write_ranked<T: Write>(
    mut writer: T,
    format: OutputFormat,
    rank: usize,
    ranked: &RankedMatching,
) -> Result<(), Error> {
    match format {
        OutputFormat::Pairs => writeln!(writer, "{} {} {}", rank, ranked.cost, ranked.matching),
        OutputFormat::Columns => writeln!(
            writer,
            "{} {} {}",
            rank,
            ranked.cost,
            ranked.matching.iter().map(|(_, j)| j).join(" ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Matching;
    use test_case::test_case;

    fn read(input: &str) -> Result<CostMatrix, Error> {
        CostMatrix::try_read_matrix(input.as_bytes())
    }

    #[test]
    fn read_matrix() {
        let matrix = read("# a comment\n1 2.5 inf\n\n-3 4 5 # trailing\n  6\t7 8\n").unwrap();
        assert_eq!(
            matrix,
            CostMatrix::from([
                [1.0, 2.5, f64::INFINITY],
                [-3.0, 4.0, 5.0],
                [6.0, 7.0, 8.0]
            ])
        );
    }

    #[test]
    fn read_empty() {
        assert!(read("# nothing here\n").unwrap().is_empty());
    }

    #[test_case("1 2\n3\n" ; "ragged")]
    #[test_case("1 2\n3 4\n5 6\n" ; "not square")]
    #[test_case("1 x\n3 4\n" ; "garbage")]
    #[test_case("1 NaN\n3 4\n" ; "nan")]
    #[test_case("1 -inf\n3 4\n" ; "negative infinity")]
    fn read_invalid(input: &str) {
        assert_eq!(read(input).unwrap_err().kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn write_then_read() {
        let matrix = CostMatrix::from([[0.5, f64::INFINITY], [-2.0, 1e10]]);
        let mut buffer = Vec::new();
        matrix.try_write_matrix(&mut buffer).unwrap();
        assert_eq!(read(std::str::from_utf8(&buffer).unwrap()).unwrap(), matrix);
    }

    #[test]
    fn output_format() {
        assert_eq!(OutputFormat::from_str("pairs").unwrap(), OutputFormat::Pairs);
        assert_eq!(OutputFormat::from_str("CoLumns").unwrap(), OutputFormat::Columns);
        assert!(OutputFormat::from_str("dot").is_err());
    }

    #[test_case(OutputFormat::Pairs => "3 7.5 [(0, 1), (1, 0)]\n")]
    #[test_case(OutputFormat::Columns => "3 7.5 1 0\n")]
    fn write_ranked(format: OutputFormat) -> String {
        let ranked = RankedMatching {
            cost: 7.5,
            matching: Matching::from_columns(&[1, 0]),
        };
        let mut buffer = Vec::new();
        try_write_ranked(&mut buffer, format, 3, &ranked).unwrap();
        String::from_utf8(buffer).unwrap()
    }
}
