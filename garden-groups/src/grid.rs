use std::fmt;

use miette::Diagnostic;
use nom::error::Error as NomError;
use thiserror::Error;

use parser::Span;

#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("grid is empty")]
    #[diagnostic(
        code(garden_groups::grid::empty),
        help("the map needs at least one row with at least one plot")
    )]
    Empty,

    #[error("row {row} has {found} plots, expected {expected}")]
    #[diagnostic(
        code(garden_groups::grid::ragged),
        help("every row of the map must have the same length")
    )]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("invalid label {found:?} at line {line}, column {column}")]
    #[diagnostic(code(garden_groups::grid::invalid_label))]
    InvalidLabel {
        line: u32,
        column: usize,
        found: char,
    },

    #[error("blank line at line {line}")]
    #[diagnostic(
        code(garden_groups::grid::blank_line),
        help("rows must be contiguous; only trailing line endings are ignored")
    )]
    BlankLine { line: u32 },

    #[error("failed to parse grid: {0}")]
    #[diagnostic(code(garden_groups::grid::parse))]
    Parse(String),
}

/// A cell position. Ordering is row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Coordinate {
    pub row: usize,
    pub col: usize,
}

// Up, Right, Down, Left
const DELTAS: [(isize, isize); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

impl Coordinate {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The 4-adjacent coordinates that do not underflow. Upper bounds are
    /// left to the grid.
    pub fn neighbors(self) -> impl Iterator<Item = Coordinate> {
        DELTAS.into_iter().filter_map(move |(dr, dc)| {
            Some(Coordinate {
                row: self.row.checked_add_signed(dr)?,
                col: self.col.checked_add_signed(dc)?,
            })
        })
    }

    /// Lattice points at the four corners of this cell, clockwise from the
    /// top-left.
    pub fn corners(self) -> [Corner; 4] {
        let Coordinate { row, col } = self;
        [
            Corner::new(row, col),
            Corner::new(row, col + 1),
            Corner::new(row + 1, col + 1),
            Corner::new(row + 1, col),
        ]
    }
}

/// An intersection of grid lines. Corner `(r, c)` is the top-left corner of
/// cell `(r, c)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Corner {
    pub row: usize,
    pub col: usize,
}

impl Corner {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// The 2x2 block of cells touching this point: top-left, top-right,
    /// bottom-right, bottom-left. Cells above row 0 or left of column 0 are
    /// `None`.
    pub fn cells(self) -> [Option<Coordinate>; 4] {
        let above = self.row.checked_sub(1);
        let left = self.col.checked_sub(1);
        [
            above.zip(left).map(|(row, col)| Coordinate::new(row, col)),
            above.map(|row| Coordinate::new(row, self.col)),
            Some(Coordinate::new(self.row, self.col)),
            left.map(|col| Coordinate::new(self.row, col)),
        ]
    }
}

/// Immutable rectangular map of labels, stored row-major.
///
/// A `Grid` is never empty and never ragged; both are rejected on
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<L = char> {
    rows: usize,
    cols: usize,
    cells: Vec<L>,
}

impl<L: Copy + Eq + fmt::Debug> Grid<L> {
    pub fn from_rows(rows: Vec<Vec<L>>) -> Result<Self, GridError> {
        let cols = rows.first().map_or(0, Vec::len);
        if cols == 0 {
            return Err(GridError::Empty);
        }

        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != cols)
        {
            return Err(GridError::Ragged {
                row: row + 1,
                expected: cols,
                found,
            });
        }

        Ok(Self {
            rows: rows.len(),
            cols,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false for a constructed grid.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        coordinate.row < self.rows && coordinate.col < self.cols
    }

    /// Row-major index of `coordinate`, if it is in bounds.
    pub fn index_of(&self, coordinate: Coordinate) -> Option<usize> {
        self.contains(coordinate)
            .then(|| coordinate.row * self.cols + coordinate.col)
    }

    pub fn get(&self, coordinate: Coordinate) -> Option<&L> {
        self.index_of(coordinate).map(|index| &self.cells[index])
    }

    /// All coordinates in row-major order.
    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Coordinate::new(row, col)))
    }

    /// Coordinates paired with their labels, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (Coordinate, L)> + '_ {
        self.coordinates().zip(self.cells.iter().copied())
    }

    /// Relabels every cell, keeping the shape.
    pub fn map<M, F>(&self, f: F) -> Grid<M>
    where
        F: FnMut(L) -> M,
    {
        Grid {
            rows: self.rows,
            cols: self.cols,
            cells: self.cells.iter().copied().map(f).collect(),
        }
    }
}

impl Grid<char> {
    /// Parses one row per line; every non-whitespace character is a label.
    pub fn parse(input: &str) -> Result<Self, GridError> {
        let input = input.trim_end_matches(|c: char| c == '\n' || c == '\r');
        if input.trim().is_empty() {
            return Err(GridError::Empty);
        }

        let (rest, rows) = parser::parse_rows(Span::new(input)).map_err(|e| match e {
            nom::Err::Error(NomError { input, .. }) | nom::Err::Failure(NomError { input, .. }) => {
                unexpected(input)
            }
            nom::Err::Incomplete(needed) => GridError::Parse(format!("incomplete input: {needed:?}")),
        })?;

        if !rest.fragment().is_empty() {
            return Err(unexpected(rest));
        }

        Self::from_rows(rows)
    }
}

fn unexpected(at: Span) -> GridError {
    match at.fragment().chars().next() {
        Some('\n' | '\r') => GridError::BlankLine {
            line: at.location_line() + 1,
        },
        Some(found) => GridError::InvalidLabel {
            line: at.location_line(),
            column: at.get_utf8_column(),
            found,
        },
        None => GridError::Parse("unexpected end of input".to_string()),
    }
}

impl<L: fmt::Display> fmt::Display for Grid<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            for label in row {
                write!(f, "{}", label)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

// region: nom parser
mod parser {
    use nom::{
        character::complete::{line_ending, satisfy},
        multi::{many1, separated_list1},
        IResult,
    };
    use nom_locate::LocatedSpan;

    pub(crate) type Span<'a> = LocatedSpan<&'a str>;

    fn parse_label(input: Span) -> IResult<Span, char> {
        satisfy(|c: char| !c.is_whitespace())(input)
    }

    pub(crate) fn parse_rows(input: Span) -> IResult<Span, Vec<Vec<char>>> {
        separated_list1(line_ending, many1(parse_label))(input)
    }
}
// endregion
