use crate::find::{MapStorage, MapTrait, NodeReference};
use crate::MazeError;
use std::path::Path;
use std::{fmt::Display, str::FromStr};

pub const WALL: char = '#';
pub const START: char = 'S';
pub const END: char = 'E';

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Cell {
    Wall,
    Start,
    End,
    /// Walkable floor, keeps the character it was read from
    Open(char),
}

impl Cell {
    pub fn from_symbol(symbol: char) -> Self {
        match symbol {
            WALL => Cell::Wall,
            START => Cell::Start,
            END => Cell::End,
            other => Cell::Open(other),
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Cell::Wall => WALL,
            Cell::Start => START,
            Cell::End => END,
            Cell::Open(c) => *c,
        }
    }

    pub fn is_wall(&self) -> bool {
        matches!(self, Cell::Wall)
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The two cells every maze must contain exactly once
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Marker {
    Start,
    End,
}

impl Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Marker::Start => write!(f, "start ('{}')", START),
            Marker::End => write!(f, "end ('{}')", END),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

impl Point {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// True if the two points share an edge
    pub fn is_adjacent(&self, other: &Point) -> bool {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col) == 1
    }
}

impl NodeReference for Point {}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// A MapTrait implementation over a rectangular grid of maze symbols.
///
/// The grid is immutable once built; every constructor checks that all rows
/// have the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMap {
    rows: usize,
    columns: usize,
    cells: Vec<Vec<Cell>>,
}

impl GridMap {
    pub fn new(cells: Vec<Vec<Cell>>) -> Result<Self, MazeError> {
        let Some(columns) = cells.first().map(Vec::len) else {
            return Err(MazeError::EmptyGrid);
        };

        if let Some((row, found)) = cells
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|(_, len)| *len != columns)
        {
            return Err(MazeError::MalformedGrid {
                row,
                expected: columns,
                found,
            });
        }

        // only blank lines
        if columns == 0 {
            return Err(MazeError::EmptyGrid);
        }

        Ok(Self {
            rows: cells.len(),
            columns,
            cells,
        })
    }

    /// Read a maze from a text file, one row per line
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MazeError> {
        std::fs::read_to_string(path)?.parse()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn cell_at(&self, point: Point) -> Result<Cell, MazeError> {
        self.cells
            .get(point.row)
            .and_then(|row| row.get(point.col))
            .copied()
            .ok_or(MazeError::OutOfBounds(point))
    }

    /// All points of the grid in row-major order
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.columns).map(move |col| Point { row, col }))
    }

    /// Locate the start and end markers, scanning row by row.
    ///
    /// Both markers must appear exactly once.
    pub fn find_markers(&self) -> Result<(Point, Point), MazeError> {
        let mut start: Option<Point> = None;
        let mut end: Option<Point> = None;

        for point in self.points() {
            let (marker, slot) = match self.cells[point.row][point.col] {
                Cell::Start => (Marker::Start, &mut start),
                Cell::End => (Marker::End, &mut end),
                _ => continue,
            };

            if let Some(first) = *slot {
                return Err(MazeError::DuplicateMarker {
                    marker,
                    first,
                    second: point,
                });
            }
            *slot = Some(point);
        }

        let start = start.ok_or(MazeError::MissingMarker(Marker::Start))?;
        let end = end.ok_or(MazeError::MissingMarker(Marker::End))?;
        Ok((start, end))
    }

    /// Displays the grid with `+` on every path cell that is not a marker
    pub fn with_path(&self, path: &[Point]) -> PathOverlay<'_> {
        let mut on_path: CellStorage<bool> = self.create_storage();
        for &point in path.iter().filter(|p| self.is_valid(**p)) {
            *on_path.get_mut(point) = true;
        }

        PathOverlay { map: self, on_path }
    }

    fn fmt_with(
        &self,
        f: &mut std::fmt::Formatter<'_>,
        symbol: impl Fn(Point, Cell) -> char,
    ) -> std::fmt::Result {
        for (row, cells) in self.cells.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if col > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", symbol(Point { row, col }, *cell))?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl FromStr for GridMap {
    type Err = MazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cells = s
            .lines()
            .map(|line| line.chars().map(Cell::from_symbol).collect())
            .collect();

        GridMap::new(cells)
    }
}

impl Display for GridMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.fmt_with(f, |_, cell| cell.symbol())
    }
}

pub struct PathOverlay<'a> {
    map: &'a GridMap,
    on_path: CellStorage<bool>,
}

impl Display for PathOverlay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.map.fmt_with(f, |point, cell| match cell {
            Cell::Start | Cell::End => cell.symbol(),
            _ if self.on_path.get(point) => '+',
            _ => cell.symbol(),
        })
    }
}

/// A MapStorage that uses a rectangular grid of cells (a vec in a vec)
#[derive(Debug)]
pub struct CellStorage<T>(Vec<Vec<T>>);

impl<T: Copy + 'static> MapStorage<T> for CellStorage<T> {
    type Reference = Point;

    fn is_valid(&self, node: Self::Reference) -> bool {
        node.row < self.0.len() && node.col < self.0[0].len()
    }

    fn get(&self, node: Self::Reference) -> T {
        self.0[node.row][node.col]
    }

    fn get_mut(&mut self, node: Self::Reference) -> &mut T {
        &mut self.0[node.row][node.col]
    }
}

impl MapTrait for GridMap {
    type Reference = Point;
    type Storage<T: Default + Copy + Clone + 'static> = CellStorage<T>;

    fn is_valid(&self, node: Self::Reference) -> bool {
        node.row < self.rows && node.col < self.columns
    }

    fn is_passable(&self, node: Self::Reference) -> bool {
        matches!(self.cell_at(node), Ok(cell) if !cell.is_wall())
    }

    fn neighbors_of(&self, node: Self::Reference) -> impl Iterator<Item = Self::Reference> {
        let mut points = Vec::with_capacity(4);

        // right, down, left, up
        if node.col + 1 < self.columns {
            points.push(Point {
                row: node.row,
                col: node.col + 1,
            });
        }
        if node.row + 1 < self.rows {
            points.push(Point {
                row: node.row + 1,
                col: node.col,
            });
        }
        if node.col > 0 {
            points.push(Point {
                row: node.row,
                col: node.col - 1,
            });
        }
        if node.row > 0 {
            points.push(Point {
                row: node.row - 1,
                col: node.col,
            });
        }

        points.into_iter()
    }

    fn create_storage<T: Default + Copy + Clone + 'static>(&self) -> Self::Storage<T> {
        CellStorage(vec![vec![Default::default(); self.columns]; self.rows])
    }
}
