pub mod find;
pub mod grid;
pub mod render;

use thiserror::Error;

pub use find::{
    adjacent, find_path, MapStorage, MapTrait, NodeReference, PathFinder, PathFinderState,
    PathResult, Strategy,
};
pub use grid::{Cell, CellStorage, GridMap, Marker, PathOverlay, Point};
pub use render::{Palette, RenderConfig};

#[derive(Debug, Error)]
pub enum MazeError {
    #[error("maze has no cells")]
    EmptyGrid,
    #[error("maze row {row} has {found} columns, expected {expected}")]
    MalformedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("maze has no {0} marker")]
    MissingMarker(Marker),
    #[error("maze has more than one {marker} marker, at {first} and {second}")]
    DuplicateMarker {
        marker: Marker,
        first: Point,
        second: Point,
    },
    #[error("{0} is outside the maze")]
    OutOfBounds(Point),
    #[error("no path from {start} to {goal}")]
    NoPathFound { start: Point, goal: Point },
    #[error("a {rows}x{columns} maze with {cell_size} pixel cells does not fit in an image")]
    ImageTooLarge {
        rows: usize,
        columns: usize,
        cell_size: u32,
    },
    #[error("could not read maze: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not write image: {0}")]
    Image(#[from] image::ImageError),
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_single_cell_maze_is_rejected() {
        let map: GridMap = "S".parse().unwrap();

        let err = map.find_markers().unwrap_err();
        assert!(matches!(err, MazeError::MissingMarker(Marker::End)));
        assert_eq!(err.to_string(), "maze has no end ('E') marker");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            MazeError::NoPathFound {
                start: Point::new(0, 0),
                goal: Point::new(2, 3)
            }
            .to_string(),
            "no path from (0, 0) to (2, 3)"
        );
        assert_eq!(
            MazeError::MalformedGrid {
                row: 2,
                expected: 4,
                found: 3
            }
            .to_string(),
            "maze row 2 has 3 columns, expected 4"
        );
    }

    #[test]
    fn test_load_solve_and_print() {
        let dir = std::env::temp_dir().join(format!("solver-lib-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("maze.txt");
        std::fs::write(&file, "S..\n.#.\n..E\n").unwrap();

        let map = GridMap::from_file(&file).unwrap();
        let (start, goal) = map.find_markers().unwrap();
        let res = find_path(&map, start, goal, Strategy::BreadthFirst).unwrap();

        assert_eq!(res.path.len(), 5);
        assert_eq!(map.with_path(&res.path).to_string(), "S + +\n. # +\n. . E\n");

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_bundled_mazes() {
        let mazes = concat!(env!("CARGO_MANIFEST_DIR"), "/../mazes");

        let map = GridMap::from_file(format!("{}/maze4.txt", mazes)).unwrap();
        let (start, goal) = map.find_markers().unwrap();
        let bfs = find_path(&map, start, goal, Strategy::BreadthFirst).unwrap();
        let dfs = find_path(&map, start, goal, Strategy::DepthFirst).unwrap();
        assert_eq!(bfs.path.len(), 35);
        assert!(dfs.path.len() >= bfs.path.len());

        let map = GridMap::from_file(format!("{}/enclosed.txt", mazes)).unwrap();
        let (start, goal) = map.find_markers().unwrap();
        assert!(matches!(
            find_path(&map, start, goal, Strategy::BreadthFirst),
            Err(MazeError::NoPathFound { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            GridMap::from_file("does/not/exist.txt"),
            Err(MazeError::Io(_))
        ));
    }
}
