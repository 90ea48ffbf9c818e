use std::path::Path;

use image::{Rgba, RgbaImage};
use log::debug;
use serde::Deserialize;

use crate::{Cell, CellStorage, GridMap, MapStorage, MapTrait, MazeError, Point};

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Fill colors for each cell category, as RGB triples
#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct Palette {
    pub start: [u8; 3],
    pub end: [u8; 3],
    pub wall: [u8; 3],
    pub path: [u8; 3],
    pub floor: [u8; 3],
}

impl Palette {
    /// Colors used when drawing a maze together with a path
    pub fn solution() -> Self {
        Self {
            start: [255, 0, 0],
            end: [0, 0, 255],
            wall: [13, 30, 68],
            path: [200, 235, 113],
            floor: [212, 97, 85],
        }
    }

    /// Colors used for the bare maze
    pub fn maze() -> Self {
        Self {
            wall: [25, 25, 112],
            ..Self::solution()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Side length of one cell in pixels
    pub cell_size: u32,
    /// Background left visible on each side of a cell
    pub cell_border: u32,
    pub maze_palette: Palette,
    pub solution_palette: Palette,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            cell_size: 50,
            cell_border: 2,
            maze_palette: Palette::maze(),
            solution_palette: Palette::solution(),
        }
    }
}

fn rgba([r, g, b]: [u8; 3]) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

/// Draw the maze, highlighting the cells of `path` if there is one.
///
/// Only membership in the path matters, not its order. Points of the path
/// outside the grid are ignored.
pub fn render(
    map: &GridMap,
    path: Option<&[Point]>,
    start: Point,
    goal: Point,
    config: &RenderConfig,
) -> Result<RgbaImage, MazeError> {
    let palette = match path {
        Some(_) => &config.solution_palette,
        None => &config.maze_palette,
    };

    let mut on_path: CellStorage<bool> = map.create_storage();
    for &point in path.unwrap_or_default() {
        if on_path.is_valid(point) {
            *on_path.get_mut(point) = true;
        }
    }

    let size = config.cell_size;
    let border = config.cell_border;
    let too_large = || MazeError::ImageTooLarge {
        rows: map.rows(),
        columns: map.columns(),
        cell_size: size,
    };
    let pixels = |cells: usize| {
        u32::try_from(cells)
            .ok()
            .and_then(|cells| cells.checked_mul(size))
            .ok_or_else(too_large)
    };
    let width = pixels(map.columns())?;
    let height = pixels(map.rows())?;

    let mut img = RgbaImage::from_pixel(width, height, BACKGROUND);
    if width == 0 || height == 0 {
        return Ok(img);
    }

    for point in map.points() {
        let fill = if point == start {
            palette.start
        } else if point == goal {
            palette.end
        } else if matches!(map.cell_at(point), Ok(Cell::Wall)) {
            palette.wall
        } else if on_path.get(point) {
            palette.path
        } else {
            palette.floor
        };

        // width and height fit in u32, so every cell offset below them does too
        let (col, row) = (point.col as u32, point.row as u32);

        // inclusive corners, clipped to the image
        let x0 = (col * size).saturating_add(border);
        let y0 = (row * size).saturating_add(border);
        let x1 = (col * size + size).saturating_sub(border).min(width - 1);
        let y1 = (row * size + size).saturating_sub(border).min(height - 1);

        for y in y0..=y1 {
            for x in x0..=x1 {
                img.put_pixel(x, y, rgba(fill));
            }
        }
    }

    Ok(img)
}

/// Render the bare maze and save it, the format follows the file extension
pub fn draw_maze(
    map: &GridMap,
    start: Point,
    goal: Point,
    config: &RenderConfig,
    dest: impl AsRef<Path>,
) -> Result<(), MazeError> {
    save(&render(map, None, start, goal, config)?, dest)
}

/// Render the maze with `path` highlighted and save it
pub fn draw_path(
    map: &GridMap,
    path: &[Point],
    start: Point,
    goal: Point,
    config: &RenderConfig,
    dest: impl AsRef<Path>,
) -> Result<(), MazeError> {
    save(&render(map, Some(path), start, goal, config)?, dest)
}

fn save(img: &RgbaImage, dest: impl AsRef<Path>) -> Result<(), MazeError> {
    let dest = dest.as_ref();
    debug!(
        "saving {}x{} image to {}",
        img.width(),
        img.height(),
        dest.display()
    );
    img.save(dest)?;
    Ok(())
}

#[cfg(test)]
mod test {

    use super::*;

    fn create_map() -> (GridMap, Point, Point) {
        let map: GridMap = "S..\n.#.\n..E".parse().unwrap();
        let (start, goal) = map.find_markers().unwrap();
        (map, start, goal)
    }

    /// Color in the middle of a cell
    fn center(img: &RgbaImage, config: &RenderConfig, row: u32, col: u32) -> Rgba<u8> {
        let half = config.cell_size / 2;
        *img.get_pixel(col * config.cell_size + half, row * config.cell_size + half)
    }

    #[test]
    fn test_image_size() {
        let map: GridMap = "S..E\n....".parse().unwrap();
        let config = RenderConfig::default();

        let img = render(&map, None, Point::new(0, 0), Point::new(0, 3), &config).unwrap();
        assert_eq!(img.dimensions(), (200, 100));
    }

    #[test]
    fn test_cell_colors() {
        let (map, start, goal) = create_map();
        let config = RenderConfig::default();
        let path = [
            Point::new(0, 0),
            Point::new(0, 1),
            Point::new(0, 2),
            Point::new(1, 2),
            Point::new(2, 2),
        ];

        let img = render(&map, Some(&path), start, goal, &config).unwrap();
        let palette = Palette::solution();

        assert_eq!(center(&img, &config, 0, 0), rgba(palette.start));
        assert_eq!(center(&img, &config, 2, 2), rgba(palette.end));
        assert_eq!(center(&img, &config, 1, 1), rgba(palette.wall));
        assert_eq!(center(&img, &config, 0, 1), rgba(palette.path));
        assert_eq!(center(&img, &config, 1, 2), rgba(palette.path));
        assert_eq!(center(&img, &config, 2, 0), rgba(palette.floor));
    }

    #[test]
    fn test_borders_stay_black() {
        let (map, start, goal) = create_map();
        let config = RenderConfig::default();

        let img = render(&map, None, start, goal, &config).unwrap();

        assert_eq!(*img.get_pixel(0, 0), BACKGROUND);
        assert_eq!(*img.get_pixel(1, 1), BACKGROUND);
        assert_eq!(*img.get_pixel(2, 2), rgba(Palette::maze().start));
        assert_eq!(*img.get_pixel(48, 48), rgba(Palette::maze().start));
        assert_eq!(*img.get_pixel(49, 49), BACKGROUND);
        assert_eq!(*img.get_pixel(51, 25), BACKGROUND);
    }

    #[test]
    fn test_plain_maze_palette() {
        let (map, start, goal) = create_map();
        let config = RenderConfig::default();

        let img = render(&map, None, start, goal, &config).unwrap();

        assert_eq!(center(&img, &config, 1, 1), rgba(Palette::maze().wall));
        assert_eq!(center(&img, &config, 0, 1), rgba(Palette::maze().floor));
    }

    #[test]
    fn test_path_outside_grid_is_ignored() {
        let (map, start, goal) = create_map();
        let config = RenderConfig {
            cell_size: 4,
            cell_border: 0,
            ..Default::default()
        };

        let img = render(&map, Some(&[Point::new(9, 9)]), start, goal, &config).unwrap();
        assert_eq!(img.dimensions(), (12, 12));
        assert_eq!(*img.get_pixel(11, 11), rgba(Palette::solution().end));
    }

    #[test]
    fn test_image_too_large() {
        let map: GridMap = format!("S{}E", ".".repeat(99_998)).parse().unwrap();
        let config = RenderConfig {
            cell_size: 50_000,
            ..Default::default()
        };

        let res = render(&map, None, Point::new(0, 0), Point::new(0, 99_999), &config);
        assert!(matches!(
            res,
            Err(MazeError::ImageTooLarge {
                rows: 1,
                columns: 100_000,
                cell_size: 50_000
            })
        ));
    }

    #[test]
    fn test_draw_path_writes_png() {
        let (map, start, goal) = create_map();
        let config = RenderConfig {
            cell_size: 10,
            ..Default::default()
        };
        let dest = std::env::temp_dir().join(format!("solver-render-{}.png", std::process::id()));

        draw_path(&map, &[start, goal], start, goal, &config, &dest).unwrap();

        let loaded = image::open(&dest).unwrap().to_rgba8();
        assert_eq!(loaded.dimensions(), (30, 30));
        assert_eq!(center(&loaded, &config, 0, 0), rgba(Palette::solution().start));

        std::fs::remove_file(&dest).unwrap();
    }

    #[test]
    fn test_config_from_json() {
        let config: RenderConfig = serde_json::from_str(r#"{ "cell_size": 20 }"#).unwrap();

        assert_eq!(config.cell_size, 20);
        assert_eq!(config.cell_border, 2);
        assert_eq!(config.solution_palette, Palette::solution());
    }
}
