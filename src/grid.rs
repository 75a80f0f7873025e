//! Fixed-size 2D arrays and the grid algorithms shared by the engines.
//!
//! Cells are stored row-major. Coordinates are `(x, y)` with `x` the column
//! and `y` the row, `y = 0` being the top row.

// ============================================================================
// Point
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Offset by a signed delta, `None` if either coordinate would go negative.
    pub fn offset(self, dx: isize, dy: isize) -> Option<Point> {
        let x = self.x.checked_add_signed(dx)?;
        let y = self.y.checked_add_signed(dy)?;
        Some(Point { x, y })
    }
}

/// Orthogonal directions in the order up, down, left, right.
pub const ORTHOGONAL: [(isize, isize); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

// ============================================================================
// Grid
// ============================================================================

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    cells: Vec<T>,
}

impl<T: Copy> Grid<T> {
    pub fn new(width: usize, height: usize, fill: T) -> Self {
        Self {
            width,
            height,
            cells: vec![fill; width * height],
        }
    }

    pub fn square(size: usize, fill: T) -> Self {
        Self::new(size, size, fill)
    }

    /// Build a grid from rows. Every row must have the same length.
    ///
    /// # Panics
    ///
    /// Panics if the rows differ in length.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Self {
        let height = rows.len();
        let width = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut cells = Vec::with_capacity(width * height);
        for row in rows {
            let row = row.as_ref();
            assert_eq!(row.len(), width, "ragged rows");
            cells.extend_from_slice(row);
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x < self.width && p.y < self.height
    }

    /// Bounds check for signed coordinates.
    pub fn contains_signed(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn get(&self, p: Point) -> Option<T> {
        if self.contains(p) {
            Some(self.cells[p.y * self.width + p.x])
        } else {
            None
        }
    }

    /// Set a cell. Returns `false` when `p` is out of bounds.
    pub fn set(&mut self, p: Point, value: T) -> bool {
        if self.contains(p) {
            self.cells[p.y * self.width + p.x] = value;
            true
        } else {
            false
        }
    }

    pub fn fill(&mut self, value: T) {
        self.cells.iter_mut().for_each(|c| *c = value);
    }

    pub fn row(&self, y: usize) -> &[T] {
        &self.cells[y * self.width..(y + 1) * self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        self.cells.chunks(self.width.max(1))
    }

    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// All points in row-major order.
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Point::new(x, y)))
    }

    pub fn count(&self, mut pred: impl FnMut(T) -> bool) -> usize {
        self.cells.iter().filter(|&&c| pred(c)).count()
    }

    /// In-bounds orthogonal neighbours of `p`.
    pub fn neighbors(&self, p: Point) -> impl Iterator<Item = Point> + '_ {
        ORTHOGONAL
            .iter()
            .filter_map(move |&(dx, dy)| p.offset(dx, dy))
            .filter(move |&n| self.contains(n))
    }

    /// Collect the 4-connected component containing `start` whose cells
    /// satisfy `member`, using an explicit stack. Every collected point is
    /// marked in `visited`; already visited points are skipped, so one
    /// `visited` grid can be shared across calls to partition a board.
    pub fn component(
        &self,
        start: Point,
        member: impl Fn(T) -> bool,
        visited: &mut Grid<bool>,
    ) -> Vec<Point> {
        let mut found = Vec::new();
        let mut stack = vec![start];

        while let Some(p) = stack.pop() {
            if visited.get(p) != Some(false) {
                continue;
            }
            match self.get(p) {
                Some(cell) if member(cell) => {}
                _ => continue,
            }
            visited.set(p, true);
            found.push(p);
            for n in self.neighbors(p) {
                if visited.get(n) == Some(false) {
                    stack.push(n);
                }
            }
        }

        found
    }

    /// Distinct in-bounds neighbours of `region` (excluding the region
    /// itself) whose cells satisfy `pred`.
    pub fn frontier(&self, region: &[Point], pred: impl Fn(T) -> bool) -> Vec<Point> {
        let mut seen = Grid::new(self.width, self.height, false);
        for &p in region {
            seen.set(p, true);
        }
        let mut out = Vec::new();
        for &p in region {
            for n in self.neighbors(p) {
                if seen.get(n) == Some(false) {
                    seen.set(n, true);
                    if self.get(n).map(&pred).unwrap_or(false) {
                        out.push(n);
                    }
                }
            }
        }
        out
    }

    /// Remove row `y`, shift every row above it down by one and fill the
    /// top row with `fill`.
    pub fn remove_row(&mut self, y: usize, fill: T) {
        if y >= self.height {
            return;
        }
        let w = self.width;
        self.cells.copy_within(0..y * w, w);
        self.cells[..w].iter_mut().for_each(|c| *c = fill);
    }

    /// The grid rotated 90° clockwise; a `w × h` grid becomes `h × w`.
    pub fn rotated_cw(&self) -> Grid<T> {
        let (w, h) = (self.height, self.width);
        let mut cells = Vec::with_capacity(w * h);
        for ny in 0..h {
            for nx in 0..w {
                // new (nx, ny) comes from old (ny, h_old - 1 - nx)
                let ox = ny;
                let oy = self.height - 1 - nx;
                cells.push(self.cells[oy * self.width + ox]);
            }
        }
        Grid {
            width: w,
            height: h,
            cells,
        }
    }
}
