use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::balance::Wallet;

pub const GRID_COLS: u16 = 16;
pub const GRID_ROWS: u16 = 9;
pub const TOTAL_CELLS: usize = GRID_COLS as usize * GRID_ROWS as usize;

// Card surface in points; cells are 20x20
pub const CARD_WIDTH: f64 = 320.0;
pub const CARD_HEIGHT: f64 = 180.0;
pub const CELL_WIDTH: f64 = CARD_WIDTH / GRID_COLS as f64;
pub const CELL_HEIGHT: f64 = CARD_HEIGHT / GRID_ROWS as f64;

/// A touch uncovers every cell whose centre lies within this distance.
pub const BRUSH_RADIUS: f64 = 22.0;

/// Share of the grid that must be uncovered before the prize is paid.
pub const REVEAL_THRESHOLD: f64 = 0.7;

pub const PRIZES: [u64; 6] = [10, 25, 50, 100, 250, 500];

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cell {
    pub col: u16,
    pub row: u16,
}

impl Cell {
    pub fn new(col: u16, row: u16) -> Self {
        Self { col, row }
    }

    pub fn in_grid(&self) -> bool {
        self.col < GRID_COLS && self.row < GRID_ROWS
    }

    fn center(&self) -> (f64, f64) {
        (
            (f64::from(self.col) + 0.5) * CELL_WIDTH,
            (f64::from(self.row) + 0.5) * CELL_HEIGHT,
        )
    }
}

/// A touch or drag sample in card coordinates.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScratchPhase {
    /// Fresh card, no credit consumed yet.
    Untouched,
    Scratching,
    /// Threshold crossed and the prize paid. Terminal.
    Revealed,
    /// First touch found no scratch-card credit. Terminal for this card.
    OutOfCredits,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScratchRejection {
    OutOfCredits,
}

impl fmt::Display for ScratchRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfCredits => write!(f, "{}", crate::constants::OUT_OF_SCRATCHES_ERROR),
        }
    }
}

impl std::error::Error for ScratchRejection {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScratchUpdate {
    Progress { coverage: f64 },
    /// Emitted once per card, on the batch that crosses the threshold.
    Revealed { prize: u64 },
}

/// One scratch card. The prize is fixed when the card is created;
/// scratching only uncovers it.
#[derive(Debug, Clone)]
pub struct ScratchCard {
    prize: u64,
    revealed: BTreeSet<Cell>,
    phase: ScratchPhase,
}

impl ScratchCard {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::with_prize(draw_prize(rng))
    }

    pub fn with_prize(prize: u64) -> Self {
        Self {
            prize,
            revealed: BTreeSet::new(),
            phase: ScratchPhase::Untouched,
        }
    }

    pub fn prize(&self) -> u64 {
        self.prize
    }

    pub fn phase(&self) -> ScratchPhase {
        self.phase
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }

    pub fn coverage(&self) -> f64 {
        self.revealed.len() as f64 / TOTAL_CELLS as f64
    }

    pub fn touch<W: Wallet + ?Sized>(&mut self, x: f64, y: f64, wallet: &W) -> Result<ScratchUpdate, ScratchRejection> {
        self.touch_stroke(&[Point { x, y }], wallet)
    }

    /// Applies one drag (any number of samples) as a single reveal batch.
    pub fn touch_stroke<W: Wallet + ?Sized>(&mut self, points: &[Point], wallet: &W) -> Result<ScratchUpdate, ScratchRejection> {
        let cells: Vec<Cell> = points
            .iter()
            .flat_map(|p| cells_under_brush(p.x, p.y))
            .collect();
        self.reveal_cells(cells, wallet)
    }

    /// Uncovers `cells`, paying the prize the first time coverage reaches
    /// [`REVEAL_THRESHOLD`]. The first call on a card consumes a scratch credit.
    pub fn reveal_cells<W, I>(&mut self, cells: I, wallet: &W) -> Result<ScratchUpdate, ScratchRejection>
    where
        W: Wallet + ?Sized,
        I: IntoIterator<Item = Cell>,
    {
        self.ensure_paid(wallet)?;

        self.revealed.extend(cells.into_iter().filter(Cell::in_grid));
        let coverage = self.coverage();

        if self.phase == ScratchPhase::Scratching && coverage >= REVEAL_THRESHOLD {
            wallet.add_coins(self.prize);
            self.phase = ScratchPhase::Revealed;
            log::info!("scratch card revealed at {:.3} coverage, paying {} coins", coverage, self.prize);
            return Ok(ScratchUpdate::Revealed { prize: self.prize });
        }

        Ok(ScratchUpdate::Progress { coverage })
    }

    fn ensure_paid<W: Wallet + ?Sized>(&mut self, wallet: &W) -> Result<(), ScratchRejection> {
        match self.phase {
            ScratchPhase::OutOfCredits => Err(ScratchRejection::OutOfCredits),
            ScratchPhase::Untouched => {
                if wallet.spend_scratch() {
                    self.phase = ScratchPhase::Scratching;
                    Ok(())
                } else {
                    log::debug!("first touch on a card without scratch credits");
                    self.phase = ScratchPhase::OutOfCredits;
                    Err(ScratchRejection::OutOfCredits)
                }
            }
            ScratchPhase::Scratching | ScratchPhase::Revealed => Ok(()),
        }
    }

    pub fn view(&self) -> ScratchView {
        ScratchView {
            phase: self.phase,
            cols: GRID_COLS,
            rows: GRID_ROWS,
            revealed_cells: self.revealed.iter().copied().collect(),
            coverage: self.coverage(),
            prize: (self.phase == ScratchPhase::Revealed).then_some(self.prize),
        }
    }
}

pub fn draw_prize<R: Rng + ?Sized>(rng: &mut R) -> u64 {
    *PRIZES.choose(rng).unwrap_or(&PRIZES[0])
}

/// Grid cells whose centre is within [`BRUSH_RADIUS`] of `(x, y)`.
pub fn cells_under_brush(x: f64, y: f64) -> Vec<Cell> {
    let col_range = brush_span(x, CELL_WIDTH, GRID_COLS);
    let row_range = brush_span(y, CELL_HEIGHT, GRID_ROWS);

    let mut cells = Vec::new();
    for row in row_range {
        for col in col_range.clone() {
            let cell = Cell::new(col, row);
            let (cx, cy) = cell.center();
            if (cx - x).hypot(cy - y) <= BRUSH_RADIUS {
                cells.push(cell);
            }
        }
    }
    cells
}

fn brush_span(at: f64, cell_size: f64, count: u16) -> std::ops::Range<u16> {
    let first = ((at - BRUSH_RADIUS) / cell_size).floor().max(0.0);
    let last = ((at + BRUSH_RADIUS) / cell_size).ceil().min(f64::from(count));
    if first >= last {
        return 0..0;
    }
    first as u16..last as u16
}

// === API Types ===

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScratchView {
    pub phase: ScratchPhase,
    pub cols: u16,
    pub rows: u16,
    pub revealed_cells: Vec<Cell>,
    pub coverage: f64,
    /// Hidden until the card is revealed.
    pub prize: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScratchTouchRequest {
    pub points: Vec<Point>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScratchTouchResponse {
    /// True only on the touch that uncovered the prize.
    pub revealed: bool,
    pub coverage: f64,
    pub prize: Option<u64>,
    pub scratches_left: u64,
}

impl ScratchTouchResponse {
    pub fn new(update: ScratchUpdate, coverage: f64, scratches_left: u64) -> Self {
        match update {
            ScratchUpdate::Revealed { prize } => Self {
                revealed: true,
                coverage,
                prize: Some(prize),
                scratches_left,
            },
            ScratchUpdate::Progress { .. } => Self {
                revealed: false,
                coverage,
                prize: None,
                scratches_left,
            },
        }
    }
}
