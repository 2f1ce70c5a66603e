use serde::{Deserialize, Serialize};

/// Identifier of a board held in inventory.
pub type BoardId = u64;

/// Dimensions are stored as integer milliunits (1/1000 of the caller's unit).
/// All geometric comparisons happen on these integers; conversion to and from
/// floating point is confined to the serde/CLI boundary.
pub fn to_milli(value: f64) -> Result<u32, String> {
    if !value.is_finite() {
        return Err(format!("dimension must be a finite number, got {value}"));
    }
    if value < 0.0 {
        return Err(format!("dimension must be non-negative, got {value}"));
    }
    let raw = (value * 1000.0).round();
    if raw > u32::MAX as f64 {
        return Err(format!("dimension {value} is too large"));
    }
    Ok(raw as u32)
}

pub fn from_milli(raw: u32) -> f64 {
    raw as f64 / 1000.0
}

/// Formats a milliunit dimension without trailing zeros (24500 -> "24.5").
pub fn format_units(raw: u32) -> String {
    let s = format!("{:.3}", from_milli(raw));
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Serde adapter: JSON numbers in caller units <-> internal milliunits.
pub mod dim {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(raw: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(super::from_milli(*raw))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let value = f64::deserialize(deserializer)?;
        super::to_milli(value).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    #[serde(with = "dim")]
    pub length: u32,
    #[serde(with = "dim")]
    pub width: u32,
}

impl Rect {
    pub fn new(length: u32, width: u32) -> Self {
        Self { length, width }
    }

    pub fn area(&self) -> u64 {
        self.length as u64 * self.width as u64
    }

    pub fn rotated(&self) -> Self {
        Self {
            length: self.width,
            width: self.length,
        }
    }

    pub fn fits_in(&self, other: &Rect) -> bool {
        self.length <= other.length && self.width <= other.width
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", format_units(self.length), format_units(self.width))
    }
}

/// A physical stock board available for cutting. Cost is derived by the
/// inventory at snapshot time and stays fixed for the whole optimization run.
#[derive(Debug, Clone, Serialize)]
pub struct Board {
    pub id: BoardId,
    #[serde(with = "dim")]
    pub length: u32,
    #[serde(with = "dim")]
    pub width: u32,
    #[serde(with = "dim")]
    pub depth: u32,
    pub cost: f64,
}

impl Board {
    pub fn rect(&self) -> Rect {
        Rect::new(self.length, self.width)
    }

    pub fn area(&self) -> u64 {
        self.rect().area()
    }
}

/// A required rectangular piece. The id is the position in the caller's cut
/// list and is never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CutRequirement {
    pub id: usize,
    #[serde(with = "dim")]
    pub length: u32,
    #[serde(with = "dim")]
    pub width: u32,
}

impl CutRequirement {
    pub fn new(id: usize, length: u32, width: u32) -> Self {
        Self { id, length, width }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.length, self.width)
    }
}

/// One cut positioned on one board. `length`/`width` are the dimensions as
/// placed: the original cut's, swapped iff `rotated`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Placement {
    pub cut_id: usize,
    #[serde(with = "dim")]
    pub x: u32,
    #[serde(with = "dim")]
    pub y: u32,
    #[serde(with = "dim")]
    pub length: u32,
    #[serde(with = "dim")]
    pub width: u32,
    pub rotated: bool,
}

impl Placement {
    pub fn rect(&self) -> Rect {
        Rect::new(self.length, self.width)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardPlan {
    pub board_id: BoardId,
    #[serde(with = "dim")]
    pub board_length: u32,
    #[serde(with = "dim")]
    pub board_width: u32,
    pub placements: Vec<Placement>,
    pub waste_percentage: f64,
}

impl BoardPlan {
    pub fn board_rect(&self) -> Rect {
        Rect::new(self.board_length, self.board_width)
    }

    pub fn placed_area(&self) -> u64 {
        self.placements.iter().map(|p| p.rect().area()).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub board_plans: Vec<BoardPlan>,
    pub total_waste_percentage: f64,
    pub total_cost: f64,
    pub unplaced_cuts: Vec<CutRequirement>,
}

impl OptimizationResult {
    pub fn boards_used(&self) -> usize {
        self.board_plans.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Objective {
    /// Prefer smaller boards first, minimizing discarded area.
    #[default]
    Waste,
    /// Prefer cheaper boards first, minimizing money spent.
    Cost,
}

#[derive(Debug, Clone, Copy)]
pub struct OptimizationConfig {
    pub optimize_for: Objective,
    pub allow_rotation: bool,
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self {
            optimize_for: Objective::Waste,
            allow_rotation: true,
        }
    }
}
