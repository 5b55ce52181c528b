//! Map dimensions and engine-wide limits

/// Level width in cells
pub const GXM: i32 = 80;

/// Level height in cells
pub const GYM: i32 = 70;

/// Cells kept clear of generation along every map edge
pub const MAPGEN_BORDER: i32 = 2;

/// Innermost column/row that still counts as map proper (outer ring excluded)
pub const X_BOUND_1: i32 = 1;
pub const X_BOUND_2: i32 = GXM - 2;
pub const Y_BOUND_1: i32 = 1;
pub const Y_BOUND_2: i32 = GYM - 2;

/// Hard cap on explosion radius, whatever the requested size
pub const MAX_EXPLOSION_RADIUS: i32 = 9;

/// Range cost meaning "the beam stops here"
pub const BEAM_STOP: i32 = 1000;

/// To-hit value that bypasses evasion entirely
pub const AUTOMATIC_HIT: i32 = 1500;

/// Generation attempts before a level is declared unbuildable
pub const DEFAULT_RETRY_BUDGET: u32 = 20;

/// Deepest level of any branch
pub const MAX_DEPTH: i32 = 27;
