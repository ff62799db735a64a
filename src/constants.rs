/// Page-facing names and tuning for the web front-end.
///
/// Kept free of browser types so the host tests can include this file.
// Canvas the network draws into
pub const CANVAS_ID: &str = "bg-net";

// Set on the canvas while the low-power query matches
pub const DISABLED_ATTR: &str = "data-bg-net-disabled";

// Window property the control object is published under
pub const GLOBAL_NAME: &str = "BGNet";

// Media queries
pub const LOW_POWER_QUERY: &str = "(max-width: 480px), (pointer: coarse)";
pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";
pub const COARSE_POINTER_QUERY: &str = "(pointer: coarse)";

// Theme custom properties on the document element
pub const THEME_GOLD_1: &str = "--gold-1";
pub const THEME_GOLD_2: &str = "--gold-2";
pub const THEME_GOLD_LINE: &str = "--gold-line";

// Rebuilds slower than this are logged at info
pub const SLOW_REBUILD_MS: f64 = 8.0;
