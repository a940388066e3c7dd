//! Theme and Colors
//!
//! A dark palette with League gold accents. Terminals without true color
//! degrade these to the nearest of their 256 colors.

use ratatui::style::Color;

// ============================================================================
// Brand
// ============================================================================

/// Title and assistant accent - Hextech gold
pub const LOLGPT_GOLD: Color = Color::Rgb(200, 170, 110);

/// Secondary accent - Hextech blue
pub const HEXTECH_BLUE: Color = Color::Rgb(10, 200, 185);

// ============================================================================
// UI Colors
// ============================================================================

/// User messages and input
pub const USER_GREEN: Color = Color::Rgb(130, 220, 130);

/// Description, separators, placeholder
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Status text
pub const STATUS_GRAY: Color = Color::Rgb(150, 150, 150);

/// Errors
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);
