//! Brush catalog: brush kinds, auto-border sets, and the TOML-backed registry.
#![forbid(unsafe_code)]

pub mod border;
pub mod brush;
pub mod config;
pub mod policy;
pub mod registry;
mod warnings;

pub use border::{
    AutoBorder, BORDER_SLOTS, BorderId, BorderRef, BorderSlot, BorderTarget, RUNTIME_BORDER_BASE,
};
pub use brush::{
    Brush, BrushId, BrushKind, Capabilities, DoodadBrush, DoodadPiece, GroundVariant,
    TerrainBrush, WallBrush,
};
pub use policy::{EngineConfig, GroupPrecedence, HateFriendsScope};
pub use registry::BrushRegistry;
pub use warnings::Warnings;
