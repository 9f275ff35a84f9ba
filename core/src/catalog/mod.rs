//! Configuration store for named platform, brand and style definitions.
//!
//! Built-in platform defaults are overlaid by user definitions loaded from
//! `<config_dir>/{platforms,brands,styles}/*.toml`. The planner only sees the
//! [`PlatformResolver`] capability, so tests can inject fixture platforms.

mod store;
mod types;

pub use store::{Catalog, FixedPlatforms, PlatformResolver};
pub use types::{
    AnimationConfig, BrandColors, BrandConfig, BrandVoice, ChunkingConfig, DurationLimits,
    PlatformConfig, PlatformInfo, Resolution, SafeZones, StyleConfig, StylePacing,
    DEFAULT_ASPECT_RATIO,
};
