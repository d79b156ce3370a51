pub mod config;
pub mod diagnostics;
pub mod error;
pub mod export_map;
pub mod rewrite;
pub mod sourcemap;

pub use export_map::{
    BindingKind, CacheEntry, DEFAULT_EXPORT, ExportBinding, ExportMap, ExportMapCache, ReadSource,
    ResolveEntry, build_export_map,
};
pub use rewrite::{BarrelPackages, BarrelRewriter, TransformOutput, VIRTUAL_MODULE_PREFIX};
