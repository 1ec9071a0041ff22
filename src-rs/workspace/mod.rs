// Workspace enumeration: exclusion rules, ignore files, scanning and tree rendering

pub mod exclusion;
pub mod ignore_cache;
pub mod scanner;
pub mod tree_format;
