//! Compile-time build information, shown by `clanquest --version`.

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));
