//! Fixed names and default locations used by the bridge

/// Default file receiving the solver problem list.
pub const DEFAULT_BADLIST: &str = "/var/log/pkgbridge/badlist";

/// Product descriptor directory, relative to the target root.
pub const PRODUCTS_DIR: &str = "etc/products.d";

/// Name of the link pointing at the base product descriptor.
pub const BASEPRODUCT_LINK: &str = "baseproduct";

/// Minimum progress change (in percent) that triggers a report.
pub const DEFAULT_THROTTLE_STEP: u32 = 5;

/// Maximum silence on a progress stream before a report is forced.
pub const DEFAULT_THROTTLE_HEARTBEAT_SECS: u64 = 3;

pub const ENV_TARGET_ROOT: &str = "PKGBRIDGE_TARGET_ROOT";
pub const ENV_BADLIST: &str = "PKGBRIDGE_BADLIST";
pub const ENV_AUTHORITY: &str = "PKGBRIDGE_AUTHORITY";
