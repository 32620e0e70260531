//! System-wide constants and default file names.

/// File name of a module manifest inside its directory.
pub const MANIFEST_FILE_NAME: &str = "Manifest.hdm";

/// Default configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "hdlplan.json";

/// Prefix used when rendering paths that live under the external module root.
pub const EXTERNAL_SCOPE_PREFIX: &str = "ext:";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "hdlplan";
