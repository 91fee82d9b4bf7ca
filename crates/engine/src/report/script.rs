use std::path::PathBuf;

use pkgbridge_types::ResolvableItem;

/// A patch script is about to run
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptStart {
    pub item: ResolvableItem,
    pub path: PathBuf,
}

/// Script output; `ping` updates carry no output and only prove liveness
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOutput {
    pub ping: bool,
    pub output: String,
}

/// Message a patch wants shown to the user
#[derive(Debug, Clone, PartialEq)]
pub struct PatchMessage {
    pub item: ResolvableItem,
    pub text: String,
}
