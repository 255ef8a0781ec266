use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone, PartialEq)]
#[command(author, version, about = "Renders a lit desk scene", long_about = None)]
pub struct Config {
    /// Directory the scene textures are loaded from
    #[arg(long, default_value = "assets/textures")]
    pub texture_dir: PathBuf,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Fail at startup if a texture cannot be loaded instead of drawing a placeholder
    #[arg(long)]
    pub strict_textures: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self::parse_from(["desk-scene"])
    }
}
