//! Command-line interface of the native binary.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use whiteboard_core::{
    EXPORT_FILE_NAME, FileReaderUpdate, LoadOutcome, Whiteboard, WhiteboardConfig,
};
use whiteboard_render::{load_image_source, render_png};

#[derive(Parser, Debug)]
#[command(name = "whiteboard")]
#[command(version, about = "Render saved whiteboard scenes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rasterize a saved scene to PNG
    Render(RenderArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct RenderArgs {
    /// Scene JSON written by the widget
    pub scene: PathBuf,

    /// Background image (file path or data URL)
    #[arg(long, short = 'b', value_name = "IMAGE")]
    pub background: Option<String>,

    /// Output file
    #[arg(long, short = 'o', default_value = EXPORT_FILE_NAME)]
    pub output: PathBuf,

    /// Surface width in pixels
    #[arg(long, default_value_t = 800)]
    pub width: u32,

    /// Surface height in pixels
    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Pixel density of the output
    #[arg(long, default_value_t = 1.0)]
    pub scale: f64,
}

/// Execute a parsed command line.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Render(args) => {
            let output = render(&args)?;
            log::info!("Wrote {}", output.display());
            Ok(())
        }
    }
}

/// Load the scene (and background), rasterize it and write the PNG.
pub fn render(args: &RenderArgs) -> anyhow::Result<PathBuf> {
    let json = fs::read_to_string(&args.scene)
        .with_context(|| format!("reading scene {}", args.scene.display()))?;

    let config = WhiteboardConfig {
        width: args.width,
        height: args.height,
        ..WhiteboardConfig::default()
    };
    let mut board = Whiteboard::new(config);
    board
        .mount(Some(&json))
        .with_context(|| format!("loading scene {}", args.scene.display()))?;

    if let Some(source) = &args.background {
        let update = FileReaderUpdate::page(1, source.clone());
        if let Some(ticket) = board.update_file_reader_info(update) {
            let outcome = board
                .complete_load(&ticket, load_image_source(source))
                .with_context(|| format!("loading background {source}"))?;
            if outcome == LoadOutcome::Superseded {
                anyhow::bail!("background load was superseded");
            }
        }
    }

    let png = render_png(board.canvas(), args.scale)?;
    fs::write(&args.output, png)
        .with_context(|| format!("writing {}", args.output.display()))?;
    board.unmount();
    Ok(args.output.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use whiteboard_core::shapes::{Rectangle, SerializableColor, Shape};
    use whiteboard_core::Scene;
    use whiteboard_render::encode_png;

    fn scene_json() -> String {
        let mut scene = Scene::new();
        let mut rect = Rectangle::new(Point::new(10.0, 10.0), 30.0, 30.0);
        rect.style.fill_color = Some(SerializableColor::new(255, 0, 0, 255));
        scene.add_shape(Shape::Rectangle(rect));
        scene.to_json().unwrap()
    }

    fn args(dir: &tempfile::TempDir) -> RenderArgs {
        let scene = dir.path().join("scene.json");
        fs::write(&scene, scene_json()).unwrap();
        RenderArgs {
            scene,
            background: None,
            output: dir.path().join("out.png"),
            width: 64,
            height: 48,
            scale: 1.0,
        }
    }

    #[test]
    fn test_cli_parses_render() {
        let cli = Cli::parse_from(["whiteboard", "render", "scene.json", "--width", "320"]);
        let Command::Render(args) = cli.command;
        assert_eq!(args.scene, PathBuf::from("scene.json"));
        assert_eq!(args.width, 320);
        assert_eq!(args.height, 600);
        assert_eq!(args.output, PathBuf::from("image.png"));
    }

    #[test]
    fn test_render_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(&dir);
        let output = render(&args).unwrap();

        let decoded = image::open(&output).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (64, 48));
        assert_eq!(decoded.get_pixel(25, 25).0, [255, 0, 0, 255]);
        assert_eq!(decoded.get_pixel(60, 45).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_render_with_background() {
        let dir = tempfile::tempdir().unwrap();
        let background = dir.path().join("page.png");
        let pixels = [0u8, 0, 255, 255].repeat(4);
        fs::write(&background, encode_png(&pixels, 2, 2).unwrap()).unwrap();

        let mut args = args(&dir);
        args.background = Some(background.display().to_string());
        let output = render(&args).unwrap();

        let decoded = image::open(&output).unwrap().to_rgba8();
        // Square background scaled to the height and centered
        assert_eq!(decoded.get_pixel(50, 44).0, [0, 0, 255, 255]);
        assert_eq!(decoded.get_pixel(1, 40).0, [255, 255, 255, 255]);
        assert_eq!(decoded.get_pixel(25, 25).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_render_missing_scene_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(&dir);
        args.scene = dir.path().join("missing.json");
        assert!(render(&args).is_err());
    }

    #[test]
    fn test_render_invalid_scene_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(&dir);
        fs::write(&args.scene, "{ not json").unwrap();
        assert!(render(&args).is_err());
    }
}
