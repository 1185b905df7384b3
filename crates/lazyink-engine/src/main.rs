//! Demo entry point (native): render a saved drawing to an image file.

#[cfg(feature = "native")]
mod cli {
    use clap::Parser;
    use kurbo::Size;
    use lazyink_core::storage::{SaveData, StrokeDefaults};
    use lazyink_engine::{
        Engine, EngineConfig, EngineError, ExportFormat, ExportOptions, MediaFrame,
    };
    use lazyink_render::{RenderError, decode_data_url};
    use std::path::{Path, PathBuf};
    use thiserror::Error;

    /// Render a LazyInk save file to an image
    #[derive(Parser, Debug)]
    #[command(name = "lazyink")]
    #[command(version)]
    pub struct Args {
        /// Save file to render
        pub save: PathBuf,
        /// Output image path
        pub out: PathBuf,
        /// Canvas width (defaults to the saved width)
        #[arg(long)]
        pub width: Option<f64>,
        /// Canvas height (defaults to the saved height)
        #[arg(long)]
        pub height: Option<f64>,
        /// Image drawn behind the drawing
        #[arg(long)]
        pub background: Option<PathBuf>,
        /// Write PNG instead of JPEG
        #[arg(long)]
        pub png: bool,
    }

    #[derive(Debug, Error)]
    pub enum CliError {
        #[error("{path}: {source}")]
        Io {
            path: PathBuf,
            source: std::io::Error,
        },
        #[error("{path}: {source}")]
        Image {
            path: PathBuf,
            source: image::ImageError,
        },
        #[error(transparent)]
        Engine(#[from] EngineError),
        #[error(transparent)]
        Render(#[from] RenderError),
        #[error("Export produced an unreadable data URL")]
        DataUrl,
    }

    fn read(path: &Path) -> Result<String, CliError> {
        std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Engine configuration and canvas size for rendering `saved`.
    fn config_for(args: &Args, saved: &SaveData) -> (EngineConfig, Size) {
        let size = Size::new(
            args.width.unwrap_or(saved.width),
            args.height.unwrap_or(saved.height),
        );
        let config = EngineConfig {
            hide_interface: true,
            immediate_loading: true,
            background_image: args
                .background
                .as_ref()
                .map(|path| path.display().to_string()),
            ..EngineConfig::default()
        }
        .with_size(size.width, size.height);
        (config, size)
    }

    fn load_background(engine: &mut Engine, path: &Path) -> Result<(), CliError> {
        let decoded = image::open(path)
            .map_err(|source| CliError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (w, h) = decoded.dimensions();
        engine.set_media_frame(MediaFrame::from_straight_rgba(w, h, decoded.into_raw())?)?;
        Ok(())
    }

    pub fn run(args: Args) -> Result<(), CliError> {
        let json = read(&args.save)?;

        // Default to the size the drawing was saved at
        let defaults = StrokeDefaults {
            color: EngineConfig::default().brush_color,
            radius: EngineConfig::default().brush_radius,
        };
        let saved = SaveData::parse(&json, &defaults).map_err(EngineError::from)?;
        let (config, size) = config_for(&args, &saved);
        let background = config.background_image.clone();
        let mut engine = Engine::new(config, size)?;

        if let Some(path) = background {
            load_background(&mut engine, Path::new(&path))?;
        }

        engine.load(&json)?;
        log::info!(
            "Rendering {} lines and {} texts at {}x{}",
            engine.lines().len(),
            engine.texts().len(),
            size.width,
            size.height
        );

        let options = ExportOptions {
            format: if args.png {
                ExportFormat::Png
            } else {
                ExportFormat::Jpeg
            },
            ..ExportOptions::default()
        };
        let snapshot = engine.export_image(&options)?;
        let bytes = decode_data_url(&snapshot.image).ok_or(CliError::DataUrl)?;
        std::fs::write(&args.out, bytes).map_err(|source| CliError::Io {
            path: args.out.clone(),
            source,
        })?;

        engine.dispose();
        Ok(())
    }

}

#[cfg(feature = "native")]
fn main() -> std::process::ExitCode {
    use clap::Parser;

    env_logger::init();
    let args = cli::Args::parse();
    log::info!("Starting LazyInk");

    match cli::run(args) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("lazyink: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
