use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use bootpix::config::{DEFAULT_SCREEN_HEIGHT, DEFAULT_SCREEN_WIDTH};
use bootpix::display::{FixedLocator, GraphicsOutput};
use bootpix::{BootConfig, PixelBuffer, Rect, ScreenPort};
use log::{info, warn};

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    image: Option<PathBuf>,
    svg: Option<PathBuf>,
    scale: Option<f32>,
    out: Option<PathBuf>,
    resolution: Option<(u32, u32)>,
}

/// Parse command line arguments
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args::default();

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--config" | "-c" => {
                parsed.config = value.map(PathBuf::from);
                i += 1;
            },
            "--image" | "-i" => {
                parsed.image = value.map(PathBuf::from);
                i += 1;
            },
            "--svg" => {
                parsed.svg = value.map(PathBuf::from);
                i += 1;
            },
            "--scale" | "-s" => {
                parsed.scale = value.and_then(|v| v.parse().ok());
                i += 1;
            },
            "--out" | "-o" => {
                parsed.out = value.map(PathBuf::from);
                i += 1;
            },
            "--resolution" | "-r" => {
                // WxH, e.g. 1920x1080
                parsed.resolution = value.and_then(|v| {
                    let (w, h) = v.split_once('x')?;
                    Some((w.parse().ok()?, h.parse().ok()?))
                });
                i += 1;
            },
            "--help" => {
                println!("Usage: bootpix [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --config PATH, -c PATH      JSON config file");
                println!("  --image PATH, -i PATH       PNG shown centered on the background");
                println!("  --svg PATH                  SVG icon fitted into a quarter of the screen");
                println!("  --scale F, -s F             Scale for the image (overrides config)");
                println!("  --out PATH, -o PATH         Save a PNG screenshot after presenting");
                println!(
                    "  --resolution WxH, -r WxH    Screen size (default: {DEFAULT_SCREEN_WIDTH}x{DEFAULT_SCREEN_HEIGHT})"
                );
                println!("  --help                      Show this help message");
                std::process::exit(0);
            },
            other => warn!("ignoring unknown argument '{other}'"),
        }
        i += 1;
    }

    parsed
}

fn load_config(args: &Args) -> BootConfig {
    let mut config = match &args.config {
        Some(path) => BootConfig::load(path).unwrap_or_else(|e| {
            warn!("{}: {e}, using defaults", path.display());
            BootConfig::default()
        }),
        None => BootConfig::default(),
    };
    if let Some((w, h)) = args.resolution {
        config.screen_width = w;
        config.screen_height = h;
    }
    if let Some(scale) = args.scale {
        config.icon_scale = scale;
    }
    config
}

/// Center `top` on `base`, treating `base` as the opaque backdrop
fn compose_centered(base: &mut PixelBuffer, top: &PixelBuffer) {
    let x = (i64::from(base.width()) - i64::from(top.width())) / 2;
    let y = (i64::from(base.height()) - i64::from(top.height())) / 2;
    base.compose(x as i32, y as i32, top, true);
}

/// Background fill plus any configured image and icon
fn render_splash(args: &Args, config: &BootConfig) -> Result<PixelBuffer, Box<dyn Error>> {
    let mut screen = PixelBuffer::with_size(config.screen_width, config.screen_height);
    screen.fill(config.background_pixel());

    #[cfg(feature = "png")]
    if let Some(path) = &args.image {
        let bytes = fs::read(path)?;
        let image = PixelBuffer::decode(&bootpix::codec::PngCodec, &bytes)?;
        info!("loaded {} ({}x{})", path.display(), image.width(), image.height());
        let image = PixelBuffer::scaled(&image, config.icon_scale);
        compose_centered(&mut screen, &image);
    }

    #[cfg(feature = "svg")]
    if let Some(path) = &args.svg {
        let text = fs::read_to_string(path)?;
        let mut icon = PixelBuffer::with_size(config.screen_width / 4, config.screen_height / 4);
        if icon.rasterize_vector(&bootpix::codec::SvgCodec, &text, config.icon_scale) {
            compose_centered(&mut screen, &icon);
        } else {
            warn!("{}: nothing to draw", path.display());
        }
    }

    #[cfg(not(feature = "png"))]
    if args.image.is_some() {
        warn!("built without PNG support, --image ignored");
    }
    #[cfg(not(feature = "svg"))]
    if args.svg.is_some() {
        warn!("built without SVG support, --svg ignored");
    }

    Ok(screen)
}

fn save_screenshot(port: &mut ScreenPort, config: &BootConfig, path: &Path) -> Result<(), Box<dyn Error>> {
    let mut shot = PixelBuffer::new();
    port.capture(&mut shot, Rect::new(0, 0, config.screen_width, config.screen_height));
    if shot.is_empty() {
        warn!("screen capture returned nothing, no screenshot written");
        return Ok(());
    }

    #[cfg(feature = "png")]
    {
        let bytes = shot.encode(&bootpix::codec::PngCodec, config.encode_alpha)?;
        fs::write(path, bytes)?;
        info!("screenshot {}x{} saved to {}", shot.width(), shot.height(), path.display());
    }
    #[cfg(not(feature = "png"))]
    warn!("built without PNG support, cannot write {}", path.display());

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();
    let config = load_config(&args);
    info!("screen {}x{}", config.screen_width, config.screen_height);

    #[cfg(feature = "sdl")]
    let display = bootpix::display::SdlDisplay::open("bootpix", config.screen_width, config.screen_height)?;
    #[cfg(not(feature = "sdl"))]
    let display = bootpix::display::MemoryDisplay::new(config.screen_width, config.screen_height);

    let graphics_output: Box<dyn GraphicsOutput> = Box::new(display.clone());
    let mut locator = FixedLocator {
        graphics_output: Some(graphics_output),
        uga_draw: None,
    };
    let mut port = ScreenPort::probe(&mut locator);

    let splash = render_splash(&args, &config)?;
    port.present(&splash, 0, 0);

    if let Some(path) = &args.out {
        save_screenshot(&mut port, &config, path)?;
    }

    #[cfg(feature = "sdl")]
    display.wait_for_close();

    Ok(())
}
