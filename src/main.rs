use std::io::Write;
use std::path::{Path, PathBuf};

use cellscene::SceneConfig;
use cellscene::diagram::{render_still, render_svg};
use cellscene::fonts::{ApproxMeasure, CosmicTextMeasure, LabelMeasure};
use cellscene::theme::Theme;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use resvg::usvg;
use tiny_skia::{Pixmap, Transform};
use tracing_subscriber::EnvFilter;

/// Render animated cell diagrams to SVG, PNG or PDF
#[derive(Parser, Debug)]
#[command(name = "cellscene")]
#[command(version)]
#[command(about = "Render animated cell diagrams to SVG, PNG or PDF", long_about = None)]
struct Args {
    /// Scene file (.toml, .yaml, .yml or .json)
    #[arg(value_name = "INPUT", required_unless_present = "completions")]
    input: Option<PathBuf>,

    /// Output file path (extension determines format: .svg, .png or .pdf)
    #[arg(short, long, value_name = "OUTPUT", required_unless_present = "completions")]
    output: Option<PathBuf>,

    /// Built-in theme name or path to a theme file; overrides the scene's theme
    #[arg(short, long, value_name = "THEME")]
    theme: Option<String>,

    /// Seed for cell rotations; overrides the scene's seed
    #[arg(long)]
    seed: Option<u64>,

    /// Freeze the scene at this many seconds after mount instead of animating.
    /// PNG and PDF are always frozen and default to the moment every arrow
    /// has finished drawing.
    #[arg(long, value_name = "SECONDS")]
    at: Option<f32>,

    /// Raster scale multiplier for PNG output
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,

    /// Estimate label widths instead of loading system fonts
    #[arg(long)]
    no_font_measure: bool,

    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL", exclusive = true)]
    completions: Option<Shell>,
}

fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("cellscene=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Some(shell) = args.completions {
        let mut command = Args::command();
        clap_complete::generate(shell, &mut command, "cellscene", &mut std::io::stdout());
        return std::io::stdout()
            .flush()
            .map_err(|e| format!("Failed to write completions: {}", e));
    }

    let (Some(input), Some(output)) = (args.input.as_deref(), args.output.as_deref()) else {
        return Err("INPUT and --output are required".to_string());
    };

    let config = SceneConfig::load(input).map_err(|e| format!("{}: {}", input.display(), e))?;
    let theme = match args.theme.as_deref() {
        Some(name) => Theme::resolve(name),
        None => config.theme(),
    }
    .map_err(|e| e.to_string())?;

    let scene = config.mount_scene(args.seed);
    tracing::info!(
        cells = scene.particles().len(),
        connectors = scene.connectors().len(),
        "scene loaded"
    );

    let output_ext = output
        .extension()
        .and_then(|e| e.to_str())
        .ok_or("Output file has no extension")?
        .to_ascii_lowercase();

    let mut measure: Box<dyn LabelMeasure> = if args.no_font_measure {
        Box::new(ApproxMeasure::default())
    } else {
        Box::new(CosmicTextMeasure::new())
    };
    let still_at = args.at.unwrap_or_else(|| scene.settle_time());

    match output_ext.as_str() {
        "svg" => {
            let svg = match args.at {
                Some(t) => render_still(&scene, &theme, &mut measure, t),
                None => render_svg(&scene, &theme, &mut measure),
            };
            std::fs::write(output, svg).map_err(|e| format!("Failed to write SVG: {}", e))?;
        }
        "png" => {
            let svg = render_still(&scene, &theme, &mut measure, still_at);
            let png_data = svg_to_png(&svg, args.png_scale)?;
            std::fs::write(output, png_data).map_err(|e| format!("Failed to write PNG: {}", e))?;
        }
        "pdf" => {
            let svg = render_still(&scene, &theme, &mut measure, still_at);
            let pdf_data = svg_to_pdf(&svg)?;
            std::fs::write(output, pdf_data).map_err(|e| format!("Failed to write PDF: {}", e))?;
        }
        _ => {
            return Err(format!(
                "Unsupported output format: .{} (use .svg, .png or .pdf)",
                output_ext
            ));
        }
    }

    tracing::info!(path = %output.display(), "saved");
    Ok(())
}

/// Family names to use for generic `sans-serif` and `monospace` labels.
#[derive(Default)]
struct FontChoice {
    sans: Option<String>,
    mono: Option<String>,
}

fn choose_families<'a>(families: impl Iterator<Item = &'a str>) -> FontChoice {
    let mut first: Option<&str> = None;
    let mut sans: Option<&str> = None;
    let mut mono: Option<&str> = None;

    for family in families {
        first.get_or_insert(family);
        let lower = family.to_ascii_lowercase();
        if sans.is_none() && lower.contains("sans") {
            sans = Some(family);
        }
        if mono.is_none() && lower.contains("mono") {
            mono = Some(family);
        }
    }

    FontChoice {
        sans: sans.or(first).map(str::to_string),
        mono: mono.or(sans).or(first).map(str::to_string),
    }
}

fn local_fonts_dir() -> Option<&'static Path> {
    let dir = Path::new("fonts");
    dir.is_dir().then_some(dir)
}

fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>, String> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(format!("Invalid --png-scale value: {}", scale));
    }

    let mut opts = usvg::Options::default();
    {
        let fontdb = opts.fontdb_mut();
        fontdb.load_system_fonts();
        if let Some(dir) = local_fonts_dir() {
            fontdb.load_fonts_dir(dir);
        }
        let choice = choose_families(
            fontdb
                .faces()
                .flat_map(|face| face.families.iter().map(|(name, _)| name.as_str())),
        );
        if let Some(family) = choice.sans.as_deref() {
            fontdb.set_sans_serif_family(family);
        }
        if let Some(family) = choice.mono.as_deref() {
            fontdb.set_monospace_family(family);
        }
    }

    let tree =
        usvg::Tree::from_str(svg, &opts).map_err(|e| format!("Failed to parse SVG: {}", e))?;

    let width = (tree.size().width() * scale).ceil() as u32;
    let height = (tree.size().height() * scale).ceil() as u32;
    let mut pixmap = Pixmap::new(width, height).ok_or("Failed to create pixmap")?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| format!("Failed to encode PNG: {}", e))
}

fn svg_to_pdf(svg: &str) -> Result<Vec<u8>, String> {
    use svg2pdf::usvg::fontdb;

    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    if let Some(dir) = local_fonts_dir() {
        db.load_fonts_dir(dir);
    }
    let choice = choose_families(
        db.faces()
            .flat_map(|face| face.families.iter().map(|(name, _)| name.as_str())),
    );
    if let Some(family) = choice.sans.as_deref() {
        db.set_sans_serif_family(family);
    }
    if let Some(family) = choice.mono.as_deref() {
        db.set_monospace_family(family);
    }

    let opts = svg2pdf::usvg::Options {
        fontdb: std::sync::Arc::new(db),
        ..Default::default()
    };
    let tree = svg2pdf::usvg::Tree::from_str(svg, &opts)
        .map_err(|e| format!("Failed to parse SVG: {}", e))?;

    // Labels become paths; font embedding is not reliable across viewers.
    let options = svg2pdf::ConversionOptions {
        embed_text: false,
        ..Default::default()
    };
    svg2pdf::to_pdf(&tree, options, svg2pdf::PageOptions::default())
        .map_err(|e| format!("Failed to convert SVG to PDF: {}", e))
}

#[cfg(test)]
mod tests {
    use super::choose_families;

    #[test]
    fn prefers_sans_and_mono_families() {
        let choice = choose_families(
            ["Serif Pro", "Noto Sans", "DejaVu Sans Mono"].into_iter(),
        );
        assert_eq!(choice.sans.as_deref(), Some("Noto Sans"));
        assert_eq!(choice.mono.as_deref(), Some("DejaVu Sans Mono"));
    }

    #[test]
    fn falls_back_to_first_family() {
        let choice = choose_families(["Garamond"].into_iter());
        assert_eq!(choice.sans.as_deref(), Some("Garamond"));
        assert_eq!(choice.mono.as_deref(), Some("Garamond"));
    }
}
