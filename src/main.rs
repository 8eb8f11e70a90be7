use std::path::PathBuf;

use anyhow::{Context, bail};
use snapmark::Editor;
use snapmark::capture::BaseImage;
use snapmark::config::{JsonSettingsFile, Settings};
use snapmark::domain::Annotation;
use snapmark::export::save_png;
use snapmark::render::FontBook;

const USAGE: &str = "usage: snapmark <image> <annotations.json> <output.png> [--padding]";

struct Args {
    image: PathBuf,
    annotations: PathBuf,
    output: PathBuf,
    padding: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut positional = Vec::new();
    let mut padding = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--padding" => padding = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                std::process::exit(0);
            }
            flag if flag.starts_with("--") => bail!("unknown option {}\n{}", flag, USAGE),
            _ => positional.push(PathBuf::from(arg)),
        }
    }
    let [image, annotations, output]: [PathBuf; 3] = positional
        .try_into()
        .map_err(|_| anyhow::anyhow!("expected three paths\n{}", USAGE))?;
    Ok(Args {
        image,
        annotations,
        output,
        padding,
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = parse_args()?;

    let settings = JsonSettingsFile::default_location()
        .map(|store| Settings::load_from(&store))
        .unwrap_or_default();

    let base = BaseImage::open(&args.image)?;
    let json = std::fs::read_to_string(&args.annotations)
        .with_context(|| format!("failed to read {}", args.annotations.display()))?;
    let annotations: Vec<Annotation> = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse annotations in {}", args.annotations.display()))?;
    log::info!("Loaded {} annotation(s)", annotations.len());

    let mut editor = Editor::new(base.width(), base.height(), FontBook::discover())
        .with_settings(&settings)
        .with_annotations(annotations);
    if args.padding {
        let mut options = *editor.render_options();
        options.padding.enabled = true;
        editor.set_render_options(options);
    }

    let flattened = editor.export(&base.rgba)?;
    save_png(&flattened, &args.output)?;
    Ok(())
}
