use anyhow::{bail, Context, Result};
use photo_catalog::{diff, Catalog};

const USAGE: &str = "usage: catalog-check <metadata-file> [--against <previous-file>] [--emit json|js]";

enum Emit {
    Json,
    Js,
}

struct Args {
    metadata_path: String,
    against: Option<String>,
    emit: Option<Emit>,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut metadata_path = None;
    let mut against = None;
    let mut emit = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--against" => against = Some(args.next().context(USAGE)?),
            "--emit" => {
                emit = Some(match args.next().as_deref() {
                    Some("json") => Emit::Json,
                    Some("js") => Emit::Js,
                    _ => bail!(USAGE),
                })
            }
            _ if metadata_path.is_none() && !arg.starts_with("--") => {
                metadata_path = Some(arg.clone())
            }
            _ => bail!(USAGE),
        }
    }

    Ok(Args {
        metadata_path: metadata_path.context(USAGE)?,
        against,
        emit,
    })
}

fn main() -> Result<()> {
    env_logger::init();
    let args = parse_args()?;

    let catalog = Catalog::load_file(&args.metadata_path)
        .with_context(|| format!("{} is not a valid photo catalog", args.metadata_path))?;

    if let Some(emit) = args.emit {
        let rendered = match emit {
            Emit::Json => catalog.to_json_string()?,
            Emit::Js => catalog.to_js_module()?,
        };
        print!("{}", rendered);
        return Ok(());
    }

    println!("{}: {} photos", args.metadata_path, catalog.len());
    println!("fingerprint: {}", catalog.fingerprint());
    for (category, count) in catalog.category_counts() {
        println!("  {:<16} {}", category, count);
    }

    if let Some(previous_path) = args.against {
        let previous = Catalog::load_file(&previous_path)
            .with_context(|| format!("{} is not a valid photo catalog", previous_path))?;
        let changes = diff(&previous, &catalog);
        if changes.is_empty() {
            println!("no changes since {}", previous_path);
        } else {
            for name in &changes.added {
                println!("+ {}", name);
            }
            for name in &changes.removed {
                println!("- {}", name);
            }
            for name in &changes.changed {
                println!("~ {}", name);
            }
        }
    }

    Ok(())
}
