//! Lists the entries of a forensic storage artifact, auto-detecting one
//! layer of nested format (a partition table, an archive, a compressed
//! or encrypted stream) on top of the raw OS file.
//!
//! This is a demo, not the crate's general-purpose source scanner: it
//! only unwraps a single outer layer. A real investigative tool would
//! repeat the detect-and-wrap step until nothing new is identified
//! (`dfvfs`'s `source_scanner.py` does exactly that); kept to one layer
//! here to keep the example readable.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use vrs::analyzer::Analyzer;
use vrs::credentials::Credential;
use vrs::definitions::TypeIndicator;
use vrs::path::PathSpec;
use vrs::resolver::Context;
use vrs::vfs::FileEntry;
use vrs::{default_resolver, Error};

#[derive(Parser)]
#[command(about = "List the entries of a forensic storage artifact")]
struct Args {
    /// Path to the artifact on the host file system.
    source: PathBuf,

    /// Password to try if the artifact turns out to be a BDE/LUKSDE
    /// encrypted volume.
    #[arg(long)]
    password: Option<String>,
}

fn print_tree(entry: &Arc<dyn FileEntry>, depth: usize) -> Result<(), Error> {
    let indent = "  ".repeat(depth);
    let stat = entry.stat()?;
    let label = if entry.name().is_empty() { "/".to_string() } else { entry.name() };
    println!("{indent}{label} ({} bytes)", stat.size);
    for child in entry.sub_file_entries()? {
        print_tree(&child, depth + 1)?;
    }
    Ok(())
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let resolver = default_resolver();
    let analyzer = Analyzer::with_defaults();
    let context = Context::new();

    let os_spec = PathSpec::new(TypeIndicator::Os, None, [("location", args.source.to_string_lossy().into_owned().into())])?;

    let detected = {
        let object = resolver.open_file_object(&os_spec, &context)?;
        let mut guard = object.lock().unwrap();
        analyzer.analyze(&mut *guard)?
    };

    let path_spec = match detected.into_iter().next() {
        Some(type_indicator) => {
            let wrapped = PathSpec::new(type_indicator, Some(os_spec), [])?;
            if matches!(type_indicator, TypeIndicator::Bde | TypeIndicator::Luksde) {
                if let Some(password) = &args.password {
                    resolver.key_chain.set_credential(&wrapped, "password", Credential::Password(password.clone()));
                }
            }
            wrapped
        }
        None => os_spec,
    };

    match resolver.open_file_system(&path_spec, &context) {
        Ok(file_system) => {
            let root = file_system.lock().unwrap().root_file_entry()?;
            print_tree(&root, 0)?;
        }
        Err(_) => {
            let object = resolver.open_file_object(&path_spec, &context)?;
            let size = object.lock().unwrap().size()?;
            println!("{} ({size} bytes, single stream)", path_spec.type_indicator());
        }
    }

    Ok(())
}
