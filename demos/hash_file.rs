//! Hashes the default data stream of a resolved file entry with SHA-256,
//! auto-detecting one layer of nested format exactly like `list_entries`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use sha2::{Digest, Sha256};

use vrs::analyzer::Analyzer;
use vrs::credentials::Credential;
use vrs::definitions::TypeIndicator;
use vrs::path::PathSpec;
use vrs::resolver::Context;
use vrs::vfs::FileEntry;
use vrs::{default_resolver, Error};

#[derive(Parser)]
#[command(about = "Hash a resolved file entry's default data stream")]
struct Args {
    /// Path to the artifact on the host file system.
    source: PathBuf,

    /// Slash-separated location of the entry to hash, relative to the
    /// detected (or raw) back end's root. Defaults to the root entry
    /// itself.
    #[arg(long)]
    entry: Option<String>,

    /// Password to try if the artifact turns out to be a BDE/LUKSDE
    /// encrypted volume.
    #[arg(long)]
    password: Option<String>,
}

fn descend(root: Arc<dyn FileEntry>, location: &str) -> Result<Arc<dyn FileEntry>, Error> {
    let mut current = root;
    for segment in location.split('/').filter(|s| !s.is_empty()) {
        let child = current
            .sub_file_entries()?
            .into_iter()
            .find(|entry| entry.name() == segment)
            .ok_or_else(|| Error::BackEnd(vrs::error::BackEndError::MissingMetadata(format!("no entry named {segment:?}"))))?;
        current = child;
    }
    Ok(current)
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

    let object = match (resolver.open_file_system(&path_spec, &context), &args.entry) {
        (Ok(file_system), entry_location) => {
            let root = file_system.lock().unwrap().root_file_entry()?;
            let entry = match entry_location {
                Some(location) => descend(root, location)?,
                None => root,
            };
            entry.get_file_object(None)?
        }
        (Err(_), _) => resolver.open_file_object(&path_spec, &context)?,
    };

    let data = object.lock().unwrap().read_to_end()?;
    let digest = Sha256::digest(&data);
    println!("{:x}  {}", digest, args.source.display());

    Ok(())
}
