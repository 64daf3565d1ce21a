use circuit_core::{Config, DefinitionStore, DirectoryStore};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let store = DirectoryStore::new(config.timers_dir()?);
    let names = store.list()?;
    if names.is_empty() {
        println!("no timers in {}", store.root().display());
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}
