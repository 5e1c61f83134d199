use std::env;
use std::error::Error;
use std::io;
use std::process;

use rental_cart::{init_logging, run, run_async, CartStore, Config, FileStorage};

const USAGE: &str = "Usage: rental-cart [--async] <commands.csv>";

fn main() {
    if let Err(err) = run_app() {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

fn run_app() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().skip(1).collect();
    let (use_async, input_path) = match args.as_slice() {
        [path] => (false, path.clone()),
        [flag, path] if flag == "--async" => (true, path.clone()),
        _ => return Err(USAGE.into()),
    };

    init_logging().map_err(|e| e.to_string())?;
    let config = Config::from_env()?;
    let store = CartStore::with_key(FileStorage::open(&config.data_dir)?, config.storage_key);

    if use_async {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime
            .block_on(run_async(input_path, store, io::stdout()))
            .map_err(|e| e.to_string())?;
    } else {
        let mut store = store;
        run(input_path, &mut store, io::stdout())?;
    }
    Ok(())
}
