//! Strongbox storage - entry point
//!
//! Initializes the root-confined file storage service and reports its
//! current contents.

use log::{error, info};

use strongbox_storage::config::StorageConfig;
use strongbox_storage::storage::Storage;

fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    let config = match StorageConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let storage = match Storage::init(&config.base_dir) {
        Ok(storage) => storage,
        Err(e) => {
            error!("Failed to initialize storage: {}", e);
            std::process::exit(1);
        }
    };

    match storage.current_tree() {
        Ok(tree) => {
            for (directory, entries) in &tree {
                info!("/{} -> {:?}", directory, entries);
            }
        }
        Err(e) => {
            error!("Failed to read storage tree: {}", e);
            std::process::exit(1);
        }
    }
}
